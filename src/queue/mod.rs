pub mod task;
pub mod task_queue;

pub use task::{CaptureTask, FrameRecord, InertialLine, TextArtifact};
pub use task_queue::TaskQueue;
