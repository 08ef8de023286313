pub mod layout;
pub mod run;
pub mod stats;

pub use run::{InertialProducer, RunSession, SessionState};
