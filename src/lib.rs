pub mod capture;
pub mod codec;
pub mod config;
pub mod error;
pub mod io;
pub mod queue;
pub mod session;
pub mod sim;

pub use config::RecorderConfig;
pub use error::{AcquireError, RecorderError, Result};
pub use session::{InertialProducer, RunSession, SessionState};
