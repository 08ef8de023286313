use std::path::PathBuf;
use thiserror::Error;

/// Recorder failures. Per-task write errors are counted by the I/O worker and
/// never end a run; only session-level failures reach the caller of `start()`.
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid planar image: {0}")]
    InvalidImage(String),

    #[error("Failed to spawn I/O worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("I/O worker panicked")]
    WorkerPanicked,
}

impl RecorderError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RecorderError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RecorderError>;

/// Transient failure to pull an image from the tracking subsystem for one tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    #[error("No image available yet")]
    NotYetAvailable,

    #[error("Acquisition failed: {0}")]
    Failed(String),
}
