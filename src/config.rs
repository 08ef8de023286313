use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RecorderError, Result};

/// Recorder settings. Defaults are the fixed values the recording format is
/// built around (32-slot queue, 30 Hz images, JPEG quality 90).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub output_root: PathBuf,
    pub run_name: String,
    pub aux_dir: String,
    pub queue_capacity: usize,
    pub capture_rate_hz: u32,
    pub jpeg_quality: u8,
    pub worker_idle_sleep_ms: u64,
    pub status_interval_ms: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("runs"),
            run_name: "run".to_string(),
            aux_dir: "arcore".to_string(),
            queue_capacity: 32,
            capture_rate_hz: 30,
            jpeg_quality: 90,
            worker_idle_sleep_ms: 2,
            status_interval_ms: 1000,
        }
    }
}

impl RecorderConfig {
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Load from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RecorderError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn capture_interval_ns(&self) -> i64 {
        1_000_000_000 / i64::from(self.capture_rate_hz.max(1))
    }

    pub fn worker_idle_sleep(&self) -> Duration {
        Duration::from_millis(self.worker_idle_sleep_ms)
    }

    pub fn status_interval_ns(&self) -> i64 {
        self.status_interval_ms as i64 * 1_000_000
    }
}
