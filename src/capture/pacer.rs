use tracing::debug;

use crate::codec::planar::{ImagePayload, PlanarImage};
use crate::error::AcquireError;

/// Rate-limits image pulls to a fixed target independent of the tick rate.
///
/// Only a successful acquisition moves the anchor, so a failed pull is
/// retried on the very next tick.
#[derive(Debug, Clone)]
pub struct CapturePacer {
    interval_ns: i64,
    last_capture_ns: i64,
}

impl CapturePacer {
    pub fn new(interval_ns: i64) -> Self {
        Self {
            interval_ns,
            last_capture_ns: 0,
        }
    }

    pub fn interval_ns(&self) -> i64 {
        self.interval_ns
    }

    pub fn last_capture_ns(&self) -> i64 {
        self.last_capture_ns
    }

    pub fn reset(&mut self) {
        self.last_capture_ns = 0;
    }

    pub fn is_due(&self, global_ns: i64) -> bool {
        global_ns.wrapping_sub(self.last_capture_ns) >= self.interval_ns
    }

    pub fn maybe_capture<F>(&mut self, global_ns: i64, acquire: F) -> Option<ImagePayload>
    where
        F: FnOnce() -> Result<PlanarImage, AcquireError>,
    {
        if !self.is_due(global_ns) {
            return None;
        }

        match acquire() {
            Ok(image) => {
                self.last_capture_ns = global_ns;
                Some(ImagePayload::new(image, global_ns))
            }
            Err(e) => {
                debug!("Image acquisition skipped at {}: {}", global_ns, e);
                None
            }
        }
    }
}
