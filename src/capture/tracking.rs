use serde::{Deserialize, Serialize};

use crate::codec::planar::PlanarImage;
use crate::error::AcquireError;

/// Rigid transform: translation in meters, rotation as (qx, qy, qz, qw).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    pub fn new(translation: [f32; 3], rotation: [f32; 4]) -> Self {
        Self { translation, rotation }
    }

    /// `t,tx,ty,tz,qx,qy,qz,qw` row for the pose logs.
    pub fn csv_row(&self, t_ns: i64) -> String {
        let t = self.translation;
        let q = self.rotation;
        format!(
            "{},{},{},{},{},{},{},{}\n",
            t_ns, t[0], t[1], t[2], q[0], q[1], q[2], q[3]
        )
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::IDENTITY
    }
}

/// Pinhole intrinsics of the tracking camera image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
    pub width: u32,
    pub height: u32,
}

impl CameraIntrinsics {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One update observed from the tracking subsystem.
///
/// Implementations own whatever native handle backs the frame; `acquire_image`
/// must return planes already copied out of it.
pub trait TrackingUpdate {
    /// Frame timestamp in the tracker's monotonic clock domain.
    fn timestamp_ns(&self) -> i64;

    /// `None` when the sensor-frame pose cannot be read this tick.
    fn sensor_pose(&self) -> Option<Pose>;

    fn tracking_pose(&self) -> Pose;

    fn intrinsics(&self) -> Option<CameraIntrinsics>;

    fn camera_timestamp_ns(&self) -> Option<i64>;

    /// Non-blocking; failure is transient and only affects this tick.
    fn acquire_image(&mut self) -> Result<PlanarImage, AcquireError>;
}
