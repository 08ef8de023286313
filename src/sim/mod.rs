//! Synthetic tracking and inertial sources. Used by the CLI driver to record
//! without hardware, and by tests.

use crate::capture::sensor::InertialChannel;
use crate::capture::tracking::{CameraIntrinsics, Pose, TrackingUpdate};
use crate::codec::planar::{PlanarImage, Plane};
use crate::error::AcquireError;

/// Row padding applied to generated luma rows.
const ROW_PADDING: usize = 16;

/// Gradient test image laid out like a camera semi-planar buffer: padded
/// luma rows and one interleaved UV buffer exposed as two planes with pixel
/// stride 2.
pub fn synthetic_image(width: u32, height: u32, phase: u8) -> PlanarImage {
    let w = width as usize;
    let h = height as usize;
    let y_stride = w + ROW_PADDING;
    let cw = (w + 1) / 2;
    let ch = (h + 1) / 2;
    let uv_stride = cw * 2 + ROW_PADDING;

    let mut y = vec![0u8; y_stride * h];
    for row in 0..h {
        for col in 0..w {
            y[row * y_stride + col] = ((row + col) as u8).wrapping_add(phase);
        }
    }

    let mut uv = vec![0u8; uv_stride * ch];
    for row in 0..ch {
        for col in 0..cw {
            uv[row * uv_stride + col * 2] = 96u8.wrapping_add((col as u8).wrapping_mul(3));
            uv[row * uv_stride + col * 2 + 1] = 160u8.wrapping_sub((row as u8).wrapping_mul(3));
        }
    }

    PlanarImage::new(
        width,
        height,
        Plane::new(y, y_stride, 1),
        Plane::copy_from(&uv, uv_stride, 2),
        Plane::copy_from(&uv[1..], uv_stride, 2),
    )
}

/// One update from [`SyntheticTracker`].
#[derive(Debug, Clone)]
pub struct SyntheticUpdate {
    pub timestamp_ns: i64,
    pub pose: Pose,
    pub intrinsics: Option<CameraIntrinsics>,
    pub camera_timestamp_ns: Option<i64>,
    pub image_available: bool,
    pub width: u32,
    pub height: u32,
}

impl TrackingUpdate for SyntheticUpdate {
    fn timestamp_ns(&self) -> i64 {
        self.timestamp_ns
    }

    fn sensor_pose(&self) -> Option<Pose> {
        Some(self.pose)
    }

    fn tracking_pose(&self) -> Pose {
        self.pose
    }

    fn intrinsics(&self) -> Option<CameraIntrinsics> {
        self.intrinsics
    }

    fn camera_timestamp_ns(&self) -> Option<i64> {
        self.camera_timestamp_ns
    }

    fn acquire_image(&mut self) -> Result<PlanarImage, AcquireError> {
        if !self.image_available {
            return Err(AcquireError::NotYetAvailable);
        }
        Ok(synthetic_image(self.width, self.height, self.timestamp_ns as u8))
    }
}

/// Camera moving on a 1 m circle at a constant angular rate.
#[derive(Debug, Clone)]
pub struct SyntheticTracker {
    pub width: u32,
    pub height: u32,
    frame: u64,
    angular_rate: f32,
    /// Every n-th image acquisition fails, when set.
    pub fail_every: Option<u64>,
}

impl SyntheticTracker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame: 0,
            angular_rate: 0.5,
            fail_every: None,
        }
    }

    pub fn intrinsics(&self) -> CameraIntrinsics {
        CameraIntrinsics {
            fx: self.width as f32 * 0.8,
            fy: self.width as f32 * 0.8,
            cx: self.width as f32 / 2.0,
            cy: self.height as f32 / 2.0,
            width: self.width,
            height: self.height,
        }
    }

    pub fn update_at(&mut self, timestamp_ns: i64) -> SyntheticUpdate {
        self.frame += 1;
        let theta = self.angular_rate * (timestamp_ns as f64 / 1e9) as f32;
        let half = theta / 2.0;
        let pose = Pose::new(
            [theta.cos(), theta.sin(), 0.0],
            [0.0, 0.0, half.sin(), half.cos()],
        );
        let image_available = match self.fail_every {
            Some(n) if n > 0 => self.frame % n != 0,
            _ => true,
        };

        SyntheticUpdate {
            timestamp_ns,
            pose,
            intrinsics: Some(self.intrinsics()),
            camera_timestamp_ns: Some(timestamp_ns - 1_000_000),
            image_available,
            width: self.width,
            height: self.height,
        }
    }
}

/// Gyro and accelerometer streams at independent rates.
#[derive(Debug, Clone)]
pub struct SyntheticImu {
    gyro_period_ns: i64,
    accel_period_ns: i64,
    next_gyro_ns: i64,
    next_accel_ns: i64,
}

impl SyntheticImu {
    pub fn new(gyro_hz: u32, accel_hz: u32, start_ns: i64) -> Self {
        Self {
            gyro_period_ns: 1_000_000_000 / i64::from(gyro_hz.max(1)),
            accel_period_ns: 1_000_000_000 / i64::from(accel_hz.max(1)),
            next_gyro_ns: start_ns,
            next_accel_ns: start_ns,
        }
    }

    /// Events due up to and including `until_ns`, in hardware-time order.
    pub fn events_until(&mut self, until_ns: i64) -> Vec<(InertialChannel, [f32; 3], i64)> {
        let mut events = Vec::new();
        loop {
            let gyro_next = self.next_gyro_ns <= until_ns;
            let accel_next = self.next_accel_ns <= until_ns;
            if !gyro_next && !accel_next {
                break;
            }

            if gyro_next && (!accel_next || self.next_gyro_ns <= self.next_accel_ns) {
                let t = self.next_gyro_ns;
                let s = t as f64 / 1e9;
                events.push((
                    InertialChannel::AngularRate,
                    [(s * 0.5).sin() as f32 * 0.05, (s * 0.3).cos() as f32 * 0.03, 0.5],
                    t,
                ));
                self.next_gyro_ns += self.gyro_period_ns;
            } else {
                let t = self.next_accel_ns;
                let s = t as f64 / 1e9;
                events.push((
                    InertialChannel::LinearAcceleration,
                    [-(s * 0.5).cos() as f32 * 0.25, -(s * 0.5).sin() as f32 * 0.25, 9.81],
                    t,
                ));
                self.next_accel_ns += self.accel_period_ns;
            }
        }
        events
    }
}
