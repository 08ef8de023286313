#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use vio_recorder::capture::tracking::{CameraIntrinsics, Pose, TrackingUpdate};
use vio_recorder::codec::planar::PlanarImage;
use vio_recorder::sim::synthetic_image;
use vio_recorder::{AcquireError, RecorderConfig};

/// Scripted tracking update.
pub struct TestUpdate {
    pub t_src: i64,
    pub sensor_pose: Option<Pose>,
    pub tracking_pose: Pose,
    pub intrinsics: Option<CameraIntrinsics>,
    pub camera_ts: Option<i64>,
    pub image: Option<PlanarImage>,
}

impl TestUpdate {
    pub fn new(t_src: i64) -> Self {
        Self {
            t_src,
            sensor_pose: Some(Pose::new([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0])),
            tracking_pose: Pose::new([0.5, 0.25, -1.0], [0.0, 1.0, 0.0, 0.0]),
            intrinsics: None,
            camera_ts: Some(t_src - 10),
            image: None,
        }
    }

    pub fn with_image(mut self, width: u32, height: u32) -> Self {
        self.image = Some(synthetic_image(width, height, 7));
        self
    }

    pub fn with_intrinsics(mut self, intrinsics: CameraIntrinsics) -> Self {
        self.intrinsics = Some(intrinsics);
        self
    }
}

impl TrackingUpdate for TestUpdate {
    fn timestamp_ns(&self) -> i64 {
        self.t_src
    }

    fn sensor_pose(&self) -> Option<Pose> {
        self.sensor_pose
    }

    fn tracking_pose(&self) -> Pose {
        self.tracking_pose
    }

    fn intrinsics(&self) -> Option<CameraIntrinsics> {
        self.intrinsics
    }

    fn camera_timestamp_ns(&self) -> Option<i64> {
        self.camera_ts
    }

    fn acquire_image(&mut self) -> Result<PlanarImage, AcquireError> {
        self.image.take().ok_or(AcquireError::NotYetAvailable)
    }
}

pub fn intrinsics(fx: f32) -> CameraIntrinsics {
    CameraIntrinsics {
        fx,
        fy: fx,
        cx: 320.0,
        cy: 240.0,
        width: 640,
        height: 480,
    }
}

pub fn test_config(root: &Path) -> RecorderConfig {
    RecorderConfig {
        worker_idle_sleep_ms: 1,
        ..RecorderConfig::default()
    }
    .with_output_root(root)
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("reading {}: {}", path.display(), e))
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn run_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(root)
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default();
    dirs.sort();
    dirs
}
