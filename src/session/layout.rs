use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{RecorderError, Result};

pub const CAM_DIR: &str = "cam0";
pub const CAM_DATA_DIR: &str = "cam0/data";
pub const IMU_DIR: &str = "imu0";

/// On-disk layout of one run:
///
/// ```text
/// <ts>_run/cam0/data/<t_ns>.jpg
/// <ts>_run/cam0/data.csv
/// <ts>_run/imu0/data.csv
/// <ts>_run/<aux>/{pose_sensor,pose_camera,time_sync,frame_timestamps}.csv
/// <ts>_run/<aux>/intrinsics.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    root: PathBuf,
    aux_dir: String,
}

impl RunLayout {
    pub fn new(root: impl Into<PathBuf>, aux_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            aux_dir: aux_dir.into(),
        }
    }

    /// Creates a fresh `<yyyyMMdd_HHmmss>_<name>` directory under `base`
    /// together with its fixed subdirectories. A name already taken gets a
    /// numeric suffix.
    pub fn create<Tz>(base: &Path, run_name: &str, aux_dir: &str, now: DateTime<Tz>) -> Result<Self>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        fs::create_dir_all(base).map_err(|e| RecorderError::io(base, e))?;

        let stem = format!("{}_{}", now.format("%Y%m%d_%H%M%S"), run_name);
        let mut attempt = 1u32;
        let root = loop {
            let name = if attempt == 1 {
                stem.clone()
            } else {
                format!("{}_{}", stem, attempt)
            };
            let candidate = base.join(name);
            match fs::create_dir(&candidate) {
                Ok(()) => break candidate,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(RecorderError::io(candidate, e)),
            }
        };

        let layout = Self::new(root, aux_dir);
        for dir in [layout.cam_data_dir(), layout.imu_dir(), layout.aux_path()] {
            fs::create_dir_all(&dir).map_err(|e| RecorderError::io(dir, e))?;
        }
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn aux_path(&self) -> PathBuf {
        self.root.join(&self.aux_dir)
    }

    pub fn cam_data_dir(&self) -> PathBuf {
        self.root.join(CAM_DATA_DIR)
    }

    pub fn imu_dir(&self) -> PathBuf {
        self.root.join(IMU_DIR)
    }

    pub fn cam_csv(&self) -> PathBuf {
        self.root.join(CAM_DIR).join("data.csv")
    }

    pub fn imu_csv(&self) -> PathBuf {
        self.imu_dir().join("data.csv")
    }

    pub fn pose_sensor_csv(&self) -> PathBuf {
        self.aux_path().join("pose_sensor.csv")
    }

    pub fn pose_camera_csv(&self) -> PathBuf {
        self.aux_path().join("pose_camera.csv")
    }

    pub fn time_sync_csv(&self) -> PathBuf {
        self.aux_path().join("time_sync.csv")
    }

    pub fn frame_timestamps_csv(&self) -> PathBuf {
        self.aux_path().join("frame_timestamps.csv")
    }

    pub fn intrinsics_json(&self) -> PathBuf {
        self.aux_path().join("intrinsics.json")
    }

    /// Path recorded in `cam0/data.csv`, relative to the run root.
    pub fn image_relative(file_name: &str) -> String {
        format!("{}/{}", CAM_DATA_DIR, file_name)
    }

    pub fn image_path(&self, file_name: &str) -> PathBuf {
        self.cam_data_dir().join(file_name)
    }
}
