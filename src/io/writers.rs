use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::error::{RecorderError, Result};
use crate::session::layout::RunLayout;

pub const CAM_HEADER: &str = "timestamp_ns,filename\n";
pub const IMU_HEADER: &str = "t_ns,wx,wy,wz,ax,ay,az\n";
pub const POSE_HEADER: &str = "t_ns,tx,ty,tz,qx,qy,qz,qw\n";
pub const TIME_SYNC_HEADER: &str = "frame_ts_ns,elapsed_now_ns,offset_ns\n";
pub const FRAME_TS_HEADER: &str = "frame_ts_ns,camera_ts_ns\n";

/// Buffered append-only CSV file.
#[derive(Debug)]
pub struct CsvLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CsvLog {
    pub fn create(path: PathBuf, header: &str) -> Result<Self> {
        let file = File::create(&path).map_err(|e| RecorderError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(header.as_bytes())
            .map_err(|e| RecorderError::io(&path, e))?;
        Ok(Self { path, writer })
    }

    pub fn append(&mut self, row: &str) -> Result<()> {
        self.writer
            .write_all(row.as_bytes())
            .map_err(|e| RecorderError::io(&self.path, e))
    }

    /// Flushes and closes the file.
    pub fn close(mut self) -> Result<()> {
        self.writer.flush().map_err(|e| RecorderError::io(&self.path, e))?;
        let file = self
            .writer
            .into_inner()
            .map_err(|e| RecorderError::io(&self.path, e.into_error()))?;
        file.sync_all().map_err(|e| RecorderError::io(&self.path, e))
    }
}

/// All CSV outputs of a run. Owned by the I/O worker while the run is active.
#[derive(Debug)]
pub struct RunWriters {
    pub cam: CsvLog,
    pub imu: CsvLog,
    pub pose_sensor: CsvLog,
    pub pose_camera: CsvLog,
    pub time_sync: CsvLog,
    pub frame_ts: CsvLog,
}

impl RunWriters {
    /// Opens every file and writes its header.
    pub fn open(layout: &RunLayout) -> Result<Self> {
        Ok(Self {
            cam: CsvLog::create(layout.cam_csv(), CAM_HEADER)?,
            imu: CsvLog::create(layout.imu_csv(), IMU_HEADER)?,
            pose_sensor: CsvLog::create(layout.pose_sensor_csv(), POSE_HEADER)?,
            pose_camera: CsvLog::create(layout.pose_camera_csv(), POSE_HEADER)?,
            time_sync: CsvLog::create(layout.time_sync_csv(), TIME_SYNC_HEADER)?,
            frame_ts: CsvLog::create(layout.frame_timestamps_csv(), FRAME_TS_HEADER)?,
        })
    }

    /// Closes every file, collecting failures instead of stopping at the first.
    pub fn close(self) -> Vec<RecorderError> {
        [
            self.cam,
            self.imu,
            self.pose_sensor,
            self.pose_camera,
            self.time_sync,
            self.frame_ts,
        ]
        .into_iter()
        .filter_map(|log| log.close().err())
        .collect()
    }
}
