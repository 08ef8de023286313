use std::path::PathBuf;

use crate::capture::clock::FrameStamp;
use crate::capture::sensor::InertialSample;
use crate::capture::tracking::Pose;
use crate::codec::planar::ImagePayload;

/// Camera timestamp recorded when the tracker cannot report one.
pub const MISSING_CAMERA_TS: i64 = -1;

/// Everything logged for one tracking update.
#[derive(Debug)]
pub struct FrameRecord {
    pub stamp: FrameStamp,
    pub camera_ns: i64,
    pub sensor_pose: Pose,
    pub tracking_pose: Pose,
    pub image: Option<ImagePayload>,
}

impl FrameRecord {
    /// `frame_ts_ns,elapsed_now_ns,offset_ns`
    pub fn time_sync_row(&self) -> String {
        format!(
            "{},{},{}\n",
            self.stamp.source_ns, self.stamp.arrival_ns, self.stamp.offset_ns
        )
    }

    /// `frame_ts_ns,camera_ts_ns`
    pub fn frame_ts_row(&self) -> String {
        format!("{},{}\n", self.stamp.source_ns, self.camera_ns)
    }
}

/// One-shot file written verbatim (overwrite semantics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextArtifact {
    pub path: PathBuf,
    pub content: String,
}

/// Pre-rendered `imu0/data.csv` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InertialLine {
    pub t_ns: i64,
    pub line: String,
}

impl From<InertialSample> for InertialLine {
    fn from(sample: InertialSample) -> Self {
        Self {
            t_ns: sample.t_ns,
            line: sample.csv_line(),
        }
    }
}

/// Unit of work handed from producers to the I/O worker.
#[derive(Debug)]
pub enum CaptureTask {
    Frame(FrameRecord),
    Text(TextArtifact),
    Inertial(InertialLine),
}

impl CaptureTask {
    pub fn has_image(&self) -> bool {
        matches!(self, CaptureTask::Frame(FrameRecord { image: Some(_), .. }))
    }

    /// Discards the task, closing any image it owns.
    pub fn release(self) {
        if let CaptureTask::Frame(FrameRecord { image: Some(image), .. }) = self {
            image.release();
        }
    }
}
