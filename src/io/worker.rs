use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::codec::jpeg;
use crate::codec::planar::ImagePayload;
use crate::error::{RecorderError, Result};
use crate::io::writers::RunWriters;
use crate::queue::{CaptureTask, FrameRecord, InertialLine, TaskQueue, TextArtifact};
use crate::session::layout::RunLayout;
use crate::session::stats::RunStats;

#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    pub jpeg_quality: u8,
    pub idle_sleep: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: jpeg::DEFAULT_QUALITY,
            idle_sleep: Duration::from_millis(2),
        }
    }
}

/// Handle to the dedicated I/O thread: sole consumer of the task queue and
/// sole owner of the run's files.
pub struct IoWorker {
    running: Arc<AtomicBool>,
    handle: JoinHandle<RunWriters>,
}

impl IoWorker {
    pub fn spawn(
        queue: Arc<TaskQueue>,
        writers: RunWriters,
        layout: RunLayout,
        stats: Arc<RunStats>,
        settings: WorkerSettings,
    ) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let worker = WorkerLoop {
            queue,
            writers,
            layout,
            stats,
            settings,
            running: running.clone(),
        };

        let handle = std::thread::Builder::new()
            .name("io-worker".to_string())
            .spawn(move || worker.run())
            .map_err(RecorderError::WorkerSpawn)?;

        Ok(Self { running, handle })
    }

    /// Signals the loop to stop once the queue is drained, joins it, and hands
    /// the files back for closing.
    pub fn finish(self) -> Result<RunWriters> {
        self.running.store(false, Ordering::SeqCst);
        self.handle.join().map_err(|_| RecorderError::WorkerPanicked)
    }
}

struct WorkerLoop {
    queue: Arc<TaskQueue>,
    writers: RunWriters,
    layout: RunLayout,
    stats: Arc<RunStats>,
    settings: WorkerSettings,
    running: Arc<AtomicBool>,
}

impl WorkerLoop {
    fn run(mut self) -> RunWriters {
        info!("I/O worker started for {}", self.layout.root().display());
        let mut handled = 0u64;

        while self.running.load(Ordering::SeqCst) || !self.queue.is_empty() {
            let Some(task) = self.queue.poll() else {
                std::thread::sleep(self.settings.idle_sleep);
                continue;
            };

            match task {
                CaptureTask::Frame(record) => self.handle_frame(record),
                CaptureTask::Text(artifact) => {
                    let result = self.write_text(&artifact);
                    self.check(result);
                }
                CaptureTask::Inertial(sample) => {
                    let result = self.write_inertial(&sample);
                    self.check(result);
                }
            }
            handled += 1;
        }

        info!(
            "I/O worker drained after {} tasks ({} write errors)",
            handled,
            self.stats.write_errors()
        );
        self.writers
    }

    /// Write failures are counted and logged; the task is not retried.
    fn check(&self, result: Result<()>) {
        if let Err(e) = result {
            self.stats.record_write_error();
            warn!("Write failed: {}", e);
        }
    }

    fn handle_frame(&mut self, record: FrameRecord) {
        let t = record.stamp.global_ns;

        let result = self.writers.time_sync.append(&record.time_sync_row());
        self.check(result);
        let result = self.writers.frame_ts.append(&record.frame_ts_row());
        self.check(result);
        let result = self.writers.pose_sensor.append(&record.sensor_pose.csv_row(t));
        self.check(result);
        let result = self.writers.pose_camera.append(&record.tracking_pose.csv_row(t));
        self.check(result);

        if let Some(image) = record.image {
            let result = self.write_image(&image);
            self.check(result);
            // Source handle closes here whether or not the write succeeded.
            image.release();
        }
    }

    fn write_image(&mut self, image: &ImagePayload) -> Result<()> {
        let file_name = image.file_name();
        let path = self.layout.image_path(&file_name);
        let bytes = jpeg::write_jpeg(&path, image.image(), self.settings.jpeg_quality)?;
        debug!("Wrote {} ({} bytes)", path.display(), bytes);

        self.stats.record_image();
        self.writers.cam.append(&format!(
            "{},{}\n",
            image.global_ns(),
            RunLayout::image_relative(&file_name)
        ))
    }

    fn write_text(&self, artifact: &TextArtifact) -> Result<()> {
        if let Some(parent) = artifact.path.parent() {
            fs::create_dir_all(parent).map_err(|e| RecorderError::io(parent, e))?;
        }
        fs::write(&artifact.path, &artifact.content).map_err(|e| RecorderError::io(&artifact.path, e))
    }

    fn write_inertial(&mut self, sample: &InertialLine) -> Result<()> {
        self.writers.imu.append(&sample.line)
    }
}
