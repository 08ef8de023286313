use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use crate::capture::clock::{ClockSynchronizer, MonotonicClock};
use crate::capture::pacer::CapturePacer;
use crate::capture::sensor::{InertialChannel, SensorSampler};
use crate::capture::tracking::{Pose, TrackingUpdate};
use crate::config::RecorderConfig;
use crate::error::{RecorderError, Result};
use crate::io::worker::{IoWorker, WorkerSettings};
use crate::io::writers::RunWriters;
use crate::queue::task::MISSING_CAMERA_TS;
use crate::queue::{CaptureTask, FrameRecord, TaskQueue, TextArtifact};
use crate::session::layout::RunLayout;
use crate::session::stats::{RunStats, StatsSnapshot, StatusLine, StatusReporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
}

/// State shared between the session and its producer handles.
struct ProducerShared {
    queue: Arc<TaskQueue>,
    stats: Arc<RunStats>,
    sampler: Mutex<SensorSampler>,
    /// Producers hold the read side across check + enqueue, so once `close`
    /// returns no further task can reach the queue or the counters.
    accepting: RwLock<bool>,
}

impl ProducerShared {
    fn accepting(&self) -> RwLockReadGuard<'_, bool> {
        match self.accepting.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Waits for in-flight producers, then rejects every later event.
    fn close(&self) {
        let mut accepting = match self.accepting.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *accepting = false;
    }

    /// Fire-and-forget enqueue. A rejected task is counted and released here.
    fn submit(&self, task: CaptureTask) -> bool {
        match self.queue.offer(task) {
            Ok(()) => true,
            Err(rejected) => {
                self.stats.record_drop();
                debug!("Task queue full, dropping task (image: {})", rejected.has_image());
                rejected.release();
                false
            }
        }
    }
}

/// Cloneable entry point for sensor callbacks on any thread.
#[derive(Clone)]
pub struct InertialProducer {
    shared: Arc<ProducerShared>,
}

impl InertialProducer {
    /// Fuses the event with the last reading of the other channel and
    /// enqueues the sample. Returns whether the sample was accepted.
    pub fn on_inertial_event(&self, channel: InertialChannel, values: [f32; 3], t_ns: i64) -> bool {
        let accepting = self.shared.accepting();
        if !*accepting {
            return false;
        }

        let sample = {
            let mut sampler = match self.shared.sampler.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            sampler.on_event(channel, values, t_ns)
        };

        let accepted = self.shared.submit(CaptureTask::Inertial(sample.into()));
        if accepted {
            self.shared.stats.record_sample();
        }
        accepted
    }

    pub fn is_accepting(&self) -> bool {
        *self.shared.accepting()
    }
}

struct ActiveRun {
    layout: RunLayout,
    shared: Arc<ProducerShared>,
    worker: IoWorker,
    pacer: CapturePacer,
    intrinsics_logged: bool,
}

/// Recording session: `Idle -> Active -> Idle`.
///
/// Owns the run directory, the I/O worker and the per-run counters. Start and
/// stop are idempotent; ticks and sensor events while idle are ignored.
pub struct RunSession {
    config: RecorderConfig,
    clock: ClockSynchronizer,
    status: StatusReporter,
    active: Option<ActiveRun>,
    last_run: Option<(PathBuf, StatsSnapshot)>,
}

impl RunSession {
    pub fn new(config: RecorderConfig, clock: Box<dyn MonotonicClock>) -> Self {
        let status = StatusReporter::new(config.status_interval_ns());
        Self {
            config,
            clock: ClockSynchronizer::new(clock),
            status,
            active: None,
            last_run: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.active.is_some() {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn run_dir(&self) -> Option<&Path> {
        self.active.as_ref().map(|run| run.layout.root())
    }

    pub fn layout(&self) -> Option<&RunLayout> {
        self.active.as_ref().map(|run| &run.layout)
    }

    /// Counters of the active run, or of the last finished one.
    pub fn stats(&self) -> Option<StatsSnapshot> {
        match &self.active {
            Some(run) => Some(run.shared.stats.snapshot()),
            None => self.last_run.as_ref().map(|(_, stats)| *stats),
        }
    }

    pub fn last_run(&self) -> Option<&(PathBuf, StatsSnapshot)> {
        self.last_run.as_ref()
    }

    /// Starts a run. Returns `Ok(false)` without side effects if one is active.
    pub fn start(&mut self) -> Result<bool> {
        if self.active.is_some() {
            debug!("start() ignored: run already active");
            return Ok(false);
        }

        let layout = RunLayout::create(
            &self.config.output_root,
            &self.config.run_name,
            &self.config.aux_dir,
            Local::now(),
        )?;
        let writers = RunWriters::open(&layout)?;

        let queue = Arc::new(TaskQueue::new(self.config.queue_capacity));
        let stats = Arc::new(RunStats::new());
        let settings = WorkerSettings {
            jpeg_quality: self.config.jpeg_quality,
            idle_sleep: self.config.worker_idle_sleep(),
        };
        let worker = IoWorker::spawn(queue.clone(), writers, layout.clone(), stats.clone(), settings)?;

        let shared = Arc::new(ProducerShared {
            queue,
            stats,
            sampler: Mutex::new(SensorSampler::new()),
            accepting: RwLock::new(true),
        });

        info!("Recording started: {}", layout.root().display());
        self.status.reset();
        self.active = Some(ActiveRun {
            layout,
            shared,
            worker,
            pacer: CapturePacer::new(self.config.capture_interval_ns()),
            intrinsics_logged: false,
        });
        Ok(true)
    }

    /// Stops the run: producers are detached, the worker drains and joins,
    /// and every file is flushed and closed. Returns `Ok(None)` when idle.
    pub fn stop(&mut self) -> Result<Option<StatsSnapshot>> {
        let Some(run) = self.active.take() else {
            debug!("stop() ignored: no active run");
            return Ok(None);
        };

        run.shared.close();
        let joined = run.worker.finish();

        // Only a worker that died early leaves tasks behind.
        for task in run.shared.queue.drain() {
            run.shared.stats.record_drop();
            task.release();
        }

        let writers = match joined {
            Ok(writers) => writers,
            Err(e) => {
                let stats = run.shared.stats.snapshot();
                self.last_run = Some((run.layout.root().to_path_buf(), stats));
                return Err(e);
            }
        };

        for e in writers.close() {
            run.shared.stats.record_write_error();
            warn!("Close failed: {}", e);
        }

        let stats = run.shared.stats.snapshot();
        info!(
            "Recording stopped: {} (frames={}, imu={}, images={}, dropped={}, write_errors={})",
            run.layout.root().display(),
            stats.frames,
            stats.samples,
            stats.images_written,
            stats.dropped,
            stats.write_errors
        );
        self.last_run = Some((run.layout.root().to_path_buf(), stats));
        Ok(Some(stats))
    }

    /// Handle for sensor-callback contexts. `None` while idle; a handle kept
    /// past `stop()` stops accepting events.
    pub fn inertial_producer(&self) -> Option<InertialProducer> {
        self.active.as_ref().map(|run| InertialProducer {
            shared: run.shared.clone(),
        })
    }

    pub fn on_inertial_event(&self, channel: InertialChannel, values: [f32; 3], t_ns: i64) -> bool {
        match self.inertial_producer() {
            Some(producer) => producer.on_inertial_event(channel, values, t_ns),
            None => false,
        }
    }

    /// Processes one tracking update. Returns whether its frame record was
    /// accepted by the queue.
    pub fn on_tick(&mut self, update: &mut dyn TrackingUpdate) -> bool {
        let Some(run) = self.active.as_mut() else {
            return false;
        };

        let stamp = self.clock.observe(update.timestamp_ns());

        if !run.intrinsics_logged {
            if let Some(intrinsics) = update.intrinsics() {
                match intrinsics.to_json() {
                    Ok(content) => {
                        let artifact = TextArtifact {
                            path: run.layout.intrinsics_json(),
                            content,
                        };
                        run.intrinsics_logged = run.shared.submit(CaptureTask::Text(artifact));
                    }
                    Err(e) => warn!("Intrinsics not serializable: {}", RecorderError::from(e)),
                }
            }
        }

        let sensor_pose = update.sensor_pose().unwrap_or(Pose::IDENTITY);
        let tracking_pose = update.tracking_pose();
        let camera_ns = update.camera_timestamp_ns().unwrap_or(MISSING_CAMERA_TS);
        let image = run
            .pacer
            .maybe_capture(stamp.global_ns, || update.acquire_image());

        let record = FrameRecord {
            stamp,
            camera_ns,
            sensor_pose,
            tracking_pose,
            image,
        };

        let accepted = run.shared.submit(CaptureTask::Frame(record));
        if accepted {
            run.shared.stats.record_frame();
        }

        if let Some(line) = self.poll_status() {
            info!("{}", line);
        }
        accepted
    }

    /// Throughput line, at most once per status interval while active.
    pub fn poll_status(&mut self) -> Option<StatusLine> {
        let run = self.active.as_ref()?;
        let now = self.clock.now_ns();
        self.status
            .poll(now, &run.shared.stats, Some(run.layout.root().to_path_buf()))
    }
}

impl Drop for RunSession {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Run did not shut down cleanly: {}", e);
        }
    }
}
