use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-run counters. Producers and the worker increment, anyone may read.
#[derive(Debug, Default)]
pub struct RunStats {
    frames: AtomicU64,
    samples: AtomicU64,
    dropped: AtomicU64,
    images_written: AtomicU64,
    write_errors: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sample(&self) {
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_image(&self) {
        self.images_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames: self.frames(),
            samples: self.samples(),
            dropped: self.dropped(),
            images_written: self.images_written.load(Ordering::Relaxed),
            write_errors: self.write_errors(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames: u64,
    pub samples: u64,
    pub dropped: u64,
    pub images_written: u64,
    pub write_errors: u64,
}

/// Periodic throughput line.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub frames_per_sec: f64,
    pub imu_per_sec: f64,
    pub dropped: u64,
    pub run_path: Option<PathBuf>,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = self
            .run_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not running".to_string());
        write!(
            f,
            "Frames/s: {:.0} | IMU/s: {:.0} | Dropped: {} | Run: {}",
            self.frames_per_sec, self.imu_per_sec, self.dropped, run
        )
    }
}

/// Turns counter deltas into rates at most once per interval.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    interval_ns: i64,
    last: Option<(i64, u64, u64)>,
}

impl StatusReporter {
    pub fn new(interval_ns: i64) -> Self {
        Self {
            interval_ns,
            last: None,
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    /// The first call only anchors; later calls report once `interval_ns` passed.
    pub fn poll(&mut self, now_ns: i64, stats: &RunStats, run_path: Option<PathBuf>) -> Option<StatusLine> {
        let frames = stats.frames();
        let samples = stats.samples();

        let Some((last_ns, last_frames, last_samples)) = self.last else {
            self.last = Some((now_ns, frames, samples));
            return None;
        };

        let elapsed_ns = now_ns - last_ns;
        if elapsed_ns < self.interval_ns || elapsed_ns <= 0 {
            return None;
        }
        self.last = Some((now_ns, frames, samples));

        let secs = elapsed_ns as f64 / 1e9;
        Some(StatusLine {
            frames_per_sec: frames.saturating_sub(last_frames) as f64 / secs,
            imu_per_sec: samples.saturating_sub(last_samples) as f64 / secs,
            dropped: stats.dropped(),
            run_path,
        })
    }
}
