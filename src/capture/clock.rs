use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Local monotonic time source observed when an update arrives.
pub trait MonotonicClock: Send {
    fn now_ns(&self) -> i64;
}

/// Nanoseconds elapsed since the clock was created.
#[derive(Debug, Clone)]
pub struct ElapsedClock {
    origin: Instant,
}

impl ElapsedClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for ElapsedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for ElapsedClock {
    fn now_ns(&self) -> i64 {
        self.origin.elapsed().as_nanos() as i64
    }
}

/// Hand-driven clock for replay and tests. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ns: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ns)),
        }
    }

    pub fn set(&self, t_ns: i64) {
        self.now.store(t_ns, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ns: i64) {
        self.now.fetch_add(delta_ns, Ordering::SeqCst);
    }
}

impl MonotonicClock for ManualClock {
    fn now_ns(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Timestamps of one observed frame. The offset is kept raw, never smoothed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStamp {
    pub source_ns: i64,
    pub arrival_ns: i64,
    pub offset_ns: i64,
    pub global_ns: i64,
}

impl FrameStamp {
    pub fn compute(source_ns: i64, arrival_ns: i64) -> Self {
        let offset_ns = arrival_ns.wrapping_sub(source_ns);
        Self {
            source_ns,
            arrival_ns,
            offset_ns,
            global_ns: source_ns.wrapping_add(offset_ns),
        }
    }
}

/// Maps tracker timestamps onto the local monotonic basis.
///
/// `global_ns` is not guaranteed to increase between calls.
pub struct ClockSynchronizer {
    clock: Box<dyn MonotonicClock>,
}

impl ClockSynchronizer {
    pub fn new(clock: Box<dyn MonotonicClock>) -> Self {
        Self { clock }
    }

    pub fn now_ns(&self) -> i64 {
        self.clock.now_ns()
    }

    pub fn observe(&self, source_ns: i64) -> FrameStamp {
        FrameStamp::compute(source_ns, self.clock.now_ns())
    }
}
