use std::cell::Cell;

use vio_recorder::capture::clock::{ClockSynchronizer, FrameStamp, ManualClock, MonotonicClock};
use vio_recorder::capture::pacer::CapturePacer;
use vio_recorder::sim::synthetic_image;
use vio_recorder::{AcquireError, RecorderConfig};

const INTERVAL_30HZ: i64 = 1_000_000_000 / 30;

#[test]
fn test_offset_and_global_arithmetic() {
    let cases = [
        (1_000, 5_000),
        (5_000, 1_000),
        (0, 0),
        (123_456_789_012, 123_456_999_999),
        (-42, 17),
    ];

    for (src, now) in cases {
        let stamp = FrameStamp::compute(src, now);
        assert_eq!(stamp.offset_ns, now - src, "offset = now - src");
        assert_eq!(stamp.global_ns, src + stamp.offset_ns, "global = src + offset");
        assert_eq!(stamp.source_ns, src);
        assert_eq!(stamp.arrival_ns, now);
    }
}

#[test]
fn test_synchronizer_reads_clock_per_observation() {
    let clock = ManualClock::new(10_000);
    let sync = ClockSynchronizer::new(Box::new(clock.clone()));

    let first = sync.observe(9_000);
    assert_eq!(first.offset_ns, 1_000);

    // Clock domains drift: the next observation may land earlier on the global basis.
    clock.set(9_500);
    let second = sync.observe(9_400);
    assert_eq!(second.offset_ns, 100);
    assert!(second.global_ns < first.global_ns, "global timestamps are not forced monotonic");
    assert_eq!(sync.now_ns(), clock.now_ns());
}

fn run_ticks(pacer: &mut CapturePacer, tick_ns: i64, ticks: i64) -> usize {
    let mut captures = 0;
    for i in 1..=ticks {
        let t = i * tick_ns;
        if pacer.maybe_capture(t, || Ok(synthetic_image(4, 4, 0))).is_some() {
            captures += 1;
        }
    }
    captures
}

#[test]
fn test_pacer_rate_at_90hz_ticks() {
    let mut pacer = CapturePacer::new(RecorderConfig::default().capture_interval_ns());
    assert_eq!(pacer.interval_ns(), INTERVAL_30HZ);

    // 10 s of ticks at ~90 Hz
    let captures = run_ticks(&mut pacer, 11_111_111, 900);
    assert!(
        (299..=301).contains(&captures),
        "expected ~300 captures over 10 s, got {}",
        captures
    );
}

#[test]
fn test_pacer_rate_at_1khz_ticks() {
    let mut pacer = CapturePacer::new(RecorderConfig::default().capture_interval_ns());
    let captures = run_ticks(&mut pacer, 1_000_000, 1_000);
    assert!(
        (29..=31).contains(&captures),
        "expected ~30 captures over 1 s, got {}",
        captures
    );
}

#[test]
fn test_pacer_failure_never_moves_anchor() {
    let mut pacer = CapturePacer::new(RecorderConfig::default().capture_interval_ns());
    let attempts = Cell::new(0);

    for i in 0..100i64 {
        let t = 1_000_000_000 + i * 1_000_000;
        let payload = pacer.maybe_capture(t, || {
            attempts.set(attempts.get() + 1);
            Err(AcquireError::Failed("camera busy".into()))
        });
        assert!(payload.is_none());
    }

    assert_eq!(attempts.get(), 100, "every tick should retry after a failure");
    assert_eq!(pacer.last_capture_ns(), 0, "anchor must stay unset");
}

#[test]
fn test_pacer_retries_sub_interval_after_failure() {
    let mut pacer = CapturePacer::new(RecorderConfig::default().capture_interval_ns());
    let t0 = 1_000_000_000;

    assert!(pacer
        .maybe_capture(t0, || Err(AcquireError::NotYetAvailable))
        .is_none());

    // 1 ms later is well inside the interval, but the failed tick did not count.
    let payload = pacer
        .maybe_capture(t0 + 1_000_000, || Ok(synthetic_image(4, 4, 0)))
        .expect("retry should capture");
    assert_eq!(payload.global_ns(), t0 + 1_000_000);
    assert_eq!(pacer.last_capture_ns(), t0 + 1_000_000);

    // Now the gate is closed until a full interval has passed.
    let called = Cell::new(false);
    let skipped = pacer.maybe_capture(t0 + 2_000_000, || {
        called.set(true);
        Ok(synthetic_image(4, 4, 0))
    });
    assert!(skipped.is_none());
    assert!(!called.get(), "acquisition must not be attempted inside the interval");

    assert!(pacer
        .maybe_capture(t0 + 1_000_000 + INTERVAL_30HZ, || Ok(synthetic_image(4, 4, 0)))
        .is_some());
}
