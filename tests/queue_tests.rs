use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use vio_recorder::capture::clock::FrameStamp;
use vio_recorder::capture::tracking::Pose;
use vio_recorder::codec::planar::ImagePayload;
use vio_recorder::queue::{CaptureTask, FrameRecord, InertialLine, TaskQueue};
use vio_recorder::sim::synthetic_image;

fn frame_with_image(i: i64, released: &Arc<AtomicUsize>) -> CaptureTask {
    let counter = released.clone();
    let image = synthetic_image(8, 8, i as u8).on_release(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    CaptureTask::Frame(FrameRecord {
        stamp: FrameStamp::compute(i, i + 5),
        camera_ns: i,
        sensor_pose: Pose::IDENTITY,
        tracking_pose: Pose::IDENTITY,
        image: Some(ImagePayload::new(image, i + 5)),
    })
}

fn source_ns(task: &CaptureTask) -> i64 {
    match task {
        CaptureTask::Frame(record) => record.stamp.source_ns,
        CaptureTask::Inertial(line) => line.t_ns,
        CaptureTask::Text(_) => panic!("unexpected text artifact"),
    }
}

#[test]
fn test_overflow_drops_exactly_one_and_keeps_order() {
    let queue = TaskQueue::new(32);
    let released = Arc::new(AtomicUsize::new(0));
    let mut dropped = 0;

    for i in 0..33 {
        if let Err(rejected) = queue.offer(frame_with_image(i, &released)) {
            dropped += 1;
            assert_eq!(source_ns(&rejected), 32, "the newest task is the one rejected");
            rejected.release();
        }
    }

    assert_eq!(dropped, 1);
    assert_eq!(queue.len(), 32);
    assert!(queue.is_full());
    assert_eq!(released.load(Ordering::SeqCst), 1, "rejected image released once");

    let retained = queue.drain();
    let order: Vec<i64> = retained.iter().map(source_ns).collect();
    assert_eq!(order, (0..32).collect::<Vec<i64>>(), "FIFO order preserved");
    assert_eq!(released.load(Ordering::SeqCst), 1, "retained images still open");

    for task in retained {
        task.release();
    }
    assert_eq!(released.load(Ordering::SeqCst), 33, "every image released exactly once");
}

#[test]
fn test_dropping_task_releases_image() {
    let released = Arc::new(AtomicUsize::new(0));
    {
        let queue = TaskQueue::new(4);
        for i in 0..3 {
            assert!(queue.offer(frame_with_image(i, &released)).is_ok());
        }
    }
    assert_eq!(released.load(Ordering::SeqCst), 3, "queue teardown closes what it held");
}

#[test]
fn test_poll_on_empty_does_not_block() {
    let queue = TaskQueue::default();
    assert_eq!(queue.capacity(), 32);
    assert!(queue.poll().is_none());
    assert!(queue.is_empty());
}

#[test]
fn test_concurrent_producers_preserve_per_producer_order() {
    const PRODUCERS: i64 = 4;
    const PER_PRODUCER: i64 = 500;

    let queue = Arc::new(TaskQueue::new(32));
    let dropped = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = queue.clone();
            let dropped = dropped.clone();
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    let task = CaptureTask::Inertial(InertialLine {
                        t_ns: p * 1_000_000 + seq,
                        line: format!("{},{}\n", p, seq),
                    });
                    if let Err(rejected) = queue.offer(task) {
                        dropped.fetch_add(1, Ordering::SeqCst);
                        rejected.release();
                    }
                }
            })
        })
        .collect();

    let mut consumed = Vec::new();
    loop {
        let finished = handles.iter().all(|h| h.is_finished());
        match queue.poll() {
            Some(task) => consumed.push(source_ns(&task)),
            None if finished => break,
            None => thread::yield_now(),
        }
    }
    for h in handles {
        h.join().expect("producer panicked");
    }
    while let Some(task) = queue.poll() {
        consumed.push(source_ns(&task));
    }

    assert_eq!(
        consumed.len() + dropped.load(Ordering::SeqCst),
        (PRODUCERS * PER_PRODUCER) as usize,
        "every offer is either consumed or counted as dropped"
    );

    for p in 0..PRODUCERS {
        let seqs: Vec<i64> = consumed
            .iter()
            .filter(|t| **t / 1_000_000 == p)
            .map(|t| t % 1_000_000)
            .collect();
        assert!(seqs.windows(2).all(|w| w[0] < w[1]), "producer {} out of order", p);
    }
}
