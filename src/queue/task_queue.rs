use crossbeam::queue::ArrayQueue;

use super::task::CaptureTask;

pub const DEFAULT_CAPACITY: usize = 32;

/// Bounded FIFO shared by every producer and the single I/O worker.
///
/// `offer` never blocks. A full queue hands the task back so the caller can
/// count the drop and release whatever the task owns.
#[derive(Debug)]
pub struct TaskQueue {
    inner: ArrayQueue<CaptureTask>,
}

impl TaskQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: ArrayQueue::new(capacity.max(1)),
        }
    }

    pub fn offer(&self, task: CaptureTask) -> Result<(), CaptureTask> {
        self.inner.push(task)
    }

    pub fn poll(&self) -> Option<CaptureTask> {
        self.inner.pop()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Removes everything still queued, oldest first.
    pub fn drain(&self) -> Vec<CaptureTask> {
        let mut tasks = Vec::with_capacity(self.inner.len());
        while let Some(task) = self.inner.pop() {
            tasks.push(task);
        }
        tasks
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
