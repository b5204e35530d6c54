//! Priority-ordered task queue.

use crate::executor::task::{Priority, Runnable};
use crate::sync::Semaphore;
use parking_lot::Mutex;
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};

/// One queued task plus the keys that order it.
///
/// Priority is snapshotted at submission; the sequence number breaks ties
/// so that equal-priority tasks pop in FIFO order.
struct Entry {
    task: Box<dyn Runnable>,
    priority: Priority,
    seq: u64,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // Max-heap: higher priority first, then earlier submission.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A mutex-guarded multiset of pending tasks, ordered by priority.
///
/// The lock is held only for the push/pop critical section, never across
/// task execution.
///
/// The queue owns its emptiness signal: a semaphore holding exactly one
/// unit while the queue is empty and zero otherwise (except while a
/// drain-waiter has consumed it). Both transitions are performed under the
/// heap lock, so empty->non-empty and non-empty->empty strictly alternate
/// and the unit is always present when a push consumes it. Doing either
/// transition outside the lock lets two racing pushers defer their consume
/// past a draining pop and strand the signal at zero with an empty queue,
/// hanging the drain-waiter.
pub(crate) struct TaskQueue {
    heap: Mutex<BinaryHeap<Entry>>,
    seq: AtomicU64,
    // The queue starts empty, so the signal starts present.
    empty: Semaphore,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            seq: AtomicU64::new(0),
            empty: Semaphore::new(1),
        }
    }

    pub fn push(&self, task: Box<dyn Runnable>) {
        let priority = task.priority();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let mut heap = self.heap.lock();
        if heap.is_empty() {
            // Absence is not an error: a drain-waiter may hold the unit.
            self.empty.try_wait();
        }
        heap.push(Entry {
            task,
            priority,
            seq,
        });
    }

    pub fn pop(&self) -> Option<Box<dyn Runnable>> {
        let mut heap = self.heap.lock();
        let entry = heap.pop()?;
        if heap.is_empty() {
            self.empty.post();
        }
        Some(entry.task)
    }

    /// Drop every pending task, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut heap = self.heap.lock();
        let discarded = heap.len();
        if discarded > 0 {
            heap.clear();
            self.empty.post();
        }
        discarded
    }

    /// Block until the queue has been fully drained.
    ///
    /// Consumes the emptiness signal; a subsequent push restores the
    /// invariant on the next non-empty->empty transition.
    pub fn wait_until_empty(&self) {
        self.empty.wait();
    }

    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.lock().is_empty()
    }
}
