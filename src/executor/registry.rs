//! Worker bookkeeping.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

/// Stable identity of a worker thread.
pub type WorkerId = usize;

static NEXT_WORKER_ID: AtomicUsize = AtomicUsize::new(0);

pub(crate) fn next_worker_id() -> WorkerId {
    NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Map from worker identity to its owned join handle, plus the handles of
/// workers that have claimed a stop token and are on their way out.
///
/// A worker cannot join itself, so on self-removal it moves its handle from
/// the live map to the retired list; the controller that requested the
/// removal joins the retired handles after the exit handshake.
pub(crate) struct WorkerRegistry {
    workers: Mutex<HashMap<WorkerId, JoinHandle<()>>>,
    retired: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self {
            workers: Mutex::new(HashMap::new()),
            retired: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, id: WorkerId, handle: JoinHandle<()>) {
        self.workers.lock().insert(id, handle);
    }

    /// Move `id`'s handle to the retired list. Called by the worker itself.
    pub fn retire(&self, id: WorkerId) {
        let handle = self.workers.lock().remove(&id);
        if let Some(handle) = handle {
            self.retired.lock().push(handle);
        }
    }

    /// Take every retired handle for joining.
    pub fn drain_retired(&self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut *self.retired.lock())
    }

    /// Number of live workers.
    pub fn len(&self) -> usize {
        self.workers.lock().len()
    }
}
