//! Process-wide sink for tasks that fail during execution.
//!
//! Submission and execution are decoupled in time, so a task failure cannot
//! be propagated to the `push` caller. Instead the worker catches the panic
//! at the execution boundary and reports it here; the worker itself keeps
//! running. Applications can install a hook to observe failures; without
//! one, failures are logged.

use crate::executor::registry::WorkerId;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Description of a task that panicked while running.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    /// The worker the task was running on.
    pub worker: WorkerId,
    /// The panic message, when one could be recovered from the payload.
    pub message: String,
}

impl TaskFailure {
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>, worker: WorkerId) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };

        Self { worker, message }
    }
}

type FailureHook = Box<dyn Fn(&TaskFailure) + Send + Sync>;

static HOOK: RwLock<Option<FailureHook>> = RwLock::new(None);
static FAILURE_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Install a process-wide hook invoked for every task failure.
///
/// Replaces any previously installed hook.
pub fn set_failure_hook<F>(hook: F)
where
    F: Fn(&TaskFailure) + Send + Sync + 'static,
{
    *HOOK.write() = Some(Box::new(hook));
}

/// Remove the installed hook, reverting to logging.
pub fn clear_failure_hook() {
    *HOOK.write() = None;
}

/// Total number of task failures reported since process start.
pub fn failure_count() -> usize {
    FAILURE_COUNT.load(Ordering::Relaxed)
}

pub(crate) fn report(failure: TaskFailure) {
    FAILURE_COUNT.fetch_add(1, Ordering::Relaxed);

    let hook = HOOK.read();
    match &*hook {
        Some(hook) => hook(&failure),
        None => log::error!(
            "task panicked on worker {}: {}",
            failure.worker,
            failure.message
        ),
    }
}
