// worker thread loop

use super::pool::Shared;
use super::registry::WorkerId;
use super::sink::{self, TaskFailure};
use super::task::Runnable;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

pub(crate) struct Worker {
    pub id: WorkerId,
    shared: Arc<Shared>,
}

impl Worker {
    pub fn new(id: WorkerId, shared: Arc<Shared>) -> Self {
        Self { id, shared }
    }

    // Runs until a stop token is claimed. Each cycle handles exactly one
    // signal from `actions`: a queued task, a stop token, or a stale wake
    // left over from a discard.
    pub fn run(self) {
        log::trace!("worker {} started", self.id);

        loop {
            // Idle wait: something happened (task pushed or stop requested).
            self.shared.actions.wait();

            // Pause gate. Holding a permit authorizes one dequeue attempt;
            // it is returned before the task body runs, so permits bound
            // dequeues, not parallelism.
            self.shared.run_permits.wait();

            // Stop beats work: an idle worker claims a pending removal
            // before looking at the queue.
            if self.shared.stop_tokens.try_wait() {
                self.shared.run_permits.post();
                break;
            }

            match self.shared.queue.pop() {
                Some(task) => {
                    self.shared.run_permits.post();
                    self.execute(task);
                }
                None => {
                    // Stale wake: the task behind this signal was already
                    // taken by another worker or discarded.
                    self.shared.run_permits.post();
                }
            }
        }

        self.shared.registry.retire(self.id);
        log::trace!("worker {} stopping", self.id);
        self.shared.stopped.post();
    }

    fn execute(&self, task: Box<dyn Runnable>) {
        let result = catch_unwind(AssertUnwindSafe(|| task.run()));

        if let Err(payload) = result {
            sink::report(TaskFailure::from_payload(payload, self.id));
        }
    }
}
