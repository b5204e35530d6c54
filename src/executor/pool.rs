//! The thread pool and its lifecycle state machine.

use super::registry::{next_worker_id, WorkerRegistry};
use super::task::{Priority, Runnable, Task};
use super::worker::Worker;
use crate::config::{max_threads, Config};
use crate::error::{Error, Result};
use crate::scheduler::TaskQueue;
use crate::sync::Semaphore;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

/// Lifecycle state of a [`ThreadPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PoolState {
    /// Workers pull and execute tasks.
    Running = 0,
    /// Workers finish in-flight tasks but start no new ones.
    Paused = 1,
    /// Terminal: workers are stopped and joined; submissions fail.
    Finished = 2,
}

impl PoolState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => PoolState::Running,
            1 => PoolState::Paused,
            _ => PoolState::Finished,
        }
    }
}

/// State shared between the pool handle and its workers.
pub(crate) struct Shared {
    /// Authoritative lifecycle state. Transitions happen only under
    /// `control`; the atomic lets `push` and `size` read it cheaply.
    state: AtomicU8,
    /// Serializes pause/resume/finish/resize against each other.
    control: Mutex<()>,
    /// Pending tasks. Owns the queue-empty signal `finish(true)` drains on.
    pub queue: TaskQueue,
    pub registry: WorkerRegistry,
    /// One unit per pending event: a queued task or a stop token.
    pub actions: Semaphore,
    /// Outstanding "please stop" tokens; any idle worker may claim one.
    pub stop_tokens: Semaphore,
    /// The pause gate. Invariant outside control operations: total units
    /// (free plus transiently held) equals the worker count.
    pub run_permits: Semaphore,
    /// Exit handshake: each stopping worker posts one unit after retiring.
    pub stopped: Semaphore,
}

impl Shared {
    fn state(&self) -> PoolState {
        PoolState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: PoolState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

/// A fixed-but-resizable pool of worker threads consuming a shared
/// priority-ordered task queue.
///
/// Tasks run strictly in descending priority order among those concurrently
/// queued, FIFO among equals. The pool can be paused and resumed at task
/// boundaries, resized, and shut down with or without draining the queue.
///
/// Control operations ([`pause`](Self::pause), [`resume`](Self::resume),
/// [`finish`](Self::finish), [`set_thread_count`](Self::set_thread_count))
/// are serialized internally and may be called from any thread;
/// [`push`](Self::push) and [`size`](Self::size) never block on them.
pub struct ThreadPool {
    shared: Arc<Shared>,
    config: Config,
}

impl ThreadPool {
    /// Create a pool with one worker per available core.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Create a pool with exactly `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self> {
        Self::with_config(Config::builder().num_threads(threads).build()?)
    }

    /// Create a pool from a full configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let threads = config.worker_threads();

        let shared = Arc::new(Shared {
            state: AtomicU8::new(PoolState::Running as u8),
            control: Mutex::new(()),
            queue: TaskQueue::new(),
            registry: WorkerRegistry::new(),
            actions: Semaphore::new(0),
            stop_tokens: Semaphore::new(0),
            run_permits: Semaphore::new(0),
            stopped: Semaphore::new(0),
        });

        let pool = Self { shared, config };

        {
            let _control = pool.shared.control.lock();
            pool.add_threads(threads)?;
        }

        log::debug!("pool started with {} workers", threads);
        Ok(pool)
    }

    /// Submit a task for execution.
    ///
    /// The pool takes ownership; the task runs exactly once unless it is
    /// discarded by `finish(false)`. Fails only after [`finish`](Self::finish).
    pub fn push<T: Runnable>(&self, task: T) -> Result<()> {
        self.push_boxed(Box::new(task))
    }

    /// Submit an already-boxed task.
    pub fn push_boxed(&self, task: Box<dyn Runnable>) -> Result<()> {
        if self.shared.state() == PoolState::Finished {
            return Err(Error::Finished);
        }

        // The queue updates its own emptiness signal under its lock.
        self.shared.queue.push(task);
        self.shared.actions.post();
        Ok(())
    }

    /// Submit a closure with normal priority.
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(Task::new(f))
    }

    /// Submit a closure with a specific priority.
    pub fn execute_with_priority<F>(&self, f: F, priority: Priority) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(Task::with_priority(f, priority))
    }

    /// Stop workers from starting new tasks.
    ///
    /// Blocks until every worker has reached a task boundary: once `pause`
    /// returns, no new task starts until [`resume`](Self::resume). Tasks
    /// already executing are never preempted and run to completion. A
    /// no-op on an already-paused pool.
    pub fn pause(&self) -> Result<()> {
        let _control = self.shared.control.lock();
        match self.shared.state() {
            PoolState::Paused => return Ok(()),
            PoolState::Finished => return Err(Error::Finished),
            PoolState::Running => {}
        }

        // Drain one permit per worker. Idle workers hold no permit, and a
        // worker holds one only across a dequeue attempt, so this settles
        // as soon as in-flight dequeues finish.
        let workers = self.shared.registry.len();
        for _ in 0..workers {
            self.shared.run_permits.wait();
        }

        self.shared.set_state(PoolState::Paused);
        log::debug!("pool paused ({} permits drained)", workers);
        Ok(())
    }

    /// Allow paused workers to pull tasks again. A no-op when running.
    pub fn resume(&self) -> Result<()> {
        let _control = self.shared.control.lock();
        match self.shared.state() {
            PoolState::Running => return Ok(()),
            PoolState::Finished => return Err(Error::Finished),
            PoolState::Paused => {}
        }

        self.resume_locked();
        Ok(())
    }

    /// Shut the pool down and join every worker.
    ///
    /// With `wait_for_drain`, blocks until the queue has been fully drained
    /// and every executed task has completed. Without it, still-queued tasks
    /// are discarded and never run; this is the documented data-loss path
    /// for fast shutdown. Either way the pool ends [`PoolState::Finished`]
    /// and later control calls and submissions fail.
    pub fn finish(&self, wait_for_drain: bool) -> Result<()> {
        let _control = self.shared.control.lock();
        if self.shared.state() == PoolState::Finished {
            return Err(Error::Finished);
        }

        if !wait_for_drain {
            // Discard before waking anyone, so a paused pool cannot sneak
            // a doomed task into execution.
            let discarded = self.shared.queue.clear();
            if discarded > 0 {
                log::warn!("discarding {} queued tasks", discarded);
            }
        }

        // Paused workers still need to make progress toward stopping.
        if self.shared.state() == PoolState::Paused {
            self.resume_locked();
        }

        if wait_for_drain {
            self.shared.queue.wait_until_empty();
        }

        self.shared.set_state(PoolState::Finished);
        self.remove_threads(self.shared.registry.len());
        log::debug!("pool finished (drained: {})", wait_for_drain);
        Ok(())
    }

    /// Grow or shrink the worker set to exactly `threads`.
    ///
    /// Fails on a finished pool, on a paused pool, for `threads == 0`, and
    /// with [`Error::Capacity`] when `threads` exceeds [`max_threads`].
    /// Which workers exit on a shrink is unspecified.
    pub fn set_thread_count(&self, threads: usize) -> Result<()> {
        let _control = self.shared.control.lock();
        match self.shared.state() {
            PoolState::Finished => return Err(Error::Finished),
            PoolState::Paused => return Err(Error::ResizeWhilePaused),
            PoolState::Running => {}
        }

        if threads == 0 {
            return Err(Error::config("need at least 1 thread"));
        }
        if threads > max_threads() {
            return Err(Error::Capacity {
                requested: threads,
                max: max_threads(),
            });
        }

        let current = self.shared.registry.len();
        if threads > current {
            self.add_threads(threads - current)?;
        } else if threads < current {
            self.remove_threads(current - threads);
        }

        Ok(())
    }

    /// Current worker count. Best-effort under concurrent resizing.
    pub fn size(&self) -> usize {
        self.shared.registry.len()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.shared.state()
    }

    /// The configuration this pool was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // Restore one permit per worker. Caller holds the control lock and has
    // checked the state is Paused.
    fn resume_locked(&self) {
        let workers = self.shared.registry.len();
        self.shared.run_permits.post_many(workers);
        self.shared.set_state(PoolState::Running);
        log::debug!("pool resumed ({} permits restored)", workers);
    }

    // Spawn `n` workers, registering each and granting its run permit.
    // Caller holds the control lock.
    fn add_threads(&self, n: usize) -> Result<()> {
        for _ in 0..n {
            let id = next_worker_id();
            let worker = Worker::new(id, Arc::clone(&self.shared));
            let name = format!("{}-{}", self.config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);
            if let Some(stack_size) = self.config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let handle = builder.spawn(move || worker.run())?;
            self.shared.registry.insert(id, handle);

            // Granting the permit per spawned worker keeps the permit/worker
            // invariant intact even if a later spawn in this batch fails.
            self.shared.run_permits.post();
        }

        Ok(())
    }

    // Stop `n` workers and join them. Which `n` exit is whichever claim the
    // tokens first. Caller holds the control lock.
    fn remove_threads(&self, n: usize) {
        if n == 0 {
            return;
        }

        self.shared.stop_tokens.post_many(n);
        self.shared.actions.post_many(n);

        // Wait for n workers to retire themselves from the registry.
        for _ in 0..n {
            self.shared.stopped.wait();
        }

        // Each stopping worker returned the permit it held; reclaim those
        // units so the permit count tracks the shrunken worker set.
        for _ in 0..n {
            self.shared.run_permits.wait();
        }

        for handle in self.shared.registry.drain_retired() {
            let _ = handle.join();
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if self.shared.state() != PoolState::Finished {
            let _ = self.finish(self.config.drain_on_finish);
        }
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("state", &self.state())
            .field("workers", &self.size())
            .field("queued", &self.shared.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running_with_requested_size() {
        let pool = ThreadPool::with_threads(1).unwrap();
        assert_eq!(pool.state(), PoolState::Running);
        assert_eq!(pool.size(), 1);
        pool.finish(true).unwrap();
        assert_eq!(pool.size(), 0);
    }

    #[test]
    fn push_fails_after_finish() {
        let pool = ThreadPool::with_threads(1).unwrap();
        pool.finish(true).unwrap();
        assert!(matches!(pool.execute(|| {}), Err(Error::Finished)));
    }

    #[test]
    fn control_calls_fail_after_finish() {
        let pool = ThreadPool::with_threads(1).unwrap();
        pool.finish(true).unwrap();
        assert!(matches!(pool.pause(), Err(Error::Finished)));
        assert!(matches!(pool.resume(), Err(Error::Finished)));
        assert!(matches!(pool.finish(true), Err(Error::Finished)));
        assert!(matches!(pool.set_thread_count(1), Err(Error::Finished)));
        assert_eq!(pool.state(), PoolState::Finished);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let pool = ThreadPool::with_threads(2.min(max_threads())).unwrap();
        assert!(pool.resume().is_ok()); // already running
        pool.pause().unwrap();
        assert!(pool.pause().is_ok()); // already paused
        assert_eq!(pool.state(), PoolState::Paused);
        pool.resume().unwrap();
        assert_eq!(pool.state(), PoolState::Running);
        pool.finish(true).unwrap();
    }

    #[test]
    fn resize_rejected_while_paused() {
        let pool = ThreadPool::with_threads(1).unwrap();
        pool.pause().unwrap();
        assert!(matches!(
            pool.set_thread_count(1),
            Err(Error::ResizeWhilePaused)
        ));
        pool.resume().unwrap();
        pool.finish(true).unwrap();
    }

    #[test]
    fn resize_rejects_zero_and_over_capacity() {
        let pool = ThreadPool::with_threads(1).unwrap();
        assert!(matches!(pool.set_thread_count(0), Err(Error::Config(_))));
        assert!(matches!(
            pool.set_thread_count(max_threads() + 1),
            Err(Error::Capacity { .. })
        ));
        assert_eq!(pool.size(), 1);
        pool.finish(true).unwrap();
    }

    #[test]
    fn drop_finishes_the_pool() {
        let pool = ThreadPool::with_threads(2.min(max_threads())).unwrap();
        pool.execute(|| {}).unwrap();
        drop(pool); // must not hang: default config drains on drop
    }
}
