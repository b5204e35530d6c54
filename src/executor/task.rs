//! Task representation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Scheduling priority of a task. Higher values run first.
///
/// Among tasks of equal priority the queue is FIFO by submission order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(i32);

impl Priority {
    /// The default priority, `Priority::new(0)`.
    pub const NORMAL: Priority = Priority(0);

    /// Create a priority from a raw level.
    pub const fn new(level: i32) -> Self {
        Priority(level)
    }

    /// The raw priority level.
    pub const fn level(self) -> i32 {
        self.0
    }
}

impl From<i32> for Priority {
    fn from(level: i32) -> Self {
        Priority(level)
    }
}

/// A unit of work the pool can run.
///
/// A task is two capabilities: it can be invoked once with no arguments,
/// and it reports a [`Priority`] that orders it against other queued tasks.
/// The pool owns a submitted task until the moment it runs.
///
/// Closures are submitted through the [`Task`] adapter (or
/// [`ThreadPool::execute`](crate::ThreadPool::execute)); custom task types
/// implement this trait directly.
pub trait Runnable: Send + 'static {
    /// Run the task, consuming it.
    fn run(self: Box<Self>);

    /// The priority used for queue ordering. Read once, at submission.
    fn priority(&self) -> Priority {
        Priority::NORMAL
    }
}

/// A [`Runnable`] wrapping a boxed closure.
pub struct Task {
    id: TaskId,
    func: Box<dyn FnOnce() + Send + 'static>,
    priority: Priority,
}

impl Task {
    /// Create a task with normal priority.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::with_priority(f, Priority::NORMAL)
    }

    /// Create a task with a specific priority.
    pub fn with_priority<F>(f: F, priority: Priority) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Task {
            id: TaskId::next(),
            func: Box::new(f),
            priority,
        }
    }

    /// The task's stable identifier.
    pub fn id(&self) -> TaskId {
        self.id
    }
}

impl Runnable for Task {
    fn run(self: Box<Self>) {
        (self.func)();
    }

    fn priority(&self) -> Priority {
        self.priority
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .finish()
    }
}
