//! TASKWELL - a priority-ordered thread pool with a controlled lifecycle.
//!
//! A fixed-but-resizable set of worker threads consumes a shared,
//! priority-ordered queue of tasks. The pool supports pausing at task
//! boundaries, resuming, growing and shrinking the worker set, and a
//! drain-and-stop shutdown. All coordination is built on one primitive:
//! a counting [`Semaphore`](sync::Semaphore).
//!
//! # Quick Start
//!
//! ```no_run
//! use taskwell::prelude::*;
//!
//! let pool = ThreadPool::with_threads(4).unwrap();
//!
//! pool.execute(|| println!("hello from a worker")).unwrap();
//! pool.execute_with_priority(|| println!("me first"), Priority::new(10)).unwrap();
//!
//! // Wait for every queued task to run, then stop the workers.
//! pool.finish(true).unwrap();
//! ```
//!
//! # Guarantees
//!
//! - Tasks are dequeued strictly by descending priority; equal priorities
//!   run in submission order.
//! - [`ThreadPool::pause`] never preempts an in-flight task; it takes
//!   effect at task boundaries only.
//! - `finish(true)` runs every queued task exactly once before returning;
//!   `finish(false)` discards whatever is still queued.
//! - A panicking task is isolated: the failure is reported to the
//!   process-wide [failure sink](executor::sink) and the worker keeps going.

#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod holder;
pub mod prelude;
pub mod scheduler;
pub mod sync;

// Re-export key types at crate root
pub use config::{max_threads, Config, ConfigBuilder};
pub use error::{Error, Result};
pub use executor::sink::{clear_failure_hook, failure_count, set_failure_hook, TaskFailure};
pub use executor::{PoolState, Priority, Runnable, Task, TaskId, ThreadPool};
pub use holder::Holder;
pub use sync::Semaphore;
