//! Task execution infrastructure.
//!
//! This module provides the thread pool, the worker loop that drives it,
//! task representation, worker bookkeeping, and the process-wide sink for
//! task failures.

pub mod pool;
pub mod registry;
pub mod sink;
pub mod task;

pub(crate) mod worker;

pub use pool::{PoolState, ThreadPool};
pub use registry::WorkerId;
pub use task::{Priority, Runnable, Task, TaskId};
