//! One-stop import for the common surface.

pub use crate::config::{max_threads, Config, ConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::executor::{PoolState, Priority, Runnable, Task, ThreadPool};
pub use crate::holder::Holder;
pub use crate::sync::Semaphore;
