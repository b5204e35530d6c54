//! Pool configuration.

use crate::error::{Error, Result};
use std::sync::OnceLock;

/// Process-wide hardware concurrency, queried once and cached.
static MAX_THREADS: OnceLock<usize> = OnceLock::new();

/// The maximum worker count this process supports.
///
/// Read from the OS on first use, read-only thereafter. A pool rejects any
/// thread count above this value with [`Error::Capacity`].
pub fn max_threads() -> usize {
    *MAX_THREADS.get_or_init(num_cpus::get)
}

/// Thread pool configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of worker threads. `None` means [`max_threads`].
    pub num_threads: Option<usize>,
    /// Whether `Drop` waits for the queue to drain before stopping workers.
    ///
    /// When `false`, dropping the pool discards any still-queued tasks.
    pub drain_on_finish: bool,
    /// Prefix for worker thread names.
    pub thread_name_prefix: String,
    /// Stack size for worker threads, or `None` for the platform default.
    pub stack_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: None,
            drain_on_finish: true,
            thread_name_prefix: "taskwell-worker".to_string(),
            stack_size: Some(2 * 1024 * 1024),
        }
    }
}

impl Config {
    /// Start building a configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Check the configuration against process limits.
    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.num_threads {
            if n == 0 {
                return Err(Error::config("need at least 1 thread"));
            }
            if n > max_threads() {
                return Err(Error::Capacity {
                    requested: n,
                    max: max_threads(),
                });
            }
        }

        if self.thread_name_prefix.is_empty() {
            return Err(Error::config("thread_name_prefix must not be empty"));
        }

        Ok(())
    }

    /// The worker count this configuration resolves to.
    pub fn worker_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(max_threads)
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder holding the default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the worker thread count.
    pub fn num_threads(mut self, n: usize) -> Self {
        self.config.num_threads = Some(n);
        self
    }

    /// Set whether `Drop` drains the queue before stopping workers.
    pub fn drain_on_finish(mut self, drain: bool) -> Self {
        self.config.drain_on_finish = drain;
        self
    }

    /// Set the worker thread name prefix.
    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker thread stack size.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
