/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by pool construction and control operations.
///
/// The synchronization primitives themselves never fail; everything that can
/// go wrong is a control-plane misuse or a resource limit, reported here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Requested more workers than the machine can run in parallel.
    #[error("thread count {requested} exceeds available parallelism ({max})")]
    Capacity {
        /// The count the caller asked for.
        requested: usize,
        /// The process-wide cached hardware concurrency.
        max: usize,
    },

    /// A control operation was invoked after `finish`.
    #[error("thread pool already finished")]
    Finished,

    /// `set_thread_count` was called while the pool was paused.
    ///
    /// Pause drains exactly one run permit per worker; resizing during that
    /// window would corrupt the permit accounting, so it is rejected.
    #[error("cannot resize a paused pool; resume it first")]
    ResizeWhilePaused,

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Spawning a worker thread failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}
