//! Counting semaphore.
//!
//! The single building block the thread pool is assembled from. The counter
//! never goes negative: every successful [`wait`](Semaphore::wait),
//! [`try_wait`](Semaphore::try_wait) or [`timed_wait`](Semaphore::timed_wait)
//! is paired with exactly one prior or concurrent posted unit.

use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// A counting semaphore built on a mutex and a condition variable.
///
/// Not clonable: a semaphore is a logical resource with identity, and
/// copying one would duplicate its units. Share it behind an `Arc` instead.
///
/// ```
/// use taskwell::Semaphore;
///
/// let sem = Semaphore::new(0);
/// assert!(!sem.try_wait());
/// sem.post();
/// assert!(sem.try_wait());
/// ```
#[derive(Debug)]
pub struct Semaphore {
    count: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Create a semaphore holding `initial` units.
    pub const fn new(initial: usize) -> Self {
        Self {
            count: Mutex::new(initial),
            available: Condvar::new(),
        }
    }

    /// Add one unit to the counter, waking blocked waiters.
    pub fn post(&self) {
        self.post_many(1);
    }

    /// Add `n` units to the counter atomically.
    ///
    /// All blocked waiters are woken so each can re-check eligibility;
    /// at most `n` of them will succeed before the counter runs dry again.
    pub fn post_many(&self, n: usize) {
        let mut count = self.count.lock();
        *count += n;
        self.available.notify_all();
    }

    /// Block until a unit is available, then consume it.
    ///
    /// Blocks indefinitely if no unit is ever posted; avoiding permanent
    /// starvation is the caller's responsibility.
    pub fn wait(&self) {
        let mut count = self.count.lock();
        self.available.wait_while(&mut count, |c| *c == 0);
        *count -= 1;
    }

    /// Consume a unit if one is available right now.
    ///
    /// Equivalent to [`timed_wait`](Self::timed_wait) with a zero timeout.
    /// Returns `false` immediately when the counter is zero.
    pub fn try_wait(&self) -> bool {
        let mut count = self.count.lock();
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    /// Block up to `timeout` for a unit, consuming it on success.
    ///
    /// Returns `false` on timeout, leaving the counter unchanged.
    pub fn timed_wait(&self, timeout: Duration) -> bool {
        let mut count = self.count.lock();
        let result = self
            .available
            .wait_while_for(&mut count, |c| *c == 0, timeout);
        // A unit posted right at the deadline is still claimable.
        if result.timed_out() && *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }
}
