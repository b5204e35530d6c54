//! Lazy single-instance holder.
//!
//! A trivial container for a shared service: the instance is built on first
//! access and lives for the holder's lifetime. Tasks that close over the
//! held value are responsible for synchronizing their own mutations.

use std::sync::OnceLock;

/// A const-constructible container holding at most one lazily-built `T`.
///
/// ```
/// use taskwell::Holder;
///
/// #[derive(Default)]
/// struct Registry(std::sync::Mutex<Vec<String>>);
///
/// static REGISTRY: Holder<Registry> = Holder::new();
///
/// REGISTRY.get().0.lock().unwrap().push("service".to_string());
/// ```
#[derive(Debug)]
pub struct Holder<T> {
    cell: OnceLock<T>,
}

impl<T: Default> Holder<T> {
    /// Create an empty holder. Usable in `static` position.
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// The held instance, built via `T::default` on first access.
    pub fn get(&self) -> &T {
        self.cell.get_or_init(T::default)
    }
}

impl<T: Default> Default for Holder<T> {
    fn default() -> Self {
        Self::new()
    }
}
