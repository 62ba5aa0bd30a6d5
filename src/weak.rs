//! Non-owning references that must be resolved before use.

use std::fmt;
use std::sync::{Arc, Weak};

/// A non-owning reference to a shared entity.
///
/// Holding a `WeakRef` never extends the referent's lifetime. Before use it
/// must be resolved to a temporary strong reference with
/// [`resolve`](WeakRef::resolve), which reports `None` once no strong
/// references remain anywhere.
pub struct WeakRef<T> {
    inner: Weak<T>,
}

impl<T> WeakRef<T> {
    /// A reference to no entity. Always resolves to `None`.
    pub fn null() -> Self {
        Self { inner: Weak::new() }
    }

    /// Attempts to upgrade to a strong reference.
    ///
    /// The result is a snapshot, not a guarantee: a referent that resolves
    /// here may lose its last strong reference elsewhere immediately after
    /// this call returns. What the caller does own is the returned `Arc`,
    /// which keeps the entity alive for as long as the caller holds it.
    pub fn resolve(&self) -> Option<Arc<T>> {
        self.inner.upgrade()
    }

    /// Current number of strong references, for diagnostics and tests.
    ///
    /// Zero means [`resolve`](WeakRef::resolve) will fail.
    pub fn strong_count(&self) -> usize {
        self.inner.strong_count()
    }

    pub(crate) fn from_weak(inner: Weak<T>) -> Self {
        Self { inner }
    }
}

impl<T> From<&Arc<T>> for WeakRef<T> {
    fn from(strong: &Arc<T>) -> Self {
        Self {
            inner: Arc::downgrade(strong),
        }
    }
}

// Manual impls: a handle is cloneable and defaultable regardless of `T`.

impl<T> Clone for WeakRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for WeakRef<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> fmt::Debug for WeakRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRef")
            .field("strong_count", &self.strong_count())
            .finish()
    }
}
