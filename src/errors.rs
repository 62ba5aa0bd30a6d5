//! Typed errors for tree operations.

use thiserror::Error;

/// Errors that tree operations return to the caller.
///
/// Two conditions are deliberately not modeled here. A weak reference whose
/// referent is gone is not an error: resolution returns `Option` and every
/// caller must handle `None`. Allocation failure is fatal (the process
/// aborts); it never surfaces as a recoverable value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("child index {index} out of range for {len} children")]
    ChildIndexOutOfRange { index: usize, len: usize },

    /// Access through a handle whose node has already been destroyed
    /// together with its owning subtree.
    #[error("node no longer exists in its tree")]
    StaleNode,
}

pub type TreeResult<T> = Result<T, TreeError>;
