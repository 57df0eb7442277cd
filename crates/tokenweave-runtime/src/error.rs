//! Runtime infrastructure errors

use thiserror::Error;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors surfaced by the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The pool has been shut down; no further tasks are accepted.
    #[error("worker pool is shut down")]
    PoolClosed,

    /// The task finished without producing a value (dropped or panicked).
    #[error("task was canceled before completion")]
    TaskCanceled,
}
