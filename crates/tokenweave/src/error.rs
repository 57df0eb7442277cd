//! Service lifecycle errors

use thiserror::Error;

/// Result type for service lifecycle operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from the process-wide service slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// `init` was called while a service instance is already published.
    #[error("placeholder service is already initialized")]
    AlreadyInitialized,

    /// `global` was called before `init` (or after `teardown`).
    #[error("placeholder service is not initialized")]
    NotInitialized,
}
