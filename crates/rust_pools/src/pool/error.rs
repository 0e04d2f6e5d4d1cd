//! Pool error types

use crate::foundation::collections::Entity;
use thiserror::Error;

/// Errors surfaced by every pool kind
///
/// Nothing is retried internally; each failure is reported to the caller of
/// the operation that hit it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A mutating operation was called after the pool was disposed
    #[error("{pool} has been disposed")]
    Disposed {
        /// Kind of pool that was disposed
        pool: &'static str,
    },

    /// A required argument was missing, or an entity handle no longer
    /// refers to a live entity
    #[error("required argument `{name}` is missing or no longer alive")]
    NullArgument {
        /// Name of the offending argument
        name: &'static str,
    },

    /// An instance was returned to the shared registry without having been
    /// rented from it
    #[error("instance {instance:?} is not rented from the shared registry")]
    UnknownInstance {
        /// The instance that has no recorded owner
        instance: Entity,
    },

    /// A suspending creation was aborted by its cancellation token
    #[error("instance creation was cancelled")]
    Cancelled,

    /// An asynchronous factory or loader failed to produce an instance
    #[error("instance creation failed: {0}")]
    Creation(String),
}

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;
