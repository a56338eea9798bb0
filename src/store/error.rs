//! Error types for keyed store operations

use std::collections::TryReserveError;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while writing to a keyed store
///
/// Absent keys are never an error: lookups and deletes report them as `None`
/// or [`Removal::Absent`](super::Removal::Absent).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Keys must carry at least one byte
    #[error("refusing to store an entry under an empty key")]
    EmptyKey,

    /// The bucket chain could not grow to hold a new entry
    ///
    /// The store is left exactly as it was before the insert.
    #[error("failed to allocate room for a new entry: {0}")]
    AllocationFailed(#[from] TryReserveError),
}
