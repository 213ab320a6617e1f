//! Error type shared by the slot table and the manager.

use thiserror::Error;

/// Errors returned by [`IdManager`](crate::IdManager) operations.
///
/// All variants are recoverable: the table is left unchanged whenever one
/// of them is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdError {
    /// Every key other than the cursor is in use.
    #[error("no more available values")]
    NoMoreAvailableValues,
    #[error("no value with id {0}")]
    NoSuchKey(u16),
    /// The key is reserved but nothing has been bound to it yet.
    #[error("value with id {0} is not set")]
    ValueNotSet(u16),
    #[error("value with id {0} already exists")]
    AlreadyExists(u16),
    #[error("id {0} is not reserved")]
    NotReserved(u16),
}

/// Result type for id manager operations.
pub type Result<T> = std::result::Result<T, IdError>;
