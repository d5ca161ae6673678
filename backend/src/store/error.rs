//! Store-specific error types

use thiserror::Error;

/// Errors raised by an `IouStore` backend
///
/// None of these carry domain meaning; the service surfaces them as-is.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Query failed inside the database driver
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded back into a record
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Connection or schema setup failed
    #[error("Store setup failed: {0}")]
    Setup(String),

    /// Replace targeted an id with no row behind it
    #[error("No record to replace: {0}")]
    Missing(crate::models::IouId),
}
