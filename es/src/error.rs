//! Entity store error types

use thiserror::Error;

/// Errors raised by an entity backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Table not found: {table}")]
    TableNotFound { table: String },

    #[error("Backend error: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Check if this error means the table itself is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::TableNotFound { .. })
    }
}
