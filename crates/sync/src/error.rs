//! Sync error types.

use std::time::Duration;

use biztrack_core::ledger::LedgerError;
use biztrack_shared::AppError;
use biztrack_shared::types::TransactionId;
use thiserror::Error;

/// Errors from the remote ledger, the refresh loop, and session writes.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Input was rejected before reaching the backend.
    #[error(transparent)]
    Validation(#[from] LedgerError),

    /// Backend reported a failure or could not be reached.
    #[error("Remote ledger error: {0}")]
    Remote(String),

    /// A bounded call did not finish in time.
    #[error("Remote call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Record does not exist in the backend.
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    /// Session settings are unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<AppError> for SyncError {
    fn from(err: AppError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Validation(e) => Self::Validation(e.to_string()),
            SyncError::Remote(msg) => Self::ExternalService(msg),
            SyncError::Timeout(limit) => Self::Timeout(format!("{}s", limit.as_secs())),
            SyncError::NotFound(id) => Self::NotFound(format!("transaction {id}")),
            SyncError::Configuration(msg) => Self::Configuration(msg),
        }
    }
}
