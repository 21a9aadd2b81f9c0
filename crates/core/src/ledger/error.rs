//! Ledger error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validation message bound to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as it appears in the input payload.
    pub field: String,
    /// Machine-readable rule code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input failed one or more field rules; submission is blocked.
    #[error("Invalid input: {}", describe(.0))]
    Validation(Vec<FieldError>),
}

impl LedgerError {
    /// Returns the field-level messages, if this is a validation error.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
        }
    }

    /// Returns the message for a single field, if it failed.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.field_errors()
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
