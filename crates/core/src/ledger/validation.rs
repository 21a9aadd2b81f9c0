//! Form validation for ledger writes.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use super::error::{FieldError, LedgerError};
use super::transaction::TransactionKind;
use super::types::TransactionInput;

/// Validates a transaction input before it is sent to the remote store.
///
/// Runs the declarative field rules, then the cross-field rules. All failures
/// are collected so the form can show every message at once.
///
/// # Errors
///
/// Returns `LedgerError::Validation` with one entry per failed rule.
pub fn validate_input(input: &TransactionInput) -> Result<(), LedgerError> {
    let mut errors = input.validate().err().unwrap_or_else(ValidationErrors::new);

    if input.customer_id.is_some() && input.kind == TransactionKind::Expense {
        errors.add(
            "customer_id",
            ValidationError::new("customer_income_only")
                .with_message(Cow::Borrowed("Only income can reference a customer")),
        );
    }

    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| FieldError {
                field: field.clone(),
                code: e.code.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map_or_else(|| e.code.to_string(), ToString::to_string),
            })
        })
        .collect();

    if field_errors.is_empty() {
        return Ok(());
    }

    field_errors.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
    Err(LedgerError::Validation(field_errors))
}
