//! Input types for creating and editing transactions.

use std::borrow::Cow;

use biztrack_shared::types::CustomerId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::transaction::{PaymentMethod, TransactionKind};

/// Maximum length of a category label.
pub const MAX_CATEGORY_LEN: usize = 64;

/// Payload submitted by the income/expense forms.
///
/// Field rules live on the struct; cross-field rules live in
/// [`validate_input`](super::validation::validate_input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TransactionInput {
    /// Income or expense.
    pub kind: TransactionKind,
    /// Calendar date of the transaction.
    pub date: NaiveDate,
    /// Amount, must be greater than zero.
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
    /// Category label.
    #[validate(custom(function = "validate_category"))]
    pub category: String,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Optional free text.
    #[validate(length(
        max = 500,
        message = "Description must be at most 500 characters"
    ))]
    pub description: Option<String>,
    /// Customer reference, income only.
    pub customer_id: Option<CustomerId>,
}

impl TransactionInput {
    /// Creates an input with no description or customer.
    #[must_use]
    pub fn new(
        kind: TransactionKind,
        date: NaiveDate,
        amount: Decimal,
        category: impl Into<String>,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            kind,
            date,
            amount,
            category: category.into(),
            payment_method,
            description: None,
            customer_id: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the customer reference.
    #[must_use]
    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }
}

fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("amount_not_positive")
            .with_message(Cow::Borrowed("Amount must be greater than zero")))
    }
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("category_required")
            .with_message(Cow::Borrowed("Category is required")));
    }
    if trimmed.chars().count() > MAX_CATEGORY_LEN {
        return Err(ValidationError::new("category_too_long")
            .with_message(Cow::Borrowed("Category must be at most 64 characters")));
    }
    Ok(())
}
