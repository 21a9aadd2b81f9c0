//! Page filters and the export summary built from them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::{PaymentMethod, Transaction, TransactionKind};

/// Filter applied by the income, expense, and dashboard pages.
///
/// Every criterion is optional; an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Only this kind.
    pub kind: Option<TransactionKind>,
    /// Only this category (case-insensitive).
    pub category: Option<String>,
    /// Only this payment method.
    pub payment_method: Option<PaymentMethod>,
    /// Earliest date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest date, inclusive.
    pub to: Option<NaiveDate>,
    /// Case-insensitive substring of description or category.
    pub search: Option<String>,
}

impl TransactionFilter {
    /// Filter matching a single kind.
    #[must_use]
    pub fn for_kind(kind: TransactionKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Restricts to an inclusive date range.
    #[must_use]
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Restricts to a category.
    #[must_use]
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restricts to a payment method.
    #[must_use]
    pub fn paid_with(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    /// Restricts to a free-text search.
    #[must_use]
    pub fn searching(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    /// Returns true if the transaction passes every set criterion.
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.kind.is_some_and(|kind| kind != tx.kind) {
            return false;
        }
        if self
            .category
            .as_deref()
            .is_some_and(|c| !c.eq_ignore_ascii_case(&tx.category))
        {
            return false;
        }
        if self.payment_method.is_some_and(|m| m != tx.payment_method) {
            return false;
        }
        if self.from.is_some_and(|from| tx.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| tx.date > to) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                tx.category.to_lowercase().contains(&needle)
                    || tx
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }

    /// Returns the matching transactions, preserving input order.
    #[must_use]
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions.iter().filter(|tx| self.matches(tx)).collect()
    }
}

/// One line of an exported report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    /// Transaction date.
    pub date: NaiveDate,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Category label.
    pub category: String,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Description, empty when absent.
    pub description: String,
    /// Amount, zero when the row had none.
    pub amount: Decimal,
}

/// Rows plus the totals footer of an exported report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Report lines in input order.
    pub rows: Vec<ExportRow>,
    /// Sum of income rows.
    pub total_income: Decimal,
    /// Sum of expense rows.
    pub total_expense: Decimal,
    /// `total_income - total_expense`.
    pub net: Decimal,
    /// Number of rows.
    pub count: usize,
}

impl ExportSummary {
    /// Builds the report for an already-filtered list.
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut total_income = Decimal::ZERO;
        let mut total_expense = Decimal::ZERO;
        let rows: Vec<ExportRow> = transactions
            .into_iter()
            .map(|tx| {
                let amount = tx.amount_or_zero();
                match tx.kind {
                    TransactionKind::Income => {
                        total_income = total_income.saturating_add(amount);
                    }
                    TransactionKind::Expense => {
                        total_expense = total_expense.saturating_add(amount);
                    }
                }
                ExportRow {
                    date: tx.date,
                    kind: tx.kind,
                    category: tx.category.clone(),
                    payment_method: tx.payment_method,
                    description: tx.description.clone().unwrap_or_default(),
                    amount,
                }
            })
            .collect();

        Self {
            count: rows.len(),
            rows,
            total_income,
            total_expense,
            net: total_income.saturating_sub(total_expense),
        }
    }
}
