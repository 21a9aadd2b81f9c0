//! Income and expense records as mirrored from the remote store.

use std::str::FromStr;

use biztrack_shared::types::{BusinessId, CustomerId, TransactionId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

/// Discriminates the sign of a transaction in aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in (+).
    Income,
    /// Money going out (-).
    Expense,
}

impl TransactionKind {
    /// Name of the remote table holding rows of this kind.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expenses",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

/// How the money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// M-Pesa mobile money.
    Mpesa,
    /// Airtel Money mobile money.
    AirtelMoney,
    /// Bank transfer or card.
    Bank,
    /// Any value this client does not know about yet.
    #[serde(other)]
    Other,
}

/// A single income or expense record.
///
/// The store never creates these; they only arrive from the remote adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier assigned by the remote store.
    pub id: TransactionId,
    /// Owning business.
    pub business_id: BusinessId,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Calendar date used for all bucketing.
    pub date: NaiveDate,
    /// Amount as reported; `None` when the row carried no usable number.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<Decimal>,
    /// Free-form category label (e.g. "rent", "product_sale").
    pub category: String,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Optional free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Weak reference to a customer (income only).
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
}

impl Transaction {
    /// Amount with missing values treated as zero.
    #[must_use]
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

/// Accepts numbers, numeric strings, `null`, or garbage; anything that is not
/// a finite decimal becomes `None` instead of failing the whole row.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }))
}
