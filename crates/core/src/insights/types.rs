//! Insight types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What an insight is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Spending that stands out.
    Anomaly,
    /// General status note.
    Info,
}

/// How urgently the owner should look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Low,
    /// Worth a review.
    Medium,
    /// Needs attention.
    High,
}

/// A single hint shown on the insights card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    /// Kind of insight.
    #[serde(rename = "type")]
    pub kind: InsightKind,
    /// Category the insight refers to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Severity, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Share of total expense, percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_pct: Option<Decimal>,
    /// Human-readable message.
    pub message: String,
    /// Suggested next step.
    pub action: String,
}
