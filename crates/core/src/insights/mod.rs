//! Spending insights.
//!
//! Flags expense categories that take an outsized share of total spending.

pub mod service;
pub mod types;

pub use service::{ANOMALY_SHARE_THRESHOLD, InsightService};
pub use types::{Insight, InsightKind, Severity};
