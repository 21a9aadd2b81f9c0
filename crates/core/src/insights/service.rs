//! Spending insight rules.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::types::{Insight, InsightKind, Severity};
use crate::dashboard::DashboardService;
use crate::ledger::{Transaction, TransactionKind};

/// A category above this share of total expense (percent) is flagged.
pub const ANOMALY_SHARE_THRESHOLD: Decimal = dec!(30);

/// Derives spending insights from expense history.
pub struct InsightService;

impl InsightService {
    /// Flags every expense category whose share of total expense exceeds
    /// [`ANOMALY_SHARE_THRESHOLD`].
    ///
    /// When nothing is flagged a single "healthy" note is returned. No
    /// expense rows at all yields no insights.
    #[must_use]
    pub fn spending_insights(transactions: &[Transaction]) -> Vec<Insight> {
        let shares = DashboardService::category_breakdown(transactions, TransactionKind::Expense);
        if shares.is_empty() {
            return Vec::new();
        }

        // Compared on raw sums; `percent` is already rounded for display.
        let total: Decimal = shares.iter().map(|share| share.amount).sum();
        let mut insights: Vec<Insight> = shares
            .into_iter()
            .filter(|share| exceeds_threshold(share.amount, total))
            .map(|share| Insight {
                kind: InsightKind::Anomaly,
                message: format!(
                    "Spending in {} is unusually high ({}% of total).",
                    share.category,
                    share.percent.round_dp(1).normalize()
                ),
                action: "Review individual receipts for potential overspending.".to_string(),
                category: Some(share.category),
                severity: Some(Severity::Medium),
                share_pct: Some(share.percent),
            })
            .collect();

        if insights.is_empty() {
            insights.push(Insight {
                kind: InsightKind::Info,
                category: None,
                severity: None,
                share_pct: None,
                message: "Your spending patterns are healthy and stable.".to_string(),
                action: "Maintain your current budget oversight.".to_string(),
            });
        }

        insights
    }
}

/// `amount / total > threshold / 100`, without dividing.
fn exceeds_threshold(amount: Decimal, total: Decimal) -> bool {
    match (
        amount.checked_mul(Decimal::ONE_HUNDRED),
        total.checked_mul(ANOMALY_SHARE_THRESHOLD),
    ) {
        (Some(scaled), Some(limit)) => scaled > limit,
        _ => false,
    }
}
