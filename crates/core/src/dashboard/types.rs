//! Dashboard data types.

use biztrack_shared::types::{BusinessId, TransactionId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{PaymentMethod, TransactionKind};
use crate::period::DateWindow;

/// Totals for one window compared with the window before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStats {
    /// Current window.
    pub window: DateWindow,
    /// Window the change percentages compare against.
    pub previous_window: DateWindow,
    /// Income in the current window.
    pub income: Decimal,
    /// Expense in the current window.
    pub expense: Decimal,
    /// `income - expense`.
    pub net: Decimal,
    /// Income in the previous window.
    pub prev_income: Decimal,
    /// Expense in the previous window.
    pub prev_expense: Decimal,
    /// `prev_income - prev_expense`.
    pub prev_net: Decimal,
    /// Income change vs. previous window, percent.
    pub income_change_pct: Decimal,
    /// Expense change vs. previous window, percent.
    pub expense_change_pct: Decimal,
    /// Net change vs. previous window, percent.
    pub net_change_pct: Decimal,
}

/// Entry of the merged recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
    /// Transaction ID.
    pub id: TransactionId,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Transaction date.
    pub date: NaiveDate,
    /// Amount, zero when the row had none.
    pub amount: Decimal,
    /// Category label.
    pub category: String,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Description.
    pub description: Option<String>,
}

/// Plain sums over a set of transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Total income.
    pub income: Decimal,
    /// Total expense.
    pub expense: Decimal,
    /// `income - expense`.
    pub net: Decimal,
    /// Number of transactions.
    pub count: usize,
}

/// Everything the dashboard page renders, computed in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Business the numbers belong to.
    pub business_id: BusinessId,
    /// Reference date.
    pub as_of: NaiveDate,
    /// Today vs. yesterday.
    pub today: PeriodStats,
    /// This week vs. last week.
    pub week: PeriodStats,
    /// This month vs. last month.
    pub month: PeriodStats,
    /// All-time totals.
    pub all_time: Totals,
    /// Most recent transactions, newest first.
    pub recent_activity: Vec<ActivityItem>,
}

/// Share of one category within a kind's total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    /// Category label.
    pub category: String,
    /// Sum for the category.
    pub amount: Decimal,
    /// Percentage of the kind's total.
    pub percent: Decimal,
    /// Number of transactions.
    pub count: usize,
}

/// One month of the cash-flow chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    /// First day of the month.
    pub month_start: NaiveDate,
    /// Chart label (e.g. "Jan 2024").
    pub label: String,
    /// Income in the month.
    pub inflow: Decimal,
    /// Expense in the month.
    pub outflow: Decimal,
    /// `inflow - outflow`.
    pub net: Decimal,
}
