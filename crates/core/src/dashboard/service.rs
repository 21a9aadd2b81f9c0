//! Dashboard aggregation over a ledger snapshot.

use std::collections::BTreeMap;

use biztrack_shared::types::BusinessId;
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use super::types::{
    ActivityItem, CashFlowPoint, CategoryShare, DashboardSnapshot, PeriodStats, Totals,
};
use crate::ledger::{Transaction, TransactionKind};
use crate::period::{DateWindow, Period};

/// Default length of the recent-activity feed.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;

/// Pure aggregation over a list of transactions.
///
/// No I/O and no clock: every function takes the transactions and, where
/// dates matter, an explicit reference date. Malformed rows never abort a
/// computation; a missing amount counts as zero.
pub struct DashboardService;

impl DashboardService {
    /// Percentage change from `previous` to `current`, rounded to 2 dp.
    ///
    /// Returns zero when `previous` is zero instead of reporting infinite growth.
    #[must_use]
    pub fn change_percent(current: Decimal, previous: Decimal) -> Decimal {
        if previous.is_zero() {
            return Decimal::ZERO;
        }
        current
            .checked_sub(previous)
            .and_then(|delta| delta.checked_div(previous))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(Decimal::ZERO, |pct| pct.round_dp(2))
    }

    /// Sum of amounts of one kind whose date falls in the window.
    #[must_use]
    pub fn sum(transactions: &[Transaction], kind: TransactionKind, window: DateWindow) -> Decimal {
        transactions
            .iter()
            .filter(|tx| tx.kind == kind && window.contains(tx.date))
            .fold(Decimal::ZERO, |acc, tx| acc.saturating_add(tx.amount_or_zero()))
    }

    /// Stats for an arbitrary window against an arbitrary previous window.
    #[must_use]
    pub fn window_stats(
        transactions: &[Transaction],
        window: DateWindow,
        previous_window: DateWindow,
    ) -> PeriodStats {
        let income = Self::sum(transactions, TransactionKind::Income, window);
        let expense = Self::sum(transactions, TransactionKind::Expense, window);
        let net = income.saturating_sub(expense);

        let prev_income = Self::sum(transactions, TransactionKind::Income, previous_window);
        let prev_expense = Self::sum(transactions, TransactionKind::Expense, previous_window);
        let prev_net = prev_income.saturating_sub(prev_expense);

        PeriodStats {
            window,
            previous_window,
            income,
            expense,
            net,
            prev_income,
            prev_expense,
            prev_net,
            income_change_pct: Self::change_percent(income, prev_income),
            expense_change_pct: Self::change_percent(expense, prev_expense),
            net_change_pct: Self::change_percent(net, prev_net),
        }
    }

    /// Stats for today, this week, or this month relative to `today`.
    #[must_use]
    pub fn period_stats(transactions: &[Transaction], period: Period, today: NaiveDate) -> PeriodStats {
        Self::window_stats(
            transactions,
            period.window(today),
            period.previous_window(today),
        )
    }

    /// Stats for a custom window against the equally long window before it.
    #[must_use]
    pub fn custom_stats(transactions: &[Transaction], window: DateWindow) -> PeriodStats {
        Self::window_stats(transactions, window, window.preceding())
    }

    /// All-time sums.
    #[must_use]
    pub fn totals(transactions: &[Transaction]) -> Totals {
        let (income, expense) =
            transactions
                .iter()
                .fold((Decimal::ZERO, Decimal::ZERO), |(inc, exp), tx| match tx.kind {
                    TransactionKind::Income => (inc.saturating_add(tx.amount_or_zero()), exp),
                    TransactionKind::Expense => (inc, exp.saturating_add(tx.amount_or_zero())),
                });

        Totals {
            income,
            expense,
            net: income.saturating_sub(expense),
            count: transactions.len(),
        }
    }

    /// Newest `limit` transactions of both kinds.
    ///
    /// Sorted by date descending; same-day entries are ordered by id
    /// descending so the feed is stable across refreshes.
    #[must_use]
    pub fn recent_activity(transactions: &[Transaction], limit: usize) -> Vec<ActivityItem> {
        let mut sorted: Vec<&Transaction> = transactions.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));

        sorted
            .into_iter()
            .take(limit)
            .map(|tx| ActivityItem {
                id: tx.id,
                kind: tx.kind,
                date: tx.date,
                amount: tx.amount_or_zero(),
                category: tx.category.clone(),
                payment_method: tx.payment_method,
                description: tx.description.clone(),
            })
            .collect()
    }

    /// Full dashboard for one business as of `today`.
    #[must_use]
    pub fn snapshot(
        business_id: BusinessId,
        transactions: &[Transaction],
        today: NaiveDate,
        activity_limit: usize,
    ) -> DashboardSnapshot {
        DashboardSnapshot {
            business_id,
            as_of: today,
            today: Self::period_stats(transactions, Period::Today, today),
            week: Self::period_stats(transactions, Period::Week, today),
            month: Self::period_stats(transactions, Period::Month, today),
            all_time: Self::totals(transactions),
            recent_activity: Self::recent_activity(transactions, activity_limit),
        }
    }

    /// Totals per category for one kind, largest first.
    #[must_use]
    pub fn category_breakdown(
        transactions: &[Transaction],
        kind: TransactionKind,
    ) -> Vec<CategoryShare> {
        let mut groups: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
        for tx in transactions.iter().filter(|tx| tx.kind == kind) {
            let label = tx.category.trim().to_lowercase();
            let key = if label.is_empty() {
                "uncategorized".to_string()
            } else {
                label
            };
            let entry = groups.entry(key).or_insert((Decimal::ZERO, 0));
            entry.0 = entry.0.saturating_add(tx.amount_or_zero());
            entry.1 += 1;
        }

        let total = groups
            .values()
            .fold(Decimal::ZERO, |acc, (amount, _)| acc.saturating_add(*amount));

        let mut shares: Vec<CategoryShare> = groups
            .into_iter()
            .map(|(category, (amount, count))| CategoryShare {
                percent: share_percent(amount, total),
                category,
                amount,
                count,
            })
            .collect();
        shares.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
        shares
    }

    /// Monthly inflow/outflow for the last `months` calendar months, oldest
    /// first, ending with the month containing `today`.
    #[must_use]
    pub fn cash_flow(transactions: &[Transaction], today: NaiveDate, months: u32) -> Vec<CashFlowPoint> {
        let current = Period::Month.window(today).start;

        (0..months)
            .rev()
            .filter_map(|back| {
                let start = current.checked_sub_months(Months::new(back))?;
                let end = start.checked_add_months(Months::new(1))?;
                let window = DateWindow::new(start, end);
                let inflow = Self::sum(transactions, TransactionKind::Income, window);
                let outflow = Self::sum(transactions, TransactionKind::Expense, window);
                Some(CashFlowPoint {
                    month_start: start,
                    label: start.format("%b %Y").to_string(),
                    inflow,
                    outflow,
                    net: inflow.saturating_sub(outflow),
                })
            })
            .collect()
    }
}

/// `amount / total * 100`, rounded to 2 dp; zero when `total` is zero.
pub(crate) fn share_percent(amount: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    amount
        .checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ZERO, |pct| pct.round_dp(2))
}
