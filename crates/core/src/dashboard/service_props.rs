//! Property-based tests for DashboardService.
//!
//! - Net identity: `net == income - expense` for every period
//! - Zero baseline: change against a zero previous value is zero
//! - Feed shape: length is `min(limit, n)` and dates never increase
//! - Replacement: applying the same rows twice yields identical stats

use biztrack_shared::types::{BusinessId, TransactionId};
use chrono::{NaiveDate, TimeDelta};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::service::DashboardService;
use crate::ledger::{LedgerStore, PaymentMethod, Transaction, TransactionKind};
use crate::period::Period;

fn business() -> BusinessId {
    BusinessId::from_uuid(Uuid::nil())
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Strategy to generate amounts from 0.01 to 10,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![Just(TransactionKind::Income), Just(TransactionKind::Expense)]
}

/// A transaction dated within the first 120 days of 2024; one in ten has no amount.
fn transaction_strategy() -> impl Strategy<Value = Transaction> {
    (
        kind_strategy(),
        prop::option::weighted(0.9, positive_amount()),
        0i64..120,
        prop_oneof![Just("rent"), Just("stock"), Just("service")],
    )
        .prop_map(|(kind, amount, offset, category)| Transaction {
            id: TransactionId::new(),
            business_id: business(),
            kind,
            date: base_date() + TimeDelta::days(offset),
            amount,
            category: category.to_string(),
            payment_method: PaymentMethod::Cash,
            description: None,
            customer_id: None,
        })
}

fn today_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..150).prop_map(|offset| base_date() + TimeDelta::days(offset))
}

fn period_strategy() -> impl Strategy<Value = Period> {
    prop_oneof![Just(Period::Today), Just(Period::Week), Just(Period::Month)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* rows, period, and date, net SHALL equal income minus expense
    /// in both the current and previous windows.
    #[test]
    fn prop_net_is_income_minus_expense(
        rows in prop::collection::vec(transaction_strategy(), 0..60),
        period in period_strategy(),
        today in today_strategy(),
    ) {
        let stats = DashboardService::period_stats(&rows, period, today);
        prop_assert_eq!(stats.net, stats.income - stats.expense);
        prop_assert_eq!(stats.prev_net, stats.prev_income - stats.prev_expense);
    }

    /// *For any* current value, change against a zero baseline SHALL be zero.
    #[test]
    fn prop_change_against_zero_is_zero(current in positive_amount()) {
        prop_assert_eq!(DashboardService::change_percent(current, Decimal::ZERO), Decimal::ZERO);
        prop_assert_eq!(DashboardService::change_percent(-current, Decimal::ZERO), Decimal::ZERO);
    }

    /// *For any* rows and limit, the feed SHALL hold `min(limit, n)` entries
    /// ordered newest first.
    #[test]
    fn prop_feed_length_and_order(
        rows in prop::collection::vec(transaction_strategy(), 0..40),
        limit in 0usize..25,
    ) {
        let feed = DashboardService::recent_activity(&rows, limit);
        prop_assert_eq!(feed.len(), limit.min(rows.len()));
        prop_assert!(feed.windows(2).all(|pair| pair[0].date >= pair[1].date));
    }

    /// *For any* rows, replacing the store contents with the same rows twice
    /// SHALL leave every aggregate unchanged.
    #[test]
    fn prop_replace_all_is_idempotent(
        rows in prop::collection::vec(transaction_strategy(), 0..40),
        today in today_strategy(),
    ) {
        let mut store = LedgerStore::new(business());
        store.replace_all(rows.clone());
        let first = DashboardService::snapshot(business(), store.get(), today, 10);

        store.replace_all(rows);
        let second = DashboardService::snapshot(business(), store.get(), today, 10);

        prop_assert_eq!(first, second);
    }

    /// *For any* rows, the category breakdown SHALL account for the whole total
    /// of its kind.
    #[test]
    fn prop_breakdown_sums_to_total(
        rows in prop::collection::vec(transaction_strategy(), 0..40),
    ) {
        let totals = DashboardService::totals(&rows);
        let shares = DashboardService::category_breakdown(&rows, TransactionKind::Expense);
        let summed = shares.iter().fold(Decimal::ZERO, |acc, share| acc + share.amount);
        prop_assert_eq!(summed, totals.expense);
    }
}
