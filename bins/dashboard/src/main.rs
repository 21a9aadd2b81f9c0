//! BizTrack dashboard CLI
//!
//! Loads a business's transactions into the in-memory backend, runs one
//! synchronization round, and prints the dashboard as JSON.
//!
//! Usage: biztrack [fixture.json]
//!
//! Without a fixture a demo ledger covering the last two months is used.

use std::sync::Arc;

use anyhow::Context;
use biztrack_core::dashboard::{CashFlowPoint, CategoryShare, DashboardSnapshot};
use biztrack_core::insights::Insight;
use biztrack_core::ledger::{PaymentMethod, Transaction, TransactionKind};
use biztrack_shared::AppConfig;
use biztrack_shared::types::{BusinessId, TransactionId};
use biztrack_sync::{CategorizerClient, LedgerSession, MemoryLedger, SyncStatus};
use chrono::{Datelike, NaiveDate, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Months shown in the cash-flow series.
const CASH_FLOW_MONTHS: u32 = 6;

#[derive(Serialize)]
struct Report {
    status: SyncStatus,
    dashboard: DashboardSnapshot,
    expense_breakdown: Vec<CategoryShare>,
    cash_flow: Vec<CashFlowPoint>,
    insights: Vec<Insight>,
    suggestions: Vec<Suggestion>,
}

#[derive(Serialize)]
struct Suggestion {
    id: TransactionId,
    description: String,
    category: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biztrack=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let configured = config.business.id.map(BusinessId::from_uuid);

    let (business_id, rows) = match std::env::args().nth(1) {
        Some(path) => {
            let rows = load_fixture(&path)?;
            let business_id = configured
                .or_else(|| rows.first().map(|tx| tx.business_id))
                .unwrap_or_default();
            info!(%path, rows = rows.len(), "loaded fixture");
            (business_id, rows)
        }
        None => {
            let business_id = configured.unwrap_or_default();
            let today = Utc::now()
                .with_timezone(&config.sync.time_zone()?)
                .date_naive();
            (business_id, demo_rows(business_id, today))
        }
    };

    let ledger = Arc::new(MemoryLedger::with_transactions(rows));
    let session = LedgerSession::mount(ledger, business_id, &config.sync)?;
    session.wait_idle().await;

    let status = session.status();
    if let Some(error) = &status.error {
        let code = status.error_code.unwrap_or("INTERNAL_ERROR");
        let hint = if status.retryable { ", try again later" } else { "" };
        anyhow::bail!("initial sync failed [{code}]: {error}{hint}");
    }

    let suggestions = if config.categorizer.enabled {
        suggest_categories(&CategorizerClient::new(&config.categorizer)?, &session).await
    } else {
        Vec::new()
    };

    let today = session.today();
    let report = Report {
        status,
        dashboard: session.dashboard(today),
        expense_breakdown: session.category_breakdown(TransactionKind::Expense),
        cash_flow: session.cash_flow(today, CASH_FLOW_MONTHS),
        insights: session.insights(),
        suggestions,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    session.unmount();
    Ok(())
}

fn load_fixture(path: &str) -> anyhow::Result<Vec<Transaction>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {path}"))
}

/// Asks the AI service to recategorize expenses filed under "other".
async fn suggest_categories(client: &CategorizerClient, session: &LedgerSession) -> Vec<Suggestion> {
    if !client.health().await {
        warn!("AI service unreachable, skipping category suggestions");
        return Vec::new();
    }

    let snapshot = session.snapshot();
    let mut suggestions = Vec::new();
    for tx in snapshot
        .get()
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense && tx.category == "other")
    {
        let Some(description) = tx.description.as_deref() else {
            continue;
        };
        if let Some(category) = client.suggest_expense_category(description).await {
            suggestions.push(Suggestion {
                id: tx.id,
                description: description.to_string(),
                category: category.to_string(),
            });
        }
    }
    info!(count = suggestions.len(), "category suggestions ready");
    suggestions
}

/// Two months of daily sales plus recurring and occasional expenses.
fn demo_rows(business_id: BusinessId, today: NaiveDate) -> Vec<Transaction> {
    let row = |kind, date, amount: Decimal, category: &str, method, description: &str| Transaction {
        id: TransactionId::new(),
        business_id,
        kind,
        date,
        amount: Some(amount),
        category: category.to_string(),
        payment_method: method,
        description: Some(description.to_string()),
        customer_id: None,
    };

    let mut rows = Vec::new();
    for offset in 0..60_i64 {
        let Some(date) = today.checked_sub_signed(TimeDelta::days(offset)) else {
            break;
        };
        let weekday = i64::from(date.weekday().num_days_from_monday());

        rows.push(row(
            TransactionKind::Income,
            date,
            Decimal::new(1_500 + weekday * 250, 0),
            "product_sale",
            PaymentMethod::Mpesa,
            "Counter sales",
        ));
        if date.day() == 1 {
            rows.push(row(
                TransactionKind::Expense,
                date,
                Decimal::new(25_000, 0),
                "rent",
                PaymentMethod::Bank,
                "Shop rent",
            ));
        }
        if offset % 3 == 0 {
            rows.push(row(
                TransactionKind::Expense,
                date,
                Decimal::new(2_400 + offset * 10, 0),
                "stock",
                PaymentMethod::Cash,
                "Restock from wholesaler",
            ));
        }
        if offset % 7 == 0 {
            rows.push(row(
                TransactionKind::Expense,
                date,
                Decimal::new(350, 0),
                "other",
                PaymentMethod::AirtelMoney,
                "Fuel for delivery motorbike",
            ));
        }
    }
    rows
}
