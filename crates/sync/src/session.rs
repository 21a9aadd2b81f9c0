//! A mounted view of one business's ledger.
//!
//! Mounting subscribes to backend changes and starts the first fetch;
//! dropping the session releases the subscription and stops the debouncer
//! on every exit path.

use std::sync::Arc;

use biztrack_core::dashboard::{
    CashFlowPoint, CategoryShare, DashboardService, DashboardSnapshot, PeriodStats,
};
use biztrack_core::insights::{Insight, InsightService};
use biztrack_core::ledger::{
    ExportSummary, LedgerStore, Transaction, TransactionFilter, TransactionInput,
    TransactionKind, validate_input,
};
use biztrack_core::period::{DateWindow, Period};
use biztrack_shared::config::SyncConfig;
use biztrack_shared::types::{BusinessId, TransactionId};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::coordinator::{CoordinatorSettings, RefreshCoordinator, SyncStatus, with_timeout};
use crate::error::SyncError;
use crate::remote::{RemoteLedger, Subscription};

/// Live ledger for one business.
pub struct LedgerSession {
    remote: Arc<dyn RemoteLedger>,
    coordinator: RefreshCoordinator,
    subscription: Option<Subscription>,
    settings: CoordinatorSettings,
    time_zone: Tz,
    activity_limit: usize,
}

impl LedgerSession {
    /// Subscribes to changes for `business_id` and triggers the initial fetch.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(
        remote: Arc<dyn RemoteLedger>,
        business_id: BusinessId,
        config: &SyncConfig,
    ) -> Result<Self, SyncError> {
        let time_zone = config.time_zone()?;
        let settings = CoordinatorSettings {
            debounce: config.debounce_window(),
            fetch_timeout: config.fetch_timeout(),
        };

        let coordinator = RefreshCoordinator::new(Arc::clone(&remote), business_id, settings);
        let subscription = remote.subscribe(business_id, coordinator.change_callback());
        coordinator.trigger_refresh();

        info!(%business_id, time_zone = %time_zone, "ledger session mounted");
        Ok(Self {
            remote,
            coordinator,
            subscription: Some(subscription),
            settings,
            time_zone,
            activity_limit: config.recent_activity_limit,
        })
    }

    /// Releases the subscription and stops the debouncer.
    pub fn unmount(self) {
        drop(self);
    }

    /// Business this session is scoped to.
    #[must_use]
    pub fn business_id(&self) -> BusinessId {
        self.coordinator.business_id()
    }

    /// The refresh coordinator backing this session.
    #[must_use]
    pub const fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Today's date in the business's time zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.time_zone).date_naive()
    }

    /// Latest store contents.
    #[must_use]
    pub fn snapshot(&self) -> Arc<LedgerStore> {
        self.coordinator.snapshot()
    }

    /// Latest refresh status.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.coordinator.status()
    }

    /// Resolves once no fetch is running or owed.
    pub async fn wait_idle(&self) {
        self.coordinator.wait_idle().await;
    }

    /// Stats for a period relative to `today`.
    #[must_use]
    pub fn period_stats(&self, period: Period, today: NaiveDate) -> PeriodStats {
        DashboardService::period_stats(self.snapshot().get(), period, today)
    }

    /// Stats for a custom window against the equally long window before it.
    #[must_use]
    pub fn custom_stats(&self, window: DateWindow) -> PeriodStats {
        DashboardService::custom_stats(self.snapshot().get(), window)
    }

    /// Full dashboard as of `today`.
    #[must_use]
    pub fn dashboard(&self, today: NaiveDate) -> DashboardSnapshot {
        DashboardService::snapshot(
            self.business_id(),
            self.snapshot().get(),
            today,
            self.activity_limit,
        )
    }

    /// Rows matching a page filter, in store order.
    #[must_use]
    pub fn filtered(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        filter
            .apply(self.snapshot().get())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Rows and totals footer for an export.
    #[must_use]
    pub fn export(&self, filter: &TransactionFilter) -> ExportSummary {
        let snapshot = self.snapshot();
        ExportSummary::from_transactions(filter.apply(snapshot.get()))
    }

    /// Per-category totals for one kind.
    #[must_use]
    pub fn category_breakdown(&self, kind: TransactionKind) -> Vec<CategoryShare> {
        DashboardService::category_breakdown(self.snapshot().get(), kind)
    }

    /// Monthly cash flow for the last `months` months up to `today`.
    #[must_use]
    pub fn cash_flow(&self, today: NaiveDate, months: u32) -> Vec<CashFlowPoint> {
        DashboardService::cash_flow(self.snapshot().get(), today, months)
    }

    /// Spending insights over the whole expense history.
    #[must_use]
    pub fn insights(&self) -> Vec<Insight> {
        InsightService::spending_insights(self.snapshot().get())
    }

    /// Validates and creates a row, then refreshes.
    pub async fn create(&self, input: TransactionInput) -> Result<Transaction, SyncError> {
        validate_input(&input)?;
        let created = with_timeout(
            self.settings.fetch_timeout,
            self.remote.create(self.business_id(), &input),
        )
        .await
        .inspect_err(|e| warn!(business_id = %self.business_id(), error = %e, "create failed"))?;

        self.coordinator.trigger_refresh();
        Ok(created)
    }

    /// Validates and updates a row, then refreshes.
    pub async fn update(
        &self,
        id: TransactionId,
        input: TransactionInput,
    ) -> Result<Transaction, SyncError> {
        validate_input(&input)?;
        let updated = with_timeout(
            self.settings.fetch_timeout,
            self.remote.update(self.business_id(), id, &input),
        )
        .await
        .inspect_err(|e| warn!(business_id = %self.business_id(), %id, error = %e, "update failed"))?;

        self.coordinator.trigger_refresh();
        Ok(updated)
    }

    /// Deletes a row, then refreshes.
    pub async fn delete(&self, id: TransactionId) -> Result<(), SyncError> {
        with_timeout(
            self.settings.fetch_timeout,
            self.remote.delete(self.business_id(), id),
        )
        .await
        .inspect_err(|e| warn!(business_id = %self.business_id(), %id, error = %e, "delete failed"))?;

        self.coordinator.trigger_refresh();
        Ok(())
    }
}

impl Drop for LedgerSession {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.coordinator.shutdown();
        info!(business_id = %self.coordinator.business_id(), "ledger session unmounted");
    }
}
