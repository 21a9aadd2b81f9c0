//! Refresh coordination for one business.
//!
//! All refreshes go through [`RefreshCoordinator::trigger_refresh`]:
//! - at most one fetch is in flight per business
//! - requests arriving during a fetch collapse into one trailing fetch
//! - change notifications are debounced before they trigger anything
//!
//! Results are published through `watch` channels, so readers always see the
//! most recently settled fetch and never block the refresh loop.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use biztrack_core::ledger::{LedgerStore, Transaction, TransactionKind};
use biztrack_shared::AppError;
use biztrack_shared::types::BusinessId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::remote::{ChangeCallback, RemoteLedger};

/// Default debounce window for change notifications.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(450);

/// Default bound on a single network call.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Observable state of the refresh loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    /// True from the moment a fetch starts until the last owed fetch settles.
    pub loading: bool,
    /// Message of the most recent failed fetch; cleared by the next success.
    pub error: Option<String>,
    /// Notification code of `error`.
    pub error_code: Option<&'static str>,
    /// Whether retrying the failed fetch later may help.
    pub retryable: bool,
    /// When the store was last replaced.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Number of fetches that have settled, failed ones included.
    pub fetch_count: u64,
}

/// What [`RefreshCoordinator::trigger_refresh`] did with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new fetch was started.
    Started,
    /// A fetch was already running; one trailing fetch is now owed.
    Coalesced,
}

/// Timing knobs for the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Debounce window for change notifications.
    pub debounce: Duration,
    /// Bound on each query.
    pub fetch_timeout: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

#[derive(Debug, Default)]
struct FetchState {
    in_flight: bool,
    pending: bool,
}

struct Inner {
    remote: Arc<dyn RemoteLedger>,
    business_id: BusinessId,
    fetch_timeout: Duration,
    state: Mutex<FetchState>,
    store: watch::Sender<Arc<LedgerStore>>,
    status: watch::Sender<SyncStatus>,
    notify: mpsc::UnboundedSender<()>,
    debouncer: JoinHandle<()>,
}

/// Serializes refreshes of one business's ledger store.
///
/// Cheap to clone; clones share the same store and state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    /// Creates a coordinator with an empty store and spawns its debouncer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        remote: Arc<dyn RemoteLedger>,
        business_id: BusinessId,
        settings: CoordinatorSettings,
    ) -> Self {
        let (notify, notifications) = mpsc::unbounded_channel();
        let (store, _) = watch::channel(Arc::new(LedgerStore::new(business_id)));
        let (status, _) = watch::channel(SyncStatus::default());

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| Inner {
            remote,
            business_id,
            fetch_timeout: settings.fetch_timeout,
            state: Mutex::new(FetchState::default()),
            store,
            status,
            notify,
            debouncer: tokio::spawn(debounce_loop(
                weak.clone(),
                notifications,
                settings.debounce,
            )),
        });

        Self { inner }
    }

    /// Business this coordinator refreshes.
    #[must_use]
    pub fn business_id(&self) -> BusinessId {
        self.inner.business_id
    }

    /// Starts a fetch, or marks one as owed if a fetch is already running.
    pub fn trigger_refresh(&self) -> RefreshOutcome {
        {
            let mut state = self.inner.lock_state();
            if state.in_flight {
                state.pending = true;
                debug!(business_id = %self.inner.business_id, "refresh coalesced");
                return RefreshOutcome::Coalesced;
            }
            state.in_flight = true;
            self.inner.status.send_modify(|status| status.loading = true);
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(inner.run());
        RefreshOutcome::Started
    }

    /// Records a change notification; never fetches synchronously.
    pub fn on_remote_change(&self) {
        // Only fails once the debouncer has stopped, at which point the
        // notification is moot.
        let _ = self.inner.notify.send(());
    }

    /// Callback suitable for [`RemoteLedger::subscribe`].
    #[must_use]
    pub fn change_callback(&self) -> ChangeCallback {
        let notify = self.inner.notify.clone();
        Arc::new(move || {
            let _ = notify.send(());
        })
    }

    /// Latest store contents.
    #[must_use]
    pub fn snapshot(&self) -> Arc<LedgerStore> {
        Arc::clone(&self.inner.store.borrow())
    }

    /// Latest status.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.inner.status.borrow().clone()
    }

    /// Resolves once no fetch is running or owed.
    pub async fn wait_idle(&self) {
        let mut status = self.inner.status.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = status.wait_for(|status| !status.loading).await;
    }

    /// Stops the debouncer. Fetches already running still settle.
    pub fn shutdown(&self) {
        self.inner.debouncer.abort();
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, FetchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(self: Arc<Self>) {
        loop {
            let result = self.fetch().await;
            self.settle(result);

            let owed = {
                let mut state = self.lock_state();
                let owed = std::mem::take(&mut state.pending);
                if !owed {
                    state.in_flight = false;
                    self.status.send_modify(|status| status.loading = false);
                }
                owed
            };
            if !owed {
                break;
            }
            debug!(business_id = %self.business_id, "running trailing refresh");
        }
    }

    async fn fetch(&self) -> Result<Vec<Transaction>, SyncError> {
        let income = self.query(TransactionKind::Income);
        let expense = self.query(TransactionKind::Expense);
        let (mut rows, expense) = tokio::try_join!(income, expense)?;
        rows.extend(expense);
        Ok(rows)
    }

    async fn query(&self, kind: TransactionKind) -> Result<Vec<Transaction>, SyncError> {
        with_timeout(
            self.fetch_timeout,
            self.remote.query_transactions(self.business_id, kind, None),
        )
        .await
    }

    fn settle(&self, result: Result<Vec<Transaction>, SyncError>) {
        match result {
            Ok(rows) => {
                let mut next = self.store.borrow().successor();
                let dropped = next.replace_all(rows);
                if dropped > 0 {
                    warn!(
                        business_id = %self.business_id,
                        dropped,
                        "dropped rows belonging to another business"
                    );
                }
                let count = next.len();
                self.store.send_replace(Arc::new(next));
                self.status.send_modify(|status| {
                    status.error = None;
                    status.error_code = None;
                    status.retryable = false;
                    status.last_synced_at = Some(Utc::now());
                    status.fetch_count += 1;
                });
                info!(
                    business_id = %self.business_id,
                    transactions = count,
                    fetch_count = self.status.borrow().fetch_count,
                    "ledger refreshed"
                );
            }
            Err(e) => {
                // Previous store contents stay visible.
                let message = e.to_string();
                let notice = AppError::from(e);
                warn!(
                    business_id = %self.business_id,
                    error = %message,
                    code = notice.error_code(),
                    "ledger refresh failed"
                );
                self.status.send_modify(|status| {
                    status.error = Some(message);
                    status.error_code = Some(notice.error_code());
                    status.retryable = notice.is_transient();
                    status.fetch_count += 1;
                });
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.debouncer.abort();
    }
}

/// Collapses every notification received within `window` of the first one
/// into a single refresh at the end of the window.
async fn debounce_loop(
    coordinator: Weak<Inner>,
    mut notifications: mpsc::UnboundedReceiver<()>,
    window: Duration,
) {
    while notifications.recv().await.is_some() {
        tokio::time::sleep(window).await;

        let mut collapsed: usize = 1;
        while notifications.try_recv().is_ok() {
            collapsed += 1;
        }

        let Some(inner) = coordinator.upgrade() else {
            break;
        };
        debug!(business_id = %inner.business_id, collapsed, "debounce window closed");
        RefreshCoordinator { inner }.trigger_refresh();
    }
}

/// Bounds a remote call; an elapsed deadline becomes [`SyncError::Timeout`].
pub(crate) async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, SyncError>>,
) -> Result<T, SyncError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| SyncError::Timeout(limit))?
}
