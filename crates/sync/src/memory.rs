//! In-memory [`RemoteLedger`] used by the CLI and the test suites.
//!
//! Behaves like the hosted backend: rows are scoped per business, every
//! successful write notifies that business's subscribers, and reads return
//! rows newest first. Latency and failures can be injected at runtime, and
//! counters expose how often and how concurrently the backend was hit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use biztrack_core::ledger::{Transaction, TransactionInput, TransactionKind};
use biztrack_core::period::DateWindow;
use biztrack_shared::types::{BusinessId, TransactionId};
use tracing::debug;

use crate::error::SyncError;
use crate::remote::{ChangeCallback, RemoteLedger, Subscription};

type Subscribers = Arc<Mutex<HashMap<u64, (BusinessId, ChangeCallback)>>>;

/// Backend double holding rows in process memory.
#[derive(Default)]
pub struct MemoryLedger {
    rows: Mutex<Vec<Transaction>>,
    subscribers: Subscribers,
    next_subscription: AtomicU64,
    latency_ms: AtomicU64,
    fail_queries: AtomicBool,
    fail_writes: AtomicBool,
    income_queries: AtomicUsize,
    expense_queries: AtomicUsize,
    write_calls: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: AtomicUsize,
}

/// Decrements the in-flight gauge even when the query future is dropped by a
/// timeout.
struct InFlight {
    current: Arc<AtomicUsize>,
}

impl InFlight {
    fn enter(current: &Arc<AtomicUsize>, max: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(now, Ordering::SeqCst);
        Self {
            current: Arc::clone(current),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MemoryLedger {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-loaded with rows. Seeding does not notify.
    #[must_use]
    pub fn with_transactions(rows: Vec<Transaction>) -> Self {
        let ledger = Self::default();
        *lock(&ledger.rows) = rows;
        ledger
    }

    /// Delays every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    /// Makes every query fail until switched back.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Makes every write fail until switched back.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of queries served for one kind, failed ones included.
    pub fn query_count(&self, kind: TransactionKind) -> usize {
        match kind {
            TransactionKind::Income => self.income_queries.load(Ordering::SeqCst),
            TransactionKind::Expense => self.expense_queries.load(Ordering::SeqCst),
        }
    }

    /// Number of create, update, and delete calls that reached the backend.
    pub fn write_count(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Highest number of queries observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of live subscriptions across all businesses.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }

    /// Copy of every stored row.
    pub fn rows(&self) -> Vec<Transaction> {
        lock(&self.rows).clone()
    }

    async fn simulate_latency(&self) {
        let millis = self.latency_ms.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    fn notify(&self, business_id: BusinessId) {
        let callbacks: Vec<ChangeCallback> = lock(&self.subscribers)
            .values()
            .filter(|(owner, _)| *owner == business_id)
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        debug!(%business_id, subscribers = callbacks.len(), "notifying change");
        for callback in callbacks {
            callback();
        }
    }

    fn check_write(&self) -> Result<(), SyncError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::Remote("write rejected by backend".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteLedger for MemoryLedger {
    async fn query_transactions(
        &self,
        business_id: BusinessId,
        kind: TransactionKind,
        window: Option<DateWindow>,
    ) -> Result<Vec<Transaction>, SyncError> {
        match kind {
            TransactionKind::Income => self.income_queries.fetch_add(1, Ordering::SeqCst),
            TransactionKind::Expense => self.expense_queries.fetch_add(1, Ordering::SeqCst),
        };
        let _in_flight = InFlight::enter(&self.in_flight, &self.max_in_flight);

        self.simulate_latency().await;
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(SyncError::Remote(format!(
                "query on {} failed",
                kind.table()
            )));
        }

        let mut rows: Vec<Transaction> = lock(&self.rows)
            .iter()
            .filter(|tx| tx.business_id == business_id && tx.kind == kind)
            .filter(|tx| window.is_none_or(|w| w.contains(tx.date)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn subscribe(&self, business_id: BusinessId, on_change: ChangeCallback) -> Subscription {
        let key = self.next_subscription.fetch_add(1, Ordering::SeqCst);
        lock(&self.subscribers).insert(key, (business_id, on_change));

        let subscribers = Arc::clone(&self.subscribers);
        Subscription::new(move || {
            lock(&subscribers).remove(&key);
        })
    }

    async fn create(
        &self,
        business_id: BusinessId,
        input: &TransactionInput,
    ) -> Result<Transaction, SyncError> {
        self.simulate_latency().await;
        self.check_write()?;

        let created = Transaction {
            id: TransactionId::new(),
            business_id,
            kind: input.kind,
            date: input.date,
            amount: Some(input.amount),
            category: input.category.clone(),
            payment_method: input.payment_method,
            description: input.description.clone(),
            customer_id: input.customer_id,
        };
        lock(&self.rows).push(created.clone());

        self.notify(business_id);
        Ok(created)
    }

    async fn update(
        &self,
        business_id: BusinessId,
        id: TransactionId,
        input: &TransactionInput,
    ) -> Result<Transaction, SyncError> {
        self.simulate_latency().await;
        self.check_write()?;

        // Rows live in the table of their kind; a kind change misses.
        let updated = {
            let mut rows = lock(&self.rows);
            let row = rows
                .iter_mut()
                .find(|tx| tx.id == id && tx.business_id == business_id && tx.kind == input.kind)
                .ok_or(SyncError::NotFound(id))?;
            row.date = input.date;
            row.amount = Some(input.amount);
            row.category.clone_from(&input.category);
            row.payment_method = input.payment_method;
            row.description.clone_from(&input.description);
            row.customer_id = input.customer_id;
            row.clone()
        };

        self.notify(business_id);
        Ok(updated)
    }

    async fn delete(&self, business_id: BusinessId, id: TransactionId) -> Result<(), SyncError> {
        self.simulate_latency().await;
        self.check_write()?;

        {
            let mut rows = lock(&self.rows);
            let index = rows
                .iter()
                .position(|tx| tx.id == id && tx.business_id == business_id)
                .ok_or(SyncError::NotFound(id))?;
            rows.remove(index);
        }

        self.notify(business_id);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
