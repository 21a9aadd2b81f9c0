//! The adapter seam between the client ledger and whatever backend stores
//! the `income` and `expenses` tables.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use biztrack_core::ledger::{Transaction, TransactionInput, TransactionKind};
use biztrack_core::period::DateWindow;
use biztrack_shared::types::{BusinessId, TransactionId};

use crate::error::SyncError;

/// Invoked on any insert, update, or delete for a subscribed business.
///
/// Carries no payload: a notification means "refetch", never "patch".
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Live change subscription. Unsubscribes when dropped.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wraps the backend's release action.
    pub fn new(release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Stops delivery of change notifications.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Backend holding the business's transactions.
///
/// Every query and write is scoped to a business; implementations must never
/// return rows of another business.
#[async_trait]
pub trait RemoteLedger: Send + Sync {
    /// Rows of one kind, optionally limited to a date window, newest first.
    async fn query_transactions(
        &self,
        business_id: BusinessId,
        kind: TransactionKind,
        window: Option<DateWindow>,
    ) -> Result<Vec<Transaction>, SyncError>;

    /// Registers `on_change` for every change to the business's rows.
    fn subscribe(&self, business_id: BusinessId, on_change: ChangeCallback) -> Subscription;

    /// Inserts a new row and returns it as stored.
    async fn create(
        &self,
        business_id: BusinessId,
        input: &TransactionInput,
    ) -> Result<Transaction, SyncError>;

    /// Replaces the editable fields of an existing row of the business.
    ///
    /// A row stays in its table: an input whose kind differs from the stored
    /// row's kind is answered with [`SyncError::NotFound`], as is a row owned
    /// by another business.
    async fn update(
        &self,
        business_id: BusinessId,
        id: TransactionId,
        input: &TransactionInput,
    ) -> Result<Transaction, SyncError>;

    /// Removes a row of the business. Rows of other businesses are
    /// [`SyncError::NotFound`].
    async fn delete(&self, business_id: BusinessId, id: TransactionId) -> Result<(), SyncError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscription_releases_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        let subscription = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        subscription.unsubscribe();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_releases_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        {
            let _subscription = Subscription::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
