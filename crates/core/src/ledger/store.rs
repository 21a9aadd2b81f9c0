//! Client-side working set of one business's transactions.

use biztrack_shared::types::BusinessId;

use super::transaction::Transaction;

/// Holds the last fetched set of transactions for a single business.
///
/// The only mutation is [`replace_all`](Self::replace_all): the store mirrors
/// what the remote adapter reported and never originates or patches records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStore {
    business_id: BusinessId,
    transactions: Vec<Transaction>,
    generation: u64,
}

impl LedgerStore {
    /// Creates an empty store scoped to a business.
    #[must_use]
    pub const fn new(business_id: BusinessId) -> Self {
        Self {
            business_id,
            transactions: Vec::new(),
            generation: 0,
        }
    }

    /// Business this store is scoped to.
    #[must_use]
    pub const fn business_id(&self) -> BusinessId {
        self.business_id
    }

    /// Empty store for the same business that keeps counting generations.
    ///
    /// Filling it with [`replace_all`](Self::replace_all) yields the same
    /// state as replacing in place, without copying the held rows first.
    #[must_use]
    pub const fn successor(&self) -> Self {
        Self {
            business_id: self.business_id,
            transactions: Vec::new(),
            generation: self.generation,
        }
    }

    /// Swaps the held set for the result of a full fetch.
    ///
    /// Rows owned by another business are dropped so the store never mixes
    /// businesses. Returns the number of dropped rows.
    pub fn replace_all(&mut self, transactions: Vec<Transaction>) -> usize {
        let received = transactions.len();
        self.transactions = transactions
            .into_iter()
            .filter(|tx| tx.business_id == self.business_id)
            .collect();
        self.generation += 1;
        received - self.transactions.len()
    }

    /// Current snapshot, in fetch order.
    #[must_use]
    pub fn get(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Number of completed `replace_all` calls.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of held transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Returns true if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{PaymentMethod, TransactionKind};
    use biztrack_shared::types::TransactionId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn tx(business_id: BusinessId) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            business_id,
            kind: TransactionKind::Income,
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            amount: Some(dec!(100)),
            category: "service".to_string(),
            payment_method: PaymentMethod::Cash,
            description: None,
            customer_id: None,
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = LedgerStore::new(BusinessId::new());
        assert!(store.is_empty());
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_replace_all_swaps_entirely() {
        let business = BusinessId::new();
        let mut store = LedgerStore::new(business);

        store.replace_all(vec![tx(business), tx(business)]);
        assert_eq!(store.len(), 2);

        let only = tx(business);
        store.replace_all(vec![only.clone()]);
        assert_eq!(store.get(), &[only]);
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_successor_continues_generation() {
        let business = BusinessId::new();
        let mut current = LedgerStore::new(business);
        current.replace_all(vec![tx(business), tx(business)]);

        let rows = vec![tx(business)];
        let mut next = current.successor();
        assert!(next.is_empty());
        next.replace_all(rows.clone());
        current.replace_all(rows);

        assert_eq!(next, current);
        assert_eq!(next.generation(), 2);
    }

    #[test]
    fn test_replace_all_drops_foreign_rows() {
        let business = BusinessId::new();
        let mut store = LedgerStore::new(business);

        let dropped = store.replace_all(vec![tx(business), tx(BusinessId::new())]);

        assert_eq!(dropped, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get().iter().all(|t| t.business_id == business));
    }

    #[test]
    fn test_replace_all_is_idempotent() {
        let business = BusinessId::new();
        let rows = vec![tx(business), tx(business)];
        let mut once = LedgerStore::new(business);
        once.replace_all(rows.clone());
        let mut twice = LedgerStore::new(business);
        twice.replace_all(rows.clone());
        twice.replace_all(rows);

        assert_eq!(once.get(), twice.get());
    }

    #[test]
    fn test_preserves_fetch_order() {
        let business = BusinessId::new();
        let rows = vec![tx(business), tx(business), tx(business)];
        let mut store = LedgerStore::new(business);
        store.replace_all(rows.clone());
        assert_eq!(store.get(), rows.as_slice());
    }
}
