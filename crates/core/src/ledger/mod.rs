//! Income and expense ledger.
//!
//! This module implements the client-side ledger:
//! - Transaction records mirrored from the remote store
//! - Form input types and validation
//! - The per-business ledger store
//! - Page filters and export summaries

pub mod error;
pub mod filter;
pub mod store;
pub mod transaction;
pub mod types;
pub mod validation;

pub use error::{FieldError, LedgerError};
pub use filter::{ExportRow, ExportSummary, TransactionFilter};
pub use store::LedgerStore;
pub use transaction::{PaymentMethod, Transaction, TransactionKind};
pub use types::TransactionInput;
pub use validation::validate_input;
