//! Live synchronization for BizTrack.
//!
//! Keeps a business's ledger store in step with the remote backend and
//! talks to the external AI service.
//!
//! # Modules
//!
//! - `remote` - The `RemoteLedger` adapter trait and change subscriptions
//! - `memory` - In-process backend for the CLI and tests
//! - `coordinator` - Single-flight refresh with debounced change notifications
//! - `session` - Mount/unmount scope with reads and validated writes
//! - `categorizer` - Category suggestions and forecasts from the AI service

pub mod categorizer;
pub mod coordinator;
pub mod error;
pub mod memory;
pub mod remote;
pub mod session;

pub use categorizer::{CategorizerClient, CategorizerError, Forecast, ForecastPoint};
pub use coordinator::{CoordinatorSettings, RefreshCoordinator, RefreshOutcome, SyncStatus};
pub use error::SyncError;
pub use memory::MemoryLedger;
pub use remote::{ChangeCallback, RemoteLedger, Subscription};
pub use session::LedgerSession;
