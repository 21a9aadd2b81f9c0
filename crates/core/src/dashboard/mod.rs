//! Dashboard aggregation.
//!
//! Pure functions over a ledger snapshot:
//! - Period totals with change against the previous period
//! - Recent activity feed
//! - Category breakdown and monthly cash flow

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::{DEFAULT_ACTIVITY_LIMIT, DashboardService};
pub use types::*;
