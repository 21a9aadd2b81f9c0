//! Core business logic for BizTrack.
//!
//! This crate contains pure business logic with ZERO network or runtime dependencies.
//! Every function here can be exercised with a plain list of transactions and a
//! reference date.
//!
//! # Modules
//!
//! - `ledger` - Transaction model, input validation, ledger store, filters
//! - `period` - Today/week/month date windows
//! - `dashboard` - Period stats, trend deltas, activity feed, breakdowns
//! - `category` - Fixed category sets and label matching
//! - `insights` - Spending anomaly hints

pub mod category;
pub mod dashboard;
pub mod insights;
pub mod ledger;
pub mod period;
