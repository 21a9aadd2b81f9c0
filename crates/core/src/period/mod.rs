//! Reporting periods and their date windows.

pub mod window;

pub use window::{DateWindow, Period};
