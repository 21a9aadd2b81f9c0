//! Application-wide error types.
//!
//! Every failure in the ledger layer ends up as one of these variants and is
//! turned into either a UI status flag or a dismissible notification. None of
//! them is fatal to the process.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed validation; carries the field-level summary.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record not found in the remote store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote backend or external service failed.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// A bounded network call did not finish in time.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code shown alongside notifications.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if repeating the same action later may succeed.
    ///
    /// Nothing retries automatically; this only decides whether the UI offers
    /// a "try again" affordance.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ExternalService(_) | Self::Timeout(_))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Validation(String::new()), "VALIDATION_ERROR")]
    #[case(AppError::NotFound(String::new()), "NOT_FOUND")]
    #[case(AppError::ExternalService(String::new()), "EXTERNAL_SERVICE_ERROR")]
    #[case(AppError::Timeout(String::new()), "TIMEOUT")]
    #[case(AppError::Configuration(String::new()), "CONFIGURATION_ERROR")]
    #[case(AppError::Internal(String::new()), "INTERNAL_ERROR")]
    fn test_error_codes(#[case] err: AppError, #[case] code: &str) {
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_transient_errors() {
        assert!(AppError::ExternalService("down".into()).is_transient());
        assert!(AppError::Timeout("30s".into()).is_transient());
        assert!(!AppError::Validation("amount".into()).is_transient());
        assert!(!AppError::NotFound("tx".into()).is_transient());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::NotFound("msg".into()).to_string(),
            "Not found: msg"
        );
        assert_eq!(
            AppError::ExternalService("msg".into()).to_string(),
            "External service error: msg"
        );
        assert_eq!(
            AppError::Timeout("msg".into()).to_string(),
            "Request timed out: msg"
        );
        assert_eq!(
            AppError::Internal("msg".into()).to_string(),
            "Internal error: msg"
        );
    }
}
