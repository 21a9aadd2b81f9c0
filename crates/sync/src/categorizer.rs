//! Best-effort client for the external AI service.
//!
//! Nothing here is allowed to disturb the ledger: every failure is logged at
//! debug level and turned into `None` (or `false`) at the public boundary.

use std::time::Duration;

use biztrack_core::category::{ExpenseCategory, normalize_label};
use biztrack_core::ledger::Transaction;
use biztrack_shared::config::CategorizerConfig;
use biztrack_shared::types::BusinessId;
use chrono::{NaiveDate, Utc};
use moka::future::Cache;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Failures inside the client. Never escapes the public methods.
#[derive(Debug, Error)]
pub enum CategorizerError {
    /// Request could not be sent or timed out.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status.
    #[error("Service returned {0}")]
    Status(StatusCode),

    /// Response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Service reported an error in the body.
    #[error("Service error: {0}")]
    Service(String),
}

#[derive(Debug, Serialize)]
struct HistoryItem {
    description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    date: NaiveDate,
}

impl HistoryItem {
    fn from_transaction(tx: &Transaction) -> Self {
        Self {
            description: tx.description.clone(),
            amount: tx.amount_or_zero(),
            date: tx.date,
        }
    }
}

#[derive(Debug, Serialize)]
struct CategorizeRequest {
    transactions: Vec<HistoryItem>,
}

#[derive(Debug, Deserialize)]
struct CategorizeResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    suggested_category: String,
    confidence: f64,
}

#[derive(Debug, Serialize)]
struct ForecastRequest {
    business_id: String,
    income_history: Vec<HistoryItem>,
    expense_history: Vec<HistoryItem>,
    days: u32,
}

/// One projected day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Projected date as sent by the service.
    pub ds: String,
    /// Point estimate.
    pub yhat: Decimal,
    /// Lower bound.
    pub yhat_lower: Decimal,
    /// Upper bound.
    pub yhat_upper: Decimal,
}

/// Income and expense projection for a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    /// Projected income per day.
    #[serde(default)]
    pub income_forecast: Vec<ForecastPoint>,
    /// Projected income growth, percent.
    #[serde(default)]
    pub income_trend: Decimal,
    /// Projected expense per day.
    #[serde(default)]
    pub expense_forecast: Vec<ForecastPoint>,
    /// Projected expense growth, percent.
    #[serde(default)]
    pub expense_trend: Decimal,
    /// Seasonality the model picked ("weekly", "yearly", ...).
    #[serde(default)]
    pub seasonality: String,
}

/// Client for category suggestions and cash-flow forecasts.
#[derive(Clone)]
pub struct CategorizerClient {
    http: reqwest::Client,
    base_url: String,
    enabled: bool,
    min_confidence: f64,
    cache: Cache<String, ExpenseCategory>,
}

impl CategorizerClient {
    /// Builds a client from configuration.
    pub fn new(config: &CategorizerConfig) -> Result<Self, CategorizerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            enabled: config.enabled,
            min_confidence: config.min_confidence,
            cache,
        })
    }

    /// Suggests an expense category for a free-text description.
    ///
    /// Returns `None` when the service is disabled, unreachable, unsure, or
    /// answers with a label outside the fixed set.
    pub async fn suggest_expense_category(&self, description: &str) -> Option<ExpenseCategory> {
        let description = description.trim();
        if !self.enabled || description.is_empty() {
            return None;
        }

        let key = cache_key(description);
        if let Some(hit) = self.cache.get(&key).await {
            debug!(description, category = %hit, "category suggestion cache hit");
            return Some(hit);
        }

        match self.predict(description).await {
            Ok(Some(category)) => {
                self.cache.insert(key, category).await;
                Some(category)
            }
            Ok(None) => None,
            Err(e) => {
                debug!(error = %e, "category suggestion unavailable");
                None
            }
        }
    }

    /// Requests a `days`-long projection from the business's history.
    pub async fn forecast(
        &self,
        business_id: BusinessId,
        income: &[Transaction],
        expense: &[Transaction],
        days: u32,
    ) -> Option<Forecast> {
        if !self.enabled {
            return None;
        }

        let request = ForecastRequest {
            business_id: business_id.to_string(),
            income_history: income.iter().map(HistoryItem::from_transaction).collect(),
            expense_history: expense.iter().map(HistoryItem::from_transaction).collect(),
            days,
        };

        self.request_forecast(&request)
            .await
            .inspect_err(|e| debug!(%business_id, error = %e, "forecast unavailable"))
            .ok()
    }

    /// Returns true if the service answers its health check.
    pub async fn health(&self) -> bool {
        if !self.enabled {
            return false;
        }
        match self.http.get(format!("{}/", self.base_url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "AI service health check failed");
                false
            }
        }
    }

    /// Drops every cached suggestion.
    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    async fn predict(&self, description: &str) -> Result<Option<ExpenseCategory>, CategorizerError> {
        let request = CategorizeRequest {
            transactions: vec![HistoryItem {
                description: Some(description.to_string()),
                amount: Decimal::ZERO,
                date: Utc::now().date_naive(),
            }],
        };

        let response = self
            .http
            .post(format!("{}/predict/category", self.base_url))
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CategorizerError::Status(response.status()));
        }

        let body: CategorizeResponse = serde_json::from_slice(&response.bytes().await?)?;
        let Some(top) = body.predictions.into_iter().next() else {
            return Ok(None);
        };
        if top.confidence <= self.min_confidence {
            debug!(
                label = %top.suggested_category,
                confidence = top.confidence,
                "suggestion below confidence threshold"
            );
            return Ok(None);
        }

        Ok(ExpenseCategory::match_label(&top.suggested_category))
    }

    async fn request_forecast(&self, request: &ForecastRequest) -> Result<Forecast, CategorizerError> {
        let response = self
            .http
            .post(format!("{}/predict/forecast", self.base_url))
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CategorizerError::Status(response.status()));
        }

        let body: serde_json::Value = serde_json::from_slice(&response.bytes().await?)?;
        if let Some(error) = body.get("error") {
            return Err(CategorizerError::Service(error.to_string()));
        }
        Ok(serde_json::from_value(body)?)
    }
}

fn cache_key(description: &str) -> String {
    description
        .split_whitespace()
        .map(normalize_label)
        .collect::<Vec<_>>()
        .join(" ")
}
