//! Exchange-rate source abstractions

use crate::core::rates::RateTable;
use async_trait::async_trait;
use thiserror::Error;

/// Reasons a rate fetch can fail. All of them are recoverable by the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),
    #[error("Failed to parse rate payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Rate source reported an unsuccessful response")]
    Unsuccessful,
    #[error("Rate source returned no usable rates")]
    EmptyRates,
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches a complete table of rates relative to the base currency.
    async fn fetch_rates(&self) -> Result<RateTable, FetchError>;
}
