use crate::core::currency::{FetchError, RateSource};
use crate::core::rates::RateTable;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Rate source for the site backend's `/api/currency/rates` endpoint.
pub struct BackendRateSource {
    base_url: String,
    client: reqwest::Client,
}

impl BackendRateSource {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        BackendRateSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[derive(Deserialize, Debug)]
struct BackendRatesResponse {
    #[serde(default)]
    success: bool,
    rates: Option<HashMap<String, f64>>,
    base: Option<String>,
    last_update: Option<String>,
}

#[async_trait]
impl RateSource for BackendRateSource {
    #[instrument(name = "BackendRateFetch", skip(self), fields(base_url = %self.base_url))]
    async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
        let url = format!("{}/api/currency/rates", self.base_url);
        debug!("Requesting exchange rates from {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let text = response.text().await?;
        let data: BackendRatesResponse = serde_json::from_str(&text)?;
        debug!(base = ?data.base, last_update = ?data.last_update, "Received backend rates");

        if !data.success {
            return Err(FetchError::Unsuccessful);
        }
        match data.rates {
            Some(rates) if !rates.is_empty() => Ok(RateTable::from_rates(rates)),
            _ => Err(FetchError::EmptyRates),
        }
    }
}
