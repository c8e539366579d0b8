use crate::core::currency::{FetchError, RateSource};
use crate::core::rates::{BASE_CURRENCY, RateTable};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Rate source for the public exchangerate-api.com feed that the backend
/// proxies. Useful when running without the site backend.
pub struct ExchangeRateApiSource {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeRateApiSource {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        ExchangeRateApiSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[derive(Deserialize, Debug)]
struct LatestRatesResponse {
    base: Option<String>,
    rates: Option<HashMap<String, f64>>,
}

#[async_trait]
impl RateSource for ExchangeRateApiSource {
    #[instrument(name = "ExchangeRateApiFetch", skip(self), fields(base_url = %self.base_url))]
    async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
        let url = format!("{}/v4/latest/{}", self.base_url, BASE_CURRENCY);
        debug!("Requesting exchange rates from {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)?;

        if let Some(base) = data.base.as_deref() {
            if base != BASE_CURRENCY {
                warn!(%base, "Feed returned rates for an unexpected base currency");
                return Err(FetchError::Unsuccessful);
            }
        }
        match data.rates {
            Some(rates) if !rates.is_empty() => Ok(RateTable::from_rates(rates)),
            _ => Err(FetchError::EmptyRates),
        }
    }
}
