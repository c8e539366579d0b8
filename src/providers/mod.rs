pub mod backend;
pub mod exchangerate_api;
pub mod util;

use crate::core::config::{AppConfig, ProviderKind};
use crate::core::currency::RateSource;
use anyhow::{Context, Result};
use backend::BackendRateSource;
use exchangerate_api::ExchangeRateApiSource;
use std::sync::Arc;

/// Builds the rate source selected by `providers.active`.
pub fn rate_source_from_config(
    config: &AppConfig,
    client: reqwest::Client,
) -> Result<Arc<dyn RateSource>> {
    let providers = &config.providers;
    let source: Arc<dyn RateSource> = match providers.active {
        ProviderKind::Backend => {
            let backend = providers
                .backend
                .as_ref()
                .context("providers.backend must be configured when it is the active source")?;
            Arc::new(BackendRateSource::new(&backend.base_url, client))
        }
        ProviderKind::ExchangerateApi => {
            let feed = providers.exchangerate_api.as_ref().context(
                "providers.exchangerate_api must be configured when it is the active source",
            )?;
            Arc::new(ExchangeRateApiSource::new(&feed.base_url, client))
        }
    };
    Ok(source)
}
