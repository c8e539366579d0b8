pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::ads::{AdGate, DryRunInjector, HttpScriptInjector, RandomPicker, ScriptInjector};
use crate::core::config::AppConfig;
use crate::core::{CurrencyContext, KeyValueStore};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Show the cached rate table
    Rates,
    /// Format base-currency amounts for display
    Price {
        amounts: Vec<f64>,
        currency: Option<String>,
    },
    /// Persist a new display currency
    Select { code: String },
    /// List selectable currencies
    Currencies,
    /// Evaluate the ad frequency cap
    Ads { live: bool },
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

/// Builds and initializes the currency context described by `config`.
pub async fn build_context(
    config: &AppConfig,
    store: Arc<dyn KeyValueStore>,
    client: reqwest::Client,
) -> Result<Arc<CurrencyContext>> {
    let source = providers::rate_source_from_config(config, client)?;
    let context = Arc::new(
        CurrencyContext::new(source, store, config.refresh_interval())
            .with_default_currency(&config.default_currency),
    );
    context.initialize().await;
    Ok(context)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("tripfx starting...");

    let config = load_config(config_path)?;
    let client = providers::util::build_client(config.request_timeout())?;
    let store = store::open_store(&config);

    if let AppCommand::Ads { live } = command {
        let injector: Arc<dyn ScriptInjector> = if live {
            Arc::new(HttpScriptInjector::new(client))
        } else {
            Arc::new(DryRunInjector)
        };
        let gate = AdGate::new(store, injector, Box::new(RandomPicker), &config.ads);
        cli::ads::run(&gate).await;
        return Ok(());
    }

    let context = build_context(&config, store, client).await?;

    match command {
        AppCommand::Rates => cli::rates::run(&context),
        AppCommand::Price { amounts, currency } => {
            cli::price::run(&context, &amounts, currency.as_deref())
        }
        AppCommand::Select { code } => {
            println!("{}", cli::currencies::select(&context, &code).await)
        }
        AppCommand::Currencies => {
            println!("{}", cli::currencies::display_currencies(&context))
        }
        AppCommand::Ads { .. } => unreachable!("Ads command is handled before rates are loaded"),
    }

    context.shutdown();
    Ok(())
}
