//! Ad frequency capping
//!
//! At most one ad strategy runs per cooldown window. The cap counts attempts:
//! the impression timestamp is written before the script is loaded, so a
//! failed load still consumes the window.

use crate::core::config::AdsConfig;
use crate::core::store::{AD_IMPRESSION_KEY, KeyValueStore};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// One way of loading a third-party ad script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdStrategy {
    /// A plain script tag with optional `data-*` attributes.
    Script {
        src: String,
        #[serde(default)]
        dataset: BTreeMap<String, String>,
        #[serde(default = "default_async_load")]
        async_load: bool,
    },
    /// A tag carrying only a zone id that appends itself to the document.
    SelfAppending { zone: String, src: String },
}

fn default_async_load() -> bool {
    true
}

impl AdStrategy {
    pub fn src(&self) -> &str {
        match self {
            AdStrategy::Script { src, .. } | AdStrategy::SelfAppending { src, .. } => src,
        }
    }
}

pub fn default_strategies() -> Vec<AdStrategy> {
    vec![
        AdStrategy::SelfAppending {
            zone: "10436620".to_string(),
            src: "https://al5sm.com/tag.min.js".to_string(),
        },
        AdStrategy::Script {
            src: "https://3nbf4.com/act/files/tag.min.js?z=10436621".to_string(),
            dataset: BTreeMap::new(),
            async_load: true,
        },
        AdStrategy::Script {
            src: "https://quge5.com/88/tag.min.js".to_string(),
            dataset: BTreeMap::from([
                ("zone".to_string(), "200188".to_string()),
                ("cfasync".to_string(), "false".to_string()),
            ]),
            async_load: true,
        },
        AdStrategy::SelfAppending {
            zone: "10436626".to_string(),
            src: "https://nap5k.com/tag.min.js".to_string(),
        },
        AdStrategy::SelfAppending {
            zone: "10436628".to_string(),
            src: "https://gizokraijaw.net/vignette.min.js".to_string(),
        },
    ]
}

/// Chooses which of `len` strategies runs. `len` is never zero.
pub trait IndexPicker: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Uniform choice from the thread-local generator.
pub struct RandomPicker;

impl IndexPicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

#[async_trait]
pub trait ScriptInjector: Send + Sync {
    async fn inject(&self, strategy: &AdStrategy) -> Result<()>;
}

/// Loads the script source over HTTP.
pub struct HttpScriptInjector {
    client: reqwest::Client,
}

impl HttpScriptInjector {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScriptInjector for HttpScriptInjector {
    #[instrument(name = "AdScriptLoad", skip(self), fields(src = %strategy.src()))]
    async fn inject(&self, strategy: &AdStrategy) -> Result<()> {
        let response = self.client.get(strategy.src()).send().await?;
        response.error_for_status()?;
        debug!("Ad script loaded");
        Ok(())
    }
}

/// Logs the strategy instead of loading anything.
pub struct DryRunInjector;

#[async_trait]
impl ScriptInjector for DryRunInjector {
    async fn inject(&self, strategy: &AdStrategy) -> Result<()> {
        info!(?strategy, "Dry run, not loading ad script");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Still inside the cooldown window; nothing was injected.
    Skipped { remaining: Duration },
    /// The strategy at `index` was attempted and the window restarted.
    Shown { index: usize },
    NoStrategies,
}

pub struct AdGate {
    store: Arc<dyn KeyValueStore>,
    injector: Arc<dyn ScriptInjector>,
    picker: Box<dyn IndexPicker>,
    strategies: Vec<AdStrategy>,
    cooldown: Duration,
    settle_delay: Duration,
}

impl AdGate {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        injector: Arc<dyn ScriptInjector>,
        picker: Box<dyn IndexPicker>,
        config: &AdsConfig,
    ) -> Self {
        Self {
            store,
            injector,
            picker,
            strategies: config.strategies.clone(),
            cooldown: config.cooldown(),
            settle_delay: config.settle_delay(),
        }
    }

    pub fn strategies(&self) -> &[AdStrategy] {
        &self.strategies
    }

    /// Last recorded impression. Unparseable values count as none.
    pub async fn last_impression(&self) -> Option<DateTime<Utc>> {
        let raw = self.store.get(AD_IMPRESSION_KEY).await?;
        let parsed = raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis);
        if parsed.is_none() {
            debug!(%raw, "Ignoring malformed ad impression timestamp");
        }
        parsed
    }

    /// Time left in the cooldown window at `now`, if any.
    pub async fn remaining_cooldown(&self, now: DateTime<Utc>) -> Option<Duration> {
        let last = self.last_impression().await?;
        match now.signed_duration_since(last).to_std() {
            Ok(elapsed) if elapsed < self.cooldown => Some(self.cooldown - elapsed),
            Ok(_) => None,
            // Impression recorded in the future: treat the whole window as pending
            Err(_) => Some(self.cooldown),
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> GateOutcome {
        if let Some(remaining) = self.remaining_cooldown(now).await {
            info!(
                remaining_secs = remaining.as_secs(),
                "Ad injection skipped due to frequency capping"
            );
            return GateOutcome::Skipped { remaining };
        }

        if self.strategies.is_empty() {
            debug!("No ad strategies configured");
            return GateOutcome::NoStrategies;
        }

        tokio::time::sleep(self.settle_delay).await;

        self.store
            .put(AD_IMPRESSION_KEY, &now.timestamp_millis().to_string())
            .await;

        let index = self
            .picker
            .pick(self.strategies.len())
            .min(self.strategies.len() - 1);
        let strategy = &self.strategies[index];
        debug!(index, ?strategy, "Selected ad strategy");

        if let Err(e) = self.injector.inject(strategy).await {
            debug!(error = %e, "Ad script failed to load");
        }

        GateOutcome::Shown { index }
    }
}
