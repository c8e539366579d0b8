use crate::core::ads::{AdStrategy, default_strategies};
use crate::core::rates::BASE_CURRENCY;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateApiConfig {
    pub base_url: String,
}

/// Which configured source feeds the rate cache.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Backend,
    ExchangerateApi,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub active: ProviderKind,
    pub backend: Option<BackendProviderConfig>,
    pub exchangerate_api: Option<ExchangeRateApiConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            active: ProviderKind::Backend,
            backend: Some(BackendProviderConfig {
                base_url: "http://localhost:5000".to_string(),
            }),
            exchangerate_api: Some(ExchangeRateApiConfig {
                base_url: "https://api.exchangerate-api.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdsConfig {
    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: u64,
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,
    #[serde(default = "default_strategies")]
    pub strategies: Vec<AdStrategy>,
}

impl Default for AdsConfig {
    fn default() -> Self {
        AdsConfig {
            cooldown_hours: default_cooldown_hours(),
            settle_delay_secs: default_settle_delay_secs(),
            strategies: default_strategies(),
        }
    }
}

impl AdsConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_hours.saturating_mul(60 * 60))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }
}

fn default_cooldown_hours() -> u64 {
    24
}

fn default_settle_delay_secs() -> u64 {
    5
}

fn default_refresh_interval_hours() -> u64 {
    24
}

fn default_currency() -> String {
    BASE_CURRENCY.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_refresh_interval_hours")]
    pub refresh_interval_hours: u64,
    pub request_timeout_secs: Option<u64>,
    /// Selection used until the user picks one
    #[serde(default = "default_currency")]
    pub default_currency: String,
    pub data_path: Option<String>,
    #[serde(default)]
    pub ads: AdsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            refresh_interval_hours: default_refresh_interval_hours(),
            request_timeout_secs: None,
            default_currency: default_currency(),
            data_path: None,
            ads: AdsConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "tripfx", "tripfx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("com", "tripfx", "tripfx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_hours.saturating_mul(60 * 60))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
