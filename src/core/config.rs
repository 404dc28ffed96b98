use crate::core::currency::{Amount, CurrencyCode, CurrencyPair};
use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Environment variable that takes precedence over `providers.apilayer.api_key`.
pub const API_KEY_ENV: &str = "XCONV_API_KEY";

pub const DEFAULT_APILAYER_URL: &str = "https://api.apilayer.com";

fn default_apilayer_url() -> String {
    DEFAULT_APILAYER_URL.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiLayerProviderConfig {
    #[serde(default = "default_apilayer_url")]
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for ApiLayerProviderConfig {
    fn default() -> Self {
        ApiLayerProviderConfig {
            base_url: default_apilayer_url(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub apilayer: ApiLayerProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub default_amount: Option<f64>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "xconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(amount) = self.default_amount {
            Amount::new(amount).context("Invalid default_amount in config")?;
        }
        Ok(())
    }

    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.from.clone(), self.to.clone())
    }

    pub fn default_amount(&self) -> Option<Amount> {
        self.default_amount.and_then(|a| Amount::new(a).ok())
    }

    /// Resolves the provider API key, preferring the value of [`API_KEY_ENV`].
    pub fn api_key(&self) -> Result<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key(&self, from_env: Option<String>) -> Result<String> {
        from_env
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                self.providers
                    .apilayer
                    .api_key
                    .clone()
                    .filter(|key| !key.trim().is_empty())
            })
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured. Set {} or providers.apilayer.api_key",
                    API_KEY_ENV
                )
            })
    }
}
