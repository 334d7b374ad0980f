//! Configuration management for the swap simulator
//!
//! Loads configuration from TOML files with environment variable substitution.
//! Every section has defaults, so an empty file is a valid configuration.

use crate::error::{SwapError, SwapResult};

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub retention: RetentionConfig,
    pub metrics: MetricsConfig,
    pub log: LogConfig,
    pub assets: Vec<AssetConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chain treated as the local ledger
    pub native_chain: String,
    pub quote_ttl_secs: u64,
    /// Seconds of simulated settlement delay per second of `timeEstimate`
    pub settlement_delay_factor: f64,
    pub default_slippage: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            native_chain: "near".to_string(),
            quote_ttl_secs: 300,
            settlement_delay_factor: 1.0,
            default_slippage: 0.01,
        }
    }
}

/// Upper bound for `settlement_delay_factor`
pub const MAX_SETTLEMENT_DELAY_FACTOR: f64 = 1_000.0;
/// Upper bound for `quote_ttl_secs` (7 days)
pub const MAX_QUOTE_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// Upper bound for `retention.max_age_secs` (365 days)
pub const MAX_RETENTION_AGE_SECS: u64 = 365 * 24 * 60 * 60;

impl EngineConfig {
    /// Check the engine section. Also applied to configs handed to the
    /// simulator builder directly.
    pub fn validate(&self) -> SwapResult<()> {
        if self.native_chain.trim().is_empty() {
            return Err(SwapError::Config(
                "engine.native_chain must not be empty".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.default_slippage) {
            return Err(SwapError::Config(format!(
                "engine.default_slippage must be between 0 and 1, got {}",
                self.default_slippage
            )));
        }

        let factor = self.settlement_delay_factor;
        if !(0.0..=MAX_SETTLEMENT_DELAY_FACTOR).contains(&factor) {
            return Err(SwapError::Config(format!(
                "engine.settlement_delay_factor must be between 0 and {}, got {}",
                MAX_SETTLEMENT_DELAY_FACTOR, factor
            )));
        }

        self.quote_ttl()?;
        Ok(())
    }

    /// `quote_ttl_secs` as a signed duration
    pub fn quote_ttl(&self) -> SwapResult<chrono::Duration> {
        bounded_seconds("engine.quote_ttl_secs", self.quote_ttl_secs, MAX_QUOTE_TTL_SECS)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub enabled: bool,
    pub max_age_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_age_secs: 3600,
            sweep_interval_secs: 60,
        }
    }
}

impl RetentionConfig {
    pub fn validate(&self) -> SwapResult<()> {
        if self.enabled && self.sweep_interval_secs == 0 {
            return Err(SwapError::Config(
                "retention.sweep_interval_secs must be positive".to_string(),
            ));
        }
        self.max_age()?;
        Ok(())
    }

    /// `max_age_secs` as a signed duration
    pub fn max_age(&self) -> SwapResult<chrono::Duration> {
        bounded_seconds("retention.max_age_secs", self.max_age_secs, MAX_RETENTION_AGE_SECS)
    }
}

fn bounded_seconds(field: &str, secs: u64, max: u64) -> SwapResult<chrono::Duration> {
    if secs > max {
        return Err(SwapError::Config(format!(
            "{} must be at most {}, got {}",
            field, max, secs
        )));
    }
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| SwapError::Config(format!("{} is out of range: {}", field, secs)))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub json: bool,
}

/// Extra asset registry entry
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AssetConfig {
    pub chain: String,
    pub token: String,
    pub symbol: String,
    pub decimals: u32,
}

impl Settings {
    /// Load settings from `$SWAP_SIM_CONFIG` or `config/default.toml`.
    ///
    /// A missing default file is not an error; defaults are used instead.
    /// Nothing is logged here, so this can run before logging is set up;
    /// callers report the source via [`Settings::config_path`].
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::from_file(path),
            None => {
                let settings = Self::default();
                settings.validate()?;
                Ok(settings)
            }
        }
    }

    /// File `load` reads: `$SWAP_SIM_CONFIG` if set, else
    /// `config/default.toml` if it exists
    pub fn config_path() -> Option<PathBuf> {
        match env::var("SWAP_SIM_CONFIG") {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => {
                let default_path = PathBuf::from("config/default.toml");
                default_path.exists().then_some(default_path)
            }
        }
    }

    /// Load settings from an explicit path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml(&config_str)
    }

    /// Parse settings from TOML text, substituting `${VAR}` references first
    pub fn from_toml(input: &str) -> Result<Self> {
        let config_str = substitute_env_vars(input);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.retention.validate()?;

        for asset in &self.assets {
            if asset.chain.is_empty() || asset.token.is_empty() || asset.symbol.is_empty() {
                anyhow::bail!("Asset entries need chain, token and symbol: {:?}", asset);
            }
        }

        Ok(())
    }
}

lazy_static! {
    static ref ENV_VAR_PATTERN: Regex = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();

    for cap in ENV_VAR_PATTERN.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
