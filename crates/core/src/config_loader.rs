use crate::config::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};
use std::path::Path;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

/// Prefix for environment overrides, e.g. `CONTAGION_ANALYSIS__MAX_GAP=2`.
pub const ENV_PREFIX: &str = "CONTAGION_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from `config/Config.toml` and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read, parsed, or validated.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration by merging a TOML file with `CONTAGION_` environment variables.
    ///
    /// A JSON file with the same stem is joined in when present. Missing
    /// files fall back to `AppConfig::default()`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read, parsed, or validated.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        let config: AppConfig = Figment::from(figment::providers::Serialized::defaults(
            AppConfig::default(),
        ))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .join(Json::file(path.with_extension("json")))
        .extract()
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        tracing::debug!(
            path = %path.display(),
            regions = config.regions.len(),
            instruments = config.instruments.len(),
            "configuration loaded"
        );

        Ok(config)
    }
}
