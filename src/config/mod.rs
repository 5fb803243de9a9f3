mod schema;
mod validation;

pub use schema::{Config, HistoryConfig, PricingConfig, ServiceConfig, StoreBackend};
pub use validation::validate_config;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Environment variable overriding `service.base_url`
pub const ENV_SERVICE_URL_VAR: &str = "CAR_VALUE_SERVICE_URL";

/// Get the config directory path (~/.config/car-value/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join("car-value"))
        .unwrap_or_else(|| PathBuf::from(".car-value"))
}

/// Get the default config file path (~/.config/car-value/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/car-value/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
///
/// A missing file at the default path yields the default configuration.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    let mut config = if config_path.exists() {
        let config_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

        serde_saphyr::from_str(&config_content).with_context(|| {
            format!("Failed to parse config: invalid YAML in {}", config_path.display())
        })?
    } else if explicit {
        anyhow::bail!("Config file not found at {}", config_path.display());
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config, std::env::var(ENV_SERVICE_URL_VAR).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, service_url: Option<String>) {
    if let Some(url) = service_url {
        let trimmed = url.trim();
        if !trimmed.is_empty() {
            config.service.base_url = Some(trimmed.to_string());
        }
    }
}
