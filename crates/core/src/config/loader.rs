//! Configuration file loader for the `.dataset-kit/` directory.
//!
//! Configuration sources, later ones winning:
//! 1. Built-in defaults (`http://localhost:8000/api`, 30 s timeout)
//! 2. `.dataset-kit/config.toml` under the given root
//! 3. The `DATASET_API_URL` environment variable (base URL only)

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::AppConfig;
use std::path::Path;

/// Environment variable overriding the service base URL.
pub const API_URL_ENV: &str = "DATASET_API_URL";

/// Load configuration from `root/.dataset-kit/config.toml`.
///
/// A missing directory or file yields the default configuration rather than
/// an error.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, has invalid
/// TOML syntax, or contains invalid values.
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let config_path = root.join(".dataset-kit").join("config.toml");

    let mut config = if config_path.exists() {
        let content =
            std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
                path: config_path.clone(),
                source,
            })?;

        let config: AppConfig =
            toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
                path: config_path.clone(),
                source,
            })?;

        if config.service.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidConfig {
                path: config_path,
                reason: "service.base_url must not be empty".to_string(),
            });
        }

        config
    } else {
        AppConfig::default()
    };

    apply_env_override(&mut config, std::env::var(API_URL_ENV).ok());

    Ok(config)
}

/// Apply the `DATASET_API_URL` override, if set and non-empty.
fn apply_env_override(config: &mut AppConfig, api_url: Option<String>) {
    if let Some(url) = api_url {
        if !url.trim().is_empty() {
            config.service.base_url = url;
        }
    }
}
