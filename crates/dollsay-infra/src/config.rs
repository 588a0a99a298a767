//! Configuration loader for Dollsay.
//!
//! Reads `config.toml` from the data directory (`~/.dollsay/` in production)
//! and deserializes it into [`AppConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use dollsay_types::config::AppConfig;
use secrecy::SecretString;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "DOLLSAY_DATA_DIR";

/// Environment variable that overrides `provider.api_key`.
pub const API_KEY_ENV: &str = "DOLLSAY_API_KEY";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `DOLLSAY_DATA_DIR` environment variable
/// 2. `~/.dollsay`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".dollsay");
    }

    // Last resort: current directory
    PathBuf::from(".dollsay")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Pick the provider API key.
///
/// A non-blank environment value wins over `provider.api_key` in the file.
pub fn select_api_key(env_value: Option<String>, config: &AppConfig) -> Option<SecretString> {
    env_value
        .filter(|k| !k.trim().is_empty())
        .or_else(|| {
            config
                .provider
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
        })
        .map(SecretString::from)
}

/// [`select_api_key`] with the value of `DOLLSAY_API_KEY`.
pub fn resolve_api_key(config: &AppConfig) -> Option<SecretString> {
    select_api_key(std::env::var(API_KEY_ENV).ok(), config)
}
