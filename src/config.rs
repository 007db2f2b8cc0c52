//! Configuration loading.
//!
//! Configuration is loaded from TOML with the following resolution order:
//! 1. explicit path (e.g. `--config <path>`)
//! 2. `~/.vitrine/config.toml` (user)
//! 3. `/etc/vitrine/config.toml` (system)
//!
//! Every field has a default, so a missing file yields [`Config::default()`].
//! Environment variables override the file afterwards:
//! `VITRINE_ENDPOINT` and `VITRINE_ACCESS_TOKEN`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::throttle::RateLimitConfig;
use crate::{Result, VitrineError};

/// Environment variable overriding [`EndpointConfig::url`].
pub const ENDPOINT_ENV_VAR: &str = "VITRINE_ENDPOINT";

/// Environment variable overriding [`EndpointConfig::access_token`].
pub const ACCESS_TOKEN_ENV_VAR: &str = "VITRINE_ACCESS_TOKEN";

/// Feed client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Remote feed endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Feed endpoint URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Deadline for a single page fetch in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Bearer token for the signed-in caller.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: None,
            request_timeout_secs: default_timeout(),
            access_token: None,
        }
    }
}

impl EndpointConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from the standard locations and apply
    /// environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_with(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse configuration from a file, without environment overrides.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            VitrineError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            VitrineError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Apply overrides from a variable lookup (normally the process
    /// environment).
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENDPOINT_ENV_VAR).filter(|v| !v.is_empty()) {
            self.endpoint.url = Some(url);
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV_VAR).filter(|v| !v.is_empty()) {
            self.endpoint.access_token = Some(token);
        }
    }

    /// Resolve the config file path, if any exists.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(VitrineError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".vitrine").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/vitrine/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert!(config.endpoint.url.is_none());
        assert_eq!(config.endpoint.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.rate_limit.pages_per_window, 6);
        assert_eq!(config.rate_limit.cooldown_ms, 3000);
        assert_eq!(config.cache.max_keys, 256);
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [endpoint]
            url = "https://gallery.test/api/feed"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.endpoint.url.as_deref(),
            Some("https://gallery.test/api/feed")
        );
        // Defaults preserved
        assert_eq!(config.endpoint.request_timeout_secs, 30);
        assert_eq!(config.rate_limit.pages_per_window, 6);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [endpoint]
            url = "https://gallery.test/api/feed"
            request_timeout_secs = 10
            access_token = "tok"

            [rate_limit]
            pages_per_window = 4
            cooldown_ms = 1500

            [cache]
            max_keys = 16
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.endpoint.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.endpoint.access_token.as_deref(), Some("tok"));
        assert_eq!(config.rate_limit.pages_per_window, 4);
        assert_eq!(
            config.rate_limit.cooldown_duration(),
            Duration::from_millis(1500)
        );
        assert_eq!(config.cache.max_keys, 16);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config: Config = toml::from_str(
            r#"
            [endpoint]
            url = "https://from-file.test"
            access_token = "file-token"
        "#,
        )
        .unwrap();
        config.apply_env_with(|name| match name {
            ACCESS_TOKEN_ENV_VAR => Some("env-token".to_string()),
            ENDPOINT_ENV_VAR => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.endpoint.access_token.as_deref(), Some("env-token"));
        // Empty values do not override
        assert_eq!(config.endpoint.url.as_deref(), Some("https://from-file.test"));
    }

    #[test]
    fn load_from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[rate_limit]\npages_per_window = 2\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.rate_limit.pages_per_window, 2);
    }

    #[test]
    fn invalid_toml_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[endpoint\nurl = ").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, VitrineError::Configuration(_)));
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }
}
