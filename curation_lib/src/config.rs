//! Console configuration: defaults, then an optional TOML file, then environment.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConsoleError;
use crate::tracker::TrackerConfig;
use crate::validation::MAX_PAGE_SIZE;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("TOML parse error: {0}")]
    TomlParse(String),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl From<ConfigError> for ConsoleError {
    fn from(e: ConfigError) -> Self {
        ConsoleError::Config(e.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    /// API base including any prefix.
    pub base_url: String,
    pub page_size: i64,
    pub poll_interval_secs: u64,
    pub action_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            page_size: 20,
            poll_interval_secs: 3,
            action_timeout_secs: 30,
            request_timeout_secs: 30,
        }
    }
}

impl ConsoleConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))
    }

    /// Reads `path` if given, then applies environment overrides and validates.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                tracing::debug!("Loaded config from {}", path.display());
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Applies `CURATION_*` overrides read through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CURATION_API_URL").filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(v) = env_parse::<i64, _>(&lookup, "CURATION_PAGE_SIZE")? {
            self.page_size = v;
        }
        if let Some(v) = env_parse::<u64, _>(&lookup, "CURATION_POLL_INTERVAL_SECS")? {
            self.poll_interval_secs = v;
        }
        if let Some(v) = env_parse::<u64, _>(&lookup, "CURATION_ACTION_TIMEOUT_SECS")? {
            self.action_timeout_secs = v;
        }
        if let Some(v) = env_parse::<u64, _>(&lookup, "CURATION_REQUEST_TIMEOUT_SECS")? {
            self.request_timeout_secs = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.base_url).is_err() {
            return Err(invalid("base_url", format!("'{}' is not a URL", self.base_url)));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(invalid(
                "page_size",
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(invalid("poll_interval_secs", "must be positive"));
        }
        if self.poll_interval_secs >= self.action_timeout_secs {
            return Err(invalid(
                "poll_interval_secs",
                "must be shorter than action_timeout_secs",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be positive"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn tracker(&self) -> TrackerConfig {
        TrackerConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            timeout: Duration::from_secs(self.action_timeout_secs),
        }
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn env_parse<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(key, format!("'{}': {}", raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = ConsoleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tracker().poll_interval, Duration::from_secs(3));
        assert_eq!(config.tracker().timeout, Duration::from_secs(30));
    }

    #[test]
    fn toml_fills_missing_keys_with_defaults() {
        let config = ConsoleConfig::from_toml_str(
            r#"
            base_url = "https://curation.internal/api"
            page_size = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://curation.internal/api");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.poll_interval_secs, 3);
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let err = ConsoleConfig::from_toml_str("page_sise = 10").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = ConsoleConfig::default();
        config
            .apply_env_with(env(&[
                ("CURATION_API_URL", "http://10.0.0.5:9000/api"),
                ("CURATION_POLL_INTERVAL_SECS", "5"),
            ]))
            .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:9000/api");
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn env_rejects_garbage_numbers() {
        let mut config = ConsoleConfig::default();
        let err = config
            .apply_env_with(env(&[("CURATION_PAGE_SIZE", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("CURATION_PAGE_SIZE"));
    }

    #[test]
    fn poll_interval_must_be_below_timeout() {
        let config = ConsoleConfig {
            poll_interval_secs: 30,
            action_timeout_secs: 30,
            ..ConsoleConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
    }

    #[test]
    fn page_size_must_be_positive() {
        let config = ConsoleConfig {
            page_size: 0,
            ..ConsoleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ConsoleConfig::load(Some(Path::new("/nonexistent/curactl.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
