//! Runtime configuration.
//!
//! Defaults, optionally replaced by a TOML file, then overridden by
//! environment variables:
//!
//! | Variable                       | Field                  |
//! |--------------------------------|------------------------|
//! | `DAKSTUDIO_FETCH_ATTEMPTS`     | `fetch_attempts`       |
//! | `DAKSTUDIO_FETCH_DELAY_MS`     | `fetch_delay_ms`       |
//! | `DAKSTUDIO_FETCH_TIMEOUT_SECS` | `request_timeout_secs` |

use std::path::Path;
use std::time::Duration;

use dakstudio_fetch::{Fetcher, RetryPolicy};
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Environment variable overriding [`PipelineConfig::fetch_attempts`].
pub const ENV_FETCH_ATTEMPTS: &str = "DAKSTUDIO_FETCH_ATTEMPTS";
/// Environment variable overriding [`PipelineConfig::fetch_delay_ms`].
pub const ENV_FETCH_DELAY_MS: &str = "DAKSTUDIO_FETCH_DELAY_MS";
/// Environment variable overriding [`PipelineConfig::request_timeout_secs`].
pub const ENV_FETCH_TIMEOUT_SECS: &str = "DAKSTUDIO_FETCH_TIMEOUT_SECS";

/// Pipeline settings. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Attempts per request for the building chain.
    pub fetch_attempts: u32,
    /// Linear backoff base delay in milliseconds.
    pub fetch_delay_ms: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Attempts per neighborhood strategy. The chain itself is the
    /// fallback, so this is usually 1.
    pub neighborhood_attempts: u32,
    /// Footprint area used when no outline is found, in square meters.
    pub default_footprint_area_m2: f64,
    /// Height used when the 3D registry has none, in meters.
    pub default_height_m: f64,
    /// Whether to run the neighborhood resolver.
    pub resolve_neighborhood: bool,
    /// Whether to run the local dwelling-density estimate.
    pub estimate_local_density: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_attempts: 3,
            fetch_delay_ms: 800,
            request_timeout_secs: 20,
            neighborhood_attempts: 1,
            default_footprint_area_m2: 400.0,
            default_height_m: 12.0,
            resolve_neighborhood: true,
            estimate_local_density: true,
        }
    }
}

impl PipelineConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Toml`] if the document is invalid.
    pub fn from_toml_str(contents: &str) -> Result<Self, PipelineError> {
        Ok(toml::de::from_str(contents)?)
    }

    /// Loads the file at `path` (or the defaults when `None`), then
    /// applies environment overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the file cannot be read or parsed, or
    /// an override is not a valid number.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let config = match path {
            Some(path) => {
                log::debug!("Loading pipeline config from {}", path.display());
                Self::from_toml_str(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if a present override does not
    /// parse.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, PipelineError> {
        if let Some(value) = parse_override(&lookup, ENV_FETCH_ATTEMPTS)? {
            self.fetch_attempts = value;
        }
        if let Some(value) = parse_override(&lookup, ENV_FETCH_DELAY_MS)? {
            self.fetch_delay_ms = value;
        }
        if let Some(value) = parse_override(&lookup, ENV_FETCH_TIMEOUT_SECS)? {
            self.request_timeout_secs = value;
        }
        Ok(self)
    }

    /// Retry policy for the address and building lookups.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.fetch_attempts,
            Duration::from_millis(self.fetch_delay_ms),
        )
    }

    /// Retry policy for each neighborhood strategy.
    #[must_use]
    pub const fn neighborhood_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.neighborhood_attempts,
            Duration::from_millis(self.fetch_delay_ms),
        )
    }

    /// Builds the HTTP fetcher described by this config.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Fetch`] if the HTTP client cannot be built.
    pub fn fetcher(&self) -> Result<Fetcher, PipelineError> {
        Ok(Fetcher::with_reqwest(
            self.retry_policy(),
            Duration::from_secs(self.request_timeout_secs),
        )?)
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, PipelineError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| PipelineError::Config {
            message: format!("{key} must be a non-negative integer, got {raw:?}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.neighborhood_policy().attempts, 1);
        assert!((config.default_footprint_area_m2 - 400.0).abs() < f64::EPSILON);
        assert!((config.default_height_m - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            "fetch_attempts = 5\ndefault_height_m = 9.5\nresolve_neighborhood = false\n",
        )
        .unwrap();
        assert_eq!(config.fetch_attempts, 5);
        assert!((config.default_height_m - 9.5).abs() < f64::EPSILON);
        assert!(!config.resolve_neighborhood);
        assert_eq!(config.fetch_delay_ms, 800);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            PipelineConfig::from_toml_str("fetch_attempts = \"many\""),
            Err(PipelineError::Toml(_))
        ));
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = PipelineConfig::from_toml_str("fetch_attempts = 5")
            .unwrap()
            .with_env_overrides(env(&[
                (ENV_FETCH_ATTEMPTS, "2"),
                (ENV_FETCH_DELAY_MS, " 50 "),
            ]))
            .unwrap();
        assert_eq!(config.fetch_attempts, 2);
        assert_eq!(config.fetch_delay_ms, 50);
        assert_eq!(config.request_timeout_secs, 20);
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(2, Duration::from_millis(50))
        );
    }

    #[test]
    fn invalid_override_is_reported() {
        let err = PipelineConfig::default()
            .with_env_overrides(env(&[(ENV_FETCH_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_FETCH_TIMEOUT_SECS));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = PipelineConfig::load(Some(Path::new("/nonexistent/dakstudio.toml"))).unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
