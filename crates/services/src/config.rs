//! Runtime configuration read from the environment.

use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;
use url::Url;

use study_core::validate::{FormError, validate_top_k};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TOP_K: u32 = 5;

pub const API_URL_VAR: &str = "STUDY_API_URL";
pub const API_TIMEOUT_VAR: &str = "STUDY_API_TIMEOUT_SECS";
pub const TOP_K_VAR: &str = "STUDY_TOP_K";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid API URL `{value}`: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API URL must use http or https, got `{0}`")]
    UnsupportedScheme(String),
    #[error("invalid value for {key}: `{value}`")]
    InvalidNumber { key: &'static str, value: String },
    #[error(transparent)]
    TopK(#[from] FormError),
}

/// Where and how to reach the study HTTP API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    timeout: Duration,
    top_k: u32,
}

impl ApiConfig {
    /// Build a config for `base_url` with default timeout and retrieval depth.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL does not parse or is not http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|source| ConfigError::InvalidUrl {
            value: base_url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        Ok(Self {
            base_url: parsed,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            top_k: DEFAULT_TOP_K,
        })
    }

    /// Read `STUDY_API_URL`, `STUDY_API_TIMEOUT_SECS` and `STUDY_TOP_K`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a malformed URL or timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`], reading values through `lookup`.
    ///
    /// An out-of-range or unparsable `STUDY_TOP_K` falls back to the default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a malformed URL or timeout.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = non_blank(lookup(API_URL_VAR)).unwrap_or_else(|| DEFAULT_API_URL.into());
        let mut config = Self::new(&base_url)?;

        if let Some(raw) = non_blank(lookup(API_TIMEOUT_VAR)) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidNumber {
                    key: API_TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = non_blank(lookup(TOP_K_VAR)) {
            match raw.trim().parse::<u32>().map(validate_top_k) {
                Ok(Ok(top_k)) => config.top_k = top_k,
                _ => warn!(value = %raw, default = DEFAULT_TOP_K, "ignoring invalid STUDY_TOP_K"),
            }
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// # Errors
    ///
    /// Returns `ConfigError::TopK` outside `1..=20`.
    pub fn with_top_k(mut self, top_k: u32) -> Result<Self, ConfigError> {
        self.top_k = validate_top_k(top_k)?;
        Ok(self)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    /// Absolute URL of an API path such as `"health"` or `"/ask"`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Identity-provider settings, passed through to the provider unvalidated.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub api_key: Option<String>,
    pub domain: Option<String>,
    pub project_id: Option<String>,
}

impl AuthConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: non_blank(lookup("STUDY_AUTH_API_KEY")),
            domain: non_blank(lookup("STUDY_AUTH_DOMAIN")),
            project_id: non_blank(lookup("STUDY_AUTH_PROJECT_ID")),
        }
    }

    /// True when every provider setting is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.api_key.is_some() && self.domain.is_some() && self.project_id.is_some()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("domain", &self.domain)
            .field("project_id", &self.project_id)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.endpoint("health"), "http://127.0.0.1:8000/health");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.top_k(), 5);
        assert_eq!(config, ApiConfig::new(DEFAULT_API_URL).unwrap());
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = ApiConfig::new("https://tutor.example.com/api/").unwrap();
        assert_eq!(
            config.endpoint("/generate-quiz"),
            "https://tutor.example.com/api/generate-quiz"
        );
    }

    #[test]
    fn rejects_bad_urls_and_timeouts() {
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ApiConfig::new("ftp://host"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[(API_TIMEOUT_VAR, "0")])),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn out_of_range_top_k_falls_back() {
        let config = ApiConfig::from_lookup(lookup(&[(TOP_K_VAR, "50")])).unwrap();
        assert_eq!(config.top_k(), DEFAULT_TOP_K);
        let config = ApiConfig::from_lookup(lookup(&[(TOP_K_VAR, "12")])).unwrap();
        assert_eq!(config.top_k(), 12);
        assert!(config.with_top_k(0).is_err());
    }

    #[test]
    fn auth_config_redacts_api_key() {
        let config = AuthConfig::from_lookup(lookup(&[
            ("STUDY_AUTH_API_KEY", "secret"),
            ("STUDY_AUTH_DOMAIN", "study.example.com"),
        ]));
        assert!(!config.is_complete());
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("study.example.com"));
    }
}
