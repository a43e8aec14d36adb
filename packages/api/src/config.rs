//! Client configuration and the pre-configured `reqwest` client factory.
//!
//! | Variable | Default |
//! |---|---|
//! | `POTHOLE_MAP_API_URL` | `http://127.0.0.1:8080/` |
//! | `POTHOLE_MAP_API_TIMEOUT_SECS` | `30` |
//! | `POTHOLE_MAP_API_CONTRACT` | `post` |

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::{ApiError, QUERY_ENDPOINT, WireContract};

/// Base URL used when `POTHOLE_MAP_API_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/";

/// Request timeout used when `POTHOLE_MAP_API_TIMEOUT_SECS` is not set.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Absolute base URL; endpoints are resolved relative to it.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Request/response shape of the query endpoint.
    pub contract: WireContract,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            contract: WireContract::default(),
        }
    }
}

impl ApiConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if a variable is set to an invalid
    /// value.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if a variable is set to an invalid
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();

        if let Some(url) = lookup("POTHOLE_MAP_API_URL") {
            config.base_url = url;
        }

        if let Some(secs) = lookup("POTHOLE_MAP_API_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|e| ApiError::Config {
                message: format!("POTHOLE_MAP_API_TIMEOUT_SECS={secs:?}: {e}"),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(contract) = lookup("POTHOLE_MAP_API_CONTRACT") {
            config.contract = contract
                .trim()
                .parse::<WireContract>()
                .map_err(|_| ApiError::Config {
                    message: format!(
                        "POTHOLE_MAP_API_CONTRACT={contract:?}: expected \"post\" or \"get\""
                    ),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the base URL is an absolute `http(s)` URL and the timeout
    /// is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ApiError> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| ApiError::Config {
            message: format!("base URL {:?}: {e}", self.base_url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::Config {
                message: format!("base URL {:?} must use http or https", self.base_url),
            });
        }
        if self.timeout.is_zero() {
            return Err(ApiError::Config {
                message: "timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Full URL of the query endpoint.
    #[must_use]
    pub fn query_url(&self) -> String {
        format!("{}/{QUERY_ENDPOINT}", self.base_url.trim_end_matches('/'))
    }
}

/// Builds a `reqwest` client with the configured timeout and JSON
/// `Content-Type`/`Accept` headers. No cookie store is attached, so no
/// credentials are sent.
///
/// # Errors
///
/// Returns [`ApiError::Config`] if the configuration is invalid or the
/// client cannot be constructed.
pub fn build_client(config: &ApiConfig) -> Result<reqwest::Client, ApiError> {
    config.validate()?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .build()
        .map_err(|e| ApiError::Config {
            message: format!("failed to build HTTP client: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ApiConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.contract, WireContract::Post);
    }

    #[test]
    fn reads_all_variables() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("POTHOLE_MAP_API_URL", "https://api.potholemap.example/v1/"),
            ("POTHOLE_MAP_API_TIMEOUT_SECS", "5"),
            ("POTHOLE_MAP_API_CONTRACT", "get"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://api.potholemap.example/v1/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.contract, WireContract::Get);
    }

    #[test]
    fn rejects_bad_values() {
        for vars in [
            &[("POTHOLE_MAP_API_TIMEOUT_SECS", "soon")][..],
            &[("POTHOLE_MAP_API_TIMEOUT_SECS", "0")][..],
            &[("POTHOLE_MAP_API_CONTRACT", "put")][..],
            &[("POTHOLE_MAP_API_URL", "/")][..],
            &[("POTHOLE_MAP_API_URL", "ftp://example.com/")][..],
        ] {
            let err = ApiConfig::from_lookup(lookup_from(vars)).unwrap_err();
            assert!(matches!(err, ApiError::Config { .. }), "{vars:?}: {err}");
        }
    }

    #[test]
    fn query_url_joins_without_double_slash() {
        let mut config = ApiConfig::default();
        assert_eq!(config.query_url(), "http://127.0.0.1:8080/query");
        config.base_url = "https://api.potholemap.example/v1".to_string();
        assert_eq!(config.query_url(), "https://api.potholemap.example/v1/query");
    }

    #[test]
    fn builds_client_for_valid_config() {
        assert!(build_client(&ApiConfig::default()).is_ok());
    }
}
