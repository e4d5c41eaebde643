//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, Result};

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

pub const ENV_BACKEND_URL: &str = "DESKBOOK_BACKEND_URL";
pub const ENV_TIMEOUT_SECS: &str = "DESKBOOK_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "DESKBOOK_MAX_RETRIES";

/// Configuration for the booking client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root, e.g. `http://localhost:8000`
    pub base_url: Url,
    /// Whole-request timeout
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    /// Base delay between retries (exponential backoff)
    pub retry_base_delay: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid"),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(250),
            user_agent: format!("deskbook/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `DESKBOOK_BACKEND_URL`, `DESKBOOK_TIMEOUT_SECS`
    /// and `DESKBOOK_MAX_RETRIES` when set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(ENV_BACKEND_URL) {
            config = config.with_base_url(&url)?;
        }
        if let Ok(secs) = std::env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.parse().map_err(|_| ClientError::Config {
                message: format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, secs),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(retries) = std::env::var(ENV_MAX_RETRIES) {
            config.max_retries = retries.parse().map_err(|_| ClientError::Config {
                message: format!("{} must be a non-negative integer, got '{}'", ENV_MAX_RETRIES, retries),
            })?;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Config {
                message: format!("backend URL must be http or https, got '{}'", url),
            });
        }
        self.base_url = parsed;
        Ok(self)
    }

    /// Absolute URL for an endpoint path, keeping any path prefix of `base_url`.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path.trim_start_matches('/')))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_path_prefix() {
        let config = ClientConfig::default().with_base_url("http://example.com/api/").unwrap();
        assert_eq!(
            config.endpoint("/employee/my_bookings").unwrap().as_str(),
            "http://example.com/api/employee/my_bookings"
        );
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(ClientConfig::default().with_base_url("ftp://example.com").is_err());
        assert!(ClientConfig::default().with_base_url("not a url").is_err());
    }
}
