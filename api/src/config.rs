//! API client configuration
//!
//! The base URL is chosen by build environment; the timeout is fixed per
//! client. Both can be overridden from the process environment:
//!
//! | variable | meaning |
//! |----------|---------|
//! | `SERVIR_ENV` | `production` or `development` |
//! | `SERVIR_API_URL` | base URL override |
//! | `SERVIR_API_TIMEOUT_MS` | overall request timeout in milliseconds |

use reqwest::Url;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Base URL used by production builds
pub const PRODUCTION_API_URL: &str = "https://api.servir.me";

/// Base URL used by development builds
pub const DEVELOPMENT_API_URL: &str = "http://localhost:3000";

/// Overall time limit for one request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while reading configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `SERVIR_ENV` named an environment we don't know
    #[error("Unknown build environment: {0}")]
    UnknownEnvironment(String),

    /// `SERVIR_API_TIMEOUT_MS` is not a positive integer
    #[error("Invalid timeout {value:?}: {reason}")]
    InvalidTimeout {
        /// Raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The base URL is not an absolute http(s) URL
    #[error("Invalid base URL {0:?}")]
    InvalidBaseUrl(String),
}

/// Build environment, which selects the API base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEnvironment {
    /// Release builds talking to the hosted API
    Production,
    /// Local builds talking to a local API server
    Development,
}

impl BuildEnvironment {
    /// Environment implied by the compilation profile
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }

    /// Base URL for this environment
    #[must_use]
    pub const fn api_url(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_API_URL,
            Self::Development => DEVELOPMENT_API_URL,
        }
    }
}

impl FromStr for BuildEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" | "test" => Ok(Self::Development),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Configuration for [`ApiClient`](crate::ApiClient)
///
/// # Example
///
/// ```
/// use servir_api::{ApiConfig, BuildEnvironment};
/// use std::time::Duration;
///
/// let config = ApiConfig::for_environment(BuildEnvironment::Production)
///     .with_timeout(Duration::from_secs(10));
///
/// assert_eq!(config.base_url(), "https://api.servir.me");
/// assert_eq!(config.url_for("/users").as_deref(), Ok("https://api.servir.me/users"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    environment: BuildEnvironment,
    base_url: String,
    timeout: Duration,
}

impl ApiConfig {
    /// Defaults for the given environment
    #[must_use]
    pub fn for_environment(environment: BuildEnvironment) -> Self {
        Self {
            environment,
            base_url: environment.api_url().to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("SERVIR_ENV") {
            Some(value) => value.parse()?,
            None => BuildEnvironment::current(),
        };

        let mut config = Self::for_environment(environment);

        if let Some(url) = lookup("SERVIR_API_URL") {
            config = config.with_base_url(url);
        }
        config.validate()?;

        if let Some(raw) = lookup("SERVIR_API_TIMEOUT_MS") {
            let millis: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidTimeout {
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            if millis == 0 {
                return Err(ConfigError::InvalidTimeout {
                    value: raw,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config = config.with_timeout(Duration::from_millis(millis));
        }

        Ok(config)
    }

    /// Override the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the overall request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that the base URL is an absolute http(s) URL
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            _ => Err(ConfigError::InvalidBaseUrl(self.base_url.clone())),
        }
    }

    /// Build environment this configuration was derived from
    #[must_use]
    pub const fn environment(&self) -> BuildEnvironment {
        self.environment
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Overall request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve a request path against the base URL
    ///
    /// Absolute URLs are used as-is.
    ///
    /// # Errors
    ///
    /// Returns the offending URL when the result does not parse.
    pub fn url_for(&self, path: &str) -> Result<String, String> {
        let joined = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        };

        Url::parse(&joined).map(|_| joined).map_err(|e| format!("{path}: {e}"))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::for_environment(BuildEnvironment::current())
    }
}
