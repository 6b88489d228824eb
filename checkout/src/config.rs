//! Configuration management for the checkout driver.
//!
//! Loads configuration from environment variables with sensible defaults.

use campus_runtime::RetryPolicy;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {name}: {value:?}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },
}

/// Checkout configuration loaded from environment variables.
#[derive(Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// API base URL (`CAMPUS_API_URL`)
    pub api_url: String,
    /// Bearer token (`CAMPUS_ACCESS_TOKEN`, then `CAMPUS_TOKEN`)
    pub access_token: Option<String>,
    /// Per-request timeout (`CAMPUS_HTTP_TIMEOUT_SECS`, default 30)
    pub http_timeout: Duration,
    /// Retries for the cart load (`CAMPUS_CART_RETRIES`, default 2)
    pub cart_retries: usize,
    /// How long the driver waits for an order outcome (`CAMPUS_SUBMIT_TIMEOUT_SECS`, default 60)
    pub submit_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            http_timeout: Duration::from_secs(30),
            cart_retries: 2,
            submit_timeout: Duration::from_secs(60),
        }
    }
}

// Tokens must never reach logs.
impl std::fmt::Debug for CheckoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutConfig")
            .field("api_url", &self.api_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("http_timeout", &self.http_timeout)
            .field("cart_retries", &self.cart_retries)
            .field("submit_timeout", &self.submit_timeout)
            .finish()
    }
}

impl CheckoutConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` (variable name → value)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Ok(Self {
            api_url: non_blank("CAMPUS_API_URL").unwrap_or(defaults.api_url),
            access_token: non_blank("CAMPUS_ACCESS_TOKEN").or_else(|| non_blank("CAMPUS_TOKEN")),
            http_timeout: parse(&non_blank, "CAMPUS_HTTP_TIMEOUT_SECS")?
                .map_or(defaults.http_timeout, Duration::from_secs),
            cart_retries: parse(&non_blank, "CAMPUS_CART_RETRIES")?
                .unwrap_or(defaults.cart_retries),
            submit_timeout: parse(&non_blank, "CAMPUS_SUBMIT_TIMEOUT_SECS")?
                .map_or(defaults.submit_timeout, Duration::from_secs),
        })
    }

    /// Retry policy for the cart load
    #[must_use]
    pub fn cart_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::builder().max_retries(self.cart_retries).build()
    }
}

fn parse<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value })
        })
        .transpose()
}
