//! Storefront configuration.
//!
//! Configuration values are provided by the embedding application or read
//! from the environment; nothing is hardcoded in the sync core.

use shopfront_runtime::DEFAULT_BROADCAST_CAPACITY;
use thiserror::Error;

/// Environment variable holding the document store base URL
pub const API_URL_VAR: &str = "SHOPFRONT_API_URL";

/// Environment variable overriding the action broadcast capacity
pub const BROADCAST_CAPACITY_VAR: &str = "SHOPFRONT_BROADCAST_CAPACITY";

/// Errors while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("Missing {0} environment variable")]
    Missing(&'static str),

    /// A variable is set to something unusable
    #[error("Invalid value for {name}: {value}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// Storefront configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopConfig {
    /// Base URL of the document store (e.g., `https://shop.example.firebaseio.com`)
    pub base_url: String,

    /// Capacity of the store's action broadcast.
    ///
    /// Bounds how many settled commands can be buffered for callers waiting
    /// on their outcome. Default: 64
    pub broadcast_capacity: usize,
}

impl ShopConfig {
    /// Create configuration for the store at `base_url`
    #[must_use]
    pub const fn new(base_url: String) -> Self {
        Self {
            base_url,
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
        }
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Read configuration from `SHOPFRONT_API_URL` and `SHOPFRONT_BROADCAST_CAPACITY`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the URL is not set and
    /// [`ConfigError::Invalid`] if a value cannot be used.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`ShopConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let base_url = lookup(API_URL_VAR).ok_or(ConfigError::Missing(API_URL_VAR))?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: API_URL_VAR,
                value: base_url,
            });
        }

        let mut config = Self::new(base_url);
        if let Some(raw) = lookup(BROADCAST_CAPACITY_VAR) {
            let capacity = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|c| *c > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: BROADCAST_CAPACITY_VAR,
                    value: raw.clone(),
                })?;
            config = config.with_broadcast_capacity(capacity);
        }

        Ok(config)
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self::new("http://localhost:9000".to_string())
    }
}
