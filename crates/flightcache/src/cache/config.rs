//! Cache configuration types and builder patterns
//!
//! This module provides configuration types for customizing cache behavior:
//! the entry-count capacity, the TTL applied to computed values, and metrics
//! collection.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::error::ConfigError;

/// Capacity substituted when a configuration asks for zero entries
pub const DEFAULT_CAPACITY: usize = 1000;

/// Configuration for cache behavior
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct CacheConfig {
    /// Maximum number of entries (0 is replaced by [`DEFAULT_CAPACITY`])
    pub capacity: usize,

    /// Time-to-live for values computed by `get_with` (None = no expiration)
    #[cfg_attr(feature = "serde", serde(with = "ttl_millis"))]
    pub default_ttl: Option<Duration>,

    /// Whether to collect hit/miss/eviction counters
    pub track_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: DEFAULT_CAPACITY, default_ttl: None, track_metrics: false }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Quick preset for an LRU cache without expiration
    ///
    /// # Example
    /// ```
    /// use flightcache::cache::CacheConfig;
    ///
    /// let config = CacheConfig::lru(1000);
    /// assert!(config.default_ttl.is_none());
    /// ```
    pub fn lru(capacity: usize) -> Self {
        Self { capacity, ..Self::default() }
    }

    /// Combined TTL + LRU cache
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use flightcache::cache::CacheConfig;
    ///
    /// let config = CacheConfig::ttl_lru(Duration::from_secs(3600), 1000);
    /// assert_eq!(config.capacity, 1000);
    /// ```
    pub fn ttl_lru(ttl: Duration, capacity: usize) -> Self {
        Self { capacity, default_ttl: Some(ttl), ..Self::default() }
    }

    /// Substitutes defaults for values that mean "unset"
    ///
    /// A zero capacity becomes [`DEFAULT_CAPACITY`] and a zero TTL becomes
    /// "never expires".
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.capacity == 0 {
            self.capacity = DEFAULT_CAPACITY;
        }
        self.default_ttl = self.default_ttl.filter(|ttl| !ttl.is_zero());
        self
    }

    /// Parse a configuration from a TOML document
    ///
    /// Missing fields take their default values; `default_ttl` is given in
    /// milliseconds.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use flightcache::cache::CacheConfig;
    ///
    /// let config = CacheConfig::from_toml_str("capacity = 64\ndefault_ttl = 1500\n")?;
    /// assert_eq!(config.capacity, 64);
    /// assert_eq!(config.default_ttl, Some(Duration::from_millis(1500)));
    /// # Ok::<(), flightcache::ConfigError>(())
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum number of entries
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Set the time-to-live for computed values
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.config.default_ttl = Some(ttl);
        self
    }

    /// Enable or disable metrics tracking
    pub fn track_metrics(mut self, enabled: bool) -> Self {
        self.config.track_metrics = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}

/// Serde adapter storing an optional TTL as whole milliseconds
#[cfg(feature = "serde")]
mod ttl_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(ttl: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ttl {
            Some(ttl) => {
                serializer.serialize_u64(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX))
            }
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
