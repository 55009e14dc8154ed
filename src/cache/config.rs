//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SECONDS: u64 = 600;
const DEFAULT_RESPONSE_LIMIT: usize = 256;
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// Cache configuration from `stagno.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the response cache.
    pub enabled: bool,
    /// Seconds an entry stays servable after insertion.
    pub ttl_seconds: u64,
    /// Maximum buffered responses held at once.
    pub response_limit: usize,
    /// Largest response body the middleware will buffer and store.
    pub max_body_bytes: usize,
    /// Cadence of the background expired-entry sweep.
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            response_limit: DEFAULT_RESPONSE_LIMIT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl_seconds: settings.ttl_seconds,
            response_limit: settings.response_limit,
            max_body_bytes: settings.max_body_bytes,
            sweep_interval_seconds: settings.sweep_interval_seconds,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }

    /// Returns the response limit as NonZeroUsize, clamping to 1 if zero.
    pub fn response_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.response_limit).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.ttl_seconds, 600);
        assert_eq!(config.response_limit, 256);
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert_eq!(config.sweep_interval_seconds, 60);
    }

    #[test]
    fn response_limit_clamps_to_min() {
        let config = CacheConfig {
            response_limit: 0,
            ..Default::default()
        };
        assert_eq!(config.response_limit_non_zero().get(), 1);
    }

    #[test]
    fn sweep_interval_never_zero() {
        let config = CacheConfig {
            sweep_interval_seconds: 0,
            ..Default::default()
        };
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));
    }
}
