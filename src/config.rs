//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::PolicyKind;
use crate::error::{CacheError, Result};

/// Size classes used when `SIZE_CLASSES` is not set.
pub const DEFAULT_SIZE_CLASSES: &str = "64:1024,256:512,1024:128";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// `(max value size, slot count)` pairs; empty means unbounded storage
    pub size_classes: Vec<(usize, usize)>,
    /// TTL applied by `compute_if_absent`
    pub default_ttl: Duration,
    /// Background sweep interval
    pub sweep_interval: Duration,
    /// Eviction policy for bounded storage
    pub policy: PolicyKind,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SIZE_CLASSES` - `size:count` pairs, comma separated (default: `64:1024,256:512,1024:128`)
    /// - `DEFAULT_TTL_SECS` - Default TTL in seconds (default: 60)
    /// - `SWEEP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 1000)
    /// - `EVICTION_POLICY` - `lru` or `none` (default: `lru`)
    ///
    /// Malformed numeric values fall back to their defaults. A malformed
    /// `SIZE_CLASSES` list is an error since it decides the memory layout.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let size_classes = match env::var("SIZE_CLASSES") {
            Ok(raw) => Self::parse_size_classes(&raw)?,
            Err(_) => defaults.size_classes,
        };

        let policy = match env::var("EVICTION_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.policy,
        };

        Ok(Self {
            size_classes,
            default_ttl: env::var("DEFAULT_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_ttl),
            sweep_interval: env::var("SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.sweep_interval),
            policy,
        })
    }

    /// Parses a `size:count,size:count` list.
    ///
    /// Whitespace around entries is ignored and an empty string yields an
    /// empty list.
    pub fn parse_size_classes(raw: &str) -> Result<Vec<(usize, usize)>> {
        raw.split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (size, count) = pair.split_once(':').ok_or_else(|| {
                    CacheError::InvalidConfiguration(format!(
                        "size class `{}` is not of the form size:count",
                        pair
                    ))
                })?;
                let parse = |v: &str| {
                    v.trim().parse::<usize>().map_err(|e| {
                        CacheError::InvalidConfiguration(format!(
                            "size class `{}`: {}",
                            pair, e
                        ))
                    })
                };
                Ok((parse(size)?, parse(count)?))
            })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            size_classes: vec![(64, 1024), (256, 512), (1024, 128)],
            default_ttl: Duration::from_secs(60),
            sweep_interval: Duration::from_millis(1000),
            policy: PolicyKind::Lru,
        }
    }
}
