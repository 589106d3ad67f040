//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is missing or its TTL has elapsed
    #[error("key ({0}) not found")]
    NotFound(String),

    /// Value does not fit in any size class with a free slot
    #[error("no space for key ({key}): a {len} byte value doesn't fit in any bucket")]
    NoSpace { key: String, len: usize },

    /// Storage or cache was configured with unusable parameters
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The background sweep could not be started
    #[error("runtime unavailable: {0}")]
    Runtime(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheError::NotFound("foo".to_string()).to_string(),
            "key (foo) not found"
        );
        let err = CacheError::NoSpace {
            key: "foo".to_string(),
            len: 42,
        };
        assert!(err.to_string().contains("42 byte value"));
    }
}
