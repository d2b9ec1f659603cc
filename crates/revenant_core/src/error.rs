//! # Recycling Error Types
//!
//! All errors that can occur in the recycling engine.
//!
//! Only defects are represented as errors. Exhaustion and growth denial are
//! normal backpressure and surface as `None` results on the hot path.

use thiserror::Error;

/// Errors that can occur in the recycling engine.
#[derive(Error, Debug)]
pub enum PoolError {
    /// Acquire was called with a prefab that was never registered.
    ///
    /// This is a programmer error, not a transient condition: the caller is
    /// holding a prefab the registry has never seen.
    #[error("no pool registered for the requested prefab")]
    UnregisteredPrefab,

    /// Two manifest entries share a key (compared case-insensitively).
    #[error("duplicate pool key in manifest: {0}")]
    DuplicateKey(String),

    /// A release would overfill the pool: every instance is already queued,
    /// so the released value cannot correspond to a checkout.
    #[error("pool '{0}' is already full: released value was never checked out")]
    DoubleRelease(String),

    /// The pool manifest could not be parsed.
    #[error("invalid pool manifest: {0}")]
    ManifestParse(#[from] toml::de::Error),
}

/// Result type for recycling operations.
pub type PoolResult<T> = Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PoolError::UnregisteredPrefab;
        assert_eq!(
            err.to_string(),
            "no pool registered for the requested prefab"
        );

        let err = PoolError::DuplicateKey("enemy".to_string());
        assert_eq!(err.to_string(), "duplicate pool key in manifest: enemy");

        let err = PoolError::DoubleRelease("bullet".to_string());
        assert_eq!(
            err.to_string(),
            "pool 'bullet' is already full: released value was never checked out"
        );
    }
}
