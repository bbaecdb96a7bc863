//! Error types for Surge
//!
//! Error taxonomy covering membership sources, relaunch, and runtime wiring.

use thiserror::Error;

/// Primary error type for all Surge operations
#[derive(Debug, Error)]
pub enum SurgeError {
    // ========== Membership Errors ==========

    /// Membership or reachability source could not be read
    #[error("membership source unavailable: {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    // ========== Relaunch Errors ==========

    /// Restart command could not be decoded from its transport encoding
    #[error("restart command decode failed: {reason}")]
    DecodeFailure { reason: String },

    /// Current rank could not be determined
    #[error("rank lookup failed: {reason}")]
    RankLookupFailure { reason: String },

    /// Restart command process could not be spawned
    #[error("relaunch spawn failed: {reason}")]
    SpawnFailure { reason: String },

    // ========== Runtime Errors ==========

    /// Internal error
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl SurgeError {
    /// Returns true if this error is retried on the next watch cycle
    pub fn is_retryable(&self) -> bool {
        matches!(self, SurgeError::SourceUnavailable { .. })
    }
}

/// Result type alias for Surge operations
pub type Result<T> = std::result::Result<T, SurgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_is_retryable() {
        let err = SurgeError::SourceUnavailable {
            path: "/job/hostfile".into(),
            reason: "No such file or directory".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_relaunch_errors_are_not_retryable() {
        let decode = SurgeError::DecodeFailure {
            reason: "invalid base64".into(),
        };
        let rank = SurgeError::RankLookupFailure {
            reason: "RANK is not set".into(),
        };
        assert!(!decode.is_retryable());
        assert!(!rank.is_retryable());
    }
}
