//! Restart command channel
//!
//! The launcher serializes the job's argv as JSON, wraps it in URL-safe
//! base64 so it survives transport through an environment variable, and the
//! relaunch owner decodes it back at scale-down time.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurgeError};

/// Environment variable carrying the encoded restart command
pub const RESTART_CMD_ENV: &str = "SURGE_CMD";

/// The prepared command that re-issues the job against a new worker set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestartCommand {
    argv: Vec<String>,
}

impl RestartCommand {
    /// Create a restart command from an argv list
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// The full argument list, program first
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Encode for transport through the environment channel
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self).map_err(|err| SurgeError::Internal {
            message: format!("restart command encode: {err}"),
        })?;
        Ok(URL_SAFE.encode(json))
    }

    /// Decode from the transport encoding
    pub fn decode(raw: &str) -> Result<Self> {
        let bytes = URL_SAFE
            .decode(raw.trim())
            .map_err(|err| SurgeError::DecodeFailure {
                reason: format!("invalid base64: {err}"),
            })?;

        let command: Self =
            serde_json::from_slice(&bytes).map_err(|err| SurgeError::DecodeFailure {
                reason: format!("invalid argv json: {err}"),
            })?;

        if command.argv.is_empty() {
            return Err(SurgeError::DecodeFailure {
                reason: "argv is empty".into(),
            });
        }

        Ok(command)
    }

    /// Read and decode the command from the environment channel
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(RESTART_CMD_ENV).map_err(|_| SurgeError::DecodeFailure {
            reason: format!("{RESTART_CMD_ENV} is not set"),
        })?;
        Self::decode(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    #[test]
    fn test_decode_recovers_argv() {
        let command = RestartCommand::new(vec![
            "surge-launch".into(),
            "--hostfile".into(),
            "/job/hostfile".into(),
            "train.py".into(),
        ]);

        let decoded = RestartCommand::decode(&command.encode().unwrap()).unwrap();
        assert_eq!(decoded.argv()[0], "surge-launch");
        assert_eq!(decoded, command);
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let err = RestartCommand::decode("not%valid%base64").unwrap_err();
        assert!(matches!(err, SurgeError::DecodeFailure { .. }));
    }

    #[test]
    fn test_decode_rejects_non_argv_payload() {
        let raw = URL_SAFE.encode(br#"{"cmd": "train"}"#);
        let err = RestartCommand::decode(&raw).unwrap_err();
        assert!(matches!(err, SurgeError::DecodeFailure { .. }));
    }

    #[test]
    fn test_decode_rejects_empty_argv() {
        let raw = URL_SAFE.encode(b"[]");
        let err = RestartCommand::decode(&raw).unwrap_err();
        assert!(matches!(err, SurgeError::DecodeFailure { .. }));
    }
}
