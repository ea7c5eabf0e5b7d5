//! Error types for the fallible boundaries of the core (parsing, config, asset loading).
//!
//! Per-frame operations never fail; absence of optional data is a handled state.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MouthpieceError {
    /// A configuration value is out of range
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// A message payload could not be decoded
    #[error("Invalid message: {reason}")]
    InvalidMessage { reason: String },

    /// An avatar manifest is structurally wrong
    #[error("Invalid avatar asset '{key}': {reason}")]
    InvalidAsset { key: String, reason: String },

    /// The asset loader could not produce the avatar
    #[error("Failed to load avatar asset '{key}': {reason}")]
    AssetLoad { key: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl MouthpieceError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "config",
            Self::InvalidMessage { .. } => "message",
            Self::InvalidAsset { .. } | Self::AssetLoad { .. } => "asset",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for MouthpieceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
