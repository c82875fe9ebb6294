//! Error types used throughout the SDK

use mpesa_common::{CommonError, ErrorClassification, ErrorSeverity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodeError;

/// Main error type for the M-Pesa SDK
///
/// `Clone` so a single token refresh failure can be handed to every caller
/// that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum MpesaError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response whose body was not a gateway error document
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Non-2xx response carrying the gateway's `errorCode`/`errorMessage`
    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Decoding error: {0}")]
    Decoding(#[from] DecodeError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Coarse classification for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpesaErrorCategory {
    /// Missing or malformed configuration - non-retryable
    Configuration,
    /// Token exchange failed
    Authentication,
    /// Request rejected before it was sent
    Request,
    /// Connection, DNS, TLS or timeout failures
    Transport,
    /// The gateway answered with a non-2xx status
    Remote,
    /// A payload could not be decoded
    Decoding,
    /// Invariant violations
    Unknown,
}

impl MpesaError {
    /// Get the error category for this error
    #[must_use]
    pub const fn category(&self) -> MpesaErrorCategory {
        match self {
            Self::InvalidConfiguration(_) => MpesaErrorCategory::Configuration,
            Self::AuthenticationFailed(_) => MpesaErrorCategory::Authentication,
            Self::InvalidRequest(_) => MpesaErrorCategory::Request,
            Self::Network(_) => MpesaErrorCategory::Transport,
            Self::Server { .. } | Self::Api { .. } => MpesaErrorCategory::Remote,
            Self::Decoding(_) => MpesaErrorCategory::Decoding,
            Self::Unknown(_) => MpesaErrorCategory::Unknown,
        }
    }

    /// Re-tag any failure from the token exchange as an authentication
    /// failure, keeping the original description.
    #[must_use]
    pub fn into_authentication_failure(self) -> Self {
        match self {
            Self::AuthenticationFailed(_) => self,
            other => Self::AuthenticationFailed(other.to_string()),
        }
    }
}

impl ErrorClassification for MpesaError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::AuthenticationFailed(_) => true,
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Network(_) => ErrorSeverity::Warning,
            Self::Server { status, .. } if *status >= 500 => ErrorSeverity::Warning,
            Self::Unknown(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}

impl From<CommonError> for MpesaError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::Config { .. }
            | CommonError::Serialization { .. }
            | CommonError::Io { .. } => Self::InvalidConfiguration(err.to_string()),
        }
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, MpesaError>;
