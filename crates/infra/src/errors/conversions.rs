//! Conversions from external infrastructure errors into SDK errors.

use mpesa_domain::{DecodeError, MpesaError};
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the SDK error.
#[derive(Debug)]
pub struct InfraError(pub MpesaError);

impl From<InfraError> for MpesaError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<MpesaError> for InfraError {
    fn from(value: MpesaError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoMpesaError {
    fn into_mpesa(self) -> MpesaError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → MpesaError */
/* -------------------------------------------------------------------------- */

impl IntoMpesaError for HttpError {
    fn into_mpesa(self) -> MpesaError {
        if self.is_timeout() {
            return MpesaError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return MpesaError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return MpesaError::InvalidRequest(format!("failed to build HTTP request: {self}"));
        }

        if self.is_decode() {
            return MpesaError::Decoding(DecodeError::data(self.to_string()));
        }

        if let Some(status) = self.status() {
            return MpesaError::Server {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown status").to_string(),
            };
        }

        MpesaError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_mpesa())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml / url → MpesaError */
/* -------------------------------------------------------------------------- */

impl IntoMpesaError for JsonError {
    fn into_mpesa(self) -> MpesaError {
        MpesaError::Decoding(DecodeError::from(self))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_mpesa())
    }
}

impl IntoMpesaError for TomlError {
    fn into_mpesa(self) -> MpesaError {
        MpesaError::InvalidConfiguration(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_mpesa())
    }
}

impl IntoMpesaError for UrlError {
    fn into_mpesa(self) -> MpesaError {
        MpesaError::InvalidConfiguration(format!("Invalid base URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(value.into_mpesa())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
