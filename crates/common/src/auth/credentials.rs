//! Client credentials for the gateway's client-credentials grant

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

/// Consumer key and secret issued to an app on the gateway portal.
///
/// Immutable once built. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Build credentials without validation.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }

    /// Build credentials, rejecting empty or whitespace-only values.
    ///
    /// # Errors
    /// Returns `CommonError::Config` naming the offending field.
    pub fn try_new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> CommonResult<Self> {
        let credentials = Self::new(client_id, client_secret);
        credentials.validate()?;
        Ok(credentials)
    }

    /// Check that neither half of the pair is blank.
    ///
    /// # Errors
    /// Returns `CommonError::Config` naming the offending field.
    pub fn validate(&self) -> CommonResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(CommonError::config_field("consumer_key", "must not be empty"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(CommonError::config_field("consumer_secret", "must not be empty"));
        }
        Ok(())
    }

    /// The consumer key.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Padded standard base64 of `"{client_id}:{client_secret}"`.
    #[must_use]
    pub fn basic_auth_header_value(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret))
    }

    /// Full `Authorization` header value for the token exchange.
    #[must_use]
    pub fn basic_authorization(&self) -> String {
        format!("Basic {}", self.basic_auth_header_value())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates the basic auth header round trip scenario.
    ///
    /// Assertions:
    /// - Confirms the decoded header equals `"key:secret"`.
    #[test]
    fn basic_auth_header_decodes_to_pair() {
        let credentials = Credentials::new("key", "secret");
        let decoded = STANDARD.decode(credentials.basic_auth_header_value()).unwrap();
        assert_eq!(decoded, b"key:secret");
    }

    #[test]
    fn basic_auth_header_is_padded() {
        // "a:b" is three bytes, "ab:c" needs one pad character.
        assert_eq!(Credentials::new("ab", "c").basic_auth_header_value(), "YWI6Yw==");
    }

    #[test]
    fn secret_containing_colon_is_kept_verbatim() {
        let credentials = Credentials::new("id", "se:cret");
        let decoded = STANDARD.decode(credentials.basic_auth_header_value()).unwrap();
        assert_eq!(decoded, b"id:se:cret");
    }

    #[test]
    fn basic_authorization_has_scheme_prefix() {
        let credentials = Credentials::new("key", "secret");
        assert_eq!(credentials.basic_authorization(), "Basic a2V5OnNlY3JldA==");
    }

    #[test]
    fn try_new_rejects_blank_values() {
        let err = Credentials::try_new("", "secret").unwrap_err();
        assert!(matches!(err, CommonError::Config { field: Some(ref f), .. } if f == "consumer_key"));

        let err = Credentials::try_new("key", "   ").unwrap_err();
        assert!(
            matches!(err, CommonError::Config { field: Some(ref f), .. } if f == "consumer_secret")
        );
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", Credentials::new("key", "super-secret"));
        assert!(rendered.contains("key"));
        assert!(!rendered.contains("super-secret"));
    }
}
