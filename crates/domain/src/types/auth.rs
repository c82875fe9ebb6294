//! Token exchange payloads

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TOKEN_LIFETIME_SECS;
use crate::decode::optional_string;

/// Body of a successful `oauth/v1/generate` call.
///
/// `expires_in` is documented as a string of seconds (`"3599"`); numbers are
/// accepted as well.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default, deserialize_with = "optional_string")]
    pub expires_in: Option<String>,
}

impl AccessTokenResponse {
    #[must_use]
    pub fn new(access_token: impl Into<String>, expires_in: Option<&str>) -> Self {
        Self { access_token: access_token.into(), expires_in: expires_in.map(str::to_string) }
    }

    /// Lifetime reported by the server, or
    /// [`DEFAULT_TOKEN_LIFETIME_SECS`] when it is absent or unparseable.
    #[must_use]
    pub fn lifetime_secs(&self) -> u64 {
        self.expires_in
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
    }
}

impl std::fmt::Debug for AccessTokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
