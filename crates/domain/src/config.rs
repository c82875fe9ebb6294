//! SDK configuration structures

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use mpesa_common::Credentials;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TIMEOUT_SECS, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
use crate::errors::{MpesaError, Result};

/// Gateway environment the SDK talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MpesaEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl MpesaEnvironment {
    /// Base URL for this environment, without a trailing slash.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl FromStr for MpesaEnvironment {
    type Err = MpesaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" | "live" => Ok(Self::Production),
            other => Err(MpesaError::InvalidConfiguration(format!(
                "unknown environment '{other}' (expected sandbox or production)"
            ))),
        }
    }
}

impl fmt::Display for MpesaEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sandbox => f.write_str("sandbox"),
            Self::Production => f.write_str("production"),
        }
    }
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Everything needed to build an SDK client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpesaConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    #[serde(default)]
    pub environment: MpesaEnvironment,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Replaces the environment's base URL, e.g. to point at a local mock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl MpesaConfig {
    /// Create a configuration with the default timeout.
    #[must_use]
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        environment: MpesaEnvironment,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            environment,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: None,
        }
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Effective base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validated client credentials.
    ///
    /// # Errors
    /// Returns `MpesaError::InvalidConfiguration` if the key or secret is
    /// blank.
    pub fn credentials(&self) -> Result<Credentials> {
        Ok(Credentials::try_new(self.consumer_key.clone(), self.consumer_secret.clone())?)
    }

    /// Check the configuration before any network activity.
    ///
    /// # Errors
    /// Returns `MpesaError::InvalidConfiguration` for blank credentials or a
    /// zero timeout.
    pub fn validate(&self) -> Result<()> {
        self.credentials()?;
        if self.timeout_secs == 0 {
            return Err(MpesaError::InvalidConfiguration(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for MpesaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpesaConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("timeout_secs", &self.timeout_secs)
            .field("base_url", &self.base_url)
            .finish()
    }
}
