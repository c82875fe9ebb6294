//! SDK entry point
//!
//! [`Mpesa`] wires one HTTP transport, one OAuth token fetcher and one shared
//! [`TokenManager`] into the three product services.

use std::sync::Arc;

use mpesa_core::{
    ApiTransport, B2CTopUpService, C2BService, StkPushService, TokenManager, TokenProvider,
};
use mpesa_domain::{MpesaConfig, Result};
use tracing::info;

use crate::api::{DarajaClient, OAuthTokenFetcher};
use crate::config;

/// A configured SDK instance.
///
/// All services handed out by one instance share its access token.
pub struct Mpesa {
    config: MpesaConfig,
    tokens: Arc<TokenManager<OAuthTokenFetcher>>,
    c2b: C2BService,
    stk_push: StkPushService,
    b2c_top_up: B2CTopUpService,
}

impl Mpesa {
    /// Build an SDK instance. No network activity happens here.
    ///
    /// # Errors
    /// Returns `MpesaError::InvalidConfiguration` for blank credentials, a
    /// zero timeout or an invalid base URL.
    pub fn new(config: MpesaConfig) -> Result<Self> {
        config.validate()?;
        let credentials = config.credentials()?;

        let transport: Arc<dyn ApiTransport> = Arc::new(DarajaClient::from_config(&config)?);
        let fetcher = OAuthTokenFetcher::new(Arc::clone(&transport));
        let tokens = Arc::new(TokenManager::new(fetcher, credentials));
        let provider: Arc<dyn TokenProvider> = tokens.clone();

        info!(
            environment = %config.environment,
            base_url = config.base_url(),
            "M-Pesa SDK initialised"
        );

        Ok(Self {
            c2b: C2BService::new(Arc::clone(&transport), Arc::clone(&provider)),
            stk_push: StkPushService::new(Arc::clone(&transport), Arc::clone(&provider)),
            b2c_top_up: B2CTopUpService::new(transport, provider),
            tokens,
            config,
        })
    }

    /// Build an SDK instance from the environment or a config file.
    ///
    /// # Errors
    /// See [`config::load`] and [`new`](Self::new).
    pub fn from_env() -> Result<Self> {
        Self::new(config::load()?)
    }

    #[must_use]
    pub const fn config(&self) -> &MpesaConfig {
        &self.config
    }

    /// Customer to Business: URL registration, simulation and callbacks.
    #[must_use]
    pub const fn c2b(&self) -> &C2BService {
        &self.c2b
    }

    /// Lipa Na M-Pesa Online payment prompts.
    #[must_use]
    pub const fn stk_push(&self) -> &StkPushService {
        &self.stk_push
    }

    /// Business account top-ups.
    #[must_use]
    pub const fn b2c_top_up(&self) -> &B2CTopUpService {
        &self.b2c_top_up
    }

    /// Shared token manager, e.g. to force a refresh.
    #[must_use]
    pub fn token_manager(&self) -> &TokenManager<OAuthTokenFetcher> {
        &self.tokens
    }

    /// Drop the cached access token; the next request exchanges again.
    pub fn clear_token(&self) {
        self.tokens.clear_token();
    }
}

impl std::fmt::Debug for Mpesa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mpesa")
            .field("config", &self.config)
            .field("has_valid_token", &self.tokens.has_valid_token())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use mpesa_domain::{MpesaEnvironment, MpesaError};

    use super::*;

    #[test]
    fn test_new_rejects_blank_credentials() {
        let result = Mpesa::new(MpesaConfig::new("", "secret", MpesaEnvironment::Sandbox));
        assert!(matches!(result, Err(MpesaError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let config = MpesaConfig::new("key", "secret", MpesaEnvironment::Sandbox)
            .with_base_url("not a url");
        assert!(matches!(Mpesa::new(config), Err(MpesaError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_new_starts_without_token() {
        let sdk = Mpesa::new(MpesaConfig::new("key", "secret", MpesaEnvironment::Production))
            .expect("sdk");
        assert!(!sdk.token_manager().has_valid_token());
        assert_eq!(sdk.config().base_url(), "https://api.safaricom.co.ke");

        let debug = format!("{sdk:?}");
        assert!(!debug.contains("secret\""));
    }
}
