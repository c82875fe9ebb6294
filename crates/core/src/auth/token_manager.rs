//! Bearer token manager with collapsed refreshes
//!
//! Owns the single cached access token for an SDK instance:
//! - Returns the cached token while it is inside its usable lifetime
//! - Refreshes through a [`TokenFetcher`] when the token is missing or stale
//! - Serves every concurrent caller from one in-flight exchange
//!
//! A refresh runs on its own task, so a caller that stops waiting does not
//! cancel the exchange for the others.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use mpesa_common::{Clock, Credentials, SystemClock};
use mpesa_domain::constants::TOKEN_EXPIRY_BUFFER_SECS;
use mpesa_domain::{MpesaError, Result};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::ports::{TokenFetcher, TokenProvider};

type SharedRefresh = Shared<BoxFuture<'static, Result<String>>>;

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Default)]
struct TokenState {
    cached: Option<CachedToken>,
    in_flight: Option<SharedRefresh>,
}

struct Inner<F, C> {
    fetcher: F,
    credentials: Credentials,
    clock: C,
    state: Mutex<TokenState>,
}

/// Token manager shared by every product service of one SDK instance.
///
/// Cloning is cheap and clones share the same token slot.
pub struct TokenManager<F: TokenFetcher, C: Clock = SystemClock> {
    inner: Arc<Inner<F, C>>,
}

impl<F: TokenFetcher, C: Clock> Clone for TokenManager<F, C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<F: TokenFetcher> TokenManager<F, SystemClock> {
    /// Create a token manager on the system clock.
    #[must_use]
    pub fn new(fetcher: F, credentials: Credentials) -> Self {
        Self::with_clock(fetcher, credentials, SystemClock)
    }
}

impl<F: TokenFetcher, C: Clock> TokenManager<F, C> {
    /// Create a token manager with an explicit clock (tests use
    /// `MockClock`).
    #[must_use]
    pub fn with_clock(fetcher: F, credentials: Credentials, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                credentials,
                clock,
                state: Mutex::new(TokenState::default()),
            }),
        }
    }

    /// Get a valid access token, refreshing if needed.
    ///
    /// Concurrent callers that find the slot empty all wait on the same
    /// exchange and receive the same token or the same error.
    ///
    /// # Errors
    /// Returns `MpesaError::AuthenticationFailed` if the exchange fails.
    pub async fn get_valid_token(&self) -> Result<String> {
        let refresh = {
            let mut state = self.inner.state.lock();
            let now = self.inner.clock.now();
            if let Some(token) = state.cached.as_ref().filter(|token| token.expires_at > now) {
                return Ok(token.value.clone());
            }
            self.join_or_start_refresh(&mut state)
        };
        refresh.await
    }

    /// Force an exchange even if the cached token is still valid.
    ///
    /// Joins a refresh that is already running instead of starting a second
    /// one. On failure the previously cached token is kept.
    ///
    /// # Errors
    /// Returns `MpesaError::AuthenticationFailed` if the exchange fails.
    pub async fn refresh_token(&self) -> Result<String> {
        let refresh = {
            let mut state = self.inner.state.lock();
            self.join_or_start_refresh(&mut state)
        };
        refresh.await
    }

    /// Drop the cached token so the next request exchanges again.
    pub fn clear_token(&self) {
        self.inner.state.lock().cached = None;
        info!("Cleared cached access token");
    }

    /// Whether a cached token is currently usable.
    #[must_use]
    pub fn has_valid_token(&self) -> bool {
        let now = self.inner.clock.now();
        self.inner.state.lock().cached.as_ref().is_some_and(|token| token.expires_at > now)
    }

    /// Seconds until the cached token stops being used, if one is cached.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<u64> {
        let now = self.inner.clock.now();
        self.inner
            .state
            .lock()
            .cached
            .as_ref()
            .map(|token| token.expires_at.saturating_duration_since(now).as_secs())
    }

    fn join_or_start_refresh(&self, state: &mut TokenState) -> SharedRefresh {
        if let Some(in_flight) = &state.in_flight {
            debug!("Joining in-flight token refresh");
            return in_flight.clone();
        }

        debug!("Starting token refresh");
        let task_inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { task_inner.refresh().await });

        let cleanup_inner = Arc::clone(&self.inner);
        let refresh = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    // The task never reached its own cleanup.
                    cleanup_inner.state.lock().in_flight = None;
                    Err(MpesaError::Unknown(format!("token refresh task failed: {join_err}")))
                }
            }
        }
        .boxed()
        .shared();

        state.in_flight = Some(refresh.clone());
        refresh
    }
}

impl<F: TokenFetcher, C: Clock> Inner<F, C> {
    async fn refresh(&self) -> Result<String> {
        let header = self.credentials.basic_authorization();
        let outcome = self.fetcher.exchange(&header).await;

        let mut state = self.state.lock();
        state.in_flight = None;

        match outcome {
            Ok(response) => {
                let lifetime = response.lifetime_secs();
                let usable = lifetime.saturating_sub(TOKEN_EXPIRY_BUFFER_SECS);
                state.cached = Some(CachedToken {
                    value: response.access_token.clone(),
                    expires_at: self.clock.now() + Duration::from_secs(usable),
                });
                info!(lifetime_secs = lifetime, usable_secs = usable, "Access token refreshed");
                Ok(response.access_token)
            }
            Err(err) => {
                let err = err.into_authentication_failure();
                warn!(error = %err, "Access token refresh failed");
                Err(err)
            }
        }
    }
}

#[async_trait]
impl<F: TokenFetcher, C: Clock> TokenProvider for TokenManager<F, C> {
    async fn access_token(&self) -> Result<String> {
        self.get_valid_token().await
    }
}
