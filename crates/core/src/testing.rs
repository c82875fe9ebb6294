//! In-memory substitutes for the network ports
//!
//! Deterministic mocks so services and the token manager can be tested
//! without a gateway. Responses are canned per endpoint path.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mpesa_domain::{AccessTokenResponse, MpesaError, Result};
use parking_lot::Mutex;
use serde_json::Value;

use crate::ports::{ApiTransport, Endpoint, Headers, TokenFetcher, TokenProvider};

/// A request captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub endpoint: Endpoint,
    pub headers: Headers,
    pub body: Option<Value>,
}

#[derive(Default)]
struct TransportState {
    responses: HashMap<&'static str, Result<Value>>,
    requests: Vec<RecordedRequest>,
}

/// Transport that answers from a table keyed by endpoint path.
///
/// Paths without a canned response fail with a 404 `Server` error.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<TransportState>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with the given JSON body.
    #[must_use]
    pub fn with_response(self, path: &'static str, body: Value) -> Self {
        self.state.lock().responses.insert(path, Ok(body));
        self
    }

    /// Fail every request to `path` with `error`.
    #[must_use]
    pub fn with_error(self, path: &'static str, error: MpesaError) -> Self {
        self.state.lock().responses.insert(path, Err(error));
        self
    }

    /// Every request sent so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.lock().requests.last().cloned()
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn send(
        &self,
        endpoint: &Endpoint,
        headers: Headers,
        body: Option<Value>,
    ) -> Result<Value> {
        let mut state = self.state.lock();
        state.requests.push(RecordedRequest { endpoint: endpoint.clone(), headers, body });
        state.responses.get(endpoint.path).cloned().unwrap_or_else(|| {
            Err(MpesaError::Server {
                status: 404,
                message: format!("no canned response for {}", endpoint.path),
            })
        })
    }
}

#[derive(Default)]
struct FetcherState {
    responses: VecDeque<Result<AccessTokenResponse>>,
    headers: Vec<String>,
}

/// Token fetcher that hands out queued responses in order.
///
/// Counts exchanges and records the authorization header of each one.
#[derive(Clone, Default)]
pub struct MockTokenFetcher {
    state: Arc<Mutex<FetcherState>>,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl MockTokenFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful exchange.
    #[must_use]
    pub fn with_token(self, token: &str, expires_in: Option<&str>) -> Self {
        self.state.lock().responses.push_back(Ok(AccessTokenResponse::new(token, expires_in)));
        self
    }

    /// Queue a failed exchange.
    #[must_use]
    pub fn with_failure(self, error: MpesaError) -> Self {
        self.state.lock().responses.push_back(Err(error));
        self
    }

    /// Sleep this long inside every exchange.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of exchanges performed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Authorization header values received, oldest first.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        self.state.lock().headers.clone()
    }
}

#[async_trait]
impl TokenFetcher for MockTokenFetcher {
    async fn exchange(&self, basic_auth: &str) -> Result<AccessTokenResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock();
        state.headers.push(basic_auth.to_string());
        state.responses.pop_front().unwrap_or_else(|| {
            Err(MpesaError::AuthenticationFailed("no canned token response".into()))
        })
    }
}

/// Token provider that always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}
