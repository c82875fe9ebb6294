//! Port interfaces for the gateway
//!
//! These traits define the boundaries between the SDK's business logic and
//! the infrastructure that talks to the network.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use mpesa_domain::constants::{
    B2C_TOP_UP_PATH, C2B_REGISTER_URL_PATH, C2B_SIMULATE_PATH, OAUTH_GRANT_TYPE, OAUTH_PATH,
    STK_PUSH_PATH,
};
use mpesa_domain::{decode::decode_value, AccessTokenResponse, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Request headers, kept ordered so logs and mocks are deterministic.
pub type Headers = BTreeMap<String, String>;

/// HTTP verbs used by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gateway operation: path relative to the base URL, method and query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub method: HttpMethod,
    pub query: Vec<(&'static str, &'static str)>,
}

impl Endpoint {
    #[must_use]
    pub const fn post(path: &'static str) -> Self {
        Self { path, method: HttpMethod::Post, query: Vec::new() }
    }

    /// `GET oauth/v1/generate?grant_type=client_credentials`
    #[must_use]
    pub fn oauth() -> Self {
        Self {
            path: OAUTH_PATH,
            method: HttpMethod::Get,
            query: vec![("grant_type", OAUTH_GRANT_TYPE)],
        }
    }

    #[must_use]
    pub const fn c2b_register_url() -> Self {
        Self::post(C2B_REGISTER_URL_PATH)
    }

    #[must_use]
    pub const fn c2b_simulate() -> Self {
        Self::post(C2B_SIMULATE_PATH)
    }

    #[must_use]
    pub const fn stk_push() -> Self {
        Self::post(STK_PUSH_PATH)
    }

    #[must_use]
    pub const fn b2c_top_up() -> Self {
        Self::post(B2C_TOP_UP_PATH)
    }
}

/// Performs one network call and returns the decoded JSON body.
///
/// Implementations map non-2xx statuses to `MpesaError::Api` or
/// `MpesaError::Server` and never retry.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn send(
        &self,
        endpoint: &Endpoint,
        headers: Headers,
        body: Option<Value>,
    ) -> Result<Value>;
}

/// Typed convenience over [`ApiTransport::send`].
#[async_trait]
pub trait ApiTransportExt: ApiTransport {
    /// Send and decode the response into `T`.
    ///
    /// # Errors
    /// Propagates transport failures; a body that does not match `T` is
    /// `MpesaError::Decoding`.
    async fn send_typed<T>(
        &self,
        endpoint: &Endpoint,
        headers: Headers,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let value = self.send(endpoint, headers, body).await?;
        Ok(decode_value(value)?)
    }
}

impl<T: ApiTransport + ?Sized> ApiTransportExt for T {}

/// Exchanges client credentials for a bearer token.
///
/// Called exactly once per refresh by the token manager.
#[async_trait]
pub trait TokenFetcher: Send + Sync + 'static {
    /// `basic_auth` is the full header value, `Basic <base64>`.
    async fn exchange(&self, basic_auth: &str) -> Result<AccessTokenResponse>;
}

/// Source of a currently valid bearer token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}
