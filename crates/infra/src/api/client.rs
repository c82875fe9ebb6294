//! Gateway transport over HTTP
//!
//! Resolves endpoints against the configured base URL, attaches the JSON
//! headers and maps non-2xx responses onto the SDK error taxonomy.

use std::time::Duration;

use async_trait::async_trait;
use mpesa_core::{ApiTransport, Endpoint, Headers, HttpMethod};
use mpesa_domain::constants::DEFAULT_TIMEOUT_SECS;
use mpesa_domain::decode::decode_slice;
use mpesa_domain::{MpesaConfig, MpesaError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Configuration for [`DarajaClient`]
#[derive(Debug, Clone)]
pub struct DarajaClientConfig {
    /// Base URL, e.g. `https://sandbox.safaricom.co.ke`
    pub base_url: String,
    /// Timeout for each request
    pub timeout: Duration,
}

impl Default for DarajaClientConfig {
    fn default() -> Self {
        Self {
            base_url: mpesa_domain::MpesaEnvironment::Sandbox.base_url().to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl From<&MpesaConfig> for DarajaClientConfig {
    fn from(config: &MpesaConfig) -> Self {
        Self { base_url: config.base_url().to_string(), timeout: config.timeout() }
    }
}

/// Error document the gateway returns with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    #[serde(rename = "requestId", default)]
    request_id: Option<String>,
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
    #[serde(rename = "errorMessage", default)]
    error_message: Option<String>,
}

/// HTTP implementation of [`ApiTransport`].
#[derive(Clone)]
pub struct DarajaClient {
    http: HttpClient,
    base_url: Url,
}

impl DarajaClient {
    /// Create a client for the given base URL and timeout.
    ///
    /// # Errors
    /// Returns `MpesaError::InvalidConfiguration` if the base URL does not
    /// parse or the HTTP client cannot be built.
    pub fn new(config: DarajaClientConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|err| MpesaError::from(InfraError::from(err)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .user_agent(concat!("mpesa-sdk/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Create a client from the SDK configuration.
    ///
    /// # Errors
    /// Same as [`new`](Self::new).
    pub fn from_config(config: &MpesaConfig) -> Result<Self> {
        Self::new(DarajaClientConfig::from(config))
    }

    /// Full URL for an endpoint, including its query.
    ///
    /// # Errors
    /// Returns `MpesaError::InvalidConfiguration` if the joined URL is
    /// invalid.
    pub fn endpoint_url(&self, endpoint: &Endpoint) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined).map_err(|err| MpesaError::from(InfraError::from(err)))?;
        if !endpoint.query.is_empty() {
            url.query_pairs_mut().extend_pairs(endpoint.query.iter());
        }
        Ok(url)
    }

    fn map_status_error(status: StatusCode, body: &[u8]) -> MpesaError {
        if let Ok(parsed) = serde_json::from_slice::<GatewayErrorBody>(body) {
            if parsed.error_code.is_some() || parsed.error_message.is_some() {
                let code = parsed.error_code.unwrap_or_else(|| status.as_u16().to_string());
                let message = parsed.error_message.unwrap_or_else(|| "Unknown error".to_string());
                warn!(
                    %status,
                    request_id = parsed.request_id.as_deref().unwrap_or(""),
                    error_code = %code,
                    "gateway rejected request"
                );
                return MpesaError::Api { code, message };
            }
        }

        warn!(%status, "gateway returned non-success status");
        MpesaError::Server {
            status: status.as_u16(),
            message: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

const fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
    }
}

#[async_trait]
impl ApiTransport for DarajaClient {
    #[instrument(skip(self, headers, body), fields(method = %endpoint.method, path = %endpoint.path))]
    async fn send(
        &self,
        endpoint: &Endpoint,
        headers: Headers,
        body: Option<Value>,
    ) -> Result<Value> {
        let url = self.endpoint_url(endpoint)?;

        let mut request = self.http.request(to_reqwest_method(endpoint.method), url);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &body {
            // Also sets `Content-Type: application/json`.
            request = request.json(body);
        }

        let response = self.http.send(request).await?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| MpesaError::from(InfraError::from(err)))?;

        if !status.is_success() {
            return Err(Self::map_status_error(status, &bytes));
        }

        debug!(%status, "gateway request succeeded");
        Ok(decode_slice(&bytes)?)
    }
}
