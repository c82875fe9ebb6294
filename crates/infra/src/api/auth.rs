//! Client-credentials exchange against `oauth/v1/generate`

use std::sync::Arc;

use async_trait::async_trait;
use mpesa_core::{ApiTransport, ApiTransportExt, Endpoint, Headers, TokenFetcher};
use mpesa_domain::{AccessTokenResponse, Result};
use tracing::{debug, instrument, warn};

/// [`TokenFetcher`] that performs the OAuth exchange over an
/// [`ApiTransport`].
///
/// Every failure, including transport and decoding failures, surfaces as
/// `MpesaError::AuthenticationFailed`.
#[derive(Clone)]
pub struct OAuthTokenFetcher {
    transport: Arc<dyn ApiTransport>,
}

impl OAuthTokenFetcher {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl TokenFetcher for OAuthTokenFetcher {
    #[instrument(skip_all)]
    async fn exchange(&self, basic_auth: &str) -> Result<AccessTokenResponse> {
        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), basic_auth.to_string());

        match self.transport.send_typed::<AccessTokenResponse>(&Endpoint::oauth(), headers, None).await
        {
            Ok(response) => {
                debug!(expires_in = ?response.expires_in, "token exchange succeeded");
                Ok(response)
            }
            Err(err) => {
                warn!(error = %err, "token exchange failed");
                Err(err.into_authentication_failure())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mpesa_core::testing::MockTransport;
    use mpesa_domain::constants::OAUTH_PATH;
    use mpesa_domain::MpesaError;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_exchange_sends_basic_header() {
        let transport = MockTransport::new().with_response(
            OAUTH_PATH,
            json!({ "access_token": "abc", "expires_in": "3599" }),
        );
        let fetcher = OAuthTokenFetcher::new(Arc::new(transport.clone()));

        let response = fetcher.exchange("Basic a2V5OnNlY3JldA==").await.unwrap();
        assert_eq!(response.access_token, "abc");
        assert_eq!(response.lifetime_secs(), 3599);

        let request = transport.last_request().unwrap();
        assert_eq!(request.endpoint, Endpoint::oauth());
        assert!(request.body.is_none());
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Basic a2V5OnNlY3JldA==")
        );
    }

    /// Validates the failed exchange scenario.
    ///
    /// Assertions:
    /// - A gateway rejection becomes `AuthenticationFailed`.
    /// - The original description is kept in the message.
    #[tokio::test]
    async fn test_gateway_error_becomes_authentication_failure() {
        let transport = MockTransport::new().with_error(
            OAUTH_PATH,
            MpesaError::Api { code: "400.008.01".into(), message: "Invalid Authentication".into() },
        );
        let fetcher = OAuthTokenFetcher::new(Arc::new(transport));

        let err = fetcher.exchange("Basic bad").await.unwrap_err();
        match err {
            MpesaError::AuthenticationFailed(message) => {
                assert!(message.contains("Invalid Authentication"));
            }
            other => panic!("expected authentication failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_token_body_becomes_authentication_failure() {
        let transport =
            MockTransport::new().with_response(OAUTH_PATH, json!({ "expires_in": "3599" }));
        let fetcher = OAuthTokenFetcher::new(Arc::new(transport));

        let err = fetcher.exchange("Basic x").await.unwrap_err();
        assert!(matches!(err, MpesaError::AuthenticationFailed(_)));
    }
}
