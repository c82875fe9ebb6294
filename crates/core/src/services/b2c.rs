//! Business account top-up service

use std::sync::Arc;

use mpesa_domain::{B2CTopUpRequest, B2CTopUpResponse, B2CTopUpResult, Result};
use tracing::{debug, instrument};

use super::authorized_post;
use crate::ports::{ApiTransport, Endpoint, TokenProvider};

/// Loads funds into a B2C utility account.
#[derive(Clone)]
pub struct B2CTopUpService {
    transport: Arc<dyn ApiTransport>,
    tokens: Arc<dyn TokenProvider>,
}

impl B2CTopUpService {
    pub fn new(transport: Arc<dyn ApiTransport>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { transport, tokens }
    }

    /// Submit a top-up. The outcome is posted later to the result URL.
    ///
    /// # Errors
    /// `InvalidRequest` if the request fails validation, otherwise any
    /// authentication, transport or decoding failure.
    #[instrument(skip(self, request), fields(party_a = %request.party_a, party_b = %request.party_b))]
    pub async fn top_up(&self, request: &B2CTopUpRequest) -> Result<B2CTopUpResponse> {
        request.validate()?;

        let response: B2CTopUpResponse = authorized_post(
            self.transport.as_ref(),
            self.tokens.as_ref(),
            Endpoint::b2c_top_up(),
            &request.to_payload(),
        )
        .await?;
        debug!(
            conversation_id = %response.conversation_id,
            accepted = response.is_successful(),
            "Top-up acknowledged"
        );
        Ok(response)
    }

    /// Decode the body posted to the result URL.
    ///
    /// # Errors
    /// `MpesaError::Decoding` if the body is not a result envelope.
    pub fn parse_result(body: &[u8]) -> Result<B2CTopUpResult> {
        Ok(B2CTopUpResult::from_slice(body)?)
    }
}
