//! Customer-to-business service

use std::sync::Arc;

use mpesa_domain::{
    C2BCallback, C2BCommandId, C2BSimulateRequest, C2BSimulateResponse, RegisterUrlRequest,
    RegisterUrlResponse, ResponseType, Result,
};
use tracing::{debug, instrument};

use super::authorized_post;
use crate::ports::{ApiTransport, Endpoint, TokenProvider};

/// URL registration, sandbox simulation and callback parsing for C2B.
#[derive(Clone)]
pub struct C2BService {
    transport: Arc<dyn ApiTransport>,
    tokens: Arc<dyn TokenProvider>,
}

impl C2BService {
    pub fn new(transport: Arc<dyn ApiTransport>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { transport, tokens }
    }

    /// Register confirmation and validation URLs.
    ///
    /// Production short codes accept this once; the sandbox allows repeats.
    ///
    /// # Errors
    /// Any authentication, transport or decoding failure.
    #[instrument(skip(self, request), fields(short_code = %request.short_code))]
    pub async fn register_urls(&self, request: &RegisterUrlRequest) -> Result<RegisterUrlResponse> {
        let response: RegisterUrlResponse = authorized_post(
            self.transport.as_ref(),
            self.tokens.as_ref(),
            Endpoint::c2b_register_url(),
            request,
        )
        .await?;
        debug!(accepted = response.is_successful(), "C2B URLs registered");
        Ok(response)
    }

    /// # Errors
    /// Same as [`register_urls`](Self::register_urls).
    pub async fn register_urls_with(
        &self,
        short_code: &str,
        response_type: ResponseType,
        confirmation_url: &str,
        validation_url: &str,
    ) -> Result<RegisterUrlResponse> {
        let request =
            RegisterUrlRequest::new(short_code, response_type, confirmation_url, validation_url);
        self.register_urls(&request).await
    }

    /// Simulate a customer payment. Sandbox only.
    ///
    /// # Errors
    /// Any authentication, transport or decoding failure.
    #[instrument(skip(self, request), fields(short_code = %request.short_code))]
    pub async fn simulate(&self, request: &C2BSimulateRequest) -> Result<C2BSimulateResponse> {
        authorized_post(
            self.transport.as_ref(),
            self.tokens.as_ref(),
            Endpoint::c2b_simulate(),
            &request.to_payload(),
        )
        .await
    }

    /// # Errors
    /// Same as [`simulate`](Self::simulate).
    pub async fn simulate_with(
        &self,
        short_code: &str,
        command_id: C2BCommandId,
        amount: u64,
        msisdn: &str,
        bill_ref_number: Option<&str>,
    ) -> Result<C2BSimulateResponse> {
        let mut request = C2BSimulateRequest::new(short_code, command_id, amount, msisdn);
        if let Some(reference) = bill_ref_number {
            request = request.with_bill_ref_number(reference);
        }
        self.simulate(&request).await
    }

    /// Decode a validation or confirmation callback body.
    ///
    /// # Errors
    /// `MpesaError::Decoding` if the body is not a C2B callback.
    pub fn parse_callback(body: &[u8]) -> Result<C2BCallback> {
        Ok(C2BCallback::from_slice(body)?)
    }
}
