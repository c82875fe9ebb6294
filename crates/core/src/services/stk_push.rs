//! Lipa Na M-Pesa Online (STK push) service

use std::sync::Arc;

use chrono::Utc;
use mpesa_domain::{stk_timestamp, StkPushCallback, StkPushRequest, StkPushResponse, Result};
use tracing::{debug, instrument};

use super::authorized_post;
use crate::ports::{ApiTransport, Endpoint, TokenProvider};

/// Prompts customers for payment on their handset.
#[derive(Clone)]
pub struct StkPushService {
    transport: Arc<dyn ApiTransport>,
    tokens: Arc<dyn TokenProvider>,
}

impl StkPushService {
    pub fn new(transport: Arc<dyn ApiTransport>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { transport, tokens }
    }

    /// Send an STK push request.
    ///
    /// The timestamp and password are generated at call time. The response
    /// only acknowledges the prompt; the payment outcome arrives on the
    /// callback URL.
    ///
    /// # Errors
    /// `InvalidRequest` if the request fails validation, otherwise any
    /// authentication, transport or decoding failure.
    #[instrument(skip(self, request), fields(short_code = %request.business_short_code))]
    pub async fn initiate_payment(&self, request: &StkPushRequest) -> Result<StkPushResponse> {
        request.validate()?;

        let timestamp = stk_timestamp(Utc::now());
        let payload = request.to_payload(&timestamp);
        let response: StkPushResponse =
            authorized_post(self.transport.as_ref(), self.tokens.as_ref(), Endpoint::stk_push(), &payload)
                .await?;

        debug!(
            checkout_request_id = %response.checkout_request_id,
            accepted = response.is_successful(),
            "STK push acknowledged"
        );
        Ok(response)
    }

    /// Paybill push with the default `"Payment"` description.
    ///
    /// # Errors
    /// Same as [`initiate_payment`](Self::initiate_payment).
    pub async fn initiate_payment_with(
        &self,
        business_short_code: &str,
        pass_key: &str,
        amount: u64,
        phone_number: &str,
        callback_url: &str,
        account_reference: &str,
    ) -> Result<StkPushResponse> {
        let request = StkPushRequest::new(
            business_short_code,
            pass_key,
            amount,
            phone_number,
            callback_url,
            account_reference,
        );
        self.initiate_payment(&request).await
    }

    /// Decode the body posted to the callback URL.
    ///
    /// # Errors
    /// `MpesaError::Decoding` if the body is not a push-payment callback.
    pub fn parse_callback(body: &[u8]) -> Result<StkPushCallback> {
        Ok(StkPushCallback::from_slice(body)?)
    }
}
