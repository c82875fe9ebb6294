//! Product services
//!
//! Each service asks the token provider for a bearer token, sends one
//! product request through the transport and decodes the acknowledgement.
//! Callback parsing needs no network and is exposed as associated functions.

pub mod b2c;
pub mod c2b;
pub mod stk_push;

pub use b2c::B2CTopUpService;
pub use c2b::C2BService;
pub use stk_push::StkPushService;

use mpesa_domain::{MpesaError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::ports::{ApiTransport, ApiTransportExt, Endpoint, Headers, TokenProvider};

/// Send `payload` to `endpoint` with a bearer token attached.
async fn authorized_post<P, T>(
    transport: &dyn ApiTransport,
    tokens: &dyn TokenProvider,
    endpoint: Endpoint,
    payload: &P,
) -> Result<T>
where
    P: Serialize + ?Sized,
    T: DeserializeOwned + Send,
{
    let body = to_body(payload)?;
    let token = tokens.access_token().await?;

    let mut headers = Headers::new();
    headers.insert("Authorization".to_string(), format!("Bearer {token}"));

    transport.send_typed(&endpoint, headers, Some(body)).await
}

fn to_body<P: Serialize + ?Sized>(payload: &P) -> Result<Value> {
    serde_json::to_value(payload)
        .map_err(|err| MpesaError::InvalidRequest(format!("failed to encode request: {err}")))
}
