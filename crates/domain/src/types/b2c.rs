//! Business account top-up models
//!
//! The top-up request is acknowledged synchronously; the outcome is posted
//! to `ResultURL` as a `Result` envelope whose parameter containers may hold
//! a list or a single bare object.

use serde::{Deserialize, Serialize};

use crate::constants::{B2C_COMMAND_ID, B2C_DEFAULT_REMARKS, B2C_SHORTCODE_IDENTIFIER_TYPE};
use crate::decode::{
    code_string, decode_slice, decode_value, is_success_code, lenient_result_code,
    lenient_string, option_one_or_many, optional_string, unknown_result_code, DecodeError,
};
use crate::errors::{MpesaError, Result};
use crate::types::value::{HeterogeneousValue, KeyedParameter, ParameterLookup};

/// Load funds into a B2C utility account.
///
/// `security_credential` must already be encrypted with the gateway's
/// public key.
#[derive(Clone, PartialEq, Eq)]
pub struct B2CTopUpRequest {
    pub initiator: String,
    pub security_credential: String,
    /// Debit short code
    pub party_a: String,
    /// Credit short code
    pub party_b: String,
    pub amount: u64,
    pub account_reference: String,
    pub result_url: String,
    pub queue_timeout_url: String,
    /// Requester MSISDN
    pub requester: Option<String>,
    /// At most 100 characters, `"OK"` when absent.
    pub remarks: Option<String>,
}

impl B2CTopUpRequest {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initiator: impl Into<String>,
        security_credential: impl Into<String>,
        party_a: impl Into<String>,
        party_b: impl Into<String>,
        amount: u64,
        account_reference: impl Into<String>,
        result_url: impl Into<String>,
        queue_timeout_url: impl Into<String>,
    ) -> Self {
        Self {
            initiator: initiator.into(),
            security_credential: security_credential.into(),
            party_a: party_a.into(),
            party_b: party_b.into(),
            amount,
            account_reference: account_reference.into(),
            result_url: result_url.into(),
            queue_timeout_url: queue_timeout_url.into(),
            requester: None,
            remarks: None,
        }
    }

    #[must_use]
    pub fn with_requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = Some(requester.into());
        self
    }

    #[must_use]
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// # Errors
    /// Returns `MpesaError::InvalidRequest` for a zero amount or blank
    /// callback URLs.
    pub fn validate(&self) -> Result<()> {
        if self.amount == 0 {
            return Err(MpesaError::InvalidRequest("amount must be greater than zero".into()));
        }
        if self.result_url.trim().is_empty() || self.queue_timeout_url.trim().is_empty() {
            return Err(MpesaError::InvalidRequest(
                "result and queue timeout URLs must not be empty".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_payload(&self) -> B2CTopUpPayload {
        B2CTopUpPayload {
            initiator: self.initiator.clone(),
            security_credential: self.security_credential.clone(),
            command_id: B2C_COMMAND_ID,
            sender_identifier_type: B2C_SHORTCODE_IDENTIFIER_TYPE,
            receiver_identifier_type: B2C_SHORTCODE_IDENTIFIER_TYPE,
            amount: self.amount.to_string(),
            party_a: self.party_a.clone(),
            party_b: self.party_b.clone(),
            account_reference: self.account_reference.clone(),
            requester: self.requester.clone(),
            remarks: self.remarks.clone().unwrap_or_else(|| B2C_DEFAULT_REMARKS.to_string()),
            queue_timeout_url: self.queue_timeout_url.clone(),
            result_url: self.result_url.clone(),
        }
    }
}

impl std::fmt::Debug for B2CTopUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("B2CTopUpRequest")
            .field("initiator", &self.initiator)
            .field("security_credential", &"[REDACTED]")
            .field("party_a", &self.party_a)
            .field("party_b", &self.party_b)
            .field("amount", &self.amount)
            .field("account_reference", &self.account_reference)
            .field("result_url", &self.result_url)
            .field("queue_timeout_url", &self.queue_timeout_url)
            .field("requester", &self.requester)
            .field("remarks", &self.remarks)
            .finish()
    }
}

/// JSON body posted to `mpesa/b2b/v1/paymentrequest`.
///
/// `RecieverIdentifierType` is spelled the way the gateway expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct B2CTopUpPayload {
    #[serde(rename = "Initiator")]
    pub initiator: String,
    #[serde(rename = "SecurityCredential")]
    pub security_credential: String,
    #[serde(rename = "CommandID")]
    pub command_id: &'static str,
    #[serde(rename = "SenderIdentifierType")]
    pub sender_identifier_type: &'static str,
    #[serde(rename = "RecieverIdentifierType")]
    pub receiver_identifier_type: &'static str,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "PartyA")]
    pub party_a: String,
    #[serde(rename = "PartyB")]
    pub party_b: String,
    #[serde(rename = "AccountReference")]
    pub account_reference: String,
    #[serde(rename = "Requester", skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
    #[serde(rename = "Remarks")]
    pub remarks: String,
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    #[serde(rename = "ResultURL")]
    pub result_url: String,
}

/// Synchronous acknowledgement of a top-up request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct B2CTopUpResponse {
    #[serde(rename = "OriginatorConversationID", default)]
    pub originator_conversation_id: String,
    #[serde(rename = "ConversationID", default)]
    pub conversation_id: String,
    #[serde(rename = "ResponseCode", deserialize_with = "code_string")]
    pub response_code: String,
    #[serde(rename = "ResponseDescription", default)]
    pub response_description: String,
}

impl B2CTopUpResponse {
    #[must_use]
    pub fn is_successful(&self) -> bool {
        is_success_code(&self.response_code)
    }
}

/// Entry of `ReferenceData`. Values are plain strings, or absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(
        rename = "Value",
        default,
        deserialize_with = "optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
}

#[derive(Deserialize)]
struct ParameterContainer {
    #[serde(rename = "ResultParameter", default, deserialize_with = "option_one_or_many")]
    items: Option<Vec<KeyedParameter>>,
}

#[derive(Deserialize)]
struct ReferenceContainer {
    #[serde(rename = "ReferenceItem", default, deserialize_with = "option_one_or_many")]
    items: Option<Vec<ReferenceItem>>,
}

#[derive(Deserialize)]
struct RawResult {
    #[serde(rename = "ResultType", default)]
    result_type: Option<i64>,
    #[serde(
        rename = "ResultCode",
        default = "unknown_result_code",
        deserialize_with = "lenient_result_code"
    )]
    result_code: i64,
    #[serde(rename = "ResultDesc", default, deserialize_with = "lenient_string")]
    result_desc: String,
    #[serde(rename = "OriginatorConversationID", default, deserialize_with = "lenient_string")]
    originator_conversation_id: String,
    #[serde(rename = "ConversationID", default, deserialize_with = "lenient_string")]
    conversation_id: String,
    #[serde(rename = "TransactionID", default, deserialize_with = "lenient_string")]
    transaction_id: String,
    #[serde(rename = "ResultParameters", default)]
    result_parameters: Option<ParameterContainer>,
    #[serde(rename = "ReferenceData", default)]
    reference_data: Option<ReferenceContainer>,
}

#[derive(Deserialize)]
struct ResultEnvelope {
    #[serde(rename = "Result")]
    result: RawResult,
}

/// Outcome of a top-up, as delivered to `ResultURL`.
///
/// `result_parameters` and `reference_data` are `None` when the gateway
/// omits the container or sends it without entries.
#[derive(Debug, Clone, PartialEq)]
pub struct B2CTopUpResult {
    pub result_type: Option<i64>,
    pub result_code: i64,
    pub result_desc: String,
    pub originator_conversation_id: String,
    pub conversation_id: String,
    pub transaction_id: String,
    pub result_parameters: Option<Vec<KeyedParameter>>,
    pub reference_data: Option<Vec<ReferenceItem>>,
}

impl From<RawResult> for B2CTopUpResult {
    fn from(raw: RawResult) -> Self {
        Self {
            result_type: raw.result_type,
            result_code: raw.result_code,
            result_desc: raw.result_desc,
            originator_conversation_id: raw.originator_conversation_id,
            conversation_id: raw.conversation_id,
            transaction_id: raw.transaction_id,
            result_parameters: raw.result_parameters.and_then(|container| container.items),
            reference_data: raw.reference_data.and_then(|container| container.items),
        }
    }
}

impl B2CTopUpResult {
    /// Decode the full `{"Result": {...}}` envelope.
    ///
    /// # Errors
    /// Returns a [`DecodeError`] if the envelope or any entry is malformed.
    pub fn from_slice(bytes: &[u8]) -> std::result::Result<Self, DecodeError> {
        decode_slice::<ResultEnvelope>(bytes).map(|envelope| envelope.result.into())
    }

    /// Decode the envelope from an already-parsed JSON value.
    ///
    /// # Errors
    /// Returns a [`DecodeError`] if the envelope or any entry is malformed.
    pub fn from_value(value: serde_json::Value) -> std::result::Result<Self, DecodeError> {
        decode_value::<ResultEnvelope>(value).map(|envelope| envelope.result.into())
    }

    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.result_code == 0
    }

    /// Result parameters, empty when the container is absent.
    #[must_use]
    pub fn parameters(&self) -> &[KeyedParameter] {
        self.result_parameters.as_deref().unwrap_or_default()
    }

    /// Value of the result parameter with the given key.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&HeterogeneousValue> {
        self.parameters().value_of(key)
    }

    /// Value of the reference item with the given key.
    #[must_use]
    pub fn reference(&self, key: &str) -> Option<&str> {
        self.reference_data
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|item| item.key == key)
            .and_then(|item| item.value.as_deref())
    }

    #[must_use]
    pub fn amount(&self) -> Option<f64> {
        self.parameters().f64_value("Amount")
    }

    #[must_use]
    pub fn transaction_receipt(&self) -> Option<&str> {
        self.parameters().str_value("TransactionReceipt")
    }

    #[must_use]
    pub fn trans_completed_time(&self) -> Option<&str> {
        self.parameters().str_value("TransCompletedTime")
    }

    #[must_use]
    pub fn receiver_party_public_name(&self) -> Option<&str> {
        self.parameters().str_value("ReceiverPartyPublicName")
    }

    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        self.parameters().str_value("Currency")
    }

    #[must_use]
    pub fn debit_party_charges(&self) -> Option<&str> {
        self.parameters().str_value("DebitPartyCharges")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request() -> B2CTopUpRequest {
        B2CTopUpRequest::new(
            "testapi",
            "encrypted==",
            "600979",
            "600000",
            239,
            "353353",
            "https://example.com/result",
            "https://example.com/timeout",
        )
    }

    /// Validates the wire encoding of a top-up request.
    ///
    /// Assertions:
    /// - Fixed command and identifier fields are filled in.
    /// - The amount is sent as a string.
    /// - Remarks default to `"OK"` and an absent requester is omitted.
    #[test]
    fn test_payload_encoding() {
        let payload = serde_json::to_value(request().to_payload()).unwrap();

        assert_eq!(payload["CommandID"], "BusinessPayToBulk");
        assert_eq!(payload["SenderIdentifierType"], "4");
        assert_eq!(payload["RecieverIdentifierType"], "4");
        assert_eq!(payload["Amount"], "239");
        assert_eq!(payload["Remarks"], "OK");
        assert_eq!(payload["QueueTimeOutURL"], "https://example.com/timeout");
        assert!(payload.get("Requester").is_none());
    }

    #[test]
    fn test_payload_with_optional_fields() {
        let payload = request().with_requester("254708374149").with_remarks("float").to_payload();
        assert_eq!(payload.requester.as_deref(), Some("254708374149"));
        assert_eq!(payload.remarks, "float");
    }

    #[test]
    fn test_validate() {
        assert!(request().validate().is_ok());
        let mut zero = request();
        zero.amount = 0;
        assert!(matches!(zero.validate(), Err(MpesaError::InvalidRequest(_))));
    }

    #[test]
    fn test_debug_redacts_credential() {
        assert!(!format!("{:?}", request()).contains("encrypted=="));
    }

    #[test]
    fn test_response_decoding() {
        let response: B2CTopUpResponse = serde_json::from_value(json!({
            "OriginatorConversationID": "5118-111210482-1",
            "ConversationID": "AG_20230420_2010759fd5662ef6d054",
            "ResponseCode": "0",
            "ResponseDescription": "Accept the service request successfully."
        }))
        .unwrap();
        assert!(response.is_successful());
    }

    #[test]
    fn test_result_without_containers() {
        let result = B2CTopUpResult::from_value(json!({
            "Result": {
                "ResultType": 0,
                "ResultCode": 2001,
                "ResultDesc": "The initiator information is invalid.",
                "OriginatorConversationID": "a",
                "ConversationID": "b",
                "TransactionID": "c"
            }
        }))
        .unwrap();

        assert!(!result.is_successful());
        assert!(result.result_parameters.is_none());
        assert!(result.reference_data.is_none());
        assert_eq!(result.amount(), None);
        assert!(result.parameters().is_empty());
    }

    #[test]
    fn test_empty_or_null_containers_are_absent() {
        let result = B2CTopUpResult::from_value(json!({
            "Result": {
                "ResultCode": 2001,
                "ResultParameters": {},
                "ReferenceData": { "ReferenceItem": null }
            }
        }))
        .unwrap();

        assert!(result.result_parameters.is_none());
        assert!(result.reference_data.is_none());

        let result = B2CTopUpResult::from_value(json!({
            "Result": {
                "ResultCode": 2001,
                "ResultParameters": { "ResultParameter": null },
                "ReferenceData": null
            }
        }))
        .unwrap();

        assert!(result.result_parameters.is_none());
        assert!(result.reference_data.is_none());
    }

    #[test]
    fn test_empty_parameter_list_is_kept() {
        let result = B2CTopUpResult::from_value(json!({
            "Result": { "ResultCode": 0, "ResultParameters": { "ResultParameter": [] } }
        }))
        .unwrap();

        assert_eq!(result.result_parameters, Some(Vec::new()));
    }

    #[test]
    fn test_reference_item_lookup() {
        let result = B2CTopUpResult::from_value(json!({
            "Result": {
                "ResultCode": "0",
                "ReferenceData": { "ReferenceItem": [
                    { "Key": "QueueTimeoutURL", "Value": "https://example.com/timeout" },
                    { "Key": "Occasion" }
                ]}
            }
        }))
        .unwrap();

        assert!(result.is_successful());
        assert_eq!(result.reference("QueueTimeoutURL"), Some("https://example.com/timeout"));
        assert_eq!(result.reference("Occasion"), None);
        assert_eq!(result.reference_data.as_ref().map(Vec::len), Some(2));
    }
}
