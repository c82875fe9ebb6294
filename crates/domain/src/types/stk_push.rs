//! STK push (Lipa Na M-Pesa Online) models
//!
//! A merchant asks the gateway to prompt a customer's handset for their PIN.
//! The synchronous response only acknowledges the request; the outcome
//! arrives later as a callback wrapped in `Body.stkCallback`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use chrono_tz::Africa::Nairobi;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::STK_DEFAULT_DESCRIPTION;
use crate::decode::{
    code_string, decode_slice, decode_value, is_success_code, lenient_result_code,
    option_one_or_many, unknown_result_code, DecodeError,
};
use crate::errors::{MpesaError, Result};
use crate::impl_wire_string_enum;
use crate::types::value::{KeyedParameter, ParameterLookup};

/// Which kind of short code is being paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StkPushTransactionType {
    /// Paybill number
    #[default]
    CustomerPayBillOnline,
    /// Till number
    CustomerBuyGoodsOnline,
}

impl_wire_string_enum!(StkPushTransactionType {
    CustomerPayBillOnline => "CustomerPayBillOnline",
    CustomerBuyGoodsOnline => "CustomerBuyGoodsOnline",
});

/// Gateway timestamp, `yyyyMMddHHmmss` in Nairobi local time.
#[must_use]
pub fn stk_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Nairobi).format("%Y%m%d%H%M%S").to_string()
}

/// `base64(short_code + pass_key + timestamp)`.
#[must_use]
pub fn stk_password(short_code: &str, pass_key: &str, timestamp: &str) -> String {
    STANDARD.encode(format!("{short_code}{pass_key}{timestamp}"))
}

fn numeric_or_zero(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}

/// A request to prompt a customer for payment.
#[derive(Clone, PartialEq, Eq)]
pub struct StkPushRequest {
    pub business_short_code: String,
    pub pass_key: String,
    pub amount: u64,
    /// Customer MSISDN, `2547XXXXXXXX`
    pub phone_number: String,
    pub callback_url: String,
    /// Shown in the USSD prompt, at most 12 characters.
    pub account_reference: String,
    /// At most 13 characters.
    pub transaction_desc: String,
    pub transaction_type: StkPushTransactionType,
}

impl StkPushRequest {
    /// Create a paybill request with the default description.
    #[must_use]
    pub fn new(
        business_short_code: impl Into<String>,
        pass_key: impl Into<String>,
        amount: u64,
        phone_number: impl Into<String>,
        callback_url: impl Into<String>,
        account_reference: impl Into<String>,
    ) -> Self {
        Self {
            business_short_code: business_short_code.into(),
            pass_key: pass_key.into(),
            amount,
            phone_number: phone_number.into(),
            callback_url: callback_url.into(),
            account_reference: account_reference.into(),
            transaction_desc: STK_DEFAULT_DESCRIPTION.to_string(),
            transaction_type: StkPushTransactionType::default(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, transaction_desc: impl Into<String>) -> Self {
        self.transaction_desc = transaction_desc.into();
        self
    }

    #[must_use]
    pub const fn with_transaction_type(mut self, transaction_type: StkPushTransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    /// Reject requests the gateway would refuse anyway.
    ///
    /// # Errors
    /// Returns `MpesaError::InvalidRequest` describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.amount == 0 {
            return Err(MpesaError::InvalidRequest("amount must be greater than zero".into()));
        }
        if self.business_short_code.trim().parse::<u64>().is_err() {
            return Err(MpesaError::InvalidRequest(format!(
                "business short code '{}' is not numeric",
                self.business_short_code
            )));
        }
        if self.phone_number.trim().parse::<u64>().is_err() {
            return Err(MpesaError::InvalidRequest(format!(
                "phone number '{}' is not numeric",
                self.phone_number
            )));
        }
        if self.callback_url.trim().is_empty() {
            return Err(MpesaError::InvalidRequest("callback URL must not be empty".into()));
        }
        Ok(())
    }

    /// Wire body for the given timestamp.
    ///
    /// Non-numeric short codes and phone numbers encode as `0`; call
    /// [`validate`](Self::validate) first to reject them instead.
    #[must_use]
    pub fn to_payload(&self, timestamp: &str) -> StkPushPayload {
        let short_code = numeric_or_zero(&self.business_short_code);
        let phone = numeric_or_zero(&self.phone_number);
        StkPushPayload {
            business_short_code: short_code,
            password: stk_password(&self.business_short_code, &self.pass_key, timestamp),
            timestamp: timestamp.to_string(),
            transaction_type: self.transaction_type,
            amount: self.amount,
            party_a: phone,
            party_b: short_code,
            phone_number: phone,
            callback_url: self.callback_url.clone(),
            account_reference: self.account_reference.clone(),
            transaction_desc: self.transaction_desc.clone(),
        }
    }
}

impl std::fmt::Debug for StkPushRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StkPushRequest")
            .field("business_short_code", &self.business_short_code)
            .field("pass_key", &"[REDACTED]")
            .field("amount", &self.amount)
            .field("phone_number", &self.phone_number)
            .field("callback_url", &self.callback_url)
            .field("account_reference", &self.account_reference)
            .field("transaction_desc", &self.transaction_desc)
            .field("transaction_type", &self.transaction_type)
            .finish()
    }
}

/// JSON body posted to `mpesa/stkpush/v1/processrequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StkPushPayload {
    #[serde(rename = "BusinessShortCode")]
    pub business_short_code: u64,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "TransactionType")]
    pub transaction_type: StkPushTransactionType,
    #[serde(rename = "Amount")]
    pub amount: u64,
    #[serde(rename = "PartyA")]
    pub party_a: u64,
    #[serde(rename = "PartyB")]
    pub party_b: u64,
    #[serde(rename = "PhoneNumber")]
    pub phone_number: u64,
    #[serde(rename = "CallBackURL")]
    pub callback_url: String,
    #[serde(rename = "AccountReference")]
    pub account_reference: String,
    #[serde(rename = "TransactionDesc")]
    pub transaction_desc: String,
}

/// Synchronous acknowledgement of an STK push request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StkPushResponse {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResponseCode", deserialize_with = "code_string")]
    pub response_code: String,
    #[serde(rename = "ResponseDescription")]
    pub response_description: String,
    #[serde(rename = "CustomerMessage", default)]
    pub customer_message: String,
}

impl StkPushResponse {
    /// The request was accepted for processing.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        is_success_code(&self.response_code)
    }
}

/// Known STK push result codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StkPushResultCode {
    Success,
    InsufficientBalance,
    AmountBelowMinimum,
    AmountExceedsMaximum,
    ExceedsDailyLimit,
    DuplicateRequest,
    TransactionExpired,
    UssdMessageTooLong,
    CancelledByUser,
    PhoneUnreachable,
    WrongPin,
    WrongTransactionType,
}

impl StkPushResultCode {
    /// Map a numeric result code, `None` for codes not listed here.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Self::Success,
            1 => Self::InsufficientBalance,
            2 => Self::AmountBelowMinimum,
            3 => Self::AmountExceedsMaximum,
            4 => Self::ExceedsDailyLimit,
            17 => Self::DuplicateRequest,
            1019 => Self::TransactionExpired,
            1025 => Self::UssdMessageTooLong,
            1032 => Self::CancelledByUser,
            1037 => Self::PhoneUnreachable,
            2001 => Self::WrongPin,
            2028 => Self::WrongTransactionType,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Success => 0,
            Self::InsufficientBalance => 1,
            Self::AmountBelowMinimum => 2,
            Self::AmountExceedsMaximum => 3,
            Self::ExceedsDailyLimit => 4,
            Self::DuplicateRequest => 17,
            Self::TransactionExpired => 1019,
            Self::UssdMessageTooLong => 1025,
            Self::CancelledByUser => 1032,
            Self::PhoneUnreachable => 1037,
            Self::WrongPin => 2001,
            Self::WrongTransactionType => 2028,
        }
    }

    /// Human-readable explanation.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "The transaction was processed successfully",
            Self::InsufficientBalance => "Insufficient balance",
            Self::AmountBelowMinimum => "Amount is below the minimum allowed",
            Self::AmountExceedsMaximum => "Amount exceeds the maximum allowed",
            Self::ExceedsDailyLimit => "Daily transfer limit exceeded",
            Self::DuplicateRequest => "Duplicate request detected",
            Self::TransactionExpired => "Transaction expired before the customer responded",
            Self::UssdMessageTooLong => "USSD prompt message too long",
            Self::CancelledByUser => "Request cancelled by the customer",
            Self::PhoneUnreachable => "Customer phone could not be reached",
            Self::WrongPin => "Customer entered the wrong PIN",
            Self::WrongTransactionType => "Transaction type does not match the short code",
        }
    }
}

/// `CallbackMetadata` block, present only for successful payments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item")]
    pub items: Vec<KeyedParameter>,
}

/// A `CallbackMetadata` block counts as present only when it carries an
/// `Item` key.
fn metadata_with_items<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<CallbackMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct RawMetadata {
        #[serde(rename = "Item", default, deserialize_with = "option_one_or_many")]
        items: Option<Vec<KeyedParameter>>,
    }

    Ok(Option::<RawMetadata>::deserialize(deserializer)?
        .and_then(|raw| raw.items)
        .map(|items| CallbackMetadata { items }))
}

/// Outcome of an STK push, as delivered to the callback URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StkPushCallback {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(
        rename = "ResultCode",
        default = "unknown_result_code",
        deserialize_with = "lenient_result_code"
    )]
    pub result_code: i64,
    #[serde(rename = "ResultDesc", default)]
    pub result_desc: String,
    #[serde(
        rename = "CallbackMetadata",
        default,
        deserialize_with = "metadata_with_items",
        skip_serializing_if = "Option::is_none"
    )]
    pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Deserialize)]
struct StkCallbackEnvelope {
    #[serde(rename = "Body")]
    body: StkCallbackBody,
}

#[derive(Deserialize)]
struct StkCallbackBody {
    #[serde(rename = "stkCallback")]
    stk_callback: StkPushCallback,
}

impl StkPushCallback {
    /// Decode the full `{"Body": {"stkCallback": ...}}` envelope.
    ///
    /// # Errors
    /// Returns a [`DecodeError`] if the envelope or callback is malformed.
    pub fn from_slice(bytes: &[u8]) -> std::result::Result<Self, DecodeError> {
        decode_slice::<StkCallbackEnvelope>(bytes).map(|envelope| envelope.body.stk_callback)
    }

    /// Decode the envelope from an already-parsed JSON value.
    ///
    /// # Errors
    /// Returns a [`DecodeError`] if the envelope or callback is malformed.
    pub fn from_value(value: serde_json::Value) -> std::result::Result<Self, DecodeError> {
        decode_value::<StkCallbackEnvelope>(value).map(|envelope| envelope.body.stk_callback)
    }

    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.result_code == 0
    }

    /// The result code as a known variant.
    #[must_use]
    pub const fn result_code_kind(&self) -> Option<StkPushResultCode> {
        StkPushResultCode::from_code(self.result_code)
    }

    /// Metadata entries, empty when the block is absent.
    #[must_use]
    pub fn metadata_items(&self) -> &[KeyedParameter] {
        self.callback_metadata.as_ref().map_or(&[], |metadata| metadata.items.as_slice())
    }

    #[must_use]
    pub fn amount(&self) -> Option<f64> {
        self.metadata_items().f64_value("Amount")
    }

    #[must_use]
    pub fn mpesa_receipt_number(&self) -> Option<&str> {
        self.metadata_items().str_value("MpesaReceiptNumber")
    }

    /// `yyyyMMddHHmmss` as an integer, e.g. `20191219102115`.
    #[must_use]
    pub fn transaction_date(&self) -> Option<i64> {
        self.metadata_items().i64_value("TransactionDate")
    }

    #[must_use]
    pub fn phone_number(&self) -> Option<i64> {
        self.metadata_items().i64_value("PhoneNumber")
    }
}
