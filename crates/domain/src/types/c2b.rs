//! Customer-to-business models
//!
//! Covers URL registration, sandbox simulation, the flat validation and
//! confirmation callbacks, and the reply a merchant sends to a validation
//! request.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::decode::{code_string, decode_slice, is_success_code, lenient_string, DecodeError};
use crate::impl_wire_string_enum;

/// What the gateway does when the validation URL cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    #[default]
    Completed,
    Cancelled,
}

impl_wire_string_enum!(ResponseType {
    Completed => "Completed",
    Cancelled => "Cancelled",
});

/// Kind of simulated C2B payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C2BCommandId {
    /// Till number
    CustomerBuyGoodsOnline,
    /// Paybill number
    CustomerPayBillOnline,
}

impl_wire_string_enum!(C2BCommandId {
    CustomerBuyGoodsOnline => "CustomerBuyGoodsOnline",
    CustomerPayBillOnline => "CustomerPayBillOnline",
});

/// Transaction type as reported in callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C2BTransactionType {
    PayBill,
    BuyGoods,
}

impl_wire_string_enum!(C2BTransactionType {
    PayBill => "Pay Bill",
    BuyGoods => "Buy Goods",
});

/// Register the confirmation and validation URLs for a short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterUrlRequest {
    #[serde(rename = "ShortCode")]
    pub short_code: String,
    #[serde(rename = "ResponseType")]
    pub response_type: ResponseType,
    #[serde(rename = "ConfirmationURL")]
    pub confirmation_url: String,
    #[serde(rename = "ValidationURL")]
    pub validation_url: String,
}

impl RegisterUrlRequest {
    #[must_use]
    pub fn new(
        short_code: impl Into<String>,
        response_type: ResponseType,
        confirmation_url: impl Into<String>,
        validation_url: impl Into<String>,
    ) -> Self {
        Self {
            short_code: short_code.into(),
            response_type,
            confirmation_url: confirmation_url.into(),
            validation_url: validation_url.into(),
        }
    }
}

/// Acknowledgement shared by URL registration and simulation.
///
/// The gateway misspells the conversation id key as
/// `OriginatorCoversationID`; the correct spelling is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct C2BResponse {
    #[serde(rename = "OriginatorCoversationID", alias = "OriginatorConversationID", default)]
    pub originator_conversation_id: String,
    #[serde(rename = "ResponseCode", deserialize_with = "code_string")]
    pub response_code: String,
    #[serde(rename = "ResponseDescription", default)]
    pub response_description: String,
}

impl C2BResponse {
    #[must_use]
    pub fn is_successful(&self) -> bool {
        is_success_code(&self.response_code)
    }
}

pub type RegisterUrlResponse = C2BResponse;
pub type C2BSimulateResponse = C2BResponse;

/// Simulate a customer payment. Sandbox only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct C2BSimulateRequest {
    pub short_code: String,
    pub command_id: C2BCommandId,
    pub amount: u64,
    /// Payer MSISDN, `2547XXXXXXXX`
    pub msisdn: String,
    /// Account reference, `None` for till payments.
    pub bill_ref_number: Option<String>,
}

impl C2BSimulateRequest {
    #[must_use]
    pub fn new(
        short_code: impl Into<String>,
        command_id: C2BCommandId,
        amount: u64,
        msisdn: impl Into<String>,
    ) -> Self {
        Self {
            short_code: short_code.into(),
            command_id,
            amount,
            msisdn: msisdn.into(),
            bill_ref_number: None,
        }
    }

    #[must_use]
    pub fn with_bill_ref_number(mut self, bill_ref_number: impl Into<String>) -> Self {
        self.bill_ref_number = Some(bill_ref_number.into());
        self
    }

    /// Wire body. Non-numeric short codes and MSISDNs encode as `0`.
    #[must_use]
    pub fn to_payload(&self) -> C2BSimulatePayload {
        C2BSimulatePayload {
            short_code: self.short_code.trim().parse().unwrap_or(0),
            command_id: self.command_id,
            amount: self.amount,
            msisdn: self.msisdn.trim().parse().unwrap_or(0),
            bill_ref_number: self.bill_ref_number.clone().unwrap_or_default(),
        }
    }
}

/// JSON body posted to `mpesa/c2b/v2/simulate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct C2BSimulatePayload {
    #[serde(rename = "ShortCode")]
    pub short_code: u64,
    #[serde(rename = "CommandID")]
    pub command_id: C2BCommandId,
    #[serde(rename = "Amount")]
    pub amount: u64,
    #[serde(rename = "Msisdn")]
    pub msisdn: u64,
    #[serde(rename = "BillRefNumber")]
    pub bill_ref_number: String,
}

/// Validation or confirmation notification for a customer payment.
///
/// Validation requests leave several fields blank (the balance, for one),
/// so every field defaults to an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct C2BCallback {
    #[serde(rename = "TransactionType", deserialize_with = "lenient_string")]
    pub transaction_type: String,
    #[serde(rename = "TransID", deserialize_with = "lenient_string")]
    pub trans_id: String,
    /// `yyyyMMddHHmmss`
    #[serde(rename = "TransTime", deserialize_with = "lenient_string")]
    pub trans_time: String,
    #[serde(rename = "TransAmount", deserialize_with = "lenient_string")]
    pub trans_amount: String,
    #[serde(rename = "BusinessShortCode", deserialize_with = "lenient_string")]
    pub business_short_code: String,
    #[serde(rename = "BillRefNumber", deserialize_with = "lenient_string")]
    pub bill_ref_number: String,
    #[serde(rename = "InvoiceNumber", deserialize_with = "lenient_string")]
    pub invoice_number: String,
    #[serde(rename = "OrgAccountBalance", deserialize_with = "lenient_string")]
    pub org_account_balance: String,
    #[serde(rename = "ThirdPartyTransID", deserialize_with = "lenient_string")]
    pub third_party_trans_id: String,
    #[serde(rename = "MSISDN", deserialize_with = "lenient_string")]
    pub msisdn: String,
    #[serde(rename = "FirstName", deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(rename = "MiddleName", deserialize_with = "lenient_string")]
    pub middle_name: String,
    #[serde(rename = "LastName", deserialize_with = "lenient_string")]
    pub last_name: String,
}

impl C2BCallback {
    /// Decode a raw callback body.
    ///
    /// # Errors
    /// Returns a [`DecodeError`] if the body is not a callback object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        decode_slice(bytes)
    }

    #[must_use]
    pub fn transaction_kind(&self) -> Option<C2BTransactionType> {
        self.transaction_type.parse().ok()
    }

    /// Amount as a float, `None` if blank or malformed.
    #[must_use]
    pub fn amount(&self) -> Option<f64> {
        self.trans_amount.trim().parse().ok()
    }

    /// Transaction time, interpreted as gateway local time.
    #[must_use]
    pub fn transaction_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.trans_time.trim(), "%Y%m%d%H%M%S").ok()
    }

    /// Non-empty name parts joined with single spaces.
    #[must_use]
    pub fn customer_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Codes a merchant may return from its validation URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C2BValidationResultCode {
    Accepted,
    InvalidMsisdn,
    InvalidAccountNumber,
    InvalidAmount,
    InvalidKycDetails,
    InvalidShortCode,
    OtherError,
}

impl_wire_string_enum!(C2BValidationResultCode {
    Accepted => "0",
    InvalidMsisdn => "C2B00011",
    InvalidAccountNumber => "C2B00012",
    InvalidAmount => "C2B00013",
    InvalidKycDetails => "C2B00014",
    InvalidShortCode => "C2B00015",
    OtherError => "C2B00016",
});

/// Body returned to the gateway from a validation URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct C2BValidationResponse {
    #[serde(rename = "ResultCode")]
    pub result_code: C2BValidationResultCode,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
}

impl C2BValidationResponse {
    #[must_use]
    pub fn accept() -> Self {
        Self { result_code: C2BValidationResultCode::Accepted, result_desc: "Accepted".into() }
    }

    #[must_use]
    pub fn reject(code: C2BValidationResultCode, description: impl Into<String>) -> Self {
        Self { result_code: code, result_desc: description.into() }
    }

    #[must_use]
    pub fn reject_invalid_msisdn() -> Self {
        Self::reject(C2BValidationResultCode::InvalidMsisdn, "Invalid phone number")
    }

    #[must_use]
    pub fn reject_invalid_account_number() -> Self {
        Self::reject(C2BValidationResultCode::InvalidAccountNumber, "Invalid account number")
    }

    #[must_use]
    pub fn reject_invalid_amount() -> Self {
        Self::reject(C2BValidationResultCode::InvalidAmount, "Invalid amount")
    }
}
