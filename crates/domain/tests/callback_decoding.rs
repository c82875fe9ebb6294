//! Integration tests for callback decoding
//!
//! Feeds realistic gateway payloads through the public decoding entry points
//! and checks the typed results and their accessors.

use mpesa_domain::{
    B2CTopUpResult, C2BCallback, DecodeErrorCategory, HeterogeneousValue, MpesaError,
    MpesaErrorCategory, StkPushCallback, StkPushResultCode,
};
use serde_json::json;

// ============================================================================
// Push payment callbacks
// ============================================================================

/// Test the documented successful push payment callback end to end
///
/// Scenario: Customer enters their PIN and pays 1 shilling
#[test]
fn test_stk_callback_success_end_to_end() {
    let body = br#"{
        "Body": {
            "stkCallback": {
                "MerchantRequestID": "m1",
                "CheckoutRequestID": "ws_CO_191220191020363925",
                "ResultCode": 0,
                "ResultDesc": "The service request is processed successfully.",
                "CallbackMetadata": {
                    "Item": [
                        { "Name": "Amount", "Value": 1.00 },
                        { "Name": "MpesaReceiptNumber", "Value": "R1" },
                        { "Name": "TransactionDate", "Value": 20191219102115 },
                        { "Name": "PhoneNumber", "Value": 254708374149 }
                    ]
                }
            }
        }
    }"#;

    let callback = StkPushCallback::from_slice(body).expect("callback should decode");

    assert_eq!(callback.merchant_request_id, "m1");
    assert!(callback.is_successful());
    assert_eq!(callback.amount(), Some(1.0));
    assert_eq!(callback.mpesa_receipt_number(), Some("R1"));
    assert_eq!(callback.transaction_date(), Some(20_191_219_102_115));
    assert_eq!(callback.phone_number(), Some(254_708_374_149));
}

/// Test a failed push payment with a string result code
///
/// Scenario: Customer enters the wrong PIN
#[test]
fn test_stk_callback_wrong_pin_string_code() {
    let callback = StkPushCallback::from_value(json!({
        "Body": { "stkCallback": {
            "MerchantRequestID": "m2",
            "CheckoutRequestID": "c2",
            "ResultCode": "2001",
            "ResultDesc": "The initiator information is invalid."
        }}
    }))
    .unwrap();

    assert_eq!(callback.result_code, 2001);
    assert!(!callback.is_successful());
    assert_eq!(callback.result_code_kind(), Some(StkPushResultCode::WrongPin));
    assert!(callback.callback_metadata.is_none());
}

/// Test that an unparseable result code degrades instead of failing
///
/// Validates the `-1` fallback for codes that are neither integers nor
/// numeric strings
#[test]
fn test_stk_callback_unparseable_code_is_unknown() {
    let callback = StkPushCallback::from_value(json!({
        "Body": { "stkCallback": {
            "MerchantRequestID": "m3",
            "CheckoutRequestID": "c3",
            "ResultCode": "n/a",
            "ResultDesc": "?"
        }}
    }))
    .unwrap();

    assert_eq!(callback.result_code, -1);
    assert!(!callback.is_successful());
    assert_eq!(callback.result_code_kind(), None);
}

/// Test that a metadata value of the wrong shape reports its path
#[test]
fn test_stk_callback_bad_metadata_value() {
    let err = StkPushCallback::from_value(json!({
        "Body": { "stkCallback": {
            "MerchantRequestID": "m4",
            "CheckoutRequestID": "c4",
            "ResultCode": 0,
            "ResultDesc": "ok",
            "CallbackMetadata": { "Item": [ { "Name": "Amount", "Value": { "nested": true } } ] }
        }}
    }))
    .unwrap_err();

    assert!(err.is_type_mismatch());
    assert_eq!(err.path.as_deref(), Some("Amount.Value"));

    let wrapped = MpesaError::from(err);
    assert_eq!(wrapped.category(), MpesaErrorCategory::Decoding);
}

/// Test that malformed JSON keeps its syntax classification
#[test]
fn test_stk_callback_truncated_body() {
    let err = StkPushCallback::from_slice(br#"{"Body": {"stkCallback": "#).unwrap_err();
    assert_eq!(err.category, DecodeErrorCategory::Eof);
}

// ============================================================================
// Account top-up results
// ============================================================================

/// Test the documented successful top-up result
///
/// Scenario: 239 shillings moved into the utility account, with a reference
/// item that has no value
#[test]
fn test_b2c_result_success() {
    let result = B2CTopUpResult::from_value(json!({
        "Result": {
            "ResultType": 0,
            "ResultCode": "0",
            "ResultDesc": "The service request is processed successfully",
            "OriginatorConversationID": "626f6ddf-ab37-4650-b882-b1de92ec9aa4",
            "ConversationID": "12345677dfdf89099B3",
            "TransactionID": "QKA81LK5CY",
            "ResultParameters": {
                "ResultParameter": [
                    { "Key": "DebitAccountBalance", "Value": "{Amount={CurrencyCode=KES, MinimumAmount=618683, BasicAmount=6186.83}}" },
                    { "Key": "Amount", "Value": "190.00" },
                    { "Key": "DebitPartyAffectedAccountBalance", "Value": "Working Account|KES|346568.83|6186.83|340382.00|0.00" },
                    { "Key": "TransCompletedTime", "Value": "20221110110717" },
                    { "Key": "DebitPartyCharges", "Value": "" },
                    { "Key": "ReceiverPartyPublicName", "Value": "000000-Biller 1" },
                    { "Key": "Currency", "Value": "KES" }
                ]
            },
            "ReferenceData": {
                "ReferenceItem": [
                    { "Key": "QueueTimeoutURL", "Value": "https://internalsandbox.safaricom.co.ke/mpesa/b2bresults/v1/submit" },
                    { "Key": "Occasion" }
                ]
            }
        }
    }))
    .unwrap();

    assert!(result.is_successful());
    assert_eq!(result.transaction_id, "QKA81LK5CY");
    assert_eq!(result.parameters().len(), 7);
    assert_eq!(result.trans_completed_time(), Some("20221110110717"));
    assert_eq!(result.receiver_party_public_name(), Some("000000-Biller 1"));
    assert_eq!(result.currency(), Some("KES"));
    assert_eq!(result.debit_party_charges(), Some(""));
    // The gateway sends the amount as a string here.
    assert_eq!(result.amount(), None);
    assert_eq!(result.parameter("Amount"), Some(&HeterogeneousValue::Str("190.00".into())));

    let reference = result.reference_data.as_ref().unwrap();
    assert_eq!(reference.len(), 2);
    assert_eq!(reference[1].key, "Occasion");
    assert!(reference[1].value.is_none());
}

/// Test a failed top-up whose single parameter arrives as a bare object
///
/// Validates singular-vs-array normalisation of `ResultParameter`
#[test]
fn test_b2c_result_single_bare_parameter() {
    let result = B2CTopUpResult::from_value(json!({
        "Result": {
            "ResultType": 0,
            "ResultCode": 500,
            "ResultDesc": "Internal error",
            "OriginatorConversationID": "x",
            "ConversationID": "y",
            "TransactionID": "z",
            "ResultParameters": {
                "ResultParameter": { "Key": "ErrorMessage", "Value": "Something went wrong" }
            },
            "ReferenceData": {
                "ReferenceItem": { "Key": "QueueTimeoutURL", "Value": "https://example.com/timeout" }
            }
        }
    }))
    .unwrap();

    assert!(!result.is_successful());
    assert_eq!(result.result_code, 500);
    assert_eq!(result.parameters().len(), 1);
    assert_eq!(
        result.parameter("ErrorMessage").and_then(HeterogeneousValue::as_str),
        Some("Something went wrong")
    );
    assert_eq!(result.reference("QueueTimeoutURL"), Some("https://example.com/timeout"));
}

/// Test that numeric parameters keep their scalar type
#[test]
fn test_b2c_result_numeric_amount() {
    let result = B2CTopUpResult::from_slice(
        br#"{"Result":{"ResultCode":0,"ResultParameters":{"ResultParameter":[{"Key":"Amount","Value":239}]}}}"#,
    )
    .unwrap();
    assert_eq!(result.amount(), Some(239.0));
}

/// Test that a missing `Result` wrapper is a decoding error
#[test]
fn test_b2c_result_missing_envelope() {
    let err = B2CTopUpResult::from_value(json!({ "ResultCode": 0 })).unwrap_err();
    assert_eq!(err.category, DecodeErrorCategory::Data);
    assert!(err.message.contains("Result"));
}

// ============================================================================
// Customer payment notifications
// ============================================================================

/// Test a validation request, which carries no balance
#[test]
fn test_c2b_validation_callback() {
    let callback = C2BCallback::from_slice(
        br#"{
            "TransactionType": "Buy Goods",
            "TransID": "RKL51ZDR4F",
            "TransTime": "20231121121325",
            "TransAmount": "5.00",
            "BusinessShortCode": "600966",
            "BillRefNumber": "Sample Transaction",
            "InvoiceNumber": "",
            "OrgAccountBalance": "",
            "ThirdPartyTransID": "",
            "MSISDN": "2547 ***** 126",
            "FirstName": "NICHOLAS",
            "MiddleName": null,
            "LastName": "SONGOK"
        }"#,
    )
    .unwrap();

    assert_eq!(callback.amount(), Some(5.0));
    assert_eq!(callback.customer_name(), "NICHOLAS SONGOK");
    assert_eq!(callback.org_account_balance, "");
    assert!(callback.transaction_time().is_some());
}
