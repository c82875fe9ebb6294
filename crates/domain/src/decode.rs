//! Resilient payload decoding
//!
//! The gateway is inconsistent about JSON shapes: result codes arrive as
//! numbers or strings, parameter containers hold either an array or a single
//! bare object, and optional values are simply left out. The helpers here
//! normalise those shapes so the typed models can stay strict about
//! everything else.
//!
//! Decoding rules, in priority order:
//! 1. Result codes: integer, else numeric string, else
//!    [`UNKNOWN_RESULT_CODE`](crate::constants::UNKNOWN_RESULT_CODE).
//! 2. Containers: array of objects, else one object wrapped in a list;
//!    an absent or `null` container key means no data.
//! 3. Keyed parameters without `Value` decode with `value: None`.
//! 4. Envelopes are unwrapped by literal key lookup.
//! 5. Scalars that are not integer, float or string fail with a type
//!    mismatch naming the field path.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::constants::UNKNOWN_RESULT_CODE;

const TYPE_MISMATCH_PREFIX: &str = "type mismatch at `";

/// Broad class of a decoding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeErrorCategory {
    /// Input was not syntactically valid JSON
    Syntax,
    /// Valid JSON with the wrong shape or types
    Data,
    /// Input ended early
    Eof,
    /// Reading the input failed
    Io,
}

/// A payload that could not be turned into its typed model.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct DecodeError {
    pub category: DecodeErrorCategory,
    pub message: String,
    pub line: usize,
    pub column: usize,
    /// Field path for type mismatches, e.g. `Amount.Value`.
    pub path: Option<String>,
}

impl DecodeError {
    /// Build a data error that did not come from `serde_json`.
    #[must_use]
    pub fn data(message: impl Into<String>) -> Self {
        let message = message.into();
        let path = extract_path(&message);
        Self { category: DecodeErrorCategory::Data, message, line: 0, column: 0, path }
    }

    /// Whether this failure was a scalar that matched no accepted type.
    #[must_use]
    pub fn is_type_mismatch(&self) -> bool {
        self.message.contains(TYPE_MISMATCH_PREFIX)
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        let category = match err.classify() {
            Category::Syntax => DecodeErrorCategory::Syntax,
            Category::Data => DecodeErrorCategory::Data,
            Category::Eof => DecodeErrorCategory::Eof,
            Category::Io => DecodeErrorCategory::Io,
        };
        let message = err.to_string();
        let path = extract_path(&message);
        Self { category, message, line: err.line(), column: err.column(), path }
    }
}

fn extract_path(message: &str) -> Option<String> {
    let start = message.find(TYPE_MISMATCH_PREFIX)? + TYPE_MISMATCH_PREFIX.len();
    let rest = &message[start..];
    rest.find('`').map(|end| rest[..end].to_string())
}

/// Message for a scalar at `path` that is none of integer, float or string.
pub(crate) fn type_mismatch_message(path: &str, found: &Value) -> String {
    let kind = match found {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("{TYPE_MISMATCH_PREFIX}{path}`: expected integer, float or string, found {kind}")
}

/// Decode raw bytes into a typed model.
///
/// # Errors
/// Returns a [`DecodeError`] carrying the underlying parse failure.
pub fn decode_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(bytes).map_err(DecodeError::from)
}

/// Decode an already-parsed JSON value into a typed model.
///
/// # Errors
/// Returns a [`DecodeError`] carrying the underlying parse failure.
pub fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(DecodeError::from)
}

/// Parse a gateway response code as an integer.
///
/// `"0"`, `"00000000"` and `" 0 "` all parse to `Some(0)`.
#[must_use]
pub fn parse_code(code: &str) -> Option<i64> {
    code.trim().parse().ok()
}

/// Whether a gateway response code means success.
#[must_use]
pub fn is_success_code(code: &str) -> bool {
    parse_code(code) == Some(0)
}

/// Integer result code from a number or numeric string, else
/// [`UNKNOWN_RESULT_CODE`].
pub(crate) fn lenient_result_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(result_code_from_value(&raw))
}

pub(crate) fn result_code_from_value(raw: &Value) -> i64 {
    let parsed = match raw {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => parse_code(text),
        _ => None,
    };
    parsed.unwrap_or_else(|| {
        warn!(raw = %raw, fallback = UNKNOWN_RESULT_CODE, "unparseable result code");
        UNKNOWN_RESULT_CODE
    })
}

pub(crate) const fn unknown_result_code() -> i64 {
    UNKNOWN_RESULT_CODE
}

/// Response codes are documented as strings; accept bare numbers too.
pub(crate) fn code_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(D::Error::custom(type_mismatch_message("ResponseCode", &other))),
    }
}

/// Free-text field that may arrive as a number or `null`; `null` reads as
/// an empty string.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(D::Error::custom(format!("expected a string, found {other}"))),
    }
}

/// Optional string that may arrive as a number; `null` counts as absent.
pub(crate) fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(D::Error::custom(type_mismatch_message("Value", &other))),
    }
}

/// Array of objects, or a single bare object wrapped into a one-element list.
///
/// An absent or `null` key means the gateway sent no entries and decodes to
/// `None`; an empty array stays `Some(vec![])`.
pub(crate) fn option_one_or_many<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
            .collect::<Result<Vec<T>, D::Error>>()
            .map(Some),
        Some(single @ Value::Object(_)) => {
            serde_json::from_value(single).map(|item| Some(vec![item])).map_err(D::Error::custom)
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected an object or an array of objects, found {other}"
        ))),
    }
}
