//! Loosely typed values from gateway callbacks
//!
//! Callback metadata is a list of `{Key, Value}` pairs whose values may be
//! integers, floats or strings depending on the key and, occasionally, on
//! the gateway's mood. Entries are looked up by key, never by position.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::decode::type_mismatch_message;

/// A scalar that is exactly one of integer, float or string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeterogeneousValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl HeterogeneousValue {
    /// Try integer, then float, then string. Anything else yields `None`.
    ///
    /// Floats with no fractional part that fit an `i64` (`239.00`,
    /// `20191219102115.0`) decode as integers.
    #[must_use]
    pub fn from_json(raw: &Value) -> Option<Self> {
        match raw {
            Value::Number(number) => number
                .as_i64()
                .map(Self::Int)
                .or_else(|| number.as_f64().map(Self::from_float)),
            Value::String(text) => Some(Self::Str(text.clone())),
            _ => None,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_float(value: f64) -> Self {
        // i64::MAX as f64 rounds up to 2^63, which is out of range.
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            Self::Int(value as i64)
        } else {
            Self::Float(value)
        }
    }

    /// The string payload; numbers are not converted.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    /// The integer payload; floats and strings are not converted.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The float payload, widening integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            Self::Str(_) => None,
        }
    }
}

impl fmt::Display for HeterogeneousValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl<'de> Deserialize<'de> for HeterogeneousValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Self::from_json(&raw).ok_or_else(|| D::Error::custom(type_mismatch_message("Value", &raw)))
    }
}

#[derive(Deserialize)]
struct RawKeyedParameter {
    #[serde(rename = "Key", alias = "Name")]
    key: String,
    #[serde(rename = "Value", default)]
    value: Option<Value>,
}

/// A `{Key, Value?}` entry from callback metadata.
///
/// Push-payment callbacks spell the key `Name`; both spellings are accepted
/// and `Key` is written back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawKeyedParameter")]
pub struct KeyedParameter {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value", skip_serializing_if = "Option::is_none")]
    pub value: Option<HeterogeneousValue>,
}

impl KeyedParameter {
    #[must_use]
    pub fn new(key: impl Into<String>, value: Option<HeterogeneousValue>) -> Self {
        Self { key: key.into(), value }
    }
}

impl TryFrom<RawKeyedParameter> for KeyedParameter {
    type Error = String;

    fn try_from(raw: RawKeyedParameter) -> Result<Self, Self::Error> {
        let value = match raw.value {
            None | Some(Value::Null) => None,
            Some(value) => Some(HeterogeneousValue::from_json(&value).ok_or_else(|| {
                type_mismatch_message(&format!("{}.Value", raw.key), &value)
            })?),
        };
        Ok(Self { key: raw.key, value })
    }
}

/// Key-based lookup over a list of keyed parameters.
///
/// Every accessor returns `None` when the key is missing, the value is
/// absent, or the value has a different scalar type.
pub trait ParameterLookup {
    /// First entry with the given key.
    fn parameter(&self, key: &str) -> Option<&KeyedParameter>;

    /// The value of the first entry with the given key.
    fn value_of(&self, key: &str) -> Option<&HeterogeneousValue> {
        self.parameter(key).and_then(|entry| entry.value.as_ref())
    }

    fn str_value(&self, key: &str) -> Option<&str> {
        self.value_of(key).and_then(HeterogeneousValue::as_str)
    }

    fn i64_value(&self, key: &str) -> Option<i64> {
        self.value_of(key).and_then(HeterogeneousValue::as_i64)
    }

    fn f64_value(&self, key: &str) -> Option<f64> {
        self.value_of(key).and_then(HeterogeneousValue::as_f64)
    }
}

impl ParameterLookup for [KeyedParameter] {
    fn parameter(&self, key: &str) -> Option<&KeyedParameter> {
        self.iter().find(|entry| entry.key == key)
    }
}
