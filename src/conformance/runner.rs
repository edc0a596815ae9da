//! Codec runners for differential testing.

use std::str::FromStr;

use num_bigint::BigInt;

use super::{ConformanceError, ConformanceResult};
use crate::limits::DecodeOptions;
use crate::value::{Array, Object, Value};
use crate::{decode_with_options, encode};

/// Outcome of decoding one input with one codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecOutput {
    /// Accepted; the document re-encoded with this crate's encoder.
    Ok(String),
    /// Rejected, with the codec's description of why.
    Err(String),
}

impl CodecOutput {
    /// Check if this is an Ok result.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Check if this is an Err result.
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Get the value as a string (either encoded text or error description).
    pub fn as_string(&self) -> &str {
        match self {
            Self::Ok(s) => s,
            Self::Err(s) => s,
        }
    }
}

/// A JSON decoder that can take part in a differential test.
pub trait CodecRunner {
    /// Decode `input` and describe the outcome.
    fn decode(&self, input: &[u8]) -> ConformanceResult<CodecOutput>;

    /// Get the runner name for reporting.
    fn name(&self) -> &str;
}

/// Runner for this crate's decoder.
#[derive(Debug, Default)]
pub struct CjsonRunner {
    options: DecodeOptions,
}

impl CjsonRunner {
    /// Runner with default decode options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner with explicit decode options.
    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }
}

impl CodecRunner for CjsonRunner {
    fn decode(&self, input: &[u8]) -> ConformanceResult<CodecOutput> {
        match decode_with_options(input, &self.options) {
            Ok(value) => {
                let text = encode(&value).map_err(|e| ConformanceError::CodecError(e.to_string()))?;
                Ok(CodecOutput::Ok(text))
            }
            Err(e) => Ok(CodecOutput::Err(format!("{}: {}", e.kind(), e))),
        }
    }

    fn name(&self) -> &str {
        "cjson"
    }
}

/// Runner for `serde_json`, the reference decoder.
#[derive(Debug, Default)]
pub struct SerdeJsonRunner;

impl SerdeJsonRunner {
    /// Create a new reference runner.
    pub fn new() -> Self {
        Self
    }
}

impl CodecRunner for SerdeJsonRunner {
    fn decode(&self, input: &[u8]) -> ConformanceResult<CodecOutput> {
        match serde_json::from_slice::<serde_json::Value>(input) {
            Ok(parsed) => {
                let value = from_serde_value(&parsed)?;
                let text = encode(&value).map_err(|e| ConformanceError::CodecError(e.to_string()))?;
                Ok(CodecOutput::Ok(text))
            }
            Err(e) => Ok(CodecOutput::Err(e.to_string())),
        }
    }

    fn name(&self) -> &str {
        "serde_json"
    }
}

/// Convert a `serde_json` tree into a [`Value`].
///
/// Numbers are classified by their literal text, the same way the decoder
/// does: a fraction or exponent makes a float, anything else an exact integer.
pub fn from_serde_value(value: &serde_json::Value) -> ConformanceResult<Value> {
    Ok(match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            let literal = n.to_string();
            if literal.contains(['.', 'e', 'E']) {
                let f = literal.parse::<f64>().map_err(|e| {
                    ConformanceError::CodecError(format!("bad float {}: {}", literal, e))
                })?;
                Value::Float(f)
            } else {
                let i = BigInt::from_str(&literal).map_err(|e| {
                    ConformanceError::CodecError(format!("bad integer {}: {}", literal, e))
                })?;
                Value::Int(i)
            }
        }
        serde_json::Value::String(s) => Value::from(s.as_str()),
        serde_json::Value::Array(items) => {
            let array = Array::new();
            for item in items {
                array.push(from_serde_value(item)?);
            }
            Value::Array(array)
        }
        serde_json::Value::Object(map) => {
            let object = Object::new();
            for (key, item) in map {
                object.insert(key.as_str(), from_serde_value(item)?);
            }
            Value::Object(object)
        }
    })
}
