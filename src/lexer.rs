//! Literal scalar decoders.
//!
//! Each decoder is called after the dispatcher has peeked the first byte and
//! matches its literal as a prefix of the remaining input, advancing past it.
//! `NaN`, `Infinity`, `+Infinity` and `-Infinity` are accepted as extensions.

use crate::error::{DecodeError, DecodeResult, ErrorKind};
use crate::scanner::Scanner;
use crate::value::Value;

pub(crate) fn unexpected_token(sc: &Scanner<'_>) -> DecodeError {
    DecodeError::new(
        ErrorKind::UnexpectedToken,
        sc.offset(),
        format!("cannot parse JSON description: {}", sc.snippet()),
    )
}

/// Decode `null`.
pub(crate) fn decode_null(sc: &mut Scanner<'_>) -> DecodeResult<Value> {
    if sc.eat(b"null") {
        Ok(Value::Null)
    } else {
        Err(unexpected_token(sc))
    }
}

/// Decode `true` or `false`.
pub(crate) fn decode_bool(sc: &mut Scanner<'_>) -> DecodeResult<Value> {
    if sc.eat(b"true") {
        Ok(Value::Bool(true))
    } else if sc.eat(b"false") {
        Ok(Value::Bool(false))
    } else {
        Err(unexpected_token(sc))
    }
}

/// Decode `NaN`.
pub(crate) fn decode_nan(sc: &mut Scanner<'_>) -> DecodeResult<Value> {
    if sc.eat(b"NaN") {
        Ok(Value::Float(f64::NAN))
    } else {
        Err(unexpected_token(sc))
    }
}

/// Decode `Infinity`, `+Infinity` or `-Infinity`.
pub(crate) fn decode_infinity(sc: &mut Scanner<'_>) -> DecodeResult<Value> {
    if sc.eat(b"Infinity") || sc.eat(b"+Infinity") {
        Ok(Value::Float(f64::INFINITY))
    } else if sc.eat(b"-Infinity") {
        Ok(Value::Float(f64::NEG_INFINITY))
    } else {
        Err(unexpected_token(sc))
    }
}
