//! Number literals.
//!
//! Grammar: `['-'|'+'] ('0' | [1-9][0-9]*) ['.' [0-9]+] [('e'|'E') ['+'|'-'] [0-9]+]`.
//! Literals with a fraction or exponent become [`Value::Float`], everything else
//! an exact [`Value::Int`] of any magnitude.
//!
//! Finite floats are written back with the shortest digits that round-trip,
//! in fixed notation when the decimal exponent is in `[-4, 16)` (always with a
//! fractional digit so the text decodes as a float again) and in scientific
//! notation with a signed, at least two digit exponent otherwise.

use std::str::FromStr;

use num_bigint::BigInt;

use crate::error::{DecodeError, DecodeResult, ErrorKind};
use crate::scanner::Scanner;
use crate::value::Value;

// Integers this short always fit in an i64.
const I64_SAFE_DIGITS: usize = 18;

fn invalid_number(start: usize) -> DecodeError {
    DecodeError::new(ErrorKind::InvalidNumber, start, "invalid number")
}

fn skip_digits(sc: &mut Scanner<'_>) {
    sc.skip_while(|b| b.is_ascii_digit());
}

fn at_digit(sc: &Scanner<'_>) -> bool {
    sc.peek().is_some_and(|b| b.is_ascii_digit())
}

/// Decode a number literal starting at the scanner position.
pub(crate) fn decode_number(sc: &mut Scanner<'_>) -> DecodeResult<Value> {
    let start = sc.offset();
    let mut is_float = false;

    if matches!(sc.peek(), Some(b'-' | b'+')) {
        sc.bump();
    }

    match sc.peek() {
        Some(b'0') => {
            sc.bump();
            // no octal-looking literals
            if at_digit(sc) {
                return Err(invalid_number(start));
            }
        }
        Some(b'1'..=b'9') => skip_digits(sc),
        _ => return Err(invalid_number(start)),
    }

    if sc.peek() == Some(b'.') {
        is_float = true;
        sc.bump();
        if !at_digit(sc) {
            return Err(invalid_number(start));
        }
        skip_digits(sc);
    }

    if matches!(sc.peek(), Some(b'e' | b'E')) {
        is_float = true;
        sc.bump();
        if matches!(sc.peek(), Some(b'+' | b'-')) {
            sc.bump();
        }
        if !at_digit(sc) {
            return Err(invalid_number(start));
        }
        skip_digits(sc);
    }

    let literal = std::str::from_utf8(sc.slice(start, sc.offset()))
        .map_err(|_| invalid_number(start))?;

    if is_float {
        literal
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| invalid_number(start))
    } else {
        parse_int(literal)
            .map(Value::Int)
            .ok_or_else(|| invalid_number(start))
    }
}

fn parse_int(literal: &str) -> Option<BigInt> {
    let digits = literal.strip_prefix('+').unwrap_or(literal);
    if digits.len() <= I64_SAFE_DIGITS {
        digits.parse::<i64>().ok().map(BigInt::from)
    } else {
        BigInt::from_str(digits).ok()
    }
}

/// Text for a float: `NaN`, `Infinity`, `-Infinity`, or shortest round-trip digits.
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "-1.25e-7".
    let sci = format!("{value:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let mut out = String::with_capacity(digits.len() + 8);
    out.push_str(sign);

    if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() > int_len {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            } else {
                out.push_str(&digits);
                out.extend(std::iter::repeat('0').take(int_len - digits.len()));
                out.push_str(".0");
            }
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take((-exponent - 1) as usize));
            out.push_str(&digits);
        }
    } else {
        let (first, rest) = digits.split_at(1.min(digits.len()));
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('e');
        out.push(if exponent < 0 { '-' } else { '+' });
        let magnitude = exponent.unsigned_abs();
        if magnitude < 10 {
            out.push('0');
        }
        out.push_str(&magnitude.to_string());
    }
    out
}
