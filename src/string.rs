//! String literals: decoding with unescape, and escaping for output.
//!
//! Decoding first scans to the closing quote, noting whether the literal holds
//! escapes or non-ASCII bytes. Literals without escapes are validated and
//! copied once; the rest go through the unescaper, which writes into the
//! decoder's shared bounded [`Buffer`].
//!
//! Escaping mirrors the decoder: `"` and `\` are backslash-escaped, the usual
//! short escapes are used for tab/newline/carriage return/form feed/backspace,
//! every other scalar below 0x20 or from 0x7F up is written as lowercase
//! `\uXXXX`, and scalars above the BMP as a UTF-16 surrogate pair.

use crate::buffer::{Buffer, CapacityExceeded};
use crate::error::{DecodeError, DecodeResult, ErrorKind};
use crate::scanner::Scanner;
use crate::value::Text;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

fn too_large(start: usize, e: CapacityExceeded) -> DecodeError {
    DecodeError::new(
        ErrorKind::StringTooLarge,
        start,
        format!("string literal exceeds {} bytes", e.limit),
    )
}

fn invalid_escape(offset: usize) -> DecodeError {
    DecodeError::new(ErrorKind::InvalidEscape, offset, "invalid escape sequence")
}

fn invalid_utf8(offset: usize) -> DecodeError {
    DecodeError::new(
        ErrorKind::UnexpectedToken,
        offset,
        "invalid UTF-8 sequence in string",
    )
}

/// Decode the string literal whose opening quote is at the scanner position.
pub(crate) fn decode_string(
    sc: &mut Scanner<'_>,
    buf: &mut Buffer,
    all_unicode: bool,
) -> DecodeResult<Text> {
    let start = sc.offset();
    sc.bump();
    let body_start = sc.offset();

    let mut escaping = false;
    let mut has_escape = false;
    let mut has_unicode = false;
    loop {
        let Some(b) = sc.peek() else {
            return Err(DecodeError::new(
                ErrorKind::UnterminatedString,
                start,
                "unterminated string",
            ));
        };
        sc.bump();
        if escaping {
            if b == b'u' {
                has_unicode = true;
            }
            escaping = false;
        } else if b == b'\\' {
            escaping = true;
            has_escape = true;
        } else if b == b'"' {
            break;
        } else if !b.is_ascii() {
            has_unicode = true;
        }
    }

    let body = sc.slice(body_start, sc.offset() - 1);
    let unicode = has_unicode || all_unicode;

    if !has_escape {
        let text = std::str::from_utf8(body)
            .map_err(|e| invalid_utf8(body_start + e.valid_up_to()))?;
        if text.len() > buf.limit() {
            return Err(too_large(start, CapacityExceeded { limit: buf.limit() }));
        }
        return Ok(if unicode {
            Text::unicode(text)
        } else {
            Text::plain(text)
        });
    }

    buf.clear();
    unescape(body, body_start, buf).map_err(|e| match e {
        Unescape::Decode(e) => e,
        Unescape::Full(e) => too_large(start, e),
    })?;
    let text = buf.take_string();
    Ok(if unicode {
        Text::unicode(text)
    } else {
        Text::plain(text)
    })
}

enum Unescape {
    Decode(DecodeError),
    Full(CapacityExceeded),
}

impl From<CapacityExceeded> for Unescape {
    fn from(e: CapacityExceeded) -> Self {
        Unescape::Full(e)
    }
}

impl From<DecodeError> for Unescape {
    fn from(e: DecodeError) -> Self {
        Unescape::Decode(e)
    }
}

fn hex4(body: &[u8], at: usize) -> Option<u16> {
    let digits = body.get(at..at + 4)?;
    let mut value: u16 = 0;
    for &b in digits {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => return None,
        };
        value = (value << 4) | u16::from(digit);
    }
    Some(value)
}

/// Unescape `body` (the bytes between the quotes) into `buf`.
///
/// `base` is the offset of `body` in the input, for error positions.
fn unescape(body: &[u8], base: usize, buf: &mut Buffer) -> Result<(), Unescape> {
    let mut i = 0;
    while i < body.len() {
        // copy the run up to the next backslash
        let run_end = body[i..]
            .iter()
            .position(|&b| b == b'\\')
            .map_or(body.len(), |p| i + p);
        if run_end > i {
            let run = std::str::from_utf8(&body[i..run_end])
                .map_err(|e| invalid_utf8(base + i + e.valid_up_to()))?;
            buf.push_str(run)?;
            i = run_end;
            continue;
        }

        let escape_at = i;
        let Some(&kind) = body.get(i + 1) else {
            return Err(invalid_escape(base + escape_at).into());
        };
        i += 2;
        let ch = match kind {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{08}',
            b'f' => '\u{0C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let unit = hex4(body, i).ok_or_else(|| invalid_escape(base + escape_at))?;
                i += 4;
                decode_code_unit(unit, body, &mut i)
            }
            _ => return Err(invalid_escape(base + escape_at).into()),
        };
        buf.push(ch)?;
    }
    Ok(())
}

/// Turn one `\u` code unit into a char, consuming a following low surrogate
/// escape when `unit` is a high surrogate. Unpaired surrogates become U+FFFD.
fn decode_code_unit(unit: u16, body: &[u8], i: &mut usize) -> char {
    if (0xD800..=0xDBFF).contains(&unit) {
        if body.get(*i..*i + 2) == Some(b"\\u".as_slice()) {
            if let Some(low @ 0xDC00..=0xDFFF) = hex4(body, *i + 2) {
                *i += 6;
                let combined =
                    0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                return char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER);
            }
        }
        return char::REPLACEMENT_CHARACTER;
    }
    char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Append `s` as a quoted, escaped JSON string.
pub(crate) fn escape_text(s: &str, out: &mut Buffer) -> Result<(), CapacityExceeded> {
    out.push('"')?;
    let mut run_start = 0;
    for (i, ch) in s.char_indices() {
        let short = match ch {
            '"' => Some("\\\""),
            '\\' => Some("\\\\"),
            '\t' => Some("\\t"),
            '\n' => Some("\\n"),
            '\r' => Some("\\r"),
            '\u{0C}' => Some("\\f"),
            '\u{08}' => Some("\\b"),
            _ => None,
        };
        let code = u32::from(ch);
        if short.is_none() && (0x20..0x7F).contains(&code) {
            continue;
        }

        out.push_str(&s[run_start..i])?;
        run_start = i + ch.len_utf8();
        match short {
            Some(escape) => out.push_str(escape)?,
            None if code >= 0x10000 => {
                let v = code - 0x10000;
                push_unit_escape(out, 0xD800 + (v >> 10))?;
                push_unit_escape(out, 0xDC00 + (v & 0x3FF))?;
            }
            None => push_unit_escape(out, code)?,
        }
    }
    out.push_str(&s[run_start..])?;
    out.push('"')
}

fn push_unit_escape(out: &mut Buffer, unit: u32) -> Result<(), CapacityExceeded> {
    let mut escape = [b'\\', b'u', 0, 0, 0, 0];
    for (k, slot) in escape[2..].iter_mut().enumerate() {
        let nibble = (unit >> (12 - 4 * k)) & 0xF;
        *slot = HEX_DIGITS[nibble as usize];
    }
    // only ASCII bytes were written
    out.push_str(std::str::from_utf8(&escape).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_with(input: &str, all_unicode: bool, limit: usize) -> DecodeResult<(Text, usize)> {
        let mut sc = Scanner::new(input.as_bytes());
        let mut buf = Buffer::with_limit(limit);
        decode_string(&mut sc, &mut buf, all_unicode).map(|t| (t, sc.offset()))
    }

    fn decode(input: &str) -> DecodeResult<Text> {
        decode_with(input, false, usize::MAX).map(|(t, _)| t)
    }

    fn escape(s: &str) -> String {
        let mut buf = Buffer::with_limit(usize::MAX);
        escape_text(s, &mut buf).unwrap();
        buf.into_string()
    }

    #[test]
    fn test_plain_string() {
        let (text, consumed) = decode_with(r#""hello" tail"#, false, usize::MAX).unwrap();
        assert_eq!(text.as_str(), "hello");
        assert!(!text.is_unicode());
        assert_eq!(consumed, 7);
    }

    #[test]
    fn test_short_escapes() {
        let text = decode(r#""a\"b\\c\/d\be\ff\ng\rh\ti""#).unwrap();
        assert_eq!(text.as_str(), "a\"b\\c/d\u{08}e\u{0C}f\ng\rh\ti");
        // short escapes alone keep the plain flag
        assert!(!text.is_unicode());
    }

    #[test]
    fn test_unicode_flag_sources() {
        assert!(decode(r#""\u0041""#).unwrap().is_unicode());
        assert!(decode("\"caf\u{e9}\"").unwrap().is_unicode());
        assert!(decode_with(r#""abc""#, true, usize::MAX).unwrap().0.is_unicode());
        assert!(!decode(r#""\/""#).unwrap().is_unicode());
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(decode(r#""\u000A""#).unwrap().as_str(), "\n");
        assert_eq!(decode(r#""\u1001""#).unwrap().as_str(), "\u{1001}");
        assert_eq!(decode(r#""\u00e9\u00E9""#).unwrap().as_str(), "\u{e9}\u{e9}");
    }

    #[test]
    fn test_surrogate_pair_combines() {
        assert_eq!(decode(r#""\ud83d\ude00""#).unwrap().as_str(), "\u{1F600}");
        assert_eq!(decode(r#""x\uD83D\uDE00y""#).unwrap().as_str(), "x\u{1F600}y");
    }

    #[test]
    fn test_lone_surrogates_are_replaced() {
        assert_eq!(decode(r#""\ud800""#).unwrap().as_str(), "\u{FFFD}");
        assert_eq!(decode(r#""\ud800x""#).unwrap().as_str(), "\u{FFFD}x");
        assert_eq!(decode(r#""\udc00""#).unwrap().as_str(), "\u{FFFD}");
        assert_eq!(
            decode(r#""\ud800A""#).unwrap().as_str(),
            "\u{FFFD}A"
        );
    }

    #[test]
    fn test_invalid_escapes() {
        let err = decode(r#""ab\x""#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEscape);
        assert_eq!(err.offset(), 3);

        let err = decode(r#""\u10K5""#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEscape);
        assert_eq!(err.offset(), 1);

        let err = decode(r#""\u12""#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEscape);
    }

    #[test]
    fn test_unterminated() {
        for input in [r#""abc"#, r#""abc\""#, "\""] {
            let err = decode(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnterminatedString, "input {input:?}");
            assert_eq!(err.offset(), 0);
        }
    }

    #[test]
    fn test_invalid_utf8_reports_first_bad_byte() {
        let mut sc = Scanner::new(b"\"ab\xff\"");
        let mut buf = Buffer::with_limit(usize::MAX);
        let err = decode_string(&mut sc, &mut buf, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedToken);
        assert_eq!(err.offset(), 3);
    }

    #[test]
    fn test_raw_control_characters_accepted() {
        assert_eq!(decode("\"a\tb\u{01}\"").unwrap().as_str(), "a\tb\u{01}");
    }

    #[test]
    fn test_string_too_large() {
        let err = decode_with(r#""abcdef""#, false, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StringTooLarge);
        assert_eq!(err.offset(), 0);
        let err = decode_with(r#""ab\ncdef""#, false, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StringTooLarge);
        assert!(decode_with(r#""ab\ncd""#, false, 5).is_ok());
    }

    #[test]
    fn test_escape_basic() {
        assert_eq!(escape("hello"), r#""hello""#);
        assert_eq!(escape("\""), r#""\"""#);
        assert_eq!(escape("\\"), r#""\\""#);
        assert_eq!(escape("/"), r#""/""#);
        assert_eq!(escape("\u{08}\u{0C}\n\r\t"), r#""\b\f\n\r\t""#);
    }

    #[test]
    fn test_escape_control_and_high() {
        assert_eq!(escape("\u{01}"), r#""\u0001""#);
        assert_eq!(escape("\u{7F}"), r#""\u007f""#);
        assert_eq!(escape("caf\u{e9}"), r#""caf\u00e9""#);
        assert_eq!(escape("\u{1001}"), r#""\u1001""#);
        assert_eq!(escape("\u{FFFD}"), r#""\ufffd""#);
    }

    #[test]
    fn test_escape_astral_as_surrogate_pair() {
        assert_eq!(escape("\u{1F600}"), r#""\ud83d\ude00""#);
        assert_eq!(escape("a\u{10FFFF}b"), r#""a\udbff\udfffb""#);
    }

    #[test]
    fn test_escape_respects_limit() {
        let mut buf = Buffer::with_limit(5);
        assert!(escape_text("abcdef", &mut buf).is_err());
    }
}
