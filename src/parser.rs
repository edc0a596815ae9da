//! Structural decoder: value dispatch plus the array and object state machines.
//!
//! Recursion depth is carried as an explicit argument. Every container entry
//! checks it against the configured limit before descending, so two decodes
//! running on different threads never share a counter.

use tracing::{debug, trace};

use crate::buffer::Buffer;
use crate::error::{DecodeError, DecodeResult, ErrorKind};
use crate::lexer::{decode_bool, decode_infinity, decode_nan, decode_null, unexpected_token};
use crate::limits::DecodeOptions;
use crate::number::decode_number;
use crate::scanner::Scanner;
use crate::string::decode_string;
use crate::value::{Array, Map, Object, Value};

/// Decode a complete JSON document with default options.
///
/// Accepts anything byte-like: `&str`, `String`, `&[u8]`, `Vec<u8>`.
///
/// # Errors
///
/// Returns a [`DecodeError`] carrying the kind and byte offset of the first
/// grammar violation, or [`ErrorKind::TrailingData`] when non-whitespace
/// follows the value.
pub fn decode<T: AsRef<[u8]> + ?Sized>(input: &T) -> DecodeResult<Value> {
    decode_with_options(input, &DecodeOptions::default())
}

/// Decode a complete JSON document.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_with_options<T: AsRef<[u8]> + ?Sized>(
    input: &T,
    options: &DecodeOptions,
) -> DecodeResult<Value> {
    let bytes = input.as_ref();
    let mut decoder = Decoder::new(bytes, options);
    match decoder.decode_document() {
        Ok(value) => {
            trace!(len = bytes.len(), kind = value.type_name(), "decoded document");
            Ok(value)
        }
        Err(e) => {
            debug!(
                kind = %e.kind(),
                offset = e.offset(),
                len = bytes.len(),
                "decode failed: {}",
                e.message()
            );
            Err(e)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayState {
    ItemOrClose,
    CommaOrClose,
    Item,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectState {
    KeyOrClose,
    CommaOrClose,
    Key,
    Done,
}

/// Per-call decoding state.
struct Decoder<'a> {
    sc: Scanner<'a>,
    options: DecodeOptions,
    // scratch space for unescaping, reused across literals
    buf: Buffer,
}

impl<'a> Decoder<'a> {
    fn new(input: &'a [u8], options: &DecodeOptions) -> Self {
        Self {
            sc: Scanner::new(input),
            options: *options,
            buf: Buffer::with_limit(options.limits.max_string_length),
        }
    }

    fn decode_document(&mut self) -> DecodeResult<Value> {
        self.sc.skip_whitespace();
        if self.sc.is_eof() {
            return Err(DecodeError::new(
                ErrorKind::EmptyInput,
                self.sc.offset(),
                "empty JSON description",
            ));
        }

        let value = self.decode_value(0)?;

        self.sc.skip_whitespace();
        if !self.sc.is_eof() {
            return Err(DecodeError::new(
                ErrorKind::TrailingData,
                self.sc.offset(),
                "extra data after JSON description",
            ));
        }
        Ok(value)
    }

    /// Decode one value at the current position. `depth` counts the
    /// containers already entered.
    fn decode_value(&mut self, depth: usize) -> DecodeResult<Value> {
        self.sc.skip_whitespace();
        match self.sc.peek() {
            Some(b'{') => self.decode_object(depth),
            Some(b'[') => self.decode_array(depth),
            Some(b'"') => Ok(Value::Text(decode_string(
                &mut self.sc,
                &mut self.buf,
                self.options.all_unicode,
            )?)),
            Some(b't' | b'f') => decode_bool(&mut self.sc),
            Some(b'n') => decode_null(&mut self.sc),
            Some(b'N') => decode_nan(&mut self.sc),
            Some(b'I') => decode_infinity(&mut self.sc),
            Some(b'+' | b'-') if self.sc.peek_at(1) == Some(b'I') => decode_infinity(&mut self.sc),
            Some(b'+' | b'-' | b'0'..=b'9') => decode_number(&mut self.sc),
            _ => Err(unexpected_token(&self.sc)),
        }
    }

    /// Depth of a container opened at `start` inside `depth` enclosing ones.
    fn enter(&self, depth: usize, start: usize) -> DecodeResult<usize> {
        let max = self.options.limits.max_depth;
        if depth >= max {
            return Err(DecodeError::new(
                ErrorKind::MaxDepthExceeded,
                start,
                format!("maximum nesting depth of {max} exceeded"),
            ));
        }
        Ok(depth + 1)
    }

    fn decode_array(&mut self, depth: usize) -> DecodeResult<Value> {
        let start = self.sc.offset();
        let depth = self.enter(depth, start)?;
        self.sc.bump();

        let mut items = Vec::new();
        let mut state = ArrayState::ItemOrClose;
        while state != ArrayState::Done {
            self.sc.skip_whitespace();
            let Some(c) = self.sc.peek() else {
                return Err(DecodeError::new(
                    ErrorKind::UnterminatedArray,
                    start,
                    "unterminated array",
                ));
            };
            state = match (state, c) {
                (ArrayState::ItemOrClose | ArrayState::CommaOrClose, b']') => {
                    self.sc.bump();
                    ArrayState::Done
                }
                (ArrayState::ItemOrClose | ArrayState::Item, b',' | b']') => {
                    return Err(DecodeError::new(
                        ErrorKind::MissingValue,
                        self.sc.offset(),
                        "expecting array item",
                    ));
                }
                (ArrayState::ItemOrClose | ArrayState::Item, _) => {
                    items.push(self.decode_value(depth)?);
                    ArrayState::CommaOrClose
                }
                (ArrayState::CommaOrClose, b',') => {
                    self.sc.bump();
                    ArrayState::Item
                }
                (ArrayState::CommaOrClose, _) => {
                    return Err(DecodeError::new(
                        ErrorKind::ExpectedCommaOrClose,
                        self.sc.offset(),
                        "expecting ',' or ']'",
                    ));
                }
                (ArrayState::Done, _) => ArrayState::Done,
            };
        }
        Ok(Value::Array(Array::from_vec(items)))
    }

    fn decode_object(&mut self, depth: usize) -> DecodeResult<Value> {
        let start = self.sc.offset();
        let depth = self.enter(depth, start)?;
        self.sc.bump();

        let unterminated =
            || DecodeError::new(ErrorKind::UnterminatedObject, start, "unterminated object");

        let mut map = Map::default();
        let mut state = ObjectState::KeyOrClose;
        while state != ObjectState::Done {
            self.sc.skip_whitespace();
            let Some(c) = self.sc.peek() else {
                return Err(unterminated());
            };
            state = match (state, c) {
                (ObjectState::KeyOrClose | ObjectState::CommaOrClose, b'}') => {
                    self.sc.bump();
                    ObjectState::Done
                }
                (ObjectState::KeyOrClose | ObjectState::Key, b'"') => {
                    let key = decode_string(&mut self.sc, &mut self.buf, self.options.all_unicode)?
                        .into_string();

                    self.sc.skip_whitespace();
                    match self.sc.peek() {
                        Some(b':') => self.sc.bump(),
                        Some(_) => {
                            return Err(DecodeError::new(
                                ErrorKind::MissingColon,
                                self.sc.offset(),
                                "missing colon after object property name",
                            ));
                        }
                        None => return Err(unterminated()),
                    }

                    self.sc.skip_whitespace();
                    match self.sc.peek() {
                        Some(b',' | b'}') => {
                            return Err(DecodeError::new(
                                ErrorKind::MissingValue,
                                self.sc.offset(),
                                "expecting object property value",
                            ));
                        }
                        None => return Err(unterminated()),
                        Some(_) => {}
                    }

                    let value = self.decode_value(depth)?;
                    // duplicate keys keep their first position, last value wins
                    map.insert(key, value);
                    ObjectState::CommaOrClose
                }
                (ObjectState::KeyOrClose | ObjectState::Key, b',' | b'}') => {
                    return Err(DecodeError::new(
                        ErrorKind::MissingValue,
                        self.sc.offset(),
                        "expecting object property name",
                    ));
                }
                (ObjectState::KeyOrClose | ObjectState::Key, _) => {
                    return Err(DecodeError::new(
                        ErrorKind::UnexpectedToken,
                        self.sc.offset(),
                        "expecting object property name",
                    ));
                }
                (ObjectState::CommaOrClose, b',') => {
                    self.sc.bump();
                    ObjectState::Key
                }
                (ObjectState::CommaOrClose, _) => {
                    return Err(DecodeError::new(
                        ErrorKind::ExpectedCommaOrClose,
                        self.sc.offset(),
                        "expecting ',' or '}'",
                    ));
                }
                (ObjectState::Done, _) => ObjectState::Done,
            };
        }
        Ok(Value::Object(Object::from_map(map)))
    }
}
