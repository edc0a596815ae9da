//! Error taxonomy for the codec.
//!
//! Every failure carries an [`ErrorKind`] with a stable numeric code and name.
//! Decode failures additionally carry the byte offset into the original input;
//! encode failures carry a description of the value that could not be written.
//!
//! [`Error`] is the umbrella category so callers can catch broadly, or match on
//! [`DecodeError`] / [`EncodeError`] / [`ErrorKind`] to catch narrowly.

use std::fmt;

use thiserror::Error;

/// Closed set of failure kinds surfaced at the codec boundary.
///
/// Decode kinds are numbered from 100, encode kinds from 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input is empty or whitespace only.
    EmptyInput,
    /// A byte that cannot start or continue the expected token.
    UnexpectedToken,
    /// End of input inside a string literal.
    UnterminatedString,
    /// End of input inside an array.
    UnterminatedArray,
    /// End of input inside an object.
    UnterminatedObject,
    /// Unknown backslash escape or malformed `\uXXXX`.
    InvalidEscape,
    /// Malformed number literal.
    InvalidNumber,
    /// Object property name not followed by `:`.
    MissingColon,
    /// A value (or property name) is required but a separator or closer was found.
    MissingValue,
    /// Array or object element not followed by `,` or the closing bracket.
    ExpectedCommaOrClose,
    /// Nesting deeper than the configured limit.
    MaxDepthExceeded,
    /// Non-whitespace input after a complete top-level value.
    TrailingData,
    /// Value that has no JSON representation.
    UnsupportedType,
    /// Container that (transitively) contains itself.
    CyclicReference,
    /// Text that exceeds the bounded buffer or an un-representable size.
    StringTooLarge,
}

impl ErrorKind {
    /// All kinds in code order.
    pub const ALL: [ErrorKind; 15] = [
        ErrorKind::EmptyInput,
        ErrorKind::UnexpectedToken,
        ErrorKind::UnterminatedString,
        ErrorKind::UnterminatedArray,
        ErrorKind::UnterminatedObject,
        ErrorKind::InvalidEscape,
        ErrorKind::InvalidNumber,
        ErrorKind::MissingColon,
        ErrorKind::MissingValue,
        ErrorKind::ExpectedCommaOrClose,
        ErrorKind::MaxDepthExceeded,
        ErrorKind::TrailingData,
        ErrorKind::UnsupportedType,
        ErrorKind::CyclicReference,
        ErrorKind::StringTooLarge,
    ];

    /// Stable numeric code.
    pub const fn code(self) -> u32 {
        match self {
            ErrorKind::EmptyInput => 100,
            ErrorKind::UnexpectedToken => 101,
            ErrorKind::UnterminatedString => 102,
            ErrorKind::UnterminatedArray => 103,
            ErrorKind::UnterminatedObject => 104,
            ErrorKind::InvalidEscape => 105,
            ErrorKind::InvalidNumber => 106,
            ErrorKind::MissingColon => 107,
            ErrorKind::MissingValue => 108,
            ErrorKind::ExpectedCommaOrClose => 109,
            ErrorKind::MaxDepthExceeded => 110,
            ErrorKind::TrailingData => 111,
            ErrorKind::UnsupportedType => 200,
            ErrorKind::CyclicReference => 201,
            ErrorKind::StringTooLarge => 202,
        }
    }

    /// Stable name, identical to the variant identifier.
    pub const fn name(self) -> &'static str {
        match self {
            ErrorKind::EmptyInput => "EmptyInput",
            ErrorKind::UnexpectedToken => "UnexpectedToken",
            ErrorKind::UnterminatedString => "UnterminatedString",
            ErrorKind::UnterminatedArray => "UnterminatedArray",
            ErrorKind::UnterminatedObject => "UnterminatedObject",
            ErrorKind::InvalidEscape => "InvalidEscape",
            ErrorKind::InvalidNumber => "InvalidNumber",
            ErrorKind::MissingColon => "MissingColon",
            ErrorKind::MissingValue => "MissingValue",
            ErrorKind::ExpectedCommaOrClose => "ExpectedCommaOrClose",
            ErrorKind::MaxDepthExceeded => "MaxDepthExceeded",
            ErrorKind::TrailingData => "TrailingData",
            ErrorKind::UnsupportedType => "UnsupportedType",
            ErrorKind::CyclicReference => "CyclicReference",
            ErrorKind::StringTooLarge => "StringTooLarge",
        }
    }

    /// Look a kind up by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure while decoding JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {offset}")]
pub struct DecodeError {
    kind: ErrorKind,
    offset: usize,
    message: String,
}

impl DecodeError {
    pub(crate) fn new(kind: ErrorKind, offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            message: message.into(),
        }
    }

    /// The failure kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Byte offset into the original input.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Human readable description without the position suffix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Stable numeric code of the kind.
    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

/// Failure while encoding a value tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EncodeError {
    kind: ErrorKind,
    subject: String,
    message: String,
}

impl EncodeError {
    pub(crate) fn new(
        kind: ErrorKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// The failure kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Type or identity of the value that failed, e.g. `"array"` or a host type name.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Human readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Stable numeric code of the kind.
    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

/// Any codec failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Decoding failed.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// Encoding failed.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
}

impl Error {
    /// The failure kind, regardless of direction.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Decode(e) => e.kind(),
            Error::Encode(e) => e.kind(),
        }
    }
}

/// Result of a decode operation.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result of an encode operation.
pub type EncodeResult<T> = Result<T, EncodeError>;
