//! cjson - a fast JSON codec with exact integers and a few legacy extensions.
//!
//! Converts between JSON text and an in-memory [`Value`] tree. The grammar is
//! strict JSON plus `NaN`, `Infinity`/`+Infinity`/`-Infinity` and a leading
//! `+` on numbers. Integers keep every digit; floats round-trip bit-exactly.
//!
//! # Architecture
//!
//! - [`scanner`] - position-tracked cursor over the input bytes
//! - [`buffer`] - bounded growable text buffer shared by decode and encode
//! - `lexer`, `number`, `string` - scalar decoders and escapers
//! - `parser` - value dispatch and the array/object state machines
//! - `encoder` - serializer with cycle detection
//! - [`value`] - the value tree
//! - [`error`] - error kinds with stable codes
//! - [`limits`] - depth and size limits, decode options
//! - [`conformance`] - corpus runner and differential testing against serde_json
//!
//! Every call carries its own depth counter, buffer and cycle set; there is no
//! process-wide mutable state, so calls on different threads never interact.
//!
//! # Example
//!
//! ```
//! use cjson::{decode, encode, Value};
//!
//! let value = decode(r#"{"a": [1, 2.5, "x"], "big": 123456789012345678901234567890}"#).unwrap();
//! assert_eq!(value.get("a").unwrap().get_index(1), Some(Value::Float(2.5)));
//! assert_eq!(
//!     encode(&value).unwrap(),
//!     r#"{"a": [1, 2.5, "x"], "big": 123456789012345678901234567890}"#
//! );
//! ```

// Library code reports failures through Result; tests are checked separately.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod buffer;
pub mod conformance;
mod encoder;
pub mod error;
mod lexer;
pub mod limits;
mod number;
mod parser;
pub mod scanner;
mod string;
pub mod value;

pub use encoder::{encode, encode_with_limits};
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult, Error, ErrorKind};
pub use limits::{DecodeOptions, Limits};
pub use parser::{decode, decode_with_options};
pub use value::{Array, Map, Object, Opaque, Text, Value};
