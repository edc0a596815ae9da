//! Value-tree serializer.
//!
//! Output is built in one bounded [`Buffer`] and only handed back when the
//! whole tree has been written, so a failed encode never yields partial text.
//! Containers currently being written are tracked by identity; meeting one
//! again means the tree refers to itself.

use ahash::AHashSet;
use tracing::{debug, trace};

use crate::buffer::{Buffer, CapacityExceeded};
use crate::error::{EncodeError, EncodeResult, ErrorKind};
use crate::limits::Limits;
use crate::number::format_float;
use crate::string::escape_text;
use crate::value::{Array, Object, Value};

/// Encode a value tree with standard limits.
///
/// # Errors
///
/// [`ErrorKind::CyclicReference`] when a container contains itself,
/// [`ErrorKind::UnsupportedType`] for [`Value::Opaque`],
/// [`ErrorKind::MaxDepthExceeded`] past the nesting limit and
/// [`ErrorKind::StringTooLarge`] when the output outgrows its bound.
pub fn encode(value: &Value) -> EncodeResult<String> {
    encode_with_limits(value, &Limits::standard())
}

/// Encode a value tree.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_with_limits(value: &Value, limits: &Limits) -> EncodeResult<String> {
    let mut encoder = Encoder::new(limits);
    match encoder.write_value(value, 0) {
        Ok(()) => {
            let text = encoder.out.into_string();
            trace!(len = text.len(), kind = value.type_name(), "encoded value");
            Ok(text)
        }
        Err(e) => {
            debug!(
                kind = %e.kind(),
                code = e.code(),
                subject = e.subject(),
                "encode failed: {}",
                e.message()
            );
            Err(e)
        }
    }
}

/// Per-call encoding state.
struct Encoder {
    out: Buffer,
    // identities of the containers on the current path
    active: AHashSet<usize>,
    max_depth: usize,
}

impl Encoder {
    fn new(limits: &Limits) -> Self {
        Self {
            out: Buffer::with_limit(limits.max_output_length),
            active: AHashSet::new(),
            max_depth: limits.max_depth,
        }
    }

    fn push(&mut self, s: &str) -> EncodeResult<()> {
        self.out.push_str(s).map_err(output_too_large)
    }

    fn write_value(&mut self, value: &Value, depth: usize) -> EncodeResult<()> {
        match value {
            Value::Null => self.push("null"),
            Value::Bool(true) => self.push("true"),
            Value::Bool(false) => self.push("false"),
            Value::Int(n) => self.push(&n.to_string()),
            Value::Float(f) => self.push(&format_float(*f)),
            Value::Text(t) => escape_text(t.as_str(), &mut self.out).map_err(output_too_large),
            Value::Array(a) => self.write_array(a, depth),
            Value::Object(o) => self.write_object(o, depth),
            Value::Opaque(o) => Err(EncodeError::new(
                ErrorKind::UnsupportedType,
                o.type_name(),
                format!("object of type {} is not JSON encodable", o.type_name()),
            )),
        }
    }

    /// Register container `id` for the duration of `body`.
    fn guarded(
        &mut self,
        subject: &'static str,
        id: usize,
        depth: usize,
        body: impl FnOnce(&mut Self, usize) -> EncodeResult<()>,
    ) -> EncodeResult<()> {
        if self.active.contains(&id) {
            let noun = if subject == "array" { "a list" } else { "a dict" };
            return Err(EncodeError::new(
                ErrorKind::CyclicReference,
                subject,
                format!("{noun} with references to itself is not JSON encodable"),
            ));
        }
        if depth >= self.max_depth {
            return Err(EncodeError::new(
                ErrorKind::MaxDepthExceeded,
                subject,
                format!("maximum nesting depth of {} exceeded", self.max_depth),
            ));
        }

        self.active.insert(id);
        let result = body(self, depth + 1);
        self.active.remove(&id);
        result
    }

    fn write_array(&mut self, array: &Array, depth: usize) -> EncodeResult<()> {
        self.guarded("array", array.id(), depth, |enc, depth| {
            let items = array.try_items().ok_or_else(|| busy("array"))?;
            enc.push("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    enc.push(", ")?;
                }
                enc.write_value(item, depth)?;
            }
            enc.push("]")
        })
    }

    fn write_object(&mut self, object: &Object, depth: usize) -> EncodeResult<()> {
        self.guarded("object", object.id(), depth, |enc, depth| {
            let entries = object.try_entries().ok_or_else(|| busy("object"))?;
            enc.push("{")?;
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    enc.push(", ")?;
                }
                escape_text(key, &mut enc.out).map_err(output_too_large)?;
                enc.push(": ")?;
                enc.write_value(value, depth)?;
            }
            enc.push("}")
        })
    }
}

fn output_too_large(e: CapacityExceeded) -> EncodeError {
    EncodeError::new(
        ErrorKind::StringTooLarge,
        "output",
        format!("encoded output exceeds {} bytes", e.limit),
    )
}

// The container is mutably borrowed elsewhere.
fn busy(subject: &'static str) -> EncodeError {
    EncodeError::new(
        ErrorKind::UnsupportedType,
        subject,
        format!("{subject} is being modified and cannot be encoded"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Opaque, Text};

    fn enc(value: &Value) -> String {
        encode(value).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(enc(&Value::Null), "null");
        assert_eq!(enc(&Value::Bool(true)), "true");
        assert_eq!(enc(&Value::Bool(false)), "false");
        assert_eq!(enc(&Value::from(-42)), "-42");
        assert_eq!(enc(&Value::Float(1.1)), "1.1");
        assert_eq!(enc(&Value::Float(f64::NAN)), "NaN");
        assert_eq!(enc(&Value::Float(f64::INFINITY)), "Infinity");
        assert_eq!(enc(&Value::Float(f64::NEG_INFINITY)), "-Infinity");
        assert_eq!(enc(&Value::from("a\"b")), r#""a\"b""#);
    }

    #[test]
    fn test_big_integer() {
        let n: num_bigint::BigInt = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(enc(&Value::Int(n)), "123456789012345678901234567890");
    }

    #[test]
    fn test_containers() {
        assert_eq!(enc(&Value::from(Vec::<Value>::new())), "[]");
        assert_eq!(enc(&Value::Object(Object::new())), "{}");
        let array = Value::from(vec![Value::from(1), Value::Null, Value::from("x")]);
        assert_eq!(enc(&array), r#"[1, null, "x"]"#);

        let object = Object::new();
        object.insert("b", Value::from(1));
        object.insert("a", array);
        assert_eq!(enc(&Value::Object(object)), r#"{"b": 1, "a": [1, null, "x"]}"#);
    }

    #[test]
    fn test_keys_are_escaped() {
        let object = Object::new();
        object.insert("line\nbreak", Value::Bool(true));
        assert_eq!(enc(&Value::Object(object)), r#"{"line\nbreak": true}"#);
    }

    #[test]
    fn test_provenance_flag_does_not_change_output() {
        assert_eq!(
            enc(&Value::Text(Text::unicode("abc"))),
            enc(&Value::Text(Text::plain("abc")))
        );
    }

    #[test]
    fn test_self_referential_array() {
        let array = Array::new();
        array.push(Value::from(1));
        array.push(Value::Array(array.clone()));
        let err = encode(&Value::Array(array.clone())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CyclicReference);
        assert_eq!(err.subject(), "array");
        assert!(err.message().contains("references to itself"));
        array.set(1, Value::Null);
    }

    #[test]
    fn test_indirect_object_cycle() {
        let outer = Object::new();
        let inner = Array::new();
        inner.push(Value::Object(outer.clone()));
        outer.insert("inner", Value::Array(inner.clone()));
        let err = encode(&Value::Object(outer.clone())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CyclicReference);
        assert_eq!(err.subject(), "object");
        outer.remove("inner");
    }

    #[test]
    fn test_shared_container_is_not_a_cycle() {
        let shared = Value::from(vec![Value::from(1)]);
        let pair = Value::from(vec![shared.clone(), shared]);
        assert_eq!(enc(&pair), "[[1], [1]]");
    }

    #[test]
    fn test_guard_released_after_error() {
        let inner = Array::new();
        inner.push(Value::Opaque(Opaque::new(3u8)));
        let outer = Value::from(vec![Value::Array(inner.clone())]);
        assert_eq!(
            encode(&outer).unwrap_err().kind(),
            ErrorKind::UnsupportedType
        );
        inner.set(0, Value::Null);
        assert_eq!(enc(&outer), "[[null]]");
    }

    #[test]
    fn test_opaque_is_unsupported() {
        let err = encode(&Value::Opaque(Opaque::new(std::time::Duration::ZERO))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        assert!(err.subject().ends_with("Duration"));
    }

    #[test]
    fn test_depth_limit() {
        let limits = Limits::standard().with_max_depth(2);
        let two = Value::from(vec![Value::from(Vec::<Value>::new())]);
        assert_eq!(encode_with_limits(&two, &limits).unwrap(), "[[]]");
        let three = Value::from(vec![two]);
        let err = encode_with_limits(&three, &limits).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MaxDepthExceeded);
    }

    #[test]
    fn test_output_limit() {
        let limits = Limits::standard().with_max_output_length(4);
        assert_eq!(encode_with_limits(&Value::Null, &limits).unwrap(), "null");
        let err = encode_with_limits(&Value::from("long"), &limits).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StringTooLarge);
    }
}
