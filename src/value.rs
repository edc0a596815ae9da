//! The value tree produced by decode and consumed by encode.
//!
//! Containers are shared handles: cloning an [`Array`] or [`Object`] clones the
//! handle, not the contents, the same way host-language lists and dicts behave.
//! That makes it possible to build self-referential structures, which the
//! encoder rejects with [`ErrorKind::CyclicReference`](crate::ErrorKind).
//! Trees produced by the decoder never share or cycle.
//!
//! Equality is structural: arrays compare element-wise in order, objects compare
//! as key/value sets, integers exactly and floats bit-for-bit. Comparing two
//! distinct cyclic structures does not terminate.

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;
use num_bigint::BigInt;

/// Insertion-ordered map backing [`Object`].
pub type Map = IndexMap<String, Value, ahash::RandomState>;

/// A JSON value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// `null`
    #[default]
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integer literal without fraction or exponent, any magnitude.
    Int(BigInt),
    /// Fractional/exponent literal, or `NaN` / `Infinity`.
    Float(f64),
    /// String.
    Text(Text),
    /// Ordered sequence.
    Array(Array),
    /// String-keyed mapping in insertion order.
    Object(Object),
    /// Host value with no JSON mapping; encoding it fails.
    Opaque(Opaque),
}

impl Value {
    /// Returns true if this is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for containers.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// Returns the boolean if this is a Bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is an Int.
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the integer if this is an Int that fits in `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_int().and_then(|n| i64::try_from(n).ok())
    }

    /// Returns the float if this is a Float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the string if this is Text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    /// Returns the text (with its provenance flag) if this is Text.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Value::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the array handle if this is an Array.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the object handle if this is an Object.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Member of an object by key.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.as_object().and_then(|o| o.get(key))
    }

    /// Element of an array by index.
    pub fn get_index(&self, index: usize) -> Option<Value> {
        self.as_array().and_then(|a| a.get(index))
    }

    /// Type name for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Opaque(o) => o.type_name(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Int(BigInt::from(n))
                }
            }
        )*
    };
}

from_integer!(i32, i64, u32, u64, usize);

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(Text::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(Text::from(s))
    }
}

impl From<Text> for Value {
    fn from(t: Text) -> Self {
        Value::Text(t)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Array::from_vec(items))
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

/// String value with a provenance flag.
///
/// The flag records whether the text went through the unicode path when it
/// was decoded (a `\u` escape, a non-ASCII byte, or `all_unicode`). It is
/// informational only: equality and hashing look at the characters alone.
#[derive(Debug, Clone, Default, Eq)]
pub struct Text {
    value: String,
    unicode: bool,
}

impl Text {
    /// Text flagged as plain.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            unicode: false,
        }
    }

    /// Text flagged as unicode.
    pub fn unicode(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            unicode: true,
        }
    }

    /// The characters.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether the text was produced through the unicode path.
    pub fn is_unicode(&self) -> bool {
        self.unicode
    }

    /// Take the characters.
    pub fn into_string(self) -> String {
        self.value
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Hash for Text {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl AsRef<str> for Text {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text::from(s.to_owned())
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        let unicode = !value.is_ascii();
        Self { value, unicode }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Shared handle to an ordered sequence of values.
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
    /// Empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Array owning `items`.
    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    /// Append a value.
    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    /// Replace the element at `index`; returns the old one, or `None` if out of bounds.
    pub fn set(&self, index: usize, value: Value) -> Option<Value> {
        self.0
            .borrow_mut()
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Element at `index` (a handle clone for containers).
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Shallow copy of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Read access to the elements.
    pub fn items(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }

    pub(crate) fn try_items(&self) -> Option<Ref<'_, Vec<Value>>> {
        self.0.try_borrow().ok()
    }

    /// True if both handles refer to the same array.
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the underlying container.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    fn drain_unique_into(&self, pending: &mut Vec<Value>) {
        if Rc::strong_count(&self.0) != 1 {
            return;
        }
        if let Ok(mut items) = self.0.try_borrow_mut() {
            pending.append(&mut *items);
        }
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.try_items(), other.try_items()) {
            (Some(a), Some(b)) => *a == *b,
            _ => false,
        }
    }
}

impl Drop for Array {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.drain_unique_into(&mut pending);
        dismantle(pending);
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_container(f, "Array", &Value::Array(self.clone()))
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Array::from_vec(iter.into_iter().collect())
    }
}

/// Shared handle to an insertion-ordered string-keyed mapping.
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<Map>>);

impl Object {
    /// Empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Object owning `map`.
    pub fn from_map(map: Map) -> Self {
        Self(Rc::new(RefCell::new(map)))
    }

    /// Insert or overwrite a member.
    ///
    /// Overwriting keeps the key at its first position and returns the old value.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.borrow_mut().insert(key.into(), value)
    }

    /// Remove a member, preserving the order of the rest.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().shift_remove(key)
    }

    /// Member by key (a handle clone for containers).
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    /// True if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Read access to the members.
    pub fn entries(&self) -> Ref<'_, Map> {
        self.0.borrow()
    }

    pub(crate) fn try_entries(&self) -> Option<Ref<'_, Map>> {
        self.0.try_borrow().ok()
    }

    /// True if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the underlying container.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    fn drain_unique_into(&self, pending: &mut Vec<Value>) {
        if Rc::strong_count(&self.0) != 1 {
            return;
        }
        if let Ok(mut map) = self.0.try_borrow_mut() {
            pending.extend(std::mem::take(&mut *map).into_values());
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.try_entries(), other.try_entries()) {
            (Some(a), Some(b)) => *a == *b,
            _ => false,
        }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.drain_unique_into(&mut pending);
        dismantle(pending);
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_container(f, "Object", &Value::Object(self.clone()))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let object = Object::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

// Tear down nested containers with an explicit stack so dropping a deep tree
// does not recurse once per level.
fn dismantle(mut pending: Vec<Value>) {
    while let Some(value) = pending.pop() {
        match &value {
            Value::Array(a) => a.drain_unique_into(&mut pending),
            Value::Object(o) => o.drain_unique_into(&mut pending),
            _ => {}
        }
    }
}

fn debug_container(f: &mut fmt::Formatter<'_>, name: &str, value: &Value) -> fmt::Result {
    match crate::encoder::encode(value) {
        Ok(text) => write!(f, "{name}({text})"),
        Err(e) => write!(f, "{name}(<{}>)", e.kind()),
    }
}

/// Host value that has no JSON mapping.
///
/// The decoder never produces these. A host boundary may hand one over so the
/// encoder can report precisely which type could not be written.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    inner: Rc<dyn Any>,
}

impl Opaque {
    /// Wrap a host value.
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: Rc::new(value),
        }
    }

    /// Rust type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the wrapped value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name)
    }
}
