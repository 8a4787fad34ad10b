use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::types::ordering::canonical_cmp;

/// A dynamically typed value that can be pickled.
///
/// The variant set is closed: every kind of value the serializer understands
/// is listed here, so encoding is an exhaustive match rather than a lookup in
/// a runtime type registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Ordered, mutable sequence.
    List(Vec<Value>),
    /// Ordered, immutable sequence.
    Tuple(Vec<Value>),
    /// Insertion-ordered mapping.
    Dict(Vec<(Value, Value)>),
    Set(ValueSet),
    FrozenSet(ValueSet),
    Object(Object),
}

impl Value {
    /// Builds a mutable set from any iterator, dropping duplicates.
    pub fn set<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Set(items.into_iter().collect())
    }

    pub fn frozenset<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::FrozenSet(items.into_iter().collect())
    }

    pub fn dict<I: IntoIterator<Item = (Value, Value)>>(items: I) -> Self {
        Value::Dict(items.into_iter().collect())
    }

    /// Short kind name used in error messages. Objects report their class path.
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Set(_) => "set",
            Value::FrozenSet(_) => "frozenset",
            Value::Object(obj) => &obj.class,
        }
    }

    /// Whether the value may be used as a set element or mapping key.
    ///
    /// Mutable containers are never hashable; tuples are hashable when all of
    /// their elements are.
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) | Value::Dict(_) | Value::Set(_) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

// Consistent with `PartialEq`: equal values hash equally. Floats hash by
// value with both zeros folded together; sets hash independently of order.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::None => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => {
                let bits = if *f == 0.0 { 0 } else { f.to_bits() };
                bits.hash(state);
            }
            Value::Str(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::List(items) | Value::Tuple(items) => items.hash(state),
            Value::Dict(pairs) => pairs.hash(state),
            Value::Set(set) | Value::FrozenSet(set) => {
                set.len().hash(state);
                let combined = set.iter().fold(0u64, |acc, v| acc.wrapping_add(hash_of(v)));
                combined.hash(state);
            }
            Value::Object(obj) => {
                obj.class.hash(state);
                obj.attrs.hash(state);
            }
        }
    }
}

fn hash_of(value: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

/// An unordered collection of unique values.
///
/// Iteration yields elements in insertion order, which carries no meaning:
/// two sets holding the same elements compare equal regardless of how they
/// were built. Elements that are equal but not bit-identical (`0.0` and
/// `-0.0`) collapse to the canonically smaller one, so equal sets also pickle
/// to the same bytes.
#[derive(Clone, Default)]
pub struct ValueSet {
    items: Vec<Value>,
    // element hash -> positions in `items`
    index: HashMap<u64, Vec<usize>>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` unless an equal element is already present.
    /// Returns whether the set changed.
    pub fn insert(&mut self, value: Value) -> bool {
        let hash = hash_of(&value);
        if let Some(pos) = self.position(hash, &value) {
            if matches!(canonical_cmp(&value, &self.items[pos]), Ok(Ordering::Less)) {
                self.items[pos] = value;
            }
            return false;
        }
        self.index.entry(hash).or_default().push(self.items.len());
        self.items.push(value);
        true
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.position(hash_of(value), value).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    fn position(&self, hash: u64, value: &Value) -> Option<usize> {
        self.index
            .get(&hash)?
            .iter()
            .copied()
            .find(|&pos| self.items[pos] == *value)
    }
}

impl fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(&self.items).finish()
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = ValueSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A user-defined object: a class path plus its attributes in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub class: String,
    pub attrs: Vec<(String, Value)>,
}

impl Object {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}
