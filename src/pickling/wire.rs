// Structural engine: a flat, postorder op stream that actually hits the bytes,
// and the generic stack machine that rebuilds Values from it. Nothing in here
// knows about element ordering.
//
// The stream is flat so that neither bincode nor the decoder recurses on
// nesting depth; depth is checked on the stack as values are built.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::pickling::{SerializationError, MAX_DEPTH};
use crate::types::value::{Object, Value, ValueSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum Op {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Pops `n` values into a list.
    List(usize),
    Tuple(usize),
    /// Pops `n` key/value pairs, each key pushed before its value.
    Dict(usize),
    /// "Call `constructor` with the top `args` values". The only way sets
    /// reach the wire.
    Reduce { constructor: String, args: usize },
    /// Pops one value per attribute name.
    Object { class: String, attrs: Vec<String> },
}

/// The two unordered collection kinds and the constructors that rebuild them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetKind {
    Mutable,
    Frozen,
}

impl SetKind {
    pub fn constructor(self) -> &'static str {
        match self {
            SetKind::Mutable => "builtins.set",
            SetKind::Frozen => "builtins.frozenset",
        }
    }

    fn resolve(name: &str) -> Option<Self> {
        match name {
            "builtins.set" => Some(SetKind::Mutable),
            "builtins.frozenset" => Some(SetKind::Frozen),
            _ => None,
        }
    }
}

// Little endian, varint integers, trailing bytes rejected.
fn codec() -> impl Options {
    bincode::options()
        .with_varint_encoding()
        .reject_trailing_bytes()
}

pub(crate) fn write(ops: &[Op]) -> Result<Vec<u8>, SerializationError> {
    Ok(codec().serialize(ops)?)
}

pub(crate) fn read(bytes: &[u8]) -> Result<Vec<Op>, SerializationError> {
    Ok(codec().deserialize(bytes)?)
}

pub(crate) fn require_hashable(value: &Value) -> Result<(), SerializationError> {
    if value.is_hashable() {
        Ok(())
    } else {
        Err(SerializationError::Unhashable {
            kind: value.type_name().to_string(),
        })
    }
}

// A built value and the nesting depth below it (0 for leaves).
struct Frame {
    value: Value,
    height: usize,
}

/// Runs the op stream, resolving set reductions.
pub(crate) fn reconstruct(ops: Vec<Op>) -> Result<Value, SerializationError> {
    let mut stack: Vec<Frame> = Vec::new();

    for op in ops {
        let frame = match op {
            Op::None => leaf(Value::None),
            Op::Bool(b) => leaf(Value::Bool(b)),
            Op::Int(i) => leaf(Value::Int(i)),
            Op::Float(f) => leaf(Value::Float(f)),
            Op::Str(s) => leaf(Value::Str(s)),
            Op::Bytes(b) => leaf(Value::Bytes(b)),
            Op::List(n) => {
                let children = pop(&mut stack, n)?;
                let height = container_height(&children)?;
                Frame {
                    value: Value::List(values(children)),
                    height,
                }
            }
            Op::Tuple(n) => {
                let children = pop(&mut stack, n)?;
                let height = container_height(&children)?;
                Frame {
                    value: Value::Tuple(values(children)),
                    height,
                }
            }
            Op::Dict(n) => {
                let count = n
                    .checked_mul(2)
                    .ok_or(SerializationError::InvalidStream("dict length overflows"))?;
                let children = pop(&mut stack, count)?;
                let height = container_height(&children)?;

                let mut pairs = Vec::with_capacity(n);
                let mut flat = values(children).into_iter();
                while let (Some(key), Some(value)) = (flat.next(), flat.next()) {
                    require_hashable(&key)?;
                    pairs.push((key, value));
                }
                Frame {
                    value: Value::Dict(pairs),
                    height,
                }
            }
            Op::Reduce { constructor, args } => {
                let kind = SetKind::resolve(&constructor)
                    .ok_or_else(|| SerializationError::UnresolvedConstructor(constructor.clone()))?;
                let mut args = pop(&mut stack, args)?;
                let (items, height) = match (args.pop(), args.is_empty()) {
                    (Some(Frame { value: Value::List(items), height }), true) => (items, height),
                    _ => return Err(SerializationError::InvalidReduceArgs { constructor }),
                };
                let set = build_set(items)?;
                let value = match kind {
                    SetKind::Mutable => Value::Set(set),
                    SetKind::Frozen => Value::FrozenSet(set),
                };
                // The set takes the place of its argument list.
                Frame { value, height }
            }
            Op::Object { class, attrs: names } => {
                let children = pop(&mut stack, names.len())?;
                let height = container_height(&children)?;
                let attrs = names.into_iter().zip(values(children)).collect();
                Frame {
                    value: Value::Object(Object { class, attrs }),
                    height,
                }
            }
        };
        stack.push(frame);
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(frame), true) => Ok(frame.value),
        (None, _) => Err(SerializationError::InvalidStream("empty stream")),
        (Some(_), false) => Err(SerializationError::InvalidStream("values left on stack")),
    }
}

fn leaf(value: Value) -> Frame {
    Frame { value, height: 0 }
}

fn pop(stack: &mut Vec<Frame>, n: usize) -> Result<Vec<Frame>, SerializationError> {
    if n > stack.len() {
        return Err(SerializationError::InvalidStream("stack underflow"));
    }
    Ok(stack.split_off(stack.len() - n))
}

fn container_height(children: &[Frame]) -> Result<usize, SerializationError> {
    let height = children.iter().map(|f| f.height + 1).max().unwrap_or(0);
    if height > MAX_DEPTH {
        return Err(SerializationError::DepthExceeded { limit: MAX_DEPTH });
    }
    Ok(height)
}

fn values(frames: Vec<Frame>) -> Vec<Value> {
    frames.into_iter().map(|f| f.value).collect()
}

fn build_set(items: Vec<Value>) -> Result<ValueSet, SerializationError> {
    let mut set = ValueSet::new();
    for value in items {
        require_hashable(&value)?;
        set.insert(value);
    }
    Ok(set)
}
