use crate::pickling::wire::{self, require_hashable, Op, SetKind};
use crate::pickling::{SerializationError, MAX_DEPTH};
use crate::types::identifiers::Blob;
use crate::types::ordering::sort_canonical;
use crate::types::value::{Value, ValueSet};

/// Decides the element order a set is reduced with.
///
/// This is the only point where picklers differ; every other value kind goes
/// through the same structural encoding.
pub trait SetReducer {
    fn order<'a>(&self, kind: SetKind, set: &'a ValueSet) -> Result<Vec<&'a Value>, SerializationError>;

    fn dump(&self, value: &Value) -> Result<Blob, SerializationError> {
        let mut ops = Vec::new();
        emit(self, value, 0, &mut ops)?;
        let bytes = wire::write(&ops)?;
        tracing::trace!(bytes = bytes.len(), kind = value.type_name(), "pickled value");
        Ok(Blob::from(bytes))
    }
}

/// Reduces sets in iteration order. Output depends on how each set was built.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardPickler;

impl SetReducer for StandardPickler {
    fn order<'a>(&self, _kind: SetKind, set: &'a ValueSet) -> Result<Vec<&'a Value>, SerializationError> {
        Ok(set.iter().collect())
    }
}

/// Reduces sets and frozen sets with their elements in canonical order, so
/// equal values always produce identical bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SortedSetPickler;

impl SetReducer for SortedSetPickler {
    fn order<'a>(&self, _kind: SetKind, set: &'a ValueSet) -> Result<Vec<&'a Value>, SerializationError> {
        sort_canonical(set.iter().collect())
    }
}

// Postorder: children first, then the op that collects them.
fn emit<R: SetReducer + ?Sized>(
    reducer: &R,
    value: &Value,
    depth: usize,
    out: &mut Vec<Op>,
) -> Result<(), SerializationError> {
    if depth > MAX_DEPTH {
        return Err(SerializationError::DepthExceeded { limit: MAX_DEPTH });
    }
    let next = depth + 1;

    match value {
        Value::None => out.push(Op::None),
        Value::Bool(b) => out.push(Op::Bool(*b)),
        Value::Int(i) => out.push(Op::Int(*i)),
        Value::Float(f) => out.push(Op::Float(*f)),
        Value::Str(s) => out.push(Op::Str(s.clone())),
        Value::Bytes(b) => out.push(Op::Bytes(b.clone())),
        Value::List(items) => {
            emit_all(reducer, items, next, out)?;
            out.push(Op::List(items.len()));
        }
        Value::Tuple(items) => {
            emit_all(reducer, items, next, out)?;
            out.push(Op::Tuple(items.len()));
        }
        Value::Dict(pairs) => {
            for (k, v) in pairs {
                require_hashable(k)?;
                emit(reducer, k, next, out)?;
                emit(reducer, v, next, out)?;
            }
            out.push(Op::Dict(pairs.len()));
        }
        Value::Set(set) => reduce_set(reducer, SetKind::Mutable, set, next, out)?,
        Value::FrozenSet(set) => reduce_set(reducer, SetKind::Frozen, set, next, out)?,
        Value::Object(obj) => {
            let mut names = Vec::with_capacity(obj.attrs.len());
            for (name, v) in &obj.attrs {
                emit(reducer, v, next, out)?;
                names.push(name.clone());
            }
            out.push(Op::Object {
                class: obj.class.clone(),
                attrs: names,
            });
        }
    }
    Ok(())
}

fn emit_all<R: SetReducer + ?Sized>(
    reducer: &R,
    items: &[Value],
    depth: usize,
    out: &mut Vec<Op>,
) -> Result<(), SerializationError> {
    for item in items {
        emit(reducer, item, depth, out)?;
    }
    Ok(())
}

fn reduce_set<R: SetReducer + ?Sized>(
    reducer: &R,
    kind: SetKind,
    set: &ValueSet,
    depth: usize,
    out: &mut Vec<Op>,
) -> Result<(), SerializationError> {
    for item in set {
        require_hashable(item)?;
    }
    let ordered = reducer.order(kind, set)?;
    for item in &ordered {
        emit(reducer, item, depth, out)?;
    }
    out.push(Op::List(ordered.len()));
    out.push(Op::Reduce {
        constructor: kind.constructor().to_string(),
        args: 1,
    });
    Ok(())
}
