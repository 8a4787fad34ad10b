//! Deterministic pickling of [`Value`] trees.
//!
//! [`dumps`] produces identical bytes for logically equal values, including
//! values holding sets whose iteration order differs. [`loads`] is the plain
//! generic decoder: it reads blobs from any pickler in this module.

pub mod pickler;
mod wire;

use thiserror::Error;

use crate::types::identifiers::Blob;
use crate::types::value::Value;

pub use pickler::{SetReducer, SortedSetPickler, StandardPickler};
pub use wire::SetKind;

/// Maximum nesting depth accepted when encoding or decoding.
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Cannot order set elements of type {left} and {right}")]
    Unorderable { left: String, right: String },
    #[error("Unhashable type used as set element or mapping key: {kind}")]
    Unhashable { kind: String },
    #[error("Value nested deeper than {limit} levels")]
    DepthExceeded { limit: usize },
    #[error("Unresolved constructor: {0}")]
    UnresolvedConstructor(String),
    #[error("Invalid arguments for constructor {constructor}")]
    InvalidReduceArgs { constructor: String },
    #[error("Malformed op stream: {0}")]
    InvalidStream(&'static str),
    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Pickle `value` with sets in canonical order.
pub fn dumps(value: &Value) -> Result<Blob, SerializationError> {
    SortedSetPickler.dump(value)
}

/// Unpickle a blob produced by any pickler in this module.
pub fn loads(blob: &Blob) -> Result<Value, SerializationError> {
    let ops = wire::read(blob.as_bytes())?;
    wire::reconstruct(ops)
}
