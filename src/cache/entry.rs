use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use crate::types::identifiers::{CacheType, HashKey, UnknownCacheType};
use crate::types::value::{Object, Value};

/// Class path written for entries. Restoring checks decoded objects against it.
pub const CACHE_ENTRY_CLASS: &str = "persist_core.cache.CacheEntry";

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Field {field} expected {expected}, got {actual}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
        actual: String,
    },
    #[error(transparent)]
    CacheType(#[from] UnknownCacheType),
}

/// A cached computation result: the unit of persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: HashKey,
    /// Definitions produced by the cached computation.
    pub defs: BTreeMap<String, Value>,
    /// Names of stateful references. Unordered.
    pub stateful_refs: HashSet<String>,
    pub hit: bool,
    /// Provenance metadata.
    pub meta: BTreeMap<String, Value>,
}

impl CacheEntry {
    pub fn new(key: HashKey) -> Self {
        Self {
            key,
            defs: BTreeMap::new(),
            stateful_refs: HashSet::new(),
            hit: false,
            meta: BTreeMap::new(),
        }
    }

    /// Object form written by loaders.
    pub fn to_value(&self) -> Value {
        let defs = Value::dict(
            self.defs
                .iter()
                .map(|(k, v)| (Value::from(k.as_str()), v.clone())),
        );
        let meta = Value::dict(
            self.meta
                .iter()
                .map(|(k, v)| (Value::from(k.as_str()), v.clone())),
        );
        let refs = Value::set(self.stateful_refs.iter().map(|r| Value::from(r.as_str())));

        Object::new(CACHE_ENTRY_CLASS)
            .with_attr("hash", self.key.hash.as_str())
            .with_attr("cache_type", self.key.cache_type.as_str())
            .with_attr("defs", defs)
            .with_attr("stateful_refs", refs)
            .with_attr("hit", self.hit)
            .with_attr("meta", meta)
            .into()
    }

    /// Rebuild an entry from its object form.
    ///
    /// The caller is responsible for checking the class path first.
    pub fn from_object(obj: Object) -> Result<Self, EntryError> {
        let mut attrs: BTreeMap<String, Value> = obj.attrs.into_iter().collect();

        let hash = take_str(&mut attrs, "hash")?;
        let cache_type: CacheType = take_str(&mut attrs, "cache_type")?.parse()?;
        let defs = take_str_map(&mut attrs, "defs")?;
        let meta = take_str_map(&mut attrs, "meta")?;

        let stateful_refs = match take(&mut attrs, "stateful_refs")? {
            Value::Set(set) => set
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| EntryError::InvalidField {
                        field: "stateful_refs",
                        expected: "set of str",
                        actual: v.type_name().to_string(),
                    })
                })
                .collect::<Result<HashSet<_>, _>>()?,
            other => return Err(invalid("stateful_refs", "set", &other)),
        };

        let hit = match take(&mut attrs, "hit")? {
            Value::Bool(b) => b,
            other => return Err(invalid("hit", "bool", &other)),
        };

        Ok(CacheEntry {
            key: HashKey::new(hash, cache_type),
            defs,
            stateful_refs,
            hit,
            meta,
        })
    }
}

fn take(attrs: &mut BTreeMap<String, Value>, field: &'static str) -> Result<Value, EntryError> {
    attrs.remove(field).ok_or(EntryError::MissingField(field))
}

fn take_str(attrs: &mut BTreeMap<String, Value>, field: &'static str) -> Result<String, EntryError> {
    match take(attrs, field)? {
        Value::Str(s) => Ok(s),
        other => Err(invalid(field, "str", &other)),
    }
}

fn take_str_map(
    attrs: &mut BTreeMap<String, Value>,
    field: &'static str,
) -> Result<BTreeMap<String, Value>, EntryError> {
    let pairs = match take(attrs, field)? {
        Value::Dict(pairs) => pairs,
        other => return Err(invalid(field, "dict", &other)),
    };

    let mut out = BTreeMap::new();
    for (k, v) in pairs {
        match k {
            Value::Str(name) => {
                out.insert(name, v);
            }
            other => return Err(invalid(field, "dict with str keys", &other)),
        }
    }
    Ok(out)
}

fn invalid(field: &'static str, expected: &'static str, actual: &Value) -> EntryError {
    EntryError::InvalidField {
        field,
        expected,
        actual: actual.type_name().to_string(),
    }
}
