use tracing::{debug, warn};

use crate::cache::entry::{CacheEntry, CACHE_ENTRY_CLASS};
use crate::loaders::{LoaderError, PersistenceLoader};
use crate::pickling::{dumps, loads};
use crate::types::identifiers::{Blob, HashKey};
use crate::types::value::Value;

/// General loader for any entry the deterministic pickler can encode.
#[derive(Debug, Clone)]
pub struct PickleLoader {
    name: String,
}

impl PickleLoader {
    pub const SUFFIX: &'static str = "pickle";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl PersistenceLoader for PickleLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn suffix(&self) -> &str {
        Self::SUFFIX
    }

    fn to_blob(&self, entry: &CacheEntry) -> Result<Blob, LoaderError> {
        let blob = dumps(&entry.to_value())?;
        debug!(
            loader = %self.name,
            cache_type = %entry.key.cache_type,
            bytes = blob.len(),
            "encoded cache entry"
        );
        Ok(blob)
    }

    // The blob is self-describing; the key is not needed to find anything in it.
    fn restore_cache(&self, _key: &HashKey, blob: &Blob) -> Result<CacheEntry, LoaderError> {
        match loads(blob)? {
            Value::Object(obj) if obj.class == CACHE_ENTRY_CLASS => {
                let entry = CacheEntry::from_object(obj)?;
                debug!(
                    loader = %self.name,
                    cache_type = %entry.key.cache_type,
                    bytes = blob.len(),
                    "restored cache entry"
                );
                Ok(entry)
            }
            other => {
                warn!(loader = %self.name, actual = other.type_name(), "blob is not a cache entry");
                Err(LoaderError::UnexpectedType {
                    actual: other.type_name().to_string(),
                })
            }
        }
    }
}
