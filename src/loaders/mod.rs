pub mod config;
pub mod pickle;

use std::path::PathBuf;

use thiserror::Error;

use crate::cache::entry::{CacheEntry, EntryError};
use crate::pickling::SerializationError;
use crate::types::identifiers::{Blob, HashKey};

pub use config::{LoaderConfig, LoaderKind};
pub use pickle::PickleLoader;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Expected cache entry, got {actual}")]
    UnexpectedType { actual: String },
    #[error("Malformed cache entry: {0}")]
    MalformedEntry(#[from] EntryError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error("Invalid loader config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Converts cache entries to blobs and back for a storage backend.
///
/// Implementations do no I/O: storing and fetching blobs belongs to the
/// cache store that owns the loader.
pub trait PersistenceLoader: Send + Sync {
    fn name(&self) -> &str;

    /// File extension for blobs written by this loader.
    fn suffix(&self) -> &str;

    fn to_blob(&self, entry: &CacheEntry) -> Result<Blob, LoaderError>;

    fn restore_cache(&self, key: &HashKey, blob: &Blob) -> Result<CacheEntry, LoaderError>;

    /// Relative location of the blob for `key`: `<name>/<cache_type>_<hash>.<suffix>`.
    fn blob_path(&self, key: &HashKey) -> PathBuf {
        PathBuf::from(self.name()).join(format!(
            "{}_{}.{}",
            key.cache_type,
            key.hash,
            self.suffix()
        ))
    }
}
