use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// How a cache entry's fingerprint was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheType {
    ContextExecutionPath,
    ExecutionPath,
    Pure,
    Deferred,
}

#[derive(Debug, Error)]
#[error("Unknown cache type: {0}")]
pub struct UnknownCacheType(pub String);

impl CacheType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::ContextExecutionPath => "ContextExecutionPath",
            CacheType::ExecutionPath => "ExecutionPath",
            CacheType::Pure => "Pure",
            CacheType::Deferred => "Deferred",
        }
    }
}

impl fmt::Display for CacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheType {
    type Err = UnknownCacheType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ContextExecutionPath" => Ok(CacheType::ContextExecutionPath),
            "ExecutionPath" => Ok(CacheType::ExecutionPath),
            "Pure" => Ok(CacheType::Pure),
            "Deferred" => Ok(CacheType::Deferred),
            other => Err(UnknownCacheType(other.to_string())),
        }
    }
}

/// Opaque fingerprint of a cache entry.
///
/// Computed by the caller; this crate only carries it around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashKey {
    pub hash: String,
    pub cache_type: CacheType,
}

impl HashKey {
    pub fn new(hash: impl Into<String>, cache_type: CacheType) -> Self {
        Self {
            hash: hash.into(),
            cache_type,
        }
    }
}

/// Immutable encoded bytes. The unit of storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Blob(Vec<u8>);

impl Blob {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Content digest in `sha256:<hex>` form.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.0);

        let hash = hasher.finalize();
        format!("sha256:{}", hex::encode(hash))
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Blob(bytes)
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
