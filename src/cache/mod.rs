pub mod entry;

pub use entry::{CacheEntry, EntryError, CACHE_ENTRY_CLASS};
