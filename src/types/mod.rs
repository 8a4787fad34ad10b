pub mod identifiers;
pub mod ordering;
pub mod value;

pub use identifiers::{Blob, CacheType, HashKey, UnknownCacheType};
pub use ordering::canonical_cmp;
pub use value::{Object, Value, ValueSet};
