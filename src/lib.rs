//! Deterministic object serialization for content-addressed caches.
//!
//! `persist-core` pickles dynamically typed [`types::Value`] trees into
//! blobs that are byte-identical whenever the logical value is unchanged,
//! even when the value holds sets built in different orders. On top of that
//! it provides persistence loaders that turn cache entries into blobs and
//! restore them with a type check.

pub mod cache;
pub mod loaders;
pub mod pickling;
pub mod types;
