//! Persistent warm-up state.
//!
//! This module provides the `FreshnessStore` for recording whether a prior
//! warm-up is still valid, backed by a file-per-key `KvStore` in the cache
//! directory. Records expire after 24 hours or on a version bump.

pub mod freshness;
pub mod kv;

pub use freshness::{FreshnessStatus, FreshnessStore, CACHE_VERSION};
pub use kv::KvStore;
