//! Bounded, time-to-live aware key/value cache.
//!
//! Entries expire after their TTL and, once the cache is full, the least
//! recently used entry is evicted to make room.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;

pub use cache::{CacheEntry, TtlCache, TtlCacheConfig};
