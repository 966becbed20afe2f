//! Single-flight TTL cache for scorewatch.
//!
//! Wraps an asynchronous producer, serves its last value for at most `ttl`,
//! and lets concurrent callers during a miss share one in-flight fetch.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;

pub use cache::{CacheStats, FetchFn, TtlCache};
