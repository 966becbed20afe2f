//! Upstream access for scorewatch.
//!
//! - [`HttpFeedClient`] fetches the raw state and mapping payloads over HTTP
//! - [`parse_snapshot`] turns a state payload into a [`Snapshot`](scorewatch_core::Snapshot)

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod client;
mod parser;

pub use client::{FeedClientConfig, HttpFeedClient};
pub use parser::{format_start_time, parse_record, parse_scores, parse_snapshot};
