//! # scorewatch names
//!
//! Resolution of the opaque codes used by the upstream feed into display names.
//! The mapping is cached for a couple of minutes and refreshes itself in the
//! background whenever a lookup misses.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod mapping;
mod resolver;

pub use mapping::parse_mapping;
pub use resolver::{IdentityLookup, NameResolver, ResolverConfig};
