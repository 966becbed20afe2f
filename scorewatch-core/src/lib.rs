//! # scorewatch core
//!
//! Core types, errors, and traits shared by every scorewatch crate.
//!
//! - **Types**: events, snapshots, name mappings and change records
//! - **Errors**: the [`WatchError`] taxonomy
//! - **Constants**: wire separators and service defaults
//! - **Traits**: seams for the upstream feed, name lookup and change reporting
//!
//! ## Example
//!
//! ```rust
//! use scorewatch_core::{EventStatus, ScoreSegment};
//!
//! let status: EventStatus = "LIVE".parse().unwrap();
//! assert_eq!(status, EventStatus::Live);
//! assert!(ScoreSegment::Current < ScoreSegment::Period1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{Result, WatchError};
pub use traits::*;
pub use types::*;
