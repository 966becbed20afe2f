//! # scorewatch engine
//!
//! Keeps the authoritative snapshot of sporting events and turns each fresh
//! fetch into an ordered list of changes.
//!
//! - [`ReconciliationEngine`]: merge, diff and atomic replacement of the snapshot
//! - [`Monitor`]: the fixed-interval fetch/reconcile/report loop
//! - [`LogReporter`]: one log line per change
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scorewatch_engine::{Monitor, MonitorConfig, ReconciliationEngine};
//!
//! let engine = Arc::new(ReconciliationEngine::new());
//! let monitor = Monitor::from_config(&MonitorConfig::from_env(), engine.clone())?;
//!
//! let changes = monitor.run_cycle().await?;
//! let active = engine.active_snapshot();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod engine;
mod monitor;
mod reporter;

pub use config::MonitorConfig;
pub use engine::{diff_snapshots, merge_snapshots, ReconciliationEngine, SnapshotStats};
pub use monitor::Monitor;
pub use reporter::{format_change, LogReporter};
