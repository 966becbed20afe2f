//! Domain types for scorewatch.
//!
//! - [`EventRecord`]: one sporting event as last observed
//! - [`Snapshot`]: every known event keyed by [`EventId`]
//! - [`NameMapping`]: opaque upstream codes to display names
//! - [`ChangeRecord`]: one field-level delta between two snapshots

mod change;
mod event;
mod mapping;

pub use change::*;
pub use event::*;
pub use mapping::*;
