//! Code-to-name mapping published by the upstream feed.

use std::collections::HashMap;

/// Mapping from opaque upstream code to display name.
///
/// Replaced wholesale on refresh; individual entries are never edited.
pub type NameMapping = HashMap<String, String>;
