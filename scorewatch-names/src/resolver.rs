//! Cached name resolver with self-healing refresh on misses.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, instrument, warn};

use scorewatch_cache::{CacheStats, TtlCache};
use scorewatch_core::constants::DEFAULT_MAPPING_TTL_SECS;
use scorewatch_core::error::{Result, WatchError};
use scorewatch_core::traits::{FeedSource, NameLookup};
use scorewatch_core::types::NameMapping;

use crate::mapping::parse_mapping;

/// Resolver configuration.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// How long a fetched mapping is served before refetching
    pub mapping_ttl: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            mapping_ttl: Duration::from_secs(DEFAULT_MAPPING_TTL_SECS),
        }
    }
}

impl ResolverConfig {
    /// Sets the mapping time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.mapping_ttl = ttl;
        self
    }
}

/// Resolves upstream codes into display names.
///
/// The mapping itself is fetched through a [`TtlCache`]. Callers obtain one
/// mapping snapshot per cycle with [`NameResolver::mapping`] and pass it to
/// every [`NameResolver::resolve`] call of that cycle, so a refresh landing
/// mid-cycle never mixes two mappings.
///
/// A miss returns [`WatchError::NameNotFound`] and starts a forced refresh in
/// the background; the current lookup is not retried.
pub struct NameResolver {
    cache: TtlCache<Arc<NameMapping>>,
}

impl NameResolver {
    /// Creates a resolver over `source` with default configuration.
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self::with_config(source, ResolverConfig::default())
    }

    /// Creates a resolver with custom configuration.
    pub fn with_config(source: Arc<dyn FeedSource>, config: ResolverConfig) -> Self {
        let cache = TtlCache::new(config.mapping_ttl, move || {
            let source = Arc::clone(&source);
            async move { Ok(Arc::new(fetch_mapping(source.as_ref()).await)) }
        });

        Self { cache }
    }

    /// Returns the current mapping, fetching it if stale.
    ///
    /// Never fails: fetch failures degrade to an empty mapping.
    pub async fn mapping(&self) -> Arc<NameMapping> {
        match self.cache.get().await {
            Ok(mapping) => mapping,
            // The producer never fails; keep whatever was last seen just in case.
            Err(err) => {
                warn!(error = %err, "Mapping cache returned an error");
                self.cache.peek().unwrap_or_default()
            }
        }
    }

    /// Refetches the mapping now, joining a refresh already in flight.
    pub async fn refresh(&self) -> Arc<NameMapping> {
        match self.cache.refresh().await {
            Ok(mapping) => mapping,
            Err(err) => {
                warn!(error = %err, "Mapping refresh returned an error");
                self.cache.peek().unwrap_or_default()
            }
        }
    }

    /// Resolves `code` in `mapping`.
    ///
    /// On a miss, returns `NameNotFound` and schedules a background refresh so
    /// that the next cycle sees an up-to-date mapping.
    pub fn resolve(&self, code: &str, mapping: &NameMapping) -> Result<String> {
        if let Some(name) = mapping.get(code) {
            return Ok(name.clone());
        }

        debug!(code, "Name missing from mapping, scheduling refresh");
        self.cache.spawn_refresh();
        Err(WatchError::NameNotFound(code.to_string()))
    }

    /// Statistics of the underlying mapping cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl NameLookup for NameResolver {
    fn lookup(&self, code: &str, mapping: &NameMapping) -> Result<String> {
        self.resolve(code, mapping)
    }
}

/// Lookup that treats every code as its own name.
///
/// Used for offline parsing where no mapping is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityLookup;

impl NameLookup for IdentityLookup {
    fn lookup(&self, code: &str, mapping: &NameMapping) -> Result<String> {
        Ok(mapping.get(code).cloned().unwrap_or_else(|| code.to_string()))
    }
}

/// Fetches and parses the mapping payload; failures degrade to an empty mapping.
#[instrument(skip(source))]
async fn fetch_mapping(source: &dyn FeedSource) -> NameMapping {
    match source.fetch_mappings().await {
        Ok(raw) => {
            let mapping = parse_mapping(&raw);
            debug!(entries = mapping.len(), "Fetched name mapping");
            mapping
        }
        Err(err) => {
            error!(error = %err, "Failed to fetch name mapping, nothing will resolve");
            NameMapping::new()
        }
    }
}
