//! The polling loop: fetch, reconcile, report.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use scorewatch_cache::TtlCache;
use scorewatch_core::error::{Result, WatchError};
use scorewatch_core::traits::{ChangeReporter, FeedSource};
use scorewatch_core::types::{ChangeRecord, Snapshot};
use scorewatch_feed::{parse_snapshot, FeedClientConfig, HttpFeedClient};
use scorewatch_names::{NameResolver, ResolverConfig};

use crate::config::MonitorConfig;
use crate::engine::ReconciliationEngine;
use crate::reporter::LogReporter;

/// Drives reconciliation cycles on a fixed interval.
///
/// Each cycle fetches the state (through a single-flight cache), resolves it
/// against the current name mapping, applies it to the engine and hands the
/// resulting changes to the reporter. A failed fetch leaves the engine as it was.
pub struct Monitor {
    state: TtlCache<Arc<Snapshot>>,
    engine: Arc<ReconciliationEngine>,
    reporter: Arc<dyn ChangeReporter>,
    poll_interval: Duration,
    ticks: AtomicU64,
}

impl Monitor {
    /// Wires a monitor from its collaborators.
    pub fn new(
        source: Arc<dyn FeedSource>,
        resolver: Arc<NameResolver>,
        engine: Arc<ReconciliationEngine>,
        reporter: Arc<dyn ChangeReporter>,
        config: &MonitorConfig,
    ) -> Self {
        let state = TtlCache::new(config.state_ttl, move || {
            let source = Arc::clone(&source);
            let resolver = Arc::clone(&resolver);
            async move {
                let raw = source.fetch_state().await?;
                let mapping = resolver.mapping().await;
                Ok::<_, WatchError>(Arc::new(parse_snapshot(
                    &raw,
                    &mapping,
                    resolver.as_ref(),
                )))
            }
        });

        Self {
            state,
            engine,
            reporter,
            poll_interval: config.poll_interval,
            ticks: AtomicU64::new(0),
        }
    }

    /// Builds the HTTP client, resolver and log reporter from `config`.
    pub fn from_config(config: &MonitorConfig, engine: Arc<ReconciliationEngine>) -> Result<Self> {
        let client = HttpFeedClient::with_config(
            FeedClientConfig::new(config.api_url.as_str()).with_timeout(config.request_timeout),
        )?;
        let source: Arc<dyn FeedSource> = Arc::new(client);
        let resolver = Arc::new(NameResolver::with_config(
            Arc::clone(&source),
            ResolverConfig::default().with_ttl(config.mapping_ttl),
        ));

        Ok(Self::new(source, resolver, engine, Arc::new(LogReporter), config))
    }

    /// The engine this monitor feeds.
    pub fn engine(&self) -> &Arc<ReconciliationEngine> {
        &self.engine
    }

    /// Number of cycles started so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Runs one cycle and returns the reported changes.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<Vec<ChangeRecord>> {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Tick {}", tick);

        let fetched = match self.state.get().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(tick, error = %err, "Cycle failed, keeping previous snapshot");
                return Err(err);
            }
        };

        let (changes, merged) = self.engine.apply(&fetched);
        self.reporter.report(&changes, &merged);
        Ok(changes)
    }

    /// Runs cycles until `shutdown` flips to true or its sender is dropped.
    ///
    /// Ticks that fall due while a cycle is still running are skipped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_ms = self.poll_interval.as_millis() as u64, "Monitor started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = interval.tick() => {
                    // Failures are already logged; the next tick retries.
                    let _ = self.run_cycle().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(ticks = self.tick_count(), "Monitor stopped");
    }
}
