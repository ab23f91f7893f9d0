//! The authoritative in-memory registry mirror
//!
//! `RegistryCache` owns the one current snapshot and mediates refresh vs.
//! read concurrency: readers clone an `Arc` under a momentary lock and never
//! suspend or touch I/O; a refresh builds the replacement snapshot fully off
//! to the side and swaps it in atomically, so a reader sees either the old
//! or the new view, never a half-built one. Construct once at process start
//! and share by `Arc`.

use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::breaker::CircuitBreaker;
use crate::config::RegistryConfig;
use crate::fetch::{HttpPageFetcher, PageFetcher};
use crate::pipeline::{BulkFetcher, FetchDisposition, FetchOutcome};
use crate::snapshot::{RegistrySnapshot, SnapshotStore};

/// What a `refresh` call actually did, alongside the now-current snapshot.
///
/// The snapshot alone cannot distinguish "upstream is empty" from "the
/// breaker refused the sweep", so the disposition and sweep errors ride
/// along explicitly.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    /// The current snapshot after the refresh - new on success, the prior
    /// one when the refresh was a no-op.
    pub snapshot: Arc<RegistrySnapshot>,
    pub disposition: FetchDisposition,
    /// Sweep errors, including the breaker-open marker when skipped.
    pub errors: Vec<String>,
}

/// Owns the current snapshot, the circuit breaker, and durable storage.
pub struct RegistryCache {
    current: RwLock<Arc<RegistrySnapshot>>,
    // Refreshes are mutually excluded; readers are never blocked by this.
    refresh_lock: tokio::sync::Mutex<()>,
    fetcher: BulkFetcher,
    store: SnapshotStore,
    breaker: Arc<CircuitBreaker>,
}

impl RegistryCache {
    /// Cache backed by the real HTTP fetcher.
    pub fn new(config: &RegistryConfig) -> Self {
        Self::with_fetcher(config, Arc::new(HttpPageFetcher::new(config)))
    }

    /// Cache over any `PageFetcher`, used by tests with scripted fakes.
    ///
    /// Adopts a persisted non-empty snapshot immediately, so the mirror is
    /// queryable with stale-but-valid data before any network activity.
    pub fn with_fetcher(config: &RegistryConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(config.breaker.clone()));
        let store = SnapshotStore::new(config.cache_path.clone());

        let initial = match store.load() {
            Ok(Some(snapshot)) if !snapshot.is_empty() => {
                info!(
                    event = "registry.cache_loaded",
                    agents = snapshot.agents.len(),
                    "Adopted persisted snapshot"
                );
                snapshot
            }
            Ok(_) => RegistrySnapshot::empty(),
            Err(e) => {
                warn!("Failed to load persisted snapshot: {}", e);
                RegistrySnapshot::empty()
            }
        };

        RegistryCache {
            current: RwLock::new(Arc::new(initial)),
            refresh_lock: tokio::sync::Mutex::new(()),
            fetcher: BulkFetcher::new(fetcher, Arc::clone(&breaker), config),
            store,
            breaker,
        }
    }

    /// Run one full sweep and, if it produced agents, publish and persist a
    /// new snapshot. An empty sweep (breaker open, fault, or a genuinely
    /// empty upstream) keeps the prior snapshot untouched.
    pub async fn refresh(&self) -> RefreshReport {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> RefreshReport {
        let FetchOutcome {
            agents,
            total_from_api,
            errors,
            disposition,
        } = self.fetcher.fetch_all().await;

        if agents.is_empty() {
            match disposition {
                FetchDisposition::BreakerOpen => {
                    info!(event = "registry.refresh_noop", reason = "breaker_open")
                }
                FetchDisposition::Faulted => {
                    warn!(event = "registry.refresh_noop", reason = "faulted")
                }
                FetchDisposition::Completed => {
                    warn!(
                        event = "registry.refresh_noop",
                        reason = "empty_upstream",
                        "Sweep returned no agents, keeping existing cache"
                    )
                }
            }
            return RefreshReport {
                snapshot: self.get_current(),
                disposition,
                errors,
            };
        }

        let snapshot = Arc::new(RegistrySnapshot::from_agents(agents, errors.clone()));
        *self.current.write().unwrap() = Arc::clone(&snapshot);
        info!(
            event = "registry.refreshed",
            agents = snapshot.agents.len(),
            total_from_api,
            page_errors = errors.len(),
        );

        // In-memory state is already current; a failed write only costs us
        // the warm start after the next restart.
        if let Err(e) = self.store.save(&snapshot) {
            warn!("Failed to persist snapshot: {}", e);
        }

        RefreshReport {
            snapshot,
            disposition,
            errors,
        }
    }

    /// The resident snapshot. Pure pointer read, never blocks on I/O.
    pub fn get_current(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.current.read().unwrap())
    }

    /// Like `get_current`, but performs a synchronous refresh first when
    /// nothing is resident yet - the one read path allowed to touch the
    /// network, at most once per cold start.
    pub async fn get_current_or_refresh(&self) -> Arc<RegistrySnapshot> {
        let current = self.get_current();
        if !current.is_empty() {
            return current;
        }
        let _guard = self.refresh_lock.lock().await;
        // A concurrent cold read may have populated the cache while we
        // waited for the lock.
        let current = self.get_current();
        if !current.is_empty() {
            return current;
        }
        self.refresh_locked().await.snapshot
    }

    /// Breaker handle, for status reporting.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}
