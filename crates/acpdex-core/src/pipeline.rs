//! Paginated bulk fetch of the full registry listing
//!
//! Orchestrates the page sweep: circuit breaker gate, pagination discovery
//! from page 1, then the remaining pages in bounded concurrent batches so we
//! respect the upstream rate limits. Individual page failures are collected,
//! never fatal; only a failure to learn the pagination at all trips the
//! breaker.

use std::sync::Arc;

use futures::future;
use tracing::{error, info, warn};

use crate::agent::Agent;
use crate::breaker::CircuitBreaker;
use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::fetch::PageFetcher;
use crate::parser::parse_agent;

/// Why a sweep ended the way it did. Carried explicitly so an empty agent
/// list from a skipped sweep is never mistaken for a genuinely empty
/// upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDisposition {
    /// The sweep ran to the end (individual pages may still have failed).
    Completed,
    /// The circuit breaker refused the sweep; nothing was fetched.
    BreakerOpen,
    /// Pagination discovery failed; the sweep was aborted.
    Faulted,
}

/// Aggregate result of one full sweep.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Parsed agents in fetch order.
    pub agents: Vec<Agent>,
    /// Total reported by the upstream pagination metadata.
    pub total_from_api: u64,
    /// Per-page error strings, informational only.
    pub errors: Vec<String>,
    pub disposition: FetchDisposition,
}

/// Fetches every page of the listing through a `PageFetcher`.
pub struct BulkFetcher {
    fetcher: Arc<dyn PageFetcher>,
    breaker: Arc<CircuitBreaker>,
    page_size: u32,
    batch_size: usize,
}

impl BulkFetcher {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        breaker: Arc<CircuitBreaker>,
        config: &RegistryConfig,
    ) -> Self {
        BulkFetcher {
            fetcher,
            breaker,
            page_size: config.page_size,
            batch_size: config.concurrent_batch_size.max(1),
        }
    }

    /// Sweep the whole listing. Never returns an error: every failure mode
    /// is encoded in the outcome's `errors` and `disposition`.
    pub async fn fetch_all(&self) -> FetchOutcome {
        if !self.breaker.can_execute() {
            warn!(event = "registry.fetch_skipped", "Circuit breaker is open, skipping sweep");
            return FetchOutcome {
                agents: Vec::new(),
                total_from_api: 0,
                errors: vec![RegistryError::CircuitOpen.to_string()],
                disposition: FetchDisposition::BreakerOpen,
            };
        }

        let mut agents: Vec<Agent> = Vec::new();
        let mut errors: Vec<String> = Vec::new();

        // Page 1 carries the pagination metadata; without it there is no
        // sweep, so its failure is the breaker-relevant fault.
        let first = match self.fetcher.fetch_page(1, self.page_size).await {
            Ok(page) => page,
            Err(e) => {
                self.breaker.record_failure();
                error!(event = "registry.fetch_faulted", error = %e, "Pagination discovery failed");
                return FetchOutcome {
                    agents,
                    total_from_api: 0,
                    errors: vec![format!("Page 1: {}", e)],
                    disposition: FetchDisposition::Faulted,
                };
            }
        };

        let total = first.meta.pagination.total;
        let total_pages = first.meta.pagination.page_count.max(1);
        info!(
            event = "registry.sweep_started",
            total, total_pages, "Registry listing discovered"
        );

        agents.extend(first.data.into_iter().filter_map(parse_agent));

        if total_pages > 1 {
            let mut batch_start: u32 = 2;
            while batch_start <= total_pages {
                let batch_end = total_pages.min(batch_start + self.batch_size as u32 - 1);
                let requests = (batch_start..=batch_end)
                    .map(|page| self.fetcher.fetch_page(page, self.page_size));
                let results = future::join_all(requests).await;

                for (i, result) in results.into_iter().enumerate() {
                    let page = batch_start + i as u32;
                    match result {
                        Ok(raw) => agents.extend(raw.data.into_iter().filter_map(parse_agent)),
                        Err(e) => errors.push(format!("Page {}: {}", page, e)),
                    }
                }
                batch_start = batch_end + 1;
            }
        }

        // Partial success still counts: the sweep itself completed.
        self.breaker.record_success();

        if !errors.is_empty() {
            warn!(
                event = "registry.sweep_partial",
                failed_pages = errors.len(),
                "Sweep completed with page errors"
            );
        }

        FetchOutcome {
            agents,
            total_from_api: total,
            errors,
            disposition: FetchDisposition::Completed,
        }
    }
}
