//! acpdex Core Library
//!
//! Keeps a locally queryable mirror of the remote ACP agent registry:
//! a paginated bulk-fetch pipeline with bounded concurrency, a circuit
//! breaker guarding the upstream, an in-memory cache with durable snapshots,
//! and derived read paths (search, categorization, wallet lookup).

pub mod agent;
pub mod breaker;
pub mod cache;
pub mod config;
pub mod error;
pub mod fakes;
pub mod fetch;
pub mod parser;
pub mod pipeline;
pub mod query;
pub mod snapshot;
pub mod tasks;

pub use agent::{Agent, AgentStats, AgentStatus, JobOffering};

pub use breaker::{CircuitBreaker, CircuitState};

pub use cache::{RefreshReport, RegistryCache};

pub use config::{BreakerConfig, RegistryConfig};

pub use error::{RegistryError, Result};

pub use fetch::{HttpPageFetcher, PageFetcher, RawPage};

pub use parser::parse_agent;

pub use pipeline::{BulkFetcher, FetchDisposition, FetchOutcome};

pub use query::{categorize_agents, find_by_wallet, search_agents, Categorized};

pub use snapshot::{RegistrySnapshot, SnapshotStore};

pub use tasks::{periodic_refresh, supervised};
