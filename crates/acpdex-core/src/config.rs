//! Runtime configuration for the registry mirror
//!
//! Everything is environment-overridable so deployments can point at a
//! different upstream or tune fetch behavior without a rebuild.

use std::path::PathBuf;
use std::time::Duration;

/// Registry mirror configuration
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Upstream bulk-listing endpoint
    pub api_base: String,
    /// Agents per page requested from the upstream
    pub page_size: u32,
    /// Per-page fetch timeout
    pub fetch_timeout: Duration,
    /// Maximum concurrent page requests per batch
    pub concurrent_batch_size: usize,
    /// Durable snapshot location
    pub cache_path: PathBuf,
    /// Interval between periodic refreshes
    pub refresh_interval: Duration,
    /// Delay before restarting a crashed background task
    pub task_restart_delay: Duration,
    /// Circuit breaker tuning
    pub breaker: BreakerConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            api_base: std::env::var("ACP_API_BASE")
                .unwrap_or_else(|_| "https://acpx.virtuals.io/api/agents".to_string()),
            page_size: env_parse("ACP_PAGE_SIZE", 100),
            fetch_timeout: Duration::from_secs(env_parse("ACP_FETCH_TIMEOUT_SECS", 30)),
            concurrent_batch_size: env_parse("ACP_CONCURRENT_BATCH_SIZE", 5),
            cache_path: PathBuf::from(
                std::env::var("ACP_CACHE_PATH")
                    .unwrap_or_else(|_| "/data/acp_cache.json".to_string()),
            ),
            refresh_interval: Duration::from_secs(env_parse("ACP_REFRESH_INTERVAL_SECS", 300)),
            task_restart_delay: Duration::from_secs(env_parse("ACP_TASK_RESTART_DELAY_SECS", 5)),
            breaker: BreakerConfig::default(),
        }
    }
}

impl RegistryConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Point the config at a specific upstream
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }

    /// Override the durable snapshot path
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }
}

/// Circuit breaker tuning knobs
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// How long the circuit stays open before allowing a probe
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        BreakerConfig {
            failure_threshold: env_parse("ACP_BREAKER_THRESHOLD", 5),
            cooldown: Duration::from_secs(env_parse("ACP_BREAKER_COOLDOWN_SECS", 60)),
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
