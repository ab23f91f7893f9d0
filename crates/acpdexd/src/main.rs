//! acpdexd - registry mirror daemon
//!
//! Adopts any persisted snapshot so the mirror is queryable immediately,
//! kicks one startup refresh in the background, then keeps the mirror fresh
//! on the configured interval until shutdown. The periodic loop is
//! supervised: a crash restarts it after a delay instead of killing the
//! process.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use acpdex_core::{periodic_refresh, supervised, RegistryCache, RegistryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("ACPDEX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = RegistryConfig::from_env();
    info!(
        api_base = %config.api_base,
        cache_path = %config.cache_path.display(),
        refresh_interval_secs = config.refresh_interval.as_secs(),
        "acpdexd starting"
    );

    let cache = Arc::new(RegistryCache::new(&config));

    // Startup refresh runs in the background; the adopted snapshot (if any)
    // serves reads in the meantime.
    {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache.refresh().await;
        });
    }

    {
        let cache = Arc::clone(&cache);
        let interval = config.refresh_interval;
        let restart_delay = config.task_restart_delay;
        tokio::spawn(async move {
            supervised("registry_refresh", restart_delay, move || {
                periodic_refresh(Arc::clone(&cache), interval)
            })
            .await;
        });
    }

    tokio::signal::ctrl_c().await?;
    info!("acpdexd shutting down");
    Ok(())
}
