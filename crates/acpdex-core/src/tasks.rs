//! Supervised background loops
//!
//! The periodic refresh runs for the process lifetime. Each loop body is
//! spawned on its own task so a panic is isolated to that iteration; on
//! either a panic or an `Err` the loop restarts after a fixed delay with the
//! fault logged. One loop's fault never takes down another loop or the
//! read path.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::cache::RegistryCache;

/// Run `task` forever, restarting on crash with a delay.
///
/// The factory is invoked for every (re)start. The supervisor only exits if
/// a task run completes with `Ok(())`.
pub async fn supervised<F, Fut>(name: &str, restart_delay: Duration, mut task: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    loop {
        match tokio::spawn(task()).await {
            Ok(Ok(())) => {
                info!("Task {} completed", name);
                return;
            }
            Ok(Err(e)) => {
                error!(
                    "Task {} crashed: {}, restarting in {}s...",
                    name,
                    e,
                    restart_delay.as_secs_f64()
                );
            }
            Err(join_err) => {
                error!(
                    "Task {} panicked: {}, restarting in {}s...",
                    name,
                    join_err,
                    restart_delay.as_secs_f64()
                );
            }
        }
        tokio::time::sleep(restart_delay).await;
    }
}

/// Refresh the registry cache every `interval`, forever.
pub async fn periodic_refresh(
    cache: Arc<RegistryCache>,
    interval: Duration,
) -> anyhow::Result<()> {
    loop {
        tokio::time::sleep(interval).await;
        info!("Periodic registry refresh starting...");
        let report = cache.refresh().await;
        info!(
            event = "registry.periodic_refresh",
            agents = report.snapshot.agents.len(),
            disposition = ?report.disposition,
            "Periodic registry refresh complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_supervised_restarts_after_error_until_success() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        supervised("flaky", Duration::from_millis(5), move || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    anyhow::bail!("transient failure {}", n);
                }
                Ok(())
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_supervised_survives_panics() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        supervised("panicky", Duration::from_millis(5), move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("boom");
                }
                Ok(())
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
