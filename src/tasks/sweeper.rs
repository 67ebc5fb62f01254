//! Expiry Sweeper Task
//!
//! Background task that periodically purges expired keys from a memory
//! backend. Reads already treat expired keys as absent; the sweeper only
//! reclaims their memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::backend::MemoryBackend;

/// Spawns a task that purges expired entries every `interval_secs` seconds.
///
/// Abort the returned handle to stop it.
///
/// # Example
/// ```ignore
/// let connector = MemoryConnector::new();
/// let sweeper = spawn_sweeper(connector.backend(), 1);
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_sweeper(backend: Arc<MemoryBackend>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweeper with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = backend.purge_expired().await;
            if removed > 0 {
                info!("Expiry sweep: removed {} expired keys", removed);
            } else {
                debug!("Expiry sweep: no expired keys found");
            }
        }
    })
}
