//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// Each tick locks the store and removes every entry whose deadline has
/// passed. The task stops when `shutdown` carries `true` or its sender is
/// dropped.
///
/// # Arguments
/// * `runtime` - Runtime to spawn the task on
/// * `store` - Shared reference to the cache store
/// * `interval` - Time between sweeps
/// * `shutdown` - Cancellation signal
///
/// # Example
/// ```ignore
/// let store = Arc::new(Mutex::new(CacheStore::unbounded()));
/// let (tx, rx) = watch::channel(false);
/// let handle = spawn_sweep_task(&Handle::current(), store, Duration::from_secs(1), rx);
/// // Later, during shutdown:
/// tx.send_replace(true);
/// handle.await?;
/// ```
pub fn spawn_sweep_task(
    runtime: &Handle,
    store: Arc<Mutex<CacheStore>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        info!("Starting TTL sweep task with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let removed = store.lock().cleanup_expired(Instant::now());

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }

        info!("TTL sweep task stopped");
    })
}
