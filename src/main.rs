//! Slab Cache demo
//!
//! Builds a cache from environment configuration, runs a small workload and
//! reports statistics until interrupted.

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slab_cache::{Config, TtlCache};

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache (starts the background sweep)
/// 4. Run a short workload
/// 5. Report stats every sweep interval until SIGINT/SIGTERM
/// 6. Stop the sweep and exit
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slab_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Configuration loaded: size_classes={:?}, default_ttl={:?}, sweep_interval={:?}, policy={:?}",
        config.size_classes, config.default_ttl, config.sweep_interval, config.policy
    );

    let cache = TtlCache::from_config(&config).context("failed to build cache")?;

    run_workload(&cache)?;
    info!("Workload done: {}", cache.debug_string());

    let mut ticker = tokio::time::interval(config.sweep_interval);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let stats = cache.stats();
                info!(
                    "entries={} hits={} misses={} evictions={} expirations={} hit_rate={:.2}",
                    stats.total_entries,
                    stats.hits,
                    stats.misses,
                    stats.evictions,
                    stats.expirations,
                    stats.hit_rate()
                );
            }
            _ = &mut shutdown => break,
        }
    }

    cache.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

/// Fills the cache with short- and long-lived entries and reads some back.
fn run_workload(cache: &TtlCache) -> anyhow::Result<()> {
    for i in 0..32 {
        let key = format!("session:{}", i);
        let ttl = if i % 2 == 0 {
            Duration::from_secs(2)
        } else {
            Duration::from_secs(300)
        };
        cache.set(&key, format!("payload-{}", i).as_bytes(), ttl)?;
    }

    for i in (0..32).step_by(3) {
        let _ = cache.get(&format!("session:{}", i));
    }

    let greeting = cache.compute_if_absent("greeting", || b"hello".to_vec())?;
    info!("greeting = {}", String::from_utf8_lossy(&greeting));

    cache.delete("session:1");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
