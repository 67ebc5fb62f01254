//! Redis Model Store - connectivity check
//!
//! Loads configuration from the environment, opens the shared connection
//! and reports whether the backing store is ready.

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redis_model_store::{Config, DataStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redis_model_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: url={}, namespace={}, default_expiry={}s",
        config.redis_url(),
        config.namespace(),
        config.default_expiry()
    );

    let store = DataStore::new(&config);
    if let Err(e) = store.wait().await {
        error!("Backing store unavailable: {}", e);
        return Err(e).context("connecting to backing store");
    }

    info!("Backing store ready, state={:?}", store.state());
    Ok(())
}
