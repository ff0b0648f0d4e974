//! # Ferry
//!
//! Pushes orders, products and inventory from flat sources into the store.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. .env            credentials next to the data files                 │
//! │  2. tracing         RUST_LOG, default "info,ferry=debug,reqwest=warn"  │
//! │  3. SyncConfig      defaults → ferry.toml → environment                │
//! │  4. SyncRunner      orders (file) → orders (api) → products → inventory│
//! │  5. RunSummary      logged; the process exits 0 either way             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use ferry_sync::{SyncConfig, SyncRunner};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is normal; real environment variables still apply
    dotenvy::dotenv().ok();

    init_tracing();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Ferry");

    let config = SyncConfig::load(None).context("Failed to load configuration")?;
    info!(
        store = config.store.hash.as_deref().unwrap_or("<unset>"),
        orders_csv = %config.sources.orders_csv.display(),
        orders_api = %config.sources.orders_api_url,
        products_csv = %config.sources.products_csv.display(),
        inventory_csv = %config.sources.inventory_csv.display(),
        policy = ?config.mapping.numeric_policy,
        "Configuration loaded"
    );

    let runner = SyncRunner::from_config(&config).context("Failed to build sync runner")?;
    let summary = runner.run().await;
    summary.log();

    Ok(())
}

/// Initializes the tracing subscriber for logging.
///
/// Uses `RUST_LOG` environment variable if set, otherwise defaults to:
/// - `info` level for most crates
/// - `debug` level for ferry crates
/// - `warn` level for reqwest
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ferry=debug,reqwest=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
