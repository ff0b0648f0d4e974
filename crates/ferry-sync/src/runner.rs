//! # Sync Runner
//!
//! Top-level orchestrator for one Ferry run: four sub-syncs, strictly in
//! order, each isolated from the others.
//!
//! ## Run Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SyncRunner::run                                │
//! │                                                                         │
//! │  1. orders (file)   CsvFileSource ─► aggregate ─► batch(orders, 1000ms)│
//! │  2. orders (api)    HttpJsonSource ─► aggregate ─► batch(orders, 1000ms)│
//! │  3. products        CsvFileSource ─► ProductRecord ─► batch(500ms)     │
//! │  4. inventory       CsvFileSource ─► InventoryRecord ─► batch(500ms)   │
//! │                                                                         │
//! │  Failure boundaries:                                                   │
//! │  ────────────────────                                                  │
//! │  • item      → UploadOutcome::Failed, batch continues                  │
//! │  • sub-sync  → SubSyncStatus::Aborted, next sub-sync runs              │
//! │  • run       → never fails; RunSummary is the only verdict             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use ferry_core::{
    aggregate_detailed, map_inventory, map_order, map_product, DataQualityWarning, InventoryRecord,
    InventoryUpdate, NumericPolicy, ProductRecord,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::batch::{BatchKind, BatchReport, BatchSynchronizer};
use crate::client::{BigCommerceClient, CommerceApi, RemoteClient};
use crate::config::{PacingSettings, SyncConfig};
use crate::error::{SyncError, SyncResult};
use crate::pacing::{FixedInterval, NoPacing};
use crate::source::{CsvFileSource, HttpJsonSource, RecordSource, SourceRead};

// =============================================================================
// Sub-Sync Identity
// =============================================================================

/// The four sub-syncs of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubSync {
    OrdersFromFile,
    OrdersFromApi,
    Products,
    Inventory,
}

impl SubSync {
    pub const ORDER: [SubSync; 4] = [
        SubSync::OrdersFromFile,
        SubSync::OrdersFromApi,
        SubSync::Products,
        SubSync::Inventory,
    ];
}

impl fmt::Display for SubSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubSync::OrdersFromFile => write!(f, "orders (file)"),
            SubSync::OrdersFromApi => write!(f, "orders (api)"),
            SubSync::Products => write!(f, "products"),
            SubSync::Inventory => write!(f, "inventory"),
        }
    }
}

// =============================================================================
// Run Summary
// =============================================================================

/// How a sub-sync ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubSyncStatus {
    /// The batch ran; individual items may still have failed.
    Completed { report: BatchReport },
    /// The sub-sync never reached (or could not finish) its batch.
    Aborted { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SubSyncSummary {
    pub sub_sync: SubSync,
    pub source: String,
    pub status: SubSyncStatus,
}

impl SubSyncSummary {
    pub fn report(&self) -> Option<&BatchReport> {
        match &self.status {
            SubSyncStatus::Completed { report } => Some(report),
            SubSyncStatus::Aborted { .. } => None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.status, SubSyncStatus::Aborted { .. })
    }
}

/// Result of a whole run. Successes and failures are only told apart here
/// and in the logs.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sub_syncs: Vec<SubSyncSummary>,
}

impl RunSummary {
    pub fn uploaded(&self) -> usize {
        self.sub_syncs
            .iter()
            .filter_map(SubSyncSummary::report)
            .map(BatchReport::succeeded)
            .sum()
    }

    pub fn failed(&self) -> usize {
        self.sub_syncs
            .iter()
            .filter_map(SubSyncSummary::report)
            .map(BatchReport::failed)
            .sum()
    }

    pub fn aborted(&self) -> usize {
        self.sub_syncs.iter().filter(|s| s.is_aborted()).count()
    }

    /// Emits one line per sub-sync plus a total.
    pub fn log(&self) {
        for summary in &self.sub_syncs {
            match &summary.status {
                SubSyncStatus::Completed { report } => info!(
                    sub_sync = %summary.sub_sync,
                    source = %summary.source,
                    run_id = %report.run_id,
                    total = report.total,
                    succeeded = report.succeeded(),
                    failed = report.failed(),
                    warnings = report.warnings.len(),
                    "Sub-sync completed"
                ),
                SubSyncStatus::Aborted { error } => warn!(
                    sub_sync = %summary.sub_sync,
                    source = %summary.source,
                    %error,
                    "Sub-sync aborted"
                ),
            }
        }

        info!(
            uploaded = self.uploaded(),
            failed = self.failed(),
            aborted = self.aborted(),
            elapsed_ms = (self.finished_at - self.started_at).num_milliseconds(),
            "Run finished"
        );
    }
}

// =============================================================================
// Sync Runner
// =============================================================================

/// Runs the four sub-syncs against one store.
pub struct SyncRunner<C> {
    api: CommerceApi<C>,
    policy: NumericPolicy,
    orders_file: Box<dyn RecordSource>,
    orders_api: Box<dyn RecordSource>,
    products: Box<dyn RecordSource>,
    inventory: Box<dyn RecordSource>,
    order_batches: BatchSynchronizer,
    product_batches: BatchSynchronizer,
    inventory_batches: BatchSynchronizer,
}

impl SyncRunner<BigCommerceClient> {
    /// Wires sources, client and pacing from configuration.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        let client = BigCommerceClient::new(&config.store, config.http.request_timeout())?;
        let feed = HttpJsonSource::with_client(client.http().clone(), &config.sources.orders_api_url);

        SyncRunnerBuilder::new(CommerceApi::new(client))
            .orders_file(CsvFileSource::new(&config.sources.orders_csv))
            .orders_api(feed)
            .products(CsvFileSource::new(&config.sources.products_csv))
            .inventory(CsvFileSource::new(&config.sources.inventory_csv))
            .pacing_from(&config.pacing)
            .numeric_policy(config.mapping.numeric_policy)
            .build()
    }
}

impl<C: RemoteClient> SyncRunner<C> {
    /// Runs every sub-sync in order. Never fails.
    pub async fn run(&self) -> RunSummary {
        let started_at = Utc::now();
        info!(policy = ?self.policy, "Starting sync run");

        let mut sub_syncs = Vec::with_capacity(SubSync::ORDER.len());
        for sub_sync in SubSync::ORDER {
            let source = self.source_for(sub_sync);
            info!(%sub_sync, source = %source.describe(), "Starting sub-sync");

            let result = match sub_sync {
                SubSync::OrdersFromFile | SubSync::OrdersFromApi => self.sync_orders(source).await,
                SubSync::Products => self.sync_products(source).await,
                SubSync::Inventory => self.sync_inventory(source).await,
            };

            let status = match result {
                Ok(report) => SubSyncStatus::Completed { report },
                Err(e) => {
                    error!(%sub_sync, source = %source.describe(), error = %e, "Error during {sub_sync} sync");
                    SubSyncStatus::Aborted { error: e.to_string() }
                }
            };

            sub_syncs.push(SubSyncSummary {
                sub_sync,
                source: source.describe(),
                status,
            });
        }

        RunSummary {
            started_at,
            finished_at: Utc::now(),
            sub_syncs,
        }
    }

    fn source_for(&self, sub_sync: SubSync) -> &dyn RecordSource {
        match sub_sync {
            SubSync::OrdersFromFile => self.orders_file.as_ref(),
            SubSync::OrdersFromApi => self.orders_api.as_ref(),
            SubSync::Products => self.products.as_ref(),
            SubSync::Inventory => self.inventory.as_ref(),
        }
    }

    /// Reads, aggregates, then uploads composite orders.
    pub async fn sync_orders(&self, source: &dyn RecordSource) -> SyncResult<BatchReport> {
        let SourceRead { records, mut warnings } = source.read_detailed().await?;
        let aggregation = aggregate_detailed(&records)?;
        info!(
            source = %source.describe(),
            records = records.len(),
            orders = aggregation.orders.len(),
            "Aggregated orders"
        );
        for warning in &aggregation.warnings {
            warn!(%warning, "Data quality warning");
        }

        let policy = self.policy;
        let api = &self.api;
        let mut report = self
            .order_batches
            .sync_batch(
                BatchKind::Orders,
                &aggregation.orders,
                |order| map_order(order, policy),
                |payload| async move { api.create_order(&payload).await },
            )
            .await;

        warnings.extend(aggregation.warnings);
        warnings.append(&mut report.warnings);
        report.warnings = warnings;
        Ok(report)
    }

    /// Uploads one product per row.
    pub async fn sync_products(&self, source: &dyn RecordSource) -> SyncResult<BatchReport> {
        let read = source.read_detailed().await?;
        let products: Vec<ProductRecord> = read
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| ProductRecord::from_record(index + 1, record))
            .collect();

        let policy = self.policy;
        let api = &self.api;
        let report = self
            .product_batches
            .sync_batch(
                BatchKind::Products,
                &products,
                |product| map_product(product, policy),
                |payload| async move { api.create_product(&payload).await },
            )
            .await;
        Ok(with_source_warnings(read.warnings, report))
    }

    /// Updates stock levels, addressed by SKU.
    pub async fn sync_inventory(&self, source: &dyn RecordSource) -> SyncResult<BatchReport> {
        let read = source.read_detailed().await?;
        let rows: Vec<InventoryRecord> = read
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| InventoryRecord::from_record(index + 1, record))
            .collect();

        let policy = self.policy;
        let api = &self.api;
        let report = self
            .inventory_batches
            .sync_batch(
                BatchKind::Inventory,
                &rows,
                |row| map_inventory(row, policy),
                |update: InventoryUpdate| async move {
                    api.update_inventory(&update.sku, &update.body).await
                },
            )
            .await;
        Ok(with_source_warnings(read.warnings, report))
    }
}

/// Source warnings come first; they describe rows before mapping saw them.
fn with_source_warnings(mut warnings: Vec<DataQualityWarning>, mut report: BatchReport) -> BatchReport {
    warnings.append(&mut report.warnings);
    report.warnings = warnings;
    report
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for a [`SyncRunner`] with custom sources or pacing.
pub struct SyncRunnerBuilder<C> {
    api: CommerceApi<C>,
    policy: NumericPolicy,
    orders_file: Option<Box<dyn RecordSource>>,
    orders_api: Option<Box<dyn RecordSource>>,
    products: Option<Box<dyn RecordSource>>,
    inventory: Option<Box<dyn RecordSource>>,
    batches: Option<(BatchSynchronizer, BatchSynchronizer, BatchSynchronizer)>,
}

impl<C: RemoteClient> SyncRunnerBuilder<C> {
    pub fn new(api: CommerceApi<C>) -> Self {
        SyncRunnerBuilder {
            api,
            policy: NumericPolicy::default(),
            orders_file: None,
            orders_api: None,
            products: None,
            inventory: None,
            batches: None,
        }
    }

    pub fn orders_file(mut self, source: impl RecordSource + 'static) -> Self {
        self.orders_file = Some(Box::new(source));
        self
    }

    pub fn orders_api(mut self, source: impl RecordSource + 'static) -> Self {
        self.orders_api = Some(Box::new(source));
        self
    }

    pub fn products(mut self, source: impl RecordSource + 'static) -> Self {
        self.products = Some(Box::new(source));
        self
    }

    pub fn inventory(mut self, source: impl RecordSource + 'static) -> Self {
        self.inventory = Some(Box::new(source));
        self
    }

    /// Sets the order, product and inventory batch loops.
    pub fn pacing(
        mut self,
        orders: BatchSynchronizer,
        products: BatchSynchronizer,
        inventory: BatchSynchronizer,
    ) -> Self {
        self.batches = Some((orders, products, inventory));
        self
    }

    /// Sets the three batch loops from configured fixed intervals.
    pub fn pacing_from(self, pacing: &PacingSettings) -> Self {
        self.pacing(
            BatchSynchronizer::new(FixedInterval(pacing.orders())),
            BatchSynchronizer::new(FixedInterval(pacing.products())),
            BatchSynchronizer::new(FixedInterval(pacing.inventory())),
        )
    }

    pub fn numeric_policy(mut self, policy: NumericPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the runner. Every source is required; pacing defaults to none.
    pub fn build(self) -> SyncResult<SyncRunner<C>> {
        let missing = |name: &str| SyncError::InvalidConfig(format!("{name} source required"));

        let (order_batches, product_batches, inventory_batches) = self.batches.unwrap_or_else(|| {
            (
                BatchSynchronizer::new(NoPacing),
                BatchSynchronizer::new(NoPacing),
                BatchSynchronizer::new(NoPacing),
            )
        });

        Ok(SyncRunner {
            api: self.api,
            policy: self.policy,
            orders_file: self.orders_file.ok_or_else(|| missing("orders file"))?,
            orders_api: self.orders_api.ok_or_else(|| missing("orders api"))?,
            products: self.products.ok_or_else(|| missing("products"))?,
            inventory: self.inventory.ok_or_else(|| missing("inventory"))?,
            order_batches,
            product_batches,
            inventory_batches,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
