//! # Batch Synchronizer
//!
//! Drives a sequence of items through map → upload → pause, one at a time.
//!
//! ## Batch Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       BatchSynchronizer::sync_batch                     │
//! │                                                                         │
//! │   for each item, in input order (never concurrent):                    │
//! │                                                                         │
//! │   ┌──────────┐   Ok    ┌──────────┐   Ok    ┌───────────────────────┐  │
//! │   │   map    │───────► │  upload  │───────► │ Uploaded { index, id }│  │
//! │   └────┬─────┘         └────┬─────┘         └───────────────────────┘  │
//! │        │ Err                │ Err                                       │
//! │        ▼                    ▼                                           │
//! │   ┌──────────────────────────────────┐                                 │
//! │   │ Failed { index, error }          │  logged, loop continues         │
//! │   └──────────────────────────────────┘                                 │
//! │                                                                         │
//! │   then ALWAYS: pacer.pause()                                           │
//! │                                                                         │
//! │   Result: BatchReport with exactly one outcome per input item          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no retry and no early exit. A failed item is recorded and the
//! next one starts after the usual pause.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ferry_core::{CoreResult, DataQualityWarning, Mapped, RemoteId};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::SyncResult;
use crate::pacing::Pacer;

// =============================================================================
// Batch Kind
// =============================================================================

/// Which endpoint a batch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    Orders,
    Products,
    Inventory,
}

impl BatchKind {
    /// Singular noun used in progress lines ("Uploaded order 2/5").
    pub fn noun(&self) -> &'static str {
        match self {
            BatchKind::Orders => "order",
            BatchKind::Products => "product",
            BatchKind::Inventory => "inventory",
        }
    }
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchKind::Orders => write!(f, "orders"),
            BatchKind::Products => write!(f, "products"),
            BatchKind::Inventory => write!(f, "inventory"),
        }
    }
}

// =============================================================================
// Outcomes & Report
// =============================================================================

/// Result of one item. `index` is the 0-based position in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded { index: usize, id: RemoteId },
    Failed { index: usize, error: String },
}

impl UploadOutcome {
    pub fn index(&self) -> usize {
        match self {
            UploadOutcome::Uploaded { index, .. } | UploadOutcome::Failed { index, .. } => *index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }
}

/// Everything one batch did.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub kind: BatchKind,
    /// Correlates every log line of this batch.
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub outcomes: Vec<UploadOutcome>,
    pub warnings: Vec<DataQualityWarning>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &UploadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

// =============================================================================
// Batch Synchronizer
// =============================================================================

/// Sequential, paced, failure-isolating upload loop.
#[derive(Clone)]
pub struct BatchSynchronizer {
    pacer: Arc<dyn Pacer>,
}

impl BatchSynchronizer {
    pub fn new(pacer: impl Pacer + 'static) -> Self {
        Self {
            pacer: Arc::new(pacer),
        }
    }

    /// Maps and uploads every item in order.
    ///
    /// `map` turns an item into a payload (or fails it without any remote
    /// call); `upload` performs the remote call. Neither error ever stops
    /// the loop.
    pub async fn sync_batch<T, P, M, U, Fut>(
        &self,
        kind: BatchKind,
        items: &[T],
        mut map: M,
        mut upload: U,
    ) -> BatchReport
    where
        M: FnMut(&T) -> CoreResult<Mapped<P>>,
        U: FnMut(P) -> Fut,
        Fut: Future<Output = SyncResult<RemoteId>>,
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let total = items.len();
        let noun = kind.noun();

        info!(%run_id, %kind, total, pacing_ms = self.pacer.interval().as_millis() as u64, "Starting batch");

        let mut outcomes = Vec::with_capacity(total);
        let mut warnings = Vec::new();

        for (index, item) in items.iter().enumerate() {
            let position = index + 1;
            info!(%run_id, %kind, index = position, total, "Uploading {noun} {position}/{total}");

            let outcome = match map(item) {
                Ok(mapped) => {
                    for warning in &mapped.warnings {
                        warn!(%run_id, %kind, index = position, %warning, "Data quality warning");
                    }
                    warnings.extend(mapped.warnings);

                    match upload(mapped.payload).await {
                        Ok(id) => {
                            info!(%run_id, %kind, index = position, total, %id, "Uploaded {noun} {position}/{total}");
                            UploadOutcome::Uploaded { index, id }
                        }
                        Err(e) => {
                            error!(%run_id, %kind, index = position, total, error = %e, "Failed to upload {noun} {position}/{total}");
                            UploadOutcome::Failed {
                                index,
                                error: e.to_string(),
                            }
                        }
                    }
                }
                Err(e) => {
                    error!(%run_id, %kind, index = position, total, error = %e, "Skipped {noun} {position}/{total}: mapping failed");
                    UploadOutcome::Failed {
                        index,
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);

            self.pacer.pause().await;
        }

        let report = BatchReport {
            kind,
            run_id,
            started_at,
            finished_at: Utc::now(),
            total,
            outcomes,
            warnings,
        };

        info!(
            %run_id,
            %kind,
            total,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Batch finished"
        );

        report
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::pacing::{FixedInterval, NoPacing};
    use ferry_core::CoreError;
    use std::time::Duration;
    use tokio::time::Instant;

    fn identity(n: &u32) -> CoreResult<Mapped<u32>> {
        Ok(Mapped {
            payload: *n,
            warnings: Vec::new(),
        })
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_item() {
        let items = vec![1u32, 2, 3, 4, 5];
        let mut attempted = Vec::new();

        let report = BatchSynchronizer::new(NoPacing)
            .sync_batch(BatchKind::Orders, &items, identity, |n| {
                attempted.push(n);
                async move {
                    if n == 3 {
                        Err(SyncError::RemoteRequest {
                            status: 500,
                            body: "boom".into(),
                        })
                    } else {
                        Ok(RemoteId(format!("id-{n}")))
                    }
                }
            })
            .await;

        assert_eq!(attempted, vec![1, 2, 3, 4, 5]);
        assert_eq!(report.total, 5);
        assert_eq!(report.outcomes.len(), 5);
        assert_eq!(report.succeeded(), 4);
        assert_eq!(report.failed(), 1);
        assert!(matches!(
            &report.outcomes[2],
            UploadOutcome::Failed { index: 2, error } if error.contains("500")
        ));
        assert_eq!(
            report.outcomes[4],
            UploadOutcome::Uploaded {
                index: 4,
                id: RemoteId("id-5".into())
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_applies_after_every_item() {
        let items = vec![1u32, 2, 3, 4];
        let start = Instant::now();

        let report = BatchSynchronizer::new(FixedInterval::from_millis(1000))
            .sync_batch(BatchKind::Orders, &items, identity, |n| async move {
                Ok(RemoteId(n.to_string()))
            })
            .await;

        assert_eq!(report.succeeded(), 4);
        assert!(start.elapsed() >= Duration::from_millis(4 * 1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_applies_after_failures_too() {
        let items = vec![1u32, 2];
        let start = Instant::now();

        let report = BatchSynchronizer::new(FixedInterval::from_millis(500))
            .sync_batch(BatchKind::Products, &items, identity, |_| async {
                Err::<RemoteId, _>(SyncError::RemoteTransport("refused".into()))
            })
            .await;

        assert_eq!(report.failed(), 2);
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_mapping_failure_skips_upload() {
        let items = vec![1u32, 2, 3];
        let mut uploaded = Vec::new();

        let report = BatchSynchronizer::new(NoPacing)
            .sync_batch(
                BatchKind::Products,
                &items,
                |n: &u32| {
                    if *n == 2 {
                        Err(CoreError::MissingField {
                            row: 2,
                            field: "price".into(),
                        })
                    } else {
                        identity(n)
                    }
                },
                |n| {
                    uploaded.push(n);
                    async move { Ok(RemoteId(n.to_string())) }
                },
            )
            .await;

        assert_eq!(uploaded, vec![1, 3]);
        assert_eq!(report.outcomes.len(), 3);
        assert!(!report.outcomes[1].is_success());
        assert_eq!(report.failures().next().map(UploadOutcome::index), Some(1));
    }

    #[tokio::test]
    async fn test_warnings_are_collected() {
        let items = vec![7u32];
        let report = BatchSynchronizer::new(NoPacing)
            .sync_batch(
                BatchKind::Inventory,
                &items,
                |n: &u32| {
                    Ok(Mapped {
                        payload: *n,
                        warnings: vec![DataQualityWarning::new(1, "inventory_level", Some("x"), "not a number")],
                    })
                },
                |n| async move { Ok(RemoteId(n.to_string())) },
            )
            .await;

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.kind, BatchKind::Inventory);
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_empty_batch_reports_nothing() {
        let items: Vec<u32> = Vec::new();
        let report = BatchSynchronizer::new(NoPacing)
            .sync_batch(BatchKind::Orders, &items, identity, |n| async move {
                Ok(RemoteId(n.to_string()))
            })
            .await;
        assert_eq!(report.total, 0);
        assert_eq!(report.failed(), 0);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(BatchKind::Orders.noun(), "order");
        assert_eq!(BatchKind::Inventory.to_string(), "inventory");
        assert_eq!(
            serde_json::to_value(UploadOutcome::Failed {
                index: 0,
                error: "x".into()
            })
            .unwrap(),
            serde_json::json!({"status": "failed", "index": 0, "error": "x"})
        );
    }
}
