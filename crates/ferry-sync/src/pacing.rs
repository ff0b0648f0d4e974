//! # Pacing
//!
//! Inter-request delay policy for the batch loop.
//!
//! ```text
//! item 1 ──upload──► pause ──► item 2 ──upload──► pause ──► ... item N ──► pause
//!                    └─ FixedInterval(d): sleep d, whatever the outcome
//!                    └─ NoPacing: return immediately (tests, dry runs)
//! ```
//!
//! Pacing is unconditional. It does not read rate-limit headers and does
//! not back off on errors.

use std::time::Duration;

use async_trait::async_trait;

/// Suspends the batch between two remote calls.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);

    /// The nominal delay, for logging.
    fn interval(&self) -> Duration;
}

/// Sleeps a fixed duration after every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedInterval(pub Duration);

impl FixedInterval {
    pub fn from_millis(ms: u64) -> Self {
        FixedInterval(Duration::from_millis(ms))
    }
}

#[async_trait]
impl Pacer for FixedInterval {
    async fn pause(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }

    fn interval(&self) -> Duration {
        self.0
    }
}

/// No delay at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn pause(&self) {}

    fn interval(&self) -> Duration {
        Duration::ZERO
    }
}
