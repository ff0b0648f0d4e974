//! # ferry-core: Pure Record Logic for Ferry
//!
//! This crate is the **heart** of Ferry. It turns flat source rows into
//! typed commerce payloads as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Ferry Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    ferry (binary)                               │   │
//! │  │    .env ──► tracing ──► SyncConfig ──► SyncRunner::run         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ferry-sync (I/O layer)                       │   │
//! │  │    CSV / JSON sources, BigCommerce client, pacing, batches      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ferry-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │  coerce   │  │ aggregation │  │ payload  │  │   │
//! │  │   │ RawRecord │  │  strings  │  │ rows →      │  │ Order    │  │   │
//! │  │   │ Composite │  │  → typed  │  │ orders      │  │ Product  │  │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records, composite orders, line items, warnings
//! - [`money`] - Integer-cent money rendered as a decimal on the wire
//! - [`coerce`] - String → typed value coercion
//! - [`aggregation`] - Rows sharing an email become one order
//! - [`payload`] - Explicit request bodies and their mapping functions
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use ferry_core::{aggregate, map_order, NumericPolicy, RawRecord};
//!
//! let rows = vec![RawRecord::from_pairs([
//!     ("email", "a@b.com"),
//!     ("billing_name", "Ada Lovelace"),
//!     ("lineitem_title", "Shirt"),
//!     ("lineitem_quantity", "2"),
//! ])];
//!
//! let orders = aggregate(&rows).unwrap();
//! let mapped = map_order(&orders[0], NumericPolicy::Lenient).unwrap();
//! assert_eq!(mapped.payload.billing_address.first_name, "Ada");
//! assert_eq!(mapped.payload.staff_notes, "IMPORTED ORDER");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregation;
pub mod coerce;
pub mod error;
pub mod money;
pub mod payload;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregation::{aggregate, aggregate_detailed, Aggregation};
pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use payload::{
    map_inventory, map_order, map_product, InventoryUpdate, InventoryUpdatePayload, Mapped,
    NumericPolicy, OrderPayload, ProductPayload,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Staff note attached to every imported order.
pub const ORDER_NOTE: &str = "IMPORTED ORDER";

/// Tag carried by every composite order.
///
/// Kept on the domain entity only; the v2 order body has no tag field.
pub const ORDER_TAG: &str = "IMPORTED";

/// Remote order status for "Pending".
pub const PENDING_STATUS_ID: u32 = 11;

/// Product type used when a row leaves `type` empty.
pub const DEFAULT_PRODUCT_TYPE: &str = "physical";
