//! # ferry-sync: Sync Engine for Ferry
//!
//! This crate moves flat records from CSV files and a JSON feed into a
//! BigCommerce store, one paced request at a time.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Runner Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  SyncRunner (Main Orchestrator)                  │  │
//! │  │                                                                  │  │
//! │  │  orders (file) → orders (api) → products → inventory             │  │
//! │  │  Each sub-sync isolated; the run itself never fails              │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ RecordSource   │  │ BatchSync-     │  │  CommerceApi           │    │
//! │  │                │  │ hronizer       │  │                        │    │
//! │  │ CSV file or    │  │ map → upload → │  │ create_order           │    │
//! │  │ JSON array     │  │ pause, one     │  │ create_product         │    │
//! │  │ → RawRecord    │  │ item at a time │  │ update_inventory       │    │
//! │  └────────────────┘  └────────────────┘  └───────────┬────────────┘    │
//! │                                                      │                  │
//! │                                          ┌───────────▼────────────┐    │
//! │                                          │ RemoteClient (trait)   │    │
//! │                                          │ BigCommerceClient:     │    │
//! │                                          │ X-Auth-Token over HTTP │    │
//! │                                          └────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`runner`] - Main `SyncRunner` orchestrator and `RunSummary`
//! - [`batch`] - Paced, failure-isolating upload loop
//! - [`source`] - CSV and JSON record sources
//! - [`client`] - Remote store client and typed operations
//! - [`pacing`] - Inter-request delay policy
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ferry_sync::{SyncConfig, SyncRunner};
//!
//! let config = SyncConfig::load(None)?;
//! let runner = SyncRunner::from_config(&config)?;
//!
//! let summary = runner.run().await;
//! summary.log();
//! println!("Uploaded: {}, failed: {}", summary.uploaded(), summary.failed());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod pacing;
pub mod runner;
pub mod source;

// =============================================================================
// Re-exports
// =============================================================================

pub use batch::{BatchKind, BatchReport, BatchSynchronizer, UploadOutcome};
pub use client::{BigCommerceClient, CommerceApi, RemoteClient, RemoteRequest};
pub use config::{HttpSettings, MappingSettings, PacingSettings, SourceSettings, StoreSettings, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use pacing::{FixedInterval, NoPacing, Pacer};
pub use runner::{RunSummary, SubSync, SubSyncStatus, SubSyncSummary, SyncRunner, SyncRunnerBuilder};
pub use source::{CsvFileSource, HttpJsonSource, RecordSource, SourceRead};
