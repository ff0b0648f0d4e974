//! # Error Types
//!
//! Domain-specific error types for ferry-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ferry-core errors (this file)                                         │
//! │  └── CoreError        - Aggregation and mapping failures               │
//! │                                                                         │
//! │  ferry-sync errors (separate crate)                                    │
//! │  └── SyncError        - Sources, remote calls, configuration           │
//! │                                                                         │
//! │  Flow: CoreError → SyncError → sub-sync boundary (logged, not fatal)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (row, field, value)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::types::DataQualityWarning;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised by the pure record pipeline.
///
/// None of these ever abort more than one sub-sync. `EmptySource` and
/// `MissingField` stop an aggregation pass; `DataQuality` fails a single
/// item under the strict numeric policy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Zero records were handed to the aggregator.
    ///
    /// ## When This Occurs
    /// - CSV file has a header row and nothing else
    /// - Orders API answered with `[]`
    ///
    /// The caller must not proceed to upload.
    #[error("No records to aggregate")]
    EmptySource,

    /// A row lacks a field that cannot be defaulted.
    ///
    /// ## When This Occurs
    /// - Order row without an `email` column (cannot be keyed)
    /// - Inventory row without a `sku` (cannot be addressed)
    #[error("Row {row} is missing required field '{field}'")]
    MissingField { row: usize, field: String },

    /// A numeric field could not be coerced under the strict policy.
    ///
    /// ## User Workflow
    /// ```text
    /// products.csv row 4: price = "abc"
    ///      │
    ///      ▼
    /// map_product(.., NumericPolicy::Strict)
    ///      │
    ///      ▼
    /// DataQuality { row: 4, field: "price", .. }
    ///      │
    ///      ▼
    /// Batch records item 4 as failed, moves on to item 5
    /// ```
    #[error("Data quality error: {0}")]
    DataQuality(DataQualityWarning),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::MissingField {
            row: 3,
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "Row 3 is missing required field 'email'");

        assert_eq!(CoreError::EmptySource.to_string(), "No records to aggregate");
    }

    #[test]
    fn test_data_quality_message_carries_context() {
        let err = CoreError::DataQuality(DataQualityWarning {
            row: 4,
            field: "price".to_string(),
            value: "abc".to_string(),
            reason: "not a number".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Data quality error: row 4: price = 'abc' (not a number)"
        );
    }
}
