//! # Money Module
//!
//! Provides the `Money` type for monetary values on imported orders.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Amounts live as i64 cents inside the pipeline.                      │
//! │    Only the wire boundary renders them as a decimal (10.99, 0.0).      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Imported line items and shipping costs are always zero today; the remote
//! store re-prices lines from its own catalog. The type still keeps amounts
//! exact so a future priced import does not have to revisit the payloads.
//!
//! ## Usage
//! ```rust
//! use ferry_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! assert_eq!(price.to_decimal(), 10.99);
//! assert_eq!(Money::zero().to_decimal(), 0.0);
//! ```

use serde::{Serialize, Serializer};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialize as decimal**: The commerce API expects `0.0`, not `0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Renders the amount as a decimal in major units.
    ///
    /// This is the ONLY place cents become a float, and only on the way out
    /// to a JSON payload.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Payloads carry money as a JSON decimal number.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero() {
        assert_eq!(Money::default(), Money::zero());
        assert_eq!(Money::zero().to_decimal(), 0.0);
        assert_eq!(Money::from_cents(-550).to_decimal(), -5.5);
    }

    #[test]
    fn test_serializes_as_decimal() {
        assert_eq!(serde_json::to_string(&Money::zero()).unwrap(), "0.0");
        assert_eq!(serde_json::to_string(&Money::from_cents(1099)).unwrap(), "10.99");
    }
}
