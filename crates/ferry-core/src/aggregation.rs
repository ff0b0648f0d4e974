//! # Aggregation Module
//!
//! Groups flat order rows into composite orders keyed by customer email.
//!
//! ## Fold
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Row → Order Aggregation                             │
//! │                                                                         │
//! │  row 1  a@b.com  Shirt ×2 ──┐                                          │
//! │  row 2  c@d.com  Mug   ×1 ──┼──▶ ┌───────────────────────────┐         │
//! │  row 3  a@b.com  Hat   ×1 ──┘    │  key → CompositeOrder     │         │
//! │                                  │  ───────────────────────  │         │
//! │                                  │  a_b_com: [Shirt, Hat]    │         │
//! │                                  │  c_d_com: [Mug]           │         │
//! │                                  └─────────────┬─────────────┘         │
//! │                                                │ first-seen key order  │
//! │                                                ▼                        │
//! │                             [a_b_com, c_d_com] minus imported          │
//! │                                                                         │
//! │  • First row of a key seeds contact/billing/shipping fields            │
//! │  • Later rows of the same key only append a LineItem                   │
//! │  • The map is local to one call; nothing survives between passes       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed quantities and provinces never reject a row. They are accepted
//! (as `Quantity::Unparsed` / `None`) and reported as warnings.

use std::collections::HashMap;

use crate::coerce::{normalize_identity, optional_text, parse_quantity, province_code};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CompositeOrder, DataQualityWarning, LineItem, Quantity, RawRecord};
use crate::ORDER_TAG;

// =============================================================================
// Aggregation Result
// =============================================================================

/// Orders plus everything that was accepted despite looking wrong.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub orders: Vec<CompositeOrder>,
    pub warnings: Vec<DataQualityWarning>,
}

// =============================================================================
// Entry Points
// =============================================================================

/// Aggregates order rows into composite orders.
///
/// ## Errors
/// - [`CoreError::EmptySource`] when `records` is empty
/// - [`CoreError::MissingField`] when a row has no `email` field
///
/// ## Example
/// ```rust
/// use ferry_core::{aggregate, RawRecord};
///
/// let rows = vec![
///     RawRecord::from_pairs([("email", "a@b.com"), ("lineitem_title", "Shirt"), ("lineitem_quantity", "2")]),
///     RawRecord::from_pairs([("email", "a@b.com"), ("lineitem_title", "Hat"), ("lineitem_quantity", "1")]),
/// ];
/// let orders = aggregate(&rows).unwrap();
/// assert_eq!(orders.len(), 1);
/// assert_eq!(orders[0].order_name, "a_b_com");
/// assert_eq!(orders[0].line_items.len(), 2);
/// ```
pub fn aggregate(records: &[RawRecord]) -> CoreResult<Vec<CompositeOrder>> {
    aggregate_detailed(records).map(|aggregation| aggregation.orders)
}

/// Same as [`aggregate`], also returning data-quality warnings.
pub fn aggregate_detailed(records: &[RawRecord]) -> CoreResult<Aggregation> {
    if records.is_empty() {
        return Err(CoreError::EmptySource);
    }

    let mut by_key: HashMap<String, CompositeOrder> = HashMap::new();
    let mut key_order: Vec<String> = Vec::new();
    let mut warnings = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let row = index + 1;
        let email = record.get("email").ok_or_else(|| CoreError::MissingField {
            row,
            field: "email".to_string(),
        })?;
        let key = normalize_identity(email);
        let item = line_item(row, record, &mut warnings);

        match by_key.get_mut(&key) {
            Some(order) => order.line_items.push(item),
            None => {
                let order = seed_order(row, &key, email, record, item, &mut warnings);
                key_order.push(key.clone());
                by_key.insert(key, order);
            }
        }
    }

    let orders = key_order
        .into_iter()
        .filter_map(|key| by_key.remove(&key))
        .filter(|order| !order.imported)
        .collect();

    Ok(Aggregation { orders, warnings })
}

// =============================================================================
// Row Helpers
// =============================================================================

fn line_item(row: usize, record: &RawRecord, warnings: &mut Vec<DataQualityWarning>) -> LineItem {
    let raw_quantity = record.get("lineitem_quantity");
    let quantity = parse_quantity(raw_quantity);
    if let Quantity::Unparsed(_) = quantity {
        warnings.push(DataQualityWarning::new(
            row,
            "lineitem_quantity",
            raw_quantity,
            "not a non-negative integer",
        ));
    }

    LineItem {
        name: record.get_owned("lineitem_title"),
        sku: record.get_owned("lineitem_sku"),
        unit_price: Money::zero(),
        quantity,
        row,
    }
}

fn seed_order(
    row: usize,
    key: &str,
    email: &str,
    record: &RawRecord,
    first_item: LineItem,
    warnings: &mut Vec<DataQualityWarning>,
) -> CompositeOrder {
    let raw_province = record.get("billing_province");
    let billing_province = province_code(raw_province);
    if billing_province.is_none() && raw_province.is_some_and(|p| !p.is_empty()) {
        warnings.push(DataQualityWarning::new(
            row,
            "billing_province",
            raw_province,
            "not a two-letter code",
        ));
    }

    CompositeOrder {
        order_name: key.to_string(),
        email: email.to_string(),
        phone: record.get_owned("phone"),
        billing_name: record.get_owned("billing_name"),
        billing_company: record.get_owned("company"),
        billing_address1: record.get_owned("billing_address1"),
        billing_address2: optional_text(record.get("billing_address2")),
        billing_city: record.get_owned("billing_city"),
        billing_zip: record.get_owned("billing_zip"),
        billing_province,
        billing_country: record.get_owned("billing_country"),
        line_items: vec![first_item],
        shipping_method: record.get_owned("shipping_method"),
        order_is_digital: false,
        tags: ORDER_TAG.to_string(),
        customer_message: record.get_owned("note_attributes").unwrap_or_default(),
        imported: false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
