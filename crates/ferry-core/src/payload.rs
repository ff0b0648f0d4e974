//! # Payload Module
//!
//! Explicit request bodies for the three remote endpoints, plus the pure
//! functions that derive them from domain records.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Domain → Wire Payloads                             │
//! │                                                                         │
//! │  CompositeOrder ──map_order──────▶ OrderPayload         POST v2 orders │
//! │  ProductRecord  ──map_product────▶ ProductPayload       POST v3 catalog│
//! │  InventoryRecord──map_inventory──▶ InventoryUpdate      PUT  v3 ?sku=  │
//! │                                                                         │
//! │  Every mapping is pure: same input → byte-identical JSON.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Numeric Policy
//! Unparsable numbers are the one place where behavior is a choice:
//! - `Lenient` (default): the field travels as `null` and a warning is
//!   returned next to the payload
//! - `Strict`: mapping fails with [`CoreError::DataQuality`] and the item is
//!   never uploaded

use serde::{Deserialize, Serialize};

use crate::coerce::{optional_text, parse_flag, parse_float_prefix, parse_int_prefix};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CompositeOrder, DataQualityWarning, InventoryRecord, ProductRecord, Quantity};
use crate::{DEFAULT_PRODUCT_TYPE, ORDER_NOTE, PENDING_STATUS_ID};

// =============================================================================
// Numeric Policy
// =============================================================================

/// What to do with a numeric field that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericPolicy {
    /// Send `null`, report a warning.
    #[default]
    Lenient,
    /// Fail the item.
    Strict,
}

/// A payload plus the data-quality warnings raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapped<P> {
    pub payload: P,
    pub warnings: Vec<DataQualityWarning>,
}

impl<P> Mapped<P> {
    fn clean(payload: P) -> Self {
        Self {
            payload,
            warnings: Vec::new(),
        }
    }
}

// =============================================================================
// Order Payload (v2)
// =============================================================================

/// Body for `POST /stores/{hash}/v2/orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPayload {
    pub customer_id: u64,
    pub status_id: u32,
    pub billing_address: AddressPayload,
    pub shipping_addresses: Vec<AddressPayload>,
    pub products: Vec<LineItemPayload>,
    pub shipping_cost_inc_tax: Money,
    pub base_shipping_cost: Money,
    pub customer_message: String,
    pub staff_notes: String,
}

/// Billing address; also reused verbatim as the single shipping address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressPayload {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    /// Sent as explicit `null` when absent.
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Sent as explicit `null` when the province was malformed.
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub price_inc_tax: Money,
    /// `null` for the unparsed sentinel.
    pub quantity: Quantity,
}

/// Maps a composite order to the v2 order body.
///
/// # Field Mapping
/// ```text
/// CompositeOrder            →  OrderPayload
/// ─────────────────────────────────────────────
/// (constant)                →  customer_id = 0 (guest)
/// (constant)                →  status_id = 11 (pending)
/// billing_name              →  billing_address.first_name / last_name
/// billing_address1..country →  billing_address.*
/// billing_province          →  billing_address.state
/// phone                     →  billing_address.phone
/// billing_address           →  shipping_addresses = [billing_address]
/// line_items                →  products
/// (constant)                →  shipping_cost_inc_tax = base_shipping_cost = 0.0
/// customer_message          →  customer_message
/// (constant)                →  staff_notes = "IMPORTED ORDER"
/// ```
///
/// Quantity warnings are raised once, by aggregation, so a lenient mapping
/// returns none of its own. A strict mapping fails on the first unparsed
/// quantity.
pub fn map_order(order: &CompositeOrder, policy: NumericPolicy) -> CoreResult<Mapped<OrderPayload>> {
    if policy == NumericPolicy::Strict {
        if let Some(item) = order.line_items.iter().find(|item| !item.quantity.is_parsed()) {
            let raw = match &item.quantity {
                Quantity::Unparsed(raw) => raw.as_str(),
                Quantity::Count(_) => "",
            };
            return Err(CoreError::DataQuality(DataQualityWarning::new(
                item.row,
                "lineitem_quantity",
                Some(raw),
                "not a non-negative integer",
            )));
        }
    }

    let (first_name, last_name) = split_name(order.billing_name.as_deref().unwrap_or_default());
    let billing_address = AddressPayload {
        first_name,
        last_name,
        address1: order.billing_address1.clone(),
        address2: order.billing_address2.clone(),
        city: order.billing_city.clone(),
        state: order.billing_province.clone(),
        zip: order.billing_zip.clone(),
        country: order.billing_country.clone(),
        phone: order.phone.clone(),
    };

    let products = order
        .line_items
        .iter()
        .map(|item| LineItemPayload {
            name: item.name.clone(),
            sku: item.sku.clone(),
            price_inc_tax: item.unit_price,
            quantity: item.quantity.clone(),
        })
        .collect();

    Ok(Mapped::clean(OrderPayload {
        customer_id: 0,
        status_id: PENDING_STATUS_ID,
        shipping_addresses: vec![billing_address.clone()],
        billing_address,
        products,
        shipping_cost_inc_tax: Money::zero(),
        base_shipping_cost: Money::zero(),
        customer_message: order.customer_message.clone(),
        staff_notes: ORDER_NOTE.to_string(),
    }))
}

/// First token before the first space, then everything after it verbatim.
fn split_name(full: &str) -> (String, String) {
    match full.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.to_string()),
        None => (full.to_string(), String::new()),
    }
}

// =============================================================================
// Product Payload (v3 catalog)
// =============================================================================

/// Body for `POST /stores/{hash}/v3/catalog/products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub price: Option<f64>,
    pub categories: Vec<Option<i64>>,
    #[serde(rename = "type")]
    pub product_type: String,
    pub inventory_level: Option<i64>,
    pub inventory_warning_level: Option<i64>,
    pub is_visible: bool,
}

/// Maps a product row to the catalog body.
///
/// # Field Mapping
/// ```text
/// ProductRecord             →  ProductPayload
/// ─────────────────────────────────────────────
/// name, sku                 →  name, sku (omitted when absent)
/// price                     →  price (float, null if unparsable)
/// category_id               →  categories = [int | null]
/// product_type              →  type ("physical" when absent or empty)
/// inventory_level           →  inventory_level (int | null)
/// inventory_warning_level   →  inventory_warning_level (int | null)
/// is_visible                →  is_visible ("true" only)
/// ```
pub fn map_product(record: &ProductRecord, policy: NumericPolicy) -> CoreResult<Mapped<ProductPayload>> {
    let mut coercer = Coercer::new(record.row, policy);

    let price = coercer.number("price", record.price.as_deref(), parse_float_prefix)?;
    let category = coercer.number("category_id", record.category_id.as_deref(), parse_int_prefix)?;
    let inventory_level =
        coercer.number("inventory_level", record.inventory_level.as_deref(), parse_int_prefix)?;
    let inventory_warning_level = coercer.number(
        "inventory_warning_level",
        record.inventory_warning_level.as_deref(),
        parse_int_prefix,
    )?;

    let payload = ProductPayload {
        name: record.name.clone(),
        sku: record.sku.clone(),
        price,
        categories: vec![category],
        product_type: optional_text(record.product_type.as_deref())
            .unwrap_or_else(|| DEFAULT_PRODUCT_TYPE.to_string()),
        inventory_level,
        inventory_warning_level,
        is_visible: parse_flag(record.is_visible.as_deref()),
    };

    Ok(coercer.finish(payload))
}

// =============================================================================
// Inventory Payload (v3 catalog, addressed by SKU)
// =============================================================================

/// Body for `PUT /stores/{hash}/v3/catalog/products?sku={sku}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryUpdatePayload {
    pub inventory_level: Option<i64>,
    pub inventory_warning_level: Option<i64>,
}

/// An inventory body together with the SKU that addresses it.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryUpdate {
    pub sku: String,
    pub body: InventoryUpdatePayload,
}

/// Maps an inventory row to a SKU-addressed update.
///
/// A row without a SKU cannot be addressed and fails with
/// [`CoreError::MissingField`] under either policy.
pub fn map_inventory(record: &InventoryRecord, policy: NumericPolicy) -> CoreResult<Mapped<InventoryUpdate>> {
    let sku = optional_text(record.sku.as_deref()).ok_or_else(|| CoreError::MissingField {
        row: record.row,
        field: "sku".to_string(),
    })?;

    let mut coercer = Coercer::new(record.row, policy);
    let inventory_level =
        coercer.number("inventory_level", record.inventory_level.as_deref(), parse_int_prefix)?;
    let inventory_warning_level = coercer.number(
        "inventory_warning_level",
        record.inventory_warning_level.as_deref(),
        parse_int_prefix,
    )?;

    Ok(coercer.finish(InventoryUpdate {
        sku,
        body: InventoryUpdatePayload {
            inventory_level,
            inventory_warning_level,
        },
    }))
}

// =============================================================================
// Policy-Aware Coercion
// =============================================================================

struct Coercer {
    row: usize,
    policy: NumericPolicy,
    warnings: Vec<DataQualityWarning>,
}

impl Coercer {
    fn new(row: usize, policy: NumericPolicy) -> Self {
        Self {
            row,
            policy,
            warnings: Vec::new(),
        }
    }

    fn number<T>(
        &mut self,
        field: &str,
        raw: Option<&str>,
        parse: impl Fn(&str) -> Option<T>,
    ) -> CoreResult<Option<T>> {
        if let Some(value) = raw.and_then(&parse) {
            return Ok(Some(value));
        }

        let warning = DataQualityWarning::new(self.row, field, raw, "not a number");
        match self.policy {
            NumericPolicy::Lenient => {
                self.warnings.push(warning);
                Ok(None)
            }
            NumericPolicy::Strict => Err(CoreError::DataQuality(warning)),
        }
    }

    fn finish<P>(self, payload: P) -> Mapped<P> {
        Mapped {
            payload,
            warnings: self.warnings,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::aggregate;
    use crate::types::RawRecord;
    use serde_json::json;

    fn sample_order() -> CompositeOrder {
        let rows = vec![
            RawRecord::from_pairs([
                ("email", "ada@example.com"),
                ("phone", "555-0100"),
                ("billing_name", "Ada King Lovelace"),
                ("billing_address1", "1 Analytical Way"),
                ("billing_address2", ""),
                ("billing_city", "London"),
                ("billing_zip", "N1"),
                ("billing_province", "Greater London"),
                ("billing_country", "GB"),
                ("lineitem_title", "Shirt"),
                ("lineitem_sku", "SHIRT-M"),
                ("lineitem_quantity", "2"),
                ("note_attributes", "gift wrap"),
            ]),
            RawRecord::from_pairs([
                ("email", "ada@example.com"),
                ("lineitem_title", "Hat"),
                ("lineitem_quantity", "lots"),
            ]),
        ];
        aggregate(&rows).unwrap().remove(0)
    }

    fn product(pairs: &[(&str, &str)]) -> ProductRecord {
        ProductRecord::from_record(1, &RawRecord::from_pairs(pairs.iter().copied()))
    }

    #[test]
    fn test_order_payload_shape() {
        let mapped = map_order(&sample_order(), NumericPolicy::Lenient).unwrap();
        let value = serde_json::to_value(&mapped.payload).unwrap();

        let address = json!({
            "first_name": "Ada",
            "last_name": "King Lovelace",
            "address1": "1 Analytical Way",
            "address2": null,
            "city": "London",
            "state": null,
            "zip": "N1",
            "country": "GB",
            "phone": "555-0100"
        });
        assert_eq!(
            value,
            json!({
                "customer_id": 0,
                "status_id": 11,
                "billing_address": address,
                "shipping_addresses": [address],
                "products": [
                    {"name": "Shirt", "sku": "SHIRT-M", "price_inc_tax": 0.0, "quantity": 2},
                    {"name": "Hat", "price_inc_tax": 0.0, "quantity": null}
                ],
                "shipping_cost_inc_tax": 0.0,
                "base_shipping_cost": 0.0,
                "customer_message": "gift wrap",
                "staff_notes": "IMPORTED ORDER"
            })
        );
        assert!(mapped.warnings.is_empty());
    }

    #[test]
    fn test_order_mapping_is_byte_identical() {
        let order = sample_order();
        let first = serde_json::to_vec(&map_order(&order, NumericPolicy::Lenient).unwrap().payload).unwrap();
        let second = serde_json::to_vec(&map_order(&order, NumericPolicy::Lenient).unwrap().payload).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_strict_order_fails_on_unparsed_quantity() {
        let err = map_order(&sample_order(), NumericPolicy::Strict).unwrap_err();
        match err {
            CoreError::DataQuality(warning) => {
                assert_eq!(warning.row, 2);
                assert_eq!(warning.value, "lots");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("Ada"), ("Ada".to_string(), String::new()));
        assert_eq!(split_name("Ada  Lovelace"), ("Ada".to_string(), " Lovelace".to_string()));
        assert_eq!(split_name(""), (String::new(), String::new()));
    }

    #[test]
    fn test_product_payload_coercions() {
        let record = product(&[
            ("name", "Mug"),
            ("sku", "MUG-1"),
            ("price", "12.50"),
            ("category_id", "23"),
            ("type", ""),
            ("inventory_level", "40"),
            ("inventory_warning_level", "5"),
            ("is_visible", "true"),
        ]);
        let mapped = map_product(&record, NumericPolicy::Lenient).unwrap();

        assert_eq!(
            serde_json::to_value(&mapped.payload).unwrap(),
            json!({
                "name": "Mug",
                "sku": "MUG-1",
                "price": 12.5,
                "categories": [23],
                "type": "physical",
                "inventory_level": 40,
                "inventory_warning_level": 5,
                "is_visible": true
            })
        );
        assert!(mapped.warnings.is_empty());
    }

    #[test]
    fn test_lenient_product_sends_null_and_warns() {
        let record = product(&[
            ("sku", "MUG-1"),
            ("price", "free"),
            ("category_id", "23"),
            ("type", "digital"),
            ("inventory_level", "1"),
            ("inventory_warning_level", "1"),
            ("is_visible", "yes"),
        ]);
        let mapped = map_product(&record, NumericPolicy::Lenient).unwrap();

        assert_eq!(mapped.payload.price, None);
        assert_eq!(mapped.payload.product_type, "digital");
        assert!(!mapped.payload.is_visible);
        assert_eq!(mapped.warnings.len(), 1);
        assert_eq!(mapped.warnings[0].field, "price");
        assert_eq!(mapped.warnings[0].value, "free");
    }

    #[test]
    fn test_strict_product_fails() {
        let record = product(&[("price", "free")]);
        let err = map_product(&record, NumericPolicy::Strict).unwrap_err();
        assert!(matches!(err, CoreError::DataQuality(ref w) if w.field == "price"));
    }

    #[test]
    fn test_inventory_mapping() {
        let raw = RawRecord::from_pairs([
            ("sku", "MUG-1"),
            ("inventory_level", "7"),
            ("inventory_warning_level", "n/a"),
        ]);
        let record = InventoryRecord::from_record(3, &raw);
        let mapped = map_inventory(&record, NumericPolicy::Lenient).unwrap();

        assert_eq!(mapped.payload.sku, "MUG-1");
        assert_eq!(
            serde_json::to_value(&mapped.payload.body).unwrap(),
            json!({"inventory_level": 7, "inventory_warning_level": null})
        );
        assert_eq!(mapped.warnings[0].row, 3);
    }

    #[test]
    fn test_inventory_without_sku_is_missing_field() {
        let record = InventoryRecord::from_record(
            9,
            &RawRecord::from_pairs([("inventory_level", "1")]),
        );
        assert_eq!(
            map_inventory(&record, NumericPolicy::Lenient),
            Err(CoreError::MissingField {
                row: 9,
                field: "sku".to_string()
            })
        );
    }

    #[test]
    fn test_numeric_policy_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: NumericPolicy,
        }
        let parsed: Wrapper = serde_json::from_str(r#"{"policy":"strict"}"#).unwrap();
        assert_eq!(parsed.policy, NumericPolicy::Strict);
        assert_eq!(NumericPolicy::default(), NumericPolicy::Lenient);
    }
}
