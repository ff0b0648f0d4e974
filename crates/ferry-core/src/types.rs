//! # Domain Types
//!
//! Record and entity types flowing through the Ferry pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────────┐                    │
//! │  │   RawRecord     │──────► │   CompositeOrder    │  (aggregated)      │
//! │  │  ─────────────  │  many  │  ─────────────────  │                    │
//! │  │  field → string │  to 1  │  order_name (key)   │                    │
//! │  └───────┬─────────┘        │  billing_*          │                    │
//! │          │                  │  line_items ──► LineItem                 │
//! │          │ 1 to 1           └─────────────────────┘                    │
//! │          ▼                                                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ProductRecord   │   │ InventoryRecord │   │    Quantity     │       │
//! │  │  raw strings,   │   │  sku + levels   │   │  Count(u32)     │       │
//! │  │  coerced late   │   │                 │   │  Unparsed(..)   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Row Numbers
//! Every type that came from a source row remembers its 1-based position in
//! the record sequence (`row`). Warnings and errors quote it so an operator
//! can find the offending line.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Raw Record
// =============================================================================

/// One flat source row: field name → string value.
///
/// Field order follows the source: CSV header order, or the key order of a
/// JSON object as it arrived on the wire.
/// Absent and empty are different things: `get` returns `None` only when the
/// field was never present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from `(field, value)` pairs. A repeated field keeps
    /// the last value.
    ///
    /// ## Example
    /// ```rust
    /// use ferry_core::RawRecord;
    ///
    /// let record = RawRecord::from_pairs([("email", "a@b.com"), ("lineitem_quantity", "2")]);
    /// assert_eq!(record.get("email"), Some("a@b.com"));
    /// assert_eq!(record.get("phone"), None);
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (field, value) in pairs {
            record.insert(field, value);
        }
        record
    }

    /// Builds a record from one object of a JSON API response.
    ///
    /// - strings are kept verbatim
    /// - numbers and booleans keep their JSON text (`2`, `true`)
    /// - `null` is treated as an absent field
    /// - nested arrays/objects are stored as compact JSON
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut record = Self::new();
        for (field, value) in object {
            match value {
                Value::Null => {}
                Value::String(text) => record.insert(field.as_str(), text.as_str()),
                other => record.insert(field.as_str(), other.to_string()),
            }
        }
        record
    }

    /// Sets a field, replacing any earlier value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Looks up a field value.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Looks up a field and returns an owned copy.
    pub fn get_owned(&self, field: &str) -> Option<String> {
        self.get(field).map(str::to_string)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// A line-item quantity as read from a source row.
///
/// `Unparsed` is the non-numeric sentinel: the row is kept, the original
/// text is preserved for diagnostics, and the payload carries `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Quantity {
    Count(u32),
    Unparsed(String),
}

impl Quantity {
    /// Returns the count when the source text was a valid quantity.
    pub fn count(&self) -> Option<u32> {
        match self {
            Quantity::Count(n) => Some(*n),
            Quantity::Unparsed(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Quantity::Count(_))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Count(n) => write!(f, "{}", n),
            Quantity::Unparsed(raw) => write!(f, "'{}' (unparsed)", raw),
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Quantity::Count(n) => serializer.serialize_u32(*n),
            Quantity::Unparsed(_) => serializer.serialize_none(),
        }
    }
}

// =============================================================================
// Composite Order
// =============================================================================

/// One product line on an imported order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub name: Option<String>,
    pub sku: Option<String>,
    /// Always zero for imports; the store re-prices from its catalog.
    pub unit_price: Money,
    pub quantity: Quantity,
    /// Source row this line came from.
    pub row: usize,
}

/// An order built by merging every source row that shares a customer email.
///
/// Everything except `line_items` is taken from the FIRST row seen for the
/// key. Later rows only contribute line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeOrder {
    /// Identity key: normalized email (`a@b.com` → `a_b_com`).
    pub order_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub billing_name: Option<String>,
    pub billing_company: Option<String>,
    pub billing_address1: Option<String>,
    /// Apartment/unit line; `None` when the source was empty.
    pub billing_address2: Option<String>,
    pub billing_city: Option<String>,
    pub billing_zip: Option<String>,
    /// Two-letter state/province code, `None` when malformed.
    pub billing_province: Option<String>,
    pub billing_country: Option<String>,
    /// In first-seen order across source rows.
    pub line_items: Vec<LineItem>,
    pub shipping_method: Option<String>,
    pub order_is_digital: bool,
    pub tags: String,
    pub customer_message: String,
    /// Reserved for incremental sync. Always false within a single run.
    pub imported: bool,
}

impl CompositeOrder {
    /// Total quantity across lines that parsed.
    pub fn total_quantity(&self) -> u64 {
        self.line_items
            .iter()
            .filter_map(|item| item.quantity.count())
            .map(u64::from)
            .sum()
    }
}

// =============================================================================
// Product & Inventory Records
// =============================================================================

/// Typed view over one products.csv row. Values stay raw until mapping so
/// the numeric policy decides what a bad value means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub row: usize,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<String>,
    pub category_id: Option<String>,
    pub product_type: Option<String>,
    pub inventory_level: Option<String>,
    pub inventory_warning_level: Option<String>,
    pub is_visible: Option<String>,
}

impl ProductRecord {
    pub fn from_record(row: usize, record: &RawRecord) -> Self {
        Self {
            row,
            name: record.get_owned("name"),
            sku: record.get_owned("sku"),
            price: record.get_owned("price"),
            category_id: record.get_owned("category_id"),
            product_type: record.get_owned("type"),
            inventory_level: record.get_owned("inventory_level"),
            inventory_warning_level: record.get_owned("inventory_warning_level"),
            is_visible: record.get_owned("is_visible"),
        }
    }
}

/// Typed view over one inventory.csv row. Identity key is the SKU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    pub row: usize,
    pub sku: Option<String>,
    pub inventory_level: Option<String>,
    pub inventory_warning_level: Option<String>,
}

impl InventoryRecord {
    pub fn from_record(row: usize, record: &RawRecord) -> Self {
        Self {
            row,
            sku: record.get_owned("sku"),
            inventory_level: record.get_owned("inventory_level"),
            inventory_warning_level: record.get_owned("inventory_warning_level"),
        }
    }
}

// =============================================================================
// Remote Identifier & Warnings
// =============================================================================

/// Identifier the remote service assigned to an uploaded entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RemoteId(pub String);

impl RemoteId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RemoteId {
    fn from(value: String) -> Self {
        RemoteId(value)
    }
}

/// A malformed value that was accepted rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataQualityWarning {
    pub row: usize,
    pub field: String,
    pub value: String,
    pub reason: String,
}

impl DataQualityWarning {
    pub fn new(row: usize, field: &str, value: Option<&str>, reason: &str) -> Self {
        Self {
            row,
            field: field.to_string(),
            value: value.unwrap_or_default().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: {} = '{}' ({})",
            self.row, self.field, self.value, self.reason
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_record_insert_replaces() {
        let mut record = RawRecord::from_pairs([("sku", "A"), ("name", "Shirt")]);
        record.insert("sku", "B");
        assert_eq!(record.get("sku"), Some("B"));
        assert_eq!(record.len(), 2);
        let fields: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(fields, vec!["sku", "name"]);
    }

    #[test]
    fn test_raw_record_from_json_object() {
        let value = json!({
            "email": "a@b.com",
            "lineitem_quantity": 2,
            "is_visible": true,
            "billing_address2": null,
            "meta": {"k": [1, 2]}
        });
        let record = RawRecord::from_json_object(value.as_object().unwrap());

        assert_eq!(record.get("email"), Some("a@b.com"));
        assert_eq!(record.get("lineitem_quantity"), Some("2"));
        assert_eq!(record.get("is_visible"), Some("true"));
        assert_eq!(record.get("billing_address2"), None);
        assert_eq!(record.get("meta"), Some(r#"{"k":[1,2]}"#));
    }

    #[test]
    fn test_raw_record_keeps_json_key_order() {
        let value: Value =
            serde_json::from_str(r#"{"zip": "M5V", "email": "a@b.com", "billing_name": "Ada"}"#).unwrap();
        let record = RawRecord::from_json_object(value.as_object().unwrap());

        let fields: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(fields, vec!["zip", "email", "billing_name"]);
    }

    #[test]
    fn test_quantity_serializes_count_or_null() {
        assert_eq!(serde_json::to_value(Quantity::Count(3)).unwrap(), json!(3));
        assert_eq!(
            serde_json::to_value(Quantity::Unparsed("two".into())).unwrap(),
            Value::Null
        );
        assert_eq!(Quantity::Count(3).count(), Some(3));
        assert!(!Quantity::Unparsed("x".into()).is_parsed());
    }

    #[test]
    fn test_product_record_reads_type_column() {
        let raw = RawRecord::from_pairs([("sku", "HAT"), ("type", "digital")]);
        let product = ProductRecord::from_record(7, &raw);
        assert_eq!(product.row, 7);
        assert_eq!(product.product_type.as_deref(), Some("digital"));
        assert_eq!(product.price, None);
    }

    #[test]
    fn test_warning_display() {
        let warning = DataQualityWarning::new(2, "lineitem_quantity", Some("two"), "not a count");
        assert_eq!(warning.to_string(), "row 2: lineitem_quantity = 'two' (not a count)");
    }
}
