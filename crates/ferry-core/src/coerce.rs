//! # Coercion Module
//!
//! Turns raw source strings into typed values. This is the only
//! "validation" Ferry performs: nothing is rejected for its shape, values
//! are either coerced or flagged.
//!
//! ## Coercion Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input                     Function              Output                 │
//! │  ───────────────────────   ──────────────────    ──────────────────     │
//! │  "a@b.com"                 normalize_identity    "a_b_com"              │
//! │  "  12 pcs"                parse_int_prefix      Some(12)               │
//! │  "19.99 USD"               parse_float_prefix    Some(19.99)            │
//! │  "two"                     parse_quantity        Unparsed("two")        │
//! │  "California"              province_code         None                   │
//! │  ""                        optional_text         None                   │
//! │  "TRUE"                    parse_flag            false                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Numeric parsing is prefix-based: leading whitespace and a sign are
//! accepted, then digits are consumed until the first character that cannot
//! continue the number. Trailing text is ignored. Only base 10 is read.

use crate::types::Quantity;

// =============================================================================
// Identity
// =============================================================================

/// Builds an identity key from a customer email.
///
/// Every maximal run of characters outside `[A-Za-z0-9_]` collapses into a
/// single `_`.
///
/// ## Example
/// ```rust
/// use ferry_core::coerce::normalize_identity;
///
/// assert_eq!(normalize_identity("a@b.com"), "a_b_com");
/// assert_eq!(normalize_identity("jo.+x@@mail.io"), "jo_x_mail_io");
/// ```
pub fn normalize_identity(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut in_run = false;

    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            key.push(c);
            in_run = false;
        } else if !in_run {
            key.push('_');
            in_run = true;
        }
    }

    key
}

// =============================================================================
// Numbers
// =============================================================================

/// End index of the ASCII digit run beginning at `start`.
fn digits_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    end
}

fn sign_end(bytes: &[u8], start: usize) -> usize {
    match bytes.get(start) {
        Some(b'+') | Some(b'-') => start + 1,
        _ => start,
    }
}

/// Parses the leading integer of `s`.
///
/// Returns `None` when no digit follows the optional sign, or when the
/// value does not fit in an `i64`.
///
/// ## Example
/// ```rust
/// use ferry_core::coerce::parse_int_prefix;
///
/// assert_eq!(parse_int_prefix(" 42abc"), Some(42));
/// assert_eq!(parse_int_prefix("-3"), Some(-3));
/// assert_eq!(parse_int_prefix("3.9"), Some(3));
/// assert_eq!(parse_int_prefix("abc"), None);
/// ```
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();

    let digits_start = sign_end(bytes, 0);
    let end = digits_end(bytes, digits_start);
    if end == digits_start {
        return None;
    }

    s[..end].parse().ok()
}

/// Parses the leading decimal number of `s`.
///
/// Accepts a sign, digits, an optional fraction and an optional exponent.
/// A dangling `.` or `e` is left out of the number rather than failing it.
///
/// ## Example
/// ```rust
/// use ferry_core::coerce::parse_float_prefix;
///
/// assert_eq!(parse_float_prefix("19.99 USD"), Some(19.99));
/// assert_eq!(parse_float_prefix(".5"), Some(0.5));
/// assert_eq!(parse_float_prefix("1e3x"), Some(1000.0));
/// assert_eq!(parse_float_prefix("USD 5"), None);
/// ```
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();

    let int_start = sign_end(bytes, 0);
    let int_end = digits_end(bytes, int_start);
    let mut end = int_end;
    let mut mantissa_digits = int_end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_end(bytes, end + 1);
        let frac_digits = frac_end - (end + 1);
        if frac_digits > 0 || mantissa_digits > 0 {
            mantissa_digits += frac_digits;
            end = if frac_digits > 0 { frac_end } else { end };
        }
    }

    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let exp_digits_start = sign_end(bytes, end + 1);
        let exp_end = digits_end(bytes, exp_digits_start);
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Parses a line-item quantity.
///
/// A non-negative integer prefix that fits a `u32` becomes `Count`.
/// Anything else is kept verbatim as the `Unparsed` sentinel.
pub fn parse_quantity(raw: Option<&str>) -> Quantity {
    let text = raw.unwrap_or_default();
    match parse_int_prefix(text).and_then(|n| u32::try_from(n).ok()) {
        Some(count) => Quantity::Count(count),
        None => Quantity::Unparsed(text.to_string()),
    }
}

// =============================================================================
// Text
// =============================================================================

/// Keeps a state/province value only when it is exactly two characters.
///
/// ## Example
/// ```rust
/// use ferry_core::coerce::province_code;
///
/// assert_eq!(province_code(Some("CA")), Some("CA".to_string()));
/// assert_eq!(province_code(Some("California")), None);
/// assert_eq!(province_code(None), None);
/// ```
pub fn province_code(raw: Option<&str>) -> Option<String> {
    raw.filter(|value| value.chars().count() == 2)
        .map(str::to_string)
}

/// Treats an empty string like an absent one.
pub fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.filter(|value| !value.is_empty()).map(str::to_string)
}

/// Only the exact string `"true"` is true.
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw == Some("true")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identity() {
        assert_eq!(normalize_identity("a@b.com"), "a_b_com");
        assert_eq!(normalize_identity("first.last@shop.co.uk"), "first_last_shop_co_uk");
        assert_eq!(normalize_identity("--a--"), "_a_");
        assert_eq!(normalize_identity("keep__underscores"), "keep__underscores");
        assert_eq!(normalize_identity(""), "");
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("7"), Some(7));
        assert_eq!(parse_int_prefix("  +12 boxes"), Some(12));
        assert_eq!(parse_int_prefix("-0"), Some(0));
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("x1"), None);
        assert_eq!(parse_int_prefix("99999999999999999999"), None);
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("10"), Some(10.0));
        assert_eq!(parse_float_prefix("-2.50"), Some(-2.5));
        assert_eq!(parse_float_prefix("5."), Some(5.0));
        assert_eq!(parse_float_prefix("2e"), Some(2.0));
        assert_eq!(parse_float_prefix("2.5E-1"), Some(0.25));
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix(""), None);
        assert_eq!(parse_float_prefix("abc"), None);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(Some("2")), Quantity::Count(2));
        assert_eq!(parse_quantity(Some("3 units")), Quantity::Count(3));
        assert_eq!(parse_quantity(Some("two")), Quantity::Unparsed("two".into()));
        assert_eq!(parse_quantity(Some("-1")), Quantity::Unparsed("-1".into()));
        assert_eq!(parse_quantity(None), Quantity::Unparsed(String::new()));
    }

    #[test]
    fn test_province_code() {
        assert_eq!(province_code(Some("CA")), Some("CA".to_string()));
        assert_eq!(province_code(Some("California")), None);
        assert_eq!(province_code(Some("C")), None);
        assert_eq!(province_code(Some("")), None);
    }

    #[test]
    fn test_optional_text_and_flag() {
        assert_eq!(optional_text(Some("")), None);
        assert_eq!(optional_text(Some("Apt 4")), Some("Apt 4".to_string()));
        assert_eq!(optional_text(None), None);

        assert!(parse_flag(Some("true")));
        assert!(!parse_flag(Some("TRUE")));
        assert!(!parse_flag(Some("1")));
        assert!(!parse_flag(None));
    }
}
