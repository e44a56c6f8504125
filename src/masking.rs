//! Log masking for sensitive values
//!
//! Produces redacted copies of arbitrary JSON-like values that are safe
//! for log output: no plaintext financial number and no full personal
//! identifier ever appears in the result. Masking is total: any
//! well-formed JSON value masks without error.

use serde_json::{Map, Value};

use crate::classify::{classify, SensitivityTier};

/// Maximum recursion depth before masking gives up on a structure
pub const MAX_MASK_DEPTH: usize = 10;

/// Sentinel for masked numeric values
pub const FINANCIAL_MASK: &str = "[FINANCIAL_VALUE]";

/// Sentinel for masked personal data without a partial-reveal rule
pub const PERSONAL_MASK: &str = "[PERSONAL_DATA]";

/// Sentinel for strings that look like ciphertext envelopes
pub const ENCRYPTED_MASK: &str = "[ENCRYPTED]";

/// Sentinel emitted when the depth bound is hit
pub const DEPTH_MASK: &str = "[MAX_DEPTH]";

/// Minimum length for a string to be considered a ciphertext envelope
const ENVELOPE_MIN_LEN: usize = 32;

/// Mask a value for log output.
///
/// Numbers are always replaced with [`FINANCIAL_MASK`] regardless of
/// classification: treating every number as potentially financial is
/// cheaper than a false negative. Object fields dispatch on their
/// sensitivity tier; behavioral fields recurse so that nested scalars are
/// still subject to the numeric and string rules.
pub fn mask_value(value: &Value) -> Value {
    mask_at_depth(value, 0)
}

fn mask_at_depth(value: &Value, depth: usize) -> Value {
    if depth > MAX_MASK_DEPTH {
        return Value::String(DEPTH_MASK.to_string());
    }

    match value {
        Value::Number(_) => Value::String(FINANCIAL_MASK.to_string()),
        Value::String(s) => {
            if looks_like_envelope(s) {
                Value::String(ENCRYPTED_MASK.to_string())
            } else {
                value.clone()
            }
        }
        Value::Array(items) => Value::Array(
            items.iter().map(|item| mask_at_depth(item, depth + 1)).collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (field, field_value) in map {
                out.insert(field.clone(), mask_field(field, field_value, depth));
            }
            Value::Object(out)
        }
        // Booleans and nulls carry no sensitive content
        _ => value.clone(),
    }
}

fn mask_field(field: &str, value: &Value, depth: usize) -> Value {
    match classify(field) {
        SensitivityTier::Financial => Value::String(FINANCIAL_MASK.to_string()),
        SensitivityTier::Personal => mask_personal(field, value),
        SensitivityTier::Behavioral => mask_at_depth(value, depth + 1),
    }
}

/// Partial-reveal masking for personal fields.
///
/// Emails keep their first two characters and the domain; user
/// identifiers keep their first eight characters. Everything else
/// becomes the generic personal sentinel.
fn mask_personal(field: &str, value: &Value) -> Value {
    let Some(s) = value.as_str() else {
        return Value::String(PERSONAL_MASK.to_string());
    };

    let normalized: String = field
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let masked = match normalized.as_str() {
        "email" | "emailaddress" => mask_email(s),
        "userid" | "uid" => mask_identifier(s),
        _ => PERSONAL_MASK.to_string(),
    };
    Value::String(masked)
}

fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let prefix: String = local.chars().take(2).collect();
            format!("{}***@{}", prefix, domain)
        }
        None => PERSONAL_MASK.to_string(),
    }
}

fn mask_identifier(id: &str) -> String {
    let prefix: String = id.chars().take(8).collect();
    format!("{}***", prefix)
}

/// Heuristic: long strings made only of base64 alphabet characters are
/// assumed to be ciphertext envelopes.
fn looks_like_envelope(s: &str) -> bool {
    s.len() >= ENVELOPE_MIN_LEN
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
}

fn mask_all(values: &[&Value]) -> Value {
    Value::Array(values.iter().map(|v| mask_value(v)).collect())
}

/// Log at info level with every payload value masked.
///
/// The message itself is not masked: it is a static string controlled by
/// the developer, not user data.
pub fn safe_info(message: &str, values: &[&Value]) {
    tracing::info!(payload = %mask_all(values), "{}", message);
}

/// Log at warn level with every payload value masked.
pub fn safe_warn(message: &str, values: &[&Value]) {
    tracing::warn!(payload = %mask_all(values), "{}", message);
}

/// Log at error level with every payload value masked.
pub fn safe_error(message: &str, values: &[&Value]) {
    tracing::error!(payload = %mask_all(values), "{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_always_masked() {
        assert_eq!(mask_value(&json!(5000)), json!(FINANCIAL_MASK));
        assert_eq!(mask_value(&json!(-0.5)), json!(FINANCIAL_MASK));
        let masked = mask_value(&json!({"anything": {"nested": 42}}));
        assert_eq!(masked["anything"]["nested"], json!(FINANCIAL_MASK));
    }

    #[test]
    fn test_financial_fields_masked() {
        let masked = mask_value(&json!({"monthly_income": "pending"}));
        assert_eq!(masked["monthly_income"], json!(FINANCIAL_MASK));
    }

    #[test]
    fn test_email_partial_reveal() {
        let masked = mask_value(&json!({"email": "kaylee@example.com"}));
        assert_eq!(masked["email"], json!("ka***@example.com"));
    }

    #[test]
    fn test_email_without_at_fully_masked() {
        let masked = mask_value(&json!({"email": "not-an-email"}));
        assert_eq!(masked["email"], json!(PERSONAL_MASK));
    }

    #[test]
    fn test_user_id_partial_reveal() {
        let masked = mask_value(&json!({"user_id": "a1b2c3d4e5f6"}));
        assert_eq!(masked["user_id"], json!("a1b2c3d4***"));
    }

    #[test]
    fn test_other_personal_fields_fully_masked() {
        let masked = mask_value(&json!({"display_name": "Kaylee B"}));
        assert_eq!(masked["display_name"], json!(PERSONAL_MASK));
    }

    #[test]
    fn test_envelope_strings_masked() {
        let envelope = "A".repeat(48);
        assert_eq!(mask_value(&json!(envelope)), json!(ENCRYPTED_MASK));
        // Short or non-base64 strings pass through
        assert_eq!(mask_value(&json!("hello")), json!("hello"));
        let sentence = "this sentence has spaces and is long enough to check";
        assert_eq!(mask_value(&json!(sentence)), json!(sentence));
    }

    #[test]
    fn test_depth_bound() {
        // Build a structure deeper than the bound
        let mut value = json!(1);
        for _ in 0..(MAX_MASK_DEPTH + 5) {
            value = json!([value]);
        }
        let masked = mask_value(&value);
        // Must terminate, and the first level past the bound is the sentinel
        let mut cursor = &masked;
        for _ in 0..=MAX_MASK_DEPTH {
            cursor = &cursor[0];
        }
        assert_eq!(cursor, &json!(DEPTH_MASK));
    }

    #[test]
    fn test_behavioral_recursion_keeps_structure() {
        let masked = mask_value(&json!({
            "preferences": {"theme": "dark", "email": "ab@c.d"},
            "tags": ["a", "b"]
        }));
        assert_eq!(masked["preferences"]["theme"], json!("dark"));
        assert_eq!(masked["preferences"]["email"], json!("ab***@c.d"));
        assert_eq!(masked["tags"], json!(["a", "b"]));
    }

    #[test]
    fn test_no_plaintext_number_survives() {
        let input = json!({
            "monthly_income": 5000.25,
            "notes": {"amounts": [1.5, 2.5]},
            "count": 7
        });
        let masked = serde_json::to_string(&mask_value(&input)).unwrap();
        assert!(!masked.contains("5000.25"));
        assert!(!masked.contains("1.5"));
        assert!(!masked.contains("2.5"));
        assert!(!masked.contains('7'));
    }

    #[test]
    fn test_totality_over_scalars() {
        for value in [json!(null), json!(true), json!(false), json!(""), json!([])] {
            // Must not panic, booleans and nulls pass through
            let _ = mask_value(&value);
        }
        assert_eq!(mask_value(&json!(null)), json!(null));
        assert_eq!(mask_value(&json!(true)), json!(true));
    }
}
