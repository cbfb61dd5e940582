//! JSON to document value coercion.
//!
//! Precedence, first match wins:
//! 1. `null` → `Null`
//! 2. boolean → `Bool`
//! 3. number without a fractional part that fits `i64` → `Int` (`3.0` → `3`)
//! 4. integer literal above `i64::MAX` → `UInt`
//! 5. any other number → `Float`
//! 6. array → `Sequence`, object → `Mapping` (recursively, order kept)
//! 7. string → `String`

use serde_json::{Number, Value as JsonValue};

use crate::document::ConfigValue;

/// Convert a JSON value into its document form.
pub fn coerce(value: JsonValue) -> ConfigValue {
    match value {
        JsonValue::Null => ConfigValue::Null,
        JsonValue::Bool(b) => ConfigValue::Bool(b),
        JsonValue::Number(n) => coerce_number(&n),
        JsonValue::Array(items) => ConfigValue::Sequence(items.into_iter().map(coerce).collect()),
        JsonValue::Object(members) => ConfigValue::Mapping(
            members
                .into_iter()
                .map(|(key, value)| (key, coerce(value)))
                .collect(),
        ),
        JsonValue::String(s) => ConfigValue::String(s),
    }
}

fn coerce_number(n: &Number) -> ConfigValue {
    if let Some(i) = n.as_i64() {
        return ConfigValue::Int(i);
    }
    if let Some(u) = n.as_u64() {
        return ConfigValue::UInt(u);
    }
    match n.as_f64() {
        // 2^63 itself does not fit, hence the exclusive upper bound.
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            ConfigValue::Int(f as i64)
        }
        Some(f) => ConfigValue::Float(f),
        None => ConfigValue::String(n.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_booleans_stay_booleans() {
        assert_eq!(coerce(json!(true)), ConfigValue::Bool(true));
        assert_eq!(coerce(json!(false)), ConfigValue::Bool(false));
        assert_eq!(coerce(json!("true")), ConfigValue::String("true".into()));
    }

    #[test]
    fn test_whole_numbers_become_integers() {
        assert_eq!(coerce(json!(42)), ConfigValue::Int(42));
        assert_eq!(coerce(json!(-7)), ConfigValue::Int(-7));
        assert_eq!(coerce(json!(3.0)), ConfigValue::Int(3));
        assert_eq!(coerce(json!(1.5)), ConfigValue::Float(1.5));
    }

    #[test]
    fn test_unsigned_overflow_keeps_integer() {
        assert_eq!(coerce(json!(u64::MAX)), ConfigValue::UInt(u64::MAX));
        match coerce(json!(1e20)) {
            ConfigValue::Float(f) => assert!(f > i64::MAX as f64),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_structures_keep_order() {
        let value = coerce(json!({"zeta": [1, "two"], "alpha": {"on": true}, "none": null}));
        let map = value.as_mapping().unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "none"]);
        assert_eq!(
            map["zeta"],
            ConfigValue::Sequence(vec![ConfigValue::Int(1), ConfigValue::String("two".into())])
        );
        assert_eq!(map["none"], ConfigValue::Null);
    }
}
