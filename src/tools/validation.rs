//! Argument checks run against a tool's JSON Schema before it is invoked.
//!
//! Only the top level is checked: object shape, required fields, and the
//! declared type of each known property.

use serde_json::Value;

/// Validate tool arguments against a JSON Schema.
///
/// Returns `Err(message)` describing the first violation found.
pub fn validate_arguments(args: &Value, schema: &Value) -> Result<(), String> {
    if schema.get("type").and_then(Value::as_str) == Some("object") && !args.is_object() {
        return Err(format!(
            "expected object arguments, got {}",
            json_type_name(args)
        ));
    }

    let Some(obj) = args.as_object() else {
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        if let Some(name) = required
            .iter()
            .filter_map(Value::as_str)
            .find(|name| !obj.contains_key(*name))
        {
            return Err(format!("missing required argument '{}'", name));
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, value) in obj {
            let expected = properties
                .get(key)
                .and_then(|prop| prop.get("type"))
                .and_then(Value::as_str);

            if let Some(expected) = expected {
                if !value_matches_type(value, expected) {
                    return Err(format!(
                        "argument '{}' should be {}, got {}",
                        key,
                        expected,
                        json_type_name(value)
                    ));
                }
            }
        }
    }

    Ok(())
}

/// Check that a schema can describe an arguments object
pub fn check_schema(schema: &Value) -> Result<(), String> {
    match schema.get("type").and_then(Value::as_str) {
        Some("object") => Ok(()),
        Some(other) => Err(format!("parameters must be an object schema, got '{}'", other)),
        None => Err("parameters schema has no 'type'".to_string()),
    }
}

fn value_matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn city_schema() -> Value {
        json!({
            "type": "object",
            "properties": { "city": { "type": "string" } },
            "required": ["city"]
        })
    }

    #[test]
    fn rejects_missing_required_argument() {
        let err = validate_arguments(&json!({}), &city_schema()).unwrap_err();
        assert_eq!(err, "missing required argument 'city'");
    }

    #[test]
    fn rejects_wrong_property_type() {
        let err = validate_arguments(&json!({"city": 42}), &city_schema()).unwrap_err();
        assert!(err.contains("should be string"));
    }

    #[test]
    fn rejects_non_object_arguments() {
        let err = validate_arguments(&json!([1]), &city_schema()).unwrap_err();
        assert!(err.contains("expected object"));
    }

    #[test]
    fn accepts_extra_properties() {
        assert!(validate_arguments(&json!({"city": "Tokyo", "unit": "C"}), &city_schema()).is_ok());
    }

    #[test]
    fn schema_must_describe_an_object() {
        assert!(check_schema(&city_schema()).is_ok());
        assert!(check_schema(&json!({"type": "string"})).is_err());
        assert!(check_schema(&json!({})).is_err());
    }
}
