//! JSON-schema argument validation.
//!
//! Tool input schemas are plain `serde_json` values in the standard
//! JSON-Schema object form. Validation runs before any REST request is
//! built, and collects every offending field so a caller can repair a bad
//! invocation in one round trip.

use serde_json::{Map, Value};
use tbmcp_core::{Error, Result};

/// Validate `args` against an object schema.
///
/// Checks required fields, property types, enum membership, and (when the
/// schema sets `additionalProperties: false`) unexpected fields. `null`
/// arguments are treated as an empty object.
pub fn validate(schema: &Value, args: &Value) -> Result<()> {
    let empty = Map::new();
    let object = match args {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(Error::Validation(format!(
                "arguments must be an object, got {}",
                type_name(other)
            )));
        }
    };

    let mut problems = Vec::new();

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(name) {
                problems.push(format!("missing required field `{}`", name));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let additional_allowed = schema
        .get("additionalProperties")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    for (name, value) in object {
        match properties.and_then(|p| p.get(name)) {
            Some(property) => {
                if let Some(expected) = property.get("type").and_then(Value::as_str) {
                    if !type_matches(expected, value) {
                        problems.push(format!(
                            "field `{}` should be {}, got {}",
                            name,
                            expected,
                            type_name(value)
                        ));
                        continue;
                    }
                }
                if let Some(allowed) = property.get("enum").and_then(Value::as_array) {
                    if !allowed.contains(value) {
                        problems.push(format!(
                            "field `{}` must be one of {}",
                            name,
                            render_values(allowed)
                        ));
                    }
                }
            }
            None if !additional_allowed => {
                problems.push(format!("unexpected field `{}`", name));
            }
            None => {}
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(problems.join("; ")))
    }
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn render_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn device_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "type": { "type": "string" },
                "page": { "type": "integer" },
                "direction": { "type": "string", "enum": ["FROM", "TO"] },
                "additional_info": { "type": "object" }
            },
            "required": ["name", "type"],
            "additionalProperties": false
        })
    }

    #[test]
    fn test_valid_arguments() {
        let args = json!({ "name": "thermostat", "type": "sensor", "page": 0 });
        assert!(validate(&device_schema(), &args).is_ok());
    }

    #[test]
    fn test_all_missing_fields_reported_at_once() {
        let err = validate(&device_schema(), &json!({})).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("missing required field `name`"));
        assert!(text.contains("missing required field `type`"));
    }

    #[test]
    fn test_type_mismatch() {
        let args = json!({ "name": "t", "type": "sensor", "page": "zero" });
        let err = validate(&device_schema(), &args).unwrap_err();
        assert!(err.to_string().contains("field `page` should be integer"));
    }

    #[test]
    fn test_enum_violation() {
        let args = json!({ "name": "t", "type": "s", "direction": "SIDEWAYS" });
        let err = validate(&device_schema(), &args).unwrap_err();
        assert!(err.to_string().contains("must be one of"));
    }

    #[test]
    fn test_unexpected_field() {
        let args = json!({ "name": "t", "type": "s", "bogus": 1 });
        let err = validate(&device_schema(), &args).unwrap_err();
        assert!(err.to_string().contains("unexpected field `bogus`"));
    }

    #[test]
    fn test_null_args_only_fail_on_required() {
        let schema = json!({
            "type": "object",
            "properties": { "page": { "type": "integer" } },
            "additionalProperties": false
        });
        assert!(validate(&schema, &Value::Null).is_ok());
        assert!(validate(&device_schema(), &Value::Null).is_err());
    }

    #[test]
    fn test_non_object_args_rejected() {
        let err = validate(&device_schema(), &json!("a string")).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }

    #[test]
    fn test_mixed_problems_all_reported() {
        let args = json!({ "type": 7, "bogus": true });
        let err = validate(&device_schema(), &args).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("missing required field `name`"));
        assert!(text.contains("field `type` should be string"));
        assert!(text.contains("unexpected field `bogus`"));
    }
}
