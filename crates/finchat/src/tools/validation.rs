//! Argument validation against a function's JSON schema
//!
//! Covers the subset of JSON Schema the registered functions declare:
//! `type: object`, `required`, per-property `type` (`string`, `integer`,
//! `number`, `boolean`) and numeric `minimum`.

use crate::error::{ChatError, Result};
use serde_json::{Map, Value};

/// Check `args` against `schema`, reporting the first violation
pub fn validate_arguments(function: &str, schema: &Value, args: &Value) -> Result<()> {
    let Some(object) = args.as_object() else {
        return Err(ChatError::malformed(function, "arguments must be a JSON object"));
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(field) {
                return Err(ChatError::malformed(
                    function,
                    format!("missing required field '{field}'"),
                ));
            }
        }
    }

    let empty = Map::new();
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    for (field, value) in object {
        // Undeclared fields are ignored
        let Some(property) = properties.get(field) else {
            continue;
        };
        check_property(function, field, property, value)?;
    }

    Ok(())
}

fn check_property(function: &str, field: &str, property: &Value, value: &Value) -> Result<()> {
    if let Some(expected) = property.get("type").and_then(Value::as_str) {
        let matches = match expected {
            "string" => value.is_string(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            _ => true,
        };
        if !matches {
            return Err(ChatError::malformed(
                function,
                format!("field '{field}' must be of type {expected}, got {value}"),
            ));
        }
    }

    if let (Some(minimum), Some(actual)) = (
        property.get("minimum").and_then(Value::as_f64),
        value.as_f64(),
    ) {
        if actual < minimum {
            return Err(ChatError::malformed(
                function,
                format!("field '{field}' must be at least {minimum}, got {value}"),
            ));
        }
    }

    Ok(())
}
