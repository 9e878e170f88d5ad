//! Minimal JSON-schema checks for tool arguments.
//!
//! Only what tool descriptors use is supported: a top-level `object` with
//! `required` keys and primitive `type` declarations on `properties`.

use company_core::{CompanyError, CompanyResult};
use serde_json::Value;

/// Validate `arguments` against a tool's `parameters_schema`.
pub fn validate_arguments(tool: &str, schema: &Value, arguments: &Value) -> CompanyResult<()> {
    let Some(args) = arguments.as_object() else {
        return Err(CompanyError::Validation(format!(
            "arguments for '{tool}' must be a JSON object"
        )));
    };

    if let Some(required) = schema["required"].as_array() {
        for key in required.iter().filter_map(Value::as_str) {
            if args.get(key).map_or(true, Value::is_null) {
                return Err(CompanyError::Validation(format!(
                    "'{tool}' is missing required argument '{key}'"
                )));
            }
        }
    }

    if let Some(properties) = schema["properties"].as_object() {
        for (key, spec) in properties {
            let (Some(value), Some(expected)) = (args.get(key), spec["type"].as_str()) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            if !matches_type(value, expected) {
                return Err(CompanyError::Validation(format!(
                    "'{tool}' argument '{key}' must be of type {expected}"
                )));
            }
        }
    }

    Ok(())
}

fn matches_type(value: &Value, expected: &str) -> bool {
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
