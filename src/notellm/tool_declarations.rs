//! Function-declaration exporters.
//!
//! Converts [`ToolMetadata`] into the declaration format a model-calling
//! protocol expects. The schema itself is plain JSON Schema; the only
//! protocol-specific logic is the key it travels under (`parameters` for
//! Gemini, `input_schema` for Anthropic). Both exporters are pure, total
//! transforms over the metadata; the callable never crosses this boundary.

use serde_json::{json, Map, Value};

use crate::notellm::tool_protocol::ToolMetadata;

/// Build the JSON-Schema object describing a tool's input, or `None` when
/// the tool takes no parameters.
pub fn input_schema(metadata: &ToolMetadata) -> Option<Value> {
    if metadata.parameters.is_empty() {
        return None;
    }

    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &metadata.parameters {
        let mut property = Map::new();
        property.insert(
            "type".to_string(),
            serde_json::to_value(&param.param_type).expect("parameter type serializes"),
        );
        if let Some(description) = &param.description {
            property.insert("description".to_string(), json!(description));
        }
        if let Some(values) = &param.enum_values {
            property.insert("enum".to_string(), json!(values));
        }
        properties.insert(param.name.clone(), Value::Object(property));

        if param.required {
            required.push(param.name.clone());
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), json!(required));
    }
    Some(Value::Object(schema))
}

/// Convert tool metadata to Gemini function declarations.
///
/// The schema travels under `parameters` and is omitted entirely for
/// parameterless tools (never emitted as null).
pub fn to_gemini_declarations(tools: &[ToolMetadata]) -> Vec<Value> {
    tools
        .iter()
        .map(|metadata| {
            let mut declaration = json!({
                "name": metadata.name,
                "description": metadata.description,
            });
            if let Some(schema) = input_schema(metadata) {
                declaration["parameters"] = schema;
            }
            declaration
        })
        .collect()
}

/// Convert tool metadata to Anthropic tool definitions.
///
/// Anthropic requires `input_schema` on every tool, so parameterless tools
/// get an empty object schema rather than an omitted (or null) field.
pub fn to_anthropic_declarations(tools: &[ToolMetadata]) -> Vec<Value> {
    tools
        .iter()
        .map(|metadata| {
            let schema = input_schema(metadata)
                .unwrap_or_else(|| json!({"type": "object", "properties": {}}));
            json!({
                "name": metadata.name,
                "description": metadata.description,
                "input_schema": schema,
            })
        })
        .collect()
}
