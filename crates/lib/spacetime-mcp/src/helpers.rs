use std::borrow::Cow;

use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content, ErrorCode, JsonObject};
use serde_json::Value;
use spacetime_core::control::RelayResult;

pub(crate) fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Converts a relayed text result into a tool result.
pub(crate) fn text_result(result: RelayResult<String>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(err) => CallToolResult::error(vec![Content::text(format!("Error: {err}"))]),
    }
}

/// Converts a relayed JSON result into a tool result.
pub(crate) fn value_result(result: RelayResult<Value>) -> Result<CallToolResult, ErrorData> {
    let rendered = match result {
        Ok(value) => Ok(render_value(&value)?),
        Err(err) => Err(err),
    };
    Ok(text_result(rendered))
}

/// Renders strings verbatim and anything else as pretty JSON.
pub(crate) fn render_value(value: &Value) -> Result<String, ErrorData> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => serde_json::to_string_pretty(other).map_err(|err| {
            mcp_err(
                ErrorCode::INTERNAL_ERROR,
                format!("failed to render response: {err}"),
            )
        }),
    }
}

/// Adds `name` to the schema's `required` list when it is a declared property.
///
/// Returns whether the schema declares the property.
pub(crate) fn require_property(schema: &mut JsonObject, name: &str) -> bool {
    let declared = schema
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|properties| properties.contains_key(name));
    if !declared {
        return false;
    }
    let required = schema
        .entry("required")
        .or_insert_with(|| Value::Array(Vec::new()));
    match required {
        Value::Array(entries) => {
            if !entries.iter().any(|entry| entry.as_str() == Some(name)) {
                entries.push(Value::String(name.to_string()));
            }
        }
        other => *other = Value::Array(vec![Value::String(name.to_string())]),
    }
    true
}
