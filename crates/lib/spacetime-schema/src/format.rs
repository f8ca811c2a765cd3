//! Schema formatter.
//!
//! Resolves every table column and reducer parameter and renders the
//! deterministic text report returned by the schema tool.

use serde_json::Value;

use crate::models::{AlgebraicType, NamedField, RawSchema, SchemaDecodeError};
use crate::resolve::resolve_type;

/// Returned when the payload lacks `tables`, `reducers` or `typespace`.
pub const INVALID_SCHEMA: &str = "Invalid or empty schema";

const UNNAMED: &str = "(unnamed)";
const RULE_WIDTH: usize = 50;

/// A column or parameter with its resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTable {
    pub name: String,
    pub fields: Vec<ResolvedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReducer {
    pub name: String,
    pub lifecycle: Option<String>,
    pub params: Vec<ResolvedField>,
}

/// Tables and reducers with every type resolved to its display string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedSchema {
    pub tables: Vec<ResolvedTable>,
    pub reducers: Vec<ResolvedReducer>,
}

/// Formats a raw schema payload into the text report.
///
/// Never fails: a payload with the wrong top-level shape yields
/// [`INVALID_SCHEMA`], and one that cannot be decoded yields an error block
/// carrying the raw payload.
#[must_use]
pub fn format_schema(payload: &Value) -> String {
    if !has_schema_shape(payload) {
        return INVALID_SCHEMA.to_string();
    }
    match RawSchema::from_value(payload) {
        Ok(schema) => render_schema(&resolve_schema(&schema)),
        Err(err) => render_failure(&err, payload),
    }
}

/// Checks for array-valued `tables`/`reducers` and an object-valued `typespace`.
#[must_use]
pub fn has_schema_shape(payload: &Value) -> bool {
    payload.get("tables").is_some_and(Value::is_array)
        && payload.get("reducers").is_some_and(Value::is_array)
        && payload.get("typespace").is_some_and(Value::is_object)
}

/// Resolves tables and reducers, skipping tables whose row type is missing or
/// cannot be found.
#[must_use]
pub fn resolve_schema(schema: &RawSchema) -> ResolvedSchema {
    let tables = schema
        .tables
        .iter()
        .filter_map(|table| {
            let fields = table_fields(schema, table.product_type_ref)?;
            Some(ResolvedTable {
                name: table.name.clone(),
                fields: resolve_fields(schema, fields),
            })
        })
        .collect();

    let reducers = schema
        .reducers
        .iter()
        .map(|reducer| ResolvedReducer {
            name: reducer.name.clone(),
            lifecycle: reducer
                .lifecycle
                .as_ref()
                .map(|lifecycle| lifecycle.as_str().to_string()),
            params: resolve_fields(schema, &reducer.params),
        })
        .collect();

    ResolvedSchema { tables, reducers }
}

/// Renders a resolved schema.
#[must_use]
pub fn render_schema(resolved: &ResolvedSchema) -> String {
    let mut lines = vec![
        "Database Schema".to_string(),
        "=".repeat(RULE_WIDTH),
        String::new(),
        format!("TABLES ({}):", resolved.tables.len()),
    ];

    if resolved.tables.is_empty() {
        lines.push("  (none)".to_string());
    }
    for table in &resolved.tables {
        lines.push(String::new());
        lines.push(format!("• {}", table.name));
        push_fields(&mut lines, &table.fields);
    }

    lines.push(String::new());
    lines.push(format!("REDUCERS ({}):", resolved.reducers.len()));

    if resolved.reducers.is_empty() {
        lines.push("  (none)".to_string());
    }
    for reducer in &resolved.reducers {
        lines.push(String::new());
        match &reducer.lifecycle {
            Some(lifecycle) => lines.push(format!("• {} [{lifecycle}]", reducer.name)),
            None => lines.push(format!("• {}", reducer.name)),
        }
        if reducer.params.is_empty() {
            lines.push("    (no parameters)".to_string());
        }
        push_fields(&mut lines, &reducer.params);
    }

    lines.join("\n")
}

fn table_fields(schema: &RawSchema, product_type_ref: Option<u64>) -> Option<&[NamedField]> {
    let def = schema.types.get(usize::try_from(product_type_ref?).ok()?)?;
    let body = schema
        .typespace
        .types
        .get(usize::try_from(def.typespace_index?).ok()?)?;
    match body {
        AlgebraicType::Product(fields) => Some(fields),
        _ => None,
    }
}

fn resolve_fields(schema: &RawSchema, fields: &[NamedField]) -> Vec<ResolvedField> {
    fields
        .iter()
        .map(|field| ResolvedField {
            name: field.name.clone().unwrap_or_else(|| UNNAMED.to_string()),
            ty: resolve_type(schema, &field.algebraic_type),
        })
        .collect()
}

fn push_fields(lines: &mut Vec<String>, fields: &[ResolvedField]) {
    lines.extend(
        fields
            .iter()
            .map(|field| format!("    {}: {}", field.name, field.ty)),
    );
}

fn render_failure(err: &SchemaDecodeError, payload: &Value) -> String {
    let raw = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    format!("Error formatting schema: {err}\n\nRaw schema:\n{raw}")
}
