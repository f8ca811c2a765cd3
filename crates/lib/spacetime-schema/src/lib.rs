//! Schema decoding for spacetime-mcp.
//!
//! This crate owns the wire model of the module schema payload, the type
//! resolver that renders algebraic types as display strings, and the schema
//! formatter that produces the text report served by the schema tool.

pub mod format;
pub mod models;
pub mod resolve;

pub use format::{
    INVALID_SCHEMA,
    ResolvedField,
    ResolvedReducer,
    ResolvedSchema,
    ResolvedTable,
    format_schema,
    render_schema,
    resolve_schema,
};
pub use models::*;
pub use resolve::{IDENTITY_SENTINEL, MAX_TYPE_DEPTH, resolve_type, resolve_with_types};
