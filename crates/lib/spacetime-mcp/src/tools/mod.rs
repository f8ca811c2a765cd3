//! MCP tool modules.
//!
//! Tools are grouped by domain: database access (schema, SQL, reducers, logs),
//! administration (identity, names, deletion, publishing), and contextual help.

pub mod admin;
pub mod database;
mod context;
