//! Core services for spacetime-mcp.
//!
//! This crate owns the HTTP relay to the remote database, the tolerant log
//! decoder, the publish subprocess runner, and the control plane that ties them
//! into one uniform `Result` surface for the MCP tools.

pub mod control;
pub mod parsers;
pub mod remote;
