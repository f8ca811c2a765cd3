use serde_json::Value;
use spacetime_schema::format_schema;

use crate::parsers::format_logs;
use crate::remote::RemoteResponse;

use super::{RelayError, RelayResult, SpacetimeControlPlane, decode_body, relay, require};

/// Schema format version requested from the remote.
pub const SCHEMA_VERSION: &str = "9";

/// Log lines fetched when the caller does not ask for a count.
pub const DEFAULT_LOG_LINES: u32 = 100;

impl SpacetimeControlPlane {
    /// Fetches the raw schema payload of a database.
    ///
    /// # Errors
    /// Returns `RelayError` if the request fails or the remote answers non-200.
    pub async fn schema(&self, database: &str) -> RelayResult<Value> {
        let database = require(database, "database")?;
        let body = self
            .remote
            .get(
                &["v1", "database", database, "schema"],
                &[("version", SCHEMA_VERSION.to_string())],
            )
            .await
            .and_then(RemoteResponse::into_success);
        relay("schema", body).map(decode_body)
    }

    /// Fetches a database schema and renders it as the text report.
    ///
    /// # Errors
    /// Returns `RelayError` if the schema fetch fails; rendering itself never fails.
    pub async fn describe_schema(&self, database: &str) -> RelayResult<String> {
        let payload = self.schema(database).await?;
        Ok(format_schema(&payload))
    }

    /// Submits query text verbatim to the SQL endpoint.
    ///
    /// # Errors
    /// Returns `RelayError` if the query is blank, the request fails, or the
    /// remote rejects the query.
    pub async fn execute_sql(&self, database: &str, query: &str) -> RelayResult<Value> {
        let database = require(database, "database")?;
        require(query, "query")?;
        let body = self
            .remote
            .post_text(&["v1", "database", database, "sql"], query.to_string())
            .await
            .and_then(RemoteResponse::into_success);
        relay("sql", body).map(decode_body)
    }

    /// Invokes a reducer with positional JSON arguments.
    ///
    /// # Errors
    /// Returns `RelayError` if the request fails or the remote rejects the call.
    pub async fn call_reducer(
        &self,
        database: &str,
        reducer: &str,
        args: Vec<Value>,
    ) -> RelayResult<Value> {
        let database = require(database, "database")?;
        let reducer = require(reducer, "reducer")?;
        let body = self
            .remote
            .post_json(
                &["v1", "database", database, "call", reducer],
                &Value::Array(args),
            )
            .await
            .and_then(RemoteResponse::into_success);
        relay("call_reducer", body).map(decode_body)
    }

    /// Fetches recent module logs and renders them one entry per line.
    ///
    /// # Errors
    /// Returns `RelayError::NotFound` when the database does not exist, or any
    /// other `RelayError` if the request fails.
    pub async fn logs(&self, database: &str, num_lines: Option<u32>) -> RelayResult<String> {
        let database = require(database, "database")?;
        let num_lines = num_lines.unwrap_or(DEFAULT_LOG_LINES);
        let response = relay(
            "logs",
            self.remote
                .get(
                    &["v1", "database", database, "logs"],
                    &[("num_lines", num_lines.to_string())],
                )
                .await,
        )?;
        if response.is_not_found() {
            return relay("logs", Err(RelayError::NotFound(database.to_string())));
        }
        let body = relay("logs", response.into_success())?;
        Ok(format_logs(&body))
    }

    /// Fetches database metadata.
    ///
    /// # Errors
    /// Returns `RelayError` if the request fails or the remote answers non-200.
    pub async fn database_info(&self, database: &str) -> RelayResult<Value> {
        let database = require(database, "database")?;
        let body = self
            .remote
            .get(&["v1", "database", database], &[])
            .await
            .and_then(RemoteResponse::into_success);
        relay("database_info", body).map(decode_body)
    }

    /// Deletes a database.
    ///
    /// # Errors
    /// Returns `RelayError` if the request fails or the remote refuses the deletion.
    pub async fn delete_database(&self, database: &str) -> RelayResult<Value> {
        let database = require(database, "database")?;
        let body = self
            .remote
            .delete(&["v1", "database", database])
            .await
            .and_then(RemoteResponse::into_success);
        relay("delete_database", body).map(decode_body)
    }
}
