use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::admin::DatabaseParams;
use crate::{SpacetimeMcp, helpers};

/// Parameters for running a SQL query.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ExecuteSqlParams {
    /// Database name or identity; falls back to the configured default.
    pub database: Option<String>,
    /// Query text, forwarded verbatim.
    pub query: String,
}

/// Parameters for invoking a reducer.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CallReducerParams {
    /// Database name or identity; falls back to the configured default.
    pub database: Option<String>,
    pub reducer: String,
    /// Positional reducer arguments.
    #[serde(default)]
    pub args: Vec<Value>,
}

/// Parameters for fetching module logs.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetLogsParams {
    /// Database name or identity; falls back to the configured default.
    pub database: Option<String>,
    /// Number of recent lines to fetch (default 100).
    pub num_lines: Option<u32>,
}

#[tool_router(router = tool_router_database, vis = "pub")]
impl SpacetimeMcp {
    #[tool(description = "Get the database schema: tables with column types and reducers with parameter types.")]
    async fn get_schema(
        &self,
        Parameters(params): Parameters<DatabaseParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = match self.database_for(params.database.as_deref()) {
            Ok(database) => self.control.describe_schema(&database).await,
            Err(err) => Err(err),
        };
        Ok(helpers::text_result(result))
    }

    #[tool(description = "Execute a SQL query against the database. The query is forwarded verbatim.")]
    async fn execute_sql(
        &self,
        Parameters(params): Parameters<ExecuteSqlParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = match self.database_for(params.database.as_deref()) {
            Ok(database) => self.control.execute_sql(&database, &params.query).await,
            Err(err) => Err(err),
        };
        helpers::value_result(result)
    }

    #[tool(description = "Call a reducer with positional JSON arguments.")]
    async fn call_reducer(
        &self,
        Parameters(params): Parameters<CallReducerParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let CallReducerParams {
            database,
            reducer,
            args,
        } = params;
        let result = match self.database_for(database.as_deref()) {
            Ok(database) => self.control.call_reducer(&database, &reducer, args).await,
            Err(err) => Err(err),
        };
        let result = match result {
            Ok(value) => {
                let body = helpers::render_value(&value)?;
                let summary = format!("Reducer '{}' called successfully", reducer.trim());
                if body.trim().is_empty() {
                    Ok(summary)
                } else {
                    Ok(format!("{summary}\n{body}"))
                }
            }
            Err(err) => Err(err),
        };
        Ok(helpers::text_result(result))
    }

    #[tool(description = "Fetch recent module logs.")]
    async fn get_logs(
        &self,
        Parameters(params): Parameters<GetLogsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = match self.database_for(params.database.as_deref()) {
            Ok(database) => self.control.logs(&database, params.num_lines).await,
            Err(err) => Err(err),
        };
        Ok(helpers::text_result(result))
    }

    #[tool(description = "Get database metadata.")]
    async fn get_database_info(
        &self,
        Parameters(params): Parameters<DatabaseParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = match self.database_for(params.database.as_deref()) {
            Ok(database) => self.control.database_info(&database).await,
            Err(err) => Err(err),
        };
        helpers::value_result(result)
    }
}
