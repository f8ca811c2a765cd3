//! MCP server implementation for spacetime-mcp.
//!
//! This crate wires the control plane into rmcp tool handlers and exposes the
//! MCP-facing API surface for schema inspection, queries, and administration.

mod helpers;
mod tools;
pub mod server;

use std::sync::Arc;

use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, ServerCapabilities, ServerInfo};
use spacetime_core::control::{RelayError, RelayResult, SpacetimeControlPlane};

pub use tools::admin::{
    AddDatabaseNameParams,
    DatabaseParams,
    ListDatabasesParams,
    PublishModuleParams,
};
pub use tools::database::{CallReducerParams, ExecuteSqlParams, GetLogsParams};

/// Name of the parameter that selects the target database.
pub const DATABASE_PARAM: &str = "database";

const SERVER_INSTRUCTIONS: &str = r"spacetime-mcp exposes a SpacetimeDB server's schema, query, and administration surface.

Workflow:
1. Call `ping` to confirm the server is reachable.
2. Call `get_schema` to see tables (with column types) and reducers (with parameter types).
3. Query data with `execute_sql`; the query text is forwarded verbatim.
4. Invoke reducers with `call_reducer`, passing positional arguments as a JSON array.
5. Inspect module output with `get_logs`.

Administration:
- `get_database_info`, `get_database_identity`, `get_database_names`, `add_database_name`.
- `list_databases` lists databases owned by an identity.
- `delete_database` permanently removes a database.
- `publish_module` builds and publishes a module from a project directory.

Notes:
- `database` may be omitted when the server was started with a default database.
- Remote failures are returned as tool errors carrying the HTTP status and body.
- Use `help` for a summary of the available tools.";

/// Settings that shape the tool surface.
#[derive(Debug, Clone, Default)]
pub struct ToolConfig {
    pub default_database: Option<String>,
}

impl ToolConfig {
    #[must_use]
    pub fn new(default_database: Option<String>) -> Self {
        Self {
            default_database: default_database
                .map(|database| database.trim().to_string())
                .filter(|database| !database.is_empty()),
        }
    }
}

/// MCP server wrapper around the control plane and tool routers.
#[derive(Clone)]
pub struct SpacetimeMcp {
    tool_router: ToolRouter<Self>,
    control: Arc<SpacetimeControlPlane>,
    config: Arc<ToolConfig>,
}

impl SpacetimeMcp {
    /// Creates a new server using a control plane by value.
    #[must_use]
    pub fn new(control: SpacetimeControlPlane, config: ToolConfig) -> Self {
        Self::with_control(Arc::new(control), Arc::new(config))
    }

    /// Creates a new server using shared handles.
    #[must_use]
    pub fn with_control(control: Arc<SpacetimeControlPlane>, config: Arc<ToolConfig>) -> Self {
        let mut tool_router = Self::tool_router_core()
            + Self::tool_router_database()
            + Self::tool_router_admin()
            + Self::tool_router_context();
        if config.default_database.is_none() {
            for route in tool_router.map.values_mut() {
                let mut schema = route.attr.input_schema.as_ref().clone();
                if helpers::require_property(&mut schema, DATABASE_PARAM) {
                    route.attr.input_schema = Arc::new(schema);
                }
            }
        }
        Self {
            tool_router,
            control,
            config,
        }
    }

    /// Lists the registered tools with their input schemas.
    #[must_use]
    pub fn tools(&self) -> Vec<rmcp::model::Tool> {
        self.tool_router.list_all()
    }

    /// Resolves the target database from the request or the configured default.
    pub(crate) fn database_for(&self, requested: Option<&str>) -> RelayResult<String> {
        requested
            .map(str::trim)
            .filter(|database| !database.is_empty())
            .or(self.config.default_database.as_deref())
            .map(str::to_string)
            .ok_or(RelayError::MissingParameter(DATABASE_PARAM))
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl SpacetimeMcp {
    #[tool(description = "Check connectivity to the SpacetimeDB server.")]
    async fn ping(&self) -> Result<CallToolResult, ErrorData> {
        let host = self.control.host().to_string();
        let result = self
            .control
            .ping()
            .await
            .map(|_| format!("Successfully connected to SpacetimeDB at {host}"));
        Ok(helpers::text_result(result))
    }
}

#[tool_handler]
impl ServerHandler for SpacetimeMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use spacetime_core::control::PublishConfig;
    use spacetime_core::remote::{HttpRemote, RemoteConfig};

    use super::*;

    fn server(default_database: Option<&str>) -> SpacetimeMcp {
        let remote = HttpRemote::new(&RemoteConfig::new("http://localhost:3000"))
            .expect("remote should build");
        SpacetimeMcp::new(
            SpacetimeControlPlane::new(remote, PublishConfig::default()),
            ToolConfig::new(default_database.map(str::to_string)),
        )
    }

    #[test]
    fn explicit_database_wins_over_default() {
        let server = server(Some("fallback"));
        assert_eq!(server.database_for(Some("chat")).ok().as_deref(), Some("chat"));
        assert_eq!(server.database_for(Some("  ")).ok().as_deref(), Some("fallback"));
        assert_eq!(server.database_for(None).ok().as_deref(), Some("fallback"));
    }

    #[test]
    fn missing_database_without_default_is_rejected() {
        let err = server(None)
            .database_for(None)
            .expect_err("database should be required");
        assert!(matches!(err, RelayError::MissingParameter(DATABASE_PARAM)));
        assert_eq!(err.to_string(), "missing required parameter: database");
    }
}
