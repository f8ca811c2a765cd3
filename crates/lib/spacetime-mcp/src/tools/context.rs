use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::SpacetimeMcp;

/// Payload listing the MCP commands this server exposes.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HelpCommands {
    pub commands: Vec<String>,
}

impl Default for HelpCommands {
    fn default() -> Self {
        Self {
            commands: vec![
                "help - List the MCP commands this server exposes.".to_string(),
                "ping - Check connectivity to the SpacetimeDB server.".to_string(),
                "get_schema - Show tables with column types and reducers with parameter types."
                    .to_string(),
                "execute_sql - Run a SQL query; the query text is forwarded verbatim.".to_string(),
                "call_reducer - Invoke a reducer with positional JSON arguments.".to_string(),
                "get_logs - Fetch recent module logs (default 100 lines).".to_string(),
                "get_database_info - Fetch database metadata.".to_string(),
                "get_database_identity - Look up the identity a database name resolves to."
                    .to_string(),
                "get_database_names - List the names registered for a database.".to_string(),
                "add_database_name - Register an additional name for a database.".to_string(),
                "list_databases - List databases owned by an identity.".to_string(),
                "delete_database - Permanently delete a database.".to_string(),
                "publish_module - Build and publish a module from a project directory."
                    .to_string(),
            ],
        }
    }
}

#[tool_router(router = tool_router_context, vis = "pub")]
impl SpacetimeMcp {
    #[tool(description = "List the MCP commands this server exposes.")]
    async fn help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::json(HelpCommands::default())?]))
    }
}

#[cfg(test)]
mod tests {
    use super::HelpCommands;

    #[test]
    fn help_lists_every_command_once() {
        let commands = HelpCommands::default().commands;
        let mut names: Vec<&str> = commands
            .iter()
            .filter_map(|command| command.split(" - ").next())
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert!(names.contains(&"publish_module"));
    }
}
