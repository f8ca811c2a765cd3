use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use spacetime_core::control::PublishRequest;

use crate::{SpacetimeMcp, helpers};

/// Parameters for tools scoped to a single database.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DatabaseParams {
    /// Database name or identity; falls back to the configured default.
    pub database: Option<String>,
}

/// Parameters for listing databases owned by an identity.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListDatabasesParams {
    /// Hex-encoded owner identity.
    pub identity: String,
}

/// Parameters for registering a database name.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AddDatabaseNameParams {
    /// Database name or identity; falls back to the configured default.
    pub database: Option<String>,
    /// Name to register.
    pub name: String,
}

/// Parameters for publishing a module.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PublishModuleParams {
    /// Database name to publish to; falls back to the configured default.
    pub database: Option<String>,
    /// Path to the module project directory.
    pub project_path: String,
    /// Delete existing data before publishing.
    pub clear_data: Option<bool>,
}

#[tool_router(router = tool_router_admin, vis = "pub")]
impl SpacetimeMcp {
    #[tool(description = "Look up the identity a database name resolves to.")]
    async fn get_database_identity(
        &self,
        Parameters(params): Parameters<DatabaseParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = match self.database_for(params.database.as_deref()) {
            Ok(database) => self.control.database_identity(&database).await,
            Err(err) => Err(err),
        };
        helpers::value_result(result)
    }

    #[tool(description = "Permanently delete a database.")]
    async fn delete_database(
        &self,
        Parameters(params): Parameters<DatabaseParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = match self.database_for(params.database.as_deref()) {
            Ok(database) => self
                .control
                .delete_database(&database)
                .await
                .map(|_| format!("Database '{database}' deleted")),
            Err(err) => Err(err),
        };
        Ok(helpers::text_result(result))
    }

    #[tool(description = "List databases owned by an identity.")]
    async fn list_databases(
        &self,
        Parameters(params): Parameters<ListDatabasesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self.control.list_databases(&params.identity).await;
        helpers::value_result(result)
    }

    #[tool(description = "Register an additional name for a database.")]
    async fn add_database_name(
        &self,
        Parameters(params): Parameters<AddDatabaseNameParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = match self.database_for(params.database.as_deref()) {
            Ok(database) => self.control.add_database_name(&database, &params.name).await,
            Err(err) => Err(err),
        };
        helpers::value_result(result)
    }

    #[tool(description = "List the names registered for a database.")]
    async fn get_database_names(
        &self,
        Parameters(params): Parameters<DatabaseParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = match self.database_for(params.database.as_deref()) {
            Ok(database) => self.control.database_names(&database).await,
            Err(err) => Err(err),
        };
        helpers::value_result(result)
    }

    #[tool(description = "Build and publish a module from a project directory using the spacetime CLI.")]
    async fn publish_module(
        &self,
        Parameters(params): Parameters<PublishModuleParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = match self.database_for(params.database.as_deref()) {
            Ok(database) => {
                let request = PublishRequest {
                    database,
                    project_path: params.project_path,
                    clear_data: params.clear_data.unwrap_or(false),
                };
                self.control.publish_module(&request).await
            }
            Err(err) => Err(err),
        };
        Ok(helpers::text_result(result))
    }
}
