use serde_json::Value;

use crate::remote::RemoteResponse;

use super::{RelayResult, SpacetimeControlPlane, decode_body, relay, require};

impl SpacetimeControlPlane {
    /// Looks up the identity a database name resolves to.
    ///
    /// # Errors
    /// Returns `RelayError` if the request fails or the remote answers non-200.
    pub async fn database_identity(&self, database: &str) -> RelayResult<Value> {
        let database = require(database, "database")?;
        let body = self
            .remote
            .get(&["v1", "database", database, "identity"], &[])
            .await
            .and_then(RemoteResponse::into_success);
        relay("database_identity", body).map(decode_body)
    }

    /// Lists the databases owned by an identity.
    ///
    /// # Errors
    /// Returns `RelayError` if the identity is blank or the request fails.
    pub async fn list_databases(&self, identity: &str) -> RelayResult<Value> {
        let identity = require(identity, "identity")?;
        let body = self
            .remote
            .get(&["v1", "identity", identity, "databases"], &[])
            .await
            .and_then(RemoteResponse::into_success);
        relay("list_databases", body).map(decode_body)
    }

    /// Registers an additional name for a database.
    ///
    /// # Errors
    /// Returns `RelayError` if the name is blank or the remote refuses it.
    pub async fn add_database_name(&self, database: &str, name: &str) -> RelayResult<Value> {
        let database = require(database, "database")?;
        let name = require(name, "name")?;
        let body = self
            .remote
            .post_text(&["v1", "database", database, "names"], name.to_string())
            .await
            .and_then(RemoteResponse::into_success);
        relay("add_database_name", body).map(decode_body)
    }

    /// Lists the names registered for a database.
    ///
    /// # Errors
    /// Returns `RelayError` if the request fails or the remote answers non-200.
    pub async fn database_names(&self, database: &str) -> RelayResult<Value> {
        let database = require(database, "database")?;
        let body = self
            .remote
            .get(&["v1", "database", database, "names"], &[])
            .await
            .and_then(RemoteResponse::into_success);
        relay("database_names", body).map(decode_body)
    }
}
