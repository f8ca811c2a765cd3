use std::{error::Error, fmt};

use serde_json::Value;

use crate::remote::{HttpRemote, RemoteError, RemoteResponse};

pub mod database;
pub mod identity;
pub mod publish;

pub use publish::{PublishConfig, PublishRequest};

/// Failure half of every relayed operation.
#[derive(Debug)]
pub enum RelayError {
    Remote(RemoteError),
    NotFound(String),
    MissingParameter(&'static str),
    Subprocess { status: Option<i32>, output: String },
    Spawn(String),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(err) => write!(f, "{err}"),
            Self::NotFound(database) => write!(f, "Database '{database}' not found"),
            Self::MissingParameter(name) => write!(f, "missing required parameter: {name}"),
            Self::Subprocess { status, output } => match status {
                Some(code) => write!(f, "publish exited with status {code}\n{output}"),
                None => write!(f, "publish terminated by signal\n{output}"),
            },
            Self::Spawn(message) => write!(f, "failed to run publish command: {message}"),
        }
    }
}

impl Error for RelayError {}

impl From<RemoteError> for RelayError {
    fn from(err: RemoteError) -> Self {
        Self::Remote(err)
    }
}

pub type RelayResult<T> = Result<T, RelayError>;

/// Uniform entry point for every remote operation exposed as a tool.
#[derive(Debug, Clone)]
pub struct SpacetimeControlPlane {
    remote: HttpRemote,
    publish: PublishConfig,
}

impl SpacetimeControlPlane {
    #[must_use]
    pub const fn new(remote: HttpRemote, publish: PublishConfig) -> Self {
        Self { remote, publish }
    }

    #[must_use]
    pub const fn remote(&self) -> &HttpRemote {
        &self.remote
    }

    #[must_use]
    pub fn host(&self) -> &str {
        self.remote.host()
    }

    /// Probes server connectivity.
    ///
    /// # Errors
    /// Returns `RelayError` if the server is unreachable or answers non-200.
    pub async fn ping(&self) -> RelayResult<String> {
        let body = self
            .remote
            .get(&["v1", "ping"], &[])
            .await
            .and_then(RemoteResponse::into_success);
        relay("ping", body)
    }
}

/// Decodes a response body as JSON, keeping non-JSON text as a string value.
#[must_use]
pub fn decode_body(body: String) -> Value {
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}

/// Rejects blank parameters before any remote call is made.
///
/// # Errors
/// Returns `RelayError::MissingParameter` if the value is empty.
pub fn require<'a>(value: &'a str, name: &'static str) -> RelayResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(RelayError::MissingParameter(name))
    } else {
        Ok(trimmed)
    }
}

fn relay<T, E>(operation: &'static str, result: Result<T, E>) -> RelayResult<T>
where
    E: Into<RelayError>,
{
    result.map_err(Into::into).inspect_err(|err| {
        tracing::warn!(operation, error = %err, "remote operation failed");
    })
}
