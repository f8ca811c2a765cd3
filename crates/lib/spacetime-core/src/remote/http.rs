use std::{error::Error, fmt, time::Duration};

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use tracing::debug;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub enum RemoteError {
    Transport(String),
    Timeout(String),
    Rejected { status: u16, body: String },
    InvalidUrl(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "Connection failed: {message}"),
            Self::Timeout(message) => write!(f, "Request timed out: {message}"),
            Self::Rejected { status, body } => write!(f, "HTTP {status}: {body}"),
            Self::InvalidUrl(url) => write!(f, "Invalid server URL: {url}"),
        }
    }
}

impl Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        let message = describe(&err);
        if err.is_timeout() {
            Self::Timeout(message)
        } else {
            Self::Transport(message)
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Connection settings for the remote database server.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub host: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl RemoteConfig {
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Status and raw body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: String,
}

impl RemoteResponse {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }

    /// Returns the body of an HTTP 200 response.
    ///
    /// # Errors
    /// Returns `RemoteError::Rejected` carrying the status and body for any
    /// other status.
    pub fn into_success(self) -> RemoteResult<String> {
        if self.status == StatusCode::OK.as_u16() {
            Ok(self.body)
        } else {
            Err(RemoteError::Rejected {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// HTTP client bound to one server with optional bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpRemote {
    /// Builds a client for the configured server.
    ///
    /// # Errors
    /// Returns `RemoteError` if the host is not a valid base URL or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &RemoteConfig) -> RemoteResult<Self> {
        let base = Url::parse(config.host.trim())
            .map_err(|_| RemoteError::InvalidUrl(config.host.clone()))?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(config.host.clone()));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base,
            token: config.token.clone(),
        })
    }

    #[must_use]
    pub fn host(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Issues a GET request.
    ///
    /// # Errors
    /// Returns `RemoteError` on transport failures.
    pub async fn get(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> RemoteResult<RemoteResponse> {
        let request = self.request(Method::GET, segments)?.query(query);
        self.send(request).await
    }

    /// Issues a POST request with a plain-text body.
    ///
    /// # Errors
    /// Returns `RemoteError` on transport failures.
    pub async fn post_text(&self, segments: &[&str], body: String) -> RemoteResult<RemoteResponse> {
        let request = self
            .request(Method::POST, segments)?
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body);
        self.send(request).await
    }

    /// Issues a POST request with a JSON body.
    ///
    /// # Errors
    /// Returns `RemoteError` on transport failures.
    pub async fn post_json(
        &self,
        segments: &[&str],
        body: &serde_json::Value,
    ) -> RemoteResult<RemoteResponse> {
        let request = self.request(Method::POST, segments)?.json(body);
        self.send(request).await
    }

    /// Issues a DELETE request.
    ///
    /// # Errors
    /// Returns `RemoteError` on transport failures.
    pub async fn delete(&self, segments: &[&str]) -> RemoteResult<RemoteResponse> {
        let request = self.request(Method::DELETE, segments)?;
        self.send(request).await
    }

    fn endpoint(&self, segments: &[&str]) -> RemoteResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> RemoteResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "remote request");
        let request = self.client.request(method, url);
        Ok(match self.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn send(&self, request: RequestBuilder) -> RemoteResult<RemoteResponse> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "remote response");
        Ok(RemoteResponse { status, body })
    }
}

fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_segments_under_base_path() {
        let remote = HttpRemote::new(&RemoteConfig::new("http://localhost:3000/api/"))
            .expect("remote should build");
        let url = remote
            .endpoint(&["v1", "database", "my db", "call", "send"])
            .expect("endpoint should build");
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/v1/database/my%20db/call/send"
        );
        assert_eq!(remote.host(), "http://localhost:3000/api");
    }

    #[test]
    fn rejects_non_base_hosts() {
        let err = HttpRemote::new(&RemoteConfig::new("mailto:ops@example.com"))
            .expect_err("mailto is not a base URL");
        assert!(matches!(err, RemoteError::InvalidUrl(_)));
        assert!(HttpRemote::new(&RemoteConfig::new("not a url")).is_err());
    }

    #[test]
    fn non_ok_status_is_rejected_with_body() {
        let response = RemoteResponse {
            status: 500,
            body: r#"{"error":"oops"}"#.to_string(),
        };
        let err = response.into_success().expect_err("500 should be rejected");
        assert_eq!(err.to_string(), r#"HTTP 500: {"error":"oops"}"#);
    }
}
