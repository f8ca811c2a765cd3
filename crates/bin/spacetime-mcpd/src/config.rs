use clap::Parser;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_HOST: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CLI: &str = "spacetime";

#[derive(Parser, Debug)]
#[command(name = "spacetime-mcpd", version, about = "SpacetimeDB MCP daemon.")]
struct CliArgs {
    /// Base URL of the SpacetimeDB server.
    #[arg(long, env = "SPACETIMEDB_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Bearer token sent with every request.
    #[arg(long, env = "SPACETIMEDB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Database used when a tool call omits one.
    #[arg(long, env = "SPACETIMEDB_DEFAULT_DATABASE")]
    database: Option<String>,

    #[arg(long, env = "SPACETIMEDB_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Command used to publish modules.
    #[arg(long, env = "SPACETIME_CLI", default_value = DEFAULT_CLI)]
    cli: String,

    /// Serve streamable HTTP on this address instead of stdio.
    #[arg(long, env = "SPACETIME_MCP_HTTP_ADDR")]
    http_addr: Option<SocketAddr>,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
pub struct SpacetimeConfig {
    pub host: String,
    pub token: Option<String>,
    pub default_database: Option<String>,
    pub timeout: Duration,
    pub cli: String,
    pub http_addr: Option<SocketAddr>,
}

impl fmt::Debug for SpacetimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpacetimeConfig")
            .field("host", &self.host)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("default_database", &self.default_database)
            .field("timeout", &self.timeout)
            .field("cli", &self.cli)
            .field("http_addr", &self.http_addr)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl SpacetimeConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for SpacetimeConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let host = args.host.trim().trim_end_matches('/').to_string();
        if host.is_empty() {
            return Err(ConfigError::MissingSetting("SPACETIMEDB_HOST"));
        }
        let has_scheme = host
            .split_once("://")
            .is_some_and(|(scheme, rest)| matches!(scheme, "http" | "https") && !rest.is_empty());
        if !has_scheme {
            return Err(ConfigError::InvalidSetting {
                name: "SPACETIMEDB_HOST",
                value: args.host,
            });
        }

        if args.timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "SPACETIMEDB_TIMEOUT_SECS",
                value: args.timeout_secs.to_string(),
            });
        }

        let cli = args.cli.trim().to_string();
        if cli.is_empty() {
            return Err(ConfigError::MissingSetting("SPACETIME_CLI"));
        }

        let token = args.token.filter(|value| !value.trim().is_empty());
        let default_database = args
            .database
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            host,
            token,
            default_database,
            timeout: Duration::from_secs(args.timeout_secs),
            cli,
            http_addr: args.http_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            host: DEFAULT_HOST.to_string(),
            token: None,
            database: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cli: DEFAULT_CLI.to_string(),
            http_addr: None,
        }
    }

    #[test]
    fn defaults_produce_stdio_config() {
        let config = SpacetimeConfig::try_from(base_args()).expect("config should parse");

        assert_eq!(config.host, "http://localhost:3000");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.cli, "spacetime");
        assert!(config.token.is_none());
        assert!(config.default_database.is_none());
        assert!(config.http_addr.is_none());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let mut args = base_args();
        args.host = "https://maincloud.spacetimedb.com/".to_string();

        let config = SpacetimeConfig::try_from(args).expect("config should parse");

        assert_eq!(config.host, "https://maincloud.spacetimedb.com");
    }

    #[test]
    fn blank_optionals_become_none() {
        let mut args = base_args();
        args.token = Some("  ".to_string());
        args.database = Some(" ".to_string());

        let config = SpacetimeConfig::try_from(args).expect("config should parse");

        assert!(config.token.is_none());
        assert!(config.default_database.is_none());
    }

    #[test]
    fn rejects_non_http_host() {
        let mut args = base_args();
        args.host = "localhost:3000".to_string();

        let err = SpacetimeConfig::try_from(args).expect_err("host should be rejected");

        assert_eq!(err.to_string(), "invalid SPACETIMEDB_HOST value: localhost:3000");
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut args = base_args();
        args.timeout_secs = 0;

        assert!(matches!(
            SpacetimeConfig::try_from(args),
            Err(ConfigError::InvalidSetting {
                name: "SPACETIMEDB_TIMEOUT_SECS",
                ..
            })
        ));
    }

    #[test]
    fn redacts_token_in_debug_output() {
        let mut args = base_args();
        args.token = Some("secret".to_string());

        let config = SpacetimeConfig::try_from(args).expect("config should parse");

        assert!(!format!("{config:?}").contains("secret"));
    }
}
