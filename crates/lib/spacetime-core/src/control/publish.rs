use std::process::Stdio;

use tokio::process::Command;
use tracing::info;

use super::{RelayError, RelayResult, SpacetimeControlPlane, relay, require};

const DEFAULT_CLI: &str = "spacetime";

/// Settings for the external publishing command.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub cli: String,
}

impl PublishConfig {
    #[must_use]
    pub fn new(cli: impl Into<String>) -> Self {
        Self { cli: cli.into() }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CLI)
    }
}

/// Input payload for publishing a module.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub database: String,
    pub project_path: String,
    pub clear_data: bool,
}

impl SpacetimeControlPlane {
    /// Publishes a module by running the publishing command against the
    /// configured server.
    ///
    /// # Errors
    /// Returns `RelayError::Spawn` if the command cannot be started and
    /// `RelayError::Subprocess` with the captured output if it exits non-zero.
    pub async fn publish_module(&self, request: &PublishRequest) -> RelayResult<String> {
        let database = require(&request.database, "database")?;
        let project_path = require(&request.project_path, "project_path")?;
        let args = publish_args(database, project_path, self.host(), request.clear_data);
        info!(cli = %self.publish.cli, database, project_path, "publishing module");

        let output = Command::new(&self.publish.cli)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| RelayError::Spawn(format!("{}: {err}", self.publish.cli)));
        let output = relay("publish", output)?;

        let combined = combine_output(&output.stdout, &output.stderr);
        if output.status.success() {
            Ok(combined)
        } else {
            relay(
                "publish",
                Err(RelayError::Subprocess {
                    status: output.status.code(),
                    output: combined,
                }),
            )
        }
    }
}

/// Assembles the publishing command's arguments.
#[must_use]
pub fn publish_args(database: &str, project_path: &str, server: &str, clear_data: bool) -> Vec<String> {
    let mut args = vec![
        "publish".to_string(),
        database.to_string(),
        "--project-path".to_string(),
        project_path.to_string(),
        "--server".to_string(),
        server.to_string(),
    ];
    if clear_data {
        args.push("--delete-data".to_string());
    }
    args.push("--yes".to_string());
    args
}

fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    [stdout.trim_end(), stderr.trim_end()]
        .into_iter()
        .filter(|stream| !stream.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{HttpRemote, RemoteConfig};

    fn control_with_cli(cli: &str) -> SpacetimeControlPlane {
        let remote = HttpRemote::new(&RemoteConfig::new("http://localhost:3000"))
            .expect("remote should build");
        SpacetimeControlPlane::new(remote, PublishConfig::new(cli))
    }

    fn request(clear_data: bool) -> PublishRequest {
        PublishRequest {
            database: "chat".to_string(),
            project_path: "./server".to_string(),
            clear_data,
        }
    }

    #[test]
    fn args_include_clear_flag_only_when_requested() {
        let args = publish_args("chat", "./server", "http://localhost:3000", false);
        assert_eq!(
            args,
            [
                "publish",
                "chat",
                "--project-path",
                "./server",
                "--server",
                "http://localhost:3000",
                "--yes"
            ]
        );
        let args = publish_args("chat", "./server", "http://localhost:3000", true);
        assert!(args.contains(&"--delete-data".to_string()));
    }

    #[test]
    fn combines_streams_in_order() {
        assert_eq!(combine_output(b"built\n", b"warning\n"), "built\nwarning");
        assert_eq!(combine_output(b"", b"only stderr"), "only stderr");
        assert_eq!(combine_output(b"", b""), "");
    }

    #[tokio::test]
    async fn successful_command_returns_output() {
        let control = control_with_cli("echo");
        let output = control
            .publish_module(&request(true))
            .await
            .expect("echo should succeed");
        assert_eq!(
            output,
            "publish chat --project-path ./server --server http://localhost:3000 --delete-data --yes"
        );
    }

    #[tokio::test]
    async fn failing_command_is_reported() {
        let control = control_with_cli("false");
        let err = control
            .publish_module(&request(false))
            .await
            .expect_err("false should fail");
        assert!(matches!(err, RelayError::Subprocess { status: Some(1), .. }));
    }

    #[tokio::test]
    async fn missing_command_is_a_spawn_failure() {
        let control = control_with_cli("spacetime-cli-that-does-not-exist");
        let err = control
            .publish_module(&request(false))
            .await
            .expect_err("spawn should fail");
        assert!(matches!(err, RelayError::Spawn(_)));
    }

    #[tokio::test]
    async fn blank_project_path_is_rejected_before_spawning() {
        let control = control_with_cli("spacetime-cli-that-does-not-exist");
        let mut request = request(false);
        request.project_path = "  ".to_string();
        let err = control
            .publish_module(&request)
            .await
            .expect_err("blank path should be rejected");
        assert!(matches!(err, RelayError::MissingParameter("project_path")));
    }
}
