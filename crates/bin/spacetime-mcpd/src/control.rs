use spacetime_core::control::{PublishConfig, SpacetimeControlPlane};
use spacetime_core::remote::{HttpRemote, RemoteConfig, RemoteError};
use spacetime_mcp::ToolConfig;

use crate::config::SpacetimeConfig;

pub fn build_control(config: &SpacetimeConfig) -> Result<SpacetimeControlPlane, RemoteError> {
    let remote_config = RemoteConfig::new(config.host.clone())
        .with_token(config.token.clone())
        .with_timeout(config.timeout);
    let remote = HttpRemote::new(&remote_config)?;
    Ok(SpacetimeControlPlane::new(remote, PublishConfig::new(config.cli.clone())))
}

pub fn tool_config(config: &SpacetimeConfig) -> ToolConfig {
    ToolConfig::new(config.default_database.clone())
}
