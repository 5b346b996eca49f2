// Client intake subcommand

use anyhow::{anyhow, Context};
use masque_core::ClientConfig;
use masque_transport::IntakeServer;
use std::future::Future;
use std::path::Path;

/// Load the config file (or defaults) and apply flag overrides
pub fn resolve_config(
    path: Option<&Path>,
    port: Option<u16>,
    timeout_secs: Option<u64>,
) -> anyhow::Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(secs) = timeout_secs {
        config.broker_timeout_secs = secs;
    }
    config
        .validate()
        .map_err(|e| anyhow!("invalid client configuration: {e}"))?;
    Ok(config)
}

/// Serve until `shutdown` resolves
pub async fn run<F>(config: ClientConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    IntakeServer::new(config).start(shutdown).await
}
