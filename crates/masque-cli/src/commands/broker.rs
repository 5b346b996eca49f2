// Broker subcommand

use anyhow::{anyhow, Context};
use masque_core::BrokerConfig;
use masque_transport::BrokerServer;
use std::future::Future;
use std::path::Path;

/// Load the config file (or defaults) and apply flag overrides
pub fn resolve_config(
    path: Option<&Path>,
    port: Option<u16>,
    aggregator_url: Option<String>,
    timeout_secs: Option<u64>,
) -> anyhow::Result<BrokerConfig> {
    let mut config = match path {
        Some(path) => BrokerConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => BrokerConfig::default(),
    };
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(url) = aggregator_url {
        config.aggregator_url = url;
    }
    if let Some(secs) = timeout_secs {
        config.request_timeout_secs = secs;
    }
    config
        .validate()
        .map_err(|e| anyhow!("invalid broker configuration: {e}"))?;
    Ok(config)
}

/// Serve until `shutdown` resolves
pub async fn run<F>(config: BrokerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    BrokerServer::new(config).start(shutdown).await
}
