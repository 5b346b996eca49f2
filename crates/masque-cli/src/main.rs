// Masque operator binary: Broker and client intake servers

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands {
    pub mod broker;
    pub mod client;
}

#[derive(Parser, Debug)]
#[command(name = "masque")]
#[command(about = "Masque - masking-based private set intersection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a Broker that masks Aggregator data for clients
    Broker {
        /// Port to listen on
        port: Option<u16>,

        /// Base URL of the Aggregator
        #[arg(short, long)]
        aggregator_url: Option<String>,

        /// Per-request deadline in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Run the client intake server that accepts CSV uploads
    Client {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Deadline for the Broker call in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Broker {
            port,
            aggregator_url,
            timeout,
        } => {
            let config =
                commands::broker::resolve_config(cli.config.as_deref(), port, aggregator_url, timeout)?;
            commands::broker::run(config, shutdown_signal()).await?;
        }
        Commands::Client { port, timeout } => {
            let config = commands::client::resolve_config(cli.config.as_deref(), port, timeout)?;
            commands::client::run(config, shutdown_signal()).await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
