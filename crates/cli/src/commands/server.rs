//! Runs the allocation HTTP service.

use anyhow::{Context, Result};
use capfund_core::ConfigLoader;
use capfund_web_api::ApiServer;
use clap::Args;

/// Arguments for the server command.
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,

    /// Optional profile overlay (loads Config.<profile>.toml)
    #[arg(long, env = "CAPFUND_PROFILE")]
    pub profile: Option<String>,

    /// Server address, overrides the configured host and port
    #[arg(short, long)]
    pub addr: Option<String>,
}

/// Runs the server command until the listener fails.
///
/// # Errors
/// Returns an error if configuration cannot be loaded or the server cannot bind.
pub async fn run_server(args: ServerArgs) -> Result<()> {
    let config = match &args.profile {
        Some(profile) => ConfigLoader::load_with_profile(&args.config, profile),
        None => ConfigLoader::load(&args.config),
    }
    .with_context(|| format!("Failed to load config from {}", args.config))?;

    let addr = args.addr.unwrap_or_else(|| config.server.addr());
    tracing::info!(
        "Starting allocation API on {} (max {} assets per request)",
        addr,
        config.allocation.max_assets
    );

    let server = ApiServer::from_config(&config);
    server.serve(&addr).await?;

    Ok(())
}
