use clap::{Parser, Subcommand};

mod commands;

use commands::{AllocateArgs, ServerArgs};

#[derive(Parser)]
#[command(name = "capfund")]
#[command(about = "Capped market-cap-weighted allocation for crypto funds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the allocation web API server
    Server(ServerArgs),
    /// Allocate capital for a request file and print the result
    Allocate(AllocateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Server(args) => {
            commands::run_server(args).await?;
        }
        Commands::Allocate(args) => {
            commands::run_allocate(&args)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn server_addr_override_parses() {
        let cli = Cli::try_parse_from(["capfund", "server", "--addr", "127.0.0.1:9000"]).unwrap();
        match cli.command {
            Commands::Server(args) => {
                assert_eq!(args.addr.as_deref(), Some("127.0.0.1:9000"));
                assert_eq!(args.config, "config/Config.toml");
            }
            Commands::Allocate(_) => panic!("expected server command"),
        }
    }

    #[test]
    fn allocate_requires_input() {
        assert!(Cli::try_parse_from(["capfund", "allocate"]).is_err());
    }
}
