//! dirlook
//!
//! Serves the host filesystem as browsable HTML over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dirlook::config::Config;
use dirlook::files::roots::discovery_from_config;
use dirlook::{shutdown_signal, AppState, DirServer};

/// dirlook - browse and download files from this machine over HTTP.
#[derive(Parser, Debug)]
#[command(name = "dirlook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to listen on, overriding the configuration
        #[arg(long, short, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },

    /// Print the roots that would be offered for browsing
    Roots,

    /// Print the effective configuration as TOML
    PrintConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default()?
    };

    // Apply environment variable overrides
    let overrides = config.apply_env_overrides()?;

    let command = cli.command.unwrap_or(Commands::Serve { bind: None });
    if let Commands::Serve { bind: Some(addr) } = &command {
        config.server.bind_addr = *addr;
    }

    // Validate configuration
    config.validate()?;

    // Initialize tracing
    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.server.log_level.to_lowercase()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    for o in &overrides {
        tracing::info!("Overriding {} from environment: {}", o.field, o.value);
    }

    match command {
        Commands::Serve { .. } => run_server(config).await?,
        Commands::Roots => {
            for root in discovery_from_config(&config.roots).list_roots() {
                println!("{}\t{}", root.name, root.path.display());
            }
        }
        Commands::PrintConfig => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

/// Run the server until SIGTERM or SIGINT.
async fn run_server(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config);

    let roots = state.resolver().roots().list_roots();
    if roots.is_empty() {
        tracing::warn!("No browsable roots found");
    }
    for root in &roots {
        tracing::info!("Offering root {} ({})", root.name, root.path.display());
    }

    let server = DirServer::bind(config.server.bind_addr, state)
        .await?
        .with_shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout));

    tracing::info!("dirlook listening on http://{}", server.local_addr()?);

    server.run_until(shutdown_signal()).await
}
