// Booter binary: resolves boot parameters from the network and compute inventories
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use std::io::stderr;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

use booter_inventory::{BooterConfig, InventoryClients};

mod api;
mod cmd;

use cmd::resolve::ResolveArgs;
use cmd::serve::ServeArgs;

const DEFAULT_CONFIG: &str = "/opt/smartdc/booter/config.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Network boot parameter resolver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output - shows more detailed logs
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Path to the JSON config file
    #[arg(short, long, global = true, env = "BOOTER_CONFIG", default_value = DEFAULT_CONFIG)]
    config: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve boot parameters for one MAC address and print them as JSON
    Resolve(ResolveArgs),
    /// Serve boot parameters over HTTP
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let default_directives = format!(
        "booter={level},booter_bootparams={level},booter_inventory={level},tower=warn,hyper=warn,reqwest=warn,rustls=warn,h2=warn,mio=warn,want=warn",
        level = level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
    registry().with(filter).with(fmt::layer().with_writer(stderr)).init();

    debug!(path = %cli.config.display(), "Loading config");
    let config = BooterConfig::from_file(&cli.config)
        .wrap_err_with(|| format!("failed to load config {}", cli.config.display()))?;
    let clients = InventoryClients::from_config(&config)?;
    let resolver = clients.resolver();

    match cli.command {
        Commands::Resolve(args) => cmd::resolve::run_resolve(args, resolver).await,
        Commands::Serve(args) => {
            let (shutdown_tx, shutdown_rx) = watch::channel(());
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Ctrl+C received, shutting down");
                    let _ = shutdown_tx.send(());
                }
            });
            cmd::serve::run_serve(args, &config, resolver, shutdown_rx).await
        }
    }
}
