use booter_bootparams::BootParamsResolver;
use booter_inventory::BooterConfig;
use clap::Args;
use color_eyre::eyre::{Result, WrapErr};
use std::net::SocketAddr;
use tokio::sync::watch;
use tracing::info;

use crate::api::api_router;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address, overriding the config file
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,
}

pub async fn run_serve(
    args: ServeArgs,
    config: &BooterConfig,
    resolver: BootParamsResolver,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<()> {
    let addr = args.listen.unwrap_or(config.listen);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind {}", addr))?;

    info!(addr = %addr, "Serving boot parameters");

    axum::serve(listener, api_router(resolver))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await
        .wrap_err("server error")?;

    info!("Shutdown complete");
    Ok(())
}
