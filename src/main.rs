use anyhow::Context;
use axum::Router;
use clap::Parser;
use lms_admin_server::cli::Args;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level)?;
    info!(
        "Back-office starting with page size {} and admin role '{}'",
        args.page_size, args.admin_role
    );

    let router = lms_admin_server::init_router(&args).await?;

    serve(router, args.server_address)
        .await
        .context("Server failed to run")?;

    info!("Back-office stopped");
    Ok(())
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(log_level)
        .with_context(|| format!("Invalid log filter '{}'", log_level))?;
    fmt().with_env_filter(filter).with_target(false).init();
    Ok(())
}

async fn serve(router: Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;
    info!("Listening on {}", addr);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Axum server error")?;
    Ok(())
}

/// Resolves on Ctrl+C; in-flight requests finish before the server exits.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => {
            warn!("Could not listen for the shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
