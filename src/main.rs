use anyhow::{Context, Result};
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;

use services::{archiver_client::HttpArchiverClient, gateway_service::GatewayService};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting bucket-gateway with config: {:?}", cfg);

    // --- Archiver client ---
    let archiver = HttpArchiverClient::new(cfg.archiver_url.clone(), cfg.archiver_timeout)
        .context("building archiver HTTP client")?;
    tracing::info!(
        "Forwarding to archiver at {} (timeout {:?})",
        cfg.archiver_url,
        cfg.archiver_timeout
    );

    // --- Initialize core service ---
    let gateway = GatewayService::new(Arc::new(archiver));

    // --- Build router ---
    let app: Router = routes::routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(gateway);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
