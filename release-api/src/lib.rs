pub mod config;
pub mod controller;
pub mod errors;
pub mod metrics_defs;
pub mod query;
pub mod requests;
pub mod resource;

#[cfg(test)]
mod testutils;

use chart_repo::IndexChartRepository;
use controller::ReleaseController;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::convert::Infallible;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tiller_client::{GrpcTillerClient, TillerError};
use tokio::net::TcpListener;

#[derive(thiserror::Error, Debug)]
pub enum ReleaseApiError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] config::ValidationError),
    #[error("could not set up release backend client: {0}")]
    Backend(#[from] TillerError),
}

/// Serves the release endpoints and the admin probes until either listener fails.
pub async fn run(config: config::Config) -> Result<(), ReleaseApiError> {
    config.validate()?;

    let tiller = Arc::new(GrpcTillerClient::new(
        &config.tiller.url,
        &config.tiller.api_version,
    )?);
    let charts = Arc::new(IndexChartRepository::new(config.chart_repo.clone()));
    let app = resource::router(ReleaseController::new(tiller, charts));

    let ready = Arc::new(AtomicBool::new(false));

    let api_ready = ready.clone();
    let listener_config = config.listener.clone();
    let api_task = async move {
        let listener =
            TcpListener::bind(format!("{}:{}", listener_config.host, listener_config.port))
                .await?;
        tracing::info!(
            host = %listener_config.host,
            port = listener_config.port,
            "Release API listening"
        );
        api_ready.store(true, Ordering::Relaxed);
        axum::serve(listener, app).await?;
        Ok::<(), ReleaseApiError>(())
    };

    tracing::info!(
        backend = %config.tiller.url,
        api_version = %config.tiller.api_version,
        "Using release backend"
    );
    let admin_service = AdminService::<_, Infallible>::new(move || ready.load(Ordering::Relaxed));
    let admin_task = run_http_service::<_, _, ReleaseApiError>(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin_service,
    );

    tokio::try_join!(api_task, admin_task)?;
    Ok(())
}
