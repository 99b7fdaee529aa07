//! HTTP routes of the release API.

use crate::controller::ReleaseController;
use crate::errors::ApiError;
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS};
use crate::query::{has_flag, parse_list_query};
use crate::requests::{InstallReleaseParams, RollbackReleaseParams, UpdateReleaseParams};
use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{MatchedPath, Path, RawQuery, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Instant;

pub const RELEASES_PATH: &str = "/api/v1/releases";

pub fn router(controller: ReleaseController) -> Router {
    Router::new()
        .route(
            RELEASES_PATH,
            get(list_releases).post(install_release).put(update_release),
        )
        .route("/api/v1/releases/rollback", put(rollback_release))
        .route("/api/v1/releases/{release}", delete(uninstall_release))
        .route("/api/v1/releases/{release}/{version}", get(get_release))
        .route_layer(middleware::from_fn(track_requests))
        .with_state(controller)
}

async fn list_releases(
    State(controller): State<ReleaseController>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    tracing::info!("Getting list of releases");
    let request = parse_list_query(query.as_deref());
    let response = controller
        .list_releases(request)
        .await
        .map_err(ApiError::ListReleases)?;
    write_entity(&response)
}

async fn install_release(
    State(controller): State<ReleaseController>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let params: InstallReleaseParams = read_entity(body)?;
    tracing::info!(name = %params.name, chart = %params.chart, "Installing release");
    let response = controller
        .install_release(params.with_defaults())
        .await
        .map_err(ApiError::InstallRelease)?;
    write_entity(&response)
}

async fn update_release(
    State(controller): State<ReleaseController>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let params: UpdateReleaseParams = read_entity(body)?;
    tracing::info!(name = %params.name, chart = %params.chart, "Updating release");
    let response = controller
        .update_release(params.with_defaults())
        .await
        .map_err(ApiError::UpdateRelease)?;
    write_entity(&response)
}

async fn rollback_release(
    State(controller): State<ReleaseController>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let params: RollbackReleaseParams = read_entity(body)?;
    tracing::info!(name = %params.name, version = params.version, "Rolling back release");
    let response = controller
        .rollback_release(params)
        .await
        .map_err(ApiError::RollbackRelease)?;
    write_entity(&response)
}

/// `purge` only needs to be present; its value is ignored.
async fn uninstall_release(
    State(controller): State<ReleaseController>,
    Path(release): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let purge = has_flag(query.as_deref(), "purge");
    tracing::info!(name = %release, purge, "Uninstalling release");
    let response = controller
        .uninstall_release(&release, purge)
        .await
        .map_err(ApiError::UninstallRelease)?;
    write_entity(&response)
}

async fn get_release(
    State(controller): State<ReleaseController>,
    Path((release, version)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let version: i32 = version
        .parse()
        .map_err(|_| ApiError::ReadPath(format!("invalid release version: {version}")))?;
    let response = controller
        .get_release(&release, version)
        .await
        .map_err(ApiError::GetRelease)?;
    write_entity(&response)
}

fn read_entity<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, ApiError> {
    let bytes = body.map_err(|e| ApiError::ReadRequest(e.body_text()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::ReadRequest(e.to_string()))
}

fn write_entity<T: Serialize>(value: &T) -> Result<Response, ApiError> {
    let bytes = serde_json::to_vec(value).map_err(ApiError::WriteResponse)?;
    let mut response = Bytes::from(bytes).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}

async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_default();

    let response = next.run(request).await;

    let status: StatusCode = response.status();
    shared::counter!(
        REQUESTS,
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    shared::histogram!(REQUEST_DURATION, "method" => method, "route" => route)
        .record(start.elapsed().as_secs_f64());

    response
}
