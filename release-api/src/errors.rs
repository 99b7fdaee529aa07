use crate::controller::ControllerError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Failures reported to API clients.
///
/// The message is fixed per variant; details of the underlying cause are
/// only logged.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("unable to read request body")]
    ReadRequest(String),
    #[error("unable to read request path")]
    ReadPath(String),
    #[error("unable to get list of releases")]
    ListReleases(#[source] ControllerError),
    #[error("unable to install releases")]
    InstallRelease(#[source] ControllerError),
    #[error("unable to uninstall releases")]
    UninstallRelease(#[source] ControllerError),
    #[error("unable to get release content and status")]
    GetRelease(#[source] ControllerError),
    #[error("unable to update release")]
    UpdateRelease(#[source] ControllerError),
    #[error("unable to rollback release")]
    RollbackRelease(#[source] ControllerError),
    #[error("unable to write response")]
    WriteResponse(#[source] serde_json::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ReadRequest(_) | ApiError::ReadPath(_) => StatusCode::BAD_REQUEST,
            ApiError::ListReleases(_)
            | ApiError::InstallRelease(_)
            | ApiError::UninstallRelease(_)
            | ApiError::GetRelease(_)
            | ApiError::UpdateRelease(_)
            | ApiError::RollbackRelease(_)
            | ApiError::WriteResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn cause(&self) -> String {
        match self {
            ApiError::ReadRequest(detail) | ApiError::ReadPath(detail) => detail.clone(),
            ApiError::WriteResponse(e) => e.to_string(),
            ApiError::ListReleases(e)
            | ApiError::InstallRelease(e)
            | ApiError::UninstallRelease(e)
            | ApiError::GetRelease(e)
            | ApiError::UpdateRelease(e)
            | ApiError::RollbackRelease(e) => e.to_string(),
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(status = status.as_u16(), cause = %self.cause(), "{self}");

        let body = Json(ApiErrorResponse {
            code: status.as_u16(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
