//! Translation between release operations and backend requests.

use crate::metrics_defs::BACKEND_DURATION;
use crate::requests::{InstallReleaseParams, RollbackReleaseParams, UpdateReleaseParams, Values};
use chart_repo::{ChartLoadError, ChartRepoError, ChartRepository};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tiller_client::chart::{Chart, Config, Value};
use tiller_client::services::{
    GetReleaseContentRequest, GetReleaseContentResponse, GetReleaseStatusRequest,
    GetReleaseStatusResponse, InstallReleaseRequest, InstallReleaseResponse, ListReleasesRequest,
    ListReleasesResponse, RollbackReleaseRequest, RollbackReleaseResponse,
    UninstallReleaseRequest, UninstallReleaseResponse, UpdateReleaseRequest,
    UpdateReleaseResponse,
};
use tiller_client::{TillerClient, TillerError};

/// Backend operations issued by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Install,
    Uninstall,
    GetContent,
    GetStatus,
    Update,
    Rollback,
}

impl Operation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Install => "install",
            Operation::Uninstall => "uninstall",
            Operation::GetContent => "get_content",
            Operation::GetStatus => "get_status",
            Operation::Update => "update",
            Operation::Rollback => "rollback",
        }
    }

    const fn failure_message(&self) -> &'static str {
        match self {
            Operation::List => "unable to get list of releases from tiller",
            Operation::Install => "unable to install new release",
            Operation::Uninstall => "unable to uninstall release",
            Operation::GetContent => "unable to get release content",
            Operation::GetStatus => "unable to get release status",
            Operation::Update => "unable to update release",
            Operation::Rollback => "unable to rollback release",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ControllerError {
    /// The chart reference could not be resolved. Not a backend failure.
    #[error("unable to get chart details: {0}")]
    ChartDetails(#[from] ChartRepoError),
    #[error("unable to load chart: {0}")]
    ChartLoad(#[from] ChartLoadError),
    #[error("unable to serialize values: {0}")]
    Values(#[from] serde_yaml::Error),
    #[error("{operation} call failed: {source}")]
    Backend {
        operation: Operation,
        #[source]
        source: TillerError,
    },
}

/// Content and status of one release version, fetched together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetReleaseResponse {
    pub content: GetReleaseContentResponse,
    pub status: GetReleaseStatusResponse,
}

/// Turns release operations into backend calls.
///
/// Holds no per-request state; clones share the same collaborators.
#[derive(Clone)]
pub struct ReleaseController {
    tiller: Arc<dyn TillerClient>,
    charts: Arc<dyn ChartRepository>,
}

impl ReleaseController {
    pub fn new(tiller: Arc<dyn TillerClient>, charts: Arc<dyn ChartRepository>) -> Self {
        ReleaseController { tiller, charts }
    }

    /// Passes a pre-built filter request through unchanged.
    pub async fn list_releases(
        &self,
        request: ListReleasesRequest,
    ) -> Result<ListReleasesResponse, ControllerError> {
        call_backend(Operation::List, self.tiller.list_releases(request)).await
    }

    pub async fn install_release(
        &self,
        params: InstallReleaseParams,
    ) -> Result<InstallReleaseResponse, ControllerError> {
        let chart = self
            .resolve_chart(&params.repo, &params.chart, &params.version)
            .await?;
        let config = values_config_or_log(params.values.as_ref())?;

        let request = InstallReleaseRequest {
            name: params.name,
            namespace: params.namespace,
            chart: Some(chart),
            values: Some(config),
            wait: params.wait,
            timeout: params.timeout,
            ..Default::default()
        };

        call_backend(Operation::Install, self.tiller.install_release(request)).await
    }

    pub async fn uninstall_release(
        &self,
        name: &str,
        purge: bool,
    ) -> Result<UninstallReleaseResponse, ControllerError> {
        let request = UninstallReleaseRequest {
            name: name.to_string(),
            purge,
            ..Default::default()
        };

        call_backend(Operation::Uninstall, self.tiller.uninstall_release(request)).await
    }

    /// Fetches content, then status, for the same `(name, version)`.
    ///
    /// The status call is skipped when the content call fails, and a failed
    /// status call discards the content already fetched.
    pub async fn get_release(
        &self,
        name: &str,
        version: i32,
    ) -> Result<GetReleaseResponse, ControllerError> {
        let content_request = GetReleaseContentRequest {
            name: name.to_string(),
            version,
        };
        let content = call_backend(
            Operation::GetContent,
            self.tiller.get_release_content(content_request),
        )
        .await?;

        let status_request = GetReleaseStatusRequest {
            name: name.to_string(),
            version,
        };
        let status = call_backend(
            Operation::GetStatus,
            self.tiller.get_release_status(status_request),
        )
        .await?;

        Ok(GetReleaseResponse { content, status })
    }

    pub async fn update_release(
        &self,
        params: UpdateReleaseParams,
    ) -> Result<UpdateReleaseResponse, ControllerError> {
        let chart = self
            .resolve_chart(&params.repo, &params.chart, &params.version)
            .await?;
        let config = values_config_or_log(params.values.as_ref())?;

        let request = UpdateReleaseRequest {
            name: params.name,
            chart: Some(chart),
            values: Some(config),
            dry_run: params.dry_run,
            disable_hooks: params.disable_hooks,
            recreate: params.recreate,
            timeout: params.timeout,
            reset_values: params.reset_values,
            wait: params.wait,
            reuse_values: params.reuse_values,
            force: params.force,
        };

        call_backend(Operation::Update, self.tiller.update_release(request)).await
    }

    pub async fn rollback_release(
        &self,
        params: RollbackReleaseParams,
    ) -> Result<RollbackReleaseResponse, ControllerError> {
        let request = RollbackReleaseRequest {
            name: params.name,
            dry_run: params.dry_run,
            disable_hooks: params.disable_hooks,
            version: params.version,
            recreate: params.recreate,
            timeout: params.timeout,
            wait: params.wait,
            force: params.force,
        };

        call_backend(Operation::Rollback, self.tiller.rollback_release(request)).await
    }

    /// Resolves the chart reference and loads its archive.
    async fn resolve_chart(
        &self,
        repo: &str,
        chart: &str,
        version: &str,
    ) -> Result<Chart, ControllerError> {
        let details = self
            .charts
            .chart_details(repo, chart, version)
            .await
            .inspect_err(|e| {
                tracing::error!(repo, chart, version, error = %e, "unable to get chart details")
            })?;

        let loaded = self.charts.load_chart(&details).await.inspect_err(|e| {
            tracing::error!(
                path = %details.chart_file.display(),
                error = %e,
                "unable to load chart details"
            )
        })?;

        Ok(loaded)
    }
}

async fn call_backend<T>(
    operation: Operation,
    call: impl Future<Output = Result<T, TillerError>>,
) -> Result<T, ControllerError> {
    let start = Instant::now();
    let result = call.await;
    shared::histogram!(BACKEND_DURATION, "operation" => operation.as_str())
        .record(start.elapsed().as_secs_f64());

    result.map_err(|source| {
        tracing::error!(%operation, error = %source, "{}", operation.failure_message());
        ControllerError::Backend { operation, source }
    })
}

fn values_config_or_log(values: Option<&Values>) -> Result<Config, ControllerError> {
    let empty = Values::new();
    values_config(values.unwrap_or(&empty)).map_err(|e| {
        tracing::error!(error = %e, "unable to serialize values");
        ControllerError::Values(e)
    })
}

/// Builds the values config sent to the backend.
///
/// `raw` holds the YAML document of the whole map and `values` holds every
/// key again with its value stringified on its own. Strings are kept
/// verbatim, anything else is rendered as compact JSON.
pub fn values_config(values: &Values) -> Result<Config, serde_yaml::Error> {
    let raw = serde_yaml::to_string(values)?;
    let overlay = values
        .iter()
        .map(|(key, value)| (key.clone(), Value::from(stringify_value(value))))
        .collect();

    Ok(Config {
        raw,
        values: overlay,
    })
}

fn stringify_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
