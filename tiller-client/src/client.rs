use crate::services::{
    GetReleaseContentRequest, GetReleaseContentResponse, GetReleaseStatusRequest,
    GetReleaseStatusResponse, InstallReleaseRequest, InstallReleaseResponse, ListReleasesRequest,
    ListReleasesResponse, RollbackReleaseRequest, RollbackReleaseResponse,
    UninstallReleaseRequest, UninstallReleaseResponse, UpdateReleaseRequest,
    UpdateReleaseResponse,
};
use async_trait::async_trait;
use http::uri::PathAndQuery;
use std::time::Duration;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::metadata::AsciiMetadataValue;
use tonic::metadata::errors::InvalidMetadataValue;
use tonic::transport::{Channel, Endpoint};
use url::Url;

/// Metadata key the backend reads to check client compatibility.
const API_VERSION_KEY: &str = "x-helm-api-client";

/// Releases embed whole charts, so replies can be well above gRPC's 4 MiB default.
const MAX_MESSAGE_SIZE: usize = 20 * 1024 * 1024;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(thiserror::Error, Debug)]
pub enum TillerError {
    #[error("{method} failed with {:?}: {}", .status.code(), .status.message())]
    Status {
        method: &'static str,
        #[source]
        status: tonic::Status,
    },
    #[error("invalid backend endpoint: {0}")]
    InvalidEndpoint(#[from] tonic::transport::Error),
    #[error("invalid client version: {0}")]
    InvalidApiVersion(#[from] InvalidMetadataValue),
}

/// Remote interface of the release backend. One call per backend method.
#[async_trait]
pub trait TillerClient: Send + Sync {
    async fn list_releases(
        &self,
        request: ListReleasesRequest,
    ) -> Result<ListReleasesResponse, TillerError>;

    async fn install_release(
        &self,
        request: InstallReleaseRequest,
    ) -> Result<InstallReleaseResponse, TillerError>;

    async fn uninstall_release(
        &self,
        request: UninstallReleaseRequest,
    ) -> Result<UninstallReleaseResponse, TillerError>;

    async fn get_release_content(
        &self,
        request: GetReleaseContentRequest,
    ) -> Result<GetReleaseContentResponse, TillerError>;

    async fn get_release_status(
        &self,
        request: GetReleaseStatusRequest,
    ) -> Result<GetReleaseStatusResponse, TillerError>;

    async fn update_release(
        &self,
        request: UpdateReleaseRequest,
    ) -> Result<UpdateReleaseResponse, TillerError>;

    async fn rollback_release(
        &self,
        request: RollbackReleaseRequest,
    ) -> Result<RollbackReleaseResponse, TillerError>;
}

/// gRPC client for `hapi.services.tiller.ReleaseService`.
///
/// The connection is opened on the first call and re-established by the
/// channel when it drops. No client-side deadline is applied; timeouts travel
/// inside the requests.
#[derive(Clone)]
pub struct GrpcTillerClient {
    channel: Channel,
    api_version: AsciiMetadataValue,
}

impl GrpcTillerClient {
    /// Must be called from within a tokio runtime.
    pub fn new(url: &Url, api_version: &str) -> Result<Self, TillerError> {
        let api_version = api_version.parse()?;
        let channel = Endpoint::from_shared(url.to_string())?
            .connect_timeout(CONNECT_TIMEOUT)
            .connect_lazy();

        Ok(GrpcTillerClient {
            channel,
            api_version,
        })
    }

    fn grpc(&self) -> Grpc<Channel> {
        Grpc::new(self.channel.clone())
            .max_decoding_message_size(MAX_MESSAGE_SIZE)
            .max_encoding_message_size(MAX_MESSAGE_SIZE)
    }

    fn request<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        request
            .metadata_mut()
            .insert(API_VERSION_KEY, self.api_version.clone());
        request
    }

    async fn unary<Req, Res>(
        &self,
        method: &'static str,
        path: &'static str,
        message: Req,
    ) -> Result<Res, TillerError>
    where
        Req: prost::Message + Send + Sync + 'static,
        Res: prost::Message + Default + Send + Sync + 'static,
    {
        tracing::debug!(method, "Calling release backend");
        let mut grpc = self.grpc();
        grpc.ready().await.map_err(|e| not_ready(method, e))?;

        let response = grpc
            .unary(
                self.request(message),
                PathAndQuery::from_static(path),
                ProstCodec::default(),
            )
            .await
            .map_err(|status| TillerError::Status { method, status })?;
        Ok(response.into_inner())
    }
}

fn not_ready(method: &'static str, error: tonic::transport::Error) -> TillerError {
    TillerError::Status {
        method,
        status: tonic::Status::unavailable(format!("backend not ready: {error}")),
    }
}

/// Folds one page of a chunked listing into the pages received so far.
fn merge_page(
    merged: Option<ListReleasesResponse>,
    page: ListReleasesResponse,
) -> ListReleasesResponse {
    match merged {
        None => page,
        Some(mut merged) => {
            merged.releases.extend(page.releases);
            merged
        }
    }
}

#[async_trait]
impl TillerClient for GrpcTillerClient {
    /// The backend splits large listings over several stream messages; they are
    /// merged into one response.
    async fn list_releases(
        &self,
        request: ListReleasesRequest,
    ) -> Result<ListReleasesResponse, TillerError> {
        const METHOD: &str = "ListReleases";
        tracing::debug!(method = METHOD, "Calling release backend");
        let mut grpc = self.grpc();
        grpc.ready().await.map_err(|e| not_ready(METHOD, e))?;

        let mut stream = grpc
            .server_streaming(
                self.request(request),
                PathAndQuery::from_static("/hapi.services.tiller.ReleaseService/ListReleases"),
                ProstCodec::default(),
            )
            .await
            .map_err(|status| TillerError::Status {
                method: METHOD,
                status,
            })?
            .into_inner();

        let mut merged = None;
        while let Some(page) = stream.message().await.map_err(|status| TillerError::Status {
            method: METHOD,
            status,
        })? {
            merged = Some(merge_page(merged, page));
        }
        Ok(merged.unwrap_or_default())
    }

    async fn install_release(
        &self,
        request: InstallReleaseRequest,
    ) -> Result<InstallReleaseResponse, TillerError> {
        self.unary(
            "InstallRelease",
            "/hapi.services.tiller.ReleaseService/InstallRelease",
            request,
        )
        .await
    }

    async fn uninstall_release(
        &self,
        request: UninstallReleaseRequest,
    ) -> Result<UninstallReleaseResponse, TillerError> {
        self.unary(
            "UninstallRelease",
            "/hapi.services.tiller.ReleaseService/UninstallRelease",
            request,
        )
        .await
    }

    async fn get_release_content(
        &self,
        request: GetReleaseContentRequest,
    ) -> Result<GetReleaseContentResponse, TillerError> {
        self.unary(
            "GetReleaseContent",
            "/hapi.services.tiller.ReleaseService/GetReleaseContent",
            request,
        )
        .await
    }

    async fn get_release_status(
        &self,
        request: GetReleaseStatusRequest,
    ) -> Result<GetReleaseStatusResponse, TillerError> {
        self.unary(
            "GetReleaseStatus",
            "/hapi.services.tiller.ReleaseService/GetReleaseStatus",
            request,
        )
        .await
    }

    async fn update_release(
        &self,
        request: UpdateReleaseRequest,
    ) -> Result<UpdateReleaseResponse, TillerError> {
        self.unary(
            "UpdateRelease",
            "/hapi.services.tiller.ReleaseService/UpdateRelease",
            request,
        )
        .await
    }

    async fn rollback_release(
        &self,
        request: RollbackReleaseRequest,
    ) -> Result<RollbackReleaseResponse, TillerError> {
        self.unary(
            "RollbackRelease",
            "/hapi.services.tiller.ReleaseService/RollbackRelease",
            request,
        )
        .await
    }
}
