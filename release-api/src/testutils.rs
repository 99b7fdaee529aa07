use async_trait::async_trait;
use chart_repo::{ChartDetails, ChartLoadError, ChartRepoError, ChartRepository, LATEST};
use std::path::PathBuf;
use std::sync::Mutex;
use tiller_client::chart::{Chart, Metadata};
use tiller_client::release::{Info, Release, Status, StatusCode};
use tiller_client::services::{
    GetReleaseContentRequest, GetReleaseContentResponse, GetReleaseStatusRequest,
    GetReleaseStatusResponse, InstallReleaseRequest, InstallReleaseResponse, ListReleasesRequest,
    ListReleasesResponse, RollbackReleaseRequest, RollbackReleaseResponse,
    UninstallReleaseRequest, UninstallReleaseResponse, UpdateReleaseRequest,
    UpdateReleaseResponse,
};
use tiller_client::{TillerClient, TillerError};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(ListReleasesRequest),
    Install(InstallReleaseRequest),
    Uninstall(UninstallReleaseRequest),
    GetContent(GetReleaseContentRequest),
    GetStatus(GetReleaseStatusRequest),
    Update(UpdateReleaseRequest),
    Rollback(RollbackReleaseRequest),
}

/// Records every call and answers with canned releases.
#[derive(Default)]
pub struct FakeTiller {
    calls: Mutex<Vec<Call>>,
    failing: Vec<&'static str>,
}

impl FakeTiller {
    /// Fails the named backend methods with `503`.
    pub fn failing(methods: &[&'static str]) -> Self {
        FakeTiller {
            failing: methods.to_vec(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, call: Call) -> Result<(), TillerError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.contains(&method) {
            return Err(TillerError::Status {
                method,
                status: tonic::Status::unavailable("tiller unavailable"),
            });
        }
        Ok(())
    }
}

pub fn release(name: &str, version: i32) -> Release {
    Release {
        name: name.to_string(),
        version,
        namespace: "default".into(),
        info: Some(Info {
            status: Some(Status {
                code: StatusCode::Deployed.into(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[async_trait]
impl TillerClient for FakeTiller {
    async fn list_releases(
        &self,
        request: ListReleasesRequest,
    ) -> Result<ListReleasesResponse, TillerError> {
        self.record("ListReleases", Call::List(request))?;
        Ok(ListReleasesResponse {
            count: 1,
            total: 1,
            releases: vec![release("web", 1)],
            ..Default::default()
        })
    }

    async fn install_release(
        &self,
        request: InstallReleaseRequest,
    ) -> Result<InstallReleaseResponse, TillerError> {
        let name = request.name.clone();
        self.record("InstallRelease", Call::Install(request))?;
        Ok(InstallReleaseResponse {
            release: Some(release(&name, 1)),
        })
    }

    async fn uninstall_release(
        &self,
        request: UninstallReleaseRequest,
    ) -> Result<UninstallReleaseResponse, TillerError> {
        let name = request.name.clone();
        self.record("UninstallRelease", Call::Uninstall(request))?;
        Ok(UninstallReleaseResponse {
            release: Some(release(&name, 1)),
            info: String::new(),
        })
    }

    async fn get_release_content(
        &self,
        request: GetReleaseContentRequest,
    ) -> Result<GetReleaseContentResponse, TillerError> {
        let (name, version) = (request.name.clone(), request.version);
        self.record("GetReleaseContent", Call::GetContent(request))?;
        Ok(GetReleaseContentResponse {
            release: Some(release(&name, version)),
        })
    }

    async fn get_release_status(
        &self,
        request: GetReleaseStatusRequest,
    ) -> Result<GetReleaseStatusResponse, TillerError> {
        let name = request.name.clone();
        self.record("GetReleaseStatus", Call::GetStatus(request))?;
        Ok(GetReleaseStatusResponse {
            name,
            info: release("", 0).info,
            namespace: "default".into(),
        })
    }

    async fn update_release(
        &self,
        request: UpdateReleaseRequest,
    ) -> Result<UpdateReleaseResponse, TillerError> {
        let name = request.name.clone();
        self.record("UpdateRelease", Call::Update(request))?;
        Ok(UpdateReleaseResponse {
            release: Some(release(&name, 2)),
        })
    }

    async fn rollback_release(
        &self,
        request: RollbackReleaseRequest,
    ) -> Result<RollbackReleaseResponse, TillerError> {
        let (name, version) = (request.name.clone(), request.version);
        self.record("RollbackRelease", Call::Rollback(request))?;
        Ok(RollbackReleaseResponse {
            release: Some(release(&name, version)),
        })
    }
}

/// Resolves any chart reference without touching the network.
#[derive(Default)]
pub struct FakeCharts {
    resolved: Mutex<Vec<(String, String, String)>>,
    known_repos: Option<Vec<String>>,
    unloadable: bool,
}

impl FakeCharts {
    pub fn with_known_repos(repos: &[&str]) -> Self {
        FakeCharts {
            known_repos: Some(repos.iter().map(|r| r.to_string()).collect()),
            ..Default::default()
        }
    }

    /// Resolves references but fails to load any archive.
    pub fn unloadable() -> Self {
        FakeCharts {
            unloadable: true,
            ..Default::default()
        }
    }

    pub fn resolved(&self) -> Vec<(String, String, String)> {
        self.resolved.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChartRepository for FakeCharts {
    async fn chart_details(
        &self,
        repo: &str,
        chart: &str,
        version: &str,
    ) -> Result<ChartDetails, ChartRepoError> {
        self.resolved
            .lock()
            .unwrap()
            .push((repo.to_string(), chart.to_string(), version.to_string()));

        if let Some(known) = &self.known_repos
            && !known.iter().any(|r| r == repo)
        {
            return Err(ChartRepoError::UnknownRepository(repo.to_string()));
        }

        let version = if version == LATEST { "1.0.0" } else { version };
        Ok(ChartDetails {
            name: chart.to_string(),
            version: version.to_string(),
            app_version: String::new(),
            description: String::new(),
            digest: None,
            chart_file: PathBuf::from(format!("/nonexistent/{repo}/{chart}-{version}.tgz")),
        })
    }

    async fn load_chart(&self, details: &ChartDetails) -> Result<Chart, ChartLoadError> {
        if self.unloadable {
            return Err(ChartLoadError::MissingChartYaml);
        }
        Ok(Chart {
            metadata: Some(Metadata {
                name: details.name.clone(),
                version: details.version.clone(),
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}
