use crate::config::Config;
use crate::index::{ChartVersion, IndexFile};
use crate::metrics_defs::{CACHE_HIT, CACHE_MISS};
use crate::{ChartDetails, ChartRepository};
use async_trait::async_trait;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum ChartRepoError {
    #[error("unknown chart repository: {0}")]
    UnknownRepository(String),
    #[error("chart {chart} not found in repository {repo}")]
    ChartNotFound { repo: String, chart: String },
    #[error("version {version} of chart {chart} not found in repository {repo}")]
    VersionNotFound {
        repo: String,
        chart: String,
        version: String,
    },
    #[error("chart {chart}-{version} has no archive URL")]
    NoArchiveUrl { chart: String, version: String },
    #[error("invalid chart name: {0}")]
    InvalidName(String),
    #[error("could not fetch {url}: {source}")]
    Fetch {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not fetch {url}: status {status}")]
    FetchStatus { url: Url, status: StatusCode },
    #[error("could not parse index of repository {repo}: {source}")]
    InvalidIndex {
        repo: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("digest mismatch for {chart}: expected {expected}, got {actual}")]
    DigestMismatch {
        chart: String,
        expected: String,
        actual: String,
    },
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Resolves charts through the `index.yaml` of configured repositories and
/// keeps downloaded archives in a local cache directory.
pub struct IndexChartRepository {
    client: reqwest::Client,
    repositories: HashMap<String, Url>,
    cache_dir: PathBuf,
}

impl IndexChartRepository {
    pub fn new(config: Config) -> Self {
        let repositories = config
            .repositories
            .into_iter()
            .map(|repo| (repo.name, repo.url))
            .collect();

        IndexChartRepository {
            client: reqwest::Client::new(),
            repositories,
            cache_dir: config.cache_dir,
        }
    }

    async fn fetch_index(&self, repo: &str, base_url: &Url) -> Result<IndexFile, ChartRepoError> {
        let url = base_url.join("index.yaml")?;
        let bytes = self.fetch(url).await?;

        IndexFile::parse(&bytes).map_err(|source| ChartRepoError::InvalidIndex {
            repo: repo.to_string(),
            source,
        })
    }

    async fn fetch(&self, url: Url) -> Result<Vec<u8>, ChartRepoError> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(source) => return Err(ChartRepoError::Fetch { url, source }),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ChartRepoError::FetchStatus { url, status });
        }

        match response.bytes().await {
            Ok(bytes) => Ok(bytes.to_vec()),
            Err(source) => Err(ChartRepoError::Fetch { url, source }),
        }
    }

    /// Returns the cached archive for `entry`, downloading it first when missing.
    async fn ensure_cached(
        &self,
        repo: &str,
        base_url: &Url,
        entry: &ChartVersion,
    ) -> Result<PathBuf, ChartRepoError> {
        let file_name = format!("{}-{}.tgz", entry.name, entry.version);
        for component in [repo, file_name.as_str()] {
            if !is_single_component(component) {
                return Err(ChartRepoError::InvalidName(component.to_string()));
            }
        }

        let repo_dir = self.cache_dir.join(repo);
        let path = repo_dir.join(&file_name);
        let expected = entry.digest.as_deref().filter(|d| !d.is_empty());
        match tokio::fs::read(&path).await {
            Ok(cached) if expected.is_none_or(|e| sha256_hex(&cached).eq_ignore_ascii_case(e)) => {
                shared::counter!(CACHE_HIT).increment(1);
                tracing::debug!(path = %path.display(), "Chart archive found in cache");
                return Ok(path);
            }
            Ok(_) => {
                tracing::info!(
                    path = %path.display(),
                    "Cached chart archive does not match index digest, downloading again"
                );
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        shared::counter!(CACHE_MISS).increment(1);

        let archive_url = entry
            .urls
            .first()
            .ok_or_else(|| ChartRepoError::NoArchiveUrl {
                chart: entry.name.clone(),
                version: entry.version.clone(),
            })?;
        let archive_url = base_url.join(archive_url)?;

        tracing::info!(url = %archive_url, "Downloading chart archive");
        let bytes = self.fetch(archive_url).await?;

        if let Some(expected) = expected {
            let actual = sha256_hex(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(ChartRepoError::DigestMismatch {
                    chart: file_name,
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        let dest = path.clone();
        tokio::task::spawn_blocking(move || store_archive(&repo_dir, &dest, &bytes))
            .await
            .map_err(io::Error::other)??;

        Ok(path)
    }
}

#[async_trait]
impl ChartRepository for IndexChartRepository {
    async fn chart_details(
        &self,
        repo: &str,
        chart: &str,
        version: &str,
    ) -> Result<ChartDetails, ChartRepoError> {
        let base_url = self
            .repositories
            .get(repo)
            .map(directory_url)
            .ok_or_else(|| ChartRepoError::UnknownRepository(repo.to_string()))?;

        let index = self.fetch_index(repo, &base_url).await?;
        if !index.has_chart(chart) {
            return Err(ChartRepoError::ChartNotFound {
                repo: repo.to_string(),
                chart: chart.to_string(),
            });
        }

        let entry = index
            .find(chart, version)
            .ok_or_else(|| ChartRepoError::VersionNotFound {
                repo: repo.to_string(),
                chart: chart.to_string(),
                version: version.to_string(),
            })?;

        let chart_file = self.ensure_cached(repo, &base_url, entry).await?;

        Ok(ChartDetails {
            name: entry.name.clone(),
            version: entry.version.clone(),
            app_version: entry.app_version.clone(),
            description: entry.description.clone(),
            digest: entry.digest.clone(),
            chart_file,
        })
    }
}

/// Writes `bytes` to a temp file in `dir` and moves it onto `dest`.
///
/// Every caller gets its own temp file, and the final move replaces `dest` atomically.
fn store_archive(dir: &Path, dest: &Path, bytes: &[u8]) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Ensures the URL ends with a slash so relative joins stay below it.
fn directory_url(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
