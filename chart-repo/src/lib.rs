pub mod archive;
pub mod config;
pub mod index;
pub mod metrics_defs;
pub mod repository;

pub use archive::{ChartLoadError, load_archive, load_archive_bytes};
pub use index::LATEST;
pub use repository::{ChartRepoError, IndexChartRepository};

use async_trait::async_trait;
use std::path::PathBuf;
use tiller_client::chart::Chart;

/// A chart reference resolved to a loadable archive.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartDetails {
    pub name: String,
    /// Concrete version, never the `latest` sentinel.
    pub version: String,
    pub app_version: String,
    pub description: String,
    pub digest: Option<String>,
    /// Local path of the packaged archive.
    pub chart_file: PathBuf,
}

/// Resolves `(repo, chart, version)` references to chart archives.
#[async_trait]
pub trait ChartRepository: Send + Sync {
    async fn chart_details(
        &self,
        repo: &str,
        chart: &str,
        version: &str,
    ) -> Result<ChartDetails, ChartRepoError>;

    /// Loads the archive behind `details` into memory.
    async fn load_chart(&self, details: &ChartDetails) -> Result<Chart, ChartLoadError> {
        let path = details.chart_file.clone();
        tokio::task::spawn_blocking(move || load_archive(&path))
            .await
            .map_err(|e| ChartLoadError::Io(std::io::Error::other(e)))?
    }
}
