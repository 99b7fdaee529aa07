//! Chart repository index (`index.yaml`) parsing and version selection.

use semver::Version;
use serde::Deserialize;
use std::collections::HashMap;

/// Version sentinel selecting the newest stable version in the index.
pub const LATEST: &str = "latest";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexFile {
    pub api_version: String,
    pub entries: HashMap<String, Vec<ChartVersion>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartVersion {
    pub name: String,
    pub version: String,
    pub app_version: String,
    pub description: String,
    /// Archive locations, absolute or relative to the repository URL.
    pub urls: Vec<String>,
    /// Hex-encoded SHA-256 of the archive.
    pub digest: Option<String>,
    pub created: Option<String>,
}

impl IndexFile {
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_slice(bytes)
    }

    pub fn has_chart(&self, chart: &str) -> bool {
        self.entries.contains_key(chart)
    }

    /// Finds `version` of `chart`.
    ///
    /// `latest` picks the highest semantic version without a pre-release tag.
    /// Entries whose version does not parse as semver are never picked for it.
    pub fn find(&self, chart: &str, version: &str) -> Option<&ChartVersion> {
        let versions = self.entries.get(chart)?;

        if version == LATEST {
            return versions
                .iter()
                .filter_map(|entry| {
                    let parsed = Version::parse(entry.version.trim_start_matches('v')).ok()?;
                    parsed.pre.is_empty().then_some((parsed, entry))
                })
                .max_by(|(a, _), (b, _)| a.cmp(b))
                .map(|(_, entry)| entry);
        }

        versions.iter().find(|entry| entry.version == version)
    }
}
