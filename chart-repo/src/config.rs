use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Repository {
    pub name: String,
    /// Base URL serving `index.yaml`.
    pub url: Url,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Config {
    /// Downloaded archives are kept under `{cache_dir}/{repo}/`.
    pub cache_dir: PathBuf,
    #[serde(default)]
    pub repositories: Vec<Repository>,
}
