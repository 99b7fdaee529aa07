//! Request and response messages of `hapi.services.tiller.ReleaseService`.

use crate::chart::{Chart, Config};
use crate::release::{Info, Release};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SortBy {
    Unknown = 0,
    Name = 1,
    LastReleased = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SortOrder {
    Asc = 0,
    Desc = 1,
}

/// Filters for listing releases. Zero values mean "backend default".
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListReleasesRequest {
    #[prost(int64, tag = "1")]
    pub limit: i64,
    /// Name of the last release seen on the previous page.
    #[prost(string, tag = "2")]
    pub offset: String,
    #[prost(enumeration = "SortBy", tag = "3")]
    pub sort_by: i32,
    /// Regular expression matched against release names by the backend.
    #[prost(string, tag = "4")]
    pub filter: String,
    #[prost(enumeration = "SortOrder", tag = "5")]
    pub sort_order: i32,
    #[prost(enumeration = "crate::release::StatusCode", repeated, tag = "6")]
    pub status_codes: Vec<i32>,
    #[prost(string, tag = "7")]
    pub namespace: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ListReleasesResponse {
    #[prost(int64, tag = "1")]
    pub count: i64,
    #[prost(string, tag = "2")]
    pub next: String,
    #[prost(int64, tag = "3")]
    pub total: i64,
    #[prost(message, repeated, tag = "4")]
    pub releases: Vec<Release>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstallReleaseRequest {
    #[prost(message, optional, tag = "1")]
    pub chart: Option<Chart>,
    #[prost(message, optional, tag = "2")]
    pub values: Option<Config>,
    #[prost(bool, tag = "3")]
    pub dry_run: bool,
    #[prost(string, tag = "4")]
    pub name: String,
    #[prost(bool, tag = "5")]
    pub disable_hooks: bool,
    #[prost(string, tag = "6")]
    pub namespace: String,
    #[prost(bool, tag = "7")]
    pub reuse_name: bool,
    #[prost(int64, tag = "8")]
    pub timeout: i64,
    #[prost(bool, tag = "9")]
    pub wait: bool,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallReleaseResponse {
    #[prost(message, optional, tag = "1")]
    pub release: Option<Release>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UninstallReleaseRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bool, tag = "2")]
    pub disable_hooks: bool,
    #[prost(bool, tag = "3")]
    pub purge: bool,
    #[prost(int64, tag = "4")]
    pub timeout: i64,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct UninstallReleaseResponse {
    #[prost(message, optional, tag = "1")]
    pub release: Option<Release>,
    /// Free-form notes about resources that were kept.
    #[prost(string, tag = "2")]
    pub info: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct GetReleaseContentRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    /// `0` selects the most recent version.
    #[prost(int32, tag = "2")]
    pub version: i32,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct GetReleaseContentResponse {
    #[prost(message, optional, tag = "1")]
    pub release: Option<Release>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct GetReleaseStatusRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(int32, tag = "2")]
    pub version: i32,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct GetReleaseStatusResponse {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub info: Option<Info>,
    #[prost(string, tag = "3")]
    pub namespace: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateReleaseRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub chart: Option<Chart>,
    #[prost(message, optional, tag = "3")]
    pub values: Option<Config>,
    #[prost(bool, tag = "4")]
    pub dry_run: bool,
    #[prost(bool, tag = "5")]
    pub disable_hooks: bool,
    #[prost(bool, tag = "6")]
    pub recreate: bool,
    #[prost(int64, tag = "7")]
    pub timeout: i64,
    #[prost(bool, tag = "8")]
    pub reset_values: bool,
    #[prost(bool, tag = "9")]
    pub wait: bool,
    #[prost(bool, tag = "10")]
    pub reuse_values: bool,
    #[prost(bool, tag = "11")]
    pub force: bool,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateReleaseResponse {
    #[prost(message, optional, tag = "1")]
    pub release: Option<Release>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollbackReleaseRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bool, tag = "2")]
    pub dry_run: bool,
    #[prost(bool, tag = "3")]
    pub disable_hooks: bool,
    #[prost(int32, tag = "4")]
    pub version: i32,
    #[prost(bool, tag = "5")]
    pub recreate: bool,
    #[prost(int64, tag = "6")]
    pub timeout: i64,
    #[prost(bool, tag = "7")]
    pub wait: bool,
    #[prost(bool, tag = "8")]
    pub force: bool,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct RollbackReleaseResponse {
    #[prost(message, optional, tag = "1")]
    pub release: Option<Release>,
}
