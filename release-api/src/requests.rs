//! Request bodies accepted by the release endpoints.

use chart_repo::LATEST;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

pub const DEFAULT_NAMESPACE: &str = "default";

/// User supplied chart values, keyed by top-level value name.
pub type Values = Map<String, JsonValue>;

/// Body of `POST /api/v1/releases`.
///
/// Defaults: `namespace=default`, `version=latest`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstallReleaseParams {
    pub name: String,
    pub namespace: String,
    pub repo: String,
    pub chart: String,
    pub version: String,
    pub values: Option<Values>,
    pub wait: bool,
    pub timeout: i64,
}

impl InstallReleaseParams {
    /// Fills in omitted or empty fields. Nothing else is touched.
    pub fn with_defaults(mut self) -> Self {
        if self.namespace.is_empty() {
            self.namespace = DEFAULT_NAMESPACE.to_string();
        }
        if self.version.is_empty() {
            self.version = LATEST.to_string();
        }
        self
    }
}

/// Body of `PUT /api/v1/releases`. Defaults: `version=latest`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateReleaseParams {
    pub name: String,
    pub chart: String,
    pub repo: String,
    pub version: String,
    pub values: Option<Values>,
    pub dry_run: bool,
    pub disable_hooks: bool,
    pub recreate: bool,
    pub timeout: i64,
    pub reset_values: bool,
    pub wait: bool,
    pub reuse_values: bool,
    pub force: bool,
}

impl UpdateReleaseParams {
    pub fn with_defaults(mut self) -> Self {
        if self.version.is_empty() {
            self.version = LATEST.to_string();
        }
        self
    }
}

/// Body of `PUT /api/v1/releases/rollback`. No defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollbackReleaseParams {
    /// The name of the release
    pub name: String,
    /// Run through the rollback without applying it
    pub dry_run: bool,
    /// Skip running hooks for the rollback
    pub disable_hooks: bool,
    /// Version of the release to deploy
    pub version: i32,
    /// Restart pods for resources if applicable
    pub recreate: bool,
    /// Max seconds any kubernetes client command can run
    pub timeout: i64,
    /// Wait until all resources are ready, for at most `timeout`
    pub wait: bool,
    /// Force resource update through delete/recreate if needed
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_defaults() {
        let params: InstallReleaseParams =
            serde_json::from_str(r#"{"name": "x", "chart": "c", "repo": "r"}"#).unwrap();
        let params = params.with_defaults();
        assert_eq!(params.namespace, "default");
        assert_eq!(params.version, "latest");
        assert!(params.values.is_none());

        let params: InstallReleaseParams = serde_json::from_str(
            r#"{"name": "x", "namespace": "", "chart": "c", "repo": "r", "version": ""}"#,
        )
        .unwrap();
        let params = params.with_defaults();
        assert_eq!(params.namespace, "default");
        assert_eq!(params.version, "latest");
    }

    #[test]
    fn install_keeps_explicit_values() {
        let params: InstallReleaseParams = serde_json::from_str(
            r#"{"name": "x", "namespace": "prod", "version": "1.2.3", "wait": true, "timeout": 300}"#,
        )
        .unwrap();
        let params = params.with_defaults();
        assert_eq!(params.namespace, "prod");
        assert_eq!(params.version, "1.2.3");
        assert!(params.wait);
        assert_eq!(params.timeout, 300);
    }

    #[test]
    fn update_fields_are_camel_case() {
        let params: UpdateReleaseParams = serde_json::from_str(
            r#"{"name": "x", "chart": "c", "repo": "r", "dryRun": true, "disableHooks": true,
                "resetValues": true, "reuseValues": true, "force": true}"#,
        )
        .unwrap();
        let params = params.with_defaults();
        assert_eq!(params.version, "latest");
        assert!(params.dry_run);
        assert!(params.disable_hooks);
        assert!(params.reset_values);
        assert!(params.reuse_values);
        assert!(params.force);
        assert!(!params.recreate);
    }

    #[test]
    fn rollback_force_is_its_own_field() {
        let params: RollbackReleaseParams =
            serde_json::from_str(r#"{"name": "x", "version": 2, "wait": false, "force": true}"#)
                .unwrap();
        assert_eq!(params.version, 2);
        assert!(params.force);
        assert!(!params.wait);
    }
}
