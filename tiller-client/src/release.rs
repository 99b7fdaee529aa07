//! Release records as reported by the backend (`hapi.release`).

use crate::chart::{Chart, Config};
use serde::{Deserialize, Serialize};

/// Deployment state of a release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum StatusCode {
    Unknown = 0,
    Deployed = 1,
    Deleted = 2,
    Superseded = 3,
    Failed = 4,
    Deleting = 5,
    PendingInstall = 6,
    PendingUpgrade = 7,
    PendingRollback = 8,
}

/// Lifecycle event a hook is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum HookEvent {
    Unknown = 0,
    PreInstall = 1,
    PostInstall = 2,
    PreDelete = 3,
    PostDelete = 4,
    PreUpgrade = 5,
    PostUpgrade = 6,
    PreRollback = 7,
    PostRollback = 8,
    ReleaseTestSuccess = 9,
    ReleaseTestFailure = 10,
    CrdInstall = 11,
}

/// Wire-compatible with `google.protobuf.Timestamp`.
#[derive(Clone, Copy, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Timestamp {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    #[prost(enumeration = "StatusCode", tag = "1")]
    pub code: i32,
    /// Rendered status of the Kubernetes resources owned by the release.
    #[prost(string, tag = "3")]
    pub resources: String,
    #[prost(string, tag = "4")]
    pub notes: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Info {
    #[prost(message, optional, tag = "1")]
    pub status: Option<Status>,
    #[prost(message, optional, tag = "2")]
    pub first_deployed: Option<Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub last_deployed: Option<Timestamp>,
    #[prost(message, optional, tag = "4")]
    pub deleted: Option<Timestamp>,
    #[prost(string, tag = "5")]
    pub description: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Hook {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub kind: String,
    #[prost(string, tag = "3")]
    pub path: String,
    #[prost(string, tag = "4")]
    pub manifest: String,
    #[prost(enumeration = "HookEvent", repeated, tag = "5")]
    pub events: Vec<i32>,
    #[prost(message, optional, tag = "6")]
    pub last_run: Option<Timestamp>,
    #[prost(int32, tag = "7")]
    pub weight: i32,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub info: Option<Info>,
    #[prost(message, optional, tag = "3")]
    pub chart: Option<Chart>,
    #[prost(message, optional, tag = "4")]
    pub config: Option<Config>,
    #[prost(string, tag = "5")]
    pub manifest: String,
    #[prost(message, repeated, tag = "6")]
    pub hooks: Vec<Hook>,
    #[prost(int32, tag = "7")]
    pub version: i32,
    #[prost(string, tag = "8")]
    pub namespace: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn release_field_numbers() {
        let release = Release {
            name: "web".into(),
            version: 3,
            ..Default::default()
        };
        // name = 1 (length delimited), version = 7 (varint)
        assert_eq!(
            release.encode_to_vec(),
            vec![0x0a, 3, b'w', b'e', b'b', 0x38, 3]
        );
    }

    #[test]
    fn status_decodes_from_backend_bytes() {
        // code = FAILED, notes = "x"
        let status = Status::decode([0x08, 4, 0x22, 1, b'x'].as_slice()).unwrap();
        assert_eq!(status.code(), StatusCode::Failed);
        assert_eq!(status.notes, "x");
        assert!(status.resources.is_empty());
    }

    #[test]
    fn unknown_status_code_reads_as_default() {
        let status = Status {
            code: 42,
            ..Default::default()
        };
        assert_eq!(status.code(), StatusCode::Unknown);
        assert_eq!(StatusCode::default(), StatusCode::Unknown);
    }

    #[test]
    fn hook_events_use_enum_values() {
        let mut hook = Hook::default();
        hook.push_events(HookEvent::PreInstall);
        hook.push_events(HookEvent::PostUpgrade);
        assert_eq!(hook.events, vec![1, 6]);
        assert_eq!(
            hook.events().collect::<Vec<_>>(),
            vec![HookEvent::PreInstall, HookEvent::PostUpgrade]
        );
    }
}
