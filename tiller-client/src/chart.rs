//! In-memory chart representation sent to the backend on install and update.
//!
//! Field numbers follow the `hapi.chart` protobuf package.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A chart loaded from a packaged archive, including its sub-charts.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chart {
    /// Contents of `Chart.yaml`.
    #[prost(message, optional, tag = "1")]
    pub metadata: Option<Metadata>,
    /// Files under `templates/`.
    #[prost(message, repeated, tag = "2")]
    pub templates: Vec<Template>,
    /// Sub-charts found under `charts/`.
    #[prost(message, repeated, tag = "3")]
    pub dependencies: Vec<Chart>,
    /// Default values shipped with the chart (`values.yaml`).
    #[prost(message, optional, tag = "4")]
    pub values: Option<Config>,
    /// Every other file in the archive.
    #[prost(message, repeated, tag = "5")]
    pub files: Vec<Any>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub home: String,
    #[prost(string, repeated, tag = "3")]
    pub sources: Vec<String>,
    #[prost(string, tag = "4")]
    pub version: String,
    #[prost(string, tag = "5")]
    pub description: String,
    #[prost(string, repeated, tag = "6")]
    pub keywords: Vec<String>,
    #[prost(message, repeated, tag = "7")]
    pub maintainers: Vec<Maintainer>,
    #[prost(string, tag = "8")]
    pub engine: String,
    #[prost(string, tag = "9")]
    pub icon: String,
    #[prost(string, tag = "10")]
    pub api_version: String,
    #[prost(string, tag = "11")]
    pub condition: String,
    #[prost(string, tag = "12")]
    pub tags: String,
    #[prost(string, tag = "13")]
    pub app_version: String,
    #[prost(bool, tag = "14")]
    pub deprecated: bool,
    #[prost(string, tag = "15")]
    pub tiller_version: String,
    #[prost(btree_map = "string, string", tag = "16")]
    pub annotations: BTreeMap<String, String>,
    #[prost(string, tag = "17")]
    pub kube_version: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Maintainer {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(string, tag = "3")]
    pub url: String,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    /// Path of the template relative to the chart root, e.g. `templates/deployment.yaml`.
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "crate::base64_bytes")]
    pub data: Vec<u8>,
}

/// Values handed to the backend: the raw YAML document plus a flat overlay.
///
/// The backend merges `raw` first and then applies `values` key by key, so
/// both must be populated from the same source map.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[prost(string, tag = "1")]
    pub raw: String,
    #[prost(map = "string, message", tag = "2")]
    pub values: HashMap<String, Value>,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Value {
    #[prost(string, tag = "1")]
    pub value: String,
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value { value }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value {
            value: value.to_string(),
        }
    }
}

/// An arbitrary file carried along with the chart (`google.protobuf.Any`).
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Any {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(with = "crate::base64_bytes")]
    pub value: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn template_field_numbers() {
        let template = Template {
            name: "t".into(),
            data: b"ab".to_vec(),
        };
        // name = 1 (length delimited), data = 2 (length delimited)
        assert_eq!(
            template.encode_to_vec(),
            vec![0x0a, 1, b't', 0x12, 2, b'a', b'b']
        );
    }

    #[test]
    fn chart_survives_wire_encoding() {
        let chart = Chart {
            metadata: Some(Metadata {
                name: "web".into(),
                version: "0.2.0".into(),
                app_version: "1.4".into(),
                annotations: BTreeMap::from([("team".to_string(), "core".to_string())]),
                ..Default::default()
            }),
            templates: vec![Template {
                name: "templates/cm.yaml".into(),
                data: b"kind: ConfigMap".to_vec(),
            }],
            dependencies: vec![Chart {
                metadata: Some(Metadata {
                    name: "db".into(),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            values: Some(Config {
                raw: "replicas: 2\n".into(),
                values: HashMap::from([("replicas".to_string(), Value::from("2"))]),
            }),
            files: vec![Any {
                type_url: "README.md".into(),
                value: b"# web".to_vec(),
            }],
        };

        let decoded = Chart::decode(chart.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, chart);
    }
}
