//! Loads packaged chart archives (`.tgz`) into the in-memory chart representation.

use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tiller_client::chart::{Any, Chart, Config, Metadata, Template};

#[derive(thiserror::Error, Debug)]
pub enum ChartLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("chart metadata (Chart.yaml) missing")]
    MissingChartYaml,
    #[error("could not parse Chart.yaml: {0}")]
    InvalidChartYaml(#[from] serde_yaml::Error),
    #[error("no files in chart archive")]
    EmptyArchive,
}

/// Loads a chart from a gzipped tarball on disk.
pub fn load_archive(path: &Path) -> Result<Chart, ChartLoadError> {
    let file = File::open(path)?;
    load_archive_reader(BufReader::new(file))
}

/// Loads a chart from an in-memory gzipped tarball.
pub fn load_archive_bytes(bytes: &[u8]) -> Result<Chart, ChartLoadError> {
    load_archive_reader(bytes)
}

fn load_archive_reader<R: Read>(reader: R) -> Result<Chart, ChartLoadError> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    let mut files = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry.path()?.to_string_lossy().replace('\\', "/");
        // Archives hold a single top-level directory named after the chart.
        let Some((_, relative)) = path.split_once('/') else {
            continue;
        };
        if relative.is_empty() {
            continue;
        }

        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        files.push((relative.to_string(), data));
    }

    if files.is_empty() {
        return Err(ChartLoadError::EmptyArchive);
    }
    load_files(files)
}

fn load_files(files: Vec<(String, Vec<u8>)>) -> Result<Chart, ChartLoadError> {
    let mut chart = Chart::default();
    let mut unpacked_subcharts: BTreeMap<String, Vec<(String, Vec<u8>)>> = BTreeMap::new();

    for (name, data) in files {
        if name == "Chart.yaml" {
            chart.metadata = Some(serde_yaml::from_slice::<Metadata>(&data)?);
        } else if name == "values.yaml" {
            chart.values = Some(Config {
                raw: String::from_utf8_lossy(&data).into_owned(),
                ..Default::default()
            });
        } else if name.starts_with("templates/") {
            chart.templates.push(Template { name, data });
        } else if let Some(rest) = name.strip_prefix("charts/") {
            match rest.split_once('/') {
                Some((subchart, path)) => unpacked_subcharts
                    .entry(subchart.to_string())
                    .or_default()
                    .push((path.to_string(), data)),
                None if rest.ends_with(".tgz") => {
                    chart.dependencies.push(load_archive_bytes(&data)?);
                }
                None => chart.files.push(Any {
                    type_url: name,
                    value: data,
                }),
            }
        } else {
            chart.files.push(Any {
                type_url: name,
                value: data,
            });
        }
    }

    for (_, files) in unpacked_subcharts {
        chart.dependencies.push(load_files(files)?);
    }

    if chart.metadata.is_none() {
        return Err(ChartLoadError::MissingChartYaml);
    }
    Ok(chart)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    /// Builds a gzipped tarball from `(path, contents)` pairs.
    pub(crate) fn build_archive<C: AsRef<[u8]>>(files: &[(&str, C)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (path, contents) in files {
            let contents: &[u8] = contents.as_ref();
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, contents).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_load_archive() {
        let bytes = build_archive(&[
            (
                "web/Chart.yaml",
                "apiVersion: v1\nname: web\nversion: 0.3.1\nappVersion: \"2.0\"\n",
            ),
            ("web/values.yaml", "replicas: 2\n"),
            ("web/templates/deployment.yaml", "kind: Deployment\n"),
            ("web/templates/_helpers.tpl", "{{/* helpers */}}\n"),
            ("web/charts/db/Chart.yaml", "name: db\nversion: 9.0.0\n"),
            ("web/charts/db/templates/sts.yaml", "kind: StatefulSet\n"),
            ("web/README.md", "# web\n"),
        ]);

        let chart = load_archive_bytes(&bytes).unwrap();

        let metadata = chart.metadata.as_ref().unwrap();
        assert_eq!(metadata.name, "web");
        assert_eq!(metadata.version, "0.3.1");
        assert_eq!(metadata.app_version, "2.0");
        assert_eq!(chart.values.as_ref().unwrap().raw, "replicas: 2\n");
        assert_eq!(chart.templates.len(), 2);
        assert_eq!(chart.templates[0].name, "templates/deployment.yaml");
        assert_eq!(chart.templates[0].data, b"kind: Deployment\n");
        assert_eq!(chart.files.len(), 1);
        assert_eq!(chart.files[0].type_url, "README.md");

        assert_eq!(chart.dependencies.len(), 1);
        let db = &chart.dependencies[0];
        assert_eq!(db.metadata.as_ref().unwrap().name, "db");
        assert_eq!(db.templates[0].name, "templates/sts.yaml");
    }

    #[test]
    fn test_load_packed_subchart() {
        let redis = build_archive(&[("redis/Chart.yaml", "name: redis\nversion: 1.2.0\n")]);

        let bytes = build_archive(&[
            ("web/Chart.yaml", b"name: web\nversion: 0.1.0\n".to_vec()),
            ("web/charts/redis-1.2.0.tgz", redis),
        ]);

        let chart = load_archive_bytes(&bytes).unwrap();
        assert_eq!(chart.dependencies.len(), 1);
        assert_eq!(
            chart.dependencies[0].metadata.as_ref().unwrap().version,
            "1.2.0"
        );
    }

    #[test]
    fn test_missing_chart_yaml() {
        let bytes = build_archive(&[("web/values.yaml", "a: 1\n")]);
        assert!(matches!(
            load_archive_bytes(&bytes),
            Err(ChartLoadError::MissingChartYaml)
        ));
    }

    #[test]
    fn test_empty_archive() {
        let bytes = build_archive::<&str>(&[]);
        assert!(matches!(
            load_archive_bytes(&bytes),
            Err(ChartLoadError::EmptyArchive)
        ));
    }

    #[test]
    fn test_load_archive_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web-0.1.0.tgz");
        std::fs::write(&path, build_archive(&[("web/Chart.yaml", "name: web\n")])).unwrap();

        let chart = load_archive(&path).unwrap();
        assert_eq!(chart.metadata.unwrap().name, "web");
    }
}
