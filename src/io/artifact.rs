use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::warn;

use crate::error::{GraphError, Result};
use crate::graph::GraphArtifact;

/// Serializes the artifact as JSON with `nodes` and `links` as the only keys.
///
/// # Errors
/// Returns the underlying serializer or writer error.
pub fn write_artifact<W: Write>(
    mut writer: W,
    artifact: &GraphArtifact,
    pretty: bool,
) -> serde_json::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, artifact)?;
    } else {
        serde_json::to_writer(&mut writer, artifact)?;
    }
    writer.write_all(b"\n").map_err(serde_json::Error::io)?;
    writer.flush().map_err(serde_json::Error::io)
}

/// Writes the artifact next to `path` and renames it into place.
///
/// The staging file is removed again when writing or renaming fails.
///
/// # Errors
/// Returns [`GraphError::Io`] for filesystem faults and [`GraphError::Json`]
/// when the artifact cannot be serialized.
pub fn save_artifact(path: &Path, artifact: &GraphArtifact, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| GraphError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let staging = path.with_extension("json.partial");
    let result = write_staged(&staging, path, artifact, pretty);
    if result.is_err() && staging.exists() {
        if let Err(error) = fs::remove_file(&staging) {
            warn!(path = %staging.display(), %error, "failed to remove staging file");
        }
    }
    result
}

fn write_staged(staging: &Path, path: &Path, artifact: &GraphArtifact, pretty: bool) -> Result<()> {
    let file = fs::File::create(staging).map_err(|source| GraphError::Io {
        path: staging.to_path_buf(),
        source,
    })?;
    write_artifact(BufWriter::new(file), artifact, pretty).map_err(|source| {
        if source.is_io() {
            GraphError::Io {
                path: staging.to_path_buf(),
                source: source.into(),
            }
        } else {
            GraphError::Json {
                path: staging.to_path_buf(),
                source,
            }
        }
    })?;
    fs::rename(staging, path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// # Errors
/// Returns [`GraphError::Io`] or [`GraphError::Json`].
pub fn load_artifact(path: &Path) -> Result<GraphArtifact> {
    let contents = super::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| GraphError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MembershipMatrix, build};

    fn sample_artifact() -> GraphArtifact {
        build(
            &MembershipMatrix::from_rows(&[vec![1.0, 1.0], vec![0.0, 1.0], vec![0.0, 0.0]])
                .unwrap(),
        )
    }

    #[test]
    fn writes_compact_json_line() {
        let mut buffer = Vec::new();
        write_artifact(&mut buffer, &sample_artifact(), false).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "{\"nodes\":{\"0\":[0,1],\"1\":[1],\"2\":[]},\"links\":{\"0\":[1],\"1\":[],\"2\":[]}}\n"
        );
    }

    #[test]
    fn pretty_output_parses_back() {
        let mut buffer = Vec::new();
        write_artifact(&mut buffer, &sample_artifact(), true).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("\n  \"nodes\""));
        let parsed: GraphArtifact = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, sample_artifact());
    }

    #[test]
    fn save_then_load_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/graph.json");

        save_artifact(&path, &sample_artifact(), false).unwrap();

        assert_eq!(load_artifact(&path).unwrap(), sample_artifact());
        assert!(!path.with_extension("json.partial").exists());
    }

    #[test]
    fn failed_rename_reports_io_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        fs::create_dir(&path).unwrap();

        let error = save_artifact(&path, &sample_artifact(), false).unwrap_err();

        match error {
            GraphError::Io { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("expected Io error, got {other:?}"),
        }
        assert!(!path.with_extension("json.partial").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn writer_fault_is_an_io_error() {
        struct FullDisk;

        impl Write for FullDisk {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let error = write_artifact(FullDisk, &sample_artifact(), false).unwrap_err();
        assert!(error.is_io());
        assert_eq!(
            std::io::Error::from(error).kind(),
            std::io::ErrorKind::StorageFull
        );
    }

    #[test]
    fn load_rejects_foreign_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(&path, r#"{"nodes": [1, 2]}"#).unwrap();
        assert!(matches!(load_artifact(&path), Err(GraphError::Json { .. })));
    }
}
