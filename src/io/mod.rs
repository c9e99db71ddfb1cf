//! File-facing adapters around the pure graph builder.

pub mod artifact;
pub mod labels;
pub mod result;

use std::fs;
use std::path::Path;

use crate::error::{GraphError, Result};

/// Serialization formats accepted for upstream result files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Json,
    Yaml,
}

impl Format {
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(GraphError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

pub(crate) fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })
}
