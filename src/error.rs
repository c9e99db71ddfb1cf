use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading membership data or building a shape graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("field `{field}` not found (searched: {})", .searched.join(", "))]
    MissingField {
        field: &'static str,
        searched: Vec<String>,
    },

    #[error("label table does not align with membership: {reason}")]
    LabelMismatch { reason: String },

    #[error("unsupported input format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse YAML at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl GraphError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn label_mismatch(reason: impl Into<String>) -> Self {
        Self::LabelMismatch {
            reason: reason.into(),
        }
    }

    /// Returns `true` when the error stems from the data itself rather than the filesystem.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. } | Self::MissingField { .. } | Self::LabelMismatch { .. }
        )
    }
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
