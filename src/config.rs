use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::graph::{GraphBuilder, LinkMode};
use crate::io::labels::Delimiter;
use crate::io::result::ResultKey;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings at {path}: {source}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Command-line options. Every flag can also come from the environment.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Mapper result file (.json, .yaml or .yml)
    #[arg(long, env = "SHAPE_GRAPH_INPUT")]
    pub input: PathBuf,

    /// One-hot label table checked for row alignment with the samples
    #[arg(long, env = "SHAPE_GRAPH_LABELS")]
    pub labels: Option<PathBuf>,

    /// Cell separator of the label table
    #[arg(long, env = "SHAPE_GRAPH_LABEL_DELIMITER", value_enum, default_value_t = Delimiter::Tab)]
    pub label_delimiter: Delimiter,

    /// Artifact destination; stdout when omitted
    #[arg(long, short, env = "SHAPE_GRAPH_OUTPUT")]
    pub output: Option<PathBuf>,

    /// How edges are listed under `links`
    #[arg(long, env = "SHAPE_GRAPH_LINK_MODE", value_enum)]
    pub link_mode: Option<LinkMode>,

    /// Envelopes searched for `clusterBins`, in order
    #[arg(long, env = "SHAPE_GRAPH_RESULT_KEYS", value_enum, value_delimiter = ',')]
    pub result_keys: Vec<ResultKey>,

    /// Compute co-membership with a sparse product (`--sparse=false` to turn it off)
    #[arg(
        long,
        env = "SHAPE_GRAPH_SPARSE",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub sparse: Option<bool>,

    /// Directory for content-addressed artifact caching
    #[arg(long, env = "SHAPE_GRAPH_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// YAML settings file; flags take precedence over its values
    #[arg(long, env = "SHAPE_GRAPH_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Pretty-print the artifact JSON
    #[arg(long)]
    pub pretty: bool,
}

/// Overrides loaded from a YAML settings file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Settings {
    pub result_keys: Option<Vec<ResultKey>>,
    pub link_mode: Option<LinkMode>,
    pub sparse_product: Option<bool>,
    pub cache_dir: Option<PathBuf>,
}

impl Settings {
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Deserialize {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved options for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub input: PathBuf,
    pub labels: Option<PathBuf>,
    pub label_delimiter: Delimiter,
    pub output: Option<PathBuf>,
    pub result_keys: Vec<ResultKey>,
    pub builder: GraphBuilder,
    pub cache_dir: Option<PathBuf>,
    pub pretty: bool,
}

impl Config {
    /// Merges flags with the optional settings file.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the settings file is unreadable or the
    /// resulting envelope list is empty.
    pub fn resolve(self) -> Result<RunPlan, ConfigError> {
        let settings = match &self.settings {
            Some(path) => Settings::load_from_path(path)?,
            None => Settings::default(),
        };

        let result_keys = if self.result_keys.is_empty() {
            settings
                .result_keys
                .unwrap_or_else(|| ResultKey::DEFAULT_ORDER.to_vec())
        } else {
            self.result_keys
        };
        if result_keys.is_empty() {
            return Err(ConfigError::Invalid {
                name: "result_keys",
                reason: "at least one envelope is required".to_string(),
            });
        }

        let link_mode = self.link_mode.or(settings.link_mode).unwrap_or_default();
        let sparse_product = self.sparse.or(settings.sparse_product).unwrap_or(false);
        let builder = GraphBuilder::new()
            .with_link_mode(link_mode)
            .with_sparse_product(sparse_product);

        Ok(RunPlan {
            input: self.input,
            labels: self.labels,
            label_delimiter: self.label_delimiter,
            output: self.output,
            result_keys,
            builder,
            cache_dir: self.cache_dir.or(settings.cache_dir),
            pretty: self.pretty,
        })
    }
}
