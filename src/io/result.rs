//! Upstream mapper result files.
//!
//! Result files wrap the membership matrix (`clusterBins`) in one of several
//! envelopes depending on the tool that saved them. Candidates are tried in a
//! fixed order and the first one carrying `clusterBins` wins.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Format, read_to_string};
use crate::error::{GraphError, Result};
use crate::graph::MembershipMatrix;

/// Envelope that may carry the mapper result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResultKey {
    /// `{"res": {...}}`
    Res,
    /// `{"var": {...}}`
    Var,
    /// Fields stored directly at the top level.
    Root,
}

impl ResultKey {
    pub const DEFAULT_ORDER: [ResultKey; 3] = [ResultKey::Res, ResultKey::Var, ResultKey::Root];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Res => "res",
            Self::Var => "var",
            Self::Root => "root",
        }
    }
}

/// Membership matrix as stored on disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MembershipPayload {
    Dense(Vec<Vec<f64>>),
    Sparse(SparseMembership),
}

/// Coordinate-format membership.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SparseMembership {
    pub shape: [usize; 2],
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    #[serde(default)]
    pub values: Option<Vec<f64>>,
}

impl MembershipPayload {
    /// # Errors
    /// Returns [`GraphError::MalformedInput`] when the payload is not rectangular
    /// or has invalid coordinates.
    pub fn to_membership(&self) -> Result<MembershipMatrix> {
        match self {
            Self::Dense(rows) => MembershipMatrix::from_rows(rows),
            Self::Sparse(sparse) => MembershipMatrix::from_triplets(
                (sparse.shape[0], sparse.shape[1]),
                &sparse.rows,
                &sparse.cols,
                sparse.values.as_deref(),
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MapperResult {
    #[serde(rename = "clusterBins", alias = "cluster_bins", default)]
    pub cluster_bins: Option<MembershipPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultFile {
    #[serde(default)]
    pub res: Option<MapperResult>,
    #[serde(default)]
    pub var: Option<MapperResult>,
    #[serde(flatten)]
    pub root: MapperResult,
}

impl ResultFile {
    /// Parses a result file, picking JSON or YAML from the extension.
    ///
    /// # Errors
    /// Returns an I/O, format or parse error.
    pub fn load(path: &Path) -> Result<Self> {
        let format = Format::from_path(path)?;
        let contents = read_to_string(path)?;
        match format {
            Format::Json => serde_json::from_str(&contents).map_err(|source| GraphError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Format::Yaml => serde_yaml::from_str(&contents).map_err(|source| GraphError::Yaml {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn candidate(&self, key: ResultKey) -> Option<&MapperResult> {
        match key {
            ResultKey::Res => self.res.as_ref(),
            ResultKey::Var => self.var.as_ref(),
            ResultKey::Root => Some(&self.root),
        }
    }

    /// Returns the first `clusterBins` found while walking `order`.
    ///
    /// # Errors
    /// Returns [`GraphError::MissingField`] when no candidate carries it.
    pub fn resolve(&self, order: &[ResultKey]) -> Result<(ResultKey, &MembershipPayload)> {
        order
            .iter()
            .find_map(|&key| {
                self.candidate(key)
                    .and_then(|result| result.cluster_bins.as_ref())
                    .map(|payload| (key, payload))
            })
            .ok_or_else(|| GraphError::MissingField {
                field: "clusterBins",
                searched: order.iter().map(|key| key.as_str().to_string()).collect(),
            })
    }
}

/// Loads the membership matrix from a result file.
///
/// # Errors
/// Propagates load, resolution and shape errors.
pub fn load_membership(path: &Path, order: &[ResultKey]) -> Result<MembershipMatrix> {
    let file = ResultFile::load(path)?;
    let (key, payload) = file.resolve(order)?;
    let membership = payload.to_membership()?;
    debug!(
        path = %path.display(),
        envelope = key.as_str(),
        nodes = membership.num_nodes(),
        samples = membership.num_samples(),
        "membership loaded"
    );
    Ok(membership)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse_json(raw: &str) -> ResultFile {
        serde_json::from_str(raw).expect("valid result json")
    }

    #[test]
    fn prefers_res_over_var_and_root() {
        let file = parse_json(
            r#"{
                "res": {"clusterBins": [[1, 0]]},
                "var": {"clusterBins": [[0, 1]]},
                "clusterBins": [[1, 1]]
            }"#,
        );
        let (key, payload) = file.resolve(&ResultKey::DEFAULT_ORDER).unwrap();
        assert_eq!(key, ResultKey::Res);
        assert_eq!(payload, &MembershipPayload::Dense(vec![vec![1.0, 0.0]]));
    }

    #[test]
    fn falls_back_to_var_then_root() {
        let file = parse_json(r#"{"var": {"clusterBins": [[0, 1]]}, "clusterBins": [[1, 1]]}"#);
        let (key, _) = file.resolve(&ResultKey::DEFAULT_ORDER).unwrap();
        assert_eq!(key, ResultKey::Var);

        let file = parse_json(r#"{"res": {}, "clusterBins": [[1, 1]]}"#);
        let (key, payload) = file.resolve(&ResultKey::DEFAULT_ORDER).unwrap();
        assert_eq!(key, ResultKey::Root);
        assert_eq!(payload, &MembershipPayload::Dense(vec![vec![1.0, 1.0]]));
    }

    #[test]
    fn custom_order_is_respected() {
        let file = parse_json(
            r#"{"res": {"clusterBins": [[1]]}, "var": {"clusterBins": [[0]]}}"#,
        );
        let (key, _) = file.resolve(&[ResultKey::Var, ResultKey::Res]).unwrap();
        assert_eq!(key, ResultKey::Var);
    }

    #[test]
    fn missing_cluster_bins_lists_searched_envelopes() {
        let file = parse_json(r#"{"res": {"other": 1}}"#);
        let error = file.resolve(&ResultKey::DEFAULT_ORDER).unwrap_err();
        match error {
            GraphError::MissingField { field, searched } => {
                assert_eq!(field, "clusterBins");
                assert_eq!(searched, vec!["res", "var", "root"]);
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn snake_case_alias_is_accepted() {
        let file = parse_json(r#"{"cluster_bins": [[1, 0], [0, 1]]}"#);
        let (_, payload) = file.resolve(&[ResultKey::Root]).unwrap();
        assert_eq!(payload.to_membership().unwrap().num_nodes(), 2);
    }

    #[test]
    fn sparse_payload_becomes_membership() {
        let file = parse_json(
            r#"{"res": {"clusterBins": {"shape": [2, 3], "rows": [0, 1], "cols": [2, 0]}}}"#,
        );
        let (_, payload) = file.resolve(&ResultKey::DEFAULT_ORDER).unwrap();
        let membership = payload.to_membership().unwrap();
        assert_eq!(membership.num_nodes(), 2);
        assert_eq!(membership.num_samples(), 3);
        assert_eq!(membership.members().collect::<Vec<_>>(), vec![(0, 2), (1, 0)]);
    }

    #[test]
    fn oversized_sparse_shape_is_malformed() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"clusterBins": {{"shape": [4611686018427387904, 4], "rows": [], "cols": []}}}}"#
        )
        .unwrap();

        let error = load_membership(file.path(), &ResultKey::DEFAULT_ORDER).unwrap_err();
        assert!(matches!(error, GraphError::MalformedInput { .. }));
    }

    #[test]
    fn ragged_payload_is_malformed() {
        let file = parse_json(r#"{"clusterBins": [[1, 0], [1]]}"#);
        let (_, payload) = file.resolve(&ResultKey::DEFAULT_ORDER).unwrap();
        assert!(matches!(
            payload.to_membership(),
            Err(GraphError::MalformedInput { .. })
        ));
    }

    #[test]
    fn load_membership_reads_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "var:\n  clusterBins:\n    - [1, 1, 0]\n    - [0, 1, 1]").unwrap();

        let membership = load_membership(file.path(), &ResultKey::DEFAULT_ORDER).unwrap();
        assert_eq!(membership.num_nodes(), 2);
        assert_eq!(membership.nnz(), 4);
    }

    #[test]
    fn load_membership_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let error = load_membership(&missing, &ResultKey::DEFAULT_ORDER).unwrap_err();
        match error {
            GraphError::Io { path, .. } => assert!(path.ends_with("absent.json")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn load_membership_reports_invalid_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{not json").unwrap();
        let error = load_membership(file.path(), &ResultKey::DEFAULT_ORDER).unwrap_err();
        assert!(matches!(error, GraphError::Json { .. }));
    }
}
