//! One-hot label table aligned row-for-row with membership samples.

use std::collections::BTreeMap;
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::read_to_string;
use crate::error::{GraphError, Result};
use crate::graph::GraphArtifact;

/// Cell separator of a label table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Tab,
    Comma,
}

impl Delimiter {
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Tab => '\t',
            Self::Comma => ',',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelTable {
    classes: Vec<String>,
    values: Array2<f64>,
}

impl LabelTable {
    /// Parses a delimited table whose first line names the classes.
    ///
    /// Blank lines are skipped.
    ///
    /// # Errors
    /// Returns [`GraphError::MalformedInput`] when the header is missing, a row
    /// has the wrong number of cells, or a cell is not a finite number.
    pub fn parse(text: &str, delimiter: Delimiter) -> Result<Self> {
        let separator = delimiter.as_char();
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines
            .next()
            .ok_or_else(|| GraphError::malformed("label table is empty"))?;
        let classes: Vec<String> = header
            .split(separator)
            .map(|name| name.trim().to_string())
            .collect();
        if classes.iter().any(String::is_empty) {
            return Err(GraphError::malformed("label table header has an empty class name"));
        }

        let mut flat = Vec::new();
        let mut rows = 0;
        for (index, line) in lines {
            let line_number = index + 1;
            let cells: Vec<&str> = line.split(separator).map(str::trim).collect();
            if cells.len() != classes.len() {
                return Err(GraphError::malformed(format!(
                    "label row on line {line_number} has {} cells, expected {}",
                    cells.len(),
                    classes.len()
                )));
            }
            for cell in cells {
                let value = cell
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| {
                        GraphError::malformed(format!(
                            "label cell `{cell}` on line {line_number} is not a number"
                        ))
                    })?;
                flat.push(value);
            }
            rows += 1;
        }

        let values = Array2::from_shape_vec((rows, classes.len()), flat)
            .map_err(|error| GraphError::malformed(error.to_string()))?;
        Ok(Self { classes, values })
    }

    /// # Errors
    /// Returns an I/O error or any error from [`LabelTable::parse`].
    pub fn load(path: &Path, delimiter: Delimiter) -> Result<Self> {
        let table = Self::parse(&read_to_string(path)?, delimiter)?;
        debug!(
            path = %path.display(),
            samples = table.num_samples(),
            classes = table.classes.len(),
            "label table loaded"
        );
        Ok(table)
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.values.nrows()
    }

    /// Class with the largest value in the sample's row, first one on ties.
    #[must_use]
    pub fn dominant_label(&self, sample: usize) -> Option<&str> {
        if sample >= self.num_samples() || self.classes.is_empty() {
            return None;
        }
        let row = self.values.row(sample);
        let mut best = 0;
        for (class, &value) in row.iter().enumerate() {
            if value > row[best] {
                best = class;
            }
        }
        Some(self.classes[best].as_str())
    }

    /// Rows whose nonzero count is not exactly one.
    #[must_use]
    pub fn non_one_hot_rows(&self) -> usize {
        self.values
            .outer_iter()
            .filter(|row| row.iter().filter(|&&value| value != 0.0).count() != 1)
            .count()
    }

    /// Checks that the table covers exactly the membership samples.
    ///
    /// # Errors
    /// Returns [`GraphError::LabelMismatch`] when the row count differs from
    /// `num_samples` or a node references a sample beyond the table.
    pub fn check_alignment(&self, artifact: &GraphArtifact, num_samples: usize) -> Result<()> {
        if self.num_samples() != num_samples {
            return Err(GraphError::label_mismatch(format!(
                "{} label rows for {num_samples} samples",
                self.num_samples()
            )));
        }
        if let Some(max) = artifact.max_sample_index() {
            if max >= self.num_samples() {
                return Err(GraphError::label_mismatch(format!(
                    "sample {max} has no label row"
                )));
            }
        }

        let irregular = self.non_one_hot_rows();
        if irregular > 0 {
            warn!(rows = irregular, "label rows are not one-hot");
        }
        Ok(())
    }

    /// Per node, how many of its samples carry each dominant label.
    #[must_use]
    pub fn node_label_counts(
        &self,
        artifact: &GraphArtifact,
    ) -> BTreeMap<usize, BTreeMap<String, usize>> {
        artifact
            .nodes
            .iter()
            .map(|(node, samples)| {
                let mut counts: BTreeMap<String, usize> = BTreeMap::new();
                for label in samples.iter().filter_map(|&sample| self.dominant_label(sample)) {
                    *counts.entry(label.to_string()).or_default() += 1;
                }
                (node, counts)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MembershipMatrix, build};

    const TIMING: &str = "rest\tface\tcat\n1\t0\t0\n0\t1\t0\n0\t1\t0\n0\t0\t1\n";

    fn artifact(rows: &[Vec<f64>]) -> GraphArtifact {
        build(&MembershipMatrix::from_rows(rows).unwrap())
    }

    #[test]
    fn parses_header_and_rows() {
        let table = LabelTable::parse(TIMING, Delimiter::Tab).unwrap();
        assert_eq!(table.classes(), &["rest", "face", "cat"]);
        assert_eq!(table.num_samples(), 4);
        assert_eq!(table.dominant_label(0), Some("rest"));
        assert_eq!(table.dominant_label(2), Some("face"));
        assert_eq!(table.dominant_label(3), Some("cat"));
        assert_eq!(table.dominant_label(4), None);
        assert_eq!(table.non_one_hot_rows(), 0);
    }

    #[test]
    fn parses_comma_delimited_with_crlf() {
        let table = LabelTable::parse("a,b\r\n1,0\r\n\r\n0,1\r\n", Delimiter::Comma).unwrap();
        assert_eq!(table.classes(), &["a", "b"]);
        assert_eq!(table.num_samples(), 2);
    }

    #[test]
    fn empty_table_is_malformed() {
        let error = LabelTable::parse("\n\n", Delimiter::Tab).unwrap_err();
        assert!(matches!(error, GraphError::MalformedInput { .. }));
    }

    #[test]
    fn short_row_reports_line_number() {
        let error = LabelTable::parse("a\tb\n1\t0\n1\n", Delimiter::Tab).unwrap_err();
        assert!(error.to_string().contains("line 3 has 1 cells, expected 2"));
    }

    #[test]
    fn non_numeric_cell_is_malformed() {
        let error = LabelTable::parse("a\tb\n1\tx\n", Delimiter::Tab).unwrap_err();
        assert!(error.to_string().contains("`x` on line 2"));
    }

    #[test]
    fn counts_rows_that_are_not_one_hot() {
        let table = LabelTable::parse("a\tb\n1\t1\n0\t0\n0\t1\n", Delimiter::Tab).unwrap();
        assert_eq!(table.non_one_hot_rows(), 2);
        // Ties resolve to the first class.
        assert_eq!(table.dominant_label(0), Some("a"));
    }

    #[test]
    fn alignment_accepts_matching_table() {
        let table = LabelTable::parse(TIMING, Delimiter::Tab).unwrap();
        let artifact = artifact(&[vec![1.0, 1.0, 0.0, 0.0], vec![0.0, 0.0, 1.0, 1.0]]);
        table.check_alignment(&artifact, 4).unwrap();
    }

    #[test]
    fn alignment_rejects_row_count_mismatch() {
        let table = LabelTable::parse(TIMING, Delimiter::Tab).unwrap();
        let artifact = artifact(&[vec![1.0, 0.0, 0.0]]);
        let error = table.check_alignment(&artifact, 3).unwrap_err();
        assert!(matches!(error, GraphError::LabelMismatch { .. }));
        assert!(error.to_string().contains("4 label rows for 3 samples"));
    }

    #[test]
    fn alignment_rejects_unlabelled_sample() {
        let table = LabelTable::parse("a\n1\n", Delimiter::Tab).unwrap();
        let artifact = artifact(&[vec![0.0, 1.0]]);
        // Sample count agrees, but node 0 references sample 1.
        let error = table.check_alignment(&artifact, 1).unwrap_err();
        assert!(error.to_string().contains("sample 1 has no label row"));
    }

    #[test]
    fn node_label_counts_group_dominant_labels() {
        let table = LabelTable::parse(TIMING, Delimiter::Tab).unwrap();
        let artifact = artifact(&[vec![1.0, 1.0, 1.0, 0.0], vec![0.0, 0.0, 0.0, 0.0]]);
        let counts = table.node_label_counts(&artifact);

        assert_eq!(counts[&0]["rest"], 1);
        assert_eq!(counts[&0]["face"], 2);
        assert!(!counts[&0].contains_key("cat"));
        assert!(counts[&1].is_empty());
    }
}
