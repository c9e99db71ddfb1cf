use std::io;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cache::ArtifactCache;
use crate::config::RunPlan;
use crate::graph::GraphArtifact;
use crate::io::artifact::{save_artifact, write_artifact};
use crate::io::labels::LabelTable;
use crate::io::result::load_membership;

/// Loads the membership, builds (or fetches) the artifact, checks the label
/// table if one was given and writes the result.
///
/// # Errors
/// Returns any load, alignment or write error with the failing step attached.
pub fn run(plan: &RunPlan) -> Result<GraphArtifact> {
    let membership = load_membership(&plan.input, &plan.result_keys)
        .with_context(|| format!("failed to load membership from {}", plan.input.display()))?;

    let artifact = match &plan.cache_dir {
        Some(dir) => ArtifactCache::new(dir)
            .get_or_build(&membership, &plan.builder)
            .context("artifact cache failed")?,
        None => plan.builder.build(&membership),
    };

    if let Some(path) = &plan.labels {
        let table = LabelTable::load(path, plan.label_delimiter)
            .with_context(|| format!("failed to load labels from {}", path.display()))?;
        table
            .check_alignment(&artifact, membership.num_samples())
            .context("label table rejected")?;
        for (node, counts) in table.node_label_counts(&artifact) {
            debug!(node, labels = ?counts, "node label composition");
        }
    }

    match &plan.output {
        Some(path) => {
            save_artifact(path, &artifact, plan.pretty)
                .with_context(|| format!("failed to write artifact to {}", path.display()))?;
            info!(path = %path.display(), "artifact written");
        }
        None => {
            write_artifact(io::stdout().lock(), &artifact, plan.pretty)
                .context("failed to write artifact to stdout")?;
        }
    }

    Ok(artifact)
}
