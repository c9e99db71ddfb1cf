use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::adjacency::{compute_adjacency, compute_adjacency_sparse};
use super::artifact::{
    GraphArtifact, build_adjacency_list, build_node_sample_map, build_symmetric_adjacency_list,
};
use super::binary::{BinaryGraph, threshold_to_binary};
use super::membership::MembershipMatrix;

/// How edges are written into the `links` map.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum LinkMode {
    /// Each stored edge `(u, v)` listed once, as `v` under `u`.
    #[default]
    HalfEdge,
    /// Each edge listed under both endpoints.
    Symmetric,
}

impl LinkMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HalfEdge => "half-edge",
            Self::Symmetric => "symmetric",
        }
    }
}

/// Shape statistics of one build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub samples: usize,
    pub edges: usize,
    pub isolated_nodes: usize,
    pub mean_degree: f64,
}

impl GraphSummary {
    #[allow(clippy::cast_precision_loss)]
    fn of(membership: &MembershipMatrix, graph: &BinaryGraph) -> Self {
        let nodes = graph.node_count();
        let edges = graph.edge_count();
        let isolated_nodes = (0..nodes).filter(|&node| graph.degree(node) == 0).count();
        let mean_degree = if nodes > 0 {
            (edges as f64 * 2.0) / nodes as f64
        } else {
            0.0
        };
        Self {
            nodes,
            samples: membership.num_samples(),
            edges,
            isolated_nodes,
            mean_degree,
        }
    }
}

/// Membership -> shape graph pipeline.
///
/// Building is pure: the same membership and options always produce the same
/// artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphBuilder {
    link_mode: LinkMode,
    sparse_product: bool,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_link_mode(mut self, link_mode: LinkMode) -> Self {
        self.link_mode = link_mode;
        self
    }

    /// Computes co-membership through a sparse product instead of a dense one.
    #[must_use]
    pub fn with_sparse_product(mut self, sparse_product: bool) -> Self {
        self.sparse_product = sparse_product;
        self
    }

    #[must_use]
    pub fn link_mode(&self) -> LinkMode {
        self.link_mode
    }

    #[must_use]
    pub fn sparse_product(&self) -> bool {
        self.sparse_product
    }

    #[must_use]
    pub fn build(&self, membership: &MembershipMatrix) -> GraphArtifact {
        self.build_with_summary(membership).0
    }

    #[must_use]
    pub fn build_with_summary(
        &self,
        membership: &MembershipMatrix,
    ) -> (GraphArtifact, GraphSummary) {
        let span = tracing::debug_span!(
            "build_graph",
            nodes = membership.num_nodes(),
            samples = membership.num_samples(),
            link_mode = self.link_mode.as_str(),
            sparse = self.sparse_product,
        );
        let _guard = span.enter();

        let adjacency = if self.sparse_product {
            compute_adjacency_sparse(membership)
        } else {
            compute_adjacency(membership)
        };
        debug!(density = membership.density(), "adjacency computed");

        let graph = threshold_to_binary(&adjacency);
        let nodes = build_node_sample_map(membership);
        let links = match self.link_mode {
            LinkMode::HalfEdge => build_adjacency_list(&graph),
            LinkMode::Symmetric => build_symmetric_adjacency_list(&graph),
        };

        let summary = GraphSummary::of(membership, &graph);
        info!(
            nodes = summary.nodes,
            samples = summary.samples,
            edges = summary.edges,
            isolated_nodes = summary.isolated_nodes,
            mean_degree = summary.mean_degree,
            "shape graph built"
        );

        (GraphArtifact { nodes, links }, summary)
    }
}

/// Builds the shape graph with default options.
#[must_use]
pub fn build(membership: &MembershipMatrix) -> GraphArtifact {
    GraphBuilder::default().build(membership)
}
