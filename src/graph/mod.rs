//! Shape graph construction from cluster membership.
//!
//! `membership -> co-membership counts -> binary graph -> {nodes, links}`.

pub mod adjacency;
pub mod artifact;
pub mod binary;
pub mod builder;
pub mod membership;

pub use adjacency::{AdjacencyMatrix, compute_adjacency, compute_adjacency_sparse};
pub use artifact::{
    AdjacencyList, GraphArtifact, NodeSampleMap, build_adjacency_list, build_node_sample_map,
    build_symmetric_adjacency_list,
};
pub use binary::{BinaryGraph, threshold_to_binary};
pub use builder::{GraphBuilder, GraphSummary, LinkMode, build};
pub use membership::MembershipMatrix;
