//! Visualization hand-off structure: `{nodes, links}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::binary::BinaryGraph;
use super::membership::MembershipMatrix;

/// Node index -> ascending sample indices belonging to that node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeSampleMap(BTreeMap<usize, Vec<usize>>);

/// Node index -> neighbor node indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjacencyList(BTreeMap<usize, Vec<usize>>);

macro_rules! index_map_accessors {
    ($name:ident) => {
        impl $name {
            #[must_use]
            pub fn len(&self) -> usize {
                self.0.len()
            }

            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            #[must_use]
            pub fn get(&self, node: usize) -> Option<&[usize]> {
                self.0.get(&node).map(Vec::as_slice)
            }

            pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
                self.0.iter().map(|(node, values)| (*node, values.as_slice()))
            }
        }

        impl From<BTreeMap<usize, Vec<usize>>> for $name {
            fn from(map: BTreeMap<usize, Vec<usize>>) -> Self {
                Self(map)
            }
        }
    };
}

index_map_accessors!(NodeSampleMap);
index_map_accessors!(AdjacencyList);

/// Output bundle consumed by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphArtifact {
    pub nodes: NodeSampleMap,
    pub links: AdjacencyList,
}

impl GraphArtifact {
    /// Largest sample index referenced by any node.
    #[must_use]
    pub fn max_sample_index(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|(_, samples)| samples.last().copied())
            .max()
    }

    /// Number of neighbor entries across all link lists.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.iter().map(|(_, targets)| targets.len()).sum()
    }
}

/// Lists the samples of every node. Nodes with no samples get an empty list.
#[must_use]
pub fn build_node_sample_map(membership: &MembershipMatrix) -> NodeSampleMap {
    let nodes = membership
        .view()
        .outer_iter()
        .enumerate()
        .map(|(node, row)| {
            let samples: Vec<usize> = row
                .iter()
                .enumerate()
                .filter(|(_, bit)| **bit != 0)
                .map(|(sample, _)| sample)
                .collect();
            (node, samples)
        })
        .collect();
    NodeSampleMap(nodes)
}

/// Lists each stored edge `(u, v)` once, as `v` under `u`.
///
/// The reverse direction is not added, so with the graph's upper-triangle
/// enumeration a node only lists neighbors with a larger index.
#[must_use]
pub fn build_adjacency_list(graph: &BinaryGraph) -> AdjacencyList {
    let mut links = empty_lists(graph.node_count());
    for (u, v) in graph.edges() {
        if u != v {
            links.entry(u).or_default().push(v);
        }
    }
    AdjacencyList(links)
}

/// Lists each edge under both endpoints, in ascending neighbor order.
#[must_use]
pub fn build_symmetric_adjacency_list(graph: &BinaryGraph) -> AdjacencyList {
    let mut links = empty_lists(graph.node_count());
    for (u, v) in graph.edges() {
        if u != v {
            links.entry(u).or_default().push(v);
            links.entry(v).or_default().push(u);
        }
    }
    for targets in links.values_mut() {
        targets.sort_unstable();
    }
    AdjacencyList(links)
}

fn empty_lists(num_nodes: usize) -> BTreeMap<usize, Vec<usize>> {
    (0..num_nodes).map(|node| (node, Vec::new())).collect()
}
