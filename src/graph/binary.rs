use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use super::adjacency::AdjacencyMatrix;

/// Unweighted, undirected shape graph. Node `k` of the graph is node `k` of the
/// membership matrix.
///
/// Edges are stored in row-major order over the upper triangle of the
/// adjacency matrix, so every stored edge `(u, v)` has `u < v`.
#[derive(Debug, Clone)]
pub struct BinaryGraph {
    graph: UnGraph<(), ()>,
}

impl BinaryGraph {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Stored edges in their fixed enumeration order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index()))
    }

    /// Whether `i` and `j` are connected, in either direction.
    #[must_use]
    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        if i >= self.node_count() || j >= self.node_count() {
            return false;
        }
        self.graph
            .find_edge(NodeIndex::new(i), NodeIndex::new(j))
            .is_some()
    }

    #[must_use]
    pub fn degree(&self, node: usize) -> usize {
        self.graph.neighbors(NodeIndex::new(node)).count()
    }
}

/// Turns every positive shared-sample count into an edge. Counts are dropped.
#[must_use]
pub fn threshold_to_binary(adjacency: &AdjacencyMatrix) -> BinaryGraph {
    let num_nodes = adjacency.num_nodes();
    let counts = adjacency.view();

    let mut graph = UnGraph::with_capacity(num_nodes, 0);
    for _ in 0..num_nodes {
        graph.add_node(());
    }
    for u in 0..num_nodes {
        for v in (u + 1)..num_nodes {
            if counts[[u, v]] > 0 {
                graph.add_edge(NodeIndex::new(u), NodeIndex::new(v), ());
            }
        }
    }

    BinaryGraph { graph }
}
