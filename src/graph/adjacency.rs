//! Co-membership counts between nodes.

use ndarray::{Array2, ArrayView2};
use sprs::{CsMat, TriMat};

use super::membership::MembershipMatrix;

/// Symmetric (nodes x nodes) shared-sample counts with a zero diagonal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    counts: Array2<u32>,
}

impl AdjacencyMatrix {
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.counts.nrows()
    }

    /// Number of samples shared by `i` and `j`. Always `0` when `i == j`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.counts[[i, j]]
    }

    #[must_use]
    pub fn view(&self) -> ArrayView2<'_, u32> {
        self.counts.view()
    }

    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.counts == self.counts.t()
    }

    fn zeros(num_nodes: usize) -> Self {
        Self {
            counts: Array2::zeros((num_nodes, num_nodes)),
        }
    }

    fn from_product(mut counts: Array2<u32>) -> Self {
        counts.diag_mut().fill(0);
        Self { counts }
    }
}

/// Computes `M · Mᵀ` and clears the diagonal.
#[must_use]
pub fn compute_adjacency(membership: &MembershipMatrix) -> AdjacencyMatrix {
    if membership.num_samples() == 0 {
        return AdjacencyMatrix::zeros(membership.num_nodes());
    }

    let bins = membership.view().mapv(u32::from);
    AdjacencyMatrix::from_product(bins.dot(&bins.t()))
}

/// Same result as [`compute_adjacency`], computed through a CSR product.
///
/// Cheaper when the membership matrix is mostly zeros, which is the usual
/// shape of mapper output.
#[must_use]
pub fn compute_adjacency_sparse(membership: &MembershipMatrix) -> AdjacencyMatrix {
    let num_nodes = membership.num_nodes();
    let num_samples = membership.num_samples();
    if membership.nnz() == 0 {
        return AdjacencyMatrix::zeros(num_nodes);
    }

    let mut forward = TriMat::new((num_nodes, num_samples));
    let mut transposed = TriMat::new((num_samples, num_nodes));
    for (node, sample) in membership.members() {
        forward.add_triplet(node, sample, 1u32);
        transposed.add_triplet(sample, node, 1u32);
    }
    let forward: CsMat<u32> = forward.to_csr();
    let transposed: CsMat<u32> = transposed.to_csr();
    let product: CsMat<u32> = &forward * &transposed;

    // CSR x CSR stays CSR, so the outer index is the row.
    let mut counts = Array2::<u32>::zeros((num_nodes, num_nodes));
    for (row, entries) in product.outer_iterator().enumerate() {
        for (col, &count) in entries.iter() {
            counts[[row, col]] = count;
        }
    }
    AdjacencyMatrix::from_product(counts)
}
