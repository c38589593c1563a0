use common::error::Error;
use common::types::{Edge, ExactTour};
use tracing::debug;

use super::asymmetry::pair_factor;
use super::graph::Graph;

/// Rejects thresholds that cannot be compared against asymmetry factors.
pub fn validate_beta(beta: f64) -> Result<f64, Error> {
    if beta.is_nan() || beta < 0.0 {
        return Err(Error::InvalidBeta(beta));
    }
    Ok(beta)
}

/// A pair is asymmetric when its factor strictly exceeds `beta`.
///
/// A factor exactly equal to `beta` is treated as symmetric.
#[inline]
pub fn is_asymmetric(factor: f64, beta: f64) -> bool {
    factor > beta
}

/// The substructure of a graph that keeps genuine directed asymmetry.
///
/// - `nodes[i]` is the original index of kernel-local node `i` (ascending)
/// - `graph` is the subgraph induced by `nodes`, with the original directed costs
///
/// Every node not listed in `nodes` is residual.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    pub beta: f64,
    pub nodes: Vec<usize>,
    pub graph: Graph,
    membership: Vec<Option<usize>>,
}

impl Kernel {
    /// Splits `graph` at threshold `beta`.
    ///
    /// Every unordered pair whose asymmetry factor exceeds `beta` marks both of its
    /// endpoints as kernel nodes. `beta = 0` keeps every connected pair (whole graph);
    /// larger values keep fewer pairs.
    ///
    /// # Errors
    /// Returns `Error::InvalidBeta` for NaN or negative thresholds.
    pub fn build(graph: &Graph, beta: f64) -> Result<Kernel, Error> {
        let beta = validate_beta(beta)?;
        let n = graph.num_nodes();
        let mut marked = vec![false; n];

        for u in 0..n {
            for v in (u + 1)..n {
                if marked[u] && marked[v] {
                    continue;
                }
                if let Some(factor) = pair_factor(graph, u, v) {
                    if is_asymmetric(factor, beta) {
                        marked[u] = true;
                        marked[v] = true;
                    }
                }
            }
        }

        let nodes: Vec<usize> = (0..n).filter(|&u| marked[u]).collect();
        let mut membership = vec![None; n];
        for (local, &node) in nodes.iter().enumerate() {
            membership[node] = Some(local);
        }

        let kernel_graph = graph.induced(&nodes)?;
        debug!(beta, kernel_size = nodes.len(), graph_size = n, "Kernel built");

        Ok(Kernel {
            beta,
            nodes,
            graph: kernel_graph,
            membership,
        })
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Original index of kernel-local node `local`.
    pub fn original(&self, local: usize) -> Result<usize, Error> {
        self.nodes
            .get(local)
            .copied()
            .ok_or(Error::NodeIndexOutOfBounds(local))
    }

    /// Kernel-local index of original node `node`, if it belongs to the kernel.
    pub fn local(&self, node: usize) -> Option<usize> {
        self.membership.get(node).copied().flatten()
    }

    pub fn contains(&self, node: usize) -> bool {
        self.local(node).is_some()
    }

    /// Arcs of the kernel tour, translated back to original node indices.
    ///
    /// # Errors
    /// Returns `Error::InvalidKernelTour` unless `kernel_tour` visits every kernel node
    /// exactly once.
    pub fn tour_arcs(&self, kernel_tour: &ExactTour) -> Result<Vec<Edge>, Error> {
        self.graph
            .check_tour(&kernel_tour.tour)
            .map_err(|e| Error::InvalidKernelTour(e.to_string()))?;

        kernel_tour
            .arcs()
            .into_iter()
            .map(|(u, v)| Ok((self.original(u)?, self.original(v)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CostMatrix;

    /// 4 nodes, all costs 1 except c(1, 2) = 1 and c(2, 1) = 10.
    fn one_way_pair() -> Graph {
        let mut rows = vec![vec![1.0; 4]; 4];
        rows[2][1] = 10.0;
        Graph::from_matrix(CostMatrix::from_rows(rows).unwrap())
    }

    #[test]
    fn kernel_holds_only_the_asymmetric_pair() {
        let g = one_way_pair();

        let kernel = Kernel::build(&g, 5.0).unwrap();
        assert_eq!(kernel.size(), 2);
        assert_eq!(kernel.nodes, vec![1, 2]);
        assert_eq!(kernel.graph.cost(0, 1), 1.0);
        assert_eq!(kernel.graph.cost(1, 0), 10.0);

        let kernel = Kernel::build(&g, 15.0).unwrap();
        assert_eq!(kernel.size(), 0);
    }

    #[test]
    fn factor_equal_to_beta_is_symmetric() {
        let g = one_way_pair();
        assert_eq!(Kernel::build(&g, 10.0).unwrap().size(), 0);
        assert_eq!(Kernel::build(&g, 9.999).unwrap().size(), 2);
    }

    #[test]
    fn zero_beta_keeps_the_whole_graph() {
        let g = one_way_pair();
        let kernel = Kernel::build(&g, 0.0).unwrap();
        assert_eq!(kernel.nodes, vec![0, 1, 2, 3]);
        assert_eq!(kernel.graph, g);
    }

    #[test]
    fn beta_one_keeps_every_asymmetric_pair_only() {
        let g = one_way_pair();
        assert_eq!(Kernel::build(&g, 1.0).unwrap().nodes, vec![1, 2]);
    }

    #[test]
    fn invalid_beta_is_rejected() {
        let g = one_way_pair();
        assert!(matches!(
            Kernel::build(&g, -0.5),
            Err(Error::InvalidBeta(_))
        ));
        assert!(Kernel::build(&g, f64::NAN).is_err());
    }

    #[test]
    fn mapping_round_trips() {
        let g = one_way_pair();
        let kernel = Kernel::build(&g, 2.0).unwrap();

        for local in 0..kernel.size() {
            let node = kernel.original(local).unwrap();
            assert_eq!(kernel.local(node), Some(local));
        }
        assert!(!kernel.contains(0));
        assert!(kernel.contains(2));
        assert!(kernel.original(5).is_err());
    }

    #[test]
    fn tour_arcs_use_original_indices() {
        let g = one_way_pair();
        let kernel = Kernel::build(&g, 2.0).unwrap();

        let arcs = kernel.tour_arcs(&ExactTour::new(11.0, vec![1, 0])).unwrap();
        assert_eq!(arcs, vec![(2, 1), (1, 2)]);
    }

    #[test]
    fn tour_arcs_reject_foreign_tours() {
        let g = one_way_pair();
        let kernel = Kernel::build(&g, 2.0).unwrap();

        assert!(matches!(
            kernel.tour_arcs(&ExactTour::new(0.0, vec![0, 1, 2])),
            Err(Error::InvalidKernelTour(_))
        ));
        assert!(matches!(
            kernel.tour_arcs(&ExactTour::new(0.0, vec![0])),
            Err(Error::InvalidKernelTour(_))
        ));
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let g = one_way_pair();
        assert_eq!(
            Kernel::build(&g, 3.0).unwrap(),
            Kernel::build(&g, 3.0).unwrap()
        );
    }
}
