use common::error::Error;
use common::types::{Edge, ExactTour, Tour};
use tracing::debug;

use super::euler::{eulerian_circuit, shortcut};
use super::graph::Graph;
use super::kernel::Kernel;
use super::spanning::{SpanningForest, kernel_rooted_forest};
use super::traits::TourExtender;

/// Generalized double-tree heuristic.
///
/// 1. Attach every residual node to the kernel with a minimum spanning forest.
/// 2. Take every forest edge in both directions, plus the arcs of the exact kernel
///    tour. Every node is balanced, so the multigraph has a closed Eulerian walk.
/// 3. Shortcut the walk to first visits.
///
/// Cost bound: `kernel tour + 2 · forest weight`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeDoublingExtender;

/// Both orientations of every forest edge.
pub(crate) fn doubled_arcs(forest: &SpanningForest) -> impl Iterator<Item = Edge> + '_ {
    forest
        .edges
        .iter()
        .flat_map(|&(u, v, _)| [(u, v), (v, u)])
}

/// Walk start: the first kernel node, or node 0 when the kernel is empty.
pub(crate) fn walk_start(kernel: &Kernel) -> usize {
    kernel.nodes.first().copied().unwrap_or(0)
}

impl TourExtender for TreeDoublingExtender {
    /// # Errors
    /// - `Error::EmptyGraph` for a graph without nodes.
    /// - `Error::DisconnectedGraph` when some residual node cannot be attached.
    /// - `Error::InvalidKernelTour` when `kernel_tour` does not match the kernel.
    fn extend(&self, graph: &Graph, kernel: &Kernel, kernel_tour: &ExactTour) -> Result<Tour, Error> {
        let n = graph.num_nodes();
        if n == 0 {
            return Err(Error::EmptyGraph);
        }

        let mut arcs = kernel.tour_arcs(kernel_tour)?;
        let forest = kernel_rooted_forest(graph, &kernel.nodes)?;
        arcs.extend(doubled_arcs(&forest));

        let walk = eulerian_circuit(n, &arcs, walk_start(kernel))?;
        let tour = shortcut(&walk, n)?;

        debug!(
            kernel_size = kernel.size(),
            forest_edges = forest.edges.len(),
            forest_weight = forest.weight,
            walk_len = walk.len(),
            "Tree doubling extension complete"
        );

        Ok(tour)
    }

    fn name(&self) -> &'static str {
        "treedoubling"
    }
}
