use std::collections::BTreeSet;

use super::cover::ConflictGraph;
use super::graph::Graph;
use super::kernel::Kernel;
use common::{
    error::Error,
    types::{ExactTour, Tour},
};

/// Capability: solve a small ATSP instance to optimality.
pub trait ExactOracle: Send + Sync {
    /// Returns an optimal Hamiltonian cycle over every node of `graph`.
    ///
    /// The returned tour uses the local indices of `graph`. An empty graph yields an
    /// empty zero-cost tour.
    fn solve_exact(&self, graph: &Graph) -> Result<ExactTour, Error>;

    /// False for placeholder oracles whose costs carry no meaning.
    fn is_exact(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str;
}

/// Capability: approximate a minimum vertex cover.
pub trait VertexCoverOracle: Send + Sync {
    /// Returns a set of nodes touching every edge of `graph`.
    ///
    /// No optimality is required; smaller covers tighten the extender's bound.
    fn approximate_vertex_cover(&self, graph: &ConflictGraph) -> BTreeSet<usize>;

    fn name(&self) -> &'static str;
}

/// Turns a kernel tour into a tour over the whole graph.
pub trait TourExtender: Send + Sync {
    /// `kernel_tour` is expressed in kernel-local indices. The result visits every
    /// node of `graph` exactly once, in original indices.
    ///
    /// # Errors
    /// Fails rather than returning a partial tour.
    fn extend(&self, graph: &Graph, kernel: &Kernel, kernel_tour: &ExactTour)
    -> Result<Tour, Error>;

    fn name(&self) -> &'static str;
}
