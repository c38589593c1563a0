use std::collections::BTreeSet;
use std::sync::Arc;

use common::error::Error;
use common::types::{Edge, ExactTour, Tour};
use tracing::debug;

use super::cover::{ConflictGraph, verify_cover};
use super::euler::{eulerian_circuit, orient_even_multigraph, shortcut};
use super::graph::Graph;
use super::kernel::Kernel;
use super::spanning::kernel_rooted_forest;
use super::traits::{TourExtender, VertexCoverOracle};
use super::tree_doubling::{doubled_arcs, walk_start};

/// Christofides-style extender with a vertex cover in place of a perfect matching.
///
/// 1. Attach residual nodes to the kernel with a minimum spanning forest.
/// 2. Collect the nodes of odd forest degree and link each one to its cheapest odd
///    partner; this is the conflict graph handed to the vertex cover oracle.
/// 3. Cover nodes pick their cheapest unpaired partner first, remaining odd nodes are
///    paired greedily by weight. The pairing makes every degree even.
/// 4. Orient the even multigraph along its Euler circuits, add the kernel tour arcs and
///    shortcut the combined Eulerian walk.
///
/// If the pairing ends up heavier than the forest itself, the forest is doubled instead,
/// so the result never has a weaker bound than [`TreeDoublingExtender`].
///
/// [`TreeDoublingExtender`]: super::tree_doubling::TreeDoublingExtender
#[derive(Clone)]
pub struct ChristofidesExtender {
    cover_oracle: Arc<dyn VertexCoverOracle>,
}

impl ChristofidesExtender {
    pub fn new(cover_oracle: Arc<dyn VertexCoverOracle>) -> Self {
        ChristofidesExtender { cover_oracle }
    }
}

impl std::fmt::Debug for ChristofidesExtender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChristofidesExtender")
            .field("cover_oracle", &self.cover_oracle.name())
            .finish()
    }
}

/// Conflict graph over `odd` (local indices): each odd node linked to its cheapest
/// finite-weight partner.
pub(crate) fn nearest_partner_graph(graph: &Graph, odd: &[usize]) -> ConflictGraph {
    let edges = (0..odd.len()).filter_map(|i| {
        (0..odd.len())
            .filter(|&j| j != i)
            .map(|j| (j, graph.weight(odd[i], odd[j])))
            .filter(|&(_, w)| w.is_finite())
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(j, _)| (i, j))
    });
    ConflictGraph::new(odd.len(), edges.collect::<Vec<_>>())
}

/// Pairs every odd node, cover nodes choosing first.
///
/// Returns the pairing as original-index edges together with its total weight.
///
/// # Errors
/// Returns `Error::DisconnectedGraph` if a node can only be paired through an infinite edge.
pub(crate) fn pair_odd_nodes(
    graph: &Graph,
    odd: &[usize],
    cover: &BTreeSet<usize>,
) -> Result<(Vec<Edge>, f64), Error> {
    let k = odd.len();
    let mut paired = vec![false; k];
    let mut pairing = Vec::with_capacity(k / 2);
    let mut weight = 0.0;

    let cheapest_partner = |i: usize, paired: &[bool]| {
        (0..k)
            .filter(|&j| j != i && !paired[j])
            .map(|j| (j, graph.weight(odd[i], odd[j])))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    };

    for &c in cover {
        if c >= k || paired[c] {
            continue;
        }
        if let Some((j, w)) = cheapest_partner(c, &paired) {
            paired[c] = true;
            paired[j] = true;
            pairing.push((odd[c], odd[j]));
            weight += w;
        }
    }

    let mut candidates: Vec<(usize, usize, f64)> = Vec::new();
    for i in (0..k).filter(|&i| !paired[i]) {
        for j in ((i + 1)..k).filter(|&j| !paired[j]) {
            candidates.push((i, j, graph.weight(odd[i], odd[j])));
        }
    }
    candidates.sort_by(|a, b| a.2.total_cmp(&b.2));

    for (i, j, w) in candidates {
        if paired[i] || paired[j] {
            continue;
        }
        paired[i] = true;
        paired[j] = true;
        pairing.push((odd[i], odd[j]));
        weight += w;
    }

    let reached = paired.iter().filter(|&&p| p).count();
    if reached != k || !weight.is_finite() {
        return Err(Error::DisconnectedGraph {
            reached,
            total: k,
        });
    }

    Ok((pairing, weight))
}

impl TourExtender for ChristofidesExtender {
    /// # Errors
    /// - `Error::EmptyGraph` / `Error::DisconnectedGraph` for structural problems.
    /// - `Error::InvalidKernelTour` when `kernel_tour` does not match the kernel.
    /// - `Error::InvalidVertexCover` when the oracle returns a set that misses an edge.
    fn extend(&self, graph: &Graph, kernel: &Kernel, kernel_tour: &ExactTour) -> Result<Tour, Error> {
        let n = graph.num_nodes();
        if n == 0 {
            return Err(Error::EmptyGraph);
        }

        let mut arcs = kernel.tour_arcs(kernel_tour)?;
        let forest = kernel_rooted_forest(graph, &kernel.nodes)?;

        let odd: Vec<usize> = forest
            .degrees(n)
            .iter()
            .enumerate()
            .filter(|&(_, d)| d % 2 == 1)
            .map(|(u, _)| u)
            .collect();

        let conflict = nearest_partner_graph(graph, &odd);
        let cover = self.cover_oracle.approximate_vertex_cover(&conflict);
        verify_cover(&conflict, &cover)?;

        let (pairing, pairing_weight) = pair_odd_nodes(graph, &odd, &cover)?;

        if pairing_weight <= forest.weight {
            let undirected: Vec<Edge> = forest
                .edges
                .iter()
                .map(|&(u, v, _)| (u, v))
                .chain(pairing.iter().copied())
                .collect();
            arcs.extend(orient_even_multigraph(n, &undirected)?);
        } else {
            debug!(
                pairing_weight,
                forest_weight = forest.weight,
                "Pairing heavier than forest, doubling instead"
            );
            arcs.extend(doubled_arcs(&forest));
        }

        let walk = eulerian_circuit(n, &arcs, walk_start(kernel))?;
        let tour = shortcut(&walk, n)?;

        debug!(
            kernel_size = kernel.size(),
            odd_nodes = odd.len(),
            cover_size = cover.len(),
            forest_weight = forest.weight,
            pairing_weight,
            "Christofides extension complete"
        );

        Ok(tour)
    }

    fn name(&self) -> &'static str {
        "christofides"
    }
}
