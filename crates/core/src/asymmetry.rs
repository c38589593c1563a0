use common::numeric::{SYMMETRIC_FACTOR, asymmetry_ratio};

use super::graph::Graph;

/// Asymmetry factor of every unordered pair `{u, v}` with at least one finite direction.
///
/// Each factor is `max(c(u,v), c(v,u)) / min(c(u,v), c(v,u))`; see
/// [`asymmetry_ratio`]. Pairs with no arc in either direction carry no information and
/// are skipped. A graph with fewer than two nodes yields an empty list.
///
/// Order follows the upper triangle row by row; callers sort as needed.
pub fn asymmetry_factors(graph: &Graph) -> Vec<f64> {
    let n = graph.num_nodes();
    let mut factors = Vec::with_capacity(n * n.saturating_sub(1) / 2);

    for u in 0..n {
        for v in (u + 1)..n {
            if let Some(factor) = pair_factor(graph, u, v) {
                factors.push(factor);
            }
        }
    }

    factors
}

/// Factor of a single pair, or `None` when neither direction exists.
#[inline]
pub fn pair_factor(graph: &Graph, u: usize, v: usize) -> Option<f64> {
    let forward = graph.cost(u, v);
    let backward = graph.cost(v, u);
    if forward.is_infinite() && backward.is_infinite() {
        return None;
    }
    Some(asymmetry_ratio(forward, backward))
}

/// True iff every pair's factor is exactly the symmetric identity value.
pub fn check_symmetry(graph: &Graph) -> bool {
    asymmetry_factors(graph)
        .into_iter()
        .all(|f| f == SYMMETRIC_FACTOR)
}

/// Factors sorted in descending order, computed once per graph.
///
/// This is the only state shared between the iterations of a beta sweep, and it is
/// read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct AsymmetryProfile {
    descending: Vec<f64>,
}

impl AsymmetryProfile {
    pub fn new(graph: &Graph) -> Self {
        let mut descending = asymmetry_factors(graph);
        descending.sort_by(|a, b| b.total_cmp(a));
        AsymmetryProfile { descending }
    }

    pub fn descending(&self) -> &[f64] {
        &self.descending
    }

    pub fn len(&self) -> usize {
        self.descending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descending.is_empty()
    }

    /// Number of pairs classified asymmetric under `beta`.
    pub fn count_above(&self, beta: f64) -> usize {
        self.descending.partition_point(|&f| f > beta)
    }
}
