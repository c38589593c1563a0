/// Type alias for a directed arc: (from, to)
pub type Edge = (usize, usize);

/// Type alias for an undirected, weighted edge: (u, v, weight)
pub type WeightedEdge = (usize, usize, f64);

/// Ordered node sequence, implicitly closed (the last node connects back to the first).
pub type Tour = Vec<usize>;

/// Optimal Hamiltonian cycle returned by an exact oracle.
///
/// `tour` is expressed in the local indices of the graph handed to the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct ExactTour {
    pub cost: f64,
    pub tour: Tour,
}

impl ExactTour {
    pub fn new(cost: f64, tour: Tour) -> Self {
        ExactTour { cost, tour }
    }

    /// Closed sequence of arcs `(tour[i], tour[i + 1])`, wrapping around.
    ///
    /// A single-node tour has no arcs.
    pub fn arcs(&self) -> Vec<Edge> {
        if self.tour.len() < 2 {
            return Vec::new();
        }
        self.tour
            .iter()
            .zip(self.tour.iter().cycle().skip(1))
            .map(|(&u, &v)| (u, v))
            .collect()
    }
}

/// Result of one (beta, algorithm) evaluation.
///
/// Fields:
/// - `beta`: threshold the kernel was built with.
/// - `graph_size`: number of nodes in the whole graph.
/// - `kernel_size`: number of nodes kept in the kernel.
/// - `cost`: tour cost, `None` when the exact step was skipped and the value is meaningless.
/// - `tour`: the full tour in node labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub beta: f64,
    pub graph_size: usize,
    pub kernel_size: usize,
    pub cost: Option<f64>,
    pub tour: Tour,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arcs_close_the_cycle() {
        let exact = ExactTour::new(3.0, vec![2, 0, 1]);
        assert_eq!(exact.arcs(), vec![(2, 0), (0, 1), (1, 2)]);
    }

    #[test]
    fn two_node_tour_goes_there_and_back() {
        let exact = ExactTour::new(2.0, vec![0, 1]);
        assert_eq!(exact.arcs(), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn single_node_tour_has_no_arcs() {
        assert!(ExactTour::new(0.0, vec![4]).arcs().is_empty());
        assert!(ExactTour::new(0.0, vec![]).arcs().is_empty());
    }
}
