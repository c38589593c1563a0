use common::error::Error;
use common::types::Tour;

use super::matrix::CostMatrix;

/// Complete, possibly asymmetric, weighted directed graph.
///
/// Costs are stored densely: `costs[u * num_nodes + v]` is the cost of the arc `u -> v`.
/// Each node also carries a `label`, the identifier it had in the input, so that tours
/// can be reported in the caller's numbering after dead-node removal or kernel
/// extraction.
///
/// Immutable once constructed; shared read-only across a beta sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    num_nodes: usize,
    costs: Vec<f64>,
    labels: Vec<usize>,
}

impl Graph {
    /// Wraps a (preferably metric-closed) cost matrix, labelling nodes `0..n`.
    pub fn from_matrix(matrix: CostMatrix) -> Self {
        let num_nodes = matrix.size();
        Graph {
            num_nodes,
            costs: matrix.into_entries(),
            labels: (0..num_nodes).collect(),
        }
    }

    /// Wraps a cost matrix with explicit node labels (e.g. the kept indices returned
    /// by [`CostMatrix::remove_dead_nodes`]).
    pub fn with_labels(matrix: CostMatrix, labels: Vec<usize>) -> Result<Self, Error> {
        if labels.len() != matrix.size() {
            return Err(Error::InvalidMatrix(format!(
                "{} labels for {} nodes",
                labels.len(),
                matrix.size()
            )));
        }
        let num_nodes = matrix.size();
        Ok(Graph {
            num_nodes,
            costs: matrix.into_entries(),
            labels,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Directed cost of `u -> v`.
    #[inline]
    pub fn cost(&self, u: usize, v: usize) -> f64 {
        self.costs[u * self.num_nodes + v]
    }

    /// Undirected weight used for residual (effectively symmetric) structure.
    ///
    /// Taking the larger direction keeps every bound valid whichever way the edge is
    /// eventually traversed.
    #[inline]
    pub fn weight(&self, u: usize, v: usize) -> f64 {
        self.cost(u, v).max(self.cost(v, u))
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn label(&self, node: usize) -> Result<usize, Error> {
        self.labels
            .get(node)
            .copied()
            .ok_or(Error::NodeIndexOutOfBounds(node))
    }

    /// Cost of the closed tour `tour[0] -> tour[1] -> ... -> tour[0]`.
    pub fn tour_cost(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }
        tour.iter()
            .zip(tour.iter().cycle().skip(1))
            .map(|(&u, &v)| self.cost(u, v))
            .sum()
    }

    /// Maps a tour over node indices to a tour over node labels.
    pub fn relabel(&self, tour: &[usize]) -> Result<Tour, Error> {
        tour.iter().map(|&node| self.label(node)).collect()
    }

    /// Checks that `tour` visits every node exactly once.
    pub fn check_tour(&self, tour: &[usize]) -> Result<(), Error> {
        let mut seen = vec![false; self.num_nodes];
        for &node in tour {
            match seen.get_mut(node) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(Error::IncompleteTour {
                        visited: tour.len() - 1,
                        expected: self.num_nodes,
                    });
                }
                None => return Err(Error::NodeIndexOutOfBounds(node)),
            }
        }
        if tour.len() != self.num_nodes {
            return Err(Error::IncompleteTour {
                visited: tour.len(),
                expected: self.num_nodes,
            });
        }
        Ok(())
    }

    /// Subgraph induced by `nodes`, in the given order.
    ///
    /// Node `i` of the result is `nodes[i]` of `self` and keeps its label.
    pub fn induced(&self, nodes: &[usize]) -> Result<Graph, Error> {
        if let Some(&bad) = nodes.iter().find(|&&u| u >= self.num_nodes) {
            return Err(Error::NodeIndexOutOfBounds(bad));
        }

        let size = nodes.len();
        let mut costs = Vec::with_capacity(size * size);
        for &u in nodes {
            for &v in nodes {
                costs.push(self.cost(u, v));
            }
        }

        Ok(Graph {
            num_nodes: size,
            costs,
            labels: nodes.iter().map(|&u| self.labels[u]).collect(),
        })
    }

    /// Diagnostic: does every triple satisfy the triangle inequality (within `eps`)?
    pub fn is_metric(&self, eps: f64) -> bool {
        let n = self.num_nodes;
        for u in 0..n {
            for v in 0..n {
                if u == v {
                    continue;
                }
                let direct = self.cost(u, v);
                for w in 0..n {
                    if w == u || w == v {
                        continue;
                    }
                    if direct > self.cost(u, w) + self.cost(w, v) + eps {
                        return false;
                    }
                }
            }
        }
        true
    }
}
