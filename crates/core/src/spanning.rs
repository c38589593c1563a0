use common::error::Error;
use common::types::WeightedEdge;

use super::graph::Graph;

/// Minimum spanning structure that attaches every residual node to the kernel.
///
/// All `roots` are treated as already connected to each other, so the result is a
/// forest with one tree hanging off each root that needed one. `weight` is the total
/// undirected weight ([`Graph::weight`]) of `edges`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanningForest {
    pub edges: Vec<WeightedEdge>,
    pub weight: f64,
}

impl SpanningForest {
    /// Degree of every node counting forest edges only.
    pub fn degrees(&self, num_nodes: usize) -> Vec<usize> {
        let mut degrees = vec![0; num_nodes];
        for &(u, v, _) in &self.edges {
            degrees[u] += 1;
            degrees[v] += 1;
        }
        degrees
    }
}

/// Prim's algorithm with every kernel node pre-connected.
///
/// When `roots` is empty node 0 becomes the single root and the result is an ordinary
/// minimum spanning tree. Runs in `O(n^2)`, which is optimal for dense matrices.
///
/// # Errors
/// - `Error::EmptyGraph` for a graph without nodes.
/// - `Error::DisconnectedGraph` if some node can only be reached through infinite edges.
pub fn kernel_rooted_forest(graph: &Graph, roots: &[usize]) -> Result<SpanningForest, Error> {
    let n = graph.num_nodes();
    if n == 0 {
        return Err(Error::EmptyGraph);
    }

    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut best_parent = vec![usize::MAX; n];

    let seeds: Vec<usize> = if roots.is_empty() { vec![0] } else { roots.to_vec() };
    for &root in &seeds {
        if root >= n {
            return Err(Error::NodeIndexOutOfBounds(root));
        }
        in_tree[root] = true;
    }
    let mut reached = seeds.len();

    for &root in &seeds {
        relax_from(graph, root, &in_tree, &mut best, &mut best_parent);
    }

    let mut edges = Vec::with_capacity(n - reached);
    let mut weight = 0.0;

    while reached < n {
        let next = (0..n)
            .filter(|&v| !in_tree[v])
            .min_by(|&a, &b| best[a].total_cmp(&best[b]));

        let v = match next {
            Some(v) if best[v].is_finite() => v,
            _ => return Err(Error::DisconnectedGraph { reached, total: n }),
        };

        in_tree[v] = true;
        reached += 1;
        edges.push((best_parent[v], v, best[v]));
        weight += best[v];

        relax_from(graph, v, &in_tree, &mut best, &mut best_parent);
    }

    Ok(SpanningForest { edges, weight })
}

fn relax_from(
    graph: &Graph,
    u: usize,
    in_tree: &[bool],
    best: &mut [f64],
    best_parent: &mut [usize],
) {
    for v in 0..graph.num_nodes() {
        if in_tree[v] {
            continue;
        }
        let w = graph.weight(u, v);
        if w < best[v] {
            best[v] = w;
            best_parent[v] = u;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CostMatrix;

    const INF: f64 = f64::INFINITY;

    fn line(n: usize) -> Graph {
        let rows = (0..n)
            .map(|i| (0..n).map(|j| (i as f64 - j as f64).abs()).collect())
            .collect();
        Graph::from_matrix(CostMatrix::from_rows(rows).unwrap())
    }

    #[test]
    fn mst_of_points_on_a_line_is_the_path() {
        let forest = kernel_rooted_forest(&line(5), &[]).unwrap();

        assert_eq!(forest.edges.len(), 4);
        assert_eq!(forest.weight, 4.0);
        assert_eq!(forest.degrees(5), vec![1, 2, 2, 2, 1]);
    }

    #[test]
    fn roots_are_pre_connected() {
        // Nodes 0 and 4 are kernel; 1 hangs off 0, 2 and 3 off 4.
        let forest = kernel_rooted_forest(&line(5), &[0, 4]).unwrap();

        assert_eq!(forest.edges.len(), 3);
        assert_eq!(forest.weight, 3.0);
    }

    #[test]
    fn whole_graph_as_roots_needs_no_edges() {
        let forest = kernel_rooted_forest(&line(4), &[0, 1, 2, 3]).unwrap();
        assert!(forest.edges.is_empty());
        assert_eq!(forest.weight, 0.0);
    }

    #[test]
    fn uses_the_larger_direction_as_weight() {
        let g = Graph::from_matrix(
            CostMatrix::from_rows(vec![vec![0.0, 1.0], vec![3.0, 0.0]]).unwrap(),
        );
        let forest = kernel_rooted_forest(&g, &[]).unwrap();
        assert_eq!(forest.edges, vec![(0, 1, 3.0)]);
    }

    #[test]
    fn two_components_are_reported() {
        let mut rows = vec![vec![INF; 6]; 6];
        for block in [0..3, 3..6] {
            for i in block.clone() {
                for j in block.clone() {
                    rows[i][j] = if i == j { 0.0 } else { 1.0 };
                }
            }
        }
        let g = Graph::from_matrix(CostMatrix::from_rows(rows).unwrap());

        assert!(matches!(
            kernel_rooted_forest(&g, &[]),
            Err(Error::DisconnectedGraph {
                reached: 3,
                total: 6
            })
        ));
    }

    #[test]
    fn empty_graph_is_rejected() {
        let g = Graph::from_matrix(CostMatrix::from_rows(vec![]).unwrap());
        assert!(matches!(kernel_rooted_forest(&g, &[]), Err(Error::EmptyGraph)));
    }
}
