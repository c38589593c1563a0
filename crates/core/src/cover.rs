use std::collections::BTreeSet;

use super::traits::VertexCoverOracle;
use common::error::Error;
use common::types::Edge;

/// Undirected simple graph over nodes `0..num_nodes` handed to a vertex cover oracle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictGraph {
    pub num_nodes: usize,
    pub edges: Vec<Edge>,
}

impl ConflictGraph {
    /// Builds the graph, dropping self-loops and duplicate edges (in either orientation).
    pub fn new(num_nodes: usize, edges: impl IntoIterator<Item = Edge>) -> Self {
        let unique: BTreeSet<Edge> = edges
            .into_iter()
            .filter(|&(u, v)| u != v)
            .map(|(u, v)| (u.min(v), u.max(v)))
            .collect();
        ConflictGraph {
            num_nodes,
            edges: unique.into_iter().collect(),
        }
    }

    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.num_nodes];
        for &(u, v) in &self.edges {
            degrees[u] += 1;
            degrees[v] += 1;
        }
        degrees
    }
}

/// Confirms that `cover` touches every edge of `graph`.
///
/// # Errors
/// Returns `Error::InvalidVertexCover` naming the first uncovered edge.
pub fn verify_cover(graph: &ConflictGraph, cover: &BTreeSet<usize>) -> Result<(), Error> {
    match graph
        .edges
        .iter()
        .find(|(u, v)| !cover.contains(u) && !cover.contains(v))
    {
        Some(&(u, v)) => Err(Error::InvalidVertexCover(u, v)),
        None => Ok(()),
    }
}

/// Classic 2-approximation: take both endpoints of a maximal matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingVertexCover;

impl VertexCoverOracle for MatchingVertexCover {
    fn approximate_vertex_cover(&self, graph: &ConflictGraph) -> BTreeSet<usize> {
        let mut cover = BTreeSet::new();
        for &(u, v) in &graph.edges {
            if !cover.contains(&u) && !cover.contains(&v) {
                cover.insert(u);
                cover.insert(v);
            }
        }
        cover
    }

    fn name(&self) -> &'static str {
        "matching"
    }
}

/// Greedy heuristic: repeatedly take the node covering the most uncovered edges.
///
/// No constant-factor guarantee (`O(log n)` worst case) but usually smaller covers than
/// [`MatchingVertexCover`] on sparse conflict graphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyDegreeVertexCover;

impl VertexCoverOracle for GreedyDegreeVertexCover {
    fn approximate_vertex_cover(&self, graph: &ConflictGraph) -> BTreeSet<usize> {
        let mut cover = BTreeSet::new();
        let mut remaining: Vec<Edge> = graph.edges.clone();

        while !remaining.is_empty() {
            let mut degrees = vec![0usize; graph.num_nodes];
            for &(u, v) in &remaining {
                degrees[u] += 1;
                degrees[v] += 1;
            }
            // Ties go to the lowest index for determinism.
            let pick = (0..graph.num_nodes)
                .max_by(|&a, &b| degrees[a].cmp(&degrees[b]).then(b.cmp(&a)))
                .unwrap_or(0);

            cover.insert(pick);
            remaining.retain(|&(u, v)| u != pick && v != pick);
        }

        cover
    }

    fn name(&self) -> &'static str {
        "greedy-degree"
    }
}
