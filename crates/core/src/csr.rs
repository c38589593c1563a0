use std::ops::Range;

use common::error::Error;
use common::types::Edge;

/// Directed multigraph in Compressed Sparse Row (CSR) format, used for Eulerian traversal.
///
/// CSR format stores outgoing arcs of each node contiguously in memory:
/// - `node_pointers[u]..node_pointers[u+1]` → arcs leaving node `u`
/// - `arc_targets[i]` → head of arc `i`
/// - `arc_sources[i]` → tail of arc `i`
/// - `arc_labels[i]` → caller-provided identifier of arc `i` (e.g. the undirected edge it
///   was derived from, so both orientations can be retired together)
///
/// Parallel arcs are kept; a doubled tree edge is two arcs. Within one node the arcs
/// keep their insertion order.
#[derive(Debug, Clone)]
pub struct ArcCSR {
    pub num_nodes: usize,
    pub node_pointers: Vec<usize>,
    pub arc_targets: Vec<usize>,
    pub arc_sources: Vec<usize>,
    pub arc_labels: Vec<usize>,
}

impl ArcCSR {
    /// Builds the CSR from `(from, to)` arcs; each arc is labelled with its position.
    ///
    /// # Errors
    /// Returns `Error::NodeIndexOutOfBounds` if an arc endpoint is `>= num_nodes`.
    pub fn from_arcs(num_nodes: usize, arcs: &[Edge]) -> Result<Self, Error> {
        let labelled: Vec<(usize, usize, usize)> = arcs
            .iter()
            .enumerate()
            .map(|(label, &(u, v))| (u, v, label))
            .collect();
        Self::from_labelled_arcs(num_nodes, &labelled)
    }

    /// Builds the CSR from `(from, to, label)` triples.
    ///
    /// Uses the two-pass counting technique: count out-degrees, prefix-sum them into
    /// `node_pointers`, then place each arc at its node's cursor. No sort is needed and
    /// insertion order is preserved per node.
    pub fn from_labelled_arcs(
        num_nodes: usize,
        arcs: &[(usize, usize, usize)],
    ) -> Result<Self, Error> {
        let m = arcs.len();
        let mut node_pointers = vec![0; num_nodes + 1];

        for &(u, v, _) in arcs {
            if u >= num_nodes {
                return Err(Error::NodeIndexOutOfBounds(u));
            }
            if v >= num_nodes {
                return Err(Error::NodeIndexOutOfBounds(v));
            }
            node_pointers[u + 1] += 1;
        }

        for i in 1..=num_nodes {
            node_pointers[i] += node_pointers[i - 1];
        }

        let mut arc_targets = vec![0; m];
        let mut arc_sources = vec![0; m];
        let mut arc_labels = vec![0; m];

        let mut cursor = node_pointers.clone();

        for &(u, v, label) in arcs {
            let pos = cursor[u]; // Next free slot for node 'u'
            arc_targets[pos] = v;
            arc_sources[pos] = u;
            arc_labels[pos] = label;
            cursor[u] += 1;
        }

        Ok(Self {
            num_nodes,
            node_pointers,
            arc_targets,
            arc_sources,
            arc_labels,
        })
    }

    pub fn num_arcs(&self) -> usize {
        self.arc_targets.len()
    }

    /// CSR index range of the arcs leaving `u`.
    #[inline]
    pub fn arcs_from(&self, u: usize) -> Range<usize> {
        self.node_pointers[u]..self.node_pointers[u + 1]
    }

    pub fn out_degree(&self, u: usize) -> usize {
        self.node_pointers[u + 1] - self.node_pointers[u]
    }

    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.num_nodes];
        for &v in &self.arc_targets {
            degrees[v] += 1;
        }
        degrees
    }

    /// O(1) lookup for the tail of a given arc index.
    ///
    /// # Errors
    /// Returns `Error::NodeIndexOutOfBounds` if `arc_idx` is out of bounds.
    pub fn get_arc_source(&self, arc_idx: usize) -> Result<usize, Error> {
        self.arc_sources
            .get(arc_idx)
            .copied()
            .ok_or(Error::NodeIndexOutOfBounds(arc_idx))
    }
}
