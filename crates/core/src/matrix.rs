use common::error::Error;
use tracing::debug;

/// Square matrix of directed costs, stored row-major.
///
/// - `get(u, v)` → cost of travelling from `u` to `v`
/// - diagonal entries are excluded and always read as `0.0`
/// - `f64::INFINITY` marks a missing arc
///
/// Validation rejects NaN and negative off-diagonal entries.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    size: usize,
    entries: Vec<f64>,
}

impl CostMatrix {
    /// Builds a matrix from its rows. Every row must have exactly `rows.len()` entries.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, Error> {
        let size = rows.len();
        let mut entries = Vec::with_capacity(size * size);

        for (u, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(Error::InvalidMatrix(format!(
                    "row {} has {} entries, expected {}",
                    u,
                    row.len(),
                    size
                )));
            }
            entries.extend(row);
        }

        Self::from_flat(size, entries)
    }

    /// Builds a matrix from `size * size` row-major entries.
    pub fn from_flat(size: usize, mut entries: Vec<f64>) -> Result<Self, Error> {
        if entries.len() != size * size {
            return Err(Error::InvalidMatrix(format!(
                "expected {} entries for dimension {}, found {}",
                size * size,
                size,
                entries.len()
            )));
        }

        for u in 0..size {
            for v in 0..size {
                let idx = u * size + v;
                if u == v {
                    entries[idx] = 0.0;
                    continue;
                }
                let c = entries[idx];
                if c.is_nan() || c < 0.0 {
                    return Err(Error::InvalidMatrix(format!(
                        "entry ({}, {}) = {} is not a non-negative cost",
                        u, v, c
                    )));
                }
            }
        }

        Ok(CostMatrix { size, entries })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, u: usize, v: usize) -> f64 {
        self.entries[u * self.size + v]
    }

    pub(crate) fn into_entries(self) -> Vec<f64> {
        self.entries
    }

    /// Removes nodes that cannot lie on any Hamiltonian cycle.
    ///
    /// A node is dead when it has no finite outgoing arc or no finite incoming arc
    /// towards another live node. Removal repeats until a fixpoint, since dropping one
    /// node can strand its neighbours.
    ///
    /// # Returns
    /// The reduced matrix together with the original index of every kept node, in order.
    pub fn remove_dead_nodes(&self) -> (CostMatrix, Vec<usize>) {
        let n = self.size;
        let mut alive = vec![true; n];

        loop {
            let mut changed = false;
            for u in 0..n {
                if !alive[u] {
                    continue;
                }
                let has_out = (0..n).any(|v| v != u && alive[v] && self.get(u, v).is_finite());
                let has_in = (0..n).any(|v| v != u && alive[v] && self.get(v, u).is_finite());
                if !has_out || !has_in {
                    alive[u] = false;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let kept: Vec<usize> = (0..n).filter(|&u| alive[u]).collect();
        // A lone survivor has no arcs to test against, keep it.
        let kept = if kept.is_empty() && n == 1 { vec![0] } else { kept };

        if kept.len() < n {
            debug!(removed = n - kept.len(), "Removed dead nodes");
        }

        let size = kept.len();
        let mut entries = Vec::with_capacity(size * size);
        for &u in &kept {
            for &v in &kept {
                entries.push(self.get(u, v));
            }
        }

        (CostMatrix { size, entries }, kept)
    }

    /// All-pairs shortest path closure (Floyd–Warshall).
    ///
    /// The result satisfies `c(u, w) <= c(u, v) + c(v, w)` for every triple. Unreachable
    /// pairs stay infinite.
    pub fn metric_closure(&self) -> CostMatrix {
        let n = self.size;
        let mut d = self.entries.clone();

        for k in 0..n {
            for i in 0..n {
                let d_ik = d[i * n + k];
                if d_ik.is_infinite() {
                    continue;
                }
                for j in 0..n {
                    let via = d_ik + d[k * n + j];
                    if via < d[i * n + j] {
                        d[i * n + j] = via;
                    }
                }
            }
        }

        for i in 0..n {
            d[i * n + i] = 0.0;
        }

        CostMatrix {
            size: n,
            entries: d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INF: f64 = f64::INFINITY;

    #[test]
    fn from_rows_rejects_ragged_input() {
        let result = CostMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]);
        assert!(matches!(result, Err(Error::InvalidMatrix(_))));
    }

    #[test]
    fn from_rows_rejects_negative_costs() {
        let result = CostMatrix::from_rows(vec![vec![0.0, -1.0], vec![1.0, 0.0]]);
        assert!(matches!(result, Err(Error::InvalidMatrix(_))));
    }

    #[test]
    fn diagonal_is_ignored() {
        let m = CostMatrix::from_rows(vec![vec![-5.0, 1.0], vec![2.0, f64::NAN]]).unwrap();
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(1, 1), 0.0);
        assert_eq!(m.get(1, 0), 2.0);
    }

    #[test]
    fn metric_closure_shortens_detours() {
        let m = CostMatrix::from_rows(vec![
            vec![0.0, 1.0, 10.0],
            vec![1.0, 0.0, 1.0],
            vec![10.0, 1.0, 0.0],
        ])
        .unwrap();

        let closed = m.metric_closure();
        assert_eq!(closed.get(0, 2), 2.0);
        assert_eq!(closed.get(2, 0), 2.0);
        assert_eq!(closed.get(0, 1), 1.0);
    }

    #[test]
    fn metric_closure_keeps_unreachable_pairs_infinite() {
        let m = CostMatrix::from_rows(vec![
            vec![0.0, 1.0, INF, INF],
            vec![1.0, 0.0, INF, INF],
            vec![INF, INF, 0.0, 2.0],
            vec![INF, INF, 2.0, 0.0],
        ])
        .unwrap();

        let closed = m.metric_closure();
        assert!(closed.get(0, 3).is_infinite());
        assert_eq!(closed.get(2, 3), 2.0);
    }

    #[test]
    fn remove_dead_nodes_drops_sinks_and_sources() {
        // Node 2 can be entered but never left.
        let m = CostMatrix::from_rows(vec![
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![INF, INF, 0.0],
        ])
        .unwrap();

        let (reduced, kept) = m.remove_dead_nodes();
        assert_eq!(kept, vec![0, 1]);
        assert_eq!(reduced.size(), 2);
        assert_eq!(reduced.get(0, 1), 1.0);
    }

    #[test]
    fn remove_dead_nodes_is_identity_on_complete_matrix() {
        let m = CostMatrix::from_rows(vec![
            vec![0.0, 3.0, 4.0],
            vec![3.0, 0.0, 5.0],
            vec![4.0, 5.0, 0.0],
        ])
        .unwrap();

        let (reduced, kept) = m.remove_dead_nodes();
        assert_eq!(kept, vec![0, 1, 2]);
        assert_eq!(reduced, m);
    }
}
