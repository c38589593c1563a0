use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use atsp_core::matrix::CostMatrix;
use common::error::Error;

// ----------------------------
// Synthetic instances
// ----------------------------

/// Range of generated arc costs.
pub const MIN_COST: f64 = 1.0;
pub const MAX_COST: f64 = 100.0;

/// Dense random cost matrix in which a `force_symmetry` fraction of pairs is symmetric.
///
/// Every other pair draws both directions independently. The same seed always yields
/// the same matrix.
pub fn generate_cost_matrix(n: usize, force_symmetry: f64, seed: u64) -> Result<CostMatrix, Error> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let p = force_symmetry.clamp(0.0, 1.0);
    let mut entries = vec![0.0; n * n];

    for u in 0..n {
        for v in (u + 1)..n {
            let forward = rng.random_range(MIN_COST..MAX_COST);
            let backward = if rng.random_bool(p) {
                forward
            } else {
                rng.random_range(MIN_COST..MAX_COST)
            };
            entries[u * n + v] = forward;
            entries[v * n + u] = backward;
        }
    }

    CostMatrix::from_flat(n, entries)
}

/// Symmetric road-like matrix where a `oneways` fraction of pairs can only be travelled
/// in one (random) direction; the other direction is missing (infinite).
///
/// Run it through [`CostMatrix::metric_closure`] to turn missing arcs into detours.
pub fn generate_oneway_matrix(n: usize, oneways: f64, seed: u64) -> Result<CostMatrix, Error> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let p = oneways.clamp(0.0, 1.0);
    let mut entries = vec![0.0; n * n];

    for u in 0..n {
        for v in (u + 1)..n {
            let cost = rng.random_range(MIN_COST..MAX_COST);
            entries[u * n + v] = cost;
            entries[v * n + u] = cost;

            if rng.random_bool(p) {
                let blocked = if rng.random_bool(0.5) { u * n + v } else { v * n + u };
                entries[blocked] = f64::INFINITY;
            }
        }
    }

    CostMatrix::from_flat(n, entries)
}

/// Instance sizes shared by the benchmark binaries.
pub const BENCH_SIZES: [usize; 4] = [50, 100, 200, 400];
pub const BENCH_SEED: u64 = 0x5EED;

#[cfg(test)]
mod tests {
    use super::*;
    use atsp_core::asymmetry::check_symmetry;
    use atsp_core::graph::Graph;

    #[test]
    fn same_seed_same_matrix() {
        let a = generate_cost_matrix(12, 0.5, 42).unwrap();
        let b = generate_cost_matrix(12, 0.5, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn full_symmetry_gives_symmetric_graph() {
        let m = generate_cost_matrix(10, 1.0, 3).unwrap();
        assert!(check_symmetry(&Graph::from_matrix(m)));
    }

    #[test]
    fn no_symmetry_gives_asymmetric_graph() {
        let m = generate_cost_matrix(10, 0.0, 3).unwrap();
        assert!(!check_symmetry(&Graph::from_matrix(m)));
    }

    #[test]
    fn oneways_block_exactly_one_direction() {
        let n = 15;
        let m = generate_oneway_matrix(n, 0.3, 9).unwrap();
        let mut blocked = 0;
        for u in 0..n {
            for v in (u + 1)..n {
                let (f, b) = (m.get(u, v), m.get(v, u));
                assert!(f.is_finite() || b.is_finite());
                if f.is_infinite() || b.is_infinite() {
                    blocked += 1;
                } else {
                    assert_eq!(f, b);
                }
            }
        }
        assert!(blocked > 0);
    }

    #[test]
    fn closure_removes_missing_arcs() {
        let m = generate_oneway_matrix(20, 0.2, 11).unwrap().metric_closure();
        for u in 0..20 {
            for v in 0..20 {
                assert!(m.get(u, v).is_finite());
            }
        }
    }
}
