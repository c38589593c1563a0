use std::time::{Duration, Instant};

use super::graph::Graph;
use super::traits::ExactOracle;
use common::{error::Error, types::ExactTour};
use tracing::debug;

/// Default node limit for the dynamic-programming table (~90 MB at 20 nodes).
pub const DEFAULT_MAX_NODES: usize = 20;

/// Parents are stored as `u8`; the table itself becomes infeasible long before this.
const HARD_MAX_NODES: usize = 32;

const NO_PARENT: u8 = u8::MAX;

/// How often (in processed subsets) the wall-clock budget is checked.
const BUDGET_CHECK_MASK: usize = 0xFFF;

/// Exact oracle implementing the Held–Karp dynamic program.
///
/// State is `(visited subset, current node)`; node 0 is the fixed start. Time is
/// `O(2^n · n^2)` and memory `O(2^n · n)`, so the oracle refuses instances above
/// `max_nodes` instead of exhausting memory.
#[derive(Debug, Clone)]
pub struct HeldKarpOracle {
    max_nodes: usize,
    time_budget: Option<Duration>,
}

impl Default for HeldKarpOracle {
    fn default() -> Self {
        HeldKarpOracle {
            max_nodes: DEFAULT_MAX_NODES,
            time_budget: None,
        }
    }
}

impl HeldKarpOracle {
    pub fn new(max_nodes: usize, time_budget: Option<Duration>) -> Self {
        HeldKarpOracle {
            max_nodes: max_nodes.min(HARD_MAX_NODES),
            time_budget,
        }
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    fn check_budget(&self, started: Instant) -> Result<(), Error> {
        match self.time_budget {
            Some(budget) if started.elapsed() > budget => Err(Error::OracleTimeout(budget)),
            _ => Ok(()),
        }
    }
}

impl ExactOracle for HeldKarpOracle {
    /// Solves the instance exactly.
    ///
    /// # Errors
    /// - `Error::KernelTooLarge` when the graph exceeds `max_nodes`.
    /// - `Error::OracleTimeout` when the optional time budget runs out.
    /// - `Error::NoHamiltonianCycle` when every cycle uses an infinite arc.
    fn solve_exact(&self, graph: &Graph) -> Result<ExactTour, Error> {
        let n = graph.num_nodes();
        match n {
            0 => return Ok(ExactTour::new(0.0, Vec::new())),
            1 => return Ok(ExactTour::new(0.0, vec![0])),
            _ => {}
        }
        if n > self.max_nodes {
            return Err(Error::KernelTooLarge {
                size: n,
                limit: self.max_nodes,
            });
        }

        let started = Instant::now();

        // Nodes 1..n live in bits 0..m of the subset mask.
        let m = n - 1;
        let full = 1usize << m;
        let mut dp = vec![f64::INFINITY; full * m];
        let mut parent = vec![NO_PARENT; full * m];

        for j in 0..m {
            dp[(1 << j) * m + j] = graph.cost(0, j + 1);
        }

        for mask in 1..full {
            if mask & BUDGET_CHECK_MASK == 0 {
                self.check_budget(started)?;
            }
            for j in 0..m {
                if mask & (1 << j) == 0 {
                    continue;
                }
                let current = dp[mask * m + j];
                if current.is_infinite() {
                    continue;
                }
                for k in 0..m {
                    if mask & (1 << k) != 0 {
                        continue;
                    }
                    let next = (mask | (1 << k)) * m + k;
                    let candidate = current + graph.cost(j + 1, k + 1);
                    if candidate < dp[next] {
                        dp[next] = candidate;
                        parent[next] = j as u8;
                    }
                }
            }
        }

        let last = full - 1;
        let (best_end, best_cost) = (0..m)
            .map(|j| (j, dp[last * m + j] + graph.cost(j + 1, 0)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or(Error::NoHamiltonianCycle(n))?;

        if best_cost.is_infinite() {
            return Err(Error::NoHamiltonianCycle(n));
        }

        let mut tour = Vec::with_capacity(n);
        let mut mask = last;
        let mut j = best_end;
        loop {
            tour.push(j + 1);
            let p = parent[mask * m + j];
            mask ^= 1 << j;
            if p == NO_PARENT {
                break;
            }
            j = p as usize;
        }
        tour.push(0);
        tour.reverse();

        if tour.len() != n {
            return Err(Error::IncompleteTour {
                visited: tour.len(),
                expected: n,
            });
        }

        debug!(nodes = n, cost = best_cost, elapsed = ?started.elapsed(), "Held-Karp solved");
        Ok(ExactTour::new(graph.tour_cost(&tour), tour))
    }

    fn name(&self) -> &'static str {
        "held-karp"
    }
}

/// Placeholder oracle: skips exact solving and returns the identity order at zero cost.
///
/// Used when only kernel sizes are measured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyOracle;

impl ExactOracle for DummyOracle {
    fn solve_exact(&self, graph: &Graph) -> Result<ExactTour, Error> {
        Ok(ExactTour::new(0.0, (0..graph.num_nodes()).collect()))
    }

    fn is_exact(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "dummy"
    }
}
