use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::debug;

use atsp_core::exact::HeldKarpOracle;
use atsp_core::graph::Graph;
use atsp_core::traits::ExactOracle;
use common::error::Error;
use common::types::{ExactTour, Tour};

const PROBLEM_FILE: &str = "kernel.tsp";
const SOLUTION_FILE: &str = "kernel.sol";

/// Below this size the symmetric transformation degenerates; Held–Karp answers instantly.
const MIN_CONCORDE_NODES: usize = 4;

/// Exact oracle backed by the external Concorde TSP solver.
///
/// Concorde only handles symmetric instances, so every ATSP instance on `n` nodes is
/// rewritten into a symmetric one on `2n` nodes: each node `i` gets a ghost `i' = n + i`
/// joined to it at zero cost, arc `i -> j` becomes edge `{i', j}` with cost
/// `c(i,j) + M`, and all other edges are forbidden. An optimal symmetric tour alternates
/// between nodes and their ghosts and reads back as an optimal directed tour.
///
/// Must be called from a blocking context (e.g. `spawn_blocking`) inside a Tokio runtime.
#[derive(Debug, Clone)]
pub struct ConcordeOracle {
    binary: PathBuf,
    scale: f64,
    timeout: Option<Duration>,
}

impl ConcordeOracle {
    pub fn new(binary: PathBuf, scale: f64, timeout: Option<Duration>) -> Self {
        ConcordeOracle {
            binary,
            scale,
            timeout,
        }
    }

    async fn run_solver(&self, workdir: &Path) -> Result<(), Error> {
        let mut command = Command::new(&self.binary);
        command
            .arg("-x")
            .arg("-o")
            .arg(SOLUTION_FILE)
            .arg(PROBLEM_FILE)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = command.output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, output)
                .await
                .map_err(|_| Error::OracleTimeout(limit))?,
            None => output.await,
        }
        .map_err(|e| {
            Error::OracleUnavailable(format!("{}: {}", self.binary.display(), e))
        })?;

        if !output.status.success() {
            return Err(Error::OracleFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl ExactOracle for ConcordeOracle {
    /// # Errors
    /// - `Error::OracleUnavailable` if the binary cannot be started or no runtime is active.
    /// - `Error::OracleFailed` on a non-zero exit status.
    /// - `Error::OracleTimeout` when the configured timeout expires (the process is killed).
    /// - `Error::OracleOutput` if the solution file cannot be read back.
    /// - `Error::NoHamiltonianCycle` if the best tour still needs a missing arc.
    fn solve_exact(&self, graph: &Graph) -> Result<ExactTour, Error> {
        let n = graph.num_nodes();
        if n < MIN_CONCORDE_NODES {
            return HeldKarpOracle::default().solve_exact(graph);
        }

        let handle = Handle::try_current()
            .map_err(|e| Error::OracleUnavailable(format!("no async runtime: {}", e)))?;

        let workdir = tempfile::tempdir()
            .map_err(|e| Error::OracleUnavailable(format!("temporary directory: {}", e)))?;

        let matrix = symmetric_transform(graph, self.scale)?;
        std::fs::write(workdir.path().join(PROBLEM_FILE), tsplib_problem(&matrix))
            .map_err(|e| Error::OracleUnavailable(format!("writing problem file: {}", e)))?;

        handle.block_on(self.run_solver(workdir.path()))?;

        let solution = std::fs::read_to_string(workdir.path().join(SOLUTION_FILE))
            .map_err(|e| Error::OracleOutput(format!("reading solution file: {}", e)))?;
        let tour = parse_solution(&solution, n)?;

        let cost = graph.tour_cost(&tour);
        if !cost.is_finite() {
            return Err(Error::NoHamiltonianCycle(n));
        }

        debug!(nodes = n, cost, "Concorde solved");
        Ok(ExactTour::new(cost, tour))
    }

    fn name(&self) -> &'static str {
        "concorde"
    }
}

/// Builds the `2n × 2n` symmetric integer matrix for an `n`-node directed graph.
///
/// Costs are multiplied by `scale` and rounded. `M = n · max_cost + 1` makes every tour
/// that alternates real and ghost nodes cheaper than any tour that does not, and
/// forbidden edges cost more than any alternating tour.
///
/// # Errors
/// Returns `Error::InvalidMatrix` if the scaled values do not fit Concorde's 32-bit costs.
pub fn symmetric_transform(graph: &Graph, scale: f64) -> Result<Vec<Vec<i64>>, Error> {
    let n = graph.num_nodes();
    let scaled = |u: usize, v: usize| -> Option<i64> {
        let c = graph.cost(u, v);
        c.is_finite().then(|| (c * scale).round() as i64)
    };

    let max_cost = (0..n)
        .flat_map(|u| (0..n).filter(move |&v| v != u).map(move |v| (u, v)))
        .filter_map(|(u, v)| scaled(u, v))
        .max()
        .unwrap_or(0);

    let n_i = n as i64;
    let big_m = n_i
        .checked_mul(max_cost)
        .and_then(|x| x.checked_add(1))
        .ok_or_else(|| overflow(scale))?;
    let forbidden = max_cost
        .checked_add(big_m)
        .and_then(|x| x.checked_mul(n_i))
        .and_then(|x| x.checked_add(1))
        .ok_or_else(|| overflow(scale))?;
    if forbidden > i64::from(i32::MAX) {
        return Err(overflow(scale));
    }

    let mut matrix = vec![vec![forbidden; 2 * n]; 2 * n];
    for i in 0..n {
        matrix[i][i] = 0;
        matrix[n + i][n + i] = 0;
        matrix[i][n + i] = 0;
        matrix[n + i][i] = 0;
        for j in (0..n).filter(|&j| j != i) {
            if let Some(c) = scaled(i, j) {
                matrix[n + i][j] = c + big_m;
                matrix[j][n + i] = c + big_m;
            }
        }
    }

    Ok(matrix)
}

fn overflow(scale: f64) -> Error {
    Error::InvalidMatrix(format!(
        "costs scaled by {} exceed Concorde's 32-bit range; lower concorde.scale",
        scale
    ))
}

/// Renders a symmetric matrix as a TSPLIB `EXPLICIT`/`FULL_MATRIX` problem.
pub fn tsplib_problem(matrix: &[Vec<i64>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "NAME: kernel");
    let _ = writeln!(out, "TYPE: TSP");
    let _ = writeln!(out, "DIMENSION: {}", matrix.len());
    let _ = writeln!(out, "EDGE_WEIGHT_TYPE: EXPLICIT");
    let _ = writeln!(out, "EDGE_WEIGHT_FORMAT: FULL_MATRIX");
    let _ = writeln!(out, "EDGE_WEIGHT_SECTION");
    for row in matrix {
        let line: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    let _ = writeln!(out, "EOF");
    out
}

/// Reads a Concorde `.sol` file for a transformed `n`-node instance back into a directed
/// tour over the original nodes, starting at node 0.
///
/// The file holds the dimension followed by the visiting order. After rotating node 0 to
/// the front, its ghost must come next; otherwise the tour was written backwards.
pub fn parse_solution(content: &str, n: usize) -> Result<Tour, Error> {
    let mut tokens = content.split_whitespace().map(|t| {
        t.parse::<usize>()
            .map_err(|_| Error::OracleOutput(format!("invalid token '{}'", t)))
    });

    let dimension = tokens
        .next()
        .ok_or_else(|| Error::OracleOutput("empty solution file".into()))??;
    if dimension != 2 * n {
        return Err(Error::OracleOutput(format!(
            "expected dimension {}, found {}",
            2 * n,
            dimension
        )));
    }

    let mut order: Vec<usize> = tokens.collect::<Result<_, _>>()?;
    if order.len() != 2 * n {
        return Err(Error::OracleOutput(format!(
            "expected {} nodes, found {}",
            2 * n,
            order.len()
        )));
    }

    let start = order
        .iter()
        .position(|&v| v == 0)
        .ok_or_else(|| Error::OracleOutput("node 0 missing from solution".into()))?;
    order.rotate_left(start);

    if order[1] != n {
        order.reverse();
        order.rotate_right(1);
    }

    let mut tour = Vec::with_capacity(n);
    for pair in order.chunks(2) {
        let (real, ghost) = (pair[0], pair[1]);
        if real >= n || ghost != real + n {
            return Err(Error::OracleOutput(format!(
                "solution does not alternate nodes and ghosts at {} -> {}",
                real, ghost
            )));
        }
        tour.push(real);
    }

    Ok(tour)
}
