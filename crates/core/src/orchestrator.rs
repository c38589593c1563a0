use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use common::error::Error;
use common::numeric::SYMMETRIC_FACTOR;
use common::types::Solution;
use tracing::{debug, warn};

use super::asymmetry::AsymmetryProfile;
use super::christofides::ChristofidesExtender;
use super::graph::Graph;
use super::kernel::Kernel;
use super::traits::{ExactOracle, TourExtender, VertexCoverOracle};
use super::tree_doubling::TreeDoublingExtender;

/// Beta that keeps every pair in the kernel: the whole graph is solved exactly.
pub const EXACT_BETA: f64 = 0.0;

/// Which extender reconstructs the full tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    TreeDoubling,
    Christofides,
}

impl Algorithm {
    /// Instantiates the extender; the cover oracle is only consumed by Christofides.
    pub fn extender(self, cover_oracle: Arc<dyn VertexCoverOracle>) -> Arc<dyn TourExtender> {
        match self {
            Algorithm::TreeDoubling => Arc::new(TreeDoublingExtender),
            Algorithm::Christofides => Arc::new(ChristofidesExtender::new(cover_oracle)),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "treedoubling" | "tree-doubling" | "t" => Ok(Algorithm::TreeDoubling),
            "christofides" | "c" => Ok(Algorithm::Christofides),
            other => Err(Error::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Algorithm::TreeDoubling => write!(f, "treedoubling"),
            Algorithm::Christofides => write!(f, "christofides"),
        }
    }
}

/// One (beta, algorithm) evaluation: kernelize, solve the kernel exactly, extend.
///
/// The finished tour is checked against the node set before it is returned. The
/// solution's cost is `None` when the oracle is a placeholder.
pub fn run(
    graph: &Graph,
    extender: &dyn TourExtender,
    beta: f64,
    exact_oracle: &dyn ExactOracle,
) -> Result<Solution, Error> {
    let kernel = Kernel::build(graph, beta)?;
    let kernel_tour = exact_oracle.solve_exact(&kernel.graph)?;
    let tour = extender.extend(graph, &kernel, &kernel_tour)?;
    graph.check_tour(&tour)?;

    let cost = exact_oracle.is_exact().then(|| graph.tour_cost(&tour));
    debug!(
        beta,
        kernel_size = kernel.size(),
        cost,
        extender = extender.name(),
        oracle = exact_oracle.name(),
        "Run complete"
    );

    Ok(Solution {
        beta,
        graph_size: graph.num_nodes(),
        kernel_size: kernel.size(),
        cost,
        tour: graph.relabel(&tour)?,
    })
}

/// Betas visited by a sweep after the exact reference point.
///
/// Starting from a ratio of 1, the beta is the factor found at index
/// `round(ratio · |factors|)` of the descending factor list (or the symmetric identity
/// once the index runs past the end, which keeps every asymmetric pair). The ratio is
/// halved, roughly halving the number of asymmetric pairs, until the index reaches zero,
/// where beta equals the largest factor and the kernel is empty.
pub fn beta_schedule(profile: &AsymmetryProfile) -> Vec<f64> {
    let factors = profile.descending();
    let len = factors.len();
    let mut betas = Vec::new();
    let mut ratio = 1.0f64;

    loop {
        let index = (ratio * len as f64).round() as usize;
        let beta = factors.get(index).copied().unwrap_or(SYMMETRIC_FACTOR);
        betas.push(beta);

        if index == 0 {
            break;
        }
        ratio /= 2.0;
    }

    betas
}

/// Every beta of a sweep, exact reference first.
pub fn sweep_betas(profile: &AsymmetryProfile) -> Vec<f64> {
    std::iter::once(EXACT_BETA)
        .chain(beta_schedule(profile))
        .collect()
}

/// Oracle selection bundled with an extender; drives single runs and sweeps.
#[derive(Clone)]
pub struct Pipeline {
    exact_oracle: Arc<dyn ExactOracle>,
    extender: Arc<dyn TourExtender>,
}

impl Pipeline {
    pub fn new(exact_oracle: Arc<dyn ExactOracle>, extender: Arc<dyn TourExtender>) -> Self {
        Pipeline {
            exact_oracle,
            extender,
        }
    }

    pub fn exact_oracle(&self) -> &dyn ExactOracle {
        self.exact_oracle.as_ref()
    }

    pub fn extender(&self) -> &dyn TourExtender {
        self.extender.as_ref()
    }

    pub fn run(&self, graph: &Graph, beta: f64) -> Result<Solution, Error> {
        run(graph, self.extender.as_ref(), beta, self.exact_oracle.as_ref())
    }

    /// Sequential multi-beta sweep.
    ///
    /// Recoverable failures (structural or oracle errors) skip their beta value with a
    /// warning; anything else aborts the sweep.
    pub fn sweep(&self, graph: &Graph) -> Result<Vec<Solution>, Error> {
        let profile = AsymmetryProfile::new(graph);
        let mut solutions = Vec::new();

        for beta in sweep_betas(&profile) {
            match self.run(graph, beta) {
                Ok(solution) => solutions.push(solution),
                Err(e) if e.is_recoverable() => {
                    warn!(beta, error = %e, "Skipping beta value");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(solutions)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("exact_oracle", &self.exact_oracle.name())
            .field("extender", &self.extender.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::MatchingVertexCover;
    use crate::exact::{DummyOracle, HeldKarpOracle};
    use crate::matrix::CostMatrix;

    fn graph(rows: Vec<Vec<f64>>) -> Graph {
        Graph::from_matrix(CostMatrix::from_rows(rows).unwrap())
    }

    fn pipeline(algorithm: Algorithm) -> Pipeline {
        Pipeline::new(
            Arc::new(HeldKarpOracle::default()),
            algorithm.extender(Arc::new(MatchingVertexCover)),
        )
    }

    /// Metric 5-node instance with a handful of asymmetric pairs.
    fn mostly_symmetric() -> Graph {
        let mut rows: Vec<Vec<f64>> = (0..5)
            .map(|i| (0..5).map(|j| 2.0 * (i as f64 - j as f64).abs()).collect())
            .collect();
        rows[0][2] = 3.0;
        rows[3][4] = 1.5;
        Graph::from_matrix(CostMatrix::from_rows(rows).unwrap().metric_closure())
    }

    #[test]
    fn algorithm_parses_from_names() {
        assert_eq!("treedoubling".parse::<Algorithm>().unwrap(), Algorithm::TreeDoubling);
        assert_eq!("Christofides".parse::<Algorithm>().unwrap(), Algorithm::Christofides);
        assert!(matches!(
            "nearest-neighbour".parse::<Algorithm>(),
            Err(Error::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn schedule_halves_until_empty_kernel() {
        let g = mostly_symmetric();
        let profile = AsymmetryProfile::new(&g);
        let betas = beta_schedule(&profile);

        assert_eq!(betas.first(), Some(&SYMMETRIC_FACTOR));
        assert_eq!(betas.last(), profile.descending().first());

        let kernel_sizes: Vec<usize> = betas
            .iter()
            .map(|&b| Kernel::build(&g, b).unwrap().size())
            .collect();
        assert!(
            kernel_sizes.windows(2).all(|w| w[0] >= w[1]),
            "kernel sizes should shrink: {:?}",
            kernel_sizes
        );
        assert_eq!(kernel_sizes.last(), Some(&0));
    }

    #[test]
    fn schedule_for_single_node_graph() {
        let g = graph(vec![vec![0.0]]);
        let profile = AsymmetryProfile::new(&g);
        assert_eq!(beta_schedule(&profile), vec![SYMMETRIC_FACTOR]);
        assert_eq!(sweep_betas(&profile), vec![EXACT_BETA, SYMMETRIC_FACTOR]);
    }

    #[test]
    fn exact_beta_matches_oracle_cost_for_both_algorithms() {
        let g = mostly_symmetric();
        let exact = HeldKarpOracle::default().solve_exact(&g).unwrap();

        for algorithm in [Algorithm::TreeDoubling, Algorithm::Christofides] {
            let solution = pipeline(algorithm).run(&g, EXACT_BETA).unwrap();
            assert_eq!(solution.kernel_size, 5);
            assert_eq!(solution.cost, Some(exact.cost), "{} lost exactness", algorithm);
        }
    }

    #[test]
    fn sweep_emits_exact_reference_first() {
        let g = mostly_symmetric();
        let solutions = pipeline(Algorithm::TreeDoubling).sweep(&g).unwrap();
        let profile = AsymmetryProfile::new(&g);

        assert_eq!(solutions.len(), sweep_betas(&profile).len());
        assert_eq!(solutions[0].beta, EXACT_BETA);
        assert_eq!(solutions[0].kernel_size, 5);
        assert_eq!(solutions.last().map(|s| s.kernel_size), Some(0));
        for s in &solutions {
            let mut sorted = s.tour.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn dummy_oracle_leaves_cost_undefined() {
        let g = mostly_symmetric();
        let p = Pipeline::new(
            Arc::new(DummyOracle),
            Algorithm::TreeDoubling.extender(Arc::new(MatchingVertexCover)),
        );
        let solution = p.run(&g, 1.0).unwrap();

        assert_eq!(solution.cost, None);
        assert_eq!(solution.tour.len(), 5);
    }

    #[test]
    fn sweep_skips_structural_failures() {
        let inf = f64::INFINITY;
        let mut rows = vec![vec![inf; 6]; 6];
        for block in [0..3, 3..6] {
            for i in block.clone() {
                for j in block.clone() {
                    rows[i][j] = if i == j { 0.0 } else { 1.0 };
                }
            }
        }
        let g = graph(rows);

        let solutions = pipeline(Algorithm::TreeDoubling).sweep(&g).unwrap();
        assert!(solutions.is_empty());
    }

    #[test]
    fn invalid_beta_is_a_configuration_error() {
        let g = mostly_symmetric();
        assert!(matches!(
            pipeline(Algorithm::Christofides).run(&g, -1.0),
            Err(Error::InvalidBeta(_))
        ));
    }

    #[test]
    fn relabelled_graph_reports_input_identifiers() {
        let m = CostMatrix::from_rows(vec![
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ])
        .unwrap();
        let g = Graph::with_labels(m, vec![10, 20, 30]).unwrap();
        let solution = pipeline(Algorithm::TreeDoubling).run(&g, 1.0).unwrap();

        let mut labels = solution.tour.clone();
        labels.sort_unstable();
        assert_eq!(labels, vec![10, 20, 30]);
    }
}
