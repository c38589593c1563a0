use std::fmt;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use atsp_core::graph::Graph;
use atsp_core::orchestrator::{Algorithm, run};
use atsp_core::traits::{ExactOracle, VertexCoverOracle};
use common::error::Error;
use common::numeric::SYMMETRIC_FACTOR;
use common::types::{ExactTour, Tour};

/// Beta used for the extenders in comparison mode: every asymmetric pair is kept.
pub const COMPARE_BETA: f64 = SYMMETRIC_FACTOR;

/// One line of the comparison table.
#[derive(Debug)]
pub struct ComparisonRow {
    pub label: String,
    pub outcome: Result<ExactTour, Error>,
}

impl fmt::Display for ComparisonRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(t) => {
                let tour: Vec<String> = t.tour.iter().map(|n| n.to_string()).collect();
                write!(f, "{}: cost {}, tour {}", self.label, t.cost, tour.join(" "))
            }
            Err(e) => write!(f, "{}: failed ({})", self.label, e),
        }
    }
}

/// Random permutation of every node, a baseline for the other rows.
pub fn random_tour<R: Rng + ?Sized>(graph: &Graph, rng: &mut R) -> ExactTour {
    let mut tour: Tour = (0..graph.num_nodes()).collect();
    tour.shuffle(rng);
    ExactTour::new(graph.tour_cost(&tour), tour)
}

/// Runs both extenders, the exact oracle(s) and a random baseline on the same graph.
///
/// `reference` is an extra exact oracle (typically Held–Karp) printed next to the
/// configured one; pass `None` when both would be the same. Failures are reported per
/// row rather than aborting the comparison.
pub fn compare_algorithms<R: Rng + ?Sized>(
    graph: &Graph,
    exact_oracle: &dyn ExactOracle,
    reference: Option<&dyn ExactOracle>,
    cover_oracle: Arc<dyn VertexCoverOracle>,
    rng: &mut R,
) -> Vec<ComparisonRow> {
    let mut rows = Vec::new();

    for algorithm in [Algorithm::TreeDoubling, Algorithm::Christofides] {
        let extender = algorithm.extender(cover_oracle.clone());
        let outcome = run(graph, extender.as_ref(), COMPARE_BETA, exact_oracle).map(|s| {
            ExactTour::new(s.cost.unwrap_or(0.0), s.tour)
        });
        rows.push(ComparisonRow {
            label: format!("generalized {} ({})", algorithm, exact_oracle.name()),
            outcome,
        });
    }

    for oracle in std::iter::once(exact_oracle).chain(reference) {
        rows.push(ComparisonRow {
            label: oracle.name().to_string(),
            outcome: solve_labelled(graph, oracle),
        });
    }

    rows.push(ComparisonRow {
        label: "random".to_string(),
        outcome: relabel(graph, random_tour(graph, rng)),
    });

    info!(rows = rows.len(), "Comparison complete");
    rows
}

fn solve_labelled(graph: &Graph, oracle: &dyn ExactOracle) -> Result<ExactTour, Error> {
    relabel(graph, oracle.solve_exact(graph)?)
}

fn relabel(graph: &Graph, tour: ExactTour) -> Result<ExactTour, Error> {
    Ok(ExactTour::new(tour.cost, graph.relabel(&tour.tour)?))
}
