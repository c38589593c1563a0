pub mod args;
pub mod compare;
pub mod concorde;
pub mod config;
pub mod error;
pub mod parser;
pub mod sweep;
pub mod writer;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use args::{Cli, Mode};
use atsp_core::asymmetry::AsymmetryProfile;
use atsp_core::graph::Graph;
use atsp_core::kernel::validate_beta;
use atsp_core::orchestrator::{Algorithm, Pipeline, sweep_betas};
use atsp_core::traits::ExactOracle;
use crate::config::{Config, ExactOracleKind};
use error::Error;
use sweep::BetaSweeper;
use writer::{OutputFormat, Writer};

const DEFAULT_LOG_FILTER: &str = "executor=info,atsp_core=info";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Aborting");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries only results.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), Error> {
    let config = crate::config::load_config(cli.config.as_deref())?;
    let graph = Arc::new(load_graph(&cli).await?);

    match cli.mode() {
        Mode::Compare => run_comparison(graph, config).await,
        Mode::Solve(algorithm) => solve(&cli, algorithm, graph, config).await,
    }
}

/// Loads the matrix, drops dead nodes and closes it under shortest paths.
///
/// Surviving nodes keep their input indices as labels.
async fn load_graph(cli: &Cli) -> Result<Graph, Error> {
    let path = cli.graph.clone();
    tokio::task::spawn_blocking(move || -> Result<Graph, Error> {
        let matrix = parser::load_matrix(&path)?;
        let original_size = matrix.size();
        let (matrix, kept) = matrix.remove_dead_nodes();
        let matrix = matrix.metric_closure();

        info!(
            path = %path.display(),
            nodes = kept.len(),
            dead_nodes = original_size - kept.len(),
            "Graph ready"
        );
        Ok(Graph::with_labels(matrix, kept)?)
    })
    .await?
}

async fn solve(cli: &Cli, algorithm: Algorithm, graph: Arc<Graph>, config: Config) -> Result<(), Error> {
    let compute_tour = cli.compute_tour();
    let exact_oracle = config.exact_oracle(compute_tour);
    let pipeline = Pipeline::new(exact_oracle, algorithm.extender(config.cover_oracle()));

    let betas = if cli.multibeta {
        sweep_betas(&AsymmetryProfile::new(&graph))
    } else {
        cli.beta
            .iter()
            .map(|&b| validate_beta(b))
            .collect::<Result<Vec<_>, _>>()?
    };

    let sweeper = BetaSweeper::new(
        pipeline,
        graph,
        config.sweep.max_parallel,
        config.beta_timeout(),
    );
    let solutions = sweeper.run(&betas).await?;

    let mut writer = Writer::new(
        io::stdout().lock(),
        OutputFormat {
            compute_tour,
            output_tour: cli.tour,
        },
    );
    writer.write_header()?;
    writer.write_solutions(&solutions)
}

async fn run_comparison(graph: Arc<Graph>, config: Config) -> Result<(), Error> {
    let rows = tokio::task::spawn_blocking(move || {
        let exact_oracle = config.exact_oracle(true);
        let held_karp = config.held_karp();
        let reference: Option<&dyn ExactOracle> = match config.exact.oracle {
            ExactOracleKind::HeldKarp => None,
            ExactOracleKind::Concorde => Some(&held_karp),
        };
        let mut rng = SmallRng::from_os_rng();

        compare::compare_algorithms(
            &graph,
            exact_oracle.as_ref(),
            reference,
            config.cover_oracle(),
            &mut rng,
        )
    })
    .await?;

    for row in rows {
        println!("{}", row);
    }
    Ok(())
}
