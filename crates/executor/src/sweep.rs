use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::error::Error;
use atsp_core::graph::Graph;
use atsp_core::orchestrator::Pipeline;
use common::error::Error as AtspError;
use common::types::Solution;

/// Outcome of one beta value: a solution, or the reason it was skipped.
type BetaResult = Result<Option<Solution>, Error>;

/// Runs one pipeline over many beta values concurrently.
///
/// Every beta value is an independent blocking job sharing the read-only graph. At most
/// `max_parallel` jobs run at once; results come back in the order the betas were given.
pub struct BetaSweeper {
    pipeline: Pipeline,
    graph: Arc<Graph>,
    max_parallel: usize,
    beta_timeout: Option<Duration>,
}

impl BetaSweeper {
    pub fn new(
        pipeline: Pipeline,
        graph: Arc<Graph>,
        max_parallel: usize,
        beta_timeout: Option<Duration>,
    ) -> Self {
        BetaSweeper {
            pipeline,
            graph,
            max_parallel: max_parallel.max(1),
            beta_timeout,
        }
    }

    /// Evaluates every beta value.
    ///
    /// Recoverable failures and timeouts are logged and skipped. Configuration errors,
    /// resource exhaustion and invariant violations abort the sweep.
    pub async fn run(&self, betas: &[f64]) -> Result<Vec<Solution>, Error> {
        info!(
            betas = betas.len(),
            max_parallel = self.max_parallel,
            extender = self.pipeline.extender().name(),
            oracle = self.pipeline.exact_oracle().name(),
            "Starting sweep"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let handles: Vec<JoinHandle<BetaResult>> = betas
            .iter()
            .map(|&beta| self.spawn_beta(beta, semaphore.clone()))
            .collect();

        let mut solutions = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Some(solution) = handle.await?? {
                solutions.push(solution);
            }
        }

        info!(
            solved = solutions.len(),
            skipped = betas.len() - solutions.len(),
            "Sweep complete"
        );
        Ok(solutions)
    }

    fn spawn_beta(&self, beta: f64, semaphore: Arc<Semaphore>) -> JoinHandle<BetaResult> {
        tokio::spawn(evaluate_beta(
            self.pipeline.clone(),
            self.graph.clone(),
            beta,
            semaphore,
            self.beta_timeout,
        ))
    }
}

async fn evaluate_beta(
    pipeline: Pipeline,
    graph: Arc<Graph>,
    beta: f64,
    semaphore: Arc<Semaphore>,
    beta_timeout: Option<Duration>,
) -> BetaResult {
    let permit = semaphore
        .acquire_owned()
        .await
        .map_err(|_| Error::SweepCancelled)?;

    // The permit lives as long as the blocking job, even past a timeout.
    let job = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        pipeline.run(&graph, beta)
    });

    let outcome = match beta_timeout {
        Some(limit) => match tokio::time::timeout(limit, job).await {
            Ok(joined) => joined?,
            Err(_) => Err(AtspError::OracleTimeout(limit)),
        },
        None => job.await?,
    };

    match outcome {
        Ok(solution) => Ok(Some(solution)),
        Err(e) if e.is_recoverable() => {
            warn!(beta, error = %e, "Skipping beta value");
            Ok(None)
        }
        Err(e) => Err(Error::GraphError(e)),
    }
}
