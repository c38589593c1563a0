use std::hint::black_box;
use std::sync::Arc;
use std::time::Instant;

use atsp_core::asymmetry::AsymmetryProfile;
use atsp_core::cover::MatchingVertexCover;
use atsp_core::exact::HeldKarpOracle;
use atsp_core::graph::Graph;
use atsp_core::kernel::Kernel;
use atsp_core::orchestrator::{Algorithm, beta_schedule, run};
use perf_bench::*;

const ONEWAYS: f64 = 0.1;
/// Largest kernel the benchmark hands to Held–Karp.
const KERNEL_LIMIT: usize = 12;

fn main() {
    let oracle = HeldKarpOracle::default();

    for &n in BENCH_SIZES.iter() {
        let graph = match generate_oneway_matrix(n, ONEWAYS, BENCH_SEED) {
            Ok(m) => Graph::from_matrix(m.metric_closure()),
            Err(e) => {
                eprintln!("Failed to generate {} nodes: {}", n, e);
                continue;
            }
        };

        // Loosest scheduled beta whose kernel Held–Karp can still take.
        let profile = AsymmetryProfile::new(&graph);
        let beta = beta_schedule(&profile).into_iter().find(|&b| {
            Kernel::build(&graph, b)
                .map(|k| k.size() <= KERNEL_LIMIT)
                .unwrap_or(false)
        });
        let Some(beta) = beta else {
            eprintln!("No beta keeps the kernel of {} nodes under {}", n, KERNEL_LIMIT);
            continue;
        };

        println!("--- Extender Benchmark ({} nodes, beta {:.4}) ---", n, beta);

        for algorithm in [Algorithm::TreeDoubling, Algorithm::Christofides] {
            let extender = algorithm.extender(Arc::new(MatchingVertexCover));

            let start_time = Instant::now();
            let result = run(black_box(&graph), extender.as_ref(), beta, &oracle);
            let elapsed_time = start_time.elapsed();

            match result {
                Ok(solution) => println!(
                    "{:<14} kernel {:>3}  cost {:>12.2}  {:?}",
                    algorithm.to_string(),
                    solution.kernel_size,
                    solution.cost.unwrap_or(f64::NAN),
                    elapsed_time
                ),
                Err(e) => eprintln!("{}: {}", algorithm, e),
            }
        }
    }
}
