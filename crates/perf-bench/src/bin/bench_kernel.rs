use std::hint::black_box;
use std::time::Instant;

use atsp_core::asymmetry::AsymmetryProfile;
use atsp_core::graph::Graph;
use atsp_core::kernel::Kernel;
use atsp_core::orchestrator::beta_schedule;
use perf_bench::*;

const FORCE_SYMMETRY: f64 = 0.9;

fn main() {
    for &n in BENCH_SIZES.iter() {
        let matrix = match generate_cost_matrix(n, FORCE_SYMMETRY, BENCH_SEED) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Failed to generate {} nodes: {}", n, e);
                continue;
            }
        };
        let graph = Graph::from_matrix(matrix.metric_closure());

        let start_time = Instant::now();
        let profile = AsymmetryProfile::new(&graph);
        let profile_time = start_time.elapsed();

        println!("--- Kernel Sweep ({} nodes, {} pairs) ---", n, profile.len());
        println!("Profile: {:?}", profile_time);

        for beta in beta_schedule(&profile) {
            let start_time = Instant::now();
            let kernel = Kernel::build(black_box(&graph), beta);
            let elapsed_time = start_time.elapsed();

            match kernel {
                Ok(k) => println!(
                    "beta {:>10.4}  kernel {:>4}  asymmetric pairs {:>6}  {:?}",
                    beta,
                    black_box(k.size()),
                    profile.count_above(beta),
                    elapsed_time
                ),
                Err(e) => eprintln!("beta {}: {}", beta, e),
            }
        }
    }
}
