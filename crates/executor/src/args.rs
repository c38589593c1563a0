use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use atsp_core::orchestrator::Algorithm;

/// Asymmetry-bounded ATSP kernelization.
///
/// Pairs whose asymmetry factor exceeds beta form the kernel, which is solved exactly;
/// all other nodes are attached by a symmetric approximation.
#[derive(Parser, Debug)]
#[command(name = "atsp-kernel")]
#[command(version)]
#[command(group(ArgGroup::new("algorithm").required(true).args(["treedoubling", "christofides", "compare"])))]
#[command(group(ArgGroup::new("result").args(["only_kernel_size", "tour"])))]
#[command(group(ArgGroup::new("betas").args(["beta", "multibeta"])))]
pub struct Cli {
    /// A file describing a graph, identified by extension:
    ///   .atsp: TSPLIB files with EDGE_WEIGHT_FORMAT=FULL_MATRIX
    ///   .csv: weight matrices in CSV format
    ///   .tsv: weight matrices in TSV format
    ///   .txt: the dimension followed by whitespace-separated edge weights
    #[arg(verbatim_doc_comment)]
    pub graph: PathBuf,

    /// Use the generalized tree doubling algorithm
    #[arg(short = 't', long)]
    pub treedoubling: bool,

    /// Use the generalized Christofides algorithm
    #[arg(short = 'c', long)]
    pub christofides: bool,

    /// Compare both algorithms, the exact oracle and a random tour
    #[arg(long)]
    pub compare: bool,

    /// Only output the kernel size without computing a tour
    #[arg(long)]
    pub only_kernel_size: bool,

    /// Output the computed tour as a space-separated node list
    #[arg(long)]
    pub tour: bool,

    /// Asymmetry factor above which pairs are treated as asymmetric. Beta = 0 computes
    /// an exact solution. A comma-separated list runs the algorithm once per value.
    #[arg(short = 'b', long, value_delimiter = ',', default_value = "1", allow_negative_numbers = true)]
    pub beta: Vec<f64>,

    /// Compute an exact reference first, then start with every asymmetric pair kept
    /// (beta = 1) and halve the number of asymmetric pairs until none remain.
    #[arg(long)]
    pub multibeta: bool,

    /// Configuration file (defaults to ./Config.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// What the binary was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Solve(Algorithm),
    Compare,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.compare {
            Mode::Compare
        } else if self.christofides {
            Mode::Solve(Algorithm::Christofides)
        } else {
            Mode::Solve(Algorithm::TreeDoubling)
        }
    }

    pub fn compute_tour(&self) -> bool {
        !self.only_kernel_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("atsp-kernel").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_to_beta_one() {
        let cli = parse(&["graph.atsp", "-t"]).unwrap();
        assert_eq!(cli.mode(), Mode::Solve(Algorithm::TreeDoubling));
        assert_eq!(cli.beta, vec![1.0]);
        assert!(cli.compute_tour());
        assert!(!cli.tour);
        assert!(!cli.multibeta);
    }

    #[test]
    fn beta_accepts_a_comma_separated_list() {
        let cli = parse(&["graph.csv", "-c", "-b", "0,1.5,3"]).unwrap();
        assert_eq!(cli.mode(), Mode::Solve(Algorithm::Christofides));
        assert_eq!(cli.beta, vec![0.0, 1.5, 3.0]);
    }

    #[test]
    fn algorithm_is_required() {
        assert!(parse(&["graph.csv"]).is_err());
    }

    #[test]
    fn algorithms_are_mutually_exclusive() {
        assert!(parse(&["graph.csv", "-t", "-c"]).is_err());
        assert!(parse(&["graph.csv", "-t", "--compare"]).is_err());
    }

    #[test]
    fn kernel_size_only_excludes_tour_output() {
        assert!(parse(&["graph.csv", "-t", "--only-kernel-size", "--tour"]).is_err());
        let cli = parse(&["graph.csv", "-t", "--only-kernel-size"]).unwrap();
        assert!(!cli.compute_tour());
    }

    #[test]
    fn multibeta_excludes_explicit_betas() {
        assert!(parse(&["graph.csv", "-t", "--multibeta", "-b", "2"]).is_err());
        assert!(parse(&["graph.csv", "-t", "--multibeta"]).unwrap().multibeta);
    }

    #[test]
    fn non_numeric_beta_is_rejected() {
        assert!(parse(&["graph.csv", "-t", "-b", "one"]).is_err());
    }

    #[test]
    fn compare_mode() {
        let cli = parse(&["graph.txt", "--compare", "--config", "alt.toml"]).unwrap();
        assert_eq!(cli.mode(), Mode::Compare);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
    }
}
