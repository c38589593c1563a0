use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // ----------------------------
    // Configuration errors
    // ----------------------------
    /// Beta must be a non-negative number.
    #[error("Invalid beta value {0}: expected a non-negative number.")]
    InvalidBeta(f64),

    #[error("Unknown algorithm '{0}'. Expected 'treedoubling' or 'christofides'.")]
    UnknownAlgorithm(String),

    /// The raw cost matrix is not square, holds a negative or NaN entry, or is otherwise unusable.
    #[error("Invalid cost matrix: {0}")]
    InvalidMatrix(String),

    // ----------------------------
    // Structural errors
    // ----------------------------
    #[error("Graph has no nodes.")]
    EmptyGraph,

    /// Indicates an attempt to access a node index that exceeds the graph size (N).
    #[error("Node index {0} is out of bounds.")]
    NodeIndexOutOfBounds(usize),

    /// The spanning structure stopped growing before it reached every node.
    #[error("Graph is disconnected: only {reached} of {total} nodes are reachable.")]
    DisconnectedGraph { reached: usize, total: usize },

    #[error("No finite Hamiltonian cycle exists over {0} nodes.")]
    NoHamiltonianCycle(usize),

    // ----------------------------
    // Oracle errors
    // ----------------------------
    #[error("Exact solver is unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Exact solver exited with status {status}: {stderr}")]
    OracleFailed { status: i32, stderr: String },

    #[error("Exact solver exceeded its budget of {0:?}.")]
    OracleTimeout(Duration),

    #[error("Exact solver returned unusable output: {0}")]
    OracleOutput(String),

    /// Raised before allocating the dynamic-programming table.
    #[error("Kernel of {size} nodes exceeds the exact solver limit of {limit}; raise beta.")]
    KernelTooLarge { size: usize, limit: usize },

    // ----------------------------
    // Invariant violations
    // ----------------------------
    #[error("Vertex cover leaves edge ({0}, {1}) uncovered.")]
    InvalidVertexCover(usize, usize),

    #[error("Kernel tour is not a permutation of the kernel nodes: {0}")]
    InvalidKernelTour(String),

    #[error("Multigraph is not Eulerian: {0}")]
    NotEulerian(String),

    /// The shortcut walk missed nodes; partial tours are never returned.
    #[error("Tour covers {visited} of {expected} nodes.")]
    IncompleteTour { visited: usize, expected: usize },
}

impl Error {
    /// True for errors that only invalidate the current beta value.
    ///
    /// A sweep logs these and moves on to the next beta; every other error
    /// aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::EmptyGraph
                | Error::DisconnectedGraph { .. }
                | Error::NoHamiltonianCycle(_)
                | Error::OracleUnavailable(_)
                | Error::OracleFailed { .. }
                | Error::OracleTimeout(_)
                | Error::OracleOutput(_)
        )
    }
}
