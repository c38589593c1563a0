//! Asymmetry-bounded kernelization for the asymmetric travelling salesman problem.
//!
//! Only the strongly asymmetric part of an instance (the kernel) is solved exactly;
//! the remaining nodes are attached afterwards by a symmetric approximation.

pub mod asymmetry;
pub mod christofides;
pub mod cover;
pub mod csr;
pub mod euler;
pub mod exact;
pub mod graph;
pub mod kernel;
pub mod matrix;
pub mod orchestrator;
pub mod spanning;
pub mod traits;
pub mod tree_doubling;

pub use asymmetry::AsymmetryProfile;
pub use christofides::ChristofidesExtender;
pub use cover::{ConflictGraph, GreedyDegreeVertexCover, MatchingVertexCover};
pub use exact::{DummyOracle, HeldKarpOracle};
pub use graph::Graph;
pub use kernel::Kernel;
pub use matrix::CostMatrix;
pub use orchestrator::{Algorithm, Pipeline};
pub use traits::{ExactOracle, TourExtender, VertexCoverOracle};
pub use tree_doubling::TreeDoublingExtender;
