// Library exports for the input search engine
// The binaries and integration tests use the solver and worlds through this crate

pub mod profiler;

pub mod action;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod iddfs;
pub mod queue;
pub mod replay;
pub mod simulation;
pub mod snapshot;
pub mod solution;
pub mod solution_log;
pub mod stats;
pub mod worker;
pub mod worlds;

pub use action::Action;
pub use config::Config;
pub use coordinator::{SearchReport, Solver};
pub use simulation::{Simulation, Transition};
pub use snapshot::{ProgressFlags, Snapshot};
pub use solution::{Solution, SolutionSet};
