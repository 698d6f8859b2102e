//! # External solvers
//!
//! ## Aim
//! The sensitivity toolbox never solves anything itself: it hands the working model to external
//! NLP / sensitivity solvers and reads back values and annotation slots.
//!
//! ## Main Data Structures
//! - `ExternalSolver` trait: blocking `solve(&mut Model, &SolveSettings)` plus string options
//! - `SolverBackend`: enum over the available backends (command-line executable, custom boxed solver)
//! - `SolverFactory`: backends registered under string keys (`ipopt`, `ipopt_sens`, `k_aug`, `dot_sens`)
//! - `SolverResults`: status object returned by every solve
/// solver contract, results and the backend enum
pub mod solver_api;
/// executable driven through JSON exchange files
pub mod command_solver;
/// solver registry keyed by string
pub mod factory;
pub mod solver_error;

pub use command_solver::CommandSolver;
pub use factory::SolverFactory;
pub use solver_api::{
    ExternalSolver, SolveSettings, SolverBackend, SolverOptions, SolverResults, SolverStatus,
    TerminationCondition,
};
pub use solver_error::SolverError;
