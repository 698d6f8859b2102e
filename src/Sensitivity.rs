//! # Sensitivity toolbox
//!
//! ## Aim
//! Prepares an algebraic model for parametric sensitivity analysis by an external solver.
//! Designated mutable parameters are replaced by free variables (designated fixed variables are
//! freed and paired with new parameters), every pair is pinned by an equality constraint, and the
//! annotation slots the sensitivity solvers read and write are declared and filled.
//!
//! ## Pipeline
//! resolver -> planner -> rewriter -> pinning -> (baseline solve) -> perturbation -> sensitivity solve
//!
//! ## Perturbation sign
//! `DeltaP` on each pinning constraint holds `current value - perturbed value`.
/// path identifiers and lookup of designated components on the working model
pub mod resolver;
/// substitution records and the bookkeeping kept on the sensitivity block
pub mod sens_block;
/// creation of substitutes and substitution records
pub mod planner;
/// rewriting of objectives and constraints onto the sensitivity block
pub mod rewriter;
/// pinning constraints and annotation slots
pub mod pinning;
/// perturbation values and annotations
pub mod perturbation;
pub mod interface;
pub mod driver;
/// labeled export and dsdp artifact relocation
pub mod artifacts;
pub mod sens_error;
mod sensitivity_tests;

pub use driver::{SensitivityMethod, SensitivityOutcome, sensitivity_calculation};
#[allow(deprecated)]
pub use driver::{kaug, sipopt};
pub use interface::SensitivityInterface;
pub use perturbation::PerturbValue;
pub use resolver::{ComponentRef, ComponentUid};
pub use sens_block::{SensitivityBlock, SubstitutionRecord, SubstitutionSource};
pub use sens_error::SensitivityError;
