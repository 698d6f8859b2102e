use super::command_solver::CommandSolver;
use super::solver_error::SolverError;
use crate::Modeling::Model;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// option name -> value, passed verbatim to the solver (`run_sens=yes`, `dsdp_mode=`)
pub type SolverOptions = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    Ok,
    Warning,
    Error,
    Aborted,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationCondition {
    Optimal,
    LocallyOptimal,
    Infeasible,
    MaxIterations,
    Error,
    Unknown,
}

/// Status object of one external solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResults {
    pub solver: String,
    pub status: SolverStatus,
    pub termination: TerminationCondition,
    pub message: String,
}

impl SolverResults {
    pub fn optimal(solver: &str) -> Self {
        SolverResults {
            solver: solver.to_string(),
            status: SolverStatus::Ok,
            termination: TerminationCondition::Optimal,
            message: String::new(),
        }
    }

    pub fn failed(solver: &str, message: &str) -> Self {
        SolverResults {
            solver: solver.to_string(),
            status: SolverStatus::Error,
            termination: TerminationCondition::Error,
            message: message.to_string(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolverStatus::Ok
            && matches!(
                self.termination,
                TerminationCondition::Optimal | TerminationCondition::LocallyOptimal
            )
    }
}

impl fmt::Display for SolverResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: status {:?}, termination {:?}",
            self.solver, self.status, self.termination
        )?;
        if !self.message.is_empty() {
            write!(f, " ({})", self.message)?;
        }
        Ok(())
    }
}

/// Per-invocation settings
#[derive(Debug, Clone, PartialEq)]
pub struct SolveSettings {
    /// stream solver output to the terminal
    pub tee: bool,
    /// keep the exchange files after the solve
    pub keepfiles: bool,
    /// directory the solver runs in
    pub work_dir: PathBuf,
}

impl Default for SolveSettings {
    fn default() -> Self {
        SolveSettings {
            tee: false,
            keepfiles: false,
            work_dir: PathBuf::from("."),
        }
    }
}

/// A blocking external solver.
///
/// `solve` reads the export annotation slots of the model and, on return, has updated variable
/// values and import slots in place. A solver that ran but did not converge is reported through
/// the returned `SolverResults`, not as an error.
#[enum_dispatch]
pub trait ExternalSolver {
    fn name(&self) -> &str;
    fn options(&self) -> &SolverOptions;
    fn options_mut(&mut self) -> &mut SolverOptions;
    fn solve(
        &mut self,
        model: &mut Model,
        settings: &SolveSettings,
    ) -> Result<SolverResults, SolverError>;
}

impl ExternalSolver for Box<dyn ExternalSolver> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }
    fn options(&self) -> &SolverOptions {
        self.as_ref().options()
    }
    fn options_mut(&mut self) -> &mut SolverOptions {
        self.as_mut().options_mut()
    }
    fn solve(
        &mut self,
        model: &mut Model,
        settings: &SolveSettings,
    ) -> Result<SolverResults, SolverError> {
        self.as_mut().solve(model, settings)
    }
}

#[enum_dispatch(ExternalSolver)]
pub enum SolverBackend {
    Command(CommandSolver),
    Custom(Box<dyn ExternalSolver>),
}
