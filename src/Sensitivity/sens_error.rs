use crate::Modeling::ModelError;
use crate::Solvers::solver_error::SolverError;
use thiserror::Error;

/// errors of the sensitivity toolbox
#[derive(Debug, Error)]
pub enum SensitivityError {
    /// a referenced component cannot be found in the working model
    #[error("Resolution error: {0}")]
    Resolution(String),
    /// invalid designation, refused rebuild or mismatched perturbation list
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
