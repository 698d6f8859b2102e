use crate::Modeling::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("solver '{0}' is not registered")]
    UnknownSolver(String),
    #[error("failed to launch solver '{name}': {source}")]
    Launch {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("solver exchange I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed solver exchange file: {0}")]
    Exchange(#[from] serde_json::Error),
    #[error("cannot apply solver results: {0}")]
    Model(#[from] ModelError),
}
