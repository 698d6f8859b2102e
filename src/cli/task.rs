//! # Sensitivity task file
//!
//! A JSON description of one run:
//! ```json
//! {
//!   "model": "flash.json",
//!   "method": "sipopt",
//!   "parameters": ["feed.p", "unit.k[2]"],
//!   "perturbations": [5.5, 1.2],
//!   "output": "flash_sens.json"
//! }
//! ```
//! Paths are relative to the task file.
use crate::Modeling::Model;
use crate::Sensitivity::resolver::find_components;
use crate::Sensitivity::{
    PerturbValue, SensitivityError, SensitivityMethod, SensitivityOutcome,
    sensitivity_calculation,
};
use crate::Solvers::SolverFactory;
use crate::Utils::logger::LoggerError;
use crate::settings::{ConfigError, SensitivityConfig};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("usage: {0}")]
    Usage(String),
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sensitivity(#[from] SensitivityError),
    #[error(transparent)]
    Logger(#[from] LoggerError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityTask {
    /// model JSON file
    pub model: String,
    pub method: SensitivityMethod,
    /// dotted component paths, optionally with an element index
    pub parameters: Vec<String>,
    /// one entry per parameter path
    pub perturbations: Vec<PerturbValue>,
    /// where the resulting model is written
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub log_file: Option<String>,
    /// directory relative paths are taken against, set on load
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.display().to_string(),
        source,
    })
}

impl SensitivityTask {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let mut task: SensitivityTask = read_json(path.as_ref())?;
        task.base_dir = path
            .as_ref()
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();
        Ok(task)
    }

    pub fn resolve(&self, file: &str) -> PathBuf {
        self.base_dir.join(file)
    }

    pub fn load_model(&self) -> Result<Model, CliError> {
        read_json(&self.resolve(&self.model))
    }

    /// runs the task with `solvers`
    pub fn run(
        &self,
        solvers: &mut SolverFactory,
        config: &SensitivityConfig,
    ) -> Result<SensitivityOutcome, CliError> {
        let model = self.load_model()?;
        let param_list = find_components(&model, &self.parameters)?;
        info!(
            "task: {} on model '{}' with {} designated component(s)",
            self.method,
            model.name,
            param_list.len()
        );
        let outcome = sensitivity_calculation(
            self.method,
            model,
            &param_list,
            &self.perturbations,
            solvers,
            config,
        )?;
        if let Some(output) = &self.output {
            let path = self.resolve(output);
            let json = serde_json::to_string_pretty(&outcome.model).map_err(|source| {
                CliError::Json {
                    path: path.display().to_string(),
                    source,
                }
            })?;
            fs::write(&path, json).map_err(|source| CliError::Io {
                path: path.display().to_string(),
                source,
            })?;
            info!("resulting model written to {}", path.display());
        }
        Ok(outcome)
    }
}
