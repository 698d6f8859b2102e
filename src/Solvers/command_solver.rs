//! # Command-line solver backend
//!
//! Runs a solver executable as a child process. The exchange goes through two JSON files in the
//! working directory:
//! - `<stem>.json` written before the run: solver name, options and the whole model (components
//!   and annotation slots)
//! - `<stem>.sol.json` written by the solver: status, termination condition, new variable values
//!   and values of import slots
//!
//! The executable is called as `<exe> [args]... <stem>.json <stem>.sol.json [key=value | flag]...`.
use super::solver_api::{
    ExternalSolver, SolveSettings, SolverOptions, SolverResults, SolverStatus,
    TerminationCondition,
};
use super::solver_error::SolverError;
use crate::Modeling::{DataRef, Model};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Serialize)]
pub struct ExchangeRequest<'a> {
    pub solver: &'a str,
    pub options: &'a SolverOptions,
    pub model: &'a Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    pub status: SolverStatus,
    pub termination: TerminationCondition,
    #[serde(default)]
    pub message: String,
    /// new values of variable elements
    #[serde(default)]
    pub values: Vec<(DataRef, f64)>,
    /// slot name -> entries, only import slots of the model are taken over
    #[serde(default)]
    pub suffixes: BTreeMap<String, Vec<(DataRef, f64)>>,
}

impl ExchangeResponse {
    /// writes values and import slots back into the model
    pub fn apply(&self, model: &mut Model) -> Result<(), SolverError> {
        for (r, v) in &self.values {
            model.set_value(r, *v)?;
        }
        for (name, entries) in &self.suffixes {
            let imports = model
                .suffixes
                .slot(name)
                .map(|s| s.direction.imports())
                .unwrap_or(false);
            if !imports {
                debug!("ignoring values of non-import slot '{}'", name);
                continue;
            }
            for (r, v) in entries {
                model.suffixes.set(name, r.clone(), *v)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CommandSolver {
    name: String,
    executable: PathBuf,
    /// leading arguments, e.g. the script when `executable` is an interpreter
    args: Vec<String>,
    options: SolverOptions,
    stem: String,
}

impl CommandSolver {
    pub fn new(name: &str, executable: impl Into<PathBuf>) -> Self {
        CommandSolver {
            name: name.to_string(),
            executable: executable.into(),
            args: Vec::new(),
            options: SolverOptions::new(),
            stem: name.to_string(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(|a| a.into()).collect();
        self
    }

    /// stem of the exchange files, defaults to the solver name
    pub fn with_stem(mut self, stem: &str) -> Self {
        self.stem = stem.to_string();
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn request_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(format!("{}.json", self.stem))
    }

    pub fn response_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(format!("{}.sol.json", self.stem))
    }

    fn option_args(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|(k, v)| {
                if v.is_empty() {
                    k.clone()
                } else {
                    format!("{}={}", k, v)
                }
            })
            .collect()
    }

    fn cleanup(&self, paths: &[&Path]) {
        for p in paths {
            if p.exists() {
                if let Err(e) = fs::remove_file(p) {
                    warn!("cannot remove exchange file {}: {}", p.display(), e);
                }
            }
        }
    }
}

impl ExternalSolver for CommandSolver {
    fn name(&self) -> &str {
        &self.name
    }
    fn options(&self) -> &SolverOptions {
        &self.options
    }
    fn options_mut(&mut self) -> &mut SolverOptions {
        &mut self.options
    }

    fn solve(
        &mut self,
        model: &mut Model,
        settings: &SolveSettings,
    ) -> Result<SolverResults, SolverError> {
        let request_path = self.request_path(&settings.work_dir);
        let response_path = self.response_path(&settings.work_dir);
        if response_path.exists() {
            fs::remove_file(&response_path)?;
        }
        let request = ExchangeRequest {
            solver: &self.name,
            options: &self.options,
            model: &*model,
        };
        fs::write(&request_path, serde_json::to_string_pretty(&request)?)?;

        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.args)
            .arg(&request_path)
            .arg(&response_path)
            .args(self.option_args())
            .current_dir(&settings.work_dir);
        info!(
            "running {} ({}) in {}",
            self.name,
            self.executable.display(),
            settings.work_dir.display()
        );
        let launched = if settings.tee {
            cmd.status()
        } else {
            cmd.stdout(Stdio::null())
                .stderr(Stdio::piped())
                .output()
                .map(|out| {
                    if !out.stderr.is_empty() {
                        debug!("{}: {}", self.name, String::from_utf8_lossy(&out.stderr));
                    }
                    out.status
                })
        };
        let exit = launched.map_err(|source| SolverError::Launch {
            name: self.name.clone(),
            source,
        })?;

        let results = if response_path.exists() {
            let content = fs::read_to_string(&response_path)?;
            let response: ExchangeResponse = serde_json::from_str(&content)?;
            response.apply(model)?;
            SolverResults {
                solver: self.name.clone(),
                status: response.status,
                termination: response.termination,
                message: response.message,
            }
        } else {
            SolverResults::failed(
                &self.name,
                &format!("no solution file written, process exited with {}", exit),
            )
        };
        if !settings.keepfiles {
            self.cleanup(&[&request_path, &response_path]);
        }
        Ok(results)
    }
}
