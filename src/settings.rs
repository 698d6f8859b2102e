//! # Settings Module
//!
//! ## Purpose
//! Configuration of the sensitivity toolbox: names of the components it creates, which solver
//! plays which role, where solver executables live, where solver artifacts are collected and how
//! verbose the run is. Stored as JSON, every field has a default so partial files are accepted.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "block_name": "_SENSITIVITY_TOOLBOX_DATA",
//!   "clone_model": true,
//!   "solvers": { "baseline": "ipopt", "sipopt": "ipopt_sens", "kaug": "k_aug", "dot_sens": "dot_sens" },
//!   "executables": { "ipopt": "/usr/local/bin/ipopt" },
//!   "solver_options": { "max_iter": "500" },
//!   "artifact_dir": "dsdp"
//! }
//! ```
//!
//! ## Usage Pattern
//! ```rust, ignore
//! use SensiThe::settings::SensitivityConfig;
//!
//! let config = SensitivityConfig::load_or_default("sensitivity_config.json");
//! config.save("sensitivity_config.json")?;
//! ```
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BLOCK_NAME: &str = "_SENSITIVITY_TOOLBOX_DATA";

/// files written by k_aug / dot_sens during the directional-derivative strategy
pub const DSDP_ARTIFACTS: [&str; 9] = [
    "dsdp_in_.in",
    "col_row.nl",
    "col_row.col",
    "col_row.row",
    "conorder.txt",
    "delta_p.out",
    "dot_out.out",
    "timings_dot_driver_dsdp.txt",
    "timings_k_aug_dsdp.txt",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration file {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Solver keys (entries of the solver factory) used for each role of the sensitivity run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverRoles {
    /// plain NLP solve before the directional-derivative computation
    pub baseline: String,
    /// solver computing the sensitivity step with `run_sens=yes`
    pub sipopt: String,
    /// reduced-hessian / dsdp solver
    pub kaug: String,
    /// directional-derivative driver run after `kaug`
    pub dot_sens: String,
}

impl Default for SolverRoles {
    fn default() -> Self {
        Self {
            baseline: "ipopt".to_string(),
            sipopt: "ipopt_sens".to_string(),
            kaug: "k_aug".to_string(),
            dot_sens: "dot_sens".to_string(),
        }
    }
}

/// Configuration of a sensitivity run.
///
/// # Fields
/// * `block_name` - name of the sensitivity data block created on the root of the working model
/// * `const_list_name` / `param_const_name` - names of the shadow and pinning constraint lists
/// * `clone_model` - work on a clone and leave the user's model untouched
/// * `tee` / `keepfiles` - stream solver output, keep the solver exchange files
/// * `solvers` - solver factory keys per role
/// * `executables` - solver key -> executable, used to build command-line backends
/// * `solver_options` - extra options for the sensitivity-computing solver
/// * `work_dir` - directory solvers run in and write their artifacts to
/// * `artifact_dir` / `artifact_files` - where the dsdp artifacts are collected, which files
/// * `labeled_export_stem` - stem of the `.nl/.col/.row` labeled export
/// * `log_level` - `off`, `error`, `warn`, `info`, `debug` or `trace`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    pub block_name: String,
    pub const_list_name: String,
    pub param_const_name: String,
    pub clone_model: bool,
    pub tee: bool,
    pub keepfiles: bool,
    pub solvers: SolverRoles,
    pub executables: BTreeMap<String, String>,
    pub solver_options: BTreeMap<String, String>,
    pub work_dir: String,
    pub artifact_dir: String,
    pub artifact_files: Vec<String>,
    pub labeled_export_stem: String,
    pub log_level: String,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        let roles = SolverRoles::default();
        let executables = [
            roles.baseline.clone(),
            roles.sipopt.clone(),
            roles.kaug.clone(),
            roles.dot_sens.clone(),
        ]
        .into_iter()
        .map(|k| (k.clone(), k))
        .collect();
        Self {
            block_name: DEFAULT_BLOCK_NAME.to_string(),
            const_list_name: "constList".to_string(),
            param_const_name: "paramConst".to_string(),
            clone_model: true,
            tee: false,
            keepfiles: false,
            solvers: roles,
            executables,
            solver_options: BTreeMap::new(),
            work_dir: ".".to_string(),
            artifact_dir: "dsdp".to_string(),
            artifact_files: DSDP_ARTIFACTS.iter().map(|s| s.to_string()).collect(),
            labeled_export_stem: "col_row".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl SensitivityConfig {
    /// Reads a configuration file; missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Format {
            path: path_str,
            source,
        })
    }

    /// Reads a configuration file if it exists and parses, otherwise returns the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        if path.as_ref().exists() {
            match Self::load(path.as_ref()) {
                Ok(config) => return config,
                Err(e) => log::warn!("{}, using default configuration", e),
            }
        }
        Self::default()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Format {
            path: path_str.clone(),
            source,
        })?;
        fs::write(path.as_ref(), content).map_err(|source| ConfigError::Io {
            path: path_str,
            source,
        })
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info)
    }
}
