//! # Sensitivity driver
//!
//! ## Aim
//! One-call sensitivity run: build the sensitivity block, solve, perturb, solve in sensitivity
//! mode and hand back the working model with baseline and sensitivity annotations.
//!
//! ## Strategies
//! - `Sipopt`: perturbation annotations, then one solve of the sIPOPT-style solver with `run_sens=yes`
//! - `Kaug`: baseline NLP solve, bound multipliers copied from `ipopt_z*_out` to `ipopt_z*_in`,
//!   k_aug solve in `dsdp_mode`, labeled export, perturbation annotations, dot_sens solve and
//!   relocation of the dsdp artifacts
use super::artifacts::{relocate_artifacts, write_labeled_export};
use super::interface::{SensitivityInterface, print_records_table};
use super::perturbation::{PerturbValue, check_perturbation_length};
use super::pinning::{IPOPT_ZL_IN, IPOPT_ZL_OUT, IPOPT_ZU_IN, IPOPT_ZU_OUT};
use super::resolver::ComponentRef;
use super::sens_block::SubstitutionRecord;
use super::sens_error::SensitivityError;
use crate::Modeling::{ComponentId, Model};
use crate::Solvers::{ExternalSolver, SolveSettings, SolverFactory, SolverResults};
use crate::settings::SensitivityConfig;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityMethod {
    /// baseline-perturbation through a sensitivity-enabled NLP solver
    Sipopt,
    /// directional derivative through k_aug and dot_sens
    Kaug,
}

impl FromStr for SensitivityMethod {
    type Err = SensitivityError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sipopt" => Ok(SensitivityMethod::Sipopt),
            "kaug" | "k_aug" => Ok(SensitivityMethod::Kaug),
            other => Err(SensitivityError::Configuration(format!(
                "unknown sensitivity method '{}', expected 'sipopt' or 'kaug'",
                other
            ))),
        }
    }
}

impl fmt::Display for SensitivityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensitivityMethod::Sipopt => write!(f, "sipopt"),
            SensitivityMethod::Kaug => write!(f, "kaug"),
        }
    }
}

/// Result of a sensitivity run
#[derive(Debug)]
pub struct SensitivityOutcome {
    /// working model holding values and annotations
    pub model: Model,
    /// status of every external solve, in invocation order
    pub results: Vec<SolverResults>,
    pub records: Vec<SubstitutionRecord>,
    /// pinning constraint list the records are numbered against
    pub param_const: Option<ComponentId>,
}

impl SensitivityOutcome {
    pub fn all_optimal(&self) -> bool {
        self.results.iter().all(|r| r.is_optimal())
    }

    pub fn pretty_print(&self) {
        use prettytable::{Cell, Row, Table, row};
        println!("____________________SOLVER RUNS_________________________");
        let mut table = Table::new();
        table.add_row(row!["Solver", "Status", "Termination", "Message"]);
        for r in &self.results {
            table.add_row(Row::new(vec![
                Cell::new(&r.solver),
                Cell::new(&format!("{:?}", r.status)),
                Cell::new(&format!("{:?}", r.termination)),
                Cell::new(&r.message),
            ]));
        }
        table.printstd();
        print_records_table(&self.model, &self.records, self.param_const);
    }
}

fn run_solver(
    solvers: &mut SolverFactory,
    key: &str,
    model: &mut Model,
    settings: &SolveSettings,
    mode_options: &[(&str, &str)],
    user_options: Option<&SensitivityConfig>,
) -> Result<SolverResults, SensitivityError> {
    let solver = solvers.get_mut(key)?;
    let options = solver.options_mut();
    for (k, v) in mode_options {
        options.insert(k.to_string(), v.to_string());
    }
    if let Some(config) = user_options {
        for (k, v) in &config.solver_options {
            options.insert(k.clone(), v.clone());
        }
    }
    let results = solver.solve(model, settings)?;
    if results.is_optimal() {
        info!("{}", results);
    } else {
        warn!("{}", results);
    }
    Ok(results)
}

/// Runs a complete sensitivity calculation on `instance`.
///
/// `param_list` designates mutable parameters and fixed variables of `instance`, `perturb_list`
/// gives their perturbed values in the same order. Solvers are taken from `solvers` under the keys
/// of `config.solvers`. A non-optimal solve is reported in the outcome, not as an error.
pub fn sensitivity_calculation(
    method: SensitivityMethod,
    instance: Model,
    param_list: &[ComponentRef],
    perturb_list: &[PerturbValue],
    solvers: &mut SolverFactory,
    config: &SensitivityConfig,
) -> Result<SensitivityOutcome, SensitivityError> {
    check_perturbation_length(param_list.len(), perturb_list.len())?;
    let mut sens = SensitivityInterface::from_config(instance, config);
    sens.setup_sensitivity(param_list)?;
    let settings = SolveSettings {
        tee: config.tee,
        keepfiles: config.keepfiles,
        work_dir: config.work_dir(),
    };
    let mut results = Vec::new();
    info!("sensitivity calculation with {}", method);

    if method == SensitivityMethod::Kaug {
        let model = &mut sens.model_instance;
        results.push(run_solver(
            solvers,
            &config.solvers.baseline,
            model,
            &settings,
            &[],
            None,
        )?);
        model.suffixes.update_from(IPOPT_ZL_IN, IPOPT_ZL_OUT)?;
        model.suffixes.update_from(IPOPT_ZU_IN, IPOPT_ZU_OUT)?;
        results.push(run_solver(
            solvers,
            &config.solvers.kaug,
            model,
            &settings,
            &[("dsdp_mode", "")],
            Some(config),
        )?);
        write_labeled_export(model, &settings.work_dir, &config.labeled_export_stem)?;
    }

    sens.perturb_parameters(perturb_list)?;

    match method {
        SensitivityMethod::Sipopt => {
            results.push(run_solver(
                solvers,
                &config.solvers.sipopt,
                &mut sens.model_instance,
                &settings,
                &[("run_sens", "yes")],
                Some(config),
            )?);
        }
        SensitivityMethod::Kaug => {
            results.push(run_solver(
                solvers,
                &config.solvers.dot_sens,
                &mut sens.model_instance,
                &settings,
                &[("dsdp_mode", "")],
                None,
            )?);
            relocate_artifacts(
                &settings.work_dir,
                &config.artifact_dir,
                &config.artifact_files,
            )?;
        }
    }

    let records = sens.records().to_vec();
    let param_const = sens.sensitivity_block().and_then(|sb| sb.param_const);
    Ok(SensitivityOutcome {
        model: sens.into_model(),
        results,
        records,
        param_const,
    })
}

#[deprecated(note = "use sensitivity_calculation(SensitivityMethod::Sipopt, ...)")]
pub fn sipopt(
    instance: Model,
    param_list: &[ComponentRef],
    perturb_list: &[PerturbValue],
    solvers: &mut SolverFactory,
    config: &SensitivityConfig,
) -> Result<SensitivityOutcome, SensitivityError> {
    warn!("sipopt() is deprecated, use sensitivity_calculation()");
    sensitivity_calculation(
        SensitivityMethod::Sipopt,
        instance,
        param_list,
        perturb_list,
        solvers,
        config,
    )
}

#[deprecated(note = "use sensitivity_calculation(SensitivityMethod::Kaug, ...)")]
pub fn kaug(
    instance: Model,
    param_list: &[ComponentRef],
    perturb_list: &[PerturbValue],
    solvers: &mut SolverFactory,
    config: &SensitivityConfig,
) -> Result<SensitivityOutcome, SensitivityError> {
    warn!("kaug() is deprecated, use sensitivity_calculation()");
    sensitivity_calculation(
        SensitivityMethod::Kaug,
        instance,
        param_list,
        perturb_list,
        solvers,
        config,
    )
}
