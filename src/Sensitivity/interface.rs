//! # Sensitivity interface
//!
//! ## Aim
//! Owns the working model of one sensitivity run and the lifecycle of its sensitivity block:
//! `setup_sensitivity` builds substitutes, shadow objectives / constraints and pinning constraints,
//! `perturb_parameters` writes the perturbation annotations.
//!
//! ## Lifecycle of the sensitivity block
//! - built without expression rewriting (only fixed variables designated): a new setup tears the
//!   block down, re-fixes the designated variables and builds it again
//! - built with expression rewriting: a new setup is refused with a configuration error
//!
//! ## Example
//! ```rust, ignore
//! let mut sens = SensitivityInterface::new(model, true);
//! sens.setup_sensitivity(&[ComponentRef::whole(p)])?;
//! sens.perturb_parameters(&[PerturbValue::Scalar(7.0)])?;
//! let working = sens.into_model();
//! ```
use super::perturbation::{PerturbValue, apply_perturbation};
use super::pinning::{DELTA_P, SENS_STATE_VALUE_1, pin_parameters};
use super::planner::plan_substitutions;
use super::resolver::{ComponentRef, resolve_components};
use super::rewriter::rewrite_expressions;
use super::sens_block::{SensitivityBlock, SubstitutionRecord, SubstitutionSource};
use super::sens_error::SensitivityError;
use crate::Modeling::{ComponentId, DataRef, Model};
use crate::settings::{DEFAULT_BLOCK_NAME, SensitivityConfig};
use log::{info, warn};

pub struct SensitivityInterface {
    /// the user's model when the working model is a clone of it
    original: Option<Model>,
    pub model_instance: Model,
    block_name: String,
    const_list_name: String,
    param_const_name: String,
}

impl SensitivityInterface {
    pub fn new(instance: Model, clone_model: bool) -> Self {
        let (original, model_instance) = if clone_model {
            let working = instance.clone();
            (Some(instance), working)
        } else {
            (None, instance)
        };
        SensitivityInterface {
            original,
            model_instance,
            block_name: DEFAULT_BLOCK_NAME.to_string(),
            const_list_name: "constList".to_string(),
            param_const_name: "paramConst".to_string(),
        }
    }

    pub fn from_config(instance: Model, config: &SensitivityConfig) -> Self {
        let mut sens = Self::new(instance, config.clone_model);
        sens.block_name = config.block_name.clone();
        sens.const_list_name = config.const_list_name.clone();
        sens.param_const_name = config.param_const_name.clone();
        sens
    }

    pub fn get_default_block_name() -> &'static str {
        DEFAULT_BLOCK_NAME
    }

    pub fn block_name(&self) -> &str {
        &self.block_name
    }

    /// the model component references are given against
    pub fn original_model(&self) -> &Model {
        self.original.as_ref().unwrap_or(&self.model_instance)
    }

    pub fn block_id(&self) -> Option<ComponentId> {
        self.model_instance
            .component(self.model_instance.root(), &self.block_name)
    }

    pub fn sensitivity_block(&self) -> Option<&SensitivityBlock> {
        let id = self.block_id()?;
        self.model_instance
            .block(id)
            .ok()
            .and_then(|b| b.sensitivity.as_deref())
    }

    pub fn records(&self) -> &[SubstitutionRecord] {
        self.sensitivity_block()
            .map(|sb| sb.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn setup_sensitivity(
        &mut self,
        param_list: &[ComponentRef],
    ) -> Result<(), SensitivityError> {
        let param_list =
            resolve_components(self.original.as_ref(), &self.model_instance, param_list)?;
        Model::check_name(&self.block_name)?;
        Model::check_name(&self.const_list_name)?;
        Model::check_name(&self.param_const_name)?;
        if self.block_id().is_some() {
            self.teardown()?;
        }
        let model = &mut self.model_instance;
        let root = model.root();
        let block = model.add_block(root, &self.block_name)?;
        let mut sb = SensitivityBlock::new(block, param_list);
        let mut deactivated = Vec::new();
        let built = build_block(
            model,
            &mut sb,
            &self.const_list_name,
            &self.param_const_name,
            &mut deactivated,
        );
        if let Err(e) = built {
            rollback_setup(model, block, &sb.records, &deactivated)?;
            return Err(e);
        }
        info!(
            "sensitivity block '{}' built: {} designated component(s), {} record(s)",
            self.block_name,
            sb.param_list.len(),
            sb.records.len()
        );
        model.block_mut(block)?.sensitivity = Some(Box::new(sb));
        Ok(())
    }

    /// Removes an unsubstituted sensitivity block and re-fixes the designated variables.
    pub fn teardown(&mut self) -> Result<(), SensitivityError> {
        let Some(id) = self.block_id() else {
            return Ok(());
        };
        let sb = match self.model_instance.block(id)?.sensitivity.as_deref() {
            Some(sb) => sb.clone(),
            None => {
                return Err(SensitivityError::Configuration(format!(
                    "component '{}' exists but is not a sensitivity block",
                    self.block_name
                )));
            }
        };
        if sb.has_replaced_expressions {
            return Err(SensitivityError::Configuration(
                "Re-using sensitivity interface is not supported when calculating sensitivity \
                 for mutable parameters. Used fixed vars instead if you want to do this."
                    .to_string(),
            ));
        }
        for rec in &sb.records {
            self.model_instance.fix(&rec.free, None)?;
        }
        self.model_instance.del_component(id)?;
        info!("sensitivity block '{}' torn down", self.block_name);
        Ok(())
    }

    pub fn perturb_parameters(
        &mut self,
        perturb_list: &[PerturbValue],
    ) -> Result<(), SensitivityError> {
        let sb = self
            .sensitivity_block()
            .cloned()
            .ok_or_else(|| {
                SensitivityError::Configuration(
                    "setup_sensitivity must be called before perturb_parameters".to_string(),
                )
            })?;
        apply_perturbation(&mut self.model_instance, &sb, perturb_list)
    }

    /// prints the substitution table with the current annotation values
    pub fn pretty_print_records(&self) {
        print_records_table(
            &self.model_instance,
            self.records(),
            self.sensitivity_block().and_then(|sb| sb.param_const),
        );
    }

    pub fn into_model(self) -> Model {
        self.model_instance
    }
}

fn build_block(
    model: &mut Model,
    sb: &mut SensitivityBlock,
    const_list_name: &str,
    param_const_name: &str,
    deactivated: &mut Vec<DataRef>,
) -> Result<(), SensitivityError> {
    sb.records = plan_substitutions(model, sb.block, &sb.param_list)?;
    rewrite_expressions(model, sb, const_list_name, deactivated)?;
    pin_parameters(model, sb, param_const_name)
}

/// Undoes a partially built sensitivity block: reactivates what the rewrite deactivated,
/// re-fixes designated variables and deletes the block with everything created on it.
pub(crate) fn rollback_setup(
    model: &mut Model,
    block: ComponentId,
    records: &[SubstitutionRecord],
    deactivated: &[DataRef],
) -> Result<(), SensitivityError> {
    for r in deactivated {
        model.activate(r)?;
    }
    for rec in records
        .iter()
        .filter(|rec| rec.source == SubstitutionSource::Variable)
    {
        model.fix(&rec.free, None)?;
    }
    model.del_component(block)?;
    warn!("sensitivity setup failed, block rolled back");
    Ok(())
}

/// Substitution records with values and perturbation annotations, one row per record.
/// `pins` is the pinning constraint list the records are numbered against.
pub fn print_records_table(
    model: &Model,
    records: &[SubstitutionRecord],
    pins: Option<ComponentId>,
) {
    use prettytable::{Cell, Row, Table, row};
    println!("____________________SENSITIVITY RECORDS_________________________");
    let mut table = Table::new();
    table.add_row(row![
        "#",
        "Free",
        "Parameter",
        "List pos.",
        "Index",
        "Direction",
        "Value",
        "Target",
        "DeltaP"
    ]);
    let fmt_opt = |v: Option<f64>| v.map(|v| format!("{}", v)).unwrap_or_default();
    for (position, rec) in records.iter().enumerate() {
        let pin = pins.map(|id| DataRef::indexed(id, (position + 1) as i64));
        table.add_row(Row::new(vec![
            Cell::new(&(position + 1).to_string()),
            Cell::new(&model.data_name(&rec.free)),
            Cell::new(&model.data_name(&rec.parameter)),
            Cell::new(&rec.list_index.to_string()),
            Cell::new(
                &rec.container_index
                    .as_ref()
                    .map(|i| i.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(&rec.source.to_string()),
            Cell::new(&fmt_opt(model.value(&rec.free).ok())),
            Cell::new(&fmt_opt(model.suffixes.get(SENS_STATE_VALUE_1, &rec.free))),
            Cell::new(&fmt_opt(pin.and_then(|c| model.suffixes.get(DELTA_P, &c)))),
        ]));
    }
    table.printstd();
}
