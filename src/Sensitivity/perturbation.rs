//! Perturbed parameter values and the annotations that carry them to the solvers.
//!
//! `sens_state_value_1[free] = perturbed value`, `DeltaP[pin] = current(free) - perturbed value`.
use super::pinning::{DELTA_P, SENS_STATE_VALUE_1};
use super::resolver::ComponentRef;
use super::sens_block::SensitivityBlock;
use super::sens_error::SensitivityError;
use super::planner::designated_items;
use crate::Modeling::{Index, Model};
use log::info;
use serde::{Deserialize, Serialize};

/// Perturbed value(s) of one designated component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerturbValue {
    Scalar(f64),
    /// `(index, value)` pairs for an indexed component
    Indexed(Vec<(Index, f64)>),
}

impl PerturbValue {
    /// current values of a parameter or variable component (or element)
    pub fn from_component(model: &Model, cref: &ComponentRef) -> Result<Self, SensitivityError> {
        let items = designated_items(model, cref)?;
        if items.len() == 1 && items[0].0.is_none() {
            return Ok(PerturbValue::Scalar(model.value(&items[0].1)?));
        }
        let mut values = Vec::with_capacity(items.len());
        for (idx, r) in items {
            if let Some(idx) = idx {
                values.push((idx, model.value(&r)?));
            }
        }
        Ok(PerturbValue::Indexed(values))
    }

    /// value for one record, `None` when the record is an unindexed substitute
    pub fn resolve(&self, container_index: &Option<Index>) -> Result<f64, SensitivityError> {
        match (self, container_index) {
            (PerturbValue::Scalar(v), _) => Ok(*v),
            (PerturbValue::Indexed(_), None) => Err(SensitivityError::Configuration(
                "an indexed perturbation was given for an unindexed component".to_string(),
            )),
            (PerturbValue::Indexed(values), Some(idx)) => values
                .iter()
                .find(|(k, _)| k == idx)
                .map(|(_, v)| *v)
                .ok_or_else(|| {
                    SensitivityError::Configuration(format!(
                        "perturbation has no value for index [{}]",
                        idx
                    ))
                }),
        }
    }
}

impl From<f64> for PerturbValue {
    fn from(v: f64) -> Self {
        PerturbValue::Scalar(v)
    }
}

pub fn check_perturbation_length(
    param_len: usize,
    perturb_len: usize,
) -> Result<(), SensitivityError> {
    if param_len != perturb_len {
        return Err(SensitivityError::Configuration(format!(
            "Length of paramList argument does not equal length of perturbList ({} vs {})",
            param_len, perturb_len
        )));
    }
    Ok(())
}

/// Writes the perturbation annotations for every substitution record.
pub fn apply_perturbation(
    model: &mut Model,
    sb: &SensitivityBlock,
    perturb_list: &[PerturbValue],
) -> Result<(), SensitivityError> {
    check_perturbation_length(sb.param_list.len(), perturb_list.len())?;
    // every value is resolved before any slot is written
    let mut updates = Vec::with_capacity(sb.records.len());
    for (position, rec) in sb.records.iter().enumerate() {
        let ptb = perturb_list[rec.list_index].resolve(&rec.container_index)?;
        let con = sb.pinning_constraint(position).ok_or_else(|| {
            SensitivityError::Configuration("pinning constraints were not created".to_string())
        })?;
        let current = model.value(&rec.free)?;
        updates.push((rec.free.clone(), con, ptb, current - ptb));
    }
    for (free, con, ptb, delta) in updates {
        model.suffixes.set(SENS_STATE_VALUE_1, free, ptb)?;
        model.suffixes.set(DELTA_P, con, delta)?;
    }
    info!("perturbation applied to {} element(s)", sb.records.len());
    Ok(())
}
