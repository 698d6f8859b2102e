//! # Substitution planner
//!
//! ## Aim
//! Turns every designated component into a pair (free variable, parameter) per scalar element:
//! - a mutable parameter gets a new free variable of the same index structure, initialised to the
//!   parameter values; the parameter stays in the model and is later pinned to the variable
//! - a fixed variable gets a new mutable parameter initialised to the variable values; the
//!   variable itself is unfixed and becomes the free entity
//!
//! Substitutes are created on the sensitivity block. A whole component keeps its local name
//! (made unique), a single element of an indexed component becomes a scalar substitute called
//! `<name>_<index>`.
use super::resolver::ComponentRef;
use super::sens_block::{SubstitutionRecord, SubstitutionSource};
use super::sens_error::SensitivityError;
use crate::Modeling::{
    ComponentId, ComponentKind, DataRef, Expr, Index, Model, ParamComponent, VarComponent,
};
use log::info;
use std::collections::HashMap;

/// A classified entry of the designated component list
#[derive(Debug, Clone, PartialEq)]
pub enum Designated {
    MutableParameter(ComponentRef),
    FixedVariable(ComponentRef),
}

impl Designated {
    /// checks kind, mutability and fixedness of one designated component
    pub fn classify(model: &Model, cref: &ComponentRef) -> Result<Self, SensitivityError> {
        let path = model.path(cref.component)?;
        match model.kind(cref.component)? {
            ComponentKind::Param => {
                if !model.param(cref.component)?.mutable {
                    return Err(SensitivityError::Configuration(format!(
                        "Parameters within paramList must be mutable. Got {}, which is not mutable.",
                        path
                    )));
                }
                Ok(Designated::MutableParameter(cref.clone()))
            }
            ComponentKind::Var => {
                for (_, r) in designated_items(model, cref)? {
                    if !model.is_fixed(&r)? {
                        return Err(SensitivityError::Configuration(format!(
                            "Specified \"parameter\" variables must be fixed. Got {}, which is not fixed.",
                            model.data_name(&r)
                        )));
                    }
                }
                Ok(Designated::FixedVariable(cref.clone()))
            }
            other => Err(SensitivityError::Configuration(format!(
                "paramList may only contain mutable parameters or fixed variables. Got {}, which is a {}.",
                path, other
            ))),
        }
    }

    pub fn component_ref(&self) -> &ComponentRef {
        match self {
            Designated::MutableParameter(c) | Designated::FixedVariable(c) => c,
        }
    }
}

/// Scalar elements addressed by a designation, paired with the index they get in the substitute.
///
/// A single element of an indexed component maps onto an unindexed substitute.
pub fn designated_items(
    model: &Model,
    cref: &ComponentRef,
) -> Result<Vec<(Option<Index>, DataRef)>, SensitivityError> {
    if cref.index.is_some() {
        let r = DataRef::new(cref.component, cref.index.clone());
        if !model.component_items(cref.component)?.contains(&r) {
            return Err(SensitivityError::Resolution(format!(
                "{} does not exist",
                model.data_name(&r)
            )));
        }
        return Ok(vec![(None, r)]);
    }
    if model.is_indexed(cref.component)? {
        Ok(model
            .component_items(cref.component)?
            .into_iter()
            .map(|r| (r.index.clone(), r))
            .collect())
    } else {
        Ok(vec![(None, DataRef::scalar(cref.component))])
    }
}

/// base name of the substitute before uniquification
pub fn substitute_name(model: &Model, cref: &ComponentRef) -> Result<String, SensitivityError> {
    let local = model.local_name(cref.component)?;
    Ok(match &cref.index {
        Some(idx) => format!("{}_{}", local, idx.name_fragment()),
        None => local.to_string(),
    })
}

/// Creates the substitutes on `block`, records every scalar substitution and unfixes all free
/// entities.
pub fn plan_substitutions(
    model: &mut Model,
    block: ComponentId,
    param_list: &[ComponentRef],
) -> Result<Vec<SubstitutionRecord>, SensitivityError> {
    let mut records = Vec::new();
    for (list_index, cref) in param_list.iter().enumerate() {
        let designated = Designated::classify(model, cref)?;
        let items = designated_items(model, cref)?;
        let base = substitute_name(model, cref)?;
        let name = model.unique_component_name(block, &base);
        let mut values = Vec::with_capacity(items.len());
        for (_, r) in &items {
            values.push(model.value(r)?);
        }
        let scalar = items.len() == 1 && items[0].0.is_none();
        match designated {
            Designated::MutableParameter(_) => {
                let var = if scalar {
                    VarComponent::scalar(Some(values[0]))
                } else {
                    VarComponent::indexed(
                        items
                            .iter()
                            .zip(values.iter())
                            .filter_map(|((idx, _), v)| idx.clone().map(|i| (i, *v))),
                    )
                };
                let var_id = model.add_var(block, &name, var)?;
                for (idx, pdata) in items {
                    records.push(SubstitutionRecord {
                        free: DataRef::new(var_id, idx.clone()),
                        parameter: pdata,
                        list_index,
                        container_index: idx,
                        source: SubstitutionSource::Parameter,
                    });
                }
            }
            Designated::FixedVariable(_) => {
                let param = if scalar {
                    ParamComponent::scalar(values[0], true)
                } else {
                    ParamComponent::indexed(
                        items
                            .iter()
                            .zip(values.iter())
                            .filter_map(|((idx, _), v)| idx.clone().map(|i| (i, *v))),
                        true,
                    )
                };
                let param_id = model.add_param(block, &name, param)?;
                for (idx, vdata) in items {
                    records.push(SubstitutionRecord {
                        free: vdata,
                        parameter: DataRef::new(param_id, idx.clone()),
                        list_index,
                        container_index: idx,
                        source: SubstitutionSource::Variable,
                    });
                }
            }
        }
        info!(
            "designated {} represented on the sensitivity block as '{}'",
            model.path(cref.component)?,
            name
        );
    }
    for rec in &records {
        model.unfix(&rec.free)?;
    }
    Ok(records)
}

/// parameter leaf -> free variable, for records that came from mutable parameters
pub fn substitution_map(records: &[SubstitutionRecord]) -> HashMap<DataRef, Expr> {
    records
        .iter()
        .filter(|r| r.source == SubstitutionSource::Parameter)
        .map(|r| (r.parameter.clone(), Expr::Var(r.free.clone())))
        .collect()
}
