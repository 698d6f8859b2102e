//! # Parameter pinning and solver annotations
//!
//! Adds the constraint list `free - parameter == 0` (one row per substitution record, row `k`
//! for record `k - 1`), declares the annotation slots the two sensitivity solvers read and write,
//! and stamps the static ones with the 1-based record position.
use super::sens_block::SensitivityBlock;
use super::sens_error::SensitivityError;
use crate::Modeling::{
    AnnotationStore, ConstraintComponent, Expr, Model, Relation, SuffixDirection,
};

pub const SENS_STATE_0: &str = "sens_state_0";
pub const SENS_STATE_1: &str = "sens_state_1";
pub const SENS_STATE_VALUE_1: &str = "sens_state_value_1";
pub const SENS_INIT_CONSTR: &str = "sens_init_constr";
pub const SENS_SOL_STATE_1: &str = "sens_sol_state_1";
pub const SENS_SOL_STATE_1_Z_L: &str = "sens_sol_state_1_z_L";
pub const SENS_SOL_STATE_1_Z_U: &str = "sens_sol_state_1_z_U";
pub const IPOPT_ZL_OUT: &str = "ipopt_zL_out";
pub const IPOPT_ZU_OUT: &str = "ipopt_zU_out";
pub const IPOPT_ZL_IN: &str = "ipopt_zL_in";
pub const IPOPT_ZU_IN: &str = "ipopt_zU_in";
pub const DUAL: &str = "dual";
pub const DCDP: &str = "dcdp";
pub const DELTA_P: &str = "DeltaP";

/// slots read / written by the sIPOPT-style solver
pub const SIPOPT_SUFFIXES: [(&str, SuffixDirection); 7] = [
    (SENS_STATE_0, SuffixDirection::Export),
    (SENS_STATE_1, SuffixDirection::Export),
    (SENS_STATE_VALUE_1, SuffixDirection::Export),
    (SENS_INIT_CONSTR, SuffixDirection::Export),
    (SENS_SOL_STATE_1, SuffixDirection::Import),
    (SENS_SOL_STATE_1_Z_L, SuffixDirection::Import),
    (SENS_SOL_STATE_1_Z_U, SuffixDirection::Import),
];

/// slots read / written by the k_aug / dot_sens pair
pub const K_AUG_SUFFIXES: [(&str, SuffixDirection); 7] = [
    (IPOPT_ZL_OUT, SuffixDirection::Import),
    (IPOPT_ZU_OUT, SuffixDirection::Import),
    (IPOPT_ZL_IN, SuffixDirection::Export),
    (IPOPT_ZU_IN, SuffixDirection::Export),
    (DUAL, SuffixDirection::ImportExport),
    (DCDP, SuffixDirection::Export),
    (DELTA_P, SuffixDirection::Export),
];

/// Declares every slot of both catalogues that is not yet present; returns how many were created.
pub fn add_sensitivity_suffixes(store: &mut AnnotationStore) -> usize {
    SIPOPT_SUFFIXES
        .iter()
        .chain(K_AUG_SUFFIXES.iter())
        .filter(|(name, direction)| store.declare(name, *direction))
        .count()
}

pub fn pin_parameters(
    model: &mut Model,
    sb: &mut SensitivityBlock,
    param_const_name: &str,
) -> Result<(), SensitivityError> {
    Model::check_name(param_const_name)?;
    let mut pins = ConstraintComponent::list();
    for rec in &sb.records {
        pins.add(Relation::Equality(
            Expr::Var(rec.free.clone()) - Expr::Param(rec.parameter.clone()),
            Expr::Const(0.0),
        ));
    }
    let name = model.unique_component_name(sb.block, param_const_name);
    sb.param_const = Some(model.add_constraint(sb.block, &name, pins)?);

    add_sensitivity_suffixes(&mut model.suffixes);
    for (position, rec) in sb.records.iter().enumerate() {
        let stamp = (position + 1) as f64;
        let con = sb.pinning_constraint(position).ok_or_else(|| {
            SensitivityError::Configuration("pinning constraints were not created".to_string())
        })?;
        model.suffixes.set(SENS_STATE_0, rec.free.clone(), stamp)?;
        model.suffixes.set(SENS_STATE_1, rec.free.clone(), stamp)?;
        model.suffixes.set(SENS_INIT_CONSTR, con.clone(), stamp)?;
        model.suffixes.set(DCDP, con, stamp)?;
    }
    Ok(())
}
