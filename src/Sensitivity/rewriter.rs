//! Rewrites the active objectives and constraints so that designated parameters are replaced by
//! their free variables. The originals are deactivated, never modified.
use super::planner::substitution_map;
use super::sens_block::SensitivityBlock;
use super::sens_error::SensitivityError;
use crate::Modeling::{
    ConstraintComponent, DataRef, ExpressionReplacer, Model, ObjectiveComponent, Relation,
};
use log::info;

/// Objectives and constraint rows deactivated so far are pushed to `deactivated`, also when an
/// error cuts the rewrite short.
pub fn rewrite_expressions(
    model: &mut Model,
    sb: &mut SensitivityBlock,
    const_list_name: &str,
    deactivated: &mut Vec<DataRef>,
) -> Result<(), SensitivityError> {
    let substitute = substitution_map(&sb.records);
    if substitute.is_empty() {
        return Ok(());
    }
    Model::check_name(const_list_name)?;
    let replacer = ExpressionReplacer::new(&substitute, true);

    for obj in model.active_objectives() {
        let (expr, sense, local) = {
            let o = model.objective(obj.component)?;
            (
                replacer.replace(model, &o.expr)?,
                o.sense,
                model.local_name(obj.component)?.to_string(),
            )
        };
        let name = model.unique_component_name(sb.block, &local);
        let id = model.add_objective(
            sb.block,
            &name,
            ObjectiveComponent {
                expr,
                sense,
                active: true,
            },
        )?;
        sb.objectives.push(id);
        model.deactivate(&obj)?;
        deactivated.push(obj);
    }

    // collected before the shadow list exists so its own rows are never visited
    let constraints = model.active_constraints();
    let mut shadow = ConstraintComponent::list();
    for con in &constraints {
        let relation = model.constraint_data(con)?.relation.clone();
        match relation {
            Relation::Equality(lhs, rhs) => {
                shadow.add(Relation::Equality(
                    replacer.replace(model, &lhs)?,
                    replacer.replace(model, &rhs)?,
                ));
            }
            Relation::Inequality(lhs, rhs) => {
                shadow.add(Relation::Inequality(
                    replacer.replace(model, &lhs)?,
                    replacer.replace(model, &rhs)?,
                ));
            }
            Relation::Ranged(lower, body, upper) => {
                let lower = replacer.replace(model, &lower)?;
                let body = replacer.replace(model, &body)?;
                let upper = replacer.replace(model, &upper)?;
                shadow.add(Relation::Inequality(lower, body.clone()));
                shadow.add(Relation::Inequality(body, upper));
            }
        }
        model.deactivate(con)?;
        deactivated.push(con.clone());
    }
    let name = model.unique_component_name(sb.block, const_list_name);
    sb.const_list = Some(model.add_constraint(sb.block, &name, shadow)?);
    sb.has_replaced_expressions = true;
    info!(
        "rewrote {} objective(s) and {} constraint(s) onto '{}'",
        sb.objectives.len(),
        constraints.len(),
        model.path(sb.block)?
    );
    Ok(())
}
