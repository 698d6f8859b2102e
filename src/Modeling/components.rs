//! Component types stored in a `Model`: variables, parameters, objectives, constraints,
//! named expressions and blocks.
use super::container::Model;
use super::expr::Expr;
use super::index::{ComponentId, Index, Indexed};
use super::model_error::ModelError;
use crate::Sensitivity::sens_block::SensitivityBlock;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentKind {
    Var,
    Param,
    Objective,
    Constraint,
    Expression,
    Block,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentKind::Var => "Var",
            ComponentKind::Param => "Param",
            ComponentKind::Objective => "Objective",
            ComponentKind::Constraint => "Constraint",
            ComponentKind::Expression => "Expression",
            ComponentKind::Block => "Block",
        };
        write!(f, "{}", s)
    }
}

////////////////////////////////////VARIABLES/////////////////////////////////////////////////
/// state of one variable element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarData {
    pub value: Option<f64>,
    pub fixed: bool,
    pub lb: Option<f64>,
    pub ub: Option<f64>,
}

impl VarData {
    pub fn new(value: Option<f64>) -> Self {
        VarData {
            value,
            fixed: false,
            lb: None,
            ub: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarComponent {
    pub data: Indexed<VarData>,
}

impl VarComponent {
    pub fn scalar(value: Option<f64>) -> Self {
        VarComponent {
            data: Indexed::scalar(VarData::new(value)),
        }
    }
    pub fn indexed<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<Index>,
    {
        VarComponent {
            data: Indexed::from_items(
                values
                    .into_iter()
                    .map(|(k, v)| (k, VarData::new(Some(v)))),
            ),
        }
    }
    /// fixes every element at its current value
    pub fn fixed(mut self) -> Self {
        for (_, d) in self.data.iter_mut() {
            d.fixed = true;
        }
        self
    }
    pub fn with_bounds(mut self, lb: Option<f64>, ub: Option<f64>) -> Self {
        for (_, d) in self.data.iter_mut() {
            d.lb = lb;
            d.ub = ub;
        }
        self
    }
}

////////////////////////////////////PARAMETERS////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamComponent {
    pub mutable: bool,
    pub values: Indexed<f64>,
}

impl ParamComponent {
    pub fn scalar(value: f64, mutable: bool) -> Self {
        ParamComponent {
            mutable,
            values: Indexed::scalar(value),
        }
    }
    pub fn indexed<I, K>(values: I, mutable: bool) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<Index>,
    {
        ParamComponent {
            mutable,
            values: Indexed::from_items(values),
        }
    }
}

////////////////////////////////////OBJECTIVES////////////////////////////////////////////////
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveComponent {
    pub expr: Expr,
    pub sense: Sense,
    pub active: bool,
}

impl ObjectiveComponent {
    pub fn minimize(expr: Expr) -> Self {
        ObjectiveComponent {
            expr,
            sense: Sense::Minimize,
            active: true,
        }
    }
    pub fn maximize(expr: Expr) -> Self {
        ObjectiveComponent {
            expr,
            sense: Sense::Maximize,
            active: true,
        }
    }
}

////////////////////////////////////CONSTRAINTS///////////////////////////////////////////////
/// shape of a constraint expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Relation {
    /// lhs == rhs
    Equality(Expr, Expr),
    /// lhs <= rhs
    Inequality(Expr, Expr),
    /// lower <= body <= upper
    Ranged(Expr, Expr, Expr),
}

impl Relation {
    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Relation::Equality(lhs, rhs)
    }
    pub fn le(lhs: Expr, rhs: Expr) -> Self {
        Relation::Inequality(lhs, rhs)
    }
    pub fn ge(lhs: Expr, rhs: Expr) -> Self {
        Relation::Inequality(rhs, lhs)
    }
    pub fn ranged(lower: Expr, body: Expr, upper: Expr) -> Self {
        Relation::Ranged(lower, body, upper)
    }
    pub fn is_equality(&self) -> bool {
        matches!(self, Relation::Equality(_, _))
    }
    /// two-sided inequality
    pub fn is_ranged(&self) -> bool {
        matches!(self, Relation::Ranged(_, _, _))
    }
    /// signed violation measure: zero when satisfied
    pub fn violation(&self, model: &Model) -> Result<f64, ModelError> {
        let v = match self {
            Relation::Equality(lhs, rhs) => (lhs.evaluate(model)? - rhs.evaluate(model)?).abs(),
            Relation::Inequality(lhs, rhs) => (lhs.evaluate(model)? - rhs.evaluate(model)?).max(0.0),
            Relation::Ranged(lower, body, upper) => {
                let b = body.evaluate(model)?;
                let below = lower.evaluate(model)? - b;
                let above = b - upper.evaluate(model)?;
                below.max(above).max(0.0)
            }
        };
        Ok(v)
    }
    pub fn is_satisfied(&self, model: &Model, tolerance: f64) -> Result<bool, ModelError> {
        Ok(self.violation(model)? <= tolerance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintData {
    pub relation: Relation,
    pub active: bool,
}

impl ConstraintData {
    pub fn new(relation: Relation) -> Self {
        ConstraintData {
            relation,
            active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintComponent {
    pub data: Indexed<ConstraintData>,
    /// constraint list: rows are appended with consecutive 1-based integer indices
    pub is_list: bool,
}

impl ConstraintComponent {
    pub fn scalar(relation: Relation) -> Self {
        ConstraintComponent {
            data: Indexed::scalar(ConstraintData::new(relation)),
            is_list: false,
        }
    }
    pub fn indexed<I, K>(relations: I) -> Self
    where
        I: IntoIterator<Item = (K, Relation)>,
        K: Into<Index>,
    {
        ConstraintComponent {
            data: Indexed::from_items(
                relations
                    .into_iter()
                    .map(|(k, r)| (k, ConstraintData::new(r))),
            ),
            is_list: false,
        }
    }
    pub fn list() -> Self {
        ConstraintComponent {
            data: Indexed::empty_indexed(),
            is_list: true,
        }
    }
    /// appends a row to a constraint list and returns its index
    pub fn add(&mut self, relation: Relation) -> Index {
        let idx = Index::Int(self.data.len() as i64 + 1);
        self.data.insert(idx.clone(), ConstraintData::new(relation));
        idx
    }
}

////////////////////////////////////NAMED EXPRESSIONS/////////////////////////////////////////
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionComponent {
    pub data: Indexed<Expr>,
}

impl ExpressionComponent {
    pub fn scalar(expr: Expr) -> Self {
        ExpressionComponent {
            data: Indexed::scalar(expr),
        }
    }
}

////////////////////////////////////BLOCKS////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockComponent {
    /// members in declaration order
    pub members: Vec<ComponentId>,
    pub active: bool,
    /// bookkeeping of the sensitivity toolbox when this block is its data block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<Box<SensitivityBlock>>,
}

impl BlockComponent {
    pub fn new() -> Self {
        BlockComponent {
            members: Vec::new(),
            active: true,
            sensitivity: None,
        }
    }
}

impl Default for BlockComponent {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentData {
    Var(VarComponent),
    Param(ParamComponent),
    Objective(ObjectiveComponent),
    Constraint(ConstraintComponent),
    Expression(ExpressionComponent),
    Block(BlockComponent),
}

impl ComponentData {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentData::Var(_) => ComponentKind::Var,
            ComponentData::Param(_) => ComponentKind::Param,
            ComponentData::Objective(_) => ComponentKind::Objective,
            ComponentData::Constraint(_) => ComponentKind::Constraint,
            ComponentData::Expression(_) => ComponentKind::Expression,
            ComponentData::Block(_) => ComponentKind::Block,
        }
    }
    pub fn is_indexed(&self) -> bool {
        match self {
            ComponentData::Var(v) => v.data.is_indexed(),
            ComponentData::Param(p) => p.values.is_indexed(),
            ComponentData::Constraint(c) => c.data.is_indexed(),
            ComponentData::Expression(e) => e.data.is_indexed(),
            ComponentData::Objective(_) | ComponentData::Block(_) => false,
        }
    }
}

/// one named entry of the model arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// local name inside the parent block
    pub name: String,
    /// owning block, `None` for the root block only
    pub parent: Option<ComponentId>,
    pub data: ComponentData,
}
