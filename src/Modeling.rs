//! # Algebraic modeling layer
//!
//! Minimal host framework the sensitivity toolbox operates on: indexed variables and
//! parameters, objectives, constraints and named expressions organised in blocks, a symbolic
//! expression tree whose leaves are identified by `DataRef`, and the annotation store used to
//! talk to external solvers.
/// indices, leaf identities and the indexed element container
pub mod index;
/// symbolic expression tree, evaluation and substitution
pub mod expr;
/// variables, parameters, objectives, constraints, expressions and blocks
pub mod components;
/// the model arena
pub mod container;
/// annotation slots (suffixes) exchanged with solvers
pub mod suffixes;
pub mod model_error;

pub use components::{
    ComponentKind, ConstraintComponent, ExpressionComponent, ObjectiveComponent, ParamComponent,
    Relation, Sense, VarComponent,
};
pub use container::Model;
pub use expr::{Expr, ExpressionReplacer};
pub use index::{ComponentId, DataRef, Index};
pub use model_error::ModelError;
pub use suffixes::{AnnotationStore, SuffixDirection};
