//! Bookkeeping attached to the sensitivity data block of the working model.
use super::resolver::ComponentRef;
use crate::Modeling::{ComponentId, DataRef, Index};
use serde::{Deserialize, Serialize};
use std::fmt;

/// which way the substitution went for one designated component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubstitutionSource {
    /// a mutable parameter replaced by a new free variable
    Parameter,
    /// a fixed variable represented by a new mutable parameter
    Variable,
}

impl fmt::Display for SubstitutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubstitutionSource::Parameter => write!(f, "param -> var"),
            SubstitutionSource::Variable => write!(f, "var -> param"),
        }
    }
}

/// One scalar leaf under sensitivity analysis.
///
/// `free` always holds the variable data and `parameter` the parameter data, whichever of the two
/// was created by the toolbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionRecord {
    pub free: DataRef,
    pub parameter: DataRef,
    /// position of the designating entry in the user list
    pub list_index: usize,
    /// element index inside the designated component, `None` when unindexed
    pub container_index: Option<Index>,
    pub source: SubstitutionSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityBlock {
    /// the block component holding the substitutes, shadow containers and pinning list
    pub block: ComponentId,
    pub records: Vec<SubstitutionRecord>,
    /// set once objectives / constraints were rewritten; the block can no longer be rebuilt
    pub has_replaced_expressions: bool,
    /// designated components as resolved on the working model
    pub param_list: Vec<ComponentRef>,
    /// shadow objectives
    pub objectives: Vec<ComponentId>,
    /// shadow constraint list
    pub const_list: Option<ComponentId>,
    /// pinning constraint list, row `k` belongs to record `k - 1`
    pub param_const: Option<ComponentId>,
}

impl SensitivityBlock {
    pub fn new(block: ComponentId, param_list: Vec<ComponentRef>) -> Self {
        SensitivityBlock {
            block,
            records: Vec::new(),
            has_replaced_expressions: false,
            param_list,
            objectives: Vec::new(),
            const_list: None,
            param_const: None,
        }
    }

    /// pinning constraint row of the record at `position` (0-based)
    pub fn pinning_constraint(&self, position: usize) -> Option<DataRef> {
        self.param_const
            .map(|id| DataRef::indexed(id, (position + 1) as i64))
    }
}
