//! # Model container
//!
//! ## Aim
//! The algebraic model the sensitivity toolbox works on: an arena of named components
//! organised in a tree of blocks, plus the annotation (suffix) store exchanged with external solvers.
//!
//! ## Main Data Structures and Logic
//! - components live in a `Vec` arena and are addressed by `ComponentId`; ids survive `clone()`,
//!   so a cloned model has the same component at the same path and id
//! - component 0 is the root block; every other component has a parent block
//! - deleted components leave a tombstone (`None`) so ids are never reused
//!
//! ## Key Methods
//! - `add_var()`, `add_param()`, `add_objective()`, `add_constraint()`, `add_expression()`, `add_block()`
//! - `path()`, `find_component()`, `unique_component_name()`, `del_component()`
//! - `active_objectives()`, `active_constraints()`: recursive enumeration through active blocks
//! - element access by `DataRef`: `var_data()`, `fix()`, `unfix()`, `param_value()`, `set_param_value()`...
use super::components::{
    BlockComponent, Component, ComponentData, ComponentKind, ConstraintComponent, ConstraintData,
    ExpressionComponent, ObjectiveComponent, ParamComponent, VarComponent, VarData,
};
use super::expr::Expr;
use super::index::{ComponentId, DataRef, Index};
use super::model_error::ModelError;
use super::suffixes::AnnotationStore;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const ROOT: ComponentId = 0;

fn name_pattern() -> &'static Regex {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid name regex"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    components: Vec<Option<Component>>,
    /// annotation slots (suffixes) shared with external solvers
    #[serde(default)]
    pub suffixes: AnnotationStore,
}

impl Model {
    pub fn new(name: &str) -> Self {
        Model {
            name: name.to_string(),
            components: vec![Some(Component {
                name: name.to_string(),
                parent: None,
                data: ComponentData::Block(BlockComponent::new()),
            })],
            suffixes: AnnotationStore::new(),
        }
    }

    pub fn root(&self) -> ComponentId {
        ROOT
    }

    pub fn get(&self, id: ComponentId) -> Result<&Component, ModelError> {
        self.components
            .get(id)
            .and_then(|c| c.as_ref())
            .ok_or(ModelError::UnknownComponent(id))
    }

    fn get_mut(&mut self, id: ComponentId) -> Result<&mut Component, ModelError> {
        self.components
            .get_mut(id)
            .and_then(|c| c.as_mut())
            .ok_or(ModelError::UnknownComponent(id))
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.get(id).is_ok()
    }

    pub fn kind(&self, id: ComponentId) -> Result<ComponentKind, ModelError> {
        Ok(self.get(id)?.data.kind())
    }

    pub fn local_name(&self, id: ComponentId) -> Result<&str, ModelError> {
        Ok(self.get(id)?.name.as_str())
    }

    pub fn is_indexed(&self, id: ComponentId) -> Result<bool, ModelError> {
        Ok(self.get(id)?.data.is_indexed())
    }

    /////////////////////////////////ADDING COMPONENTS///////////////////////////////////////
    /// component names follow identifier rules: `[A-Za-z_][A-Za-z0-9_]*`
    pub fn check_name(name: &str) -> Result<(), ModelError> {
        if !name_pattern().is_match(name) {
            return Err(ModelError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    pub fn add_component(
        &mut self,
        block: ComponentId,
        name: &str,
        data: ComponentData,
    ) -> Result<ComponentId, ModelError> {
        Self::check_name(name)?;
        if self.component(block, name).is_some() {
            return Err(ModelError::DuplicateComponent(
                name.to_string(),
                self.path(block)?,
            ));
        }
        // validates that `block` is a block before anything is pushed
        self.block(block)?;
        let id = self.components.len();
        self.components.push(Some(Component {
            name: name.to_string(),
            parent: Some(block),
            data,
        }));
        self.block_mut(block)?.members.push(id);
        Ok(id)
    }

    pub fn add_var(
        &mut self,
        block: ComponentId,
        name: &str,
        var: VarComponent,
    ) -> Result<ComponentId, ModelError> {
        self.add_component(block, name, ComponentData::Var(var))
    }

    pub fn add_param(
        &mut self,
        block: ComponentId,
        name: &str,
        param: ParamComponent,
    ) -> Result<ComponentId, ModelError> {
        self.add_component(block, name, ComponentData::Param(param))
    }

    pub fn add_objective(
        &mut self,
        block: ComponentId,
        name: &str,
        objective: ObjectiveComponent,
    ) -> Result<ComponentId, ModelError> {
        self.add_component(block, name, ComponentData::Objective(objective))
    }

    pub fn add_constraint(
        &mut self,
        block: ComponentId,
        name: &str,
        constraint: ConstraintComponent,
    ) -> Result<ComponentId, ModelError> {
        self.add_component(block, name, ComponentData::Constraint(constraint))
    }

    pub fn add_expression(
        &mut self,
        block: ComponentId,
        name: &str,
        expression: ExpressionComponent,
    ) -> Result<ComponentId, ModelError> {
        self.add_component(block, name, ComponentData::Expression(expression))
    }

    pub fn add_block(&mut self, block: ComponentId, name: &str) -> Result<ComponentId, ModelError> {
        self.add_component(block, name, ComponentData::Block(BlockComponent::new()))
    }

    /////////////////////////////////NAMES AND PATHS////////////////////////////////////////
    /// local lookup inside one block
    pub fn component(&self, block: ComponentId, name: &str) -> Option<ComponentId> {
        let members = match self.get(block).map(|c| &c.data) {
            Ok(ComponentData::Block(b)) => &b.members,
            _ => return None,
        };
        members
            .iter()
            .copied()
            .find(|&id| self.get(id).map(|c| c.name == name).unwrap_or(false))
    }

    pub fn members(&self, block: ComponentId) -> Result<&[ComponentId], ModelError> {
        Ok(self.block(block)?.members.as_slice())
    }

    /// dotted path from the root block (the root itself has an empty path)
    pub fn path(&self, id: ComponentId) -> Result<String, ModelError> {
        let mut parts = Vec::new();
        let mut current = id;
        loop {
            let c = self.get(current)?;
            match c.parent {
                Some(parent) => {
                    parts.push(c.name.clone());
                    current = parent;
                }
                None => break,
            }
        }
        parts.reverse();
        Ok(parts.join("."))
    }

    /// readable name of one element, `blk.x[1,'a']`
    pub fn data_name(&self, r: &DataRef) -> String {
        let base = self
            .path(r.component)
            .unwrap_or_else(|_| format!("#{}", r.component));
        match &r.index {
            Some(idx) => format!("{}[{}]", base, idx),
            None => base,
        }
    }

    /// resolves a dotted path of component names starting at the root block
    pub fn find_component(&self, path: &str) -> Result<ComponentId, ModelError> {
        let mut current = ROOT;
        if path.is_empty() {
            return Ok(current);
        }
        for part in path.split('.') {
            current = self
                .component(current, part)
                .ok_or_else(|| ModelError::UnknownPath(path.to_string()))?;
        }
        Ok(current)
    }

    /// `base` if free in `block`, otherwise `base_1`, `base_2`, ...
    pub fn unique_component_name(&self, block: ComponentId, base: &str) -> String {
        if self.component(block, base).is_none() {
            return base.to_string();
        }
        let mut k = 1;
        loop {
            let candidate = format!("{}_{}", base, k);
            if self.component(block, &candidate).is_none() {
                return candidate;
            }
            k += 1;
        }
    }

    /// removes a component (and, for blocks, everything below it)
    pub fn del_component(&mut self, id: ComponentId) -> Result<(), ModelError> {
        let parent = self
            .get(id)?
            .parent
            .ok_or_else(|| ModelError::InvalidName("the root block cannot be deleted".to_string()))?;
        let mut to_remove = vec![id];
        while let Some(current) = to_remove.pop() {
            if let Ok(Component {
                data: ComponentData::Block(b),
                ..
            }) = self.get(current)
            {
                to_remove.extend(b.members.iter().copied());
            }
            self.suffixes.forget_component(current);
            self.components[current] = None;
        }
        self.block_mut(parent)?.members.retain(|&m| m != id);
        Ok(())
    }

    /////////////////////////////////TYPED ACCESS///////////////////////////////////////////
    fn wrong_kind(&self, id: ComponentId, expected: ComponentKind) -> ModelError {
        ModelError::WrongKind {
            name: self.path(id).unwrap_or_default(),
            expected: expected.to_string(),
            found: self
                .kind(id)
                .map(|k| k.to_string())
                .unwrap_or_else(|_| "missing".to_string()),
        }
    }

    pub fn var(&self, id: ComponentId) -> Result<&VarComponent, ModelError> {
        match &self.get(id)?.data {
            ComponentData::Var(v) => Ok(v),
            _ => Err(self.wrong_kind(id, ComponentKind::Var)),
        }
    }

    pub fn var_mut(&mut self, id: ComponentId) -> Result<&mut VarComponent, ModelError> {
        if self.kind(id)? != ComponentKind::Var {
            return Err(self.wrong_kind(id, ComponentKind::Var));
        }
        match &mut self.get_mut(id)?.data {
            ComponentData::Var(v) => Ok(v),
            _ => unreachable!("kind checked above"),
        }
    }

    pub fn param(&self, id: ComponentId) -> Result<&ParamComponent, ModelError> {
        match &self.get(id)?.data {
            ComponentData::Param(p) => Ok(p),
            _ => Err(self.wrong_kind(id, ComponentKind::Param)),
        }
    }

    pub fn param_mut(&mut self, id: ComponentId) -> Result<&mut ParamComponent, ModelError> {
        if self.kind(id)? != ComponentKind::Param {
            return Err(self.wrong_kind(id, ComponentKind::Param));
        }
        match &mut self.get_mut(id)?.data {
            ComponentData::Param(p) => Ok(p),
            _ => unreachable!("kind checked above"),
        }
    }

    pub fn objective(&self, id: ComponentId) -> Result<&ObjectiveComponent, ModelError> {
        match &self.get(id)?.data {
            ComponentData::Objective(o) => Ok(o),
            _ => Err(self.wrong_kind(id, ComponentKind::Objective)),
        }
    }

    pub fn objective_mut(&mut self, id: ComponentId) -> Result<&mut ObjectiveComponent, ModelError> {
        if self.kind(id)? != ComponentKind::Objective {
            return Err(self.wrong_kind(id, ComponentKind::Objective));
        }
        match &mut self.get_mut(id)?.data {
            ComponentData::Objective(o) => Ok(o),
            _ => unreachable!("kind checked above"),
        }
    }

    pub fn constraint(&self, id: ComponentId) -> Result<&ConstraintComponent, ModelError> {
        match &self.get(id)?.data {
            ComponentData::Constraint(c) => Ok(c),
            _ => Err(self.wrong_kind(id, ComponentKind::Constraint)),
        }
    }

    pub fn constraint_mut(
        &mut self,
        id: ComponentId,
    ) -> Result<&mut ConstraintComponent, ModelError> {
        if self.kind(id)? != ComponentKind::Constraint {
            return Err(self.wrong_kind(id, ComponentKind::Constraint));
        }
        match &mut self.get_mut(id)?.data {
            ComponentData::Constraint(c) => Ok(c),
            _ => unreachable!("kind checked above"),
        }
    }

    pub fn expression(&self, id: ComponentId) -> Result<&ExpressionComponent, ModelError> {
        match &self.get(id)?.data {
            ComponentData::Expression(e) => Ok(e),
            _ => Err(self.wrong_kind(id, ComponentKind::Expression)),
        }
    }

    pub fn block(&self, id: ComponentId) -> Result<&BlockComponent, ModelError> {
        match &self.get(id)?.data {
            ComponentData::Block(b) => Ok(b),
            _ => Err(self.wrong_kind(id, ComponentKind::Block)),
        }
    }

    pub fn block_mut(&mut self, id: ComponentId) -> Result<&mut BlockComponent, ModelError> {
        if self.kind(id)? != ComponentKind::Block {
            return Err(self.wrong_kind(id, ComponentKind::Block));
        }
        match &mut self.get_mut(id)?.data {
            ComponentData::Block(b) => Ok(b),
            _ => unreachable!("kind checked above"),
        }
    }

    /////////////////////////////////ELEMENT ACCESS/////////////////////////////////////////
    fn unknown_index(&self, r: &DataRef) -> ModelError {
        ModelError::UnknownIndex {
            component: self.path(r.component).unwrap_or_default(),
            index: r
                .index
                .as_ref()
                .map(|i| i.to_string())
                .unwrap_or_else(|| "<none>".to_string()),
        }
    }

    pub fn var_data(&self, r: &DataRef) -> Result<&VarData, ModelError> {
        self.var(r.component)?
            .data
            .get(&r.index)
            .ok_or_else(|| self.unknown_index(r))
    }

    pub fn var_data_mut(&mut self, r: &DataRef) -> Result<&mut VarData, ModelError> {
        let err = self.unknown_index(r);
        self.var_mut(r.component)?.data.get_mut(&r.index).ok_or(err)
    }

    pub fn value(&self, r: &DataRef) -> Result<f64, ModelError> {
        match self.kind(r.component)? {
            ComponentKind::Param => self.param_value(r),
            _ => self
                .var_data(r)?
                .value
                .ok_or_else(|| ModelError::MissingValue(self.data_name(r))),
        }
    }

    pub fn set_value(&mut self, r: &DataRef, value: f64) -> Result<(), ModelError> {
        self.var_data_mut(r)?.value = Some(value);
        Ok(())
    }

    /// fixes a variable element, optionally at a new value
    pub fn fix(&mut self, r: &DataRef, value: Option<f64>) -> Result<(), ModelError> {
        let data = self.var_data_mut(r)?;
        if let Some(v) = value {
            data.value = Some(v);
        }
        data.fixed = true;
        Ok(())
    }

    pub fn unfix(&mut self, r: &DataRef) -> Result<(), ModelError> {
        self.var_data_mut(r)?.fixed = false;
        Ok(())
    }

    pub fn is_fixed(&self, r: &DataRef) -> Result<bool, ModelError> {
        Ok(self.var_data(r)?.fixed)
    }

    pub fn param_value(&self, r: &DataRef) -> Result<f64, ModelError> {
        self.param(r.component)?
            .values
            .get(&r.index)
            .copied()
            .ok_or_else(|| self.unknown_index(r))
    }

    pub fn set_param_value(&mut self, r: &DataRef, value: f64) -> Result<(), ModelError> {
        if !self.param(r.component)?.mutable {
            return Err(ModelError::ImmutableParameter(self.data_name(r)));
        }
        let err = self.unknown_index(r);
        let slot = self.param_mut(r.component)?.values.get_mut(&r.index).ok_or(err)?;
        *slot = value;
        Ok(())
    }

    pub fn named_expression(&self, r: &DataRef) -> Result<&Expr, ModelError> {
        self.expression(r.component)?
            .data
            .get(&r.index)
            .ok_or_else(|| self.unknown_index(r))
    }

    pub fn constraint_data(&self, r: &DataRef) -> Result<&ConstraintData, ModelError> {
        self.constraint(r.component)?
            .data
            .get(&r.index)
            .ok_or_else(|| self.unknown_index(r))
    }

    /// deactivates an objective (unindexed reference) or a constraint row
    pub fn deactivate(&mut self, r: &DataRef) -> Result<(), ModelError> {
        self.set_active(r, false)
    }

    pub fn activate(&mut self, r: &DataRef) -> Result<(), ModelError> {
        self.set_active(r, true)
    }

    fn set_active(&mut self, r: &DataRef, active: bool) -> Result<(), ModelError> {
        match self.kind(r.component)? {
            ComponentKind::Objective => {
                self.objective_mut(r.component)?.active = active;
                Ok(())
            }
            ComponentKind::Constraint => {
                let err = self.unknown_index(r);
                let data = self
                    .constraint_mut(r.component)?
                    .data
                    .get_mut(&r.index)
                    .ok_or(err)?;
                data.active = active;
                Ok(())
            }
            ComponentKind::Block => {
                self.block_mut(r.component)?.active = active;
                Ok(())
            }
            _ => Err(self.wrong_kind(r.component, ComponentKind::Constraint)),
        }
    }

    /// elements of a variable, parameter or constraint component in sorted index order
    pub fn component_items(&self, id: ComponentId) -> Result<Vec<DataRef>, ModelError> {
        let keys: Vec<Option<Index>> = match &self.get(id)?.data {
            ComponentData::Var(v) => v.data.keys().cloned().collect(),
            ComponentData::Param(p) => p.values.keys().cloned().collect(),
            ComponentData::Constraint(c) => c.data.keys().cloned().collect(),
            ComponentData::Expression(e) => e.data.keys().cloned().collect(),
            ComponentData::Objective(_) => vec![None],
            ComponentData::Block(_) => return Err(self.wrong_kind(id, ComponentKind::Var)),
        };
        Ok(keys.into_iter().map(|k| DataRef::new(id, k)).collect())
    }

    /////////////////////////////////RECURSIVE ENUMERATION//////////////////////////////////
    /// components of active blocks, depth first in declaration order
    fn active_components(&self) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(block) = stack.pop() {
            let Ok(b) = self.block(block) else { continue };
            if !b.active {
                continue;
            }
            let mut sub_blocks = Vec::new();
            for &m in &b.members {
                match self.kind(m) {
                    Ok(ComponentKind::Block) => sub_blocks.push(m),
                    Ok(_) => out.push(m),
                    Err(_) => {}
                }
            }
            // reversed so the first declared sub-block is visited first
            stack.extend(sub_blocks.into_iter().rev());
        }
        out
    }

    pub fn active_objectives(&self) -> Vec<DataRef> {
        self.active_components()
            .into_iter()
            .filter(|&id| self.objective(id).map(|o| o.active).unwrap_or(false))
            .map(DataRef::scalar)
            .collect()
    }

    pub fn active_constraints(&self) -> Vec<DataRef> {
        let mut out = Vec::new();
        for id in self.active_components() {
            if let Ok(c) = self.constraint(id) {
                out.extend(
                    c.data
                        .iter()
                        .filter(|(_, d)| d.active)
                        .map(|(k, _)| DataRef::new(id, k.clone())),
                );
            }
        }
        out
    }

    /// every variable element of active blocks
    pub fn variables(&self) -> Vec<DataRef> {
        let mut out = Vec::new();
        for id in self.active_components() {
            if let Ok(v) = self.var(id) {
                out.extend(v.data.keys().map(|k| DataRef::new(id, k.clone())));
            }
        }
        out
    }
}
