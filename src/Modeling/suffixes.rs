//! # Annotation store (solver suffixes)
//!
//! Named side channels between the model and an external solver. Each slot has a declared
//! direction: `Export` slots are written by the model side and read by the solver, `Import`
//! slots are filled by the solver after a solve, `ImportExport` go both ways. Values are keyed
//! by the `DataRef` of the annotated variable, constraint or objective.
use super::index::{ComponentId, DataRef, pairs};
use super::model_error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuffixDirection {
    Export,
    Import,
    ImportExport,
}

impl SuffixDirection {
    pub fn exports(&self) -> bool {
        matches!(self, SuffixDirection::Export | SuffixDirection::ImportExport)
    }
    pub fn imports(&self) -> bool {
        matches!(self, SuffixDirection::Import | SuffixDirection::ImportExport)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suffix {
    pub direction: SuffixDirection,
    #[serde(with = "pairs")]
    values: BTreeMap<DataRef, f64>,
}

impl Suffix {
    pub fn new(direction: SuffixDirection) -> Self {
        Suffix {
            direction,
            values: BTreeMap::new(),
        }
    }
    pub fn get(&self, key: &DataRef) -> Option<f64> {
        self.values.get(key).copied()
    }
    pub fn set(&mut self, key: DataRef, value: f64) {
        self.values.insert(key, value);
    }
    pub fn iter(&self) -> impl Iterator<Item = (&DataRef, &f64)> {
        self.values.iter()
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnotationStore {
    slots: BTreeMap<String, Suffix>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        AnnotationStore {
            slots: BTreeMap::new(),
        }
    }

    /// declares a slot; an existing slot of the same name is left as it is
    /// Returns true when the slot was created
    pub fn declare(&mut self, name: &str, direction: SuffixDirection) -> bool {
        if self.slots.contains_key(name) {
            return false;
        }
        self.slots.insert(name.to_string(), Suffix::new(direction));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn slot(&self, name: &str) -> Result<&Suffix, ModelError> {
        self.slots
            .get(name)
            .ok_or_else(|| ModelError::UnknownSlot(name.to_string()))
    }

    pub fn slot_mut(&mut self, name: &str) -> Result<&mut Suffix, ModelError> {
        self.slots
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownSlot(name.to_string()))
    }

    pub fn set(&mut self, name: &str, key: DataRef, value: f64) -> Result<(), ModelError> {
        self.slot_mut(name)?.set(key, value);
        Ok(())
    }

    pub fn get(&self, name: &str, key: &DataRef) -> Option<f64> {
        self.slots.get(name).and_then(|s| s.get(key))
    }

    /// copies every entry of `source` into `target` (existing keys are overwritten)
    pub fn update_from(&mut self, target: &str, source: &str) -> Result<(), ModelError> {
        let entries: Vec<(DataRef, f64)> = self
            .slot(source)?
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        let target = self.slot_mut(target)?;
        for (k, v) in entries {
            target.set(k, v);
        }
        Ok(())
    }

    pub fn clear(&mut self, name: &str) -> Result<(), ModelError> {
        self.slot_mut(name)?.clear();
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.slots.keys()
    }

    pub fn export_slots(&self) -> impl Iterator<Item = (&String, &Suffix)> {
        self.slots.iter().filter(|(_, s)| s.direction.exports())
    }

    pub fn import_slots(&self) -> impl Iterator<Item = (&String, &Suffix)> {
        self.slots.iter().filter(|(_, s)| s.direction.imports())
    }

    /// drops entries attached to a deleted component
    pub(crate) fn forget_component(&mut self, component: ComponentId) {
        for slot in self.slots.values_mut() {
            slot.values.retain(|k, _| k.component != component);
        }
    }
}
