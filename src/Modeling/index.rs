//! # Component indices and leaf identities
//!
//! `Index` is the key of one element inside an indexed component, `DataRef` names one scalar
//! leaf of the model (a variable element, a parameter element, a constraint row, an objective).
//! `Indexed<T>` is the ordered container every component stores its elements in: scalar
//! components hold exactly one entry under the `None` key.
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Position of a component in the model arena
pub type ComponentId = usize;

/// index of an element of an indexed component
///
/// Ordering is total (integers, then strings, then tuples) so iteration over any index set is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Index {
    Int(i64),
    Str(String),
    Tuple(Vec<Index>),
}

impl Index {
    pub fn tuple<I: IntoIterator<Item = Index>>(items: I) -> Self {
        Index::Tuple(items.into_iter().collect())
    }
    /// form usable inside a component name: `1,'a'` -> `1_a`, `'a_b'` -> `a_b`
    pub fn name_fragment(&self) -> String {
        let raw = self.to_string();
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                out.push(c);
            } else if c == ',' || c == ' ' || c == '-' || c == '.' {
                if !out.ends_with('_') {
                    out.push('_');
                }
            }
        }
        out.trim_matches('_').to_string()
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Index::Int(i) => write!(f, "{}", i),
            Index::Str(s) => write!(f, "'{}'", s),
            Index::Tuple(items) => {
                for (k, item) in items.iter().enumerate() {
                    if k > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for Index {
    fn from(v: i64) -> Self {
        Index::Int(v)
    }
}

impl From<i32> for Index {
    fn from(v: i32) -> Self {
        Index::Int(v as i64)
    }
}

impl From<usize> for Index {
    fn from(v: usize) -> Self {
        Index::Int(v as i64)
    }
}

impl From<&str> for Index {
    fn from(v: &str) -> Self {
        Index::Str(v.to_string())
    }
}

impl From<String> for Index {
    fn from(v: String) -> Self {
        Index::Str(v)
    }
}

/// identity of one scalar leaf: the owning component and the element index
/// (`None` for unindexed components)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DataRef {
    pub component: ComponentId,
    pub index: Option<Index>,
}

impl DataRef {
    pub fn scalar(component: ComponentId) -> Self {
        DataRef {
            component,
            index: None,
        }
    }
    pub fn indexed(component: ComponentId, index: impl Into<Index>) -> Self {
        DataRef {
            component,
            index: Some(index.into()),
        }
    }
    pub fn new(component: ComponentId, index: Option<Index>) -> Self {
        DataRef { component, index }
    }
}

impl fmt::Display for DataRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.index {
            Some(idx) => write!(f, "#{}[{}]", self.component, idx),
            None => write!(f, "#{}", self.component),
        }
    }
}

/// Ordered element storage shared by all components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Indexed<T> {
    indexed: bool,
    #[serde(with = "pairs")]
    items: BTreeMap<Option<Index>, T>,
}

impl<T> Indexed<T> {
    pub fn scalar(value: T) -> Self {
        let mut items = BTreeMap::new();
        items.insert(None, value);
        Indexed {
            indexed: false,
            items,
        }
    }
    pub fn from_items<I, K>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<Index>,
    {
        Indexed {
            indexed: true,
            items: items
                .into_iter()
                .map(|(k, v)| (Some(k.into()), v))
                .collect(),
        }
    }
    /// an indexed container with no elements yet (constraint lists start like this)
    pub fn empty_indexed() -> Self {
        Indexed {
            indexed: true,
            items: BTreeMap::new(),
        }
    }
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    pub fn get(&self, index: &Option<Index>) -> Option<&T> {
        self.items.get(index)
    }
    pub fn get_mut(&mut self, index: &Option<Index>) -> Option<&mut T> {
        self.items.get_mut(index)
    }
    pub fn contains(&self, index: &Option<Index>) -> bool {
        self.items.contains_key(index)
    }
    /// inserts (or replaces) an element of an indexed container
    pub fn insert(&mut self, index: Index, value: T) -> Option<T> {
        self.items.insert(Some(index), value)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&Option<Index>, &T)> {
        self.items.iter()
    }
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Option<Index>, &mut T)> {
        self.items.iter_mut()
    }
    pub fn keys(&self) -> impl Iterator<Item = &Option<Index>> {
        self.items.keys()
    }
    /// sorted index set; empty for scalar containers
    pub fn index_set(&self) -> Vec<Index> {
        self.items.keys().filter_map(|k| k.clone()).collect()
    }
    /// builds a container with the same index structure and values produced by `f`
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> Indexed<U> {
        Indexed {
            indexed: self.indexed,
            items: self.items.iter().map(|(k, v)| (k.clone(), f(v))).collect(),
        }
    }
}

/// serde helper: ordered maps with non-string keys are written as sequences of `[key, value]`
pub(crate) mod pairs {
    use super::*;
    use std::hash::Hash;

    pub fn serialize<S, K, V>(map: &BTreeMap<K, V>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        K: Serialize,
        V: Serialize,
    {
        s.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D, K, V>(d: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        D: Deserializer<'de>,
        K: Deserialize<'de> + Ord + Hash,
        V: Deserialize<'de>,
    {
        let entries: Vec<(K, V)> = Vec::deserialize(d)?;
        Ok(entries.into_iter().collect())
    }
}
