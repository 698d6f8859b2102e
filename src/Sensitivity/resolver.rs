//! # Component resolver
//!
//! Designated components are given against the model the user built. When the toolbox works on
//! a clone, each reference is turned into a stable path (`ComponentUid`) and looked up again on the
//! working copy; when it works in place the references pass through.
use super::sens_error::SensitivityError;
use crate::Modeling::{ComponentId, DataRef, Index, Model};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A whole component, or a single element of an indexed component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    pub component: ComponentId,
    pub index: Option<Index>,
}

impl ComponentRef {
    pub fn whole(component: ComponentId) -> Self {
        ComponentRef {
            component,
            index: None,
        }
    }
    pub fn element(component: ComponentId, index: impl Into<Index>) -> Self {
        ComponentRef {
            component,
            index: Some(index.into()),
        }
    }
    pub fn is_element(&self) -> bool {
        self.index.is_some()
    }
}

impl From<ComponentId> for ComponentRef {
    fn from(component: ComponentId) -> Self {
        ComponentRef::whole(component)
    }
}

impl From<DataRef> for ComponentRef {
    fn from(r: DataRef) -> Self {
        ComponentRef {
            component: r.component,
            index: r.index,
        }
    }
}

fn uid_pattern() -> &'static Regex {
    static UID: OnceLock<Regex> = OnceLock::new();
    UID.get_or_init(|| {
        Regex::new(
            r"^(?P<path>[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)(?:\[(?P<index>[^\]]*)\])?$",
        )
        .expect("valid uid regex")
    })
}

fn index_item_pattern() -> &'static Regex {
    static ITEM: OnceLock<Regex> = OnceLock::new();
    ITEM.get_or_init(|| {
        Regex::new(r#"'(?P<sq>[^']*)'|"(?P<dq>[^"]*)"|(?P<int>-?\d+)|(?P<word>[A-Za-z_][A-Za-z0-9_]*)"#)
            .expect("valid index regex")
    })
}

/// Stable, model-independent identifier of a component (or component element):
/// `blk.sub.p` or `blk.p[1,'a']`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentUid {
    segments: Vec<String>,
    index: Option<Index>,
}

impl ComponentUid {
    pub fn from_component(model: &Model, r: &ComponentRef) -> Result<Self, SensitivityError> {
        let path = model
            .path(r.component)
            .map_err(|e| SensitivityError::Resolution(e.to_string()))?;
        if path.is_empty() {
            return Err(SensitivityError::Resolution(
                "the root block cannot be designated".to_string(),
            ));
        }
        Ok(ComponentUid {
            segments: path.split('.').map(|s| s.to_string()).collect(),
            index: r.index.clone(),
        })
    }

    pub fn parse(text: &str) -> Result<Self, SensitivityError> {
        let caps = uid_pattern().captures(text.trim()).ok_or_else(|| {
            SensitivityError::Resolution(format!("'{}' is not a valid component path", text))
        })?;
        let segments = caps["path"].split('.').map(|s| s.to_string()).collect();
        let index = match caps.name("index") {
            Some(m) => Some(parse_index(m.as_str())?),
            None => None,
        };
        Ok(ComponentUid { segments, index })
    }

    /// locates the same component (element) on `model`
    pub fn find_component_on(&self, model: &Model) -> Result<ComponentRef, SensitivityError> {
        let mut current = model.root();
        for seg in &self.segments {
            current = model.component(current, seg).ok_or_else(|| {
                SensitivityError::Resolution(format!(
                    "component '{}' not found in model '{}'",
                    self, model.name
                ))
            })?;
        }
        if let Some(idx) = &self.index {
            let r = DataRef::new(current, Some(idx.clone()));
            let items = model
                .component_items(current)
                .map_err(|e| SensitivityError::Resolution(e.to_string()))?;
            if !items.contains(&r) {
                return Err(SensitivityError::Resolution(format!(
                    "index [{}] not found on '{}' in model '{}'",
                    idx,
                    self.segments.join("."),
                    model.name
                )));
            }
        }
        Ok(ComponentRef {
            component: current,
            index: self.index.clone(),
        })
    }
}

impl fmt::Display for ComponentUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))?;
        if let Some(idx) = &self.index {
            write!(f, "[{}]", idx)?;
        }
        Ok(())
    }
}

fn parse_index(text: &str) -> Result<Index, SensitivityError> {
    let malformed = || SensitivityError::Resolution(format!("malformed index '[{}]'", text));
    let mut items = Vec::new();
    let mut last_end = 0;
    for caps in index_item_pattern().captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        // items are separated by exactly one comma, surrounded by optional blanks
        let gap = text[last_end..whole.start()].trim();
        let separator = if items.is_empty() { "" } else { "," };
        if gap != separator {
            return Err(malformed());
        }
        last_end = whole.end();
        let item = if let Some(m) = caps.name("sq").or_else(|| caps.name("dq")) {
            Index::Str(m.as_str().to_string())
        } else if let Some(m) = caps.name("int") {
            let v = m.as_str().parse::<i64>().map_err(|e| {
                SensitivityError::Resolution(format!("bad index '{}': {}", text, e))
            })?;
            Index::Int(v)
        } else if let Some(m) = caps.name("word") {
            Index::Str(m.as_str().to_string())
        } else {
            continue;
        };
        items.push(item);
    }
    if !text[last_end..].trim().is_empty() {
        return Err(malformed());
    }
    match items.len() {
        0 => Err(SensitivityError::Resolution(format!(
            "empty index in '[{}]'",
            text
        ))),
        1 => Ok(items.remove(0)),
        _ => Ok(Index::Tuple(items)),
    }
}

/// Maps user references onto the working model.
///
/// `original` is the model the references were made against when the working model is a clone;
/// `None` means the working model is the user's model and references pass through.
pub fn resolve_components(
    original: Option<&Model>,
    working: &Model,
    refs: &[ComponentRef],
) -> Result<Vec<ComponentRef>, SensitivityError> {
    let mut resolved = Vec::with_capacity(refs.len());
    for r in refs {
        match original {
            Some(orig) => {
                let uid = ComponentUid::from_component(orig, r)?;
                resolved.push(uid.find_component_on(working)?);
            }
            None => {
                if !working.contains(r.component) {
                    return Err(SensitivityError::Resolution(format!(
                        "component id {} does not exist in model '{}'",
                        r.component, working.name
                    )));
                }
                resolved.push(r.clone());
            }
        }
    }
    Ok(resolved)
}

/// parses a list of textual paths and resolves them on `model`
pub fn find_components(
    model: &Model,
    paths: &[String],
) -> Result<Vec<ComponentRef>, SensitivityError> {
    paths
        .iter()
        .map(|p| ComponentUid::parse(p)?.find_component_on(model))
        .collect()
}
