use thiserror::Error;

/// errors raised by the modeling layer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("component '{0}' already exists in block '{1}'")]
    DuplicateComponent(String, String),
    #[error("unknown component id {0}")]
    UnknownComponent(usize),
    #[error("no component found at path '{0}'")]
    UnknownPath(String),
    #[error("index {index} is not in the index set of '{component}'")]
    UnknownIndex { component: String, index: String },
    #[error("'{name}' is a {found}, expected a {expected}")]
    WrongKind {
        name: String,
        expected: String,
        found: String,
    },
    #[error("parameter '{0}' is not mutable")]
    ImmutableParameter(String),
    #[error("'{0}' has no value")]
    MissingValue(String),
    #[error("annotation slot '{0}' is not declared")]
    UnknownSlot(String),
    #[error("invalid component name '{0}'")]
    InvalidName(String),
}
