use serde::Serialize;

/// A declared attribute of an input or output shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: String,
    /// Rendered default value; only input fields carry one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Field {
    pub fn output(name: impl Into<String>, type_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            description: description.into(),
            default: None,
        }
    }

    pub fn input(
        name: impl Into<String>,
        type_name: impl Into<String>,
        description: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            default: Some(default.into()),
            ..Self::output(name, type_name, description)
        }
    }
}

/// What a unit of work returns, as far as static inspection can tell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum OutputReference {
    /// Names an output definition present in the registry
    Resolved(String),
    /// Names a type with no known fields
    Unresolved(String),
    /// No `return <call>` was found
    Empty,
}

impl OutputReference {
    pub fn type_name(&self) -> Option<&str> {
        match self {
            OutputReference::Resolved(name) | OutputReference::Unresolved(name) => Some(name),
            OutputReference::Empty => None,
        }
    }
}

/// A documented operation (a class tagged with the unit-of-work marker)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitOfWork {
    pub name: String,
    pub title: String,
    pub summary: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub version: String,
    pub inputs: Vec<Field>,
    pub output: OutputReference,
}

/// The named shape of a unit of work's return value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDefinition {
    pub name: String,
    pub fields: Vec<Field>,
}

/// A top-level function outside any marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandaloneFunction {
    pub name: String,
    pub summary: String,
}
