//! Parser for the `node-docs.yaml` front-matter file.
//!
//! The file sits next to the scanned modules and carries free text that is
//! passed through to the generated document untouched:
//!
//! ```yaml
//! repository_name: image-nodes
//! author: Jane Doe
//! license: MIT
//! requirements:
//!   - pillow
//! intro: |
//!   A collection of image processing nodes.
//! outro: Thanks for reading.
//! ```

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::error::{DocsError, Result};

/// Default name of the front-matter file
pub const METADATA_FILENAME: &str = "node-docs.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMetadata {
    #[serde(default, deserialize_with = "text")]
    pub intro: String,

    #[serde(default, deserialize_with = "text")]
    pub outro: String,

    #[serde(default, deserialize_with = "text")]
    pub repository_name: String,

    #[serde(default, deserialize_with = "text")]
    pub author: String,

    #[serde(default, deserialize_with = "text")]
    pub license: String,

    #[serde(default, deserialize_with = "text_list")]
    pub requirements: Vec<String>,

    #[serde(default, deserialize_with = "text")]
    pub description: String,

    #[serde(default, deserialize_with = "text_list")]
    pub keywords: Vec<String>,
}

/// Parses front-matter content; an empty or null document yields `None`
pub fn parse_metadata(content: &str) -> Result<Option<DocMetadata>> {
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str::<Option<DocMetadata>>(content)
        .map_err(|e| DocsError::Metadata(format!("Invalid metadata YAML: {}", e)))
}

/// Loads `file_name` from `dir`. Missing or malformed files are logged and
/// treated as absent.
pub fn load_metadata(dir: &Path, file_name: &str) -> Option<DocMetadata> {
    let path = dir.join(file_name);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("No metadata file at {}: {}", path.display(), e);
            return None;
        }
    };

    match parse_metadata(&content) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!("Error parsing metadata file '{}': {}", path.display(), e);
            None
        }
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_text(value).ok_or_else(|| <D::Error as serde::de::Error>::custom("expected a string"))
}

/// Accepts a list of scalars or a single scalar
fn text_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| {
                scalar_text(item).ok_or_else(|| <D::Error as serde::de::Error>::custom("expected a list of strings"))
            })
            .collect(),
        other => {
            let single = scalar_text(other)
                .ok_or_else(|| <D::Error as serde::de::Error>::custom("expected a string or a list of strings"))?;
            Ok(if single.is_empty() { Vec::new() } else { vec![single] })
        }
    }
}
