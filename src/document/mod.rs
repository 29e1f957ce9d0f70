//! Document assembly from a finalized registry.

pub mod markdown;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Result;
use crate::metadata::DocMetadata;
use crate::registry::{Field, MetadataRegistry, OutputDefinition, StandaloneFunction, UnitOfWork};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format `{}` (expected markdown or json)", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Markdown => f.write_str("markdown"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Everything the assembler needs; holds finished records only
pub struct Document<'a> {
    pub title: &'a str,
    pub metadata: Option<&'a DocMetadata>,
    pub registry: &'a MetadataRegistry,
}

impl<'a> Document<'a> {
    pub fn new(title: &'a str, metadata: Option<&'a DocMetadata>, registry: &'a MetadataRegistry) -> Self {
        Self {
            title,
            metadata,
            registry,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Markdown => Ok(self.to_markdown()),
            OutputFormat::Json => self.to_json(),
        }
    }

    pub fn to_markdown(&self) -> String {
        markdown::render(self)
    }

    pub fn to_json(&self) -> Result<String> {
        let nodes = self
            .registry
            .units()
            .iter()
            .map(|unit| JsonNode {
                unit,
                output_fields: self.registry.output_fields(&unit.output),
            })
            .collect();
        let view = JsonDocument {
            title: self.title,
            metadata: self.metadata,
            nodes,
            functions: self.registry.functions(),
            output_definitions: self.registry.output_definitions(),
        };
        Ok(serde_json::to_string_pretty(&view)?)
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    title: &'a str,
    metadata: Option<&'a DocMetadata>,
    nodes: Vec<JsonNode<'a>>,
    functions: &'a [StandaloneFunction],
    output_definitions: &'a [OutputDefinition],
}

#[derive(Serialize)]
struct JsonNode<'a> {
    #[serde(flatten)]
    unit: &'a UnitOfWork,
    output_fields: &'a [Field],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::OutputReference;

    fn registry() -> MetadataRegistry {
        let mut registry = MetadataRegistry::new();
        registry.register_output_definition(OutputDefinition {
            name: "StringOutput".into(),
            fields: vec![Field::output("value", "str", "The output string")],
        });
        registry.register_unit_of_work(UnitOfWork {
            name: "concat".into(),
            title: "Concatenate".into(),
            summary: "Joins strings".into(),
            description: String::new(),
            category: "string".into(),
            tags: vec!["text".into()],
            version: "1.0.0".into(),
            inputs: vec![Field::input("a", "str", "Left", "None")],
            output: OutputReference::Resolved("StringOutput".into()),
        });
        registry.finalize();
        registry
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("markdown".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("html".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert_eq!(OutputFormat::default().to_string(), "markdown");
    }

    #[test]
    fn test_json_includes_resolved_fields() {
        let registry = registry();
        let json = Document::new("strings", None, &registry).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["title"], "strings");
        assert!(value["metadata"].is_null());
        assert_eq!(value["nodes"][0]["name"], "concat");
        assert_eq!(value["nodes"][0]["output"]["kind"], "resolved");
        assert_eq!(value["nodes"][0]["output_fields"][0]["name"], "value");
        assert_eq!(value["nodes"][0]["inputs"][0]["default"], "None");
        assert_eq!(value["output_definitions"][0]["name"], "StringOutput");
    }

    #[test]
    fn test_render_dispatches_on_format() {
        let registry = registry();
        let document = Document::new("strings", None, &registry);
        assert!(document
            .render(OutputFormat::Markdown)
            .unwrap()
            .starts_with("# strings\n"));
        assert!(document.render(OutputFormat::Json).unwrap().starts_with('{'));
    }
}
