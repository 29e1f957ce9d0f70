//! Markdown layout: header and front matter, overview index, one detailed
//! section per unit of work, footnotes.

use super::Document;
use crate::registry::{Field, UnitOfWork};

/// Characters dropped from a title when building its anchor
const ANCHOR_STRIP: &str = "()/\\!@#$%^&*_=+[{]}|;:'\"<>,.?";

pub fn render(document: &Document<'_>) -> String {
    let mut md = String::new();
    let registry = document.registry;
    let metadata = document.metadata;

    md.push_str(&format!("# {}\n", document.title));

    if let Some(meta) = metadata {
        if !meta.repository_name.is_empty() {
            md.push_str(&format!("\n**Repository Name:** {}\n", meta.repository_name));
        }
        if !meta.author.is_empty() {
            md.push_str(&format!("\n**Author:** {}\n", meta.author));
        }
        if !meta.license.is_empty() {
            md.push_str(&format!("\n**License:** {}\n", meta.license));
        }
        if !meta.requirements.is_empty() {
            md.push_str("\n**Requirements:**\n");
            for requirement in &meta.requirements {
                md.push_str(&format!("- {}\n", requirement));
            }
        }
        if !meta.intro.is_empty() {
            md.push_str("\n## Introduction\n");
            md.push_str(&meta.intro);
            md.push('\n');
        }
    }

    md.push_str("## Overview\n");

    if !registry.units().is_empty() {
        md.push_str("### Nodes\n");
        for unit in registry.units() {
            md.push_str(&format!(
                "- [{}](#{}) - {}\n",
                unit.title,
                anchor(&unit.title),
                unit.summary
            ));
        }
    }

    if !registry.functions().is_empty() {
        md.push_str("\n<details>\n");
        md.push_str("<summary>\n\n### Functions\n\n</summary>\n");
        for function in registry.functions() {
            md.push_str(&format!("\n- `{}` - {}", function.name, function.summary));
        }
        md.push_str("\n</details>\n");
    }

    if !registry.output_definitions().is_empty() {
        md.push_str("\n<details>\n");
        md.push_str("<summary>\n\n### Output Definitions\n\n</summary>\n");
        for definition in registry.output_definitions() {
            md.push_str(&format!(
                "\n- `{}` - Output definition with {} fields",
                definition.name,
                definition.fields.len()
            ));
        }
        md.push_str("\n</details>\n");
    }

    if !registry.units().is_empty() {
        md.push_str("\n## Nodes\n");
        for unit in registry.units() {
            render_unit(&mut md, unit, registry.output_fields(&unit.output));
        }
    }

    if let Some(meta) = metadata {
        if !meta.outro.is_empty() {
            md.push_str("\n## Footnotes\n");
            md.push_str(&meta.outro);
            md.push('\n');
        }
    }

    md
}

fn render_unit(md: &mut String, unit: &UnitOfWork, output_fields: &[Field]) {
    md.push_str(&format!("### {}\n", unit.title));
    md.push_str(&format!("**ID:** `{}`\n\n", unit.name));
    md.push_str(&format!("**Category:** {}\n\n", unit.category));
    if !unit.tags.is_empty() {
        md.push_str(&format!("**Tags:** {}\n\n", unit.tags.join(", ")));
    }
    if !unit.version.is_empty() {
        md.push_str(&format!("**Version:** {}\n\n", unit.version));
    }

    md.push_str(&format!("**Description:** {}\n", unit.summary));
    if !unit.description.is_empty() {
        md.push_str(&format!("\n{}\n", unit.description));
    }

    if !unit.inputs.is_empty() {
        md.push_str("\n<details>\n");
        md.push_str("<summary>\n\n#### Inputs\n\n</summary>\n\n");
        md.push_str("| Name | Type | Description | Default |\n");
        md.push_str("| ---- | ---- | ----------- | ------- |\n");
        for field in &unit.inputs {
            md.push_str(&format!(
                "| `{}` | `{}` | {} | {} |\n",
                field.name,
                field.type_name,
                field.description,
                field.default.as_deref().unwrap_or_default()
            ));
        }
        md.push_str("\n\n</details>\n");
    }

    md.push_str("\n<details>\n");
    md.push_str("<summary>\n\n#### Output\n\n</summary>\n\n");
    match unit.output.type_name() {
        Some(type_name) => {
            md.push_str(&format!("**Type:** `{}`\n\n", type_name));
            if !output_fields.is_empty() {
                md.push_str("| Name | Type | Description |\n");
                md.push_str("| ---- | ---- | ----------- |\n");
                for field in output_fields {
                    md.push_str(&format!(
                        "| `{}` | `{}` | {} |\n",
                        field.name, field.type_name, field.description
                    ));
                }
            }
        }
        None => md.push_str("No output information available.\n"),
    }
    md.push_str("\n\n</details>\n");

    md.push_str("\n---\n");
}

/// In-page anchor for a title: lower-cased, spaces to dashes, punctuation removed
pub fn anchor(title: &str) -> String {
    title
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| !ANCHOR_STRIP.contains(*c))
        .collect()
}
