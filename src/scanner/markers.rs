//! Recognition of marker decorators and extraction of the records they tag.
//!
//! A marker is a call-form decorator whose callee is a bare name:
//! `@invocation("id", title=...)` or `@invocation_output("id")`. Arguments of
//! the wrong shape degrade to empty values; they never abort extraction of the
//! surrounding class.

use crate::registry::{
    Field, MetadataRegistry, OutputDefinition, OutputReference, StandaloneFunction, UnitOfWork,
};
use crate::render::{render_type, render_value, NO_DEFAULT};
use crate::syntax::{Expr, Keyword, NodeId, Stmt, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    UnitOfWork,
    OutputDefinition,
}

/// Marker names the scanner looks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    pub unit_of_work: String,
    pub output_definition: String,
    /// Method whose return statements name the output type
    pub output_method: String,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self {
            unit_of_work: "invocation".to_string(),
            output_definition: "invocation_output".to_string(),
            output_method: "invoke".to_string(),
        }
    }
}

/// Arguments of a matched marker decorator
#[derive(Debug, Clone, Copy)]
pub struct Marker<'a> {
    pub kind: MarkerKind,
    pub args: &'a [Expr],
    pub keywords: &'a [Keyword],
}

impl<'a> Marker<'a> {
    /// Literal string keyword argument, empty when absent or not a string
    pub fn string_keyword(&self, name: &str) -> String {
        self.keyword(name).map(literal_string).unwrap_or_default()
    }

    /// List-of-strings keyword argument, empty when absent or not a list
    pub fn list_keyword(&self, name: &str) -> Vec<String> {
        match self.keyword(name) {
            Some(Expr::List(items)) => items.iter().map(literal_string).collect(),
            _ => Vec::new(),
        }
    }

    pub fn first_positional(&self) -> String {
        self.args.first().map(literal_string).unwrap_or_default()
    }

    fn keyword(&self, name: &str) -> Option<&'a Expr> {
        self.keywords
            .iter()
            .find(|keyword| keyword.is(name))
            .map(|keyword| &keyword.value)
    }
}

impl MarkerSet {
    fn marker_name(&self, kind: MarkerKind) -> &str {
        match kind {
            MarkerKind::UnitOfWork => &self.unit_of_work,
            MarkerKind::OutputDefinition => &self.output_definition,
        }
    }

    /// Finds the first decorator matching `kind`
    fn find<'a>(&self, decorators: &'a [Expr], kind: MarkerKind) -> Option<Marker<'a>> {
        let wanted = self.marker_name(kind);
        decorators.iter().find_map(|decorator| match decorator {
            Expr::Call {
                func,
                args,
                keywords,
            } if func.as_name() == Some(wanted) => Some(Marker {
                kind,
                args: args.as_slice(),
                keywords: keywords.as_slice(),
            }),
            _ => None,
        })
    }

    /// Markers carried by a class statement, unit of work first. A class may
    /// carry both kinds and is then extracted as both records.
    pub fn recognize<'a>(&self, stmt: &'a Stmt) -> Vec<Marker<'a>> {
        let Stmt::ClassDef { decorators, .. } = stmt else {
            return Vec::new();
        };
        [MarkerKind::UnitOfWork, MarkerKind::OutputDefinition]
            .into_iter()
            .filter_map(|kind| self.find(decorators, kind))
            .collect()
    }

    fn recognize_as<'a>(&self, stmt: &'a Stmt, kind: MarkerKind) -> Option<Marker<'a>> {
        self.recognize(stmt)
            .into_iter()
            .find(|marker| marker.kind == kind)
    }

    /// Builds the output definition for a class tagged with the output marker
    pub fn extract_output_definition(
        &self,
        tree: &SyntaxTree,
        id: NodeId,
    ) -> Option<OutputDefinition> {
        let stmt = tree.stmt(id);
        let Stmt::ClassDef { name, body, .. } = stmt else {
            return None;
        };
        self.recognize_as(stmt, MarkerKind::OutputDefinition)?;

        Some(OutputDefinition {
            name: name.clone(),
            fields: class_fields(tree, body, false),
        })
    }

    /// Builds the unit-of-work record for a class tagged with the unit marker.
    ///
    /// The output reference is resolved against `registry`, which must already
    /// hold every output definition of the run.
    pub fn extract_unit_of_work(
        &self,
        tree: &SyntaxTree,
        id: NodeId,
        registry: &MetadataRegistry,
    ) -> Option<UnitOfWork> {
        let stmt = tree.stmt(id);
        let Stmt::ClassDef { body, .. } = stmt else {
            return None;
        };
        let marker = self.recognize_as(stmt, MarkerKind::UnitOfWork)?;
        let (summary, description) = split_docstring(stmt.docstring(tree).unwrap_or(""));

        Some(UnitOfWork {
            name: marker.first_positional(),
            title: marker.string_keyword("title"),
            summary,
            description,
            category: marker.string_keyword("category"),
            tags: marker.list_keyword("tags"),
            version: marker.string_keyword("version"),
            inputs: class_fields(tree, body, true),
            output: self.resolve_output(tree, body, registry),
        })
    }

    /// Builds a standalone function record for a plain top-level `def`
    pub fn extract_function(&self, tree: &SyntaxTree, id: NodeId) -> Option<StandaloneFunction> {
        let stmt = tree.stmt(id);
        match stmt {
            Stmt::FunctionDef {
                name,
                is_async: false,
                ..
            } if tree.is_top_level(id) => {
                let (summary, _) = split_docstring(stmt.docstring(tree).unwrap_or(""));
                Some(StandaloneFunction {
                    name: name.clone(),
                    summary,
                })
            }
            _ => None,
        }
    }

    /// Finds the output type from the first `return Call(...)` inside the
    /// class's output method
    fn resolve_output(
        &self,
        tree: &SyntaxTree,
        class_body: &[NodeId],
        registry: &MetadataRegistry,
    ) -> OutputReference {
        let method = class_body.iter().copied().find(|&child| {
            matches!(
                tree.stmt(child),
                Stmt::FunctionDef { name, is_async: false, .. } if *name == self.output_method
            )
        });
        let Some(method) = method else {
            return OutputReference::Empty;
        };

        tree.walk_from(method)
            .into_iter()
            .skip(1)
            .find_map(|id| match tree.stmt(id) {
                Stmt::Return {
                    value: Some(Expr::Call { func, .. }),
                } => returned_type(func, registry),
                _ => None,
            })
            .unwrap_or(OutputReference::Empty)
    }
}

fn returned_type(func: &Expr, registry: &MetadataRegistry) -> Option<OutputReference> {
    match func {
        Expr::Name(name) if registry.resolve_output(name).is_some() => {
            Some(OutputReference::Resolved(name.clone()))
        }
        Expr::Name(name) => Some(OutputReference::Unresolved(name.clone())),
        Expr::Attribute { value, attr } => Some(OutputReference::Unresolved(format!(
            "{}.{}(...)",
            render_type(value),
            attr
        ))),
        _ => None,
    }
}

/// Annotated assignments directly in a class body, in source order
fn class_fields(tree: &SyntaxTree, body: &[NodeId], with_default: bool) -> Vec<Field> {
    body.iter()
        .filter_map(|&id| match tree.stmt(id) {
            Stmt::AnnAssign {
                target: Expr::Name(name),
                annotation,
                value,
            } => {
                let keywords: &[Keyword] = match value {
                    Some(Expr::Call { keywords, .. }) => keywords.as_slice(),
                    _ => &[],
                };
                let description = keywords
                    .iter()
                    .find(|keyword| keyword.is("description"))
                    .and_then(|keyword| keyword.value.as_str())
                    .unwrap_or_default()
                    .to_string();
                let type_name = render_type(annotation);

                Some(if with_default {
                    let default = keywords
                        .iter()
                        .find(|keyword| keyword.is("default"))
                        .map(|keyword| render_value(&keyword.value))
                        .unwrap_or_else(|| NO_DEFAULT.to_string());
                    Field::input(name.clone(), type_name, description, default)
                } else {
                    Field::output(name.clone(), type_name, description)
                })
            }
            _ => None,
        })
        .collect()
}

fn literal_string(expr: &Expr) -> String {
    expr.as_str().unwrap_or_default().to_string()
}

/// Splits a docstring into its first line and the remaining text, both trimmed
pub fn split_docstring(docstring: &str) -> (String, String) {
    let trimmed = docstring.trim();
    match trimmed.split_once('\n') {
        Some((first, rest)) => (first.trim().to_string(), rest.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}
