use std::sync::Arc;

use crate::error::{DocsError, Result};
use crate::languages::python::PYTHON;
use crate::languages::{LanguageGrammar, LanguageRegistry};
use crate::syntax::{build_tree, SyntaxTree};

/// Python 2 statement forms the grammar still accepts without error nodes
const LEGACY_STATEMENTS: &[&str] = &["print_statement", "exec_statement"];

pub struct Parser {
    registry: LanguageRegistry,
}

impl Parser {
    pub fn new(registry: LanguageRegistry) -> Self {
        Self { registry }
    }

    /// Parses one module's text. Trees containing error or missing nodes, or
    /// Python 2 only statements, are rejected with the position of the first
    /// offending node.
    pub fn parse_source(
        &self,
        module: &str,
        source: &str,
        grammar: Arc<dyn LanguageGrammar>,
    ) -> Result<ParsedModule> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&grammar.language())
            .map_err(|e| parse_error(module, 0, 0, e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| parse_error(module, 0, 0, "Failed to parse source".to_string()))?;

        let root = tree.root_node();
        if let Some((node, message)) = first_error(root) {
            let position = node.start_position();
            return Err(parse_error(
                module,
                position.row + 1,
                position.column + 1,
                message,
            ));
        }

        Ok(ParsedModule {
            module: module.to_string(),
            tree: build_tree(root, source),
        })
    }

    /// Parses a Python module. `module` only identifies the source in records
    /// and diagnostics; it need not be a file path.
    pub fn parse_module(&self, module: &str, source: &str) -> Result<ParsedModule> {
        let grammar = self
            .registry
            .get_by_name(PYTHON)
            .ok_or_else(|| DocsError::UnsupportedLanguage(PYTHON.to_string()))?;
        self.parse_source(module, source, grammar)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(LanguageRegistry::new())
    }
}

pub struct ParsedModule {
    pub module: String,
    pub tree: SyntaxTree,
}

fn parse_error(module: &str, line: usize, column: usize, message: String) -> DocsError {
    DocsError::Parse {
        module: module.to_string(),
        line,
        column,
        message,
    }
}

/// Depth-first search for the first node that makes the module invalid
fn first_error(node: tree_sitter::Node<'_>) -> Option<(tree_sitter::Node<'_>, String)> {
    if node.is_missing() {
        return Some((node, format!("missing `{}`", node.kind())));
    }
    if node.is_error() {
        return Some((node, "invalid syntax".to_string()));
    }
    if LEGACY_STATEMENTS.contains(&node.kind()) {
        let keyword = node.kind().trim_end_matches("_statement");
        return Some((node, format!("Python 2 `{}` statement", keyword)));
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
