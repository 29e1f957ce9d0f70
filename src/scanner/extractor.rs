//! Directory-wide extraction.
//!
//! Every module is parsed once. Output definitions from all modules are
//! registered before any unit of work is built, so a return type resolves
//! regardless of which file declares it or in what order files are read.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::languages::LanguageRegistry;
use crate::registry::MetadataRegistry;
use crate::scanner::markers::MarkerSet;
use crate::scanner::parser::{ParsedModule, Parser};
use crate::scanner::walker::FileWalker;

#[derive(Debug, Clone, Default)]
pub struct ExtractorConfig {
    pub markers: MarkerSet,
    /// Scan subdirectories as well as the top level
    pub recursive: bool,
}

/// A module that contributed nothing, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedModule {
    pub module: String,
    pub reason: String,
}

/// Finalized registry plus diagnostics for the modules that were skipped
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub registry: MetadataRegistry,
    pub skipped: Vec<SkippedModule>,
}

pub struct DocExtractor {
    config: ExtractorConfig,
    parser: Parser,
}

impl DocExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            parser: Parser::new(LanguageRegistry::new()),
        }
    }

    /// Reads every supported file under `root` and extracts from all of them.
    ///
    /// Only a failure to enumerate `root` itself is an error; unreadable or
    /// unparsable files are logged and skipped.
    pub fn extract_directory(&self, root: &Path) -> Result<Extraction> {
        let walker = FileWalker::new(LanguageRegistry::new()).recursive(self.config.recursive);
        let files = walker.walk(root)?;
        tracing::debug!("Found {} modules in {}", files.len(), root.display());

        let mut unreadable = Vec::new();
        let mut modules = Vec::with_capacity(files.len());
        for file in &files {
            let module = file
                .strip_prefix(root)
                .unwrap_or(file)
                .display()
                .to_string();
            match std::fs::read_to_string(file) {
                Ok(source) => modules.push((module, source)),
                Err(e) => {
                    tracing::warn!("Error reading {}: {}", file.display(), e);
                    unreadable.push(SkippedModule {
                        module,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut extraction = self.extract_modules(modules);
        unreadable.append(&mut extraction.skipped);
        extraction.skipped = unreadable;
        Ok(extraction)
    }

    /// Extracts from `(module identifier, source text)` pairs. Every source is
    /// parsed as Python whatever its identifier looks like.
    pub fn extract_modules<I, M, S>(&self, modules: I) -> Extraction
    where
        I: IntoIterator<Item = (M, S)>,
        M: AsRef<str>,
        S: AsRef<str>,
    {
        let mut skipped = Vec::new();
        let parsed: Vec<ParsedModule> = modules
            .into_iter()
            .filter_map(|(module, source)| {
                let module = module.as_ref();
                match self.parser.parse_module(module, source.as_ref()) {
                    Ok(parsed) => Some(parsed),
                    Err(e) => {
                        tracing::error!("Error parsing {}: {}", module, e);
                        skipped.push(SkippedModule {
                            module: module.to_string(),
                            reason: e.to_string(),
                        });
                        None
                    }
                }
            })
            .collect();

        let markers = &self.config.markers;
        let mut registry = MetadataRegistry::new();

        for module in &parsed {
            for id in module.tree.walk() {
                if let Some(definition) = markers.extract_output_definition(&module.tree, id) {
                    registry.register_output_definition(definition);
                }
            }
        }

        for module in &parsed {
            let mut units = Vec::new();
            let mut functions = Vec::new();
            for id in module.tree.walk() {
                if let Some(unit) = markers.extract_unit_of_work(&module.tree, id, &registry) {
                    units.push(unit);
                } else if let Some(function) = markers.extract_function(&module.tree, id) {
                    functions.push(function);
                }
            }
            tracing::debug!(
                "{}: {} units of work, {} functions",
                module.module,
                units.len(),
                functions.len()
            );
            units
                .into_iter()
                .for_each(|unit| registry.register_unit_of_work(unit));
            functions
                .into_iter()
                .for_each(|function| registry.register_function(function));
        }

        registry.finalize();
        Extraction { registry, skipped }
    }
}

impl Default for DocExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::OutputReference;

    const OUTPUTS: &str = r#"
@invocation_output("integer_output")
class IntegerOutput(BaseInvocationOutput):
    value: int = OutputField(description="The output integer")
"#;

    const NODES: &str = r#"
@invocation("add", title="Add Integers", category="math")
class AddInvocation(BaseInvocation):
    """Adds two numbers"""
    a: int = InputField(default=0, description="The first number")
    b: int = InputField(default=0, description="The second number")

    def invoke(self, context) -> IntegerOutput:
        return IntegerOutput(value=self.a + self.b)


def clamp(value):
    """Clamps a value."""
    return value
"#;

    #[test]
    fn test_cross_module_forward_reference_resolves() {
        let extraction =
            DocExtractor::default().extract_modules([("a_nodes.py", NODES), ("b_outputs.py", OUTPUTS)]);
        let registry = &extraction.registry;

        assert!(extraction.skipped.is_empty());
        assert_eq!(registry.units().len(), 1);
        let unit = &registry.units()[0];
        assert_eq!(unit.output, OutputReference::Resolved("IntegerOutput".into()));
        assert_eq!(registry.output_fields(&unit.output)[0].name, "value");
        assert_eq!(registry.functions().len(), 1);
        assert_eq!(registry.functions()[0].name, "clamp");
    }

    #[test]
    fn test_same_module_output_declared_after_unit() {
        let source = format!("{}\n{}", NODES, OUTPUTS);
        let extraction = DocExtractor::default().extract_modules([("nodes.py", source)]);
        let unit = &extraction.registry.units()[0];
        assert_eq!(unit.output, OutputReference::Resolved("IntegerOutput".into()));
    }

    #[test]
    fn test_broken_module_is_skipped() {
        let extraction = DocExtractor::default().extract_modules([
            ("a.py", OUTPUTS),
            ("b.py", "class Broken(:\n    pass\n"),
            ("c.py", NODES),
        ]);
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].module, "b.py");
        assert_eq!(extraction.registry.units().len(), 1);
        assert_eq!(extraction.registry.output_definitions().len(), 1);
    }

    #[test]
    fn test_nested_classes_are_visited() {
        let source = r#"
class Namespace:
    @invocation("inner", title="Inner")
    class InnerInvocation:
        def invoke(self, context):
            return self.make()

    def method(self):
        pass
"#;
        let extraction = DocExtractor::default().extract_modules([("ns.py", source)]);
        let registry = &extraction.registry;
        assert_eq!(registry.units().len(), 1);
        assert_eq!(registry.units()[0].name, "inner");
        assert!(registry.functions().is_empty());
    }

    #[test]
    fn test_extract_directory_reads_files() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("outputs.py"), OUTPUTS).unwrap();
        std::fs::write(dir.path().join("nodes.py"), NODES).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let extraction = DocExtractor::default()
            .extract_directory(dir.path())
            .unwrap();
        assert_eq!(extraction.registry.units().len(), 1);
        assert_eq!(extraction.registry.output_definitions().len(), 1);
    }

    #[test]
    fn test_module_identifiers_without_extension() {
        let extraction = DocExtractor::default()
            .extract_modules([("image_nodes.math", NODES), ("image_nodes.outputs", OUTPUTS)]);
        assert!(extraction.skipped.is_empty());
        let registry = &extraction.registry;
        assert_eq!(registry.units().len(), 1);
        assert_eq!(
            registry.units()[0].output,
            OutputReference::Resolved("IntegerOutput".into())
        );

        let extraction = DocExtractor::default().extract_modules([("math_nodes", NODES)]);
        assert_eq!(extraction.registry.units().len(), 1);
    }

    #[test]
    fn test_python2_module_is_skipped() {
        let legacy = "print \"hello\"\n@invocation(\"p2\", title=\"P2\")\nclass P2:\n    pass\n";
        let extraction = DocExtractor::default()
            .extract_modules([("a.py", OUTPUTS), ("legacy.py", legacy), ("c.py", NODES)]);
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].module, "legacy.py");
        assert_eq!(extraction.registry.units().len(), 1);
        assert_eq!(extraction.registry.units()[0].name, "add");
    }

    #[test]
    fn test_extract_directory_missing_root() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(DocExtractor::default()
            .extract_directory(&dir.path().join("missing"))
            .is_err());
    }
}
