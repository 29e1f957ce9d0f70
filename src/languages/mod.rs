pub mod python;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub trait LanguageGrammar: Send + Sync {
    fn name(&self) -> &'static str;
    fn file_extensions(&self) -> &[&'static str];
    fn language(&self) -> tree_sitter::Language;
}

pub struct LanguageRegistry {
    languages: HashMap<String, Arc<dyn LanguageGrammar>>,
    extension_map: HashMap<String, String>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            languages: HashMap::new(),
            extension_map: HashMap::new(),
        };

        registry.register(Arc::new(python::PythonGrammar));

        registry
    }

    pub fn register(&mut self, grammar: Arc<dyn LanguageGrammar>) {
        let name = grammar.name().to_string();
        for ext in grammar.file_extensions() {
            self.extension_map.insert(ext.to_string(), name.clone());
        }
        self.languages.insert(name, grammar);
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn LanguageGrammar>> {
        self.languages.get(name).cloned()
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn LanguageGrammar>> {
        self.extension_map
            .get(ext)
            .and_then(|name| self.languages.get(name))
            .cloned()
    }

    pub fn get_for_file(&self, path: &Path) -> Option<Arc<dyn LanguageGrammar>> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.get_by_extension(ext))
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
