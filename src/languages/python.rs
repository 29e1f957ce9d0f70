use super::LanguageGrammar;

pub const PYTHON: &str = "python";

pub struct PythonGrammar;

impl LanguageGrammar for PythonGrammar {
    fn name(&self) -> &'static str {
        PYTHON
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["py", "pyi"]
    }

    fn language(&self) -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }
}
