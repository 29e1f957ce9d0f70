use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::Result;
use crate::languages::LanguageRegistry;

pub struct FileWalker {
    registry: LanguageRegistry,
    recursive: bool,
}

impl FileWalker {
    pub fn new(registry: LanguageRegistry) -> Self {
        Self {
            registry,
            recursive: false,
        }
    }

    /// Descend into subdirectories instead of scanning only the top level
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Lists supported source files under `root`, sorted by path
    pub fn walk(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a directory: {}", root.display()),
            )
            .into());
        }

        let mut files = Vec::new();

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .max_depth(if self.recursive { None } else { Some(1) })
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if path.is_file() && self.is_supported(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.registry.get_for_file(path).is_some()
    }
}
