pub mod document;
pub mod error;
pub mod languages;
pub mod metadata;
pub mod registry;
pub mod render;
pub mod scanner;
pub mod syntax;

pub use document::{Document, OutputFormat};
pub use error::{DocsError, Result};
pub use languages::{LanguageGrammar, LanguageRegistry};
pub use metadata::{load_metadata, DocMetadata};
pub use registry::{
    Field, MetadataRegistry, OutputDefinition, OutputReference, StandaloneFunction, UnitOfWork,
};
pub use scanner::{
    DocExtractor, Extraction, ExtractorConfig, FileWalker, MarkerKind, MarkerSet, ParsedModule,
    Parser, SkippedModule,
};
