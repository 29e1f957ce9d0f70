pub mod extractor;
pub mod markers;
pub mod parser;
pub mod walker;

pub use extractor::{DocExtractor, Extraction, ExtractorConfig, SkippedModule};
pub use markers::{MarkerKind, MarkerSet};
pub use parser::{ParsedModule, Parser};
pub use walker::FileWalker;
