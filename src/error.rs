use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in {module} at line {line}, column {column}: {message}")]
    Parse {
        module: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocsError>;
