use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("required config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {message}")]
    ParseError { origin: String, message: String },

    #[error("cannot merge {origin}: document root is a {found}, not a mapping")]
    NotAMapping { origin: String, found: &'static str },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("index {index} out of bounds for '{path}' (length {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("expected {expected} at '{path}', found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("interpolation context has no value for '{0}'")]
    MissingContextKey(String),

    #[error("unclosed placeholder (missing ')') in: {0}")]
    UnclosedPlaceholder(String),

    #[error("unsupported conversion '%(...){conversion}' for '{name}'")]
    UnsupportedConversion { name: String, conversion: String },

    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}
