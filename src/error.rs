use crate::config::ConfigError;
use thiserror::Error;

/// Top-level error type for the mergeconf library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("configuration is not initialized yet")]
    Uninitialized,

    #[error("configuration is already initialized")]
    AlreadyInitialized,
}
