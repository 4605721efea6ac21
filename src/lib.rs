//! Layered configuration trees built from YAML or TOML documents.
//!
//! A [`ConfigTree`] merges documents in order, interpolating `%(name)s`
//! placeholders against a [`Context`] before each document is parsed. A
//! [`DeferredHandle`] lets code hold on to the configuration before it has
//! been loaded.

pub mod config;
pub mod deferred;
mod error;

pub use config::{ConfigBuilder, ConfigError, ConfigTree, Context, Entry, Section, Sequence};
pub use deferred::DeferredHandle;
pub use error::Error;
pub use serde_yaml::{Mapping, Value};
