//! Configuration trees: loading, merging, interpolation and lookup.

mod builder;
mod env;
mod error;
mod file;
mod interpolate;
mod section;
mod tree;

pub use builder::ConfigBuilder;
pub use error::ConfigError;
pub use file::Format;
pub use interpolate::{interpolate_str, Context};
pub use section::{Entry, Section, Sequence};
pub use tree::ConfigTree;
