//! Document parsing and file-based loading.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use super::interpolate::{interpolate_str, Context};
use super::section::kind_of;
use super::ConfigError;

/// Syntax of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Yaml,
    Toml,
}

impl Format {
    /// Picks the format from the file extension; anything but `.toml` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Yaml,
        }
    }
}

/// Interpolates and parses a document.
///
/// Returns `Ok(None)` for an empty document. `origin` names the document in
/// error messages.
pub fn parse_document(
    text: &str,
    ctx: &Context,
    format: Format,
    origin: &str,
) -> Result<Option<Mapping>, ConfigError> {
    let text = interpolate_str(text, ctx)?;
    if is_blank(&text) {
        return Ok(None);
    }

    let value = match format {
        Format::Yaml => serde_yaml::from_str::<Value>(&text).map_err(|e| ConfigError::ParseError {
            origin: origin.to_string(),
            message: e.to_string(),
        })?,
        Format::Toml => {
            let table = toml::from_str::<toml::Table>(&text).map_err(|e| ConfigError::ParseError {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;
            toml_to_yaml(toml::Value::Table(table))
        }
    };

    into_mapping(value, origin)
}

/// Accepts a parsed document root: mappings pass, null means empty.
pub fn into_mapping(value: Value, origin: &str) -> Result<Option<Mapping>, ConfigError> {
    match value {
        Value::Mapping(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        other => Err(ConfigError::NotAMapping {
            origin: origin.to_string(),
            found: kind_of(&other),
        }),
    }
}

/// Loads, interpolates and parses a config file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false, or if
/// the file holds an empty document.
pub fn load_config_file(
    path: &Path,
    required: bool,
    ctx: &Context,
) -> Result<Option<Mapping>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_document(
            &contents,
            ctx,
            Format::from_path(path),
            &path.display().to_string(),
        ),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// True when the document holds nothing but whitespace and comments.
fn is_blank(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

fn toml_to_yaml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Value::Number(f.into()),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(toml_to_yaml).collect()),
        toml::Value::Table(table) => Value::Mapping(
            table
                .into_iter()
                .map(|(key, value)| (Value::String(key), toml_to_yaml(value)))
                .collect(),
        ),
    }
}
