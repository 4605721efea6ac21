use std::path::Path;

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::builder::ConfigBuilder;
use super::file::{into_mapping, load_config_file, parse_document, Format};
use super::interpolate::{interpolate_value, Context};
use super::section::{Entry, Section};
use super::ConfigError;

const STRING_ORIGIN: &str = "<string>";
const VALUE_ORIGIN: &str = "<value>";

/// Merged configuration state.
///
/// Documents are merged in the order they arrive. Nested mappings are merged
/// key by key; any other value (including sequences) replaces what was there
/// before. Text documents are interpolated with the tree's [`Context`] before
/// they are parsed, so a placeholder can produce a number or a boolean.
///
/// ## Example
///
/// ```
/// use mergeconf::{ConfigTree, Context};
///
/// let ctx = Context::new().with("here", "path/to/here");
/// let mut config = ConfigTree::parse("root: %(here)s\nserver:\n  port: 80\n", ctx)?;
/// config.merge_str("server:\n  port: 8080\n")?;
///
/// assert_eq!(config.get("root")?.as_str(), Some("path/to/here"));
/// assert_eq!(config.get_path(&["server", "port"])?.as_i64(), Some(8080));
/// # Ok::<(), mergeconf::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigTree {
    root: Mapping,
    context: Context,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::with_context(Context::new())
    }
}

impl PartialEq for ConfigTree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl ConfigTree {
    /// Creates an empty tree with an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty tree that interpolates documents against `context`.
    pub fn with_context(context: Context) -> Self {
        Self {
            root: Mapping::new(),
            context,
        }
    }

    /// Creates a tree from a single YAML document.
    pub fn parse(text: &str, context: Context) -> Result<Self, ConfigError> {
        let mut tree = Self::with_context(context);
        tree.merge_str(text)?;
        Ok(tree)
    }

    /// Starts a [`ConfigBuilder`] for layering several sources.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Replaces the context used for documents merged from now on.
    pub fn set_context(&mut self, context: Context) {
        self.context = context;
    }

    /// Interpolates, parses and merges a YAML document.
    ///
    /// An empty document is a no-op; a document whose root is not a mapping
    /// fails with [`ConfigError::NotAMapping`].
    pub fn merge_str(&mut self, text: &str) -> Result<(), ConfigError> {
        if let Some(map) = parse_document(text, &self.context, Format::Yaml, STRING_ORIGIN)? {
            self.merge_mapping(map, STRING_ORIGIN);
        }
        Ok(())
    }

    /// Merges an already parsed document. No interpolation is applied.
    pub fn merge_value(&mut self, value: Value) -> Result<(), ConfigError> {
        if let Some(map) = into_mapping(value, VALUE_ORIGIN)? {
            self.merge_mapping(map, VALUE_ORIGIN);
        }
        Ok(())
    }

    /// Merges the data of another tree; its context is ignored.
    pub fn merge(&mut self, other: &ConfigTree) {
        self.merge_mapping(other.root.clone(), "<tree>");
    }

    /// Loads a file and merges it. A missing file is an error.
    ///
    /// `.toml` files are parsed as TOML, anything else as YAML.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.load(path.as_ref(), true).map(|_| ())
    }

    /// Like [`load_file`](Self::load_file), but a missing file is skipped.
    ///
    /// Returns whether the file existed.
    pub fn load_file_optional(&mut self, path: impl AsRef<Path>) -> Result<bool, ConfigError> {
        self.load(path.as_ref(), false)
    }

    pub(crate) fn load(&mut self, path: &Path, required: bool) -> Result<bool, ConfigError> {
        if !required && !path.exists() {
            return Ok(false);
        }
        if let Some(map) = load_config_file(path, required, &self.context)? {
            self.merge_mapping(map, &path.display().to_string());
        }
        Ok(true)
    }

    /// Substitutes `%(name)s` placeholders in every string value of the tree.
    ///
    /// Meant for data merged with [`merge_value`](Self::merge_value) or from
    /// the environment. Text documents were already interpolated before
    /// parsing, which consumed their `%%` escapes; a literal that has to
    /// survive both passes is written `%%%%` in the text. On error the tree
    /// is left unchanged.
    pub fn interpolate(&mut self, context: &Context) -> Result<(), ConfigError> {
        let mut root = self.root.clone();
        for (_key, value) in root.iter_mut() {
            interpolate_value(value, context)?;
        }
        self.root = root;
        Ok(())
    }

    pub(crate) fn merge_mapping(&mut self, overlay: Mapping, origin: &str) {
        debug!(origin, keys = overlay.len(), "merging configuration document");
        deep_merge(&mut self.root, overlay);
    }

    pub(crate) fn root_mut(&mut self) -> &mut Mapping {
        &mut self.root
    }

    /// Root section of the tree.
    pub fn section(&self) -> Section<'_> {
        Section::root(&self.root)
    }

    /// Looks up a top-level key. Keys are literal: `"a.b"` is one key.
    pub fn get(&self, key: &str) -> Result<Entry<'_>, ConfigError> {
        self.section().get(key)
    }

    /// Looks up a value through nested mappings.
    pub fn get_path(&self, segments: &[&str]) -> Result<Entry<'_>, ConfigError> {
        self.section().get_path(segments)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.root.contains_key(key)
    }

    /// Top-level string keys in insertion order.
    ///
    /// Non-string keys (`1: a`) are skipped here and cannot be looked up with
    /// [`get`](Self::get); they remain visible through
    /// [`as_mapping`](Self::as_mapping).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().filter_map(Value::as_str)
    }

    /// Number of top-level entries, counting non-string keys too.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    pub fn into_mapping(self) -> Mapping {
        self.root
    }

    /// Deserializes the whole tree into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Ok(serde_yaml::from_value(Value::Mapping(self.root.clone()))?)
    }
}

fn deep_merge(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Mapping(base_map)), Value::Mapping(overlay_map)) => {
                deep_merge(base_map, overlay_map);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
