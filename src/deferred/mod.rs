//! Deferred access to a configuration tree that is loaded later.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::config::{ConfigTree, Context, Entry};
use crate::Error;

/// A handle to configuration that may not be loaded yet.
///
/// Code can own or borrow the handle before the configuration exists; every
/// access before [`initialize`](Self::initialize) fails with
/// [`Error::Uninitialized`]. Once bound, lookups forward to the owned
/// [`ConfigTree`].
///
/// ## Example
///
/// ```
/// use mergeconf::{Context, DeferredHandle, Error};
///
/// let mut settings = DeferredHandle::new();
/// assert!(matches!(settings.get("root"), Err(Error::Uninitialized)));
///
/// let ctx = Context::new().with("here", "path/to/here");
/// settings.initialize("root: %(here)s", ctx)?;
/// assert_eq!(settings.get("root")?.as_str(), Some("path/to/here"));
/// # Ok::<(), mergeconf::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct DeferredHandle {
    tree: Option<ConfigTree>,
}

impl DeferredHandle {
    /// Creates an unbound handle.
    pub const fn new() -> Self {
        Self { tree: None }
    }

    pub fn is_initialized(&self) -> bool {
        self.tree.is_some()
    }

    /// Parses `text` with `context` and binds the result.
    ///
    /// Fails with [`Error::AlreadyInitialized`] if the handle is already bound;
    /// use [`reinitialize`](Self::reinitialize) to replace the configuration.
    pub fn initialize(&mut self, text: &str, context: Context) -> Result<&mut ConfigTree, Error> {
        if self.is_initialized() {
            return Err(Error::AlreadyInitialized);
        }
        let tree = ConfigTree::parse(text, context)?;
        Ok(self.bind(tree))
    }

    /// Binds a tree built elsewhere, e.g. by [`ConfigTree::builder`].
    pub fn initialize_with(&mut self, tree: ConfigTree) -> Result<&mut ConfigTree, Error> {
        if self.is_initialized() {
            return Err(Error::AlreadyInitialized);
        }
        Ok(self.bind(tree))
    }

    /// Parses `text` with `context` and binds the result, replacing any
    /// previously bound configuration.
    ///
    /// On a parse failure the previous configuration stays bound.
    pub fn reinitialize(&mut self, text: &str, context: Context) -> Result<&mut ConfigTree, Error> {
        let tree = ConfigTree::parse(text, context)?;
        if self.is_initialized() {
            info!("replacing bound configuration");
        }
        Ok(self.bind(tree))
    }

    fn bind(&mut self, tree: ConfigTree) -> &mut ConfigTree {
        info!(keys = tree.len(), "configuration bound");
        self.tree.insert(tree)
    }

    /// The bound tree.
    pub fn tree(&self) -> Result<&ConfigTree, Error> {
        self.tree.as_ref().ok_or(Error::Uninitialized)
    }

    pub fn tree_mut(&mut self) -> Result<&mut ConfigTree, Error> {
        self.tree.as_mut().ok_or(Error::Uninitialized)
    }

    /// Unbinds and returns the tree, if any.
    pub fn into_inner(self) -> Option<ConfigTree> {
        self.tree
    }

    pub fn get(&self, key: &str) -> Result<Entry<'_>, Error> {
        Ok(self.tree()?.get(key)?)
    }

    pub fn get_path(&self, segments: &[&str]) -> Result<Entry<'_>, Error> {
        Ok(self.tree()?.get_path(segments)?)
    }

    pub fn contains_key(&self, key: &str) -> Result<bool, Error> {
        Ok(self.tree()?.contains_key(key))
    }

    pub fn merge_str(&mut self, text: &str) -> Result<(), Error> {
        Ok(self.tree_mut()?.merge_str(text)?)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        Ok(self.tree_mut()?.load_file(path)?)
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(self.tree()?.deserialize()?)
    }
}

impl From<ConfigTree> for DeferredHandle {
    fn from(tree: ConfigTree) -> Self {
        Self { tree: Some(tree) }
    }
}
