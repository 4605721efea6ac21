use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::env::load_env_vars;
use super::interpolate::Context;
use super::tree::ConfigTree;
use super::ConfigError;

/// A configuration source in the loading pipeline.
#[derive(Debug)]
enum ConfigSource {
    Text(String),
    File { path: PathBuf, required: bool },
    Env { prefix: String, separator: String },
}

/// Builder for layering several configuration sources into a [`ConfigTree`].
///
/// Sources are merged in registration order, with later sources overriding
/// earlier ones. Text and file sources are interpolated with the builder's
/// [`Context`] before they are parsed.
///
/// ## Example
///
/// ```no_run
/// use mergeconf::{ConfigTree, Context};
///
/// let config = ConfigTree::builder()
///     .context(Context::new().with("here", "/srv/app"))
///     .with_str("data_dir: %(here)s/data")
///     .with_file("config/default.yaml", true)
///     .with_env("MYAPP", "__")
///     .with_file("config/local.yaml", false)
///     .build()?;
///
/// println!("{:?}", config.get("data_dir")?.as_str());
/// # Ok::<(), mergeconf::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct ConfigBuilder {
    context: Context,
    sources: Vec<ConfigSource>,
}

impl ConfigBuilder {
    /// Sets the interpolation context for text and file sources.
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Adds an in-memory YAML document.
    pub fn with_str(mut self, text: impl Into<String>) -> Self {
        self.sources.push(ConfigSource::Text(text.into()));
        self
    }

    /// Adds a YAML or TOML file to be loaded.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are skipped.
    pub fn with_file(mut self, path: impl AsRef<Path>, required: bool) -> Self {
        self.sources.push(ConfigSource::File {
            path: path.as_ref().to_path_buf(),
            required,
        });
        self
    }

    /// Overlays environment variables with the given prefix.
    ///
    /// `MYAPP__DATABASE__PORT=5432` with prefix `MYAPP` and separator `__`
    /// sets `database.port` to the integer 5432. Path segments are lowercased
    /// and values are coerced to boolean, integer, float or string.
    pub fn with_env(mut self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.sources.push(ConfigSource::Env {
            prefix: prefix.into(),
            separator: separator.into(),
        });
        self
    }

    /// Loads and merges every source in order.
    pub fn build(self) -> Result<ConfigTree, ConfigError> {
        let mut tree = ConfigTree::with_context(self.context);

        for source in self.sources {
            match source {
                ConfigSource::Text(text) => tree.merge_str(&text)?,
                ConfigSource::File { path, required } => {
                    if !tree.load(&path, required)? {
                        warn!(path = %path.display(), "optional config file not found, skipping");
                    }
                }
                ConfigSource::Env { prefix, separator } => {
                    let applied = load_env_vars(tree.root_mut(), &prefix, &separator);
                    debug!(prefix = %prefix, applied, "merged environment overrides");
                }
            }
        }

        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    #[test]
    fn test_sources_apply_in_order() {
        let mut defaults = NamedTempFile::new().unwrap();
        writeln!(defaults, "name: app\nserver:\n  host: %(host)s\n  port: 80").unwrap();
        let mut local = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(local, "[server]\nport = 8080").unwrap();

        let tree = ConfigTree::builder()
            .context(Context::new().with("host", "localhost"))
            .with_str("name: base\nextra: true")
            .with_file(defaults.path(), true)
            .with_file(local.path(), true)
            .build()
            .unwrap();

        assert_eq!(tree.get("name").unwrap().as_str(), Some("app"));
        assert_eq!(tree.get("extra").unwrap().as_bool(), Some(true));
        assert_eq!(
            tree.get_path(&["server", "host"]).unwrap().as_str(),
            Some("localhost")
        );
        assert_eq!(tree.get_path(&["server", "port"]).unwrap().as_i64(), Some(8080));
    }

    #[test]
    fn test_optional_file_missing_is_skipped() {
        let tree = ConfigTree::builder()
            .with_str("a: 1")
            .with_file("/nonexistent/local.yaml", false)
            .build()
            .unwrap();
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_required_file_missing_fails() {
        let result = ConfigTree::builder()
            .with_file("/nonexistent/default.yaml", true)
            .build();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_env_overlay() {
        // Unique prefix so parallel tests never see each other's variables.
        std::env::set_var("MERGECONF_BUILDER_TEST__SERVER__PORT", "9090");

        let tree = ConfigTree::builder()
            .with_str("server:\n  port: 80\n  host: localhost")
            .with_env("MERGECONF_BUILDER_TEST", "__")
            .build()
            .unwrap();

        std::env::remove_var("MERGECONF_BUILDER_TEST__SERVER__PORT");

        assert_eq!(tree.get_path(&["server", "port"]).unwrap().as_i64(), Some(9090));
        assert_eq!(
            tree.get_path(&["server", "host"]).unwrap().as_str(),
            Some("localhost")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_env_overlay_tolerates_non_utf8_environment() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        std::env::set_var("MERGECONF_UNRELATED_BYTES", OsStr::from_bytes(b"\xff\xfe"));
        std::env::set_var(
            "MERGECONF_BYTES_TEST__NAME",
            OsStr::from_bytes(b"caf\xe9"),
        );

        let result = ConfigTree::builder()
            .with_str("a: 1")
            .with_env("MERGECONF_BYTES_TEST", "__")
            .build();

        std::env::remove_var("MERGECONF_UNRELATED_BYTES");
        std::env::remove_var("MERGECONF_BYTES_TEST__NAME");

        let tree = result.unwrap();
        assert_eq!(tree.get("a").unwrap().as_i64(), Some(1));
        assert_eq!(tree.get("name").unwrap().as_str(), Some("caf\u{fffd}"));
    }
}
