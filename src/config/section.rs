//! Typed, borrowed access into a configuration tree.
//!
//! Lookups return an [`Entry`]: a nested [`Section`] for mappings, a
//! [`Sequence`] for lists and the raw value for scalars. Missing keys are
//! reported with their full dotted path.

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use super::ConfigError;

/// Human-readable name of a value's type, for error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// A value found in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<'a> {
    Section(Section<'a>),
    Sequence(Sequence<'a>),
    Scalar { value: &'a Value, path: String },
}

impl<'a> Entry<'a> {
    fn new(value: &'a Value, path: String) -> Self {
        match value {
            Value::Mapping(map) => Entry::Section(Section::new(map, path)),
            Value::Sequence(items) => Entry::Sequence(Sequence { items, path }),
            _ => Entry::Scalar { value, path },
        }
    }

    /// Dotted path of this entry from the tree root.
    pub fn path(&self) -> &str {
        match self {
            Entry::Section(section) => &section.path,
            Entry::Sequence(seq) => &seq.path,
            Entry::Scalar { path, .. } => path,
        }
    }

    /// An owned copy of the underlying value, whatever its type.
    pub fn to_value(&self) -> Value {
        match self {
            Entry::Section(section) => Value::Mapping(section.map.clone()),
            Entry::Sequence(seq) => Value::Sequence(seq.items.to_vec()),
            Entry::Scalar { value, .. } => (*value).clone(),
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.scalar().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.scalar().and_then(Value::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.scalar().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.scalar().and_then(Value::as_bool)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Entry::Scalar { value: Value::Null, .. })
    }

    pub fn scalar(&self) -> Option<&'a Value> {
        match self {
            Entry::Scalar { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Returns the nested section, or `TypeMismatch` for any other value.
    pub fn section(self) -> Result<Section<'a>, ConfigError> {
        match self {
            Entry::Section(section) => Ok(section),
            other => Err(other.mismatch("mapping")),
        }
    }

    /// Returns the sequence, or `TypeMismatch` for any other value.
    pub fn sequence(self) -> Result<Sequence<'a>, ConfigError> {
        match self {
            Entry::Sequence(seq) => Ok(seq),
            other => Err(other.mismatch("sequence")),
        }
    }

    /// Deserializes this value into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Ok(serde_yaml::from_value(self.to_value())?)
    }

    fn mismatch(&self, expected: &'static str) -> ConfigError {
        let found = match self {
            Entry::Section(_) => "mapping",
            Entry::Sequence(_) => "sequence",
            Entry::Scalar { value, .. } => kind_of(value),
        };
        ConfigError::TypeMismatch {
            path: self.path().to_string(),
            expected,
            found,
        }
    }
}

/// Borrowed view of a mapping: the tree root or a nested table.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    map: &'a Mapping,
    path: String,
}

impl<'a> Section<'a> {
    pub(crate) fn new(map: &'a Mapping, path: String) -> Self {
        Self { map, path }
    }

    pub(crate) fn root(map: &'a Mapping) -> Self {
        Self::new(map, String::new())
    }

    /// Dotted path of this section; empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Looks up a single key. Keys are literal: `"a.b"` is one key.
    pub fn get(&self, key: &str) -> Result<Entry<'a>, ConfigError> {
        let path = join(&self.path, key);
        match self.map.get(key) {
            Some(value) => Ok(Entry::new(value, path)),
            None => Err(ConfigError::KeyNotFound(path)),
        }
    }

    /// Walks nested mappings one segment at a time.
    ///
    /// An empty path yields this section itself.
    pub fn get_path(&self, segments: &[&str]) -> Result<Entry<'a>, ConfigError> {
        let Some((first, rest)) = segments.split_first() else {
            return Ok(Entry::Section(self.clone()));
        };

        let mut current = self.get(first)?;
        for segment in rest {
            current = match current {
                Entry::Section(section) => section.get(segment)?,
                other => {
                    return Err(ConfigError::KeyNotFound(join(other.path(), segment)));
                }
            };
        }
        Ok(current)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// String keys in insertion order; non-string keys are skipped and are
    /// only reachable through [`as_mapping`](Self::as_mapping).
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.map.keys().filter_map(Value::as_str)
    }

    /// Entries in insertion order, keyed by their string key. Entries with
    /// non-string keys are skipped.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Entry<'a>)> + '_ {
        self.map.iter().filter_map(move |(key, value)| {
            let key = key.as_str()?;
            Some((key, Entry::new(value, join(&self.path, key))))
        })
    }

    /// Number of entries, counting non-string keys too.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn as_mapping(&self) -> &'a Mapping {
        self.map
    }

    /// Deserializes this section into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Ok(serde_yaml::from_value(Value::Mapping(self.map.clone()))?)
    }
}

/// Borrowed view of a sequence value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence<'a> {
    items: &'a [Value],
    path: String,
}

impl<'a> Sequence<'a> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`; nested mappings come back as sections.
    pub fn get(&self, index: usize) -> Result<Entry<'a>, ConfigError> {
        match self.items.get(index) {
            Some(value) => Ok(Entry::new(value, format!("{}[{index}]", self.path))),
            None => Err(ConfigError::IndexOutOfBounds {
                path: self.path.clone(),
                index,
                len: self.items.len(),
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Entry<'a>> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(move |(index, value)| Entry::new(value, format!("{}[{index}]", self.path)))
    }

    pub fn as_slice(&self) -> &'a [Value] {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Mapping {
        serde_yaml::from_str(
            r#"
            app:
              name: MyApp
              listen:
                sock1:
                  addr: 192.168.0.1
                  port: 8080
                sock2:
                  addr: 127.0.0.1
                  port: "89"
              languages:
                - english
                - {language: persian, country: iran}
            server.token.salt: 1345
            debug: true
            ratio: 0.25
            nothing:
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_nested_lookup() {
        let value = doc();
        let root = Section::root(&value);
        let app = root.get("app").unwrap().section().unwrap();

        assert_eq!(app.get("name").unwrap().as_str(), Some("MyApp"));
        let listen = app.get("listen").unwrap().section().unwrap();
        assert_eq!(listen.len(), 2);
        assert_eq!(
            root.get_path(&["app", "listen", "sock1", "port"]).unwrap().as_i64(),
            Some(8080)
        );
        assert_eq!(
            root.get_path(&["app", "listen", "sock2", "port"]).unwrap().as_str(),
            Some("89")
        );
    }

    #[test]
    fn test_scalar_types() {
        let value = doc();
        let root = Section::root(&value);
        assert_eq!(root.get("debug").unwrap().as_bool(), Some(true));
        assert_eq!(root.get("ratio").unwrap().as_f64(), Some(0.25));
        assert!(root.get("nothing").unwrap().is_null());
    }

    #[test]
    fn test_sequence_items() {
        let value = doc();
        let root = Section::root(&value);
        let languages = root
            .get_path(&["app", "languages"])
            .unwrap()
            .sequence()
            .unwrap();

        assert_eq!(languages.len(), 2);
        assert_eq!(languages.get(0).unwrap().as_str(), Some("english"));
        let persian = languages.get(1).unwrap().section().unwrap();
        assert_eq!(persian.get("country").unwrap().as_str(), Some("iran"));
        assert_eq!(persian.path(), "app.languages[1]");

        let err = languages.get(5).unwrap_err();
        assert!(matches!(err, ConfigError::IndexOutOfBounds { index: 5, len: 2, .. }));
    }

    #[test]
    fn test_dotted_key_is_literal() {
        let value = doc();
        let root = Section::root(&value);
        assert_eq!(root.get("server.token.salt").unwrap().as_i64(), Some(1345));
        assert!(!root.contains_key("server"));
    }

    #[test]
    fn test_missing_key_reports_full_path() {
        let value = doc();
        let root = Section::root(&value);

        let err = root.get_path(&["app", "listen", "sock3"]).unwrap_err();
        assert!(matches!(err, ConfigError::KeyNotFound(path) if path == "app.listen.sock3"));

        let err = root.get_path(&["app", "name", "first"]).unwrap_err();
        assert!(matches!(err, ConfigError::KeyNotFound(path) if path == "app.name.first"));
    }

    #[test]
    fn test_type_mismatch() {
        let value = doc();
        let root = Section::root(&value);
        let err = root.get_path(&["app", "name"]).unwrap().section().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TypeMismatch { expected: "mapping", found: "string", path } if path == "app.name"
        ));
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let value = doc();
        let root = Section::root(&value);
        let keys: Vec<_> = root.keys().collect();
        assert_eq!(keys, ["app", "server.token.salt", "debug", "ratio", "nothing"]);
    }

    #[test]
    fn test_non_string_keys_are_counted_but_not_listed() {
        let map: Mapping = serde_yaml::from_str("1: one\ntwo: 2").unwrap();
        let root = Section::root(&map);

        assert_eq!(root.len(), 2);
        assert_eq!(root.keys().collect::<Vec<_>>(), ["two"]);
        assert_eq!(root.iter().count(), 1);
        assert!(matches!(root.get("1"), Err(ConfigError::KeyNotFound(_))));
        let numeric = root.as_mapping().get(&Value::Number(1_i64.into()));
        assert_eq!(numeric.and_then(Value::as_str), Some("one"));
    }

    #[test]
    fn test_deserialize_section() {
        #[derive(serde::Deserialize)]
        struct Socket {
            addr: String,
            port: u16,
        }

        let value = doc();
        let root = Section::root(&value);
        let sock: Socket = root
            .get_path(&["app", "listen", "sock1"])
            .unwrap()
            .deserialize()
            .unwrap();
        assert_eq!(sock.addr, "192.168.0.1");
        assert_eq!(sock.port, 8080);
    }
}
