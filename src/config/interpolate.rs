//! `%(name)s` placeholder substitution against a caller-supplied context.
//!
//! Use `%%` to produce a literal `%`. A `%` that starts neither an escape nor
//! a placeholder is copied through unchanged, so plain percentages in
//! documents need no escaping.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde_yaml::Value;
use tracing::trace;

use super::ConfigError;

/// Named values available to `%(name)s` placeholders.
///
/// ```
/// use mergeconf::Context;
///
/// let ctx = Context::new().with("here", "path/to/here").with("workers", 4);
/// assert_eq!(ctx.get("workers"), Some("4"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, rendered through its `Display` impl.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.values.insert(name.into(), value.to_string());
    }

    /// Chaining form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Extends this context with `other`; values in `other` win.
    pub fn extend(&mut self, other: &Context) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Context::new();
        for (name, value) in iter {
            ctx.insert(name, value);
        }
        ctx
    }
}

/// Substitutes every placeholder in `text`.
///
/// Supported conversions are `s`, `d` and `i` (the value verbatim) and `r`
/// (the value in single quotes).
pub fn interpolate_str(text: &str, ctx: &Context) -> Result<String, ConfigError> {
    if !text.contains('%') {
        return Ok(text.to_string());
    }

    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            result.push(ch);
            continue;
        }

        match chars.peek() {
            Some('%') => {
                chars.next();
                result.push('%');
            }
            Some('(') => {
                chars.next();
                let name = consume_until(&mut chars, ')')
                    .ok_or_else(|| ConfigError::UnclosedPlaceholder(text.to_string()))?;
                let value = ctx
                    .get(&name)
                    .ok_or_else(|| ConfigError::MissingContextKey(name.clone()))?;

                match chars.next() {
                    Some('s' | 'd' | 'i') => result.push_str(value),
                    Some('r') => {
                        result.push('\'');
                        result.push_str(value);
                        result.push('\'');
                    }
                    other => {
                        return Err(ConfigError::UnsupportedConversion {
                            name,
                            conversion: other.map(String::from).unwrap_or_default(),
                        })
                    }
                }
                trace!(placeholder = %name, "interpolated placeholder");
            }
            _ => result.push('%'),
        }
    }

    Ok(result)
}

/// Substitutes placeholders in every string leaf of `value`.
pub fn interpolate_value(value: &mut Value, ctx: &Context) -> Result<(), ConfigError> {
    match value {
        Value::String(s) => {
            *s = interpolate_str(s, ctx)?;
        }
        Value::Sequence(items) => {
            for item in items.iter_mut() {
                interpolate_value(item, ctx)?;
            }
        }
        Value::Mapping(map) => {
            for (_key, item) in map.iter_mut() {
                interpolate_value(item, ctx)?;
            }
        }
        Value::Tagged(tagged) => interpolate_value(&mut tagged.value, ctx)?,
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}

fn consume_until(chars: &mut std::iter::Peekable<std::str::Chars>, delim: char) -> Option<String> {
    let mut result = String::new();
    for ch in chars.by_ref() {
        if ch == delim {
            return Some(result);
        }
        result.push(ch);
    }
    None
}
