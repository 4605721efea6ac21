use serde_yaml::{Mapping, Value};
use tracing::debug;

/// Merges every `PREFIX<sep>A<sep>B=value` variable into `table` at path `a.b`.
///
/// Variables whose name is not valid UTF-8 are ignored; non-UTF-8 values are
/// converted lossily. Returns the number of variables applied.
pub fn load_env_vars(table: &mut Mapping, prefix: &str, separator: &str) -> usize {
    let vars = std::env::vars_os().filter_map(|(key, value)| {
        let key = key.into_string().ok()?;
        let value = value.to_string_lossy().into_owned();
        Some((key, value))
    });
    apply_vars(table, prefix, separator, vars)
}

fn apply_vars(
    table: &mut Mapping,
    prefix: &str,
    separator: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> usize {
    if separator.is_empty() {
        return 0;
    }

    let prefix_with_sep = format!("{prefix}{separator}");
    let mut applied = 0;

    for (key, value) in vars {
        let Some(path_str) = key.strip_prefix(&prefix_with_sep) else {
            continue;
        };
        if path_str.is_empty() {
            continue;
        }

        let path: Vec<String> = path_str
            .split(separator)
            .map(|s| s.to_lowercase())
            .collect();

        debug!(variable = %key, "applying environment override");
        merge_at_path(table, &path, coerce_value(&value));
        applied += 1;
    }

    applied
}

fn merge_at_path(table: &mut Mapping, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    let key = Value::String(first.clone());

    if rest.is_empty() {
        table.insert(key, value);
        return;
    }

    if !matches!(table.get(&key), Some(Value::Mapping(_))) {
        table.insert(key.clone(), Value::Mapping(Mapping::new()));
    }

    if let Some(Value::Mapping(nested)) = table.get_mut(&key) {
        merge_at_path(nested, rest, value);
    }
}

fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Number(i.into());
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return Value::Number(f.into());
        }
    }

    Value::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
