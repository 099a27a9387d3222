//! `${NAME}` / `${NAME:default}` expansion inside layer string values

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_yaml::Value;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}").expect("placeholder regex is valid")
});

/// Expand placeholders in every string scalar of `value`, in place.
///
/// A scalar that is exactly one placeholder becomes a number or boolean when
/// the expanded text is one, so `port: ${PORT:8001}` yields an integer; text
/// fields accept those back through `domains::utils::scalar_string`. A set
/// but empty variable counts as unset when a default is given. Mapping keys
/// are left alone. Returns the name of the first variable that has neither a
/// value nor a default.
pub fn expand_placeholders<F>(value: &mut Value, lookup: &F) -> Result<(), String>
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(s) => {
            if let Some(expanded) = expand_scalar(s, lookup)? {
                *value = expanded;
            }
        }
        Value::Sequence(items) => {
            for item in items {
                expand_placeholders(item, lookup)?;
            }
        }
        Value::Mapping(map) => {
            for (_, item) in map.iter_mut() {
                expand_placeholders(item, lookup)?;
            }
        }
        Value::Tagged(tagged) => expand_placeholders(&mut tagged.value, lookup)?,
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}

fn expand_scalar<F>(s: &str, lookup: &F) -> Result<Option<Value>, String>
where
    F: Fn(&str) -> Option<String>,
{
    if !PLACEHOLDER.is_match(s) {
        return Ok(None);
    }

    let mut missing = None;
    let expanded = PLACEHOLDER.replace_all(s, |caps: &Captures| {
        let name = &caps[1];
        // An empty variable falls back to the default when there is one
        let resolved = match (lookup(name), caps.get(2)) {
            (Some(v), _) if !v.is_empty() => Some(v),
            (_, Some(default)) => Some(default.as_str().to_string()),
            (set, None) => set,
        };
        match resolved {
            Some(v) => v,
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    if let Some(name) = missing {
        return Err(name);
    }

    let whole = PLACEHOLDER
        .find(s)
        .is_some_and(|m| m.start() == 0 && m.end() == s.len());
    if whole {
        if let Some(scalar) = typed_scalar(&expanded) {
            return Ok(Some(scalar));
        }
    }

    Ok(Some(Value::String(expanded.into_owned())))
}

/// A number or boolean whose canonical form is exactly `text`.
///
/// Anything lossy (`007`, `1.10`, `True`) or null-like stays a string.
fn typed_scalar(text: &str) -> Option<Value> {
    match serde_yaml::from_str::<Value>(text).ok()? {
        Value::Bool(b) if b.to_string() == text => Some(Value::Bool(b)),
        Value::Number(n) if n.to_string() == text => Some(Value::Number(n)),
        _ => None,
    }
}
