//! Helpers over the dynamic document value (`serde_yaml::Value`).
//!
//! Nothing in here escapes the loader: every helper produces a strongly typed
//! value, or a `SpecError` naming the field path where a value has no
//! representation.

use crate::spec::SpecError;
use serde_yaml::Value as YamlValue;

/// Strip YAML tags (`!name value`) down to the tagged value.
pub fn untag(v: &YamlValue) -> &YamlValue {
    match v {
        YamlValue::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

/// Short description of a value for error messages, e.g. `number 2`.
pub fn describe(v: &YamlValue) -> String {
    match untag(v) {
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => format!("bool {b}"),
        YamlValue::Number(n) => format!("number {n}"),
        YamlValue::String(s) => format!("string {s:?}"),
        YamlValue::Sequence(seq) => format!("sequence of {} item(s)", seq.len()),
        YamlValue::Mapping(map) => format!("mapping of {} key(s)", map.len()),
        YamlValue::Tagged(_) => "tagged value".to_string(),
    }
}

/// Text form of any value. Collections render in flow style, e.g. `[a, b]`.
pub fn coerce_string(v: &YamlValue) -> String {
    match untag(v) {
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::String(s) => s.clone(),
        YamlValue::Sequence(seq) => {
            let items: Vec<String> = seq.iter().map(coerce_string).collect();
            format!("[{}]", items.join(", "))
        }
        YamlValue::Mapping(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, item)| format!("{}: {}", coerce_string(k), coerce_string(item)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        YamlValue::Tagged(tagged) => coerce_string(&tagged.value),
    }
}

/// Truthiness. Recognized words map to their meaning, any other non-empty
/// string is true, collections are true when non-empty.
pub fn coerce_bool(v: &YamlValue) -> bool {
    match untag(v) {
        YamlValue::Null => false,
        YamlValue::Bool(b) => *b,
        YamlValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        YamlValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "false" | "no" | "off" | "0" | "" => false,
            _ => true,
        },
        YamlValue::Sequence(seq) => !seq.is_empty(),
        YamlValue::Mapping(map) => !map.is_empty(),
        YamlValue::Tagged(tagged) => coerce_bool(&tagged.value),
    }
}

/// A list of strings kept as declared, or a comma-separated string split into
/// trimmed non-empty tokens. `None` for any other shape.
pub fn string_list(v: &YamlValue) -> Option<Vec<String>> {
    match untag(v) {
        YamlValue::String(s) => Some(split_commas(s)),
        YamlValue::Sequence(seq) => seq
            .iter()
            .map(|item| match untag(item) {
                YamlValue::String(s) => Some(s.clone()),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

pub fn split_commas(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Convert a document value into JSON. Scalar keys become strings; collection
/// keys and non-finite floats cannot be represented and are rejected.
pub fn to_json(path: &str, v: &YamlValue) -> Result<serde_json::Value, SpecError> {
    use serde_json::Value as JsonValue;

    Ok(match untag(v) {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f)
                    .map(JsonValue::Number)
                    .ok_or_else(|| {
                        SpecError::invalid(format!(
                            "{path} contains a non-finite number ({n}) which JSON cannot hold"
                        ))
                    })?
            }
        }
        YamlValue::String(s) => JsonValue::String(s.clone()),
        YamlValue::Sequence(seq) => JsonValue::Array(
            seq.iter()
                .enumerate()
                .map(|(i, item)| to_json(&format!("{path}[{i}]"), item))
                .collect::<Result<_, _>>()?,
        ),
        YamlValue::Mapping(map) => {
            let mut out = serde_json::Map::new();
            for (k, item) in map {
                let key = json_key(path, k)?;
                let child = to_json(&format!("{path}.{key}"), item)?;
                out.insert(key, child);
            }
            JsonValue::Object(out)
        }
        YamlValue::Tagged(tagged) => to_json(path, &tagged.value)?,
    })
}

fn json_key(path: &str, k: &YamlValue) -> Result<String, SpecError> {
    match untag(k) {
        YamlValue::String(s) => Ok(s.clone()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        other => Err(SpecError::invalid(format!(
            "{path} has a {} as a key; only scalar keys are supported",
            describe(other)
        ))),
    }
}
