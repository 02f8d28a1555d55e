use serde_json::{Map, Value};

/// Nesting limit for attribute trees. Deep enough for any real feature
/// attribute payload, shallow enough to catch self-referential structures
/// flattened into pathological nesting upstream.
pub const MAX_ATTRIBUTE_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An attribute object carries an engine-wrapper shape: an
    /// underscore-prefixed internal field or a `getValue` callback slot.
    WrapperShape { path: String, key: String },
    TooDeep { path: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::WrapperShape { path, key } => {
                write!(f, "engine wrapper shape at {path}: key {key:?}")
            }
            ValidationError::TooDeep { path } => {
                write!(
                    f,
                    "attribute nesting at {path} exceeds {MAX_ATTRIBUTE_DEPTH} levels"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Returns `true` for object keys that only occur on engine property
/// wrappers, never on plain analysis data.
pub fn is_wrapper_key(key: &str) -> bool {
    key.starts_with('_') || key == "getValue"
}

/// Checks that an attribute map holds only plain, serialization-safe data.
///
/// Plain means: JSON scalars, arrays, and objects whose keys never use the
/// engine-internal shapes (`_`-prefixed fields, `getValue` slots) and whose
/// nesting stays within [`MAX_ATTRIBUTE_DEPTH`]. This is the single check
/// standing between live engine state and the serializable cache, so it
/// walks the full tree on every insert rather than sampling.
pub fn ensure_plain(attributes: &Map<String, Value>) -> Result<(), ValidationError> {
    ensure_plain_object(attributes, "$", 1)
}

fn ensure_plain_object(
    object: &Map<String, Value>,
    path: &str,
    depth: usize,
) -> Result<(), ValidationError> {
    if depth > MAX_ATTRIBUTE_DEPTH {
        return Err(ValidationError::TooDeep {
            path: path.to_string(),
        });
    }

    for (key, value) in object {
        if is_wrapper_key(key) {
            return Err(ValidationError::WrapperShape {
                path: path.to_string(),
                key: key.clone(),
            });
        }
        ensure_plain_value(value, &format!("{path}.{key}"), depth + 1)?;
    }

    Ok(())
}

fn ensure_plain_value(value: &Value, path: &str, depth: usize) -> Result<(), ValidationError> {
    if depth > MAX_ATTRIBUTE_DEPTH {
        return Err(ValidationError::TooDeep {
            path: path.to_string(),
        });
    }

    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(()),
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                ensure_plain_value(item, &format!("{path}[{idx}]"), depth + 1)?;
            }
            Ok(())
        }
        Value::Object(object) => ensure_plain_object(object, path, depth),
    }
}
