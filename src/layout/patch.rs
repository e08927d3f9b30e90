//! Deep Patch Engine
//!
//! A patch is a flat mapping from dotted paths to values:
//!
//! ```json
//! { "children.sections.0.setting.paddingTop": 20, "backgroundColor": "#fff" }
//! ```
//!
//! Each path is walked from the document root. Missing intermediate keys are
//! created as empty objects. A numeric segment indexes into an existing array
//! but never grows it. Reaching a scalar, a null, or an out-of-range index
//! before the last segment is a conflict; nothing is coerced.
//!
//! [`apply_patch`] works on a copy, so the input document is never modified.

use serde_json::{Map, Value};
use thiserror::Error;

/// Sparse update: dotted path -> new leaf value
pub type Patch = Map<String, Value>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    /// The path runs into a value that cannot hold children
    #[error("cannot apply '{path}': value at '{at}' is not an object")]
    Conflict { path: String, at: String },

    /// The path has an empty segment (`a..b`, leading or trailing dot)
    #[error("patch path '{path}' contains an empty segment")]
    EmptySegment { path: String },
}

/// Apply every entry of `patch` to a copy of `document`.
///
/// Entries are applied in the patch's key order. Applying the same patch
/// twice gives the same document as applying it once.
pub fn apply_patch(document: &Value, patch: &Patch) -> Result<Value, PatchError> {
    let mut patched = document.clone();
    for (path, value) in patch {
        set_path(&mut patched, path, value.clone())?;
    }
    Ok(patched)
}

/// Prefix every path of `patch` with `target`
pub fn scope_patch(target: &str, patch: Patch) -> Patch {
    let target = target.trim_matches('.');
    if target.is_empty() {
        return patch;
    }
    patch
        .into_iter()
        .map(|(path, value)| (format!("{}.{}", target, path), value))
        .collect()
}

fn set_path(root: &mut Value, path: &str, value: Value) -> Result<(), PatchError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(PatchError::EmptySegment {
            path: path.to_string(),
        });
    }
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(PatchError::EmptySegment {
            path: path.to_string(),
        });
    };

    let conflict = |depth: usize| PatchError::Conflict {
        path: path.to_string(),
        at: if depth == 0 {
            "<root>".to_string()
        } else {
            segments[..depth].join(".")
        },
    };

    let mut node = root;
    for (depth, segment) in parents.iter().enumerate() {
        node = match node {
            Value::Object(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(items) => array_slot(items, segment).ok_or_else(|| conflict(depth))?,
            _ => return Err(conflict(depth)),
        };
    }

    match node {
        Value::Object(map) => {
            map.insert(leaf.to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let slot = array_slot(items, leaf).ok_or_else(|| conflict(parents.len()))?;
            *slot = value;
            Ok(())
        }
        _ => Err(conflict(parents.len())),
    }
}

fn array_slot<'a>(items: &'a mut [Value], segment: &str) -> Option<&'a mut Value> {
    segment
        .parse::<usize>()
        .ok()
        .and_then(move |index| items.get_mut(index))
}
