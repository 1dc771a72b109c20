//! Configuration fragment resolution.
//!
//! Fragments are JSON objects.  A child fragment overrides its parent key by
//! key; where both sides hold an object the merge recurses, anything else in
//! the child replaces the parent value outright.  `null` counts as absent.
//!
//! ```text
//!   parent { a: 1, p: { x: 1, y: 1 } }
//!   child  { b: 2, p: { y: 2 } }
//!   merged { a: 1, b: 2, p: { x: 1, y: 2 } }
//! ```
//!
//! [`resolve_chain`] applies [`merge`] up a `parent` chain until a fragment
//! without `parent` is reached.  Every visited link is remembered so a loop
//! in the config is reported instead of followed.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use serde_json::{Map, Value};

use crate::error::ConfigError;

/// A configuration subtree.
pub type Fragment = Map<String, Value>;

/// Key that names a fragment's parent.
pub const PARENT_KEY: &str = "parent";

fn present(v: Option<&Value>) -> Option<&Value> {
    v.filter(|v| !v.is_null())
}

/// Merge `overlay` on top of `base` without touching either input.
///
/// Returns `None` only when both sides are absent.
pub fn merge(base: Option<&Value>, overlay: Option<&Value>) -> Option<Value> {
    let Some(overlay) = present(overlay) else {
        return present(base).cloned();
    };
    let Value::Object(over) = overlay else {
        return Some(overlay.clone());
    };
    let Some(Value::Object(base)) = present(base) else {
        return Some(overlay.clone());
    };
    Some(Value::Object(merge_fragments(base, over)))
}

/// Object-level [`merge`]: union of keys, overlay wins, objects recurse.
pub fn merge_fragments(base: &Fragment, overlay: &Fragment) -> Fragment {
    let mut out = base.clone();
    for (key, value) in overlay {
        let merged = merge(base.get(key), Some(value)).unwrap_or(Value::Null);
        out.insert(key.clone(), merged);
    }
    out
}

/// Read the `parent` name of a fragment, if any.
pub fn parent_of(fragment: &Fragment) -> Result<Option<&str>, ConfigError> {
    match fragment.get(PARENT_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => Ok(Some(name)),
        Some(_) => Err(ConfigError::InvalidParent),
    }
}

/// Walk a `parent` chain and fold it into one fragment.
///
/// `start` is the first link and its fragment.  For every `parent` name met
/// along the way `lookup(current_link, parent_name, visited)` returns the
/// next link, or `None` if the name resolves nowhere.  Links must be unique
/// identities; meeting one twice is a [`ConfigError::ParentCycle`].
///
/// The result no longer contains [`PARENT_KEY`].
pub fn resolve_chain<'a, K, F>(start: (K, &'a Fragment), mut lookup: F) -> Result<Fragment, ConfigError>
where
    K: Eq + Hash + Clone + fmt::Display,
    F: FnMut(&K, &str, &HashSet<K>) -> Option<(K, &'a Fragment)>,
{
    let (mut link, mut node) = start;
    let mut visited = HashSet::from([link.clone()]);
    let mut trail = vec![link.to_string()];
    let mut layers = vec![node];

    while let Some(parent) = parent_of(node)? {
        let Some((next_link, next)) = lookup(&link, parent, &visited) else {
            return Err(ConfigError::UnresolvedParent(parent.to_string()));
        };
        trail.push(next_link.to_string());
        if !visited.insert(next_link.clone()) {
            return Err(ConfigError::ParentCycle(trail));
        }
        link = next_link;
        node = next;
        layers.push(node);
    }

    let mut layers = layers.into_iter().rev();
    let mut resolved = layers.next().cloned().unwrap_or_default();
    for child in layers {
        resolved = merge_fragments(&resolved, child);
    }
    resolved.remove(PARENT_KEY);
    Ok(resolved)
}

/// Resolve `start` against a single table of named fragments.
///
/// `label` names the starting fragment in cycle reports.
pub fn resolve_in_table(label: &str, start: &Fragment, table: &Fragment) -> Result<Fragment, ConfigError> {
    resolve_chain((label.to_string(), start), |_, parent, _| {
        table
            .get(parent)
            .and_then(Value::as_object)
            .map(|fragment| (parent.to_string(), fragment))
    })
}
