//! Keyed-entry diffing shared by the map and record differencers.
//!
//! Entries are compared key by key: keys only in `to` are inserts, keys
//! only in `from` are deletes, and keys on both sides whose child diff is
//! non-empty are updates. The key order is diffed separately so that
//! replaying a diff reproduces iteration order exactly.

use crate::differencer::{Diff, DynDifferencer, ForwardReverse, MapDiff};
use crate::keys::KeyDifferencer;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// How keyed diffs decide whether they conflict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntersectPolicy {
    /// Per-key overlap, and additionally any two key-order edits conflict.
    #[default]
    KeyOrder,
    /// Per-key overlap only.
    PerKey,
}

pub(crate) fn calculate<K, F>(
    from: &IndexMap<K, Value>,
    to: &IndexMap<K, Value>,
    child: F,
) -> Option<ForwardReverse<MapDiff<K>>>
where
    K: Clone + Eq + Hash,
    F: Fn(&K) -> DynDifferencer,
{
    let mut inserts = IndexMap::new();
    let mut deletes = IndexMap::new();
    let mut forward_updates = IndexMap::new();
    let mut reverse_updates = IndexMap::new();

    for (key, value) in to {
        if !from.contains_key(key) {
            inserts.insert(key.clone(), value.clone());
        }
    }
    for (key, before) in from {
        match to.get(key) {
            None => {
                deletes.insert(key.clone(), before.clone());
            }
            Some(after) => {
                let diffs = child(key).calculate_diffs(before, after);
                if !diffs.is_empty() {
                    forward_updates.insert(key.clone(), diffs.forward);
                    reverse_updates.insert(key.clone(), diffs.reverse);
                }
            }
        }
    }

    let from_keys: Vec<K> = from.keys().cloned().collect();
    let to_keys: Vec<K> = to.keys().cloned().collect();
    let keys = KeyDifferencer::calculate(&from_keys, &to_keys);

    let forward = MapDiff {
        inserts: inserts.clone(),
        updates: forward_updates,
        deletes: deletes.clone(),
        keys: keys.forward,
    };
    if forward.is_empty() {
        return None;
    }
    let reverse = MapDiff {
        inserts: deletes,
        updates: reverse_updates,
        deletes: inserts,
        keys: keys.reverse,
    };
    Some(ForwardReverse { forward, reverse })
}

/// Rebuild entries in the key order the diff produces.
///
/// With `overwrite_existing` off, an insert whose key already exists keeps
/// the current value, and a delete keeps the entry (appended after the
/// reordered keys) when the key's differencer sees a change between the
/// recorded value and the current one.
pub(crate) fn apply<K, F>(
    value: &IndexMap<K, Value>,
    diff: &MapDiff<K>,
    child: F,
    overwrite_existing: bool,
) -> IndexMap<K, Value>
where
    K: Clone + Eq + Hash,
    F: Fn(&K) -> DynDifferencer,
{
    let current_keys: Vec<K> = value.keys().cloned().collect();
    let new_keys = KeyDifferencer::apply(&current_keys, &diff.keys);

    let mut out = IndexMap::with_capacity(new_keys.len());
    for key in new_keys {
        let current = value.get(&key);
        let next = if let Some(inserted) = diff.inserts.get(&key) {
            match current {
                Some(existing) if !overwrite_existing => existing.clone(),
                _ => inserted.clone(),
            }
        } else if let Some(update) = diff.updates.get(&key) {
            let base = current.cloned().unwrap_or_default();
            child(&key).apply_diff(&base, update)
        } else if let Some(existing) = current {
            existing.clone()
        } else {
            continue;
        };
        out.insert(key, next);
    }

    if !overwrite_existing {
        for (key, deleted) in &diff.deletes {
            if let Some(existing) = value.get(key) {
                if !out.contains_key(key) && !child(key).calculate_diffs(deleted, existing).is_empty() {
                    out.insert(key.clone(), existing.clone());
                }
            }
        }
    }
    out
}

pub(crate) fn intersect<K, F>(a: &MapDiff<K>, b: &MapDiff<K>, child: F, policy: IntersectPolicy) -> bool
where
    K: Clone + Eq + Hash,
    F: Fn(&K) -> DynDifferencer,
{
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if policy == IntersectPolicy::KeyOrder && KeyDifferencer::intersect(&a.keys, &b.keys) {
        return true;
    }

    for (key, update) in &a.updates {
        if let Some(other) = b.updates.get(key) {
            if child(key).diffs_intersect(update, other) {
                return true;
            }
        } else if b.inserts.contains_key(key) || b.deletes.contains_key(key) {
            return true;
        }
    }
    let structural = |this: &MapDiff<K>, other: &MapDiff<K>| {
        this.inserts
            .keys()
            .chain(this.deletes.keys())
            .any(|key| {
                other.inserts.contains_key(key)
                    || other.deletes.contains_key(key)
                    || other.updates.contains_key(key)
            })
    };
    structural(a, b) || structural(b, a)
}

/// Wrap an optional keyed diff pair into [`Diff`] values.
pub(crate) fn wrap<K: Eq + Hash>(
    diffs: Option<ForwardReverse<MapDiff<K>>>,
    variant: fn(Box<MapDiff<K>>) -> Diff,
) -> ForwardReverse<Diff> {
    match diffs {
        None => ForwardReverse::empty(),
        Some(pair) => ForwardReverse::new(
            variant(Box::new(pair.forward)),
            variant(Box::new(pair.reverse)),
        ),
    }
}
