//! Ordered sets and unique-item lists, diffed through the key reconciler.
//!
//! Members are their own keys, so the diff carries no separate payload.
//! Values of any other shape are read as empty.

use crate::differencer::{foreign_diff, Delta, Differencer, Diff, ForwardReverse};
use crate::keys::{KeyDifferencer, KeysDiff};
use crate::value::Value;
use std::sync::Arc;

fn keys_pair(diffs: ForwardReverse<KeysDiff<Value>>) -> ForwardReverse<Diff> {
    if diffs.is_empty() {
        return ForwardReverse::empty();
    }
    ForwardReverse::new(Diff::Keys(diffs.forward), Diff::Keys(diffs.reverse))
}

fn keys_intersect(a: &Diff, b: &Diff) -> bool {
    match (a, b) {
        (Diff::Keys(a), Diff::Keys(b)) => KeyDifferencer::intersect(a, b),
        _ => !a.is_empty() && !b.is_empty(),
    }
}

/// Differencer for [`Value::Set`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SetDifferencer;

impl SetDifferencer {
    fn members(value: &Value) -> Vec<Value> {
        value
            .as_set()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Differencer<Value> for SetDifferencer {
    type Diff = Diff;

    fn calculate_diffs(&self, from: &Value, to: &Value) -> ForwardReverse<Diff> {
        if from == to {
            return ForwardReverse::empty();
        }
        keys_pair(KeyDifferencer::calculate(&Self::members(from), &Self::members(to)))
    }

    fn apply_diff(&self, value: &Value, diff: &Diff) -> Value {
        match diff {
            Diff::Empty => value.clone(),
            Diff::Keys(keys) if keys.is_empty() => value.clone(),
            Diff::Keys(keys) => {
                let members = KeyDifferencer::apply(&Self::members(value), keys);
                Value::Set(Arc::new(members.into_iter().collect()))
            }
            other => {
                foreign_diff("set", other);
                value.clone()
            }
        }
    }

    fn diffs_intersect(&self, a: &Diff, b: &Diff) -> bool {
        keys_intersect(a, b)
    }
}

/// Differencer for a [`Value::List`] whose items are unique.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyListDifferencer;

impl KeyListDifferencer {
    fn items(value: &Value) -> &[Value] {
        value.as_list().unwrap_or_default()
    }
}

impl Differencer<Value> for KeyListDifferencer {
    type Diff = Diff;

    fn calculate_diffs(&self, from: &Value, to: &Value) -> ForwardReverse<Diff> {
        if from == to {
            return ForwardReverse::empty();
        }
        keys_pair(KeyDifferencer::calculate(Self::items(from), Self::items(to)))
    }

    fn apply_diff(&self, value: &Value, diff: &Diff) -> Value {
        match diff {
            Diff::Empty => value.clone(),
            Diff::Keys(keys) if keys.is_empty() => value.clone(),
            Diff::Keys(keys) => Value::list(KeyDifferencer::apply(Self::items(value), keys)),
            other => {
                foreign_diff("key list", other);
                value.clone()
            }
        }
    }

    fn diffs_intersect(&self, a: &Diff, b: &Diff) -> bool {
        keys_intersect(a, b)
    }
}
