//! The differencer capability and the closed set of diff shapes.
//!
//! A differencer computes a reversible [`ForwardReverse`] pair between two
//! values, applies one half of such a pair to a value, and decides whether
//! two diffs touch the same part of a value.
//!
//! # Laws
//!
//! For every differencer `d` and values `a`, `b` of its domain:
//! - `d.apply_diff(a, &d.calculate_diffs(a, b).forward) == b`
//! - `d.apply_diff(b, &d.calculate_diffs(a, b).reverse) == a`
//! - `d.calculate_diffs(a, a)` is the empty pair
//! - `d.diffs_intersect(x, y)` is false whenever `x` or `y` is empty

use crate::keys::KeysDiff;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::Hash;
use std::sync::Arc;

/// A change description with a distinguished "no change" value.
pub trait Delta: Sized {
    fn is_empty(&self) -> bool;
    fn empty() -> Self;
}

/// A diff together with the diff that undoes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForwardReverse<D> {
    pub forward: D,
    pub reverse: D,
}

impl<D: Delta> ForwardReverse<D> {
    /// Pair a forward diff with its reverse.
    pub fn new(forward: D, reverse: D) -> Self {
        Self { forward, reverse }
    }

    /// A pair of empty diffs.
    pub fn empty() -> Self {
        Self {
            forward: D::empty(),
            reverse: D::empty(),
        }
    }

    /// True when the forward diff is empty.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Swap the halves, producing the pair for the opposite transition.
    pub fn inverted(self) -> Self {
        Self {
            forward: self.reverse,
            reverse: self.forward,
        }
    }
}

/// Computes, applies and intersects diffs for one value shape.
pub trait Differencer<V>: Send + Sync {
    type Diff: Delta;

    /// Diff pair describing the transition `from -> to`.
    fn calculate_diffs(&self, from: &V, to: &V) -> ForwardReverse<Self::Diff>;

    /// Apply one half of a diff pair. An empty diff returns `value` unchanged.
    fn apply_diff(&self, value: &V, diff: &Self::Diff) -> V;

    /// Whether two diffs touch overlapping parts of a value.
    fn diffs_intersect(&self, a: &Self::Diff, b: &Self::Diff) -> bool;
}

impl<V, D: Differencer<V> + ?Sized> Differencer<V> for Arc<D> {
    type Diff = D::Diff;

    fn calculate_diffs(&self, from: &V, to: &V) -> ForwardReverse<Self::Diff> {
        (**self).calculate_diffs(from, to)
    }

    fn apply_diff(&self, value: &V, diff: &Self::Diff) -> V {
        (**self).apply_diff(value, diff)
    }

    fn diffs_intersect(&self, a: &Self::Diff, b: &Self::Diff) -> bool {
        (**self).diffs_intersect(a, b)
    }
}

/// Shared, type-erased differencer over [`Value`].
pub type DynDifferencer = Arc<dyn Differencer<Value, Diff = Diff>>;

/// Keyed collection edit shared by the map and record differencers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapDiff<K: Eq + Hash> {
    /// Entries added by this diff, with their new value.
    pub inserts: IndexMap<K, Value>,
    /// Entries present on both sides whose value changed.
    pub updates: IndexMap<K, Diff>,
    /// Entries removed by this diff, with their prior value.
    pub deletes: IndexMap<K, Value>,
    /// Edit of the key order.
    pub keys: KeysDiff<K>,
}

impl<K: Eq + Hash> MapDiff<K> {
    /// True when no entry or key order changes.
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty()
            && self.updates.is_empty()
            && self.deletes.is_empty()
            && self.keys.is_empty()
    }
}

/// Every diff produced by a [`Value`] differencer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Diff {
    /// No change.
    #[default]
    Empty,
    /// Whole-value replacement.
    Identity { from: Value, to: Value },
    /// Ordered unique-key edit (sets and key lists).
    Keys(KeysDiff<Value>),
    /// Keyed map edit.
    Map(Box<MapDiff<Value>>),
    /// Record edit keyed by field name.
    Record(Box<MapDiff<String>>),
    /// Inner diff tagged with the route that produced it.
    Routing { route: String, diff: Box<Diff> },
    /// Per-lens diffs, only for lenses that changed.
    Selective(BTreeMap<String, Diff>),
}

impl Diff {
    /// Short name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Diff::Empty => "empty",
            Diff::Identity { .. } => "identity",
            Diff::Keys(_) => "keys",
            Diff::Map(_) => "map",
            Diff::Record(_) => "record",
            Diff::Routing { .. } => "routing",
            Diff::Selective(_) => "selective",
        }
    }
}

impl Delta for Diff {
    fn is_empty(&self) -> bool {
        match self {
            Diff::Empty => true,
            Diff::Keys(keys) => keys.is_empty(),
            _ => false,
        }
    }

    fn empty() -> Self {
        Diff::Empty
    }
}

/// Log a diff that does not belong to the differencer it was handed to.
pub(crate) fn foreign_diff(differencer: &str, diff: &Diff) {
    tracing::warn!(
        differencer,
        diff = diff.kind(),
        "diff shape does not match differencer; leaving value unchanged"
    );
}
