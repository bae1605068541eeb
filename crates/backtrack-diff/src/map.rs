//! Keyed maps with arbitrary value keys.

use crate::differencer::{foreign_diff, Differencer, Diff, DynDifferencer, ForwardReverse};
use crate::entries::{self, IntersectPolicy};
use crate::identity::IdentityDifferencer;
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;

/// Differencer for [`Value::Map`]. Every entry value is diffed with the
/// same child differencer (identity by default).
#[derive(Clone)]
pub struct MapDifferencer {
    child: DynDifferencer,
    policy: IntersectPolicy,
}

impl MapDifferencer {
    /// Create a map differencer with identity-diffed values.
    pub fn new() -> Self {
        Self::with_child(Arc::new(IdentityDifferencer::new()))
    }

    /// Create a map differencer with values diffed by `child`.
    pub fn with_child(child: DynDifferencer) -> Self {
        Self {
            child,
            policy: IntersectPolicy::default(),
        }
    }

    /// Set how diffs are compared for overlap.
    pub fn intersect_policy(mut self, policy: IntersectPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn entries(value: &Value) -> IndexMap<Value, Value> {
        value.as_map().cloned().unwrap_or_default()
    }
}

impl Default for MapDifferencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Differencer<Value> for MapDifferencer {
    type Diff = Diff;

    fn calculate_diffs(&self, from: &Value, to: &Value) -> ForwardReverse<Diff> {
        if from == to {
            return ForwardReverse::empty();
        }
        let diffs = entries::calculate(&Self::entries(from), &Self::entries(to), |_| {
            Arc::clone(&self.child)
        });
        entries::wrap(diffs, Diff::Map)
    }

    fn apply_diff(&self, value: &Value, diff: &Diff) -> Value {
        match diff {
            Diff::Empty => value.clone(),
            Diff::Map(map_diff) => {
                let rebuilt = entries::apply(
                    &Self::entries(value),
                    map_diff,
                    |_| Arc::clone(&self.child),
                    true,
                );
                Value::Map(Arc::new(rebuilt))
            }
            other => {
                foreign_diff("map", other);
                value.clone()
            }
        }
    }

    fn diffs_intersect(&self, a: &Diff, b: &Diff) -> bool {
        match (a, b) {
            (Diff::Empty, _) | (_, Diff::Empty) => false,
            (Diff::Map(a), Diff::Map(b)) => {
                entries::intersect(a, b, |_| Arc::clone(&self.child), self.policy)
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::SetDifferencer;

    fn entry(k: i64, v: &str) -> (Value, Value) {
        (Value::from(k), Value::from(v))
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let from = Value::map([entry(1, "a"), entry(2, "b"), entry(3, "c")]);
        let to = Value::map([entry(3, "c"), entry(4, "d"), entry(1, "z")]);
        let differ = MapDifferencer::new();
        let diffs = differ.calculate_diffs(&from, &to);

        let applied = differ.apply_diff(&from, &diffs.forward);
        assert_eq!(applied, to);
        assert_eq!(differ.apply_diff(&to, &diffs.reverse), from);

        let Diff::Map(fwd) = &diffs.forward else { panic!("expected map diff") };
        assert_eq!(fwd.inserts.len(), 1);
        assert_eq!(fwd.deletes.len(), 1);
        assert_eq!(fwd.updates.len(), 1);
    }

    #[test]
    fn test_updates_use_key_lookup() {
        // updates must land on their own key even when keys are reordered
        let from = Value::map([entry(1, "a"), entry(2, "b")]);
        let to = Value::map([entry(2, "B"), entry(1, "A")]);
        let differ = MapDifferencer::new();
        let diffs = differ.calculate_diffs(&from, &to);
        assert_eq!(differ.apply_diff(&from, &diffs.forward), to);
    }

    #[test]
    fn test_child_differencer() {
        let differ = MapDifferencer::with_child(Arc::new(SetDifferencer));
        let from = Value::map([(Value::from("s"), Value::set([Value::from(1)]))]);
        let to = Value::map([(Value::from("s"), Value::set([Value::from(1), Value::from(2)]))]);
        let diffs = differ.calculate_diffs(&from, &to);
        let Diff::Map(fwd) = &diffs.forward else { panic!("expected map diff") };
        assert!(matches!(fwd.updates.get(&Value::from("s")), Some(Diff::Keys(_))));
        assert_eq!(differ.apply_diff(&from, &diffs.forward), to);
    }

    #[test]
    fn test_intersection_policies() {
        let base = Value::map([entry(1, "a"), entry(2, "b")]);
        let touch_one = Value::map([entry(1, "x"), entry(2, "b")]);
        let touch_two = Value::map([entry(1, "a"), entry(2, "y")]);
        let add_three = Value::map([entry(1, "a"), entry(2, "b"), entry(3, "c")]);
        let add_four = Value::map([entry(1, "a"), entry(2, "b"), entry(4, "d")]);

        let key_order = MapDifferencer::new();
        let per_key = MapDifferencer::new().intersect_policy(IntersectPolicy::PerKey);

        let a = key_order.calculate_diffs(&base, &touch_one).forward;
        let b = key_order.calculate_diffs(&base, &touch_two).forward;
        let c = key_order.calculate_diffs(&base, &touch_one).forward;
        assert!(!key_order.diffs_intersect(&a, &b));
        assert!(key_order.diffs_intersect(&a, &c));

        let d = key_order.calculate_diffs(&base, &add_three).forward;
        let e = key_order.calculate_diffs(&base, &add_four).forward;
        assert!(key_order.diffs_intersect(&d, &e));
        assert!(!per_key.diffs_intersect(&d, &e));
        assert!(!per_key.diffs_intersect(&d, &Diff::Empty));
    }
}
