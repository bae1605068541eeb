//! A differencer that never records anything.

use crate::differencer::{Differencer, Diff, ForwardReverse};
use crate::value::Value;

/// Always reports no change; used for untracked record fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreDifferencer;

impl Differencer<Value> for IgnoreDifferencer {
    type Diff = Diff;

    fn calculate_diffs(&self, _from: &Value, _to: &Value) -> ForwardReverse<Diff> {
        ForwardReverse::empty()
    }

    fn apply_diff(&self, value: &Value, _diff: &Diff) -> Value {
        value.clone()
    }

    fn diffs_intersect(&self, _a: &Diff, _b: &Diff) -> bool {
        false
    }
}
