//! Whole-value replacement.

use crate::differencer::{foreign_diff, Delta, Differencer, Diff, ForwardReverse};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Options for [`IdentityDifferencer`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityOptions {
    /// Only apply when the current value still equals the recorded `from`.
    pub require_same_from: bool,
}

/// Treats a value as an opaque scalar: any change replaces it wholesale.
#[derive(Clone, Debug, Default)]
pub struct IdentityDifferencer {
    options: IdentityOptions,
}

impl IdentityDifferencer {
    /// Create a differencer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a differencer with `options`.
    pub fn with_options(options: IdentityOptions) -> Self {
        Self { options }
    }
}

impl Differencer<Value> for IdentityDifferencer {
    type Diff = Diff;

    fn calculate_diffs(&self, from: &Value, to: &Value) -> ForwardReverse<Diff> {
        if from == to {
            return ForwardReverse::empty();
        }
        ForwardReverse::new(
            Diff::Identity { from: from.clone(), to: to.clone() },
            Diff::Identity { from: to.clone(), to: from.clone() },
        )
    }

    fn apply_diff(&self, value: &Value, diff: &Diff) -> Value {
        match diff {
            Diff::Empty => value.clone(),
            Diff::Identity { from, to } => {
                if self.options.require_same_from && value != from {
                    value.clone()
                } else {
                    to.clone()
                }
            }
            other => {
                foreign_diff("identity", other);
                value.clone()
            }
        }
    }

    fn diffs_intersect(&self, a: &Diff, b: &Diff) -> bool {
        !a.is_empty() && !b.is_empty()
    }
}
