//! Records keyed by field name, with per-field differencers.

use crate::differencer::{foreign_diff, Differencer, Diff, DynDifferencer, ForwardReverse};
use crate::entries::{self, IntersectPolicy};
use crate::identity::IdentityDifferencer;
use crate::value::{Fields, Value};
use indexmap::IndexMap;
use std::sync::Arc;

/// Construction options for [`RecordDifferencer`].
#[derive(Clone)]
pub struct RecordOptions {
    /// Differencer for fields without an override.
    pub primary: DynDifferencer,
    /// Field-specific differencers.
    pub fields: IndexMap<String, DynDifferencer>,
    /// Whether inserts clobber existing fields and deletes remove fields
    /// whose value changed since the diff was recorded.
    pub overwrite_existing: bool,
    /// How diffs are compared for overlap.
    pub policy: IntersectPolicy,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            primary: Arc::new(IdentityDifferencer::new()),
            fields: IndexMap::new(),
            overwrite_existing: true,
            policy: IntersectPolicy::default(),
        }
    }
}

impl RecordOptions {
    /// Set the differencer used for fields without an override.
    pub fn primary(mut self, differencer: DynDifferencer) -> Self {
        self.primary = differencer;
        self
    }

    /// Override the differencer for one field. A later call for the same
    /// field replaces the earlier one.
    pub fn field(mut self, name: impl Into<String>, differencer: DynDifferencer) -> Self {
        self.fields.insert(name.into(), differencer);
        self
    }

    /// Set whether applied diffs clobber fields changed since recording.
    pub fn overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    /// Set how diffs are compared for overlap.
    pub fn intersect_policy(mut self, policy: IntersectPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Differencer for [`Value::Record`].
#[derive(Clone, Default)]
pub struct RecordDifferencer {
    options: RecordOptions,
}

impl RecordDifferencer {
    /// Create a differencer from `options`.
    pub fn new(options: RecordOptions) -> Self {
        Self { options }
    }

    fn child_for(&self, field: &str) -> DynDifferencer {
        Arc::clone(self.options.fields.get(field).unwrap_or(&self.options.primary))
    }

    fn fields(value: &Value) -> Fields {
        value.as_record().cloned().unwrap_or_default()
    }
}

impl Differencer<Value> for RecordDifferencer {
    type Diff = Diff;

    fn calculate_diffs(&self, from: &Value, to: &Value) -> ForwardReverse<Diff> {
        if from == to {
            return ForwardReverse::empty();
        }
        let diffs = entries::calculate(&Self::fields(from), &Self::fields(to), |field| {
            self.child_for(field)
        });
        entries::wrap(diffs, Diff::Record)
    }

    fn apply_diff(&self, value: &Value, diff: &Diff) -> Value {
        match diff {
            Diff::Empty => value.clone(),
            Diff::Record(record_diff) => {
                let rebuilt = entries::apply(
                    &Self::fields(value),
                    record_diff,
                    |field| self.child_for(field),
                    self.options.overwrite_existing,
                );
                Value::Record(Arc::new(rebuilt))
            }
            other => {
                foreign_diff("record", other);
                value.clone()
            }
        }
    }

    fn diffs_intersect(&self, a: &Diff, b: &Diff) -> bool {
        match (a, b) {
            (Diff::Empty, _) | (_, Diff::Empty) => false,
            (Diff::Record(a), Diff::Record(b)) => {
                entries::intersect(a, b, |field| self.child_for(field), self.options.policy)
            }
            _ => true,
        }
    }
}
