//! Diffing through an invertible value mapping.

use crate::differencer::{Delta, Differencer, Diff, DynDifferencer, ForwardReverse};
use crate::value::Value;
use std::sync::Arc;

/// A value mapping with an inverse.
pub trait InvertibleTransform: Send + Sync {
    /// Map a host value into the representation that gets diffed.
    fn forward(&self, value: &Value) -> Value;
    /// Map a diffed representation back to a host value.
    fn reverse(&self, value: &Value) -> Value;
}

/// Transform built from two closures.
pub struct FnTransform<F, R> {
    forward: F,
    reverse: R,
}

impl<F, R> FnTransform<F, R>
where
    F: Fn(&Value) -> Value + Send + Sync,
    R: Fn(&Value) -> Value + Send + Sync,
{
    /// Create a transform from its forward and reverse mappings.
    pub fn new(forward: F, reverse: R) -> Self {
        Self { forward, reverse }
    }
}

impl<F, R> InvertibleTransform for FnTransform<F, R>
where
    F: Fn(&Value) -> Value + Send + Sync,
    R: Fn(&Value) -> Value + Send + Sync,
{
    fn forward(&self, value: &Value) -> Value {
        (self.forward)(value)
    }

    fn reverse(&self, value: &Value) -> Value {
        (self.reverse)(value)
    }
}

/// Serializes values to JSON text and parses them back.
///
/// Malformed or non-text input parses to `Null`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonText;

impl InvertibleTransform for JsonText {
    fn forward(&self, value: &Value) -> Value {
        Value::text(value.to_json().to_string())
    }

    fn reverse(&self, value: &Value) -> Value {
        let Some(text) = value.as_str() else {
            return Value::Null;
        };
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(json) => Value::from(json),
            Err(err) => {
                tracing::warn!(error = %err, "malformed JSON text in transformed value");
                Value::Null
            }
        }
    }
}

/// Computes and applies diffs in a transformed representation.
#[derive(Clone)]
pub struct TransformDifferencer {
    transform: Arc<dyn InvertibleTransform>,
    inner: DynDifferencer,
}

impl TransformDifferencer {
    /// Create a differencer running `inner` on transformed values.
    pub fn new(transform: Arc<dyn InvertibleTransform>, inner: DynDifferencer) -> Self {
        Self { transform, inner }
    }
}

impl Differencer<Value> for TransformDifferencer {
    type Diff = Diff;

    fn calculate_diffs(&self, from: &Value, to: &Value) -> ForwardReverse<Diff> {
        if from == to {
            return ForwardReverse::empty();
        }
        self.inner
            .calculate_diffs(&self.transform.forward(from), &self.transform.forward(to))
    }

    fn apply_diff(&self, value: &Value, diff: &Diff) -> Value {
        if diff.is_empty() {
            return value.clone();
        }
        let applied = self.inner.apply_diff(&self.transform.forward(value), diff);
        self.transform.reverse(&applied)
    }

    fn diffs_intersect(&self, a: &Diff, b: &Diff) -> bool {
        self.inner.diffs_intersect(a, b)
    }
}
