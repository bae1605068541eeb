//! Composite views assembled from named lenses over one whole value.

use crate::differencer::{foreign_diff, Delta, Differencer, Diff, DynDifferencer, ForwardReverse};
use crate::error::{DiffError, Result};
use crate::value::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

pub type Getter = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Copy-on-write setter: returns a new whole with the part replaced.
pub type Setter = Arc<dyn Fn(&Value, Value) -> Value + Send + Sync>;

/// A named part of a whole value and the differencer for that part.
#[derive(Clone)]
pub struct Lens {
    name: String,
    get: Getter,
    set: Setter,
    differencer: DynDifferencer,
}

impl Lens {
    /// Create a lens from a getter, a setter and the differencer for its part.
    pub fn new<G, S>(name: impl Into<String>, get: G, set: S, differencer: DynDifferencer) -> Self
    where
        G: Fn(&Value) -> Value + Send + Sync + 'static,
        S: Fn(&Value, Value) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            get: Arc::new(get),
            set: Arc::new(set),
            differencer,
        }
    }

    /// Lens over one record field.
    pub fn field(name: impl Into<String>, differencer: DynDifferencer) -> Self {
        let name = name.into();
        let get_name = name.clone();
        let set_name = name.clone();
        Self::new(
            name,
            move |whole: &Value| whole.field(&get_name),
            move |whole: &Value, part: Value| whole.with_field(set_name.clone(), part),
            differencer,
        )
    }

    /// Get the lens name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Differencer whose diff is a sparse map from lens name to part diff.
#[derive(Clone)]
pub struct SelectiveDifferencer {
    lenses: Vec<Lens>,
}

impl SelectiveDifferencer {
    /// Create a differencer over `lenses`. Lens names must be unique.
    pub fn new(lenses: impl IntoIterator<Item = Lens>) -> Result<Self> {
        let lenses: Vec<Lens> = lenses.into_iter().collect();
        let mut seen = HashSet::new();
        for lens in &lenses {
            if !seen.insert(lens.name.as_str()) {
                return Err(DiffError::DuplicateLens(lens.name.clone()));
            }
        }
        Ok(Self { lenses })
    }

    fn lens(&self, name: &str) -> Option<&Lens> {
        self.lenses.iter().find(|lens| lens.name == name)
    }
}

impl Differencer<Value> for SelectiveDifferencer {
    type Diff = Diff;

    fn calculate_diffs(&self, from: &Value, to: &Value) -> ForwardReverse<Diff> {
        let mut forward = BTreeMap::new();
        let mut reverse = BTreeMap::new();
        for lens in &self.lenses {
            let diffs = lens
                .differencer
                .calculate_diffs(&(lens.get)(from), &(lens.get)(to));
            if !diffs.is_empty() {
                forward.insert(lens.name.clone(), diffs.forward);
                reverse.insert(lens.name.clone(), diffs.reverse);
            }
        }
        if forward.is_empty() {
            return ForwardReverse::empty();
        }
        ForwardReverse::new(Diff::Selective(forward), Diff::Selective(reverse))
    }

    /// Parts are applied in lens declaration order. Lenses without a diff
    /// are never touched, so their parts keep their identity.
    fn apply_diff(&self, value: &Value, diff: &Diff) -> Value {
        let parts = match diff {
            Diff::Empty => return value.clone(),
            Diff::Selective(parts) => parts,
            other => {
                foreign_diff("selective", other);
                return value.clone();
            }
        };
        let mut whole = value.clone();
        for lens in &self.lenses {
            if let Some(part_diff) = parts.get(&lens.name) {
                let part = lens.differencer.apply_diff(&(lens.get)(value), part_diff);
                whole = (lens.set)(&whole, part);
            }
        }
        whole
    }

    fn diffs_intersect(&self, a: &Diff, b: &Diff) -> bool {
        if a.is_empty() || b.is_empty() {
            return false;
        }
        let (Diff::Selective(parts_a), Diff::Selective(parts_b)) = (a, b) else {
            return true;
        };
        parts_a.iter().any(|(name, diff_a)| match parts_b.get(name) {
            Some(diff_b) => self
                .lens(name)
                .map_or(true, |lens| lens.differencer.diffs_intersect(diff_a, diff_b)),
            None => false,
        })
    }
}
