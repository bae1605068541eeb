//! Constructors for the common differencer vocabulary.
//!
//! Every function returns a shared [`DynDifferencer`] so results nest
//! directly into each other:
//!
//! ```rust
//! use backtrack_diff::algebra;
//!
//! let todo = algebra::record([
//!     ("title", algebra::identity()),
//!     ("tags", algebra::set()),
//!     ("due", algebra::nullable(algebra::identity())),
//! ]);
//! # let _ = todo;
//! ```

use crate::differencer::{Diff, DynDifferencer};
use crate::error::Result;
use crate::identity::{IdentityDifferencer, IdentityOptions};
use crate::ignore::IgnoreDifferencer;
use crate::list_map::ListToObjectMap;
use crate::map::MapDifferencer;
use crate::record::{RecordDifferencer, RecordOptions};
use crate::routing::RoutingDifferencer;
use crate::selective::{Lens, SelectiveDifferencer};
use crate::set::{KeyListDifferencer, SetDifferencer};
use crate::transform::{InvertibleTransform, JsonText, TransformDifferencer};
use crate::value::Value;
use std::sync::Arc;

/// Route used by [`nullable`] when either side is `Null`.
pub const NULLABLE_ROUTE: &str = "nullable";
/// Route used by [`nullable`] otherwise.
pub const BASE_ROUTE: &str = "base";

const UNIQUE_ROUTE: &str = "unique";
const DUPLICATED_ROUTE: &str = "duplicated";

/// Whole-value replacement.
pub fn identity() -> DynDifferencer {
    Arc::new(IdentityDifferencer::new())
}

/// Whole-value replacement with custom options.
pub fn identity_with(options: IdentityOptions) -> DynDifferencer {
    Arc::new(IdentityDifferencer::with_options(options))
}

/// Never records a change.
pub fn ignore() -> DynDifferencer {
    Arc::new(IgnoreDifferencer)
}

/// Set of unique items.
pub fn set() -> DynDifferencer {
    Arc::new(SetDifferencer)
}

/// List of unique items, diffed as an ordered key sequence.
pub fn key_list() -> DynDifferencer {
    Arc::new(KeyListDifferencer)
}

/// Map with identity-diffed entry values.
pub fn map() -> DynDifferencer {
    Arc::new(MapDifferencer::new())
}

/// Map with entry values diffed by `child`.
pub fn map_of(child: DynDifferencer) -> DynDifferencer {
    Arc::new(MapDifferencer::with_child(child))
}

/// Record with per-field differencers.
pub fn object(options: RecordOptions) -> DynDifferencer {
    Arc::new(RecordDifferencer::new(options))
}

/// Record used as a string-keyed map: every field shares one differencer.
pub fn object_map(child: DynDifferencer, overwrite_existing: bool) -> DynDifferencer {
    object(
        RecordOptions::default()
            .primary(child)
            .overwrite_existing(overwrite_existing),
    )
}

/// Record with a fixed set of tracked fields. Fields not listed are ignored.
pub fn record<N: Into<String>>(fields: impl IntoIterator<Item = (N, DynDifferencer)>) -> DynDifferencer {
    let options = fields
        .into_iter()
        .fold(RecordOptions::default().primary(ignore()), |options, (name, differencer)| {
            options.field(name, differencer)
        });
    object(options)
}

/// Tagged union over named routes.
pub fn case<N, R, C>(
    routes: impl IntoIterator<Item = (N, DynDifferencer)>,
    router: R,
    cross_intersector: C,
) -> Result<DynDifferencer>
where
    N: Into<String>,
    R: Fn(&Value, &Value) -> String + Send + Sync + 'static,
    C: Fn(&Diff, &Diff) -> bool + Send + Sync + 'static,
{
    let differencer = RoutingDifferencer::new(routes, router)?.cross_intersector(cross_intersector);
    Ok(Arc::new(differencer))
}

/// Wrap `base` so transitions to or from `Null` are whole-value replacements.
pub fn nullable(base: DynDifferencer) -> DynDifferencer {
    let routes = [(NULLABLE_ROUTE, identity()), (BASE_ROUTE, base)];
    let router = |from: &Value, to: &Value| {
        if from.is_null() || to.is_null() {
            NULLABLE_ROUTE.to_string()
        } else {
            BASE_ROUTE.to_string()
        }
    };
    match RoutingDifferencer::new(routes, router) {
        Ok(differencer) => Arc::new(differencer),
        // two distinct static route names never collide
        Err(err) => unreachable!("{err}"),
    }
}

/// Diff each lens part separately.
pub fn selective(lenses: impl IntoIterator<Item = Lens>) -> Result<DynDifferencer> {
    Ok(Arc::new(SelectiveDifferencer::new(lenses)?))
}

/// Diff values through an invertible transform.
pub fn transform(transform: Arc<dyn InvertibleTransform>, inner: DynDifferencer) -> DynDifferencer {
    Arc::new(TransformDifferencer::new(transform, inner))
}

/// Diff values as their JSON text, through `inner` (identity by default).
pub fn json(inner: Option<DynDifferencer>) -> DynDifferencer {
    transform(Arc::new(JsonText), inner.unwrap_or_else(identity))
}

/// Diff a list of keyed items as a record keyed by `key_of`.
///
/// Unique keys are diffed with `unique`; when either side of an entry is a
/// duplicate marker, `duplicated` handles it.
pub fn list_to_object_map<F>(key_of: F, unique: DynDifferencer, duplicated: DynDifferencer) -> DynDifferencer
where
    F: Fn(&Value) -> String + Send + Sync + 'static,
{
    let routes = [(UNIQUE_ROUTE, unique), (DUPLICATED_ROUTE, duplicated)];
    let router = |from: &Value, to: &Value| {
        if from.as_duplicated().is_some() || to.as_duplicated().is_some() {
            DUPLICATED_ROUTE.to_string()
        } else {
            UNIQUE_ROUTE.to_string()
        }
    };
    let entry: DynDifferencer = match RoutingDifferencer::new(routes, router) {
        Ok(differencer) => Arc::new(differencer),
        Err(err) => unreachable!("{err}"),
    };
    transform(Arc::new(ListToObjectMap::new(key_of)), object_map(entry, true))
}
