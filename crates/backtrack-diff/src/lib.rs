//! # Backtrack Diff
//!
//! Composable, reversible diffs over dynamically shaped values.
//!
//! Every differencer implements the same three operations:
//!
//! - **calculate**: a forward/reverse diff pair for a transition
//! - **apply**: replay one half of a pair onto a value
//! - **intersect**: whether two diffs touch overlapping parts of a value
//!
//! Container differencers (map, record, routing, selective, transform) hold
//! child differencers and delegate to them, so arbitrarily nested shapes
//! are described by nesting constructors from [`algebra`].
//!
//! The ordered-key reconciler in [`keys`] is generic over any `Eq + Hash`
//! key type and backs set, list and key-order diffing.

pub mod algebra;
pub mod differencer;
mod entries;
pub mod error;
pub mod identity;
pub mod ignore;
pub mod keys;
pub mod list_map;
pub mod map;
pub mod record;
pub mod routing;
pub mod selective;
pub mod set;
pub mod transform;
pub mod value;

// Core exports
pub use differencer::{Delta, Diff, Differencer, DynDifferencer, ForwardReverse, MapDiff};
pub use error::{DiffError, Result};
pub use value::{DuplicatedKeyItems, Fields, Value};

// Key reconciler exports
pub use keys::{BlockMove, ItemMove, KeyDifferencer, KeyEdits, KeysDiff};

// Differencer exports
pub use entries::IntersectPolicy;
pub use identity::{IdentityDifferencer, IdentityOptions};
pub use ignore::IgnoreDifferencer;
pub use map::MapDifferencer;
pub use record::{RecordDifferencer, RecordOptions};
pub use routing::{CrossIntersector, Router, RoutingDifferencer};
pub use selective::{Getter, Lens, SelectiveDifferencer, Setter};
pub use set::{KeyListDifferencer, SetDifferencer};

// Transform exports
pub use list_map::{KeyOf, ListToObjectMap};
pub use transform::{FnTransform, InvertibleTransform, JsonText, TransformDifferencer};
