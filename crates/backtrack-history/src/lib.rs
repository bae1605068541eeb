//! # Backtrack History
//!
//! Bounded undo/redo built on the Backtrack diff algebra.
//!
//! This crate provides:
//! - A bounded linear history stack with a movable cursor
//! - Undoable groups: batches of steps recorded as one entry, optionally
//!   merged into an earlier entry
//! - Asynchronous steps resolved by later completion actions, in any order
//! - Forward and reverse diff replay
//!
//! ## Example
//!
//! ```rust
//! use backtrack_diff::{algebra, Value};
//! use backtrack_history::{Step, Store, UndoRedo, UndoRedoConfig, UndoableGroup};
//!
//! #[derive(Clone)]
//! struct Bump;
//!
//! impl Step for Bump {
//!     fn signature(&self) -> &str {
//!         "bump"
//!     }
//! }
//!
//! struct Counter(Value);
//!
//! impl Store for Counter {
//!     type State = Value;
//!     type Action = Bump;
//!
//!     fn state(&self) -> Value {
//!         self.0.clone()
//!     }
//!
//!     fn apply(&mut self, _: &Bump) {
//!         let next = self.0.as_int().unwrap_or_default() + 1;
//!         self.0 = Value::from(next);
//!     }
//!
//!     fn restore(&mut self, state: Value) {
//!         self.0 = state;
//!     }
//! }
//!
//! let mut store = Counter(Value::from(0));
//! let mut history = UndoRedo::new(algebra::identity(), UndoRedoConfig::default()).unwrap();
//!
//! history.dispatch_group(&mut store, UndoableGroup::new().with(Bump));
//! assert_eq!(store.state(), Value::from(1));
//!
//! let undone = history.undo(&store.state()).unwrap();
//! assert_eq!(undone.state(), &Value::from(0));
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod group;
pub mod replay;
pub mod stack;

// Coordinator exports
pub use coordinator::{
    Command, Dispatch, GroupOutcome, HistoryEntry, StateRestored, Store, UndoRedo,
};

// Group exports
pub use group::{GroupId, GroupStep, MergeTarget, Step, StepKind, UndoableGroup};

// Stack exports
pub use stack::BoundedHistoryStack;

// Replay exports
pub use replay::{forward_apply_diffs, reverse_apply_diffs};

// Config exports
pub use config::{UndoRedoConfig, UndoRedoConfigBuilder};

// Error exports
pub use error::{HistoryError, Result};
