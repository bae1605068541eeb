//! Backtrack SDK - undo/redo for shared application state
//!
//! Wraps a host [`Store`] and the Backtrack undo/redo coordinator behind
//! locks so any number of tasks can dispatch groups, resolve asynchronous
//! steps and undo or redo concurrently.
//!
//! # Quick Start
//!
//! ```rust
//! use backtrack_sdk::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! struct Rename(String);
//!
//! impl Step for Rename {
//!     fn signature(&self) -> &str {
//!         "rename"
//!     }
//! }
//!
//! struct Doc(Value);
//!
//! impl Store for Doc {
//!     type State = Value;
//!     type Action = Rename;
//!
//!     fn state(&self) -> Value {
//!         self.0.clone()
//!     }
//!
//!     fn apply(&mut self, action: &Rename) {
//!         self.0 = self.0.with_field("title", Value::from(action.0.as_str()));
//!     }
//!
//!     fn restore(&mut self, state: Value) {
//!         self.0 = state;
//!     }
//! }
//!
//! let doc = Doc(Value::record([("title", Value::from("draft"))]));
//! let differencer = algebra::record([("title", algebra::identity())]);
//! let session = UndoSession::new(doc, differencer, UndoRedoConfig::default()).unwrap();
//!
//! session.dispatch_group(UndoableGroup::new().with(Rename("final".into())));
//! session.undo();
//! assert_eq!(session.state().field("title"), Value::from("draft"));
//! ```
//!
//! # Architecture
//!
//! - [`session`] - The shared session, its events and completion handles
//! - [`error`] - Error types

pub mod error;
pub mod session;

// Re-exports for convenience
pub use error::{Result, SdkError};
pub use session::{CompletionHandle, SessionEvent, UndoSession};

// Re-export commonly used types from the history and diff crates
pub use backtrack_diff::{algebra, DynDifferencer, Value};
pub use backtrack_history::{
    Dispatch, GroupId, GroupOutcome, StateRestored, Step, Store, UndoRedoConfig, UndoableGroup,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::SdkError;
    pub use crate::session::{SessionEvent, UndoSession};
    pub use backtrack_diff::{algebra, Value};
    pub use backtrack_history::{
        GroupOutcome, StateRestored, Step, Store, UndoRedoConfig, UndoableGroup,
    };
}
