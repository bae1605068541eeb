//! Undoable groups: batches of host steps recorded as one history entry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use ulid::Ulid;

/// Unique identifier for an undoable group.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    /// Generate a fresh ID.
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Get the ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A host action as seen by the coordinator.
pub trait Step {
    /// Action type name, matched against completion signatures.
    fn signature(&self) -> &str;

    /// Correlates an asynchronous step's start with its completion.
    fn correlation_key(&self) -> Option<&str> {
        None
    }
}

/// How a step resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepKind {
    /// Resolves when the step itself is applied.
    Sync,
    /// The step starts work; a later action with the same correlation key
    /// and one of these signatures resolves it.
    Async { completions: BTreeSet<String> },
}

#[derive(Clone, Debug)]
pub struct GroupStep<A> {
    pub action: A,
    pub kind: StepKind,
}

/// Where a completed group's diffs go.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MergeTarget {
    /// Push a new history entry.
    #[default]
    NewEntry,
    /// Append to the entry at the current position.
    Last { drop_tail: bool },
    /// Append to the entry that already contains this group.
    Group(GroupId),
}

/// A batch of steps recorded (or merged) as a single undo unit.
///
/// ```rust
/// use backtrack_history::{Step, UndoableGroup};
///
/// #[derive(Clone)]
/// struct Rename(String);
///
/// impl Step for Rename {
///     fn signature(&self) -> &str {
///         "rename"
///     }
/// }
///
/// let first = UndoableGroup::new().with(Rename("a".into()));
/// let follow_up = UndoableGroup::new()
///     .with(Rename("b".into()))
///     .merge_with_group(first.id());
/// assert_eq!(follow_up.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct UndoableGroup<A> {
    id: GroupId,
    steps: Vec<GroupStep<A>>,
    merge: MergeTarget,
}

impl<A> Default for UndoableGroup<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> UndoableGroup<A> {
    /// Create an empty group with a fresh ID.
    pub fn new() -> Self {
        Self {
            id: GroupId::new(),
            steps: Vec::new(),
            merge: MergeTarget::NewEntry,
        }
    }

    /// Get the group ID.
    pub fn id(&self) -> &GroupId {
        &self.id
    }

    /// Get the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the group has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get where the group lands in history.
    pub fn merge_target(&self) -> &MergeTarget {
        &self.merge
    }

    /// Add a synchronous step.
    pub fn with(mut self, action: A) -> Self {
        self.steps.push(GroupStep { action, kind: StepKind::Sync });
        self
    }

    /// Add an asynchronous step resolved by any of `completions`.
    pub fn with_async<I, S>(mut self, action: A, completions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let completions = completions.into_iter().map(Into::into).collect();
        self.steps.push(GroupStep {
            action,
            kind: StepKind::Async { completions },
        });
        self
    }

    /// Merge into the most recently applied entry, keeping redo history.
    pub fn merge_with_last(mut self) -> Self {
        self.merge = MergeTarget::Last { drop_tail: false };
        self
    }

    /// Merge into the most recently applied entry and discard redo history.
    pub fn merge_with_last_dropping_tail(mut self) -> Self {
        self.merge = MergeTarget::Last { drop_tail: true };
        self
    }

    /// Merge into the entry that recorded `group`.
    pub fn merge_with_group(mut self, group: &GroupId) -> Self {
        self.merge = MergeTarget::Group(group.clone());
        self
    }

    pub(crate) fn into_parts(self) -> (GroupId, Vec<GroupStep<A>>, MergeTarget) {
        (self.id, self.steps, self.merge)
    }
}
