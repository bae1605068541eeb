//! Undo/redo coordinator.
//!
//! Drives a host [`Store`] through undoable groups, captures a diff around
//! every step, and records each completed group on a
//! [`BoundedHistoryStack`].
//!
//! Group lifecycle:
//! - **Collecting**: steps dispatched, diffs accumulating per step slot
//! - **Complete**: every step resolved; diffs are pushed, merged or discarded
//!
//! Asynchronous steps resolve later, when an action carrying the same
//! correlation key and one of the step's completion signatures is
//! dispatched. Completions may arrive in any order and interleave with
//! other groups; captured diffs are always kept in step order.

use crate::config::UndoRedoConfig;
use crate::error::Result;
use crate::group::{GroupId, MergeTarget, Step, StepKind, UndoableGroup};
use crate::replay::{forward_apply_diffs, reverse_apply_diffs};
use crate::stack::BoundedHistoryStack;
use backtrack_diff::{Differencer, ForwardReverse};
use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;

/// The host's state container.
pub trait Store {
    type State;
    type Action;

    /// Snapshot of the current state.
    fn state(&self) -> Self::State;

    /// Run an action against the state.
    fn apply(&mut self, action: &Self::Action);

    /// Replace the state wholesale with a restored snapshot.
    fn restore(&mut self, state: Self::State);
}

/// One undoable unit on the history stack.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry<D, A> {
    /// Non-empty diffs in recording order.
    pub diffs: Vec<ForwardReverse<D>>,
    /// Steps that produced the diffs.
    pub steps: Vec<A>,
    /// Groups recorded into this entry, the creating group first.
    pub group_ids: Vec<GroupId>,
}

impl<D, A> HistoryEntry<D, A> {
    /// Check whether `group` was recorded in this entry.
    pub fn contains_group(&self, group: &GroupId) -> bool {
        self.group_ids.contains(group)
    }
}

/// State produced by an undo or redo, for the host to commit.
#[derive(Clone, Debug, PartialEq)]
pub enum StateRestored<S, A> {
    Undone { state: S, steps: Vec<A> },
    Redone { state: S, steps: Vec<A> },
}

impl<S, A> StateRestored<S, A> {
    /// Get the state committed to the store.
    pub fn state(&self) -> &S {
        match self {
            StateRestored::Undone { state, .. } | StateRestored::Redone { state, .. } => state,
        }
    }

    /// Get the steps of the restored entry.
    pub fn steps(&self) -> &[A] {
        match self {
            StateRestored::Undone { steps, .. } | StateRestored::Redone { steps, .. } => steps,
        }
    }

    /// Take the committed state.
    pub fn into_state(self) -> S {
        match self {
            StateRestored::Undone { state, .. } | StateRestored::Redone { state, .. } => state,
        }
    }
}

/// What happened to a group once all its steps resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupOutcome {
    /// No step changed observable state; nothing recorded.
    Discarded,
    /// Recorded as a new history entry.
    Pushed,
    /// Appended to the entry created by `into`.
    Merged { into: GroupId, dropped_tail: bool },
}

/// Result of dispatching an ordinary action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Not part of any pending group; applied as-is.
    PassedThrough,
    /// Resolved an asynchronous step of `group`. `outcome` is set when
    /// that was the group's last outstanding step.
    Captured {
        group: GroupId,
        outcome: Option<GroupOutcome>,
    },
}

/// Commands consumed by [`UndoRedo::handle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
    ClearAllChanges,
}

struct Slot<D, A> {
    completions: BTreeSet<String>,
    resolved: bool,
    diffs: Option<ForwardReverse<D>>,
    action: Option<A>,
}

struct PendingGroup<D, A> {
    slots: Vec<Slot<D, A>>,
    merge: MergeTarget,
}

/// Records undoable groups and moves a store backward and forward through them.
pub struct UndoRedo<S, A, D: Differencer<S>> {
    differencer: D,
    stack: BoundedHistoryStack<HistoryEntry<D::Diff, A>>,
    pending: HashMap<GroupId, PendingGroup<D::Diff, A>>,
    awaiting: HashMap<String, (GroupId, usize)>,
    _state: PhantomData<fn() -> S>,
}

impl<S, A, D> UndoRedo<S, A, D>
where
    S: Clone,
    A: Step + Clone,
    D: Differencer<S>,
{
    /// Create a coordinator. Fails on an invalid config.
    pub fn new(differencer: D, config: UndoRedoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            differencer,
            stack: BoundedHistoryStack::new(config.max_stored_changes),
            pending: HashMap::new(),
            awaiting: HashMap::new(),
            _state: PhantomData,
        })
    }

    /// Get the differencer.
    pub fn differencer(&self) -> &D {
        &self.differencer
    }

    /// Get the history stack.
    pub fn history(&self) -> &BoundedHistoryStack<HistoryEntry<D::Diff, A>> {
        &self.stack
    }

    /// Number of recorded entries, undoable and redoable.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// True when no history entries are stored.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Check whether there is an entry to undo.
    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    /// Check whether there is an entry to redo.
    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    /// Groups still waiting on asynchronous completions.
    pub fn pending_groups(&self) -> impl Iterator<Item = &GroupId> {
        self.pending.keys()
    }

    /// Check whether `group` still waits on asynchronous steps.
    pub fn is_pending(&self, group: &GroupId) -> bool {
        self.pending.contains_key(group)
    }

    /// Dispatch every step of `group` in order.
    ///
    /// Returns the outcome when the group completed synchronously, `None`
    /// while asynchronous steps are outstanding.
    pub fn dispatch_group<St>(&mut self, store: &mut St, group: UndoableGroup<A>) -> Option<GroupOutcome>
    where
        St: Store<State = S, Action = A>,
    {
        let (id, steps, merge) = group.into_parts();
        let slots = steps
            .iter()
            .map(|step| Slot {
                completions: match &step.kind {
                    StepKind::Sync => BTreeSet::new(),
                    StepKind::Async { completions } => completions.clone(),
                },
                resolved: false,
                diffs: None,
                action: None,
            })
            .collect();
        self.pending.insert(id.clone(), PendingGroup { slots, merge });

        for (slot, step) in steps.into_iter().enumerate() {
            match step.kind {
                StepKind::Sync => self.capture(store, &id, slot, step.action),
                StepKind::Async { .. } => {
                    match step.action.correlation_key() {
                        Some(key) => {
                            self.awaiting.insert(key.to_owned(), (id.clone(), slot));
                        }
                        None => {
                            tracing::warn!(
                                group = %id,
                                signature = step.action.signature(),
                                "async step has no correlation key; resolving without a diff"
                            );
                            self.resolve_without_diff(&id, slot);
                        }
                    }
                    store.apply(&step.action);
                }
            }
        }
        self.finish_if_complete(&id)
    }

    /// Dispatch an action outside of a group dispatch.
    ///
    /// Completions of pending asynchronous steps are diffed and routed to
    /// their group; everything else is applied untracked.
    pub fn dispatch<St>(&mut self, store: &mut St, action: A) -> Dispatch
    where
        St: Store<State = S, Action = A>,
    {
        if let Some((group, slot)) = self.awaiting_slot(&action) {
            if let Some(key) = action.correlation_key() {
                self.awaiting.remove(key);
            }
            self.capture(store, &group, slot, action);
            let outcome = self.finish_if_complete(&group);
            return Dispatch::Captured { group, outcome };
        }
        store.apply(&action);
        Dispatch::PassedThrough
    }

    /// Reverse the entry at the current position against `current`.
    pub fn undo(&mut self, current: &S) -> Option<StateRestored<S, A>> {
        let entry = self.stack.undo()?;
        let state = reverse_apply_diffs(&self.differencer, current, &entry.diffs);
        tracing::debug!(diffs = entry.diffs.len(), groups = entry.group_ids.len(), "undo");
        Some(StateRestored::Undone {
            state,
            steps: entry.steps.clone(),
        })
    }

    /// Replay the entry after the current position against `current`.
    pub fn redo(&mut self, current: &S) -> Option<StateRestored<S, A>> {
        let entry = self.stack.redo()?;
        let state = forward_apply_diffs(&self.differencer, current, &entry.diffs);
        tracing::debug!(diffs = entry.diffs.len(), groups = entry.group_ids.len(), "redo");
        Some(StateRestored::Redone {
            state,
            steps: entry.steps.clone(),
        })
    }

    /// Run a command against `store`, committing any restored state.
    ///
    /// Commands with nothing to act on are inert and return `None`.
    pub fn handle<St>(&mut self, store: &mut St, command: Command) -> Option<StateRestored<S, A>>
    where
        St: Store<State = S, Action = A>,
    {
        let restored = match command {
            Command::Undo => self.undo(&store.state())?,
            Command::Redo => self.redo(&store.state())?,
            Command::ClearAllChanges => {
                self.clear_all_changes();
                return None;
            }
        };
        store.restore(restored.state().clone());
        Some(restored)
    }

    /// Empty the history and forget every pending group.
    pub fn clear_all_changes(&mut self) {
        tracing::debug!(
            entries = self.stack.len(),
            pending = self.pending.len(),
            "clearing all changes"
        );
        self.stack.clear();
        self.pending.clear();
        self.awaiting.clear();
    }

    /// Stop waiting for a group whose asynchronous steps will never resolve.
    /// Nothing is recorded for it. Returns false if the group was not pending.
    pub fn abandon_group(&mut self, group: &GroupId) -> bool {
        if self.pending.remove(group).is_none() {
            return false;
        }
        self.awaiting.retain(|_, (owner, _)| owner != group);
        tracing::warn!(group = %group, "abandoned pending group");
        true
    }

    fn awaiting_slot(&self, action: &A) -> Option<(GroupId, usize)> {
        let (group, slot) = self.awaiting.get(action.correlation_key()?)?;
        let expected = self
            .pending
            .get(group)
            .and_then(|pending| pending.slots.get(*slot))
            .is_some_and(|s| s.completions.contains(action.signature()));
        expected.then(|| (group.clone(), *slot))
    }

    fn capture<St>(&mut self, store: &mut St, group: &GroupId, slot: usize, action: A)
    where
        St: Store<State = S, Action = A>,
    {
        let before = store.state();
        store.apply(&action);
        let after = store.state();
        let diffs = self.differencer.calculate_diffs(&before, &after);
        tracing::trace!(
            group = %group,
            slot,
            signature = action.signature(),
            changed = !diffs.is_empty(),
            "captured step"
        );
        if let Some(s) = self.slot_mut(group, slot) {
            s.resolved = true;
            s.diffs = Some(diffs);
            s.action = Some(action);
        }
    }

    fn resolve_without_diff(&mut self, group: &GroupId, slot: usize) {
        if let Some(s) = self.slot_mut(group, slot) {
            s.resolved = true;
        }
    }

    fn slot_mut(&mut self, group: &GroupId, slot: usize) -> Option<&mut Slot<D::Diff, A>> {
        self.pending
            .get_mut(group)
            .and_then(|pending| pending.slots.get_mut(slot))
    }

    fn finish_if_complete(&mut self, group: &GroupId) -> Option<GroupOutcome> {
        let complete = self
            .pending
            .get(group)
            .is_some_and(|pending| pending.slots.iter().all(|s| s.resolved));
        if !complete {
            return None;
        }
        let pending = self.pending.remove(group)?;
        Some(self.commit(group.clone(), pending))
    }

    fn commit(&mut self, group: GroupId, pending: PendingGroup<D::Diff, A>) -> GroupOutcome {
        let mut diffs = Vec::new();
        let mut steps = Vec::new();
        for slot in pending.slots {
            if let Some(captured) = slot.diffs.filter(|d| !d.is_empty()) {
                diffs.push(captured);
            }
            steps.extend(slot.action);
        }
        if diffs.is_empty() {
            tracing::debug!(group = %group, "group changed nothing; discarded");
            return GroupOutcome::Discarded;
        }

        let (target, drop_tail) = match &pending.merge {
            MergeTarget::NewEntry => (None, false),
            MergeTarget::Last { drop_tail } => (self.stack.peek_mut(), *drop_tail),
            MergeTarget::Group(target) => (self.stack.find_mut(|e| e.contains_group(target)), false),
        };

        let outcome = match target {
            Some(entry) => {
                entry.diffs.extend(diffs);
                entry.steps.extend(steps);
                if !entry.contains_group(&group) {
                    entry.group_ids.push(group.clone());
                }
                let into = entry.group_ids.first().cloned().unwrap_or_else(|| group.clone());
                GroupOutcome::Merged { into, dropped_tail: drop_tail }
            }
            None => {
                self.stack.put_change(HistoryEntry {
                    diffs,
                    steps,
                    group_ids: vec![group.clone()],
                });
                GroupOutcome::Pushed
            }
        };
        if drop_tail && matches!(outcome, GroupOutcome::Merged { .. }) {
            self.stack.drop_tail();
        }
        tracing::debug!(group = %group, outcome = ?outcome, "group recorded");
        outcome
    }
}
