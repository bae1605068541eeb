//! End-to-end coordinator scenarios against a small record-backed store.
//!
//! The store tracks `counter1` and `counter2`; `ignored` and `loading`
//! change freely but are never recorded.

use backtrack_diff::{algebra, DynDifferencer, Value};
use backtrack_history::{
    Command, Dispatch, GroupOutcome, StateRestored, Step, Store, UndoRedo, UndoRedoConfig,
    UndoableGroup,
};

const FULFILLED: &str = "fetch/fulfilled";
const REJECTED: &str = "fetch/rejected";

#[derive(Clone, Debug, PartialEq)]
enum Action {
    Increment(&'static str),
    FetchStarted { request: String },
    FetchFulfilled { request: String, field: &'static str, value: i64 },
    FetchRejected { request: String },
}

impl Step for Action {
    fn signature(&self) -> &str {
        match self {
            Action::Increment(_) => "counter/increment",
            Action::FetchStarted { .. } => "fetch/pending",
            Action::FetchFulfilled { .. } => FULFILLED,
            Action::FetchRejected { .. } => REJECTED,
        }
    }

    fn correlation_key(&self) -> Option<&str> {
        match self {
            Action::Increment(_) => None,
            Action::FetchStarted { request }
            | Action::FetchFulfilled { request, .. }
            | Action::FetchRejected { request } => Some(request.as_str()),
        }
    }
}

fn started(request: &str) -> Action {
    Action::FetchStarted { request: request.to_string() }
}

fn fulfilled(request: &str, field: &'static str, value: i64) -> Action {
    Action::FetchFulfilled { request: request.to_string(), field, value }
}

fn rejected(request: &str) -> Action {
    Action::FetchRejected { request: request.to_string() }
}

struct TestStore {
    state: Value,
}

impl TestStore {
    fn new() -> Self {
        Self {
            state: Value::record([
                ("counter1", Value::from(0)),
                ("counter2", Value::from(0)),
                ("ignored", Value::from(0)),
                ("loading", Value::from(false)),
            ]),
        }
    }

    fn counters(&self) -> (i64, i64) {
        counters(&self.state)
    }

    fn int(&self, field: &str) -> i64 {
        self.state.field(field).as_int().unwrap_or_default()
    }
}

impl Store for TestStore {
    type State = Value;
    type Action = Action;

    fn state(&self) -> Value {
        self.state.clone()
    }

    fn apply(&mut self, action: &Action) {
        self.state = match action {
            Action::Increment(field) => {
                let next = self.int(field) + 1;
                self.state.with_field(*field, Value::from(next))
            }
            Action::FetchStarted { .. } => self.state.with_field("loading", Value::from(true)),
            Action::FetchFulfilled { field, value, .. } => self
                .state
                .with_field("loading", Value::from(false))
                .with_field(*field, Value::from(*value)),
            Action::FetchRejected { .. } => self.state.with_field("loading", Value::from(false)),
        };
    }

    fn restore(&mut self, state: Value) {
        self.state = state;
    }
}

type Coordinator = UndoRedo<Value, Action, DynDifferencer>;

fn counters(state: &Value) -> (i64, i64) {
    (
        state.field("counter1").as_int().unwrap_or_default(),
        state.field("counter2").as_int().unwrap_or_default(),
    )
}

fn coordinator_with_capacity(max: usize) -> Coordinator {
    let config = UndoRedoConfig::builder().max_stored_changes(max).build().unwrap();
    let differencer = algebra::record([("counter1", algebra::identity()), ("counter2", algebra::identity())]);
    UndoRedo::new(differencer, config).unwrap()
}

fn coordinator() -> Coordinator {
    coordinator_with_capacity(UndoRedoConfig::default().max_stored_changes)
}

fn increment(field: &'static str) -> UndoableGroup<Action> {
    UndoableGroup::new().with(Action::Increment(field))
}

fn undo(history: &mut Coordinator, store: &mut TestStore) -> Option<(i64, i64)> {
    history.handle(store, Command::Undo).map(|restored| counters(restored.state()))
}

fn redo(history: &mut Coordinator, store: &mut TestStore) -> Option<(i64, i64)> {
    history.handle(store, Command::Redo).map(|restored| counters(restored.state()))
}

#[test]
fn test_interleaved_counters_skip_untracked_changes() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    assert_eq!(history.dispatch_group(&mut store, increment("counter1")), Some(GroupOutcome::Pushed));
    assert_eq!(history.dispatch_group(&mut store, increment("ignored")), Some(GroupOutcome::Discarded));
    assert_eq!(history.dispatch_group(&mut store, increment("counter2")), Some(GroupOutcome::Pushed));
    assert_eq!(store.counters(), (1, 1));
    assert_eq!(history.history().len(), 2);

    assert_eq!(undo(&mut history, &mut store), Some((1, 0)));
    assert_eq!(undo(&mut history, &mut store), Some((0, 0)));
    assert_eq!(undo(&mut history, &mut store), None);
    assert_eq!(store.int("ignored"), 1);

    assert_eq!(redo(&mut history, &mut store), Some((1, 0)));
    assert_eq!(redo(&mut history, &mut store), Some((1, 1)));
    assert_eq!(redo(&mut history, &mut store), None);
    assert_eq!(store.int("ignored"), 1);
}

#[test]
fn test_new_group_after_undo_truncates_redo() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    history.dispatch_group(&mut store, increment("counter1"));
    history.dispatch_group(&mut store, increment("counter1"));
    assert_eq!(undo(&mut history, &mut store), Some((1, 0)));

    history.dispatch_group(&mut store, increment("counter2"));
    assert_eq!(store.counters(), (1, 1));
    assert!(!history.can_redo());
    assert_eq!(redo(&mut history, &mut store), None);

    assert_eq!(undo(&mut history, &mut store), Some((1, 0)));
    assert_eq!(undo(&mut history, &mut store), Some((0, 0)));
}

#[test]
fn test_undo_event_carries_steps() {
    let mut store = TestStore::new();
    let mut history = coordinator();
    let group = UndoableGroup::new()
        .with(Action::Increment("counter1"))
        .with(Action::Increment("ignored"))
        .with(Action::Increment("counter2"));
    history.dispatch_group(&mut store, group);

    match history.handle(&mut store, Command::Undo) {
        Some(StateRestored::Undone { state, steps }) => {
            assert_eq!(counters(&state), (0, 0));
            assert_eq!(
                steps,
                vec![
                    Action::Increment("counter1"),
                    Action::Increment("ignored"),
                    Action::Increment("counter2"),
                ]
            );
        }
        other => panic!("expected undo, got {other:?}"),
    }
    // only the two tracked steps produced diffs
    assert_eq!(history.history().iter().next().map(|e| e.diffs.len()), Some(2));

    assert!(matches!(
        history.handle(&mut store, Command::Redo),
        Some(StateRestored::Redone { .. })
    ));
    assert_eq!(store.counters(), (1, 1));
}

#[test]
fn test_merge_with_last_undoes_in_one_step() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    let first = increment("counter1");
    let first_id = first.id().clone();
    history.dispatch_group(&mut store, first);

    let outcome = history.dispatch_group(&mut store, increment("counter2").merge_with_last());
    assert_eq!(
        outcome,
        Some(GroupOutcome::Merged {
            into: first_id,
            dropped_tail: false,
        })
    );
    assert_eq!(history.history().len(), 1);
    assert_eq!(store.counters(), (1, 1));

    assert_eq!(undo(&mut history, &mut store), Some((0, 0)));
    assert_eq!(undo(&mut history, &mut store), None);
    assert_eq!(redo(&mut history, &mut store), Some((1, 1)));
}

#[test]
fn test_merge_with_last_on_empty_history_pushes() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    let outcome = history.dispatch_group(&mut store, increment("counter1").merge_with_last());
    assert_eq!(outcome, Some(GroupOutcome::Pushed));
    assert_eq!(history.history().len(), 1);
}

#[test]
fn test_merge_with_last_keeps_redo_tail() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    history.dispatch_group(&mut store, increment("counter1"));
    history.dispatch_group(&mut store, increment("counter1"));
    assert_eq!(undo(&mut history, &mut store), Some((1, 0)));

    history.dispatch_group(&mut store, increment("counter2").merge_with_last());
    assert_eq!(store.counters(), (1, 1));
    assert!(history.can_redo());
    assert_eq!(redo(&mut history, &mut store), Some((2, 1)));
}

#[test]
fn test_merge_with_last_dropping_tail() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    history.dispatch_group(&mut store, increment("counter1"));
    history.dispatch_group(&mut store, increment("counter1"));
    assert_eq!(undo(&mut history, &mut store), Some((1, 0)));

    let outcome = history.dispatch_group(&mut store, increment("counter2").merge_with_last_dropping_tail());
    assert!(matches!(outcome, Some(GroupOutcome::Merged { dropped_tail: true, .. })));
    assert_eq!(history.history().len(), 1);
    assert_eq!(redo(&mut history, &mut store), None);
    assert_eq!(undo(&mut history, &mut store), Some((0, 0)));
}

#[test]
fn test_merge_with_group() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    let first = increment("counter1");
    let first_id = first.id().clone();
    history.dispatch_group(&mut store, first);
    history.dispatch_group(&mut store, increment("counter2"));

    let follow_up = increment("counter1").merge_with_group(&first_id);
    let follow_up_id = follow_up.id().clone();
    let outcome = history.dispatch_group(&mut store, follow_up);
    assert_eq!(
        outcome,
        Some(GroupOutcome::Merged {
            into: first_id.clone(),
            dropped_tail: false,
        })
    );
    assert_eq!(store.counters(), (2, 1));
    assert_eq!(history.history().len(), 2);

    // a merged group is addressable as a merge target too
    let outcome = history.dispatch_group(&mut store, increment("counter1").merge_with_group(&follow_up_id));
    assert!(matches!(outcome, Some(GroupOutcome::Merged { into, .. }) if into == first_id));
    assert_eq!(store.counters(), (3, 1));

    assert_eq!(undo(&mut history, &mut store), Some((3, 0)));
    assert_eq!(undo(&mut history, &mut store), Some((0, 0)));
    assert_eq!(undo(&mut history, &mut store), None);
}

#[test]
fn test_merge_with_unknown_group_pushes() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    history.dispatch_group(&mut store, increment("counter1"));
    let stranger = UndoableGroup::<Action>::new();
    let outcome = history.dispatch_group(&mut store, increment("counter2").merge_with_group(stranger.id()));
    assert_eq!(outcome, Some(GroupOutcome::Pushed));
    assert_eq!(history.history().len(), 2);
}

#[test]
fn test_sync_then_async_step() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    let group = UndoableGroup::new()
        .with(Action::Increment("counter1"))
        .with_async(started("r1"), [FULFILLED, REJECTED]);
    let id = group.id().clone();

    assert_eq!(history.dispatch_group(&mut store, group), None);
    assert!(history.is_pending(&id));
    assert!(!history.can_undo());

    let dispatched = history.dispatch(&mut store, fulfilled("r1", "counter2", 5));
    assert_eq!(
        dispatched,
        Dispatch::Captured {
            group: id,
            outcome: Some(GroupOutcome::Pushed),
        }
    );
    assert_eq!(store.counters(), (1, 5));

    let undone = history.handle(&mut store, Command::Undo).unwrap();
    assert_eq!(counters(undone.state()), (0, 0));
    assert_eq!(
        undone.steps(),
        &[Action::Increment("counter1"), fulfilled("r1", "counter2", 5)]
    );
}

#[test]
fn test_async_then_sync_keeps_step_order() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    let group = UndoableGroup::new()
        .with_async(started("r1"), [FULFILLED, REJECTED])
        .with(Action::Increment("counter1"));
    history.dispatch_group(&mut store, group);
    assert_eq!(store.counters(), (1, 0));

    history.dispatch(&mut store, fulfilled("r1", "counter2", 10));
    let undone = history.handle(&mut store, Command::Undo).unwrap();
    assert_eq!(
        undone.steps(),
        &[fulfilled("r1", "counter2", 10), Action::Increment("counter1")]
    );
    assert_eq!(store.counters(), (0, 0));
}

#[test]
fn test_async_steps_resolving_out_of_order() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    let group = UndoableGroup::new()
        .with_async(started("r1"), [FULFILLED])
        .with_async(started("r2"), [FULFILLED]);
    let id = group.id().clone();
    assert_eq!(history.dispatch_group(&mut store, group), None);

    assert_eq!(
        history.dispatch(&mut store, fulfilled("r2", "counter2", 7)),
        Dispatch::Captured {
            group: id.clone(),
            outcome: None,
        }
    );
    assert_eq!(
        history.dispatch(&mut store, fulfilled("r1", "counter1", 3)),
        Dispatch::Captured {
            group: id,
            outcome: Some(GroupOutcome::Pushed),
        }
    );

    let entry = history.history().iter().next().unwrap();
    assert_eq!(entry.diffs.len(), 2);
    assert_eq!(
        entry.steps,
        vec![fulfilled("r1", "counter1", 3), fulfilled("r2", "counter2", 7)]
    );

    assert_eq!(undo(&mut history, &mut store), Some((0, 0)));
    assert_eq!(redo(&mut history, &mut store), Some((3, 7)));
}

#[test]
fn test_interleaved_async_groups() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    let first = UndoableGroup::new().with_async(started("r1"), [FULFILLED]);
    let second = UndoableGroup::new().with_async(started("r2"), [FULFILLED]);
    let (first_id, second_id) = (first.id().clone(), second.id().clone());
    history.dispatch_group(&mut store, first);
    history.dispatch_group(&mut store, second);
    assert_eq!(history.pending_groups().count(), 2);

    let dispatched = history.dispatch(&mut store, fulfilled("r2", "counter2", 2));
    assert!(matches!(dispatched, Dispatch::Captured { group, outcome: Some(GroupOutcome::Pushed) } if group == second_id));
    assert!(history.is_pending(&first_id));

    history.dispatch_group(&mut store, increment("counter1"));
    let dispatched = history.dispatch(&mut store, fulfilled("r1", "counter1", 9));
    assert!(matches!(dispatched, Dispatch::Captured { group, outcome: Some(GroupOutcome::Pushed) } if group == first_id));
    assert_eq!(history.history().len(), 3);

    assert_eq!(undo(&mut history, &mut store), Some((1, 2)));
    assert_eq!(undo(&mut history, &mut store), Some((0, 2)));
    assert_eq!(undo(&mut history, &mut store), Some((0, 0)));
}

#[test]
fn test_rejected_fetch_is_discarded() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    let group = UndoableGroup::new().with_async(started("r1"), [FULFILLED, REJECTED]);
    history.dispatch_group(&mut store, group);
    assert_eq!(store.state.field("loading"), Value::from(true));

    let dispatched = history.dispatch(&mut store, rejected("r1"));
    assert!(matches!(dispatched, Dispatch::Captured { outcome: Some(GroupOutcome::Discarded), .. }));
    assert_eq!(store.state.field("loading"), Value::from(false));
    assert!(!history.can_undo());
}

#[test]
fn test_unexpected_signature_passes_through() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    let group = UndoableGroup::new().with_async(started("r1"), [FULFILLED]);
    let id = group.id().clone();
    history.dispatch_group(&mut store, group);

    assert_eq!(history.dispatch(&mut store, rejected("r1")), Dispatch::PassedThrough);
    assert_eq!(history.dispatch(&mut store, Action::Increment("counter1")), Dispatch::PassedThrough);
    assert!(history.is_pending(&id));
    assert_eq!(store.counters(), (1, 0));
    assert!(!history.can_undo());
}

#[test]
fn test_clear_all_changes_forgets_pending_groups() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    history.dispatch_group(&mut store, increment("counter1"));
    history.dispatch_group(&mut store, UndoableGroup::new().with_async(started("r1"), [FULFILLED]));
    assert!(history.handle(&mut store, Command::ClearAllChanges).is_none());
    assert!(!history.can_undo());
    assert_eq!(history.pending_groups().count(), 0);

    // a late completion is applied but not recorded
    assert_eq!(history.dispatch(&mut store, fulfilled("r1", "counter2", 4)), Dispatch::PassedThrough);
    assert_eq!(store.counters(), (1, 4));
    assert_eq!(undo(&mut history, &mut store), None);
}

#[test]
fn test_capacity_evicts_oldest_group() {
    let mut store = TestStore::new();
    let mut history = coordinator_with_capacity(2);

    for _ in 0..3 {
        history.dispatch_group(&mut store, increment("counter1"));
    }
    assert_eq!(history.history().len(), 2);
    assert_eq!(undo(&mut history, &mut store), Some((2, 0)));
    assert_eq!(undo(&mut history, &mut store), Some((1, 0)));
    assert_eq!(undo(&mut history, &mut store), None);
}

#[test]
fn test_async_step_without_correlation_key_resolves_empty() {
    let mut store = TestStore::new();
    let mut history = coordinator();

    let group = UndoableGroup::new()
        .with_async(Action::Increment("counter1"), [FULFILLED])
        .with(Action::Increment("counter2"));
    assert_eq!(history.dispatch_group(&mut store, group), Some(GroupOutcome::Pushed));
    assert_eq!(store.counters(), (1, 1));

    assert_eq!(undo(&mut history, &mut store), Some((1, 0)));
}
