//! Shared undo session over a host store.

use crate::error::{Result, SdkError};
use backtrack_diff::Differencer;
use backtrack_history::{
    Command, Dispatch, GroupId, GroupOutcome, StateRestored, Store, UndoRedo, UndoRedoConfig,
    UndoableGroup,
};
use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Events emitted by a session.
#[derive(Clone, Debug)]
pub enum SessionEvent<S, A> {
    /// A group finished and was pushed, merged or discarded.
    Recorded { group: GroupId, outcome: GroupOutcome },
    /// An undo or redo committed a new state to the store.
    Restored(StateRestored<S, A>),
    /// All history and pending groups were cleared.
    Cleared,
}

type History<St, D> = UndoRedo<<St as Store>::State, <St as Store>::Action, D>;

/// A store and its undo/redo history, shareable across tasks.
///
/// Every operation takes the history lock before the store lock.
pub struct UndoSession<St, D>
where
    St: Store,
    D: Differencer<St::State>,
{
    history: Arc<Mutex<History<St, D>>>,
    store: Arc<RwLock<St>>,
    event_tx: broadcast::Sender<SessionEvent<St::State, St::Action>>,
}

impl<St, D> Clone for UndoSession<St, D>
where
    St: Store,
    D: Differencer<St::State>,
{
    fn clone(&self) -> Self {
        Self {
            history: Arc::clone(&self.history),
            store: Arc::clone(&self.store),
            event_tx: self.event_tx.clone(),
        }
    }
}

impl<St, D> UndoSession<St, D>
where
    St: Store,
    St::State: Clone,
    St::Action: backtrack_history::Step + Clone,
    D: Differencer<St::State>,
{
    /// Create a new session around `store`.
    pub fn new(store: St, differencer: D, config: UndoRedoConfig) -> Result<Self> {
        let history = UndoRedo::new(differencer, config)?;
        let (event_tx, _) = broadcast::channel(100);
        Ok(Self {
            history: Arc::new(Mutex::new(history)),
            store: Arc::new(RwLock::new(store)),
            event_tx,
        })
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent<St::State, St::Action>> {
        self.event_tx.subscribe()
    }

    /// Snapshot of the store's current state.
    pub fn state(&self) -> St::State {
        self.store.read().state()
    }

    /// Read the store directly.
    pub fn with_store<R>(&self, f: impl FnOnce(&St) -> R) -> R {
        f(&self.store.read())
    }

    /// Check whether there is an entry to undo.
    pub fn can_undo(&self) -> bool {
        self.history.lock().can_undo()
    }

    /// Check whether there is an entry to redo.
    pub fn can_redo(&self) -> bool {
        self.history.lock().can_redo()
    }

    /// Number of entries currently held in history.
    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    /// IDs of groups still waiting on asynchronous steps.
    pub fn pending_groups(&self) -> Vec<GroupId> {
        self.history.lock().pending_groups().cloned().collect()
    }

    /// Dispatch every step of `group`.
    pub fn dispatch_group(&self, group: UndoableGroup<St::Action>) -> Option<GroupOutcome> {
        let id = group.id().clone();
        let mut history = self.history.lock();
        let mut store = self.store.write();
        let outcome = history.dispatch_group(&mut *store, group);
        drop(store);
        drop(history);

        if let Some(outcome) = &outcome {
            self.publish(SessionEvent::Recorded {
                group: id,
                outcome: outcome.clone(),
            });
        }
        outcome
    }

    /// Dispatch a single action, routing it to a pending group if it completes one.
    pub fn dispatch(&self, action: St::Action) -> Dispatch {
        let mut history = self.history.lock();
        let mut store = self.store.write();
        let dispatched = history.dispatch(&mut *store, action);
        drop(store);
        drop(history);

        if let Dispatch::Captured {
            group,
            outcome: Some(outcome),
        } = &dispatched
        {
            self.publish(SessionEvent::Recorded {
                group: group.clone(),
                outcome: outcome.clone(),
            });
        }
        dispatched
    }

    /// Undo the most recent entry.
    pub fn undo(&self) -> Option<StateRestored<St::State, St::Action>> {
        self.run(Command::Undo)
    }

    /// Redo the most recently undone entry.
    pub fn redo(&self) -> Option<StateRestored<St::State, St::Action>> {
        self.run(Command::Redo)
    }

    /// Drop all history and pending groups.
    pub fn clear_all_changes(&self) {
        self.run(Command::ClearAllChanges);
        self.publish(SessionEvent::Cleared);
    }

    /// Give up on a group whose asynchronous steps will never complete.
    pub fn abandon_group(&self, group: &GroupId) -> bool {
        self.history.lock().abandon_group(group)
    }

    fn run(&self, command: Command) -> Option<StateRestored<St::State, St::Action>> {
        let mut history = self.history.lock();
        let mut store = self.store.write();
        let restored = history.handle(&mut *store, command);
        drop(store);
        drop(history);

        if let Some(restored) = &restored {
            self.publish(SessionEvent::Restored(restored.clone()));
        }
        restored
    }

    fn publish(&self, event: SessionEvent<St::State, St::Action>) {
        // no subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

impl<St, D> UndoSession<St, D>
where
    St: Store + Send + Sync + 'static,
    St::State: Clone + Send + Sync + 'static,
    St::Action: backtrack_history::Step + Clone + Send + Sync + 'static,
    D: Differencer<St::State> + 'static,
    D::Diff: Send + 'static,
{
    /// Run an asynchronous step's completion on the tokio runtime and
    /// dispatch the action it resolves to.
    pub fn spawn_completion<F>(&self, completion: F) -> CompletionHandle
    where
        F: Future<Output = St::Action> + Send + 'static,
    {
        let session = self.clone();
        let task = tokio::spawn(async move {
            let action = completion.await;
            session.dispatch(action)
        });
        CompletionHandle { task }
    }
}

/// Handle to a spawned completion.
pub struct CompletionHandle {
    task: JoinHandle<Dispatch>,
}

impl CompletionHandle {
    /// Wait for the completion to be dispatched.
    pub async fn join(self) -> Result<Dispatch> {
        self.task.await.map_err(|e| {
            tracing::warn!(error = %e, "completion task failed");
            SdkError::Completion(e.to_string())
        })
    }

    /// Abort the completion task.
    pub fn abort(&self) {
        self.task.abort();
    }
}
