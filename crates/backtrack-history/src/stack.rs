//! Bounded undo/redo stack.
//!
//! A single position splits the entries into an undoable prefix and a
//! redoable suffix:
//!
//! ```text
//!   [ e0  e1  e2 | e3  e4 ]
//!     undoable   ^  redoable
//!             position
//! ```
//!
//! - Pushing truncates the redoable suffix first.
//! - Over capacity, the oldest entry is evicted.
//! - Undo/redo past either end is a no-op returning `None`.

use std::collections::VecDeque;

/// Fixed-capacity history with a movable position.
#[derive(Clone, Debug)]
pub struct BoundedHistoryStack<T> {
    entries: VecDeque<T>,
    /// Number of entries at or before the position.
    applied: usize,
    capacity: usize,
}

impl<T> BoundedHistoryStack<T> {
    /// Create a stack holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            applied: 0,
            capacity,
        }
    }

    /// Get the maximum number of stored entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the most recently applied entry, `None` when nothing is applied.
    pub fn position(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    /// Check whether an entry is below the cursor.
    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    /// Check whether an entry is above the cursor.
    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    /// Record a new entry after the current position.
    pub fn put_change(&mut self, entry: T) {
        self.entries.truncate(self.applied);
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.applied = self.entries.len();
    }

    /// Step back, returning the entry just undone.
    #[must_use = "the undone entry carries the diffs to reverse"]
    pub fn undo(&mut self) -> Option<&T> {
        if self.applied == 0 {
            return None;
        }
        self.applied -= 1;
        self.entries.get(self.applied)
    }

    /// Step forward, returning the entry just redone.
    #[must_use = "the redone entry carries the diffs to replay"]
    pub fn redo(&mut self) -> Option<&T> {
        if self.applied >= self.entries.len() {
            return None;
        }
        self.applied += 1;
        self.entries.get(self.applied - 1)
    }

    /// Entry at the current position.
    pub fn peek(&self) -> Option<&T> {
        self.position().and_then(|pos| self.entries.get(pos))
    }

    /// Mutable access to the entry at the current position.
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.position().and_then(|pos| self.entries.get_mut(pos))
    }

    /// Discard every entry after the current position.
    pub fn drop_tail(&mut self) {
        self.entries.truncate(self.applied);
    }

    /// First entry matching `predicate`, searching both undoable and
    /// redoable entries from oldest to newest.
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&T> {
        self.entries.iter().find(|entry| predicate(*entry))
    }

    /// Mutable variant of [`find`](Self::find).
    pub fn find_mut(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Option<&mut T> {
        self.entries.iter_mut().find(|entry| predicate(&**entry))
    }

    /// Remove every entry and reset the cursor.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.applied = 0;
    }

    /// All retained entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Entries that `undo` would visit, oldest first.
    pub fn undoable(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().take(self.applied)
    }

    /// Entries that `redo` would visit, oldest first.
    pub fn redoable(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().skip(self.applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_of(capacity: usize, items: impl IntoIterator<Item = i32>) -> BoundedHistoryStack<i32> {
        let mut stack = BoundedHistoryStack::new(capacity);
        for item in items {
            stack.put_change(item);
        }
        stack
    }

    #[test]
    fn test_empty_stack_is_inert() {
        let mut stack: BoundedHistoryStack<i32> = BoundedHistoryStack::new(4);
        assert_eq!(stack.undo(), None);
        assert_eq!(stack.redo(), None);
        assert_eq!(stack.peek(), None);
        assert_eq!(stack.position(), None);
    }

    #[test]
    fn test_capacity_two() {
        let mut stack = stack_of(2, [0, 1, 2]);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.undo(), Some(&2));
        assert_eq!(stack.undo(), Some(&1));
        assert_eq!(stack.undo(), None);
    }

    #[test]
    fn test_eviction_then_undo_redo() {
        let mut stack = stack_of(3, [0, 1, 2, 3]);
        assert_eq!(stack.undo(), Some(&3));
        assert_eq!(stack.undo(), Some(&2));
        assert_eq!(stack.undo(), Some(&1));
        assert_eq!(stack.undo(), None);
        assert_eq!(stack.redo(), Some(&1));
        assert_eq!(stack.redo(), Some(&2));
        assert_eq!(stack.redo(), Some(&3));
        assert_eq!(stack.redo(), None);
    }

    #[test]
    fn test_put_change_truncates_redo() {
        let mut stack = stack_of(5, [0, 1, 2]);
        assert_eq!(stack.undo(), Some(&2));
        stack.put_change(9);
        assert_eq!(stack.redo(), None);
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![0, 1, 9]);
    }

    #[test]
    fn test_drop_tail() {
        let mut stack = stack_of(5, [0, 1, 2, 3]);
        assert_eq!(stack.undo(), Some(&3));
        assert_eq!(stack.undo(), Some(&2));
        stack.drop_tail();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.redo(), None);
        assert_eq!(stack.undo(), Some(&1));
        assert_eq!(stack.undo(), Some(&0));
        assert_eq!(stack.undo(), None);
    }

    #[test]
    fn test_peek_follows_position() {
        let mut stack = stack_of(5, [0, 1]);
        assert_eq!(stack.peek(), Some(&1));
        let _ = stack.undo();
        assert_eq!(stack.peek(), Some(&0));
        let _ = stack.undo();
        assert_eq!(stack.peek(), None);
    }

    #[test]
    fn test_find_searches_redoable_entries() {
        let mut stack = stack_of(5, [10, 20, 30]);
        let _ = stack.undo();
        let _ = stack.undo();
        assert_eq!(stack.find(|e| *e == 30), Some(&30));
        assert_eq!(stack.find(|e| *e == 99), None);
        if let Some(entry) = stack.find_mut(|e| *e == 20) {
            *entry = 21;
        }
        assert_eq!(stack.redo(), Some(&21));
    }

    #[test]
    fn test_clear_resets_position() {
        let mut stack = stack_of(5, [0, 1]);
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.undo(), None);
        stack.put_change(7);
        assert_eq!(stack.peek(), Some(&7));
    }

    #[test]
    fn test_undoable_and_redoable_split() {
        let mut stack = stack_of(5, [0, 1, 2]);
        let _ = stack.undo();
        assert_eq!(stack.undoable().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(stack.redoable().copied().collect::<Vec<_>>(), vec![2]);
        assert!(stack.can_undo() && stack.can_redo());
    }
}
