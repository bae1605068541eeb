//! Ordered unique-key reconciliation.
//!
//! Computes a compact edit script between two sequences of unique keys and
//! replays it. The script consists of:
//! - deletes: `(index in from, key)`
//! - inserts: `(index in to, key)`
//! - block moves: contiguous runs of shared keys that changed relative position
//! - item moves: single shared keys that changed relative position
//!
//! Move positions are expressed over the *shared* projections of both
//! sides (from without its deletes, to without its inserts). The reverse
//! script reuses the same move tables and only flips `is_reverse`, swapping
//! which column is read as the source.
//!
//! # Algorithm
//!
//! Walk `from` left to right with a running count of deleted keys. A shared
//! key whose shared position `j` differs from `i - deleted` is moved. Before
//! recording a single move, the walk tries to extend a block: while the next
//! key in `from` equals the next key of the shared projection of `to`, the
//! run grows, and the walk jumps past the whole run.
//!
//! Keys must be unique within one sequence. Duplicates are not detected.

use crate::differencer::{Delta, Differencer, ForwardReverse};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

/// A run of `len` shared keys moved from shared position `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockMove {
    pub from: usize,
    pub to: usize,
    pub len: usize,
}

/// A single shared key moved from shared position `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemMove {
    pub from: usize,
    pub to: usize,
}

/// Non-empty key edit script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEdits<K> {
    /// Read move tables with swapped columns.
    pub is_reverse: bool,
    pub length_before: usize,
    pub length_after: usize,
    pub deletes: Vec<(usize, K)>,
    pub inserts: Vec<(usize, K)>,
    pub block_moves: Arc<[BlockMove]>,
    pub item_moves: Arc<[ItemMove]>,
}

impl<K> KeyEdits<K> {
    fn block_columns(&self, block: &BlockMove) -> (usize, usize) {
        if self.is_reverse {
            (block.to, block.from)
        } else {
            (block.from, block.to)
        }
    }

    fn item_columns(&self, item: &ItemMove) -> (usize, usize) {
        if self.is_reverse {
            (item.to, item.from)
        } else {
            (item.from, item.to)
        }
    }
}

/// Diff over an ordered sequence of unique keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeysDiff<K> {
    #[default]
    Empty,
    Edits(KeyEdits<K>),
}

impl<K> KeysDiff<K> {
    /// True when the key order is unchanged.
    pub fn is_empty(&self) -> bool {
        matches!(self, KeysDiff::Empty)
    }

    /// Get the key edits, if any.
    pub fn edits(&self) -> Option<&KeyEdits<K>> {
        match self {
            KeysDiff::Empty => None,
            KeysDiff::Edits(edits) => Some(edits),
        }
    }
}

impl<K> Delta for KeysDiff<K> {
    fn is_empty(&self) -> bool {
        matches!(self, KeysDiff::Empty)
    }

    fn empty() -> Self {
        KeysDiff::Empty
    }
}

/// Differencer over `Vec<K>` of unique keys.
pub struct KeyDifferencer<K> {
    _keys: PhantomData<fn() -> K>,
}

impl<K> KeyDifferencer<K> {
    /// Create a key differencer.
    pub fn new() -> Self {
        Self { _keys: PhantomData }
    }
}

impl<K> Default for KeyDifferencer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for KeyDifferencer<K> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash> KeyDifferencer<K> {
    /// Edit scripts for `from -> to` and back.
    pub fn calculate(from: &[K], to: &[K]) -> ForwardReverse<KeysDiff<K>> {
        if from.is_empty() && to.is_empty() {
            return ForwardReverse::empty();
        }

        let in_from: HashSet<&K> = from.iter().collect();
        let mut inserts = Vec::new();
        let mut shared: Vec<&K> = Vec::with_capacity(to.len());
        for (pos, key) in to.iter().enumerate() {
            if in_from.contains(key) {
                shared.push(key);
            } else {
                inserts.push((pos, key.clone()));
            }
        }
        let shared_pos: HashMap<&K, usize> =
            shared.iter().enumerate().map(|(pos, key)| (*key, pos)).collect();

        let mut deletes = Vec::new();
        let mut block_moves = Vec::new();
        let mut item_moves = Vec::new();
        let mut deleted = 0;
        let mut i = 0;
        while i < from.len() {
            let key = &from[i];
            match shared_pos.get(key) {
                None => {
                    deletes.push((i, key.clone()));
                    deleted += 1;
                }
                Some(&j) => {
                    let pos = i - deleted;
                    if j != pos {
                        let limit = (shared.len() - j - 1).min(from.len() - i - 1);
                        let mut run = 0;
                        while run < limit && from[i + run + 1] == *shared[j + run + 1] {
                            run += 1;
                        }
                        if run > 0 {
                            block_moves.push(BlockMove { from: pos, to: j, len: run + 1 });
                            i += run;
                        } else {
                            item_moves.push(ItemMove { from: pos, to: j });
                        }
                    }
                }
            }
            i += 1;
        }

        if deletes.is_empty() && inserts.is_empty() && block_moves.is_empty() && item_moves.is_empty()
        {
            return ForwardReverse::empty();
        }

        let block_moves: Arc<[BlockMove]> = block_moves.into();
        let item_moves: Arc<[ItemMove]> = item_moves.into();
        let reverse = KeyEdits {
            is_reverse: true,
            length_before: to.len(),
            length_after: from.len(),
            deletes: inserts.clone(),
            inserts: deletes.clone(),
            block_moves: Arc::clone(&block_moves),
            item_moves: Arc::clone(&item_moves),
        };
        let forward = KeyEdits {
            is_reverse: false,
            length_before: from.len(),
            length_after: to.len(),
            deletes,
            inserts,
            block_moves,
            item_moves,
        };
        ForwardReverse::new(KeysDiff::Edits(forward), KeysDiff::Edits(reverse))
    }

    /// Replay an edit script.
    ///
    /// Out-of-range positions from a stale script are skipped rather than
    /// panicking; the result is then best effort.
    pub fn apply(keys: &[K], diff: &KeysDiff<K>) -> Vec<K> {
        let edits = match diff {
            KeysDiff::Empty => return keys.to_vec(),
            KeysDiff::Edits(edits) => edits,
        };

        let mut deletes = edits.deletes.iter().map(|(pos, _)| *pos).peekable();
        let mut compacted = Vec::with_capacity(keys.len());
        for (pos, key) in keys.iter().enumerate() {
            while deletes.next_if(|d| *d < pos).is_some() {}
            if deletes.next_if_eq(&pos).is_some() {
                continue;
            }
            compacted.push(key.clone());
        }

        let mut arranged = compacted.clone();
        for block in edits.block_moves.iter() {
            let (src, dst) = edits.block_columns(block);
            if src + block.len <= compacted.len() && dst + block.len <= arranged.len() {
                arranged[dst..dst + block.len].clone_from_slice(&compacted[src..src + block.len]);
            }
        }
        for item in edits.item_moves.iter() {
            let (src, dst) = edits.item_columns(item);
            if let (Some(key), Some(slot)) = (compacted.get(src), arranged.get_mut(dst)) {
                *slot = key.clone();
            }
        }

        let mut out = Vec::with_capacity(edits.length_after);
        let mut moved = arranged.into_iter();
        let mut inserts = edits.inserts.iter().peekable();
        while out.len() < edits.length_after {
            if let Some((_, key)) = inserts.next_if(|(pos, _)| *pos <= out.len()) {
                out.push(key.clone());
                continue;
            }
            match moved.next() {
                Some(key) => out.push(key),
                None => break,
            }
        }
        out.extend(inserts.map(|(_, key)| key.clone()));
        out
    }

    /// Two key edits always conflict unless one of them is empty.
    pub fn intersect(a: &KeysDiff<K>, b: &KeysDiff<K>) -> bool {
        !a.is_empty() && !b.is_empty()
    }
}

impl<K> Differencer<Vec<K>> for KeyDifferencer<K>
where
    K: Clone + Eq + Hash + Send + Sync,
{
    type Diff = KeysDiff<K>;

    fn calculate_diffs(&self, from: &Vec<K>, to: &Vec<K>) -> ForwardReverse<KeysDiff<K>> {
        Self::calculate(from, to)
    }

    fn apply_diff(&self, value: &Vec<K>, diff: &KeysDiff<K>) -> Vec<K> {
        Self::apply(value, diff)
    }

    fn diffs_intersect(&self, a: &KeysDiff<K>, b: &KeysDiff<K>) -> bool {
        Self::intersect(a, b)
    }
}
