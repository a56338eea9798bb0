//! Positions inside a keyed store and the outcome of a walk over it

/// Opaque position of an entry inside a [`KeyedStore`](super::KeyedStore)
///
/// A cursor is only meaningful for the store that produced it. Stores never
/// rehash, so a cursor stays usable across inserts and deletes; when the chain
/// it points into has shrunk in the meantime, the walk simply continues at the
/// next bucket.
///
/// Resuming is exact only while the walker is the sole deleter of the store.
/// If another caller deletes an entry before the cursor in the same chain,
/// the successors shift down and the resumed walk skips one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub(super) bucket: usize,
    pub(super) slot: usize,
}

impl Cursor {
    /// The first position of every store
    pub const START: Cursor = Cursor { bucket: 0, slot: 0 };

    pub(super) fn new(bucket: usize, slot: usize) -> Self {
        Self { bucket, slot }
    }

    /// Position directly after this one in the same chain
    pub fn skip(self) -> Self {
        Self {
            bucket: self.bucket,
            slot: self.slot + 1,
        }
    }
}

/// Decision returned by a visitor for every entry it sees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    Stop,
}

/// Outcome of [`KeyedStore::walk_from`](super::KeyedStore::walk_from)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Every entry from the starting cursor to the end was visited
    Completed,

    /// The visitor stopped at the entry located at this cursor
    Stopped(Cursor),
}

impl Walk {
    pub fn reached_end(&self) -> bool {
        matches!(self, Walk::Completed)
    }
}

/// Outcome of a conditional delete
#[derive(Debug)]
pub enum Removal<V> {
    /// The entry matched and was unlinked; ownership moves to the caller
    ///
    /// `cursor` is the position the entry occupied, which now holds its
    /// successor.
    Removed { value: V, cursor: Cursor },

    /// The entry no longer matched when re-checked under the write lock
    ///
    /// `cursor` points just past the retained entry.
    Retained { cursor: Cursor },

    /// No entry is stored under the key
    Absent,
}
