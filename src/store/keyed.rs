//! Bucketed concurrent map with a resumable walk
//!
//! The store owns a fixed number of buckets, each holding an ordered chain of
//! entries behind its own read/write lock. Structural changes to one bucket
//! never block readers or writers of another bucket.
//!
//! ## Resumable walks
//!
//! [`KeyedStore::walk_from`] visits entries bucket by bucket, chain slot by
//! chain slot, starting at a [`Cursor`]. When the visitor stops at an entry the
//! caller gets the entry's cursor back. Deleting that entry shifts its
//! successors down by one slot, so walking again from the same cursor picks up
//! exactly where the previous walk left off. A full sweep that deletes `k` of
//! `n` entries therefore costs `O(n + k)` visits instead of the `O(n * k)` of
//! restarting from the first bucket after every delete.
//!
//! Producers keep inserting while a walk is in progress. New entries are
//! appended to the end of their chain, so they may or may not be seen by a walk
//! that is already running, but existing entries never move except when an
//! entry in front of them is deleted.

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash, RandomState};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::cursor::{Cursor, Removal, Visit, Walk};
use super::error::{StoreError, StoreResult};

#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    value: V,
}

type Chain<K, V> = Vec<Slot<K, V>>;

/// Concurrent associative container with a fixed bucket layout
#[derive(Debug)]
pub struct KeyedStore<K, V> {
    buckets: Box<[RwLock<Chain<K, V>>]>,
    hasher: RandomState,
    len: AtomicUsize,
}

impl<K, V> KeyedStore<K, V>
where
    K: AsRef<[u8]> + Hash + Eq,
{
    /// Create a store with `bucket_count` buckets (at least one)
    pub fn new(bucket_count: usize) -> Self {
        let buckets = (0..bucket_count.max(1))
            .map(|_| RwLock::new(Vec::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            buckets,
            hasher: RandomState::new(),
            len: AtomicUsize::new(0),
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of entries currently linked into the store
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn index_of<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        (self.hasher.hash_one(key) % self.buckets.len() as u64) as usize
    }

    /// Insert `value` under `key`, replacing and returning any previous value
    pub fn insert_or_refresh(&self, key: K, value: V) -> StoreResult<Option<V>> {
        if key.as_ref().is_empty() {
            return Err(StoreError::EmptyKey);
        }

        let mut chain = self.buckets[self.index_of(&key)].write();

        if let Some(slot) = chain.iter_mut().find(|slot| slot.key == key) {
            return Ok(Some(std::mem::replace(&mut slot.value, value)));
        }

        chain.try_reserve(1)?;
        chain.push(Slot { key, value });
        self.len.fetch_add(1, Ordering::AcqRel);

        Ok(None)
    }

    /// Run `update` on the entry stored under `key`, creating it with `make`
    /// first when it is absent
    ///
    /// Both closures run under the bucket's write lock.
    pub fn upsert_with<R>(
        &self,
        key: K,
        make: impl FnOnce() -> V,
        update: impl FnOnce(&mut V) -> R,
    ) -> StoreResult<R> {
        if key.as_ref().is_empty() {
            return Err(StoreError::EmptyKey);
        }

        let mut chain = self.buckets[self.index_of(&key)].write();

        if let Some(slot) = chain.iter_mut().find(|slot| slot.key == key) {
            return Ok(update(&mut slot.value));
        }

        chain.try_reserve(1)?;
        chain.push(Slot { key, value: make() });
        self.len.fetch_add(1, Ordering::AcqRel);

        let last = chain.len() - 1;
        Ok(update(&mut chain[last].value))
    }

    /// Run `f` against the value stored under `key` while holding its bucket's
    /// read lock
    pub fn with<Q, R>(&self, key: &Q, f: impl FnOnce(&V) -> R) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let chain = self.buckets[self.index_of(key)].read();
        chain
            .iter()
            .find(|slot| slot.key.borrow() == key)
            .map(|slot| f(&slot.value))
    }

    /// Clone the value stored under `key`
    pub fn lookup<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.with(key, V::clone)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with(key, |_| ()).is_some()
    }

    /// Unlink the entry under `key` and hand its value to the caller
    pub fn delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.remove_if(key, |_| true) {
            Removal::Removed { value, .. } => Some(value),
            Removal::Retained { .. } | Removal::Absent => None,
        }
    }

    /// Unlink the entry under `key` if `predicate` still holds for it
    ///
    /// The predicate is evaluated under the bucket's write lock, so a refresh
    /// that landed between a walk visiting the entry and this call is honored.
    pub fn remove_if<Q>(&self, key: &Q, predicate: impl FnOnce(&V) -> bool) -> Removal<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.index_of(key);
        let mut chain = self.buckets[index].write();

        let Some(slot) = chain.iter().position(|slot| slot.key.borrow() == key) else {
            return Removal::Absent;
        };

        if !predicate(&chain[slot].value) {
            return Removal::Retained {
                cursor: Cursor::new(index, slot + 1),
            };
        }

        // order-preserving: successors shift into `slot`
        let removed = chain.remove(slot);
        drop(chain);
        self.len.fetch_sub(1, Ordering::AcqRel);

        Removal::Removed {
            value: removed.value,
            cursor: Cursor::new(index, slot),
        }
    }

    /// Visit entries starting at `from` until the visitor stops or the store
    /// is exhausted
    ///
    /// Each bucket's read lock is held while its entries are visited, so the
    /// visitor must not write to this same store. Writing to other stores
    /// (e.g. a value's own nested stores) is fine.
    pub fn walk_from(&self, from: Cursor, mut visit: impl FnMut(&K, &V) -> Visit) -> Walk {
        let mut skip = from.slot;

        for bucket in from.bucket..self.buckets.len() {
            let chain = self.buckets[bucket].read();

            for (slot, entry) in chain.iter().enumerate().skip(skip) {
                if visit(&entry.key, &entry.value) == Visit::Stop {
                    return Walk::Stopped(Cursor::new(bucket, slot));
                }
            }

            skip = 0;
        }

        Walk::Completed
    }

    /// Unlink every entry and drop them outside of the bucket locks
    ///
    /// Returns how many entries were removed.
    pub fn drain(&self) -> usize {
        let mut removed = 0;

        for bucket in self.buckets.iter() {
            let chain = std::mem::take(&mut *bucket.write());
            self.len.fetch_sub(chain.len(), Ordering::AcqRel);
            removed += chain.len();
        }

        removed
    }
}
