//! Contains the keyed dense slot map implementation.

// The live entries always occupy `slots[..len]` without holes, and every slot
// from `len` onwards is `None`. The index table maps each live key to its slot
// and is the only thing consulted to decide whether a key exists, so a slot
// past `len` is never read. Every mutation below updates the slots, the index
// table and `len` together.

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
#[cfg(has_try_reserve)]
use std::collections::TryReserveError;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::{FromIterator, FusedIterator};
use std::mem;
use std::ops::Index;

use super::{Insertion, ShrinkPolicy, Update};
use crate::util::debug_fmt_entries;

// An occupied slot in the dense storage.
#[derive(Debug, Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Keyed dense slot map, a hash map with gap-free contiguous storage.
///
/// See [crate documentation](index.html) for more details.
#[derive(Clone)]
pub struct SlotMap<K, V, S = RandomState> {
    slots: Vec<Option<Entry<K, V>>>,
    index: HashMap<K, usize, S>,
    len: usize,
    policy: ShrinkPolicy,
}

impl<K, V> SlotMap<K, V, RandomState> {
    /// Construct a new, empty `SlotMap`.
    ///
    /// The slot map will not allocate until values are inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let sm: SlotMap<u64, i32> = SlotMap::new();
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty `SlotMap` with the given capacity.
    ///
    /// The slot map will not reallocate until it holds at least `capacity`
    /// elements. If `capacity` is 0, the slot map will not allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let sm: SlotMap<u64, i32> = SlotMap::with_capacity(10);
    /// assert!(sm.capacity() >= 10);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }

    /// Creates an empty `SlotMap` that shrinks according to `policy`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let sm: SlotMap<u64, i32> = SlotMap::with_policy(ShrinkPolicy::never());
    /// assert_eq!(sm.policy(), ShrinkPolicy::never());
    /// ```
    pub fn with_policy(policy: ShrinkPolicy) -> Self {
        let mut sm = Self::new();
        sm.policy = policy;
        sm
    }
}

impl<K, V, S> SlotMap<K, V, S> {
    /// Creates an empty `SlotMap` which will use the given hash builder to
    /// hash keys.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let mut sm = SlotMap::with_hasher(RandomState::new());
    /// sm.insert(1, 2);
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates an empty `SlotMap` with the given capacity, using
    /// `hash_builder` to hash keys.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        SlotMap {
            slots: Vec::with_capacity(capacity),
            index: HashMap::with_capacity_and_hasher(capacity, hash_builder),
            len: 0,
            policy: ShrinkPolicy::default(),
        }
    }

    /// Returns the number of elements in the slot map.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::with_capacity(10);
    /// sm.insert("a", "len() counts actual elements, not capacity");
    /// sm.insert("b", "removed elements don't count either");
    /// sm.remove("b");
    /// assert_eq!(sm.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns if the slot map is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the `SlotMap` can hold without
    /// reallocating.
    pub fn capacity(&self) -> usize {
        self.slots.capacity().min(self.index.capacity())
    }

    /// Returns the length of the dense storage, live entries and trailing
    /// garbage slots together.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// sm.insert('a', 1);
    /// sm.insert('b', 2);
    /// sm.remove(&'a');
    /// assert_eq!(sm.len(), 1);
    /// assert_eq!(sm.dense_len(), 2);
    /// assert_eq!(sm.garbage(), 1);
    /// ```
    pub fn dense_len(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of empty slots trailing the live entries. They are
    /// reused by insertions and released by [`try_deallocate`].
    ///
    /// [`try_deallocate`]: SlotMap::try_deallocate
    pub fn garbage(&self) -> usize {
        self.slots.len() - self.len
    }

    /// Returns the shrink policy of this slot map.
    pub fn policy(&self) -> ShrinkPolicy {
        self.policy
    }

    /// Replaces the shrink policy. The new policy takes effect on the next
    /// removal or call to [`try_deallocate`](SlotMap::try_deallocate).
    pub fn set_policy(&mut self, policy: ShrinkPolicy) {
        self.policy = policy;
    }

    /// Returns a reference to the map's `BuildHasher`.
    pub fn hasher(&self) -> &S {
        self.index.hasher()
    }

    /// Truncates the dense storage to the live entries if the shrink policy
    /// asks for it, releasing the garbage slots. Returns whether it did.
    ///
    /// This runs automatically after every removal, so calling it by hand is
    /// only needed after changing the policy.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::with_policy(ShrinkPolicy::never());
    /// for i in 0..10 {
    ///     sm.insert(i, i);
    /// }
    /// for i in 0..8 {
    ///     sm.remove(&i);
    /// }
    /// assert_eq!(sm.dense_len(), 10);
    ///
    /// sm.set_policy(ShrinkPolicy::new(4, 0.5));
    /// assert!(sm.try_deallocate());
    /// assert_eq!(sm.dense_len(), 2);
    /// assert!(!sm.try_deallocate());
    /// ```
    pub fn try_deallocate(&mut self) -> bool {
        let dense_len = self.slots.len();
        if !self.policy.should_shrink(dense_len, self.len) {
            return false;
        }

        self.slots.truncate(self.len);
        self.slots.shrink_to_fit();
        trace!(
            "released {} garbage slots, dense storage now {} slots",
            dense_len - self.len,
            self.len
        );
        true
    }

    /// Clears the slot map. Keeps the allocated memory for reuse.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// for i in 0..10 {
    ///     sm.insert(i, i * i);
    /// }
    /// assert_eq!(sm.len(), 10);
    /// sm.clear();
    /// assert_eq!(sm.len(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.len = 0;
    }

    /// Clears the slot map, returning all key-value pairs as an iterator. Keeps
    /// the allocated memory for reuse.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// sm.insert("k", 0);
    /// let v: Vec<_> = sm.drain().collect();
    /// assert_eq!(sm.len(), 0);
    /// assert_eq!(v, vec![("k", 0)]);
    /// ```
    pub fn drain(&mut self) -> Drain<K, V> {
        self.index.clear();
        let remaining = mem::replace(&mut self.len, 0);
        Drain {
            inner: self.slots.drain(..),
            remaining,
        }
    }

    /// Calls `f` on every key-value pair, in slot order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// sm.insert("a", 1);
    /// sm.insert("b", 2);
    /// let mut sum = 0;
    /// sm.for_each(|_k, v| sum += *v);
    /// assert_eq!(sum, 3);
    /// ```
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.iter() {
            f(key, value);
        }
    }

    /// An iterator visiting all key-value pairs in slot order. The iterator
    /// element type is `(&'a K, &'a V)`.
    ///
    /// Slot order is insertion order until the first removal, after which the
    /// last entry is moved into the hole left behind.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// sm.insert('a', 0);
    /// sm.insert('b', 1);
    /// sm.insert('c', 2);
    /// sm.remove(&'a');
    ///
    /// let mut it = sm.iter();
    /// assert_eq!(it.next(), Some((&'c', &2)));
    /// assert_eq!(it.len(), 1);
    /// assert_eq!(it.next(), Some((&'b', &1)));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<K, V> {
        Iter {
            inner: self.slots[..self.len].iter(),
            remaining: self.len,
        }
    }

    /// An iterator visiting all key-value pairs in slot order, with mutable
    /// references to the values. The iterator element type is
    /// `(&'a K, &'a mut V)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// sm.insert(0, 10);
    /// sm.insert(1, 20);
    /// sm.insert(2, 30);
    ///
    /// for (k, v) in sm.iter_mut() {
    ///     if *k != 1 {
    ///         *v *= -1;
    ///     }
    /// }
    ///
    /// assert_eq!(sm.values().collect::<Vec<_>>(), vec![&-10, &20, &-30]);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<K, V> {
        IterMut {
            inner: self.slots[..self.len].iter_mut(),
            remaining: self.len,
        }
    }

    /// An iterator visiting all keys in slot order. The iterator element type
    /// is `&'a K`.
    pub fn keys(&self) -> Keys<K, V> {
        Keys { inner: self.iter() }
    }

    /// An iterator visiting all values in slot order. The iterator element
    /// type is `&'a V`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// sm.insert("x", 10);
    /// sm.insert("y", 20);
    /// sm.insert("z", 30);
    /// let v: Vec<_> = sm.values().collect();
    /// assert_eq!(v, vec![&10, &20, &30]);
    /// ```
    pub fn values(&self) -> Values<K, V> {
        Values { inner: self.iter() }
    }

    /// An iterator visiting all values mutably in slot order. The iterator
    /// element type is `&'a mut V`.
    pub fn values_mut(&mut self) -> ValuesMut<K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    // Every slot the index table points at is occupied.
    fn entry(&self, idx: usize) -> &Entry<K, V> {
        match self.slots[idx] {
            Some(ref entry) => entry,
            None => unreachable!("SlotMap index table points at an empty slot"),
        }
    }

    fn entry_mut(&mut self, idx: usize) -> &mut Entry<K, V> {
        match self.slots[idx] {
            Some(ref mut entry) => entry,
            None => unreachable!("SlotMap index table points at an empty slot"),
        }
    }
}

impl<K, V, S> SlotMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Reserves capacity for at least `additional` more elements to be inserted
    /// in the `SlotMap`. The collection may reserve more space to
    /// avoid frequent reallocations.
    ///
    /// # Panics
    ///
    /// Panics if the new allocation size overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// sm.insert("foo", 1);
    /// sm.reserve(32);
    /// assert!(sm.capacity() >= 33);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        let needed = (self.len + additional).saturating_sub(self.slots.len());
        self.slots.reserve(needed);
        self.index.reserve(additional);
    }

    /// Returns `true` if the slot map contains `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// sm.insert(7, 42);
    /// assert_eq!(sm.contains_key(&7), true);
    /// sm.remove(&7);
    /// assert_eq!(sm.contains_key(&7), false);
    /// ```
    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.index.contains_key(key)
    }

    /// Inserts a key-value pair into the slot map.
    ///
    /// If the key is new it takes the first slot past the live entries,
    /// reusing a garbage slot when there is one. If the key is already present
    /// its value is overwritten in place and the old value is returned in
    /// [`Insertion::AlreadyExisted`]; no slot is consumed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// assert_eq!(sm.insert(37, "a"), Insertion::Inserted);
    /// assert_eq!(sm.insert(37, "b"), Insertion::AlreadyExisted("a"));
    /// assert_eq!(sm[&37], "b");
    /// assert_eq!(sm.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Insertion<V> {
        if let Some(&idx) = self.index.get(&key) {
            let old = mem::replace(&mut self.entry_mut(idx).value, value);
            return Insertion::AlreadyExisted(old);
        }

        let idx = self.len;
        let index_key = key.clone();

        // Place the entry before touching the index table in case it panics.
        let entry = Some(Entry { key, value });
        if idx < self.slots.len() {
            self.slots[idx] = entry;
        } else {
            self.slots.push(entry);
        }
        self.index.insert(index_key, idx);
        self.len += 1;

        Insertion::Inserted
    }

    /// Like [`insert`](SlotMap::insert), but reports a failure to grow the
    /// storage instead of aborting. Nothing is changed on failure.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// assert_eq!(sm.try_insert("a", 1), Ok(Insertion::Inserted));
    /// ```
    #[cfg(has_try_reserve)]
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Insertion<V>, TryReserveError> {
        if !self.index.contains_key(&key) {
            if self.len == self.slots.len() {
                self.slots.try_reserve(1)?;
            }
            self.index.try_reserve(1)?;
        }

        Ok(self.insert(key, value))
    }

    /// Overwrites the value of an existing key, returning the old value in
    /// [`Update::Updated`]. If the key is absent nothing changes and `value`
    /// is handed back in [`Update::NotFound`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// sm.insert("k", 1);
    /// assert_eq!(sm.update("k", 2), Update::Updated(1));
    /// assert_eq!(sm.update("nope", 3), Update::NotFound(3));
    /// assert_eq!(sm.len(), 1);
    /// ```
    pub fn update<Q: ?Sized>(&mut self, key: &Q, value: V) -> Update<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        match self.index.get(key) {
            Some(&idx) => Update::Updated(mem::replace(&mut self.entry_mut(idx).value, value)),
            None => Update::NotFound(value),
        }
    }

    /// Removes a key from the slot map, returning the value at the key if the
    /// key was present.
    ///
    /// The last entry is moved into the vacated slot, so the live entries stay
    /// contiguous. Afterwards the storage may shrink according to the
    /// [`ShrinkPolicy`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// sm.insert(1, 42);
    /// assert_eq!(sm.remove(&1), Some(42));
    /// assert_eq!(sm.remove(&1), None);
    /// ```
    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.remove_entry(key).map(|(_key, value)| value)
    }

    /// Removes a key from the slot map, returning the stored key and value if
    /// the key was present.
    pub fn remove_entry<Q: ?Sized>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        let idx = self.index.remove(key)?;
        let entry = self.take_slot(idx);
        self.try_deallocate();
        Some((entry.key, entry.value))
    }

    // Empties slot `idx`, whose key has already left the index table, by
    // swapping it with the last live slot.
    fn take_slot(&mut self, idx: usize) -> Entry<K, V> {
        self.len -= 1;
        let last = self.len;
        self.slots.swap(idx, last);

        if idx != last {
            if let Some(ref moved) = self.slots[idx] {
                if let Some(pos) = self.index.get_mut(&moved.key) {
                    *pos = idx;
                }
            }
        }

        match self.slots[last].take() {
            Some(entry) => entry,
            None => unreachable!("SlotMap removed an empty slot"),
        }
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// In other words, remove all key-value pairs (k, v) such that
    /// `f(&k, &mut v)` returns false. This method operates in place.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// for i in 0..6 {
    ///     sm.insert(i, i * 10);
    /// }
    ///
    /// sm.retain(|k, v| *k == 1 || *v >= 40);
    ///
    /// let mut keys: Vec<_> = sm.keys().cloned().collect();
    /// keys.sort();
    /// assert_eq!(keys, vec![1, 4, 5]);
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut i = 0;
        while i < self.len {
            let should_keep = {
                let entry = self.entry_mut(i);
                f(&entry.key, &mut entry.value)
            };

            if should_keep {
                i += 1;
            } else {
                if let Some(ref entry) = self.slots[i] {
                    self.index.remove(&entry.key);
                }
                // We do not increment i here intentionally. This slot has just
                // been refilled with the former last entry.
                self.take_slot(i);
            }
        }

        self.try_deallocate();
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// sm.insert("foo", "bar");
    /// assert_eq!(sm.get("foo"), Some(&"bar"));
    /// sm.remove("foo");
    /// assert_eq!(sm.get("foo"), None);
    /// ```
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.index.get(key).map(|&idx| &self.entry(idx).value)
    }

    /// Returns the stored key and a reference to the value corresponding to
    /// the key.
    pub fn get_key_value<Q: ?Sized>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.index.get(key).map(|&idx| {
            let entry = self.entry(idx);
            (&entry.key, &entry.value)
        })
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let mut sm = SlotMap::new();
    /// sm.insert('x', 3.5);
    /// if let Some(x) = sm.get_mut(&'x') {
    ///     *x += 3.0;
    /// }
    /// assert_eq!(sm[&'x'], 6.5);
    /// ```
    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        match self.index.get(key) {
            Some(&idx) => Some(&mut self.entry_mut(idx).value),
            None => None,
        }
    }
}

impl<K, V, S> Default for SlotMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        SlotMap::with_hasher(S::default())
    }
}

impl<K, V, S> fmt::Debug for SlotMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        debug_fmt_entries(self.iter(), f)
    }
}

impl<K, V, S> PartialEq for SlotMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }

        self.iter()
            .all(|(key, value)| other.get(key).map_or(false, |v| *value == *v))
    }
}

impl<K, V, S> Eq for SlotMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Eq,
    S: BuildHasher,
{
}

impl<'a, K, Q: ?Sized, V, S> Index<&'a Q> for SlotMap<K, V, S>
where
    K: Eq + Hash + Clone + Borrow<Q>,
    Q: Eq + Hash,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(r) => r,
            None => panic!("invalid SlotMap key used"),
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for SlotMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut sm = SlotMap::default();
        sm.extend(iter);
        sm
    }
}

impl<K, V, S> Extend<(K, V)> for SlotMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

// Iterators.
/// A draining iterator for `SlotMap`.
#[derive(Debug)]
pub struct Drain<'a, K: 'a, V: 'a> {
    inner: std::vec::Drain<'a, Option<Entry<K, V>>>,
    remaining: usize,
}

/// An iterator that moves key-value pairs out of a `SlotMap`.
#[derive(Debug)]
pub struct IntoIter<K, V> {
    inner: std::vec::IntoIter<Option<Entry<K, V>>>,
    remaining: usize,
}

/// An iterator over the key-value pairs in a `SlotMap`.
#[derive(Debug)]
pub struct Iter<'a, K: 'a, V: 'a> {
    inner: std::slice::Iter<'a, Option<Entry<K, V>>>,
    remaining: usize,
}

/// A mutable iterator over the key-value pairs in a `SlotMap`.
#[derive(Debug)]
pub struct IterMut<'a, K: 'a, V: 'a> {
    inner: std::slice::IterMut<'a, Option<Entry<K, V>>>,
    remaining: usize,
}

/// An iterator over the keys in a `SlotMap`.
#[derive(Debug)]
pub struct Keys<'a, K: 'a, V: 'a> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values in a `SlotMap`.
#[derive(Debug)]
pub struct Values<'a, K: 'a, V: 'a> {
    inner: Iter<'a, K, V>,
}

/// A mutable iterator over the values in a `SlotMap`.
#[derive(Debug)]
pub struct ValuesMut<'a, K: 'a, V: 'a> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for Drain<'a, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        // Garbage slots past the live entries drain as `None` and are skipped.
        for slot in &mut self.inner {
            if let Some(entry) = slot {
                self.remaining -= 1;
                return Some((entry.key, entry.value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        for slot in &mut self.inner {
            if let Some(entry) = slot {
                self.remaining -= 1;
                return Some((entry.key, entry.value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        for slot in &mut self.inner {
            if let Some(entry) = slot {
                self.remaining -= 1;
                return Some((&entry.key, &entry.value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<(&'a K, &'a mut V)> {
        for slot in &mut self.inner {
            if let Some(entry) = slot {
                self.remaining -= 1;
                let Entry { key, value } = entry;
                return Some((&*key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V, S> IntoIterator for &'a SlotMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut SlotMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for SlotMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.slots.into_iter(),
            remaining: self.len,
        }
    }
}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}
impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}
impl<'a, K, V> FusedIterator for Keys<'a, K, V> {}
impl<'a, K, V> FusedIterator for Values<'a, K, V> {}
impl<'a, K, V> FusedIterator for ValuesMut<'a, K, V> {}
impl<'a, K, V> FusedIterator for Drain<'a, K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}
impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}
impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}
impl<'a, K, V> ExactSizeIterator for ValuesMut<'a, K, V> {}
impl<'a, K, V> ExactSizeIterator for Drain<'a, K, V> {}
impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

// Serialization with serde.
#[cfg(feature = "serde")]
mod serialize {
    use super::*;
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::marker::PhantomData;

    // Only the live entries are written, in slot order. Slot positions and
    // the shrink policy are not part of the format.
    impl<K, V, S> Serialize for SlotMap<K, V, S>
    where
        K: Serialize,
        V: Serialize,
    {
        fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
        where
            Ser: Serializer,
        {
            serializer.collect_map(self.iter())
        }
    }

    struct SlotMapVisitor<K, V, S> {
        marker: PhantomData<fn() -> SlotMap<K, V, S>>,
    }

    impl<'de, K, V, S> Visitor<'de> for SlotMapVisitor<K, V, S>
    where
        K: Deserialize<'de> + Eq + Hash + Clone,
        V: Deserialize<'de>,
        S: BuildHasher + Default,
    {
        type Value = SlotMap<K, V, S>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let capacity = access.size_hint().unwrap_or(0).min(4096);
            let mut sm = SlotMap::with_capacity_and_hasher(capacity, S::default());

            // A repeated key keeps the last value, as with any map.
            while let Some((key, value)) = access.next_entry()? {
                sm.insert(key, value);
            }

            Ok(sm)
        }
    }

    impl<'de, K, V, S> Deserialize<'de> for SlotMap<K, V, S>
    where
        K: Deserialize<'de> + Eq + Hash + Clone,
        V: Deserialize<'de>,
        S: BuildHasher + Default,
    {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(SlotMapVisitor {
                marker: PhantomData,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    // Checks that the slots, the index table and `len` agree.
    fn check_invariants<K, V, S>(sm: &SlotMap<K, V, S>) -> bool
    where
        K: Eq + Hash + Clone,
        S: BuildHasher,
    {
        if sm.index.len() != sm.len || sm.len > sm.slots.len() {
            return false;
        }

        let live_ok = sm.slots[..sm.len].iter().enumerate().all(|(i, slot)| {
            slot.as_ref()
                .map_or(false, |entry| sm.index.get(&entry.key) == Some(&i))
        });
        let garbage_empty = sm.slots[sm.len..].iter().all(Option::is_none);

        live_ok && garbage_empty
    }

    #[test]
    fn check_drops() {
        let drops = RefCell::new(0usize);

        #[derive(Clone)]
        struct CountDrop<'a>(&'a RefCell<usize>);

        impl<'a> Drop for CountDrop<'a> {
            fn drop(&mut self) {
                *self.0.borrow_mut() += 1;
            }
        }

        {
            let mut clone = {
                // Insert 1000 items.
                let mut sm = SlotMap::new();
                for i in 0..1000 {
                    sm.insert(i, CountDrop(&drops));
                }

                // Remove even keys.
                for i in (0..1000).filter(|i| i % 2 == 0) {
                    sm.remove(&i);
                }

                // Should only have dropped 500 so far.
                assert_eq!(*drops.borrow(), 500);

                // Let's clone ourselves and then die.
                sm.clone()
            };

            // Now all original items should have been dropped exactly once.
            assert_eq!(*drops.borrow(), 1000);

            // Overwriting hands back the old value, which is dropped here.
            for i in (0..500).filter(|i| i % 2 == 1) {
                clone.insert(i, CountDrop(&drops));
            }
            assert_eq!(*drops.borrow(), 1250);
        }

        // 1250 + 500 drops in total should have happened.
        assert_eq!(*drops.borrow(), 1750);
    }

    #[test]
    fn shrink_drops_nothing_live() {
        let drops = RefCell::new(0usize);

        struct CountDrop<'a>(&'a RefCell<usize>);

        impl<'a> Drop for CountDrop<'a> {
            fn drop(&mut self) {
                *self.0.borrow_mut() += 1;
            }
        }

        let mut sm = SlotMap::with_policy(ShrinkPolicy::new(2, 0.5));
        for i in 0..8 {
            sm.insert(i, CountDrop(&drops));
        }
        for i in 0..5 {
            sm.remove(&i);
        }

        assert_eq!(*drops.borrow(), 5);
        assert!(sm.dense_len() < 8);
        assert!(check_invariants(&sm));
        drop(sm);
        assert_eq!(*drops.borrow(), 8);
    }

    #[test]
    fn swap_remove_keeps_live_region_dense() {
        let mut sm = SlotMap::new();
        sm.insert("A", 1);
        sm.insert("B", 2);
        sm.insert("C", 3);
        assert_eq!(sm.index["A"], 0);
        assert_eq!(sm.index["B"], 1);
        assert_eq!(sm.index["C"], 2);

        assert_eq!(sm.remove("B"), Some(2));

        assert_eq!(sm.get("A"), Some(&1));
        assert_eq!(sm.get("C"), Some(&3));
        assert_eq!(sm.get("B"), None);
        assert_eq!(sm.len(), 2);
        assert_eq!(sm.index["C"], 1);
        assert_eq!(sm.dense_len(), 3);
        assert!(check_invariants(&sm));

        let keys: HashSet<_> = sm.keys().cloned().collect();
        assert_eq!(keys, ["A", "C"].iter().cloned().collect());
    }

    #[test]
    fn remove_last_slot() {
        let mut sm = SlotMap::new();
        sm.insert(1, 'a');
        sm.insert(2, 'b');
        assert_eq!(sm.remove_entry(&2), Some((2, 'b')));
        assert_eq!(sm.index[&1], 0);
        assert_eq!(sm.garbage(), 1);
        assert!(check_invariants(&sm));

        assert_eq!(sm.remove(&1), Some('a'));
        assert!(sm.is_empty());
        assert_eq!(sm.iter().count(), 0);
        assert!(check_invariants(&sm));
    }

    #[test]
    fn overwrite_consumes_no_slot() {
        let mut sm = SlotMap::new();
        assert_eq!(sm.insert("k", "x"), Insertion::Inserted);
        assert_eq!(sm.insert("k", "y"), Insertion::AlreadyExisted("x"));
        assert_eq!(sm.get("k"), Some(&"y"));
        assert_eq!(sm.len(), 1);
        assert_eq!(sm.dense_len(), 1);
    }

    #[test]
    fn update_never_inserts() {
        let mut sm: SlotMap<i32, &str> = SlotMap::new();
        assert_eq!(sm.update(&5, "five"), Update::NotFound("five"));
        assert!(sm.is_empty());
        assert_eq!(sm.dense_len(), 0);

        sm.insert(5, "5");
        assert_eq!(sm.update(&5, "five"), Update::Updated("5"));
        assert_eq!(sm[&5], "five");
        assert_eq!(sm.len(), 1);
    }

    #[test]
    fn insert_reuses_garbage_slot() {
        let mut sm = SlotMap::new();
        for i in 0..4 {
            sm.insert(i, i);
        }
        sm.remove(&0);
        sm.remove(&1);
        assert_eq!(sm.dense_len(), 4);
        assert_eq!(sm.garbage(), 2);

        sm.insert(10, 10);
        assert_eq!(sm.dense_len(), 4);
        assert_eq!(sm.index[&10], 2);
        assert!(check_invariants(&sm));
    }

    #[test]
    fn removed_key_is_unreachable() {
        let mut sm = SlotMap::new();
        for i in 0..100u32 {
            sm.insert(i, i * 2);
        }
        for i in (0..100).step_by(3) {
            assert_eq!(sm.remove(&i), Some(i * 2));
            assert_eq!(sm.get(&i), None);
            assert!(!sm.contains_key(&i));
            assert_eq!(sm.remove(&i), None);
        }

        assert!(sm.keys().all(|k| k % 3 != 0));
        assert_eq!(sm.len(), 66);
        assert!(check_invariants(&sm));
    }

    #[test]
    fn deallocation_is_idempotent_below_thresholds() {
        let mut sm = SlotMap::new();
        for i in 0..3000 {
            sm.insert(i, i);
        }
        for i in 0..1000 {
            sm.remove(&i);
        }

        let before: Vec<_> = (0..3000).map(|i| sm.get(&i).cloned()).collect();
        assert_eq!(sm.dense_len(), 3000);
        assert!(!sm.try_deallocate());
        assert!(!sm.try_deallocate());
        assert_eq!(sm.dense_len(), 3000);

        let after: Vec<_> = (0..3000).map(|i| sm.get(&i).cloned()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn small_working_set_shrinks() {
        let mut sm = SlotMap::new();
        for i in 0..2000 {
            sm.insert(i, i);
        }

        // The 1001st garbage slot pushes both thresholds over.
        for i in 0..1000 {
            sm.remove(&i);
        }
        assert_eq!(sm.dense_len(), 2000);
        sm.remove(&1000);
        assert_eq!(sm.dense_len(), 999);
        assert_eq!(sm.garbage(), 0);

        for i in 1001..1500 {
            sm.remove(&i);
        }
        assert_eq!(sm.len(), 500);
        assert_eq!(sm.dense_len(), 999);
        assert!(check_invariants(&sm));

        let mut values: Vec<_> = sm.values().cloned().collect();
        values.sort();
        assert_eq!(values, (1500..2000).collect::<Vec<_>>());
    }

    #[test]
    fn large_map_needs_both_thresholds() {
        const LIVE: u32 = 1_000_000;
        let mut sm = SlotMap::with_capacity(LIVE as usize + 999);
        for i in 0..LIVE + 999 {
            sm.insert(i, ());
        }

        // 1,000,000 live entries and 999 garbage slots.
        for i in 0..999 {
            sm.remove(&i);
        }
        assert_eq!(sm.len(), LIVE as usize);
        assert_eq!(sm.garbage(), 999);

        // 1001 garbage slots is only 0.1% of the storage.
        sm.remove(&999);
        sm.remove(&1000);
        assert_eq!(sm.garbage(), 1001);
        assert_eq!(sm.dense_len(), LIVE as usize + 999);

        // Shrinking waits until more than 10% of the storage is garbage.
        let dense_len = sm.dense_len();
        let mut next = 1001;
        while (sm.garbage() + 1) * 10 <= dense_len {
            sm.remove(&next);
            next += 1;
            assert_eq!(sm.dense_len(), dense_len);
        }
        sm.remove(&next);
        assert_eq!(sm.dense_len(), sm.len());
        assert_eq!(sm.garbage(), 0);
    }

    #[test]
    fn retain_clear_and_drain() {
        let mut sm = SlotMap::new();
        for i in 0..10 {
            sm.insert(i, i.to_string());
        }

        sm.retain(|k, v| {
            v.push('!');
            k % 2 == 0
        });
        assert_eq!(sm.len(), 5);
        assert!(check_invariants(&sm));
        assert!(sm.values().all(|v| v.ends_with('!')));

        let mut drained: Vec<_> = sm.drain().collect();
        drained.sort();
        assert_eq!(drained[0], (0, "0!".to_string()));
        assert_eq!(drained.len(), 5);
        assert!(sm.is_empty());
        assert_eq!(sm.dense_len(), 0);
        assert!(check_invariants(&sm));

        sm.insert(3, "3".to_string());
        sm.clear();
        assert!(sm.is_empty());
        assert_eq!(sm.get(&3), None);
        assert!(check_invariants(&sm));
    }

    #[test]
    fn dropped_drain_empties_map() {
        let mut sm: SlotMap<_, _> = (0..5).map(|i| (i, i)).collect();
        sm.remove(&2);
        {
            let mut drain = sm.drain();
            assert_eq!(drain.len(), 4);
            drain.next();
        }
        assert!(sm.is_empty());
        assert_eq!(sm.iter().len(), 0);
    }

    #[test]
    fn iterators_skip_garbage() {
        let mut sm = SlotMap::with_policy(ShrinkPolicy::never());
        for i in 0..20 {
            sm.insert(i, i);
        }
        for i in 5..15 {
            sm.remove(&i);
        }
        assert_eq!(sm.garbage(), 10);

        assert_eq!(sm.iter().len(), 10);
        assert_eq!(sm.keys().count(), 10);
        for v in sm.values_mut() {
            *v *= 2;
        }
        for (k, v) in &sm {
            assert_eq!(*v, *k * 2);
        }
        let mut visited = 0;
        sm.for_each(|_, _| visited += 1);
        assert_eq!(visited, 10);

        let mut owned: Vec<_> = sm.into_iter().collect();
        owned.sort();
        assert_eq!(owned.len(), 10);
        assert_eq!(owned[9], (19, 38));
    }

    #[test]
    fn equality_ignores_slot_order() {
        let a: SlotMap<_, _> = vec![(1, 'a'), (2, 'b'), (3, 'c')].into_iter().collect();
        let mut b = SlotMap::new();
        b.insert(3, 'c');
        b.insert(0, 'z');
        b.insert(2, 'b');
        b.insert(1, 'a');
        b.remove(&0);
        assert_eq!(a, b);

        let _ = b.update(&2, 'x');
        assert_ne!(a, b);
    }

    #[test]
    fn custom_hasher_and_borrowed_lookup() {
        let mut sm: SlotMap<String, usize, fxhash::FxBuildHasher> = SlotMap::default();
        sm.extend(vec![("one".to_string(), 1), ("two".to_string(), 2)]);
        assert_eq!(sm.get("one"), Some(&1));
        assert_eq!(sm.get_key_value("two"), Some((&"two".to_string(), &2)));
        assert_eq!(sm.remove("one"), Some(1));
        assert!(check_invariants(&sm));
    }

    #[test]
    fn debug_lists_entries() {
        let mut sm = SlotMap::new();
        sm.insert(5, "five");
        let s = format!("{:?}", sm);
        assert_eq!(s, r#"{5: "five"}"#);
    }

    #[test]
    #[should_panic(expected = "invalid SlotMap key used")]
    fn index_missing_key_panics() {
        let sm: SlotMap<u8, u8> = SlotMap::new();
        let _value = sm[&1];
    }

    #[cfg(has_try_reserve)]
    #[test]
    fn try_insert_matches_insert() {
        let mut sm = SlotMap::new();
        assert_eq!(sm.try_insert(1, 'a'), Ok(Insertion::Inserted));
        assert_eq!(sm.try_insert(1, 'b'), Ok(Insertion::AlreadyExisted('a')));
        sm.remove(&1);
        assert_eq!(sm.try_insert(2, 'c'), Ok(Insertion::Inserted));
        assert_eq!(sm.dense_len(), 1);
        assert!(check_invariants(&sm));
    }

    quickcheck! {
        fn qc_slotmap_equiv_hashmap(operations: Vec<(u8, u16, u32)>) -> bool {
            let mut hm = HashMap::new();
            let mut sm = SlotMap::with_policy(ShrinkPolicy::new(4, 0.25));

            #[cfg(not(feature = "serde"))]
            let num_ops = 5;
            #[cfg(feature = "serde")]
            let num_ops = 6;

            for (op, key, val) in operations {
                let key = key % 64;
                match op % num_ops {
                    // Insert.
                    0 => {
                        let expected = hm.insert(key, val);
                        if sm.insert(key, val).replaced() != expected {
                            return false;
                        }
                    }

                    // Update.
                    1 => {
                        let expected = hm.get_mut(&key).map(|v| std::mem::replace(v, val));
                        if sm.update(&key, val).into_result().ok() != expected {
                            return false;
                        }
                    }

                    // Delete.
                    2 => {
                        if hm.remove(&key) != sm.remove(&key) {
                            return false;
                        }
                    }

                    // Access.
                    3 => {
                        if hm.contains_key(&key) != sm.contains_key(&key) ||
                           hm.get(&key) != sm.get(&key) {
                            return false;
                        }
                    }

                    // Retain.
                    4 => {
                        hm.retain(|_, v| *v % 3 != val % 3);
                        sm.retain(|_, v| *v % 3 != val % 3);
                    }

                    // Serde round-trip.
                    #[cfg(feature = "serde")]
                    5 => {
                        let ser = serde_json::to_string(&sm).unwrap();
                        sm = serde_json::from_str(&ser).unwrap();
                        sm.set_policy(ShrinkPolicy::new(4, 0.25));
                    }

                    _ => unreachable!(),
                }

                if !check_invariants(&sm) {
                    return false;
                }
            }

            let mut smkv: Vec<_> = sm.iter().collect();
            let mut hmkv: Vec<_> = hm.iter().collect();
            smkv.sort();
            hmkv.sort();
            smkv == hmkv
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn slotmap_serde() {
        let mut sm = SlotMap::new();
        sm.insert("a".to_string(), 1);
        sm.insert("b".to_string(), 2);
        sm.insert("c".to_string(), 3);
        sm.remove("a");

        let ser = serde_json::to_string(&sm).unwrap();
        assert_eq!(ser, r#"{"c":3,"b":2}"#);

        let de: SlotMap<String, i32> = serde_json::from_str(&ser).unwrap();
        assert_eq!(de, sm);
        assert_eq!(de.dense_len(), 2);
        assert!(check_invariants(&de));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn slotmap_serde_duplicate_keys() {
        let de: SlotMap<String, i32> = serde_json::from_str(r#"{"x":1,"y":2,"x":3}"#).unwrap();
        assert_eq!(de.len(), 2);
        assert_eq!(de["x"], 3);
        assert!(check_invariants(&de));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn slotmap_serde_in_struct() {
        use serde_derive::{Deserialize, Serialize};

        #[derive(Serialize, Deserialize)]
        struct Registry {
            name: String,
            users: SlotMap<u64, String>,
        }

        let mut users = SlotMap::new();
        users.insert(7, "seven".to_string());
        let reg = Registry {
            name: "r".to_string(),
            users,
        };

        let ser = serde_json::to_string(&reg).unwrap();
        let de: Registry = serde_json::from_str(&ser).unwrap();
        assert_eq!(de.name, "r");
        assert_eq!(de.users.get(&7).map(String::as_str), Some("seven"));
    }
}
