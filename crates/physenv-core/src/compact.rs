//! Swap-compact container.
//!
//! Entries are kept densely packed. A map from handle id to position
//! provides the indirection, and erasing moves the last entry into the
//! hole:
//!
//! ```text
//! entries: [ #0 a ][ #1 b ][ #2 c ][ #3 d ]     index: {0:0, 1:1, 2:2, 3:3}
//! erase(#1)
//! entries: [ #0 a ][ #3 d ][ #2 c ]             index: {0:0, 2:2, 3:1}
//! ```
//!
//! Ids come from a counter that only moves forward, so a handle is never
//! reissued and a stale handle is reported as absent forever. The price is
//! that iteration order changes whenever something is erased, and that
//! erasing while iterating is not supported; use [`CompactMap::retain`]
//! for filtered removal instead.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Index, IndexMut};
use core::slice;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{DefaultTag, Error, Handle, StableStore};

/// Dense entry: the handle is stored next to the value so a moved entry
/// can fix up its own index slot.
struct Entry<T, Tag> {
    handle: Handle<T, Tag>,
    value: T,
}

impl<T: Clone, Tag> Clone for Entry<T, Tag> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            value: self.value.clone(),
        }
    }
}

/// Stable-handle map that keeps its storage dense.
pub struct CompactMap<T, Tag = DefaultTag> {
    entries: Vec<Entry<T, Tag>>,
    /// Handle id -> position in `entries`, for live entries only.
    index: FxHashMap<usize, usize>,
    /// Id the next insert will hand out.
    next_id: usize,
}

impl<T, Tag> CompactMap<T, Tag> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
            next_id: 0,
        }
    }

    /// Creates an empty map with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            next_id: 0,
        }
    }

    /// Appends `value` under a fresh id.
    pub fn insert(&mut self, value: T) -> Handle<T, Tag> {
        let handle = Handle::new(self.next_id);
        self.next_id += 1;
        self.index.insert(handle.id(), self.entries.len());
        self.entries.push(Entry { handle, value });
        trace!(id = handle.id(), "compact insert");
        handle
    }

    /// Removes the entry named by `handle`, moving the last entry into its
    /// place.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `handle` is not in the map.
    pub fn erase(&mut self, handle: Handle<T, Tag>) -> Result<T, Error> {
        let id = handle.id();
        let pos = self.index.remove(&id).ok_or(Error::InvalidHandle { id })?;
        let removed = self.remove_at(pos);
        trace!(id, pos, "compact erase");
        Ok(removed)
    }

    /// Removes every entry named in `handles`.
    ///
    /// All handles are resolved before anything is touched: if one is
    /// unknown or appears twice, nothing is erased. Positions are then
    /// removed from the highest down, so the tail entry swapped into each
    /// hole is never one that is still waiting to be removed. The result
    /// is the same live set as erasing the handles one by one.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] naming the first offending handle.
    pub fn erase_batch<I>(&mut self, handles: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Handle<T, Tag>>,
    {
        let mut positions = handles
            .into_iter()
            .map(|h| {
                self.index
                    .get(&h.id())
                    .copied()
                    .ok_or(Error::InvalidHandle { id: h.id() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        positions.sort_unstable_by(|a, b| b.cmp(a));
        if let Some(pair) = positions.windows(2).find(|pair| pair[0] == pair[1]) {
            let id = self.entries[pair[0]].handle.id();
            return Err(Error::InvalidHandle { id });
        }

        for &pos in &positions {
            let id = self.entries[pos].handle.id();
            self.index.remove(&id);
            self.remove_at(pos);
        }
        debug!(erased = positions.len(), len = self.entries.len(), "compact batch erase");
        Ok(())
    }

    /// Swap-removes the entry at `pos` and repoints the entry that moved.
    /// The caller has already dropped the removed entry's index slot.
    fn remove_at(&mut self, pos: usize) -> T {
        let removed = self.entries.swap_remove(pos);
        if let Some(moved) = self.entries.get(pos) {
            self.index.insert(moved.handle.id(), pos);
        }
        removed.value
    }

    /// Whether `handle` is in the map.
    #[must_use]
    pub fn contains(&self, handle: Handle<T, Tag>) -> bool {
        self.index.contains_key(&handle.id())
    }

    /// Current position of `handle` in the dense storage.
    ///
    /// Only valid until the next erase of any entry.
    #[must_use]
    pub fn position(&self, handle: Handle<T, Tag>) -> Option<usize> {
        self.index.get(&handle.id()).copied()
    }

    /// Shared access to the value named by `handle`.
    #[must_use]
    pub fn get(&self, handle: Handle<T, Tag>) -> Option<&T> {
        let pos = self.position(handle)?;
        Some(&self.entries[pos].value)
    }

    /// Exclusive access to the value named by `handle`.
    pub fn get_mut(&mut self, handle: Handle<T, Tag>) -> Option<&mut T> {
        let pos = self.position(handle)?;
        Some(&mut self.entries[pos].value)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries the dense storage can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
        self.index.reserve(additional);
    }

    /// Removes every entry.
    ///
    /// The id counter keeps running, so handles issued before the clear
    /// stay stale and never collide with later inserts.
    pub fn clear(&mut self) {
        debug!(len = self.entries.len(), next_id = self.next_id, "compact clear");
        self.entries.clear();
        self.index.clear();
    }

    /// Entry at the front of the dense storage.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if the map is empty.
    pub fn front(&self) -> Result<(Handle<T, Tag>, &T), Error> {
        self.entries
            .first()
            .map(|e| (e.handle, &e.value))
            .ok_or(Error::EmptyContainer)
    }

    /// Entry at the back of the dense storage.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if the map is empty.
    pub fn back(&self) -> Result<(Handle<T, Tag>, &T), Error> {
        self.entries
            .last()
            .map(|e| (e.handle, &e.value))
            .ok_or(Error::EmptyContainer)
    }

    /// Keeps only the entries for which `keep` returns `true`.
    ///
    /// Every entry is offered exactly once, but not in storage order: the
    /// entry swapped into a freed position is offered next.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Handle<T, Tag>, &mut T) -> bool,
    {
        let before = self.entries.len();
        let mut pos = 0;
        while let Some(entry) = self.entries.get_mut(pos) {
            if keep(entry.handle, &mut entry.value) {
                pos += 1;
            } else {
                let id = entry.handle.id();
                self.index.remove(&id);
                self.remove_at(pos);
            }
        }
        debug!(erased = before - self.entries.len(), "compact retain");
    }

    /// `(handle, value)` pairs in storage order.
    pub fn iter(&self) -> Iter<'_, T, Tag> {
        Iter {
            entries: self.entries.iter(),
        }
    }

    /// `(handle, value)` pairs in storage order, values mutable.
    pub fn iter_mut(&mut self) -> IterMut<'_, T, Tag> {
        IterMut {
            entries: self.entries.iter_mut(),
        }
    }

    /// Handles in storage order.
    pub fn handles(&self) -> impl DoubleEndedIterator<Item = Handle<T, Tag>> + '_ {
        self.entries.iter().map(|e| e.handle)
    }

    /// Values in storage order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.entries.iter().map(|e| &e.value)
    }

    /// Mutable values in storage order.
    pub fn values_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut T> + '_ {
        self.entries.iter_mut().map(|e| &mut e.value)
    }
}

impl<T, Tag> Default for CompactMap<T, Tag> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, Tag> Clone for CompactMap<T, Tag> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            index: self.index.clone(),
            next_id: self.next_id,
        }
    }
}

impl<T: fmt::Debug, Tag> fmt::Debug for CompactMap<T, Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T, Tag> Index<Handle<T, Tag>> for CompactMap<T, Tag> {
    type Output = T;

    /// # Panics
    ///
    /// If `handle` is not in the map.
    fn index(&self, handle: Handle<T, Tag>) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("{}", Error::InvalidHandle { id: handle.id() }),
        }
    }
}

impl<T, Tag> IndexMut<Handle<T, Tag>> for CompactMap<T, Tag> {
    fn index_mut(&mut self, handle: Handle<T, Tag>) -> &mut T {
        match self.get_mut(handle) {
            Some(value) => value,
            None => panic!("{}", Error::InvalidHandle { id: handle.id() }),
        }
    }
}

impl<T, Tag> FromIterator<T> for CompactMap<T, Tag> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<T, Tag> Extend<T> for CompactMap<T, Tag> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, Tag> IntoIterator for &'a CompactMap<T, Tag> {
    type Item = (Handle<T, Tag>, &'a T);
    type IntoIter = Iter<'a, T, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, Tag> IntoIterator for &'a mut CompactMap<T, Tag> {
    type Item = (Handle<T, Tag>, &'a mut T);
    type IntoIter = IterMut<'a, T, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, Tag> StableStore<T, Tag> for CompactMap<T, Tag> {
    type Iter<'a>
        = Iter<'a, T, Tag>
    where
        Self: 'a,
        T: 'a;

    fn insert(&mut self, value: T) -> Handle<T, Tag> {
        Self::insert(self, value)
    }

    fn erase(&mut self, handle: Handle<T, Tag>) -> Result<T, Error> {
        Self::erase(self, handle)
    }

    fn erase_batch<I>(&mut self, handles: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Handle<T, Tag>>,
    {
        Self::erase_batch(self, handles)
    }

    fn contains(&self, handle: Handle<T, Tag>) -> bool {
        Self::contains(self, handle)
    }

    fn get(&self, handle: Handle<T, Tag>) -> Option<&T> {
        Self::get(self, handle)
    }

    fn get_mut(&mut self, handle: Handle<T, Tag>) -> Option<&mut T> {
        Self::get_mut(self, handle)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn reserve(&mut self, additional: usize) {
        Self::reserve(self, additional);
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn iter(&self) -> Self::Iter<'_> {
        Self::iter(self)
    }

    fn front(&self) -> Result<(Handle<T, Tag>, &T), Error> {
        Self::front(self)
    }

    fn back(&self) -> Result<(Handle<T, Tag>, &T), Error> {
        Self::back(self)
    }
}

/// Iterator over the entries of a [`CompactMap`].
pub struct Iter<'a, T, Tag = DefaultTag> {
    entries: slice::Iter<'a, Entry<T, Tag>>,
}

impl<'a, T, Tag> Iterator for Iter<'a, T, Tag> {
    type Item = (Handle<T, Tag>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|e| (e.handle, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<T, Tag> DoubleEndedIterator for Iter<'_, T, Tag> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back().map(|e| (e.handle, &e.value))
    }
}

impl<T, Tag> ExactSizeIterator for Iter<'_, T, Tag> {}

impl<T, Tag> FusedIterator for Iter<'_, T, Tag> {}

/// Mutable iterator over the entries of a [`CompactMap`].
pub struct IterMut<'a, T, Tag = DefaultTag> {
    entries: slice::IterMut<'a, Entry<T, Tag>>,
}

impl<'a, T, Tag> Iterator for IterMut<'a, T, Tag> {
    type Item = (Handle<T, Tag>, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|e| (e.handle, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<T, Tag> DoubleEndedIterator for IterMut<'_, T, Tag> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back().map(|e| (e.handle, &mut e.value))
    }
}

impl<T, Tag> ExactSizeIterator for IterMut<'_, T, Tag> {}

impl<T, Tag> FusedIterator for IterMut<'_, T, Tag> {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Index and entries must be exact inverses of each other.
    fn assert_consistent<T>(map: &CompactMap<T>) {
        assert_eq!(map.index.len(), map.entries.len());
        for (pos, entry) in map.entries.iter().enumerate() {
            assert_eq!(map.index.get(&entry.handle.id()), Some(&pos));
        }
    }

    #[test]
    fn erase_moves_tail_into_hole() {
        let mut map = CompactMap::<char>::new();
        let hs: Vec<_> = "abcd".chars().map(|c| map.insert(c)).collect();

        assert_eq!(map.erase(hs[1]), Ok('b'));
        assert_eq!(map.values().copied().collect::<String>(), "adc");
        assert_eq!(map.position(hs[3]), Some(1));
        assert_eq!(map[hs[3]], 'd');
        assert_consistent(&map);
    }

    #[test]
    fn erasing_last_entry_is_a_pop() {
        let mut map: CompactMap<i32> = (0..3).collect();
        let last = map.back().map(|(h, _)| h).expect("back");
        map.erase(last).expect("erase");
        assert_eq!(map.values().copied().collect::<Vec<_>>(), [0, 1]);
        assert_consistent(&map);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut map = CompactMap::<u8>::new();
        let a = map.insert(1);
        map.erase(a).expect("erase");
        let b = map.insert(2);
        assert_ne!(a, b);
        assert!(!map.contains(a));
        assert_eq!(map.erase(a), Err(Error::InvalidHandle { id: a.id() }));

        map.clear();
        let c = map.insert(3);
        assert!(!map.contains(b));
        assert_eq!(c.id(), 2);
    }

    #[test]
    fn batch_rejects_unknown_or_repeated_handles_atomically() {
        let mut map: CompactMap<i32> = (0..5).collect();
        let hs: Vec<_> = map.handles().collect();
        let gone = hs[4];
        map.erase(gone).expect("erase");

        assert_eq!(
            map.erase_batch([hs[0], gone]),
            Err(Error::InvalidHandle { id: gone.id() })
        );
        assert_eq!(
            map.erase_batch([hs[1], hs[2], hs[1]]),
            Err(Error::InvalidHandle { id: hs[1].id() })
        );
        assert_eq!(map.len(), 4);
        assert_consistent(&map);
    }

    #[test]
    fn batch_including_the_tail() {
        let mut map: CompactMap<i32> = (0..6).collect();
        let hs: Vec<_> = map.handles().collect();
        // The tail itself and an early hole that it would otherwise fill.
        map.erase_batch([hs[5], hs[0], hs[4]]).expect("batch");

        let mut left: Vec<_> = map.values().copied().collect();
        left.sort_unstable();
        assert_eq!(left, [1, 2, 3]);
        assert_consistent(&map);
    }

    #[test]
    fn retain_offers_swapped_entries() {
        let mut map: CompactMap<i32> = (0..10).collect();
        let mut seen = Vec::new();
        map.retain(|_, x| {
            seen.push(*x);
            *x % 2 == 1
        });
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());

        let mut left: Vec<_> = map.values().copied().collect();
        left.sort_unstable();
        assert_eq!(left, [1, 3, 5, 7, 9]);
        assert_consistent(&map);
    }

    #[test]
    fn front_back_on_empty() {
        let map = CompactMap::<i32>::new();
        assert_eq!(map.front(), Err(Error::EmptyContainer));
        assert_eq!(map.back(), Err(Error::EmptyContainer));
    }

    #[test]
    fn iter_mut_updates_in_place() {
        let mut map: CompactMap<i32> = (1..=3).collect();
        for (_, v) in &mut map {
            *v *= 10;
        }
        assert_eq!(map.iter().rev().map(|(_, &v)| v).collect::<Vec<_>>(), [30, 20, 10]);
    }
}
