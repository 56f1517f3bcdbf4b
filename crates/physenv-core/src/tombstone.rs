//! Tombstone container.
//!
//! Elements live at a fixed position of the backing vector for as long as
//! they exist, and the handle *is* that position. Erasing empties the slot
//! and pushes its position on a free list; the next insert pops it again:
//!
//! ```text
//! slots:  [ a ][ - ][ c ][ - ][ e ]      free: [1, 3]
//! insert(x) -> #3                        free: [1]
//! slots:  [ a ][ - ][ c ][ x ][ e ]
//! ```
//!
//! Storage never shrinks. Because positions never move, any element may be
//! erased while a walk over the container is in progress (see
//! [`TombstoneVec::next_handle`]).
//!
//! Reusing positions means reusing handle ids: after `erase(a)` and
//! `insert(b)`, the stale handle of `a` may name `b`. `contains` cannot
//! tell the two apart. Prefer [`CompactMap`](crate::CompactMap) when
//! stale handles can outlive their element.

use core::fmt;
use core::iter::{Enumerate, FusedIterator};
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use core::slice;

use tracing::{debug, trace};

use crate::{DefaultTag, Error, Handle, StableStore};

/// Stable-handle vector that leaves tombstones behind on erase.
pub struct TombstoneVec<T, Tag = DefaultTag> {
    /// Backing storage; `None` marks a dead slot.
    slots: Vec<Option<T>>,
    /// Positions of dead slots, most recently freed last.
    free_list: Vec<usize>,
    /// Number of live slots.
    len: usize,
    tag: PhantomData<fn() -> Tag>,
}

impl<T, Tag> TombstoneVec<T, Tag> {
    /// Creates an empty container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            tag: PhantomData,
        }
    }

    /// Creates an empty container with room for `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Stores `value`, reusing the most recently freed slot if any.
    pub fn insert(&mut self, value: T) -> Handle<T, Tag> {
        let id = match self.free_list.pop() {
            Some(id) => {
                self.slots[id] = Some(value);
                id
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        };
        self.len += 1;
        trace!(id, "tombstone insert");
        Handle::new(id)
    }

    /// Empties the slot named by `handle` and returns its value.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if the slot is out of range or already
    /// dead. Rejecting a second erase keeps the free list free of
    /// duplicates.
    pub fn erase(&mut self, handle: Handle<T, Tag>) -> Result<T, Error> {
        let id = handle.id();
        let value = self
            .slots
            .get_mut(id)
            .and_then(Option::take)
            .ok_or(Error::InvalidHandle { id })?;
        self.free_list.push(id);
        self.len -= 1;
        trace!(id, "tombstone erase");
        Ok(value)
    }

    /// Erases each handle in turn.
    ///
    /// # Errors
    ///
    /// Stops at the first handle that is not live and returns
    /// [`Error::InvalidHandle`]. Handles before it stay erased.
    pub fn erase_batch<I>(&mut self, handles: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Handle<T, Tag>>,
    {
        let before = self.len;
        let result = handles.into_iter().try_for_each(|h| self.erase(h).map(drop));
        debug!(erased = before - self.len, ok = result.is_ok(), "tombstone batch erase");
        result
    }

    /// Whether `handle` names a live slot.
    #[must_use]
    pub fn contains(&self, handle: Handle<T, Tag>) -> bool {
        self.slots.get(handle.id()).is_some_and(Option::is_some)
    }

    /// Shared access to the live value at `handle`.
    #[must_use]
    pub fn get(&self, handle: Handle<T, Tag>) -> Option<&T> {
        self.slots.get(handle.id())?.as_ref()
    }

    /// Exclusive access to the live value at `handle`.
    pub fn get_mut(&mut self, handle: Handle<T, Tag>) -> Option<&mut T> {
        self.slots.get_mut(handle.id())?.as_mut()
    }

    /// Number of live elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no live elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, live or dead, held by the backing vector.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slots the backing vector can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Reserves room so that `additional` more inserts do not reallocate.
    pub fn reserve(&mut self, additional: usize) {
        let spare = self.free_list.len();
        self.slots.reserve(additional.saturating_sub(spare));
    }

    /// Drops every element and all storage bookkeeping.
    ///
    /// Ids start again from zero, so every old handle may alias a future
    /// element.
    pub fn clear(&mut self) {
        debug!(len = self.len, "tombstone clear");
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }

    /// First live element in storage order.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if nothing is stored.
    pub fn front(&self) -> Result<(Handle<T, Tag>, &T), Error> {
        self.iter().next().ok_or(Error::EmptyContainer)
    }

    /// Last live element in storage order.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if nothing is stored.
    pub fn back(&self) -> Result<(Handle<T, Tag>, &T), Error> {
        self.iter().next_back().ok_or(Error::EmptyContainer)
    }

    /// Handle of the first live slot.
    #[must_use]
    pub fn first_handle(&self) -> Option<Handle<T, Tag>> {
        self.live_from(0)
    }

    /// Handle of the last live slot.
    #[must_use]
    pub fn last_handle(&self) -> Option<Handle<T, Tag>> {
        self.live_before(self.slots.len())
    }

    /// Handle of the first live slot after `handle`.
    ///
    /// `handle` itself need not be live any more, which is what makes
    /// erase-while-walking work:
    ///
    /// ```
    /// # use physenv_core::TombstoneVec;
    /// let mut v: TombstoneVec<i32> = (0..6).collect();
    /// let mut cursor = v.first_handle();
    /// while let Some(h) = cursor {
    ///     cursor = v.next_handle(h);
    ///     if v[h] % 2 == 0 {
    ///         v.erase(h).unwrap();
    ///     }
    /// }
    /// assert_eq!(v.values().copied().collect::<Vec<_>>(), [1, 3, 5]);
    /// ```
    #[must_use]
    pub fn next_handle(&self, handle: Handle<T, Tag>) -> Option<Handle<T, Tag>> {
        self.live_from(handle.id().saturating_add(1))
    }

    /// Handle of the last live slot before `handle`.
    #[must_use]
    pub fn prev_handle(&self, handle: Handle<T, Tag>) -> Option<Handle<T, Tag>> {
        self.live_before(handle.id().min(self.slots.len()))
    }

    fn live_from(&self, start: usize) -> Option<Handle<T, Tag>> {
        let tail = self.slots.get(start..)?;
        tail.iter()
            .position(Option::is_some)
            .map(|offset| Handle::new(start + offset))
    }

    fn live_before(&self, end: usize) -> Option<Handle<T, Tag>> {
        self.slots[..end]
            .iter()
            .rposition(Option::is_some)
            .map(Handle::new)
    }

    /// Keeps only the elements for which `keep` returns `true`.
    ///
    /// Visits live slots in storage order; erased slots go on the free list.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Handle<T, Tag>, &mut T) -> bool,
    {
        let before = self.len;
        for (id, slot) in self.slots.iter_mut().enumerate() {
            let Some(value) = slot else { continue };
            if !keep(Handle::new(id), value) {
                *slot = None;
                self.free_list.push(id);
                self.len -= 1;
            }
        }
        debug!(erased = before - self.len, "tombstone retain");
    }

    /// Live `(handle, value)` pairs in storage order.
    pub fn iter(&self) -> Iter<'_, T, Tag> {
        Iter {
            slots: self.slots.iter().enumerate(),
            remaining: self.len,
            tag: PhantomData,
        }
    }

    /// Live `(handle, value)` pairs in storage order, values mutable.
    pub fn iter_mut(&mut self) -> IterMut<'_, T, Tag> {
        IterMut {
            slots: self.slots.iter_mut().enumerate(),
            remaining: self.len,
            tag: PhantomData,
        }
    }

    /// Handles of the live elements in storage order.
    pub fn handles(&self) -> impl DoubleEndedIterator<Item = Handle<T, Tag>> + '_ {
        self.iter().map(|(h, _)| h)
    }

    /// Live values in storage order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

impl<T, Tag> Default for TombstoneVec<T, Tag> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, Tag> Clone for TombstoneVec<T, Tag> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            free_list: self.free_list.clone(),
            len: self.len,
            tag: PhantomData,
        }
    }
}

impl<T: fmt::Debug, Tag> fmt::Debug for TombstoneVec<T, Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T, Tag> Index<Handle<T, Tag>> for TombstoneVec<T, Tag> {
    type Output = T;

    /// # Panics
    ///
    /// If `handle` does not name a live slot.
    fn index(&self, handle: Handle<T, Tag>) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("{}", Error::InvalidHandle { id: handle.id() }),
        }
    }
}

impl<T, Tag> IndexMut<Handle<T, Tag>> for TombstoneVec<T, Tag> {
    fn index_mut(&mut self, handle: Handle<T, Tag>) -> &mut T {
        match self.get_mut(handle) {
            Some(value) => value,
            None => panic!("{}", Error::InvalidHandle { id: handle.id() }),
        }
    }
}

impl<T, Tag> FromIterator<T> for TombstoneVec<T, Tag> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        vec.extend(iter);
        vec
    }
}

impl<T, Tag> Extend<T> for TombstoneVec<T, Tag> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, Tag> IntoIterator for &'a TombstoneVec<T, Tag> {
    type Item = (Handle<T, Tag>, &'a T);
    type IntoIter = Iter<'a, T, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, Tag> IntoIterator for &'a mut TombstoneVec<T, Tag> {
    type Item = (Handle<T, Tag>, &'a mut T);
    type IntoIter = IterMut<'a, T, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, Tag> StableStore<T, Tag> for TombstoneVec<T, Tag> {
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
        self.len
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
}

/// Iterator over the live slots of a [`TombstoneVec`].
pub struct Iter<'a, T, Tag = DefaultTag> {
    slots: Enumerate<slice::Iter<'a, Option<T>>>,
    remaining: usize,
    tag: PhantomData<fn() -> Tag>,
}

impl<'a, T, Tag> Iterator for Iter<'a, T, Tag> {
    type Item = (Handle<T, Tag>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self
            .slots
            .find_map(|(id, slot)| slot.as_ref().map(|v| (Handle::new(id), v)))?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, Tag> DoubleEndedIterator for Iter<'_, T, Tag> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let item = self
            .slots
            .by_ref()
            .rev()
            .find_map(|(id, slot)| slot.as_ref().map(|v| (Handle::new(id), v)))?;
        self.remaining -= 1;
        Some(item)
    }
}

impl<T, Tag> ExactSizeIterator for Iter<'_, T, Tag> {}

impl<T, Tag> FusedIterator for Iter<'_, T, Tag> {}

/// Mutable iterator over the live slots of a [`TombstoneVec`].
pub struct IterMut<'a, T, Tag = DefaultTag> {
    slots: Enumerate<slice::IterMut<'a, Option<T>>>,
    remaining: usize,
    tag: PhantomData<fn() -> Tag>,
}

impl<'a, T, Tag> Iterator for IterMut<'a, T, Tag> {
    type Item = (Handle<T, Tag>, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self
            .slots
            .find_map(|(id, slot)| slot.as_mut().map(|v| (Handle::new(id), v)))?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, Tag> DoubleEndedIterator for IterMut<'_, T, Tag> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let item = self
            .slots
            .by_ref()
            .rev()
            .find_map(|(id, slot)| slot.as_mut().map(|v| (Handle::new(id), v)))?;
        self.remaining -= 1;
        Some(item)
    }
}

impl<T, Tag> ExactSizeIterator for IterMut<'_, T, Tag> {}

impl<T, Tag> FusedIterator for IterMut<'_, T, Tag> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erase_reuses_most_recent_slot() {
        let mut v = TombstoneVec::<&str>::new();
        let a = v.insert("a");
        let b = v.insert("b");
        let c = v.insert("c");

        v.erase(a).expect("erase a");
        v.erase(c).expect("erase c");
        assert_eq!(v.len(), 1);
        assert_eq!(v.slot_count(), 3);

        // LIFO: c's slot comes back first.
        assert_eq!(v.insert("d"), c);
        assert_eq!(v.insert("e"), a);
        assert_eq!(v.insert("f").id(), 3);
        assert_eq!(v[b], "b");
    }

    #[test]
    fn double_erase_is_rejected_and_free_list_stays_clean() {
        let mut v = TombstoneVec::<u8>::new();
        let h = v.insert(1);
        assert_eq!(v.erase(h), Ok(1));
        assert_eq!(v.erase(h), Err(Error::InvalidHandle { id: h.id() }));
        assert_eq!(v.free_list, vec![h.id()]);

        // One reuse only, then fresh slots.
        assert_eq!(v.insert(2), h);
        assert_eq!(v.insert(3).id(), 1);
    }

    #[test]
    fn out_of_range_handle() {
        let mut v = TombstoneVec::<u8>::new();
        v.insert(0);
        let far = Handle::new(10);
        assert!(!v.contains(far));
        assert!(v.get(far).is_none());
        assert_eq!(v.erase(far), Err(Error::InvalidHandle { id: 10 }));
    }

    #[test]
    fn iteration_skips_dead_slots_both_ways() {
        let mut v: TombstoneVec<i32> = (0..6).collect();
        v.erase(Handle::new(0)).expect("erase");
        v.erase(Handle::new(3)).expect("erase");
        v.erase(Handle::new(5)).expect("erase");

        let forward: Vec<_> = v.iter().map(|(h, &x)| (h.id(), x)).collect();
        assert_eq!(forward, [(1, 1), (2, 2), (4, 4)]);
        let backward: Vec<_> = v.values().rev().copied().collect();
        assert_eq!(backward, [4, 2, 1]);

        let mut it = v.iter();
        assert_eq!(it.len(), 3);
        it.next();
        it.next_back();
        assert_eq!(it.len(), 1);
        assert_eq!(it.next().map(|(_, &x)| x), Some(2));
        assert!(it.next().is_none());
    }

    #[test]
    fn iter_mut_meets_in_the_middle() {
        let mut v: TombstoneVec<i32> = (0..4).collect();
        let mut it = v.iter_mut();
        if let Some((_, x)) = it.next() {
            *x += 10;
        }
        if let Some((_, x)) = it.next_back() {
            *x += 20;
        }
        assert_eq!(it.count(), 2);
        assert_eq!(v.values().copied().collect::<Vec<_>>(), [10, 1, 2, 23]);
    }

    #[test]
    fn front_back_and_cursor() {
        let mut v = TombstoneVec::<char>::new();
        assert_eq!(v.front(), Err(Error::EmptyContainer));
        assert_eq!(v.first_handle(), None);

        let hs: Vec<_> = "abcd".chars().map(|c| v.insert(c)).collect();
        v.erase(hs[0]).expect("erase");
        v.erase(hs[3]).expect("erase");

        assert_eq!(v.front().map(|(_, &c)| c), Ok('b'));
        assert_eq!(v.back().map(|(_, &c)| c), Ok('c'));
        assert_eq!(v.first_handle(), Some(hs[1]));
        assert_eq!(v.last_handle(), Some(hs[2]));
        // Dead handles still work as cursor positions.
        assert_eq!(v.next_handle(hs[0]), Some(hs[1]));
        assert_eq!(v.prev_handle(hs[3]), Some(hs[2]));
        assert_eq!(v.next_handle(hs[2]), None);
        assert_eq!(v.prev_handle(hs[1]), None);
    }

    #[test]
    fn cursor_survives_erasing_around_it() {
        let mut v: TombstoneVec<i32> = (0..8).collect();
        let h = |id| Handle::new(id);

        let mut visited = Vec::new();
        let mut cursor = v.first_handle();
        while let Some(at) = cursor {
            visited.push(v[at]);
            if v[at] == 2 {
                // One ahead, one behind, then the current element.
                v.erase(h(4)).expect("erase ahead");
                v.erase(h(0)).expect("erase behind");
                v.erase(at).expect("erase current");
            }
            cursor = v.next_handle(at);
        }
        assert_eq!(visited, [0, 1, 2, 3, 5, 6, 7]);
        assert_eq!(v.values().copied().collect::<Vec<_>>(), [1, 3, 5, 6, 7]);

        visited.clear();
        let mut cursor = v.last_handle();
        while let Some(at) = cursor {
            visited.push(v[at]);
            if v[at] == 5 {
                v.erase(h(7)).expect("erase behind");
                v.erase(h(3)).expect("erase ahead");
            }
            cursor = v.prev_handle(at);
        }
        assert_eq!(visited, [7, 6, 5, 1]);
        assert_eq!(v.values().copied().collect::<Vec<_>>(), [1, 5, 6]);
    }

    #[test]
    fn retain_frees_slots() {
        let mut v: TombstoneVec<i32> = (0..10).collect();
        v.retain(|_, x| *x % 3 == 0);
        assert_eq!(v.len(), 4);
        assert_eq!(v.free_list.len(), 6);
        assert_eq!(v.values().copied().collect::<Vec<_>>(), [0, 3, 6, 9]);
    }

    #[test]
    fn clear_restarts_ids() {
        let mut v: TombstoneVec<i32> = (0..3).collect();
        v.clear();
        assert!(v.is_empty());
        assert_eq!(v.insert(7).id(), 0);
    }

    #[test]
    #[should_panic(expected = "does not refer to a live element")]
    fn index_on_dead_slot_panics() {
        let mut v = TombstoneVec::<i32>::new();
        let h = v.insert(1);
        v.erase(h).expect("erase");
        let _ = v[h];
    }
}
