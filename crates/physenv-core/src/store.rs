//! Capability trait shared by both containers.

use crate::{DefaultTag, Error, Handle};

/// Insert / erase / lookup / iterate over values named by [`Handle`]s.
///
/// Both [`TombstoneVec`] and [`CompactMap`] implement this. Callers that
/// are tied to one variant should use its inherent methods; the trait is
/// for code that must work with either, and is meant to be used through
/// generics rather than `dyn`.
///
/// [`TombstoneVec`]: crate::TombstoneVec
/// [`CompactMap`]: crate::CompactMap
pub trait StableStore<T, Tag = DefaultTag> {
    /// Iterator over live `(handle, value)` pairs.
    type Iter<'a>: DoubleEndedIterator<Item = (Handle<T, Tag>, &'a T)> + ExactSizeIterator
    where
        Self: 'a,
        T: 'a;

    /// Stores `value` and returns the handle that names it.
    fn insert(&mut self, value: T) -> Handle<T, Tag>;

    /// Removes the element named by `handle` and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `handle` does not name a live element.
    fn erase(&mut self, handle: Handle<T, Tag>) -> Result<T, Error>;

    /// Removes every element named in `handles`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] for the first handle that is not live.
    /// Whether earlier handles of the batch stay erased depends on the
    /// implementation.
    fn erase_batch<I>(&mut self, handles: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Handle<T, Tag>>;

    /// Whether `handle` names a live element.
    fn contains(&self, handle: Handle<T, Tag>) -> bool;

    /// Shared access to the element named by `handle`.
    fn get(&self, handle: Handle<T, Tag>) -> Option<&T>;

    /// Exclusive access to the element named by `handle`.
    fn get_mut(&mut self, handle: Handle<T, Tag>) -> Option<&mut T>;

    /// Number of live elements.
    fn len(&self) -> usize;

    /// Reserves room for at least `additional` more elements.
    fn reserve(&mut self, additional: usize);

    /// Removes every element. All previously issued handles become stale.
    fn clear(&mut self);

    /// Live elements with their handles.
    fn iter(&self) -> Self::Iter<'_>;

    /// Whether there are no live elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Like [`get`](Self::get), but reports a stale handle as an error.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `handle` does not name a live element.
    fn try_get(&self, handle: Handle<T, Tag>) -> Result<&T, Error> {
        self.get(handle).ok_or(Error::InvalidHandle { id: handle.id() })
    }

    /// First live element in iteration order.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if nothing is stored.
    fn front(&self) -> Result<(Handle<T, Tag>, &T), Error> {
        self.iter().next().ok_or(Error::EmptyContainer)
    }

    /// Last live element in iteration order.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if nothing is stored.
    fn back(&self) -> Result<(Handle<T, Tag>, &T), Error> {
        self.iter().next_back().ok_or(Error::EmptyContainer)
    }
}
