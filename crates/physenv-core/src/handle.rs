//! Typed handle referencing an element of a stable container.
//!
//! A handle is a plain id plus two phantom parameters: the element type and
//! an optional tag. Handles of different element types or tags are distinct
//! types, so a point handle cannot be passed where a spring handle is
//! expected. Only the containers in this crate mint handles.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ops::{Add, Sub};

/// Tag used when a container is not given one explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DefaultTag;

/// Weak, non-owning reference to an element of a [`TombstoneVec`] or a
/// [`CompactMap`].
///
/// Holding a handle does not keep the element alive. Use the container's
/// `contains` to find out whether it still names something.
///
/// [`TombstoneVec`]: crate::TombstoneVec
/// [`CompactMap`]: crate::CompactMap
pub struct Handle<T, Tag = DefaultTag> {
    id: usize,
    // fn() keeps the handle Copy + Send + Sync whatever T is.
    marker: PhantomData<fn() -> (T, Tag)>,
}

impl<T, Tag> Handle<T, Tag> {
    pub(crate) const fn new(id: usize) -> Self {
        Self {
            id,
            marker: PhantomData,
        }
    }

    /// Raw id of the handle, for hashing or building lookup tables.
    #[must_use]
    pub const fn id(self) -> usize {
        self.id
    }

    /// Handle `n` ids below this one, or `None` if that would underflow.
    #[must_use]
    pub const fn checked_sub(self, n: usize) -> Option<Self> {
        match self.id.checked_sub(n) {
            Some(id) => Some(Self::new(id)),
            None => None,
        }
    }
}

// Manual impls: derives would demand `T: Clone`, `T: Eq`, ...

impl<T, Tag> Clone for Handle<T, Tag> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, Tag> Copy for Handle<T, Tag> {}

impl<T, Tag> PartialEq for Handle<T, Tag> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T, Tag> Eq for Handle<T, Tag> {}

impl<T, Tag> PartialOrd for Handle<T, Tag> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, Tag> Ord for Handle<T, Tag> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T, Tag> Hash for Handle<T, Tag> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T, Tag> fmt::Debug for Handle<T, Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.id)
    }
}

impl<T, Tag> fmt::Display for Handle<T, Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

impl<T, Tag> From<Handle<T, Tag>> for usize {
    fn from(handle: Handle<T, Tag>) -> Self {
        handle.id
    }
}

/// Offsetting is meant for walking a run of handles a container issued
/// back to back (a grid of points, say). The result is only as good as
/// that assumption; `contains` tells the truth.
impl<T, Tag> Add<usize> for Handle<T, Tag> {
    type Output = Self;

    fn add(self, rhs: usize) -> Self {
        Self::new(self.id + rhs)
    }
}

impl<T, Tag> Sub<usize> for Handle<T, Tag> {
    type Output = Self;

    fn sub(self, rhs: usize) -> Self {
        Self::new(self.id - rhs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct Marker;

    #[test]
    fn equality_and_order_follow_the_id() {
        let a = Handle::<Marker>::new(3);
        let b = Handle::<Marker>::new(3);
        let c = Handle::<Marker>::new(7);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
        assert_eq!(usize::from(c), 7);
    }

    #[test]
    fn copy_without_element_bounds() {
        // Marker is neither Clone nor Hash.
        let a = Handle::<Marker>::new(1);
        let b = a;
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn offsets() {
        let base = Handle::<Marker>::new(10);
        assert_eq!((base + 5).id(), 15);
        assert_eq!((base - 4).id(), 6);
        assert_eq!(base.checked_sub(10).map(Handle::id), Some(0));
        assert!(base.checked_sub(11).is_none());
    }

    #[test]
    fn same_size_as_usize() {
        assert_eq!(size_of::<Handle<Marker>>(), size_of::<usize>());
    }

    #[test]
    fn formatting() {
        let h = Handle::<Marker>::new(4);
        assert_eq!(format!("{h:?}"), "Handle(4)");
        assert_eq!(h.to_string(), "#4");
    }
}
