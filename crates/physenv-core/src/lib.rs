#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Stable-handle containers for the physics environment.
//!
//! Two containers hand out [`Handle`]s that stay meaningful while the
//! container is mutated by someone else:
//!
//! | | [`TombstoneVec`] | [`CompactMap`] |
//! |---|---|---|
//! | insert | O(1) amortized | O(1) amortized |
//! | erase | O(1) | O(1) |
//! | contains / index | O(1) direct | O(1) via map |
//! | iteration order | stable | changes on erase |
//! | handle reuse | yes | never |
//! | erase while walking | yes, via cursor | no |
//!
//! Both implement [`StableStore`], so code that does not care which
//! variant it is handed can stay generic over it.

mod compact;
mod error;
mod handle;
mod store;
mod tombstone;

pub use compact::CompactMap;
pub use error::Error;
pub use handle::{DefaultTag, Handle};
pub use store::StableStore;
pub use tombstone::TombstoneVec;

/// Iterators returned by the containers.
pub mod iter {
    pub use crate::compact::{Iter as CompactIter, IterMut as CompactIterMut};
    pub use crate::tombstone::{Iter as TombstoneIter, IterMut as TombstoneIterMut};
}
