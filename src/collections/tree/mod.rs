//! Ordered collections backed by a self-balancing binary tree.
//!
//! The family consists of a single map type, [`OrderedMultiMap`], and a set built on top of it,
//! [`OrderedMultiSet`]. Each is parameterised by:
//! - A [`KeyPolicy`], which is either [`Unique`] or [`Multi`] and decides whether equivalent keys
//!   may be stored more than once.
//! - A [`Comparator`], which orders the keys. [`Natural`] (the default) uses [`Ord`].
//!
//! The common combinations are available as aliases:
//!
//! | Alias | Policy | Semantics |
//! |-|-|-|
//! | [`TreeMap`] | [`Unique`] | Sorted map |
//! | [`TreeMultiMap`] | [`Multi`] | Sorted map with duplicate keys |
//! | [`TreeSet`] | [`Unique`] | Sorted set |
//! | [`TreeMultiSet`] | [`Multi`] | Sorted set with duplicate items |
//!
//! Entries with equivalent keys in a multi collection are always kept in insertion order.
//!
//! ```
//! # use ordered_collections::collections::tree::TreeMultiMap;
//! let mut map = TreeMultiMap::new();
//! map.insert(2, 'c');
//! map.insert(2, 'e');
//! map.insert(1, 'a');
//! assert_eq!(
//!     map.into_iter().collect::<Vec<_>>(),
//!     [(1, 'a'), (2, 'c'), (2, 'e')]
//! );
//! ```

pub mod compare;
pub mod map;
pub(crate) mod node;
pub mod policy;
mod position;
pub mod set;

pub use compare::{ByLess, Comparator, Descending, EntryComparator, Natural};
pub use map::{OrderedMultiMap, TreeMap, TreeMultiMap};
pub use policy::{KeyPolicy, Multi, Unique};
pub use position::*;
pub use set::{OrderedMultiSet, TreeMultiSet, TreeSet};

pub use crate::util::error::PositionError;
