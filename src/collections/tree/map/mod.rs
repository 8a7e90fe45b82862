//! A module containing [`OrderedMultiMap`] and associated types.
//!
//! The map is used through its two policy aliases, [`TreeMap`] (unique keys) and [`TreeMultiMap`]
//! (duplicate keys allowed, kept in insertion order). Beyond the map itself, this module provides
//! owned and borrowed iteration over entries, keys and values, along with the detached
//! [`ExtractedNode`] type used to move entries between maps without reallocating them.
//!
//! As with [`HashMap`](std::collections::HashMap), there is no mutable iterator over keys, because
//! changing a key in place would break the map's ordering.

mod extracted;
mod iter;
mod ordered_map;
mod tests;

pub use extracted::*;
pub use iter::*;
pub use ordered_map::*;
