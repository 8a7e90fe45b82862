use std::borrow::Borrow;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem;
use std::ops::Index;

use tracing::trace;

use super::{
    ExtractedNode, InsertOrAssign, IntoKeys, IntoValues, Iter, IterMut, Keys, NodeInsert, Values,
    ValuesMut,
};
use crate::collections::tree::compare::{Comparator, EntryComparator, Natural};
use crate::collections::tree::node::{Side, Slot, Tree};
use crate::collections::tree::policy::{KeyPolicy, Multi, Unique};
use crate::collections::tree::Position;
use crate::util::error::PositionError;
use crate::util::fmt::DebugRaw;
use crate::util::option::OptionExtension;
use crate::util::result::ResultExtension;

/// A map of keys to values, sorted by a [`Comparator`] and backed by a self-balancing binary
/// tree.
///
/// Whether equivalent keys may be stored more than once is decided by the [`KeyPolicy`] `P`,
/// which is normally picked through one of the aliases [`TreeMap`] (unique keys) or
/// [`TreeMultiMap`] (duplicate keys, kept in the order they were inserted). The comparator `C` is
/// stored in the map and fixed for its whole lifetime.
///
/// Entries can be addressed by [`Position`]s, which remain valid until their own entry is
/// removed, no matter what else is inserted or erased.
///
/// It is a logic error for a key to be modified in a way that changes its ordering while it is in
/// the map. The API only hands out shared references to stored keys; to change a key, the entry
/// must be [extracted](OrderedMultiMap::extract) and reinserted.
///
/// The map performs no synchronization. Sharing one between threads requires external locking,
/// exactly like any other `&mut`-mutated collection.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of entries in the map.
/// - `k`: The number of entries affected by the operation.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `insert` | `O(log n)` |
/// | `insert_hint` | `O(1)`*, `O(log n)` |
/// | `find` / `get` / `contains` | `O(log n)` |
/// | `lower_bound` / `upper_bound` | `O(log n)` |
/// | `count` | `O(log n + k)` |
/// | `erase` / `extract` | `O(log n)` |
/// | `remove` | `O(k log n)` |
/// | `erase_if` / `retain` | `O(n)` |
/// | `merge` | `O(k log(n + k))` |
/// | `swap` | `O(1)` |
/// | `clear` | `O(n)` |
///
/// \* When the hint is exactly where the entry belongs, no search is needed. Rebalancing still
/// walks upwards, but stops as soon as a subtree's height is unchanged.
pub struct OrderedMultiMap<K, V, P = Unique, C = Natural> {
    pub(crate) tree: Tree<K, V>,
    pub(crate) comparator: C,
    pub(crate) _policy: PhantomData<P>,
}

/// An [`OrderedMultiMap`] where every key is unique.
pub type TreeMap<K, V, C = Natural> = OrderedMultiMap<K, V, Unique, C>;

/// An [`OrderedMultiMap`] which allows duplicate keys, keeping them in insertion order.
pub type TreeMultiMap<K, V, C = Natural> = OrderedMultiMap<K, V, Multi, C>;

impl<K, V, P: KeyPolicy> OrderedMultiMap<K, V, P, Natural> {
    /// Creates an empty map ordered by the keys' [`Ord`] implementation.
    pub const fn new() -> OrderedMultiMap<K, V, P, Natural> {
        OrderedMultiMap::with_comparator(Natural)
    }
}

impl<K, V, P: KeyPolicy, C> OrderedMultiMap<K, V, P, C> {
    /// Creates an empty map which orders its keys with the provided `comparator`.
    pub const fn with_comparator(comparator: C) -> OrderedMultiMap<K, V, P, C> {
        OrderedMultiMap {
            tree: Tree::new(),
            comparator,
            _policy: PhantomData,
        }
    }

    /// Returns the number of entries in the map.
    pub const fn len(&self) -> usize {
        self.tree.len
    }

    /// Returns true if the map contains no entries.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if this map may hold equivalent keys more than once.
    pub const fn allows_duplicates(&self) -> bool {
        P::ALLOWS_DUPLICATES
    }

    /// Returns the comparator used to order keys.
    pub const fn key_comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns an ordering over whole entries which compares their keys only.
    pub const fn entry_comparator(&self) -> EntryComparator<'_, C> {
        EntryComparator {
            inner: &self.comparator,
        }
    }

    /// Returns the position of the first entry, or [`Position::END`] if the map is empty.
    pub fn begin(&self) -> Position {
        self.tree.position(self.tree.first())
    }

    /// Returns the end marker, positioned after the last entry.
    pub const fn end(&self) -> Position {
        Position::END
    }

    /// Returns the position following `position`, which is [`Position::END`] after the last entry.
    ///
    /// # Panics
    /// Panics if `position` is the end marker or no longer refers to an entry.
    pub fn successor(&self, position: Position) -> Position {
        let index = self.tree.resolve(position).throw();
        self.tree.position(self.tree.next(index))
    }

    /// Returns the position preceding `position`. The predecessor of the end marker is the last
    /// entry and the predecessor of the first entry is the end marker.
    ///
    /// # Panics
    /// Panics if `position` no longer refers to an entry.
    pub fn predecessor(&self, position: Position) -> Position {
        match self.tree.resolve_bound(position).throw() {
            Some(index) => self.tree.position(self.tree.prev(index)),
            None => self.tree.position(self.tree.last()),
        }
    }

    /// Returns the entry at `position`, panicking on a failure.
    ///
    /// # Panics
    /// Panics if `position` is the end marker or no longer refers to an entry.
    pub fn entry_at(&self, position: Position) -> (&K, &V) {
        self.try_entry_at(position).throw()
    }

    /// Returns the entry at `position`, returning an [`Err`] on a failure rather than panicking.
    pub fn try_entry_at(&self, position: Position) -> Result<(&K, &V), PositionError> {
        Ok(self.tree.entry(self.tree.resolve(position)?))
    }

    /// Returns the key at `position`.
    ///
    /// # Panics
    /// Panics if `position` is the end marker or no longer refers to an entry.
    pub fn key_at(&self, position: Position) -> &K {
        self.entry_at(position).0
    }

    /// Returns a mutable reference to the value at `position`, panicking on a failure.
    ///
    /// # Panics
    /// Panics if `position` is the end marker or no longer refers to an entry.
    pub fn value_at_mut(&mut self, position: Position) -> &mut V {
        self.try_value_at_mut(position).throw()
    }

    /// Returns a mutable reference to the value at `position`, returning an [`Err`] on a failure
    /// rather than panicking.
    pub fn try_value_at_mut(&mut self, position: Position) -> Result<&mut V, PositionError> {
        let index = self.tree.resolve(position)?;
        Ok(self.tree.entry_mut(index).1)
    }

    /// Returns the first entry, if the map isn't empty.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|index| self.tree.entry(index))
    }

    /// Returns the last entry, if the map isn't empty.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|index| self.tree.entry(index))
    }

    /// Removes and returns the first entry, if the map isn't empty.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let index = self.tree.first()?;
        Some(self.tree.unlink(index))
    }

    /// Removes and returns the last entry, if the map isn't empty.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let index = self.tree.last()?;
        Some(self.tree.unlink(index))
    }

    /// Removes the entry at `position`, returning the position of the entry that followed it. Only
    /// positions referring to the removed entry are invalidated.
    ///
    /// # Panics
    /// Panics if `position` is the end marker or no longer refers to an entry.
    pub fn erase(&mut self, position: Position) -> Position {
        self.try_erase(position).throw()
    }

    /// Removes the entry at `position`, returning an [`Err`] on a failure rather than panicking.
    pub fn try_erase(&mut self, position: Position) -> Result<Position, PositionError> {
        let index = self.tree.resolve(position)?;
        let next = self.tree.next(index);
        drop(self.tree.unlink(index));
        Ok(self.tree.position(next))
    }

    /// Removes every entry in the half-open range `first..last`, returning `last`.
    ///
    /// # Panics
    /// Panics if either position no longer refers to an entry, or if `last` isn't reachable from
    /// `first`. The range is checked before anything is removed, so the map is left unchanged.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Position {
        let first = self.tree.resolve_bound(first).throw();
        let last = self.tree.resolve_bound(last).throw();
        let count = Iter::between(&self.tree, first, last).len();

        let mut current = first;
        for _ in 0..count {
            let index = current.unreachable();
            current = self.tree.next(index);
            drop(self.tree.unlink(index));
        }
        self.tree.position(last)
    }

    /// Removes all entries from the map. Positions into the map are invalidated, but are still
    /// recognised as stale.
    pub fn clear(&mut self) {
        let dropped = self.len();
        self.tree.clear();
        trace!(dropped, "cleared ordered map");
    }

    /// Detaches the entry at `position` from the map, without dropping it.
    ///
    /// # Panics
    /// Panics if `position` is the end marker or no longer refers to an entry.
    pub fn extract(&mut self, position: Position) -> ExtractedNode<K, V> {
        let index = self.tree.resolve(position).throw();
        let (key, value) = self.tree.unlink(index);
        ExtractedNode { key, value }
    }

    /// Exchanges the contents (and comparators) of two maps. Positions follow their entries into
    /// the other map.
    pub fn swap(&mut self, other: &mut OrderedMultiMap<K, V, P, C>) {
        mem::swap(self, other);
    }

    /// Removes every entry for which `predicate` returns true, in a single pass. Returns the
    /// number of entries removed. Positions of the remaining entries stay valid.
    pub fn erase_if<F: FnMut(&K, &V) -> bool>(&mut self, mut predicate: F) -> usize {
        self.retain(|key, value| !predicate(key, value))
    }

    /// Keeps only the entries for which `keep` returns true, in a single pass. Returns the number
    /// of entries removed. Positions of the remaining entries stay valid.
    pub fn retain<F: FnMut(&K, &mut V) -> bool>(&mut self, keep: F) -> usize {
        let removed = self.tree.retain(keep);
        trace!(removed, remaining = self.len(), rebuilt = removed > 0, "filtered ordered map");
        removed
    }

    /// Returns an iterator over all entries in key order, as references.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.into_iter()
    }

    /// Returns an iterator over all entries in key order, with mutable references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.into_iter()
    }

    /// Returns an iterator over the half-open range of entries `first..last`.
    ///
    /// # Panics
    /// Panics if either position no longer refers to an entry.
    pub fn range(&self, first: Position, last: Position) -> Iter<'_, K, V> {
        Iter::between(
            &self.tree,
            self.tree.resolve_bound(first).throw(),
            self.tree.resolve_bound(last).throw(),
        )
    }

    /// Returns an iterator over the entries from `position` onwards.
    ///
    /// # Panics
    /// Panics if `position` no longer refers to an entry.
    pub fn iter_from(&self, position: Position) -> Iter<'_, K, V> {
        self.range(position, Position::END)
    }

    /// Returns an iterator over all keys in order, as references.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Returns an iterator over all values in key order, as references.
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    /// Returns an iterator over all values in key order, as mutable references.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut(self.iter_mut())
    }

    /// Consumes self and returns an iterator over all keys in order.
    pub fn into_keys(self) -> IntoKeys<K, V> {
        IntoKeys(self.into_iter())
    }

    /// Consumes self and returns an iterator over all values in key order.
    pub fn into_values(self) -> IntoValues<K, V> {
        IntoValues(self.into_iter())
    }

    /// Returns the index of the first entry whose key isn't ordered before `key`.
    pub(crate) fn lower_bound_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let mut bound = None;
        let mut current = self.tree.root;
        while let Some(index) = current {
            let existing: &Q = self.tree.key(index).borrow();
            if self.comparator.less(existing, key) {
                current = self.tree.nodes[index].right;
            } else {
                bound = Some(index);
                current = self.tree.nodes[index].left;
            }
        }
        bound
    }

    /// Returns the index of the first entry whose key is ordered after `key`.
    pub(crate) fn upper_bound_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let mut bound = None;
        let mut current = self.tree.root;
        while let Some(index) = current {
            let existing: &Q = self.tree.key(index).borrow();
            if self.comparator.less(key, existing) {
                bound = Some(index);
                current = self.tree.nodes[index].left;
            } else {
                current = self.tree.nodes[index].right;
            }
        }
        bound
    }

    /// Returns the index of the first entry with a key equivalent to `key`.
    pub(crate) fn find_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let index = self.lower_bound_index(key)?;
        let existing: &Q = self.tree.key(index).borrow();
        (!self.comparator.less(key, existing)).then_some(index)
    }

    /// Returns the position of an entry with a key equivalent to `key`, or [`Position::END`] if
    /// there is none. If there are several, this is the first of them, so iterating forwards
    /// visits the rest.
    pub fn find<Q>(&self, key: &Q) -> Position
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.tree.position(self.find_index(key))
    }

    /// Returns the number of entries with a key equivalent to `key`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let mut count = 0;
        let mut current = self.find_index(key);
        while let Some(index) = current {
            let existing: &Q = self.tree.key(index).borrow();
            if self.comparator.less(key, existing) {
                break;
            }
            count += 1;
            if !P::ALLOWS_DUPLICATES {
                break;
            }
            current = self.tree.next(index);
        }
        count
    }

    /// Returns true if the map contains an entry with a key equivalent to `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.find_index(key).is_some()
    }

    /// Returns the position of the first entry whose key is not ordered before `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Position
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.tree.position(self.lower_bound_index(key))
    }

    /// Returns the position of the first entry whose key is ordered after `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Position
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.tree.position(self.upper_bound_index(key))
    }

    /// Returns the bounds of the range of entries with keys equivalent to `key`, as
    /// `(lower_bound, upper_bound)`. For an absent key both positions are equal.
    pub fn equal_range<Q>(&self, key: &Q) -> (Position, Position)
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Returns a reference to the value of the first entry with a key equivalent to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the first entry with a key equivalent to `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.find_index(key).map(|index| self.tree.entry(index))
    }

    /// Returns a mutable reference to the value of the first entry with a key equivalent to
    /// `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let index = self.find_index(key)?;
        Some(self.tree.entry_mut(index).1)
    }

    /// Removes every entry with a key equivalent to `key`, returning how many were removed.
    pub fn remove<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let mut removed = 0;
        let mut current = self.find_index(key);
        while let Some(index) = current {
            let existing: &Q = self.tree.key(index).borrow();
            if self.comparator.less(key, existing) {
                break;
            }
            current = self.tree.next(index);
            drop(self.tree.unlink(index));
            removed += 1;
        }
        removed
    }

    /// Detaches the first entry with a key equivalent to `key`, if there is one. Even when several
    /// entries match, only one is extracted.
    pub fn extract_key<Q>(&mut self, key: &Q) -> Option<ExtractedNode<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let index = self.find_index(key)?;
        let (key, value) = self.tree.unlink(index);
        Some(ExtractedNode { key, value })
    }
}

impl<K, V, P: KeyPolicy, C: Comparator<K>> OrderedMultiMap<K, V, P, C> {
    /// Finds the slot the full search would insert `key` into. With unique keys, an equivalent
    /// entry stops the search and its index is returned as the [`Err`]. With duplicate keys, the
    /// search continues to the right, so the slot is always after every equivalent entry.
    pub(crate) fn search_slot(&self, key: &K) -> Result<Slot, usize> {
        let mut parent = None;
        let mut side = Side::Right;
        let mut current = self.tree.root;

        while let Some(index) = current {
            let existing = self.tree.key(index);
            parent = Some(index);
            if self.comparator.less(key, existing) {
                side = Side::Left;
                current = self.tree.nodes[index].left;
            } else if P::ALLOWS_DUPLICATES || self.comparator.less(existing, key) {
                side = Side::Right;
                current = self.tree.nodes[index].right;
            } else {
                return Err(index);
            }
        }

        Ok((parent, side))
    }

    /// Returns the slot directly before `hint` if that is exactly where the full search would put
    /// `key`. Otherwise (including for a stale hint) returns `None` and the caller searches.
    pub(crate) fn hinted_slot(&self, hint: Position, key: &K) -> Option<Slot> {
        let at = self.tree.resolve_bound(hint).ok()?;

        if let Some(index) = at
            && !self.comparator.less(key, self.tree.key(index))
        {
            return None;
        }

        let before = match at {
            Some(index) => self.tree.prev(index),
            None => self.tree.last(),
        };
        if let Some(index) = before {
            let previous = self.tree.key(index);
            let fits = if P::ALLOWS_DUPLICATES {
                !self.comparator.less(key, previous)
            } else {
                self.comparator.less(previous, key)
            };
            if !fits {
                return None;
            }
        }

        Some(self.tree.slot_before(at))
    }

    /// Finds where `key` belongs (trying `hint` first) and links a value created by `make` there.
    /// `make` isn't called if a unique key is already present.
    fn place_with<F: FnOnce() -> V>(
        &mut self,
        hint: Option<Position>,
        key: K,
        make: F,
    ) -> (Position, bool) {
        let slot = match hint.and_then(|hint| self.hinted_slot(hint, &key)) {
            Some(slot) => slot,
            None => match self.search_slot(&key) {
                Ok(slot) => slot,
                Err(existing) => return (self.tree.position(Some(existing)), false),
            },
        };

        let index = self.tree.link(slot, key, make());
        (self.tree.position(Some(index)), true)
    }

    /// Inserts the provided `key`-`value` pair.
    ///
    /// With unique keys, nothing happens if an equivalent key is already present: the existing
    /// entry is left untouched and its position is returned alongside `false`. With duplicate
    /// keys, the entry is always inserted, after any equivalent entries.
    pub fn insert(&mut self, key: K, value: V) -> (Position, bool) {
        self.place_with(None, key, || value)
    }

    /// Inserts the provided `key`-`value` pair, as close as possible to just before `hint`. The
    /// hint only affects performance, the result is always the same as [`insert`](Self::insert).
    pub fn insert_hint(&mut self, hint: Position, key: K, value: V) -> (Position, bool) {
        self.place_with(Some(hint), key, || value)
    }

    /// Constructs an entry from its parts in place. Identical to [`insert`](Self::insert), since
    /// values are always moved into their node.
    pub fn emplace(&mut self, key: K, value: V) -> (Position, bool) {
        self.insert(key, value)
    }

    /// Constructs an entry from its parts in place, near `hint`. See
    /// [`insert_hint`](Self::insert_hint).
    pub fn emplace_hint(&mut self, hint: Position, key: K, value: V) -> Position {
        self.insert_hint(hint, key, value).0
    }

    /// Reinserts a detached node. If the map requires unique keys and an equivalent key is
    /// present, ownership of the node is returned to the caller in [`NodeInsert::Occupied`].
    pub fn insert_node(&mut self, node: ExtractedNode<K, V>) -> NodeInsert<K, V> {
        match self.search_slot(&node.key) {
            Ok(slot) => self.link_node(slot, node),
            Err(existing) => NodeInsert::Occupied {
                existing: self.tree.position(Some(existing)),
                node,
            },
        }
    }

    /// Reinserts a detached node near `hint`. See [`insert_node`](Self::insert_node).
    pub fn insert_node_hint(
        &mut self,
        hint: Position,
        node: ExtractedNode<K, V>,
    ) -> NodeInsert<K, V> {
        match self.hinted_slot(hint, &node.key) {
            Some(slot) => self.link_node(slot, node),
            None => self.insert_node(node),
        }
    }

    fn link_node(&mut self, slot: Slot, node: ExtractedNode<K, V>) -> NodeInsert<K, V> {
        let index = self.tree.link(slot, node.key, node.value);
        NodeInsert::Inserted(self.tree.position(Some(index)))
    }

    /// Moves every entry of `other` which can be inserted into this map, in `other`'s order.
    /// Entries whose key is rejected (because this map requires unique keys) stay in `other`, so
    /// afterwards `other` holds exactly those entries.
    ///
    /// Moved entries get new positions in this map; positions into `other` for entries which
    /// stayed remain valid.
    pub fn merge<P2: KeyPolicy, C2>(&mut self, other: &mut OrderedMultiMap<K, V, P2, C2>) {
        let mut moved = 0_usize;
        let mut kept = 0_usize;

        let mut current = other.tree.first();
        while let Some(index) = current {
            current = other.tree.next(index);
            match self.search_slot(other.tree.key(index)) {
                Ok(slot) => {
                    let (key, value) = other.tree.unlink(index);
                    self.tree.link(slot, key, value);
                    moved += 1;
                },
                Err(_) => kept += 1,
            }
        }

        trace!(moved, kept, "merged ordered maps");
    }
}

impl<K, V, C: Comparator<K>> OrderedMultiMap<K, V, Unique, C> {
    /// Inserts an entry for `key` with the value produced by `make`, unless `key` is already
    /// present, in which case `make` is never called and the existing position is returned
    /// alongside `false`.
    pub fn try_emplace<F: FnOnce() -> V>(&mut self, key: K, make: F) -> (Position, bool) {
        self.place_with(None, key, make)
    }

    /// [`try_emplace`](Self::try_emplace) with an insertion hint.
    pub fn try_emplace_hint<F: FnOnce() -> V>(
        &mut self,
        hint: Position,
        key: K,
        make: F,
    ) -> (Position, bool) {
        self.place_with(Some(hint), key, make)
    }

    /// Overwrites the value associated with `key` if it is present, otherwise inserts a new entry.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> InsertOrAssign {
        match self.search_slot(&key) {
            Ok(slot) => {
                let index = self.tree.link(slot, key, value);
                InsertOrAssign::Inserted(self.tree.position(Some(index)))
            },
            Err(existing) => {
                *self.tree.entry_mut(existing).1 = value;
                InsertOrAssign::Assigned(self.tree.position(Some(existing)))
            },
        }
    }

    /// [`insert_or_assign`](Self::insert_or_assign) with an insertion hint.
    pub fn insert_or_assign_hint(&mut self, hint: Position, key: K, value: V) -> InsertOrAssign {
        match self.hinted_slot(hint, &key) {
            // A correct hint for a unique map means the key is strictly between two neighbours,
            // so it can't be present.
            Some(slot) => {
                let index = self.tree.link(slot, key, value);
                InsertOrAssign::Inserted(self.tree.position(Some(index)))
            },
            None => self.insert_or_assign(key, value),
        }
    }

    /// Returns a mutable reference to the value for `key`, inserting the result of `make` first if
    /// the key is absent.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, make: F) -> &mut V {
        let index = match self.search_slot(&key) {
            Ok(slot) => self.tree.link(slot, key, make()),
            Err(existing) => existing,
        };
        self.tree.entry_mut(index).1
    }

    /// Returns a mutable reference to the value for `key`, inserting [`V::default()`](Default)
    /// first if the key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }
}

impl<K, V, P: KeyPolicy, C: Default> Default for OrderedMultiMap<K, V, P, C> {
    fn default() -> Self {
        OrderedMultiMap::with_comparator(C::default())
    }
}

impl<K: Clone, V: Clone, P, C: Clone> Clone for OrderedMultiMap<K, V, P, C> {
    fn clone(&self) -> Self {
        OrderedMultiMap {
            tree: self.tree.clone(),
            comparator: self.comparator.clone(),
            _policy: PhantomData,
        }
    }
}

impl<K, V, P, C> FromIterator<(K, V)> for OrderedMultiMap<K, V, P, C>
where
    P: KeyPolicy,
    C: Comparator<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMultiMap::default();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, P: KeyPolicy, const N: usize> From<[(K, V); N]>
    for OrderedMultiMap<K, V, P, Natural>
{
    fn from(value: [(K, V); N]) -> Self {
        value.into_iter().collect()
    }
}

impl<K, V, P: KeyPolicy, C: Comparator<K>> Extend<(K, V)> for OrderedMultiMap<K, V, P, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            // Sorted input lands at the end of the map, where the hint skips the search.
            self.insert_hint(Position::END, key, value);
        }
    }
}

impl<'a, K, V, P, C> Extend<(&'a K, &'a V)> for OrderedMultiMap<K, V, P, C>
where
    K: Clone,
    V: Clone,
    P: KeyPolicy,
    C: Comparator<K>,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

impl<K, Q, V, P, C> Index<&Q> for OrderedMultiMap<K, V, P, C>
where
    K: Borrow<Q>,
    Q: ?Sized,
    P: KeyPolicy,
    C: Comparator<Q>,
{
    type Output = V;

    /// Returns a reference to the value for `key`.
    ///
    /// # Panics
    /// Panics if the map has no entry for `key`.
    fn index(&self, key: &Q) -> &Self::Output {
        match self.get(key) {
            Some(value) => value,
            None => panic!("No entry found for key in ordered map!"),
        }
    }
}

impl<K: PartialEq, V: PartialEq, P, C> PartialEq for OrderedMultiMap<K, V, P, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree.len == other.tree.len
            && Iter::new(&self.tree).eq(Iter::new(&other.tree))
    }
}

impl<K: Eq, V: Eq, P, C> Eq for OrderedMultiMap<K, V, P, C> {}

impl<K: PartialOrd, V: PartialOrd, P, C> PartialOrd for OrderedMultiMap<K, V, P, C> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Iter::new(&self.tree).partial_cmp(Iter::new(&other.tree))
    }
}

impl<K: Ord, V: Ord, P, C> Ord for OrderedMultiMap<K, V, P, C> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        Iter::new(&self.tree).cmp(Iter::new(&other.tree))
    }
}

impl<K: Hash, V: Hash, P, C> Hash for OrderedMultiMap<K, V, P, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.tree.len);
        for (key, value) in Iter::new(&self.tree) {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: Debug, V: Debug, P: KeyPolicy, C> Debug for OrderedMultiMap<K, V, P, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedMultiMap")
            .field(
                "nodes",
                &DebugRaw(format!(
                    "\n{}\n",
                    self.tree.render(&|k: &K, v: &V| format!("({k:?}: {v:?})"))
                )),
            )
            .field("len", &self.tree.len)
            .field("duplicates", &P::ALLOWS_DUPLICATES)
            .finish()
    }
}

impl<K: Debug, V: Debug, P, C> Display for OrderedMultiMap<K, V, P, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(Iter::new(&self.tree)).finish()
    }
}
