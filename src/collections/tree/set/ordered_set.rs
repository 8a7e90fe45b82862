use std::borrow::Borrow;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Sub, SubAssign};

use super::{Difference, Intersection, Iter, SymmetricDifference, Union};
use crate::collections::tree::compare::{Comparator, Natural};
use crate::collections::tree::map::{ExtractedNode, NodeInsert, OrderedMultiMap};
use crate::collections::tree::policy::{KeyPolicy, Multi, Unique};
use crate::collections::tree::Position;
use crate::util::error::PositionError;
use crate::util::fmt::DebugRaw;

/// A sorted set of items, backed by an [`OrderedMultiMap`] with `()` values.
///
/// Like the map, the [`KeyPolicy`] `P` decides whether equivalent items may be stored more than
/// once: [`TreeSet`] holds each item at most once, while [`TreeMultiSet`] keeps every copy in
/// insertion order. Items are ordered by the comparator `C`.
///
/// The set algebra methods ([`difference`](Self::difference), [`union`](Self::union), ...) walk
/// both sets side by side, so they run in linear time and produce sorted output. On a multiset they
/// follow multiplicities: an item present twice in `self` and once in `other` appears once in the
/// difference.
pub struct OrderedMultiSet<T, P = Unique, C = Natural> {
    pub(crate) inner: OrderedMultiMap<T, (), P, C>,
}

/// An [`OrderedMultiSet`] where every item is unique.
pub type TreeSet<T, C = Natural> = OrderedMultiSet<T, Unique, C>;

/// An [`OrderedMultiSet`] which allows duplicate items, keeping them in insertion order.
pub type TreeMultiSet<T, C = Natural> = OrderedMultiSet<T, Multi, C>;

impl<T, P: KeyPolicy> OrderedMultiSet<T, P, Natural> {
    pub const fn new() -> OrderedMultiSet<T, P, Natural> {
        OrderedMultiSet {
            inner: OrderedMultiMap::new(),
        }
    }
}

impl<T, P: KeyPolicy, C> OrderedMultiSet<T, P, C> {
    pub const fn with_comparator(comparator: C) -> OrderedMultiSet<T, P, C> {
        OrderedMultiSet {
            inner: OrderedMultiMap::with_comparator(comparator),
        }
    }

    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub const fn allows_duplicates(&self) -> bool {
        self.inner.allows_duplicates()
    }

    /// Returns the comparator used to order items.
    pub const fn key_comparator(&self) -> &C {
        self.inner.key_comparator()
    }

    pub fn begin(&self) -> Position {
        self.inner.begin()
    }

    pub const fn end(&self) -> Position {
        self.inner.end()
    }

    /// See [`OrderedMultiMap::successor`].
    ///
    /// # Panics
    /// Panics if `position` is the end marker or no longer refers to an item.
    pub fn successor(&self, position: Position) -> Position {
        self.inner.successor(position)
    }

    /// See [`OrderedMultiMap::predecessor`].
    ///
    /// # Panics
    /// Panics if `position` no longer refers to an item.
    pub fn predecessor(&self, position: Position) -> Position {
        self.inner.predecessor(position)
    }

    /// Returns the item at `position`.
    ///
    /// # Panics
    /// Panics if `position` is the end marker or no longer refers to an item.
    pub fn get_at(&self, position: Position) -> &T {
        self.inner.key_at(position)
    }

    /// Returns the item at `position`, returning an [`Err`] on a failure rather than panicking.
    pub fn try_get_at(&self, position: Position) -> Result<&T, PositionError> {
        self.inner.try_entry_at(position).map(|(item, _)| item)
    }

    /// Returns the smallest item, if the set isn't empty.
    pub fn first(&self) -> Option<&T> {
        self.inner.first_key_value().map(|(item, _)| item)
    }

    /// Returns the largest item, if the set isn't empty.
    pub fn last(&self) -> Option<&T> {
        self.inner.last_key_value().map(|(item, _)| item)
    }

    pub fn pop_first(&mut self) -> Option<T> {
        self.inner.pop_first().map(|(item, _)| item)
    }

    pub fn pop_last(&mut self) -> Option<T> {
        self.inner.pop_last().map(|(item, _)| item)
    }

    /// Removes the item at `position`, returning the position of the item that followed it.
    ///
    /// # Panics
    /// Panics if `position` is the end marker or no longer refers to an item.
    pub fn erase(&mut self, position: Position) -> Position {
        self.inner.erase(position)
    }

    pub fn try_erase(&mut self, position: Position) -> Result<Position, PositionError> {
        self.inner.try_erase(position)
    }

    /// Removes every item in the half-open range `first..last`, returning `last`.
    ///
    /// # Panics
    /// Panics if either position no longer refers to an item, or if `last` isn't reachable from
    /// `first`. The set is left unchanged in that case.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Position {
        self.inner.erase_range(first, last)
    }

    pub fn clear(&mut self) {
        self.inner.clear()
    }

    /// Detaches the item at `position` from the set, without dropping it.
    ///
    /// # Panics
    /// Panics if `position` is the end marker or no longer refers to an item.
    pub fn extract(&mut self, position: Position) -> ExtractedNode<T, ()> {
        self.inner.extract(position)
    }

    pub fn swap(&mut self, other: &mut OrderedMultiSet<T, P, C>) {
        self.inner.swap(&mut other.inner)
    }

    /// Removes every item for which `predicate` returns true, in a single pass. Returns the number
    /// of items removed.
    pub fn erase_if<F: FnMut(&T) -> bool>(&mut self, mut predicate: F) -> usize {
        self.inner.erase_if(|item, _| predicate(item))
    }

    /// Keeps only the items for which `keep` returns true, in a single pass. Returns the number of
    /// items removed.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) -> usize {
        self.inner.retain(|item, _| keep(item))
    }

    /// Returns an iterator over all items in order, as references.
    pub fn iter(&self) -> Iter<'_, T> {
        self.into_iter()
    }

    /// Returns an iterator over the half-open range of items `first..last`.
    ///
    /// # Panics
    /// Panics if either position no longer refers to an item, or if `last` isn't reachable from
    /// `first`.
    pub fn range(&self, first: Position, last: Position) -> Iter<'_, T> {
        Iter(self.inner.range(first, last))
    }

    pub fn find<Q>(&self, item: &Q) -> Position
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.inner.find(item)
    }

    pub fn count<Q>(&self, item: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.inner.count(item)
    }

    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.inner.contains(item)
    }

    pub fn lower_bound<Q>(&self, item: &Q) -> Position
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.inner.lower_bound(item)
    }

    pub fn upper_bound<Q>(&self, item: &Q) -> Position
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.inner.upper_bound(item)
    }

    pub fn equal_range<Q>(&self, item: &Q) -> (Position, Position)
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.inner.equal_range(item)
    }

    /// Returns the stored item equivalent to `item`, which may differ from it in ways the
    /// comparator ignores.
    pub fn get<Q>(&self, item: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.inner.get_key_value(item).map(|(item, _)| item)
    }

    /// Removes every item equivalent to `item`, returning how many were removed.
    pub fn remove<Q>(&mut self, item: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.inner.remove(item)
    }

    /// Removes and returns one item equivalent to `item`.
    pub fn take<Q>(&mut self, item: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.extract_key(item).map(ExtractedNode::into_key)
    }

    /// Detaches one item equivalent to `item`, if there is one.
    pub fn extract_key<Q>(&mut self, item: &Q) -> Option<ExtractedNode<T, ()>>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.inner.extract_key(item)
    }
}

impl<T, P: KeyPolicy, C: Comparator<T>> OrderedMultiSet<T, P, C> {
    /// Inserts `item`. With unique items nothing happens if an equivalent item is present, and its
    /// position is returned alongside `false`.
    pub fn insert(&mut self, item: T) -> (Position, bool) {
        self.inner.insert(item, ())
    }

    /// Inserts `item` near `hint`. See [`OrderedMultiMap::insert_hint`].
    pub fn insert_hint(&mut self, hint: Position, item: T) -> (Position, bool) {
        self.inner.insert_hint(hint, item, ())
    }

    pub fn emplace(&mut self, item: T) -> (Position, bool) {
        self.insert(item)
    }

    pub fn emplace_hint(&mut self, hint: Position, item: T) -> Position {
        self.inner.emplace_hint(hint, item, ())
    }

    /// Inserts `item`, replacing and returning an equivalent item if one is present. On a multiset
    /// this is the same as [`insert`](Self::insert) and never returns anything.
    pub fn replace(&mut self, item: T) -> Option<T> {
        match self.inner.search_slot(&item) {
            Ok(slot) => {
                self.inner.tree.link(slot, item, ());
                None
            },
            Err(existing) => {
                let stored = &mut self.inner.tree.entries[existing];
                stored.replace((item, ())).map(|(old, _)| old)
            },
        }
    }

    /// Reinserts a detached node. See [`OrderedMultiMap::insert_node`].
    pub fn insert_node(&mut self, node: ExtractedNode<T, ()>) -> NodeInsert<T, ()> {
        self.inner.insert_node(node)
    }

    pub fn insert_node_hint(
        &mut self,
        hint: Position,
        node: ExtractedNode<T, ()>,
    ) -> NodeInsert<T, ()> {
        self.inner.insert_node_hint(hint, node)
    }

    /// Moves every item of `other` which can be inserted into this set. Items which are rejected
    /// (because this set requires unique items) stay in `other`.
    pub fn merge<P2: KeyPolicy, C2>(&mut self, other: &mut OrderedMultiSet<T, P2, C2>) {
        self.inner.merge(&mut other.inner)
    }

    /// Returns an iterator over the items in `self` but not `other`. (`self \ other`)
    pub fn difference<'a>(
        &'a self,
        other: &'a OrderedMultiSet<T, P, C>,
    ) -> Difference<'a, T, C> {
        Difference {
            left: self.iter().peekable(),
            right: other.iter().peekable(),
            comparator: self.key_comparator(),
        }
    }

    /// Returns an iterator over the items in `self` or `other` but not both. (`self △ other`)
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a OrderedMultiSet<T, P, C>,
    ) -> SymmetricDifference<'a, T, C> {
        SymmetricDifference {
            left: self.iter().peekable(),
            right: other.iter().peekable(),
            comparator: self.key_comparator(),
        }
    }

    /// Returns an iterator over the items in both `self` and `other`, yielding those from `self`.
    /// (`self ∩ other`)
    pub fn intersection<'a>(
        &'a self,
        other: &'a OrderedMultiSet<T, P, C>,
    ) -> Intersection<'a, T, C> {
        Intersection {
            left: self.iter().peekable(),
            right: other.iter().peekable(),
            comparator: self.key_comparator(),
        }
    }

    /// Returns an iterator over the items in either `self` or `other`, without repeating items
    /// that appear in both. (`self ∪ other`)
    pub fn union<'a>(&'a self, other: &'a OrderedMultiSet<T, P, C>) -> Union<'a, T, C> {
        Union {
            left: self.iter().peekable(),
            right: other.iter().peekable(),
            comparator: self.key_comparator(),
        }
    }

    /// Returns true if `other` contains all items of `self`. (`self ⊆ other`)
    pub fn is_subset(&self, other: &OrderedMultiSet<T, P, C>) -> bool {
        self.len() <= other.len() && self.difference(other).next().is_none()
    }

    /// Returns true if `self` contains all items of `other`. (`self ⊇ other`)
    pub fn is_superset(&self, other: &OrderedMultiSet<T, P, C>) -> bool {
        other.is_subset(self)
    }

    /// Returns true if `self` and `other` have no items in common.
    pub fn is_disjoint(&self, other: &OrderedMultiSet<T, P, C>) -> bool {
        self.intersection(other).next().is_none()
    }
}

impl<T, P: KeyPolicy, C: Default> Default for OrderedMultiSet<T, P, C> {
    fn default() -> Self {
        OrderedMultiSet {
            inner: OrderedMultiMap::default(),
        }
    }
}

impl<T: Clone, P, C: Clone> Clone for OrderedMultiSet<T, P, C> {
    fn clone(&self) -> Self {
        OrderedMultiSet {
            inner: self.inner.clone(),
        }
    }
}

impl<T, P, C> FromIterator<T> for OrderedMultiSet<T, P, C>
where
    P: KeyPolicy,
    C: Comparator<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = OrderedMultiSet::default();
        set.extend(iter);
        set
    }
}

impl<T: Ord, P: KeyPolicy, const N: usize> From<[T; N]> for OrderedMultiSet<T, P, Natural> {
    fn from(value: [T; N]) -> Self {
        value.into_iter().collect()
    }
}

impl<T, P: KeyPolicy, C: Comparator<T>> Extend<T> for OrderedMultiSet<T, P, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.inner.extend(iter.into_iter().map(|item| (item, ())));
    }
}

impl<'a, T, P, C> Extend<&'a T> for OrderedMultiSet<T, P, C>
where
    T: Copy + 'a,
    P: KeyPolicy,
    C: Comparator<T>,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, P, C> BitOr for &OrderedMultiSet<T, P, C>
where
    T: Clone,
    P: KeyPolicy,
    C: Comparator<T> + Clone,
{
    type Output = OrderedMultiSet<T, P, C>;

    fn bitor(self, rhs: Self) -> Self::Output {
        let mut set = OrderedMultiSet::with_comparator(self.key_comparator().clone());
        set.extend(self.union(rhs).cloned());
        set
    }
}

impl<T, P, C> BitAnd for &OrderedMultiSet<T, P, C>
where
    T: Clone,
    P: KeyPolicy,
    C: Comparator<T> + Clone,
{
    type Output = OrderedMultiSet<T, P, C>;

    fn bitand(self, rhs: Self) -> Self::Output {
        let mut set = OrderedMultiSet::with_comparator(self.key_comparator().clone());
        set.extend(self.intersection(rhs).cloned());
        set
    }
}

impl<T, P, C> BitXor for &OrderedMultiSet<T, P, C>
where
    T: Clone,
    P: KeyPolicy,
    C: Comparator<T> + Clone,
{
    type Output = OrderedMultiSet<T, P, C>;

    fn bitxor(self, rhs: Self) -> Self::Output {
        let mut set = OrderedMultiSet::with_comparator(self.key_comparator().clone());
        set.extend(self.symmetric_difference(rhs).cloned());
        set
    }
}

impl<T, P, C> Sub for &OrderedMultiSet<T, P, C>
where
    T: Clone,
    P: KeyPolicy,
    C: Comparator<T> + Clone,
{
    type Output = OrderedMultiSet<T, P, C>;

    fn sub(self, rhs: Self) -> Self::Output {
        let mut set = OrderedMultiSet::with_comparator(self.key_comparator().clone());
        set.extend(self.difference(rhs).cloned());
        set
    }
}

impl<T, C: Comparator<T>> BitOrAssign for OrderedMultiSet<T, Unique, C> {
    fn bitor_assign(&mut self, rhs: Self) {
        self.extend(rhs);
    }
}

impl<T, C: Comparator<T>> BitAndAssign for OrderedMultiSet<T, Unique, C> {
    fn bitand_assign(&mut self, rhs: Self) {
        self.retain(|item| rhs.contains(item));
    }
}

impl<T, C: Comparator<T>> BitXorAssign for OrderedMultiSet<T, Unique, C> {
    fn bitxor_assign(&mut self, rhs: Self) {
        for item in rhs {
            if self.remove(&item) == 0 {
                self.insert(item);
            }
        }
    }
}

impl<T, C: Comparator<T>> SubAssign for OrderedMultiSet<T, Unique, C> {
    fn sub_assign(&mut self, rhs: Self) {
        for item in rhs {
            self.remove(&item);
        }
    }
}

impl<T: PartialEq, P, C> PartialEq for OrderedMultiSet<T, P, C> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: Eq, P, C> Eq for OrderedMultiSet<T, P, C> {}

impl<T: PartialOrd, P, C> PartialOrd for OrderedMultiSet<T, P, C> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.inner.partial_cmp(&other.inner)
    }
}

impl<T: Ord, P, C> Ord for OrderedMultiSet<T, P, C> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.inner.cmp(&other.inner)
    }
}

impl<T: Hash, P, C> Hash for OrderedMultiSet<T, P, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<T: Debug, P: KeyPolicy, C> Debug for OrderedMultiSet<T, P, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedMultiSet")
            .field(
                "nodes",
                &DebugRaw(format!(
                    "\n{}\n",
                    self.inner.tree.render(&|item: &T, _: &()| format!("({item:?})"))
                )),
            )
            .field("len", &self.len())
            .field("duplicates", &P::ALLOWS_DUPLICATES)
            .finish()
    }
}

impl<T: Display, P: KeyPolicy, C> Display for OrderedMultiSet<T, P, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{{{}}}",
            self.iter()
                .map(|i| format!("{i}"))
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}
