//! Ordering relations used to sort the keys of tree-based collections.
//!
//! A [`Comparator`] is stored by value inside each collection and consulted for every ordering
//! decision. It must describe a strict weak ordering: if it doesn't (for example, if it isn't
//! transitive), the collection's ordering and uniqueness guarantees no longer hold, although it
//! remains memory safe.

use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};

/// A total ordering over `K`, captured by value in a tree-based collection.
///
/// Any closure of the form `Fn(&K, &K) -> Ordering` is a comparator, as are the stock
/// [`Natural`], [`Descending`] and [`ByLess`] types.
pub trait Comparator<K: ?Sized> {
    /// Compares `a` to `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;

    /// Returns true if `a` is ordered strictly before `b`.
    fn less(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Returns true if neither key is ordered before the other.
    fn equivalent(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

/// Orders keys by their [`Ord`] implementation. This is the default comparator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Natural;

impl<K: Ord + ?Sized> Comparator<K> for Natural {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Orders keys by the reverse of their [`Ord`] implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descending;

impl<K: Ord + ?Sized> Comparator<K> for Descending {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        b.cmp(a)
    }
}

/// Adapts a strict "less than" predicate into a [`Comparator`]. Two keys are equivalent when
/// neither is less than the other.
///
/// ```
/// # use ordered_collections::collections::tree::{ByLess, TreeMap};
/// let mut map = TreeMap::with_comparator(ByLess(|a: &i32, b: &i32| a > b));
/// map.insert(1, "are");
/// map.insert(20, "Hi");
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [20, 1]);
/// ```
#[derive(Clone, Copy, Default)]
pub struct ByLess<F>(pub F);

impl<K: ?Sized, F: Fn(&K, &K) -> bool> Comparator<K> for ByLess<F> {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        if (self.0)(a, b) {
            Ordering::Less
        } else if (self.0)(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    fn less(&self, a: &K, b: &K) -> bool {
        (self.0)(a, b)
    }
}

impl<F> Debug for ByLess<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByLess").finish_non_exhaustive()
    }
}

impl<K: ?Sized, F: Fn(&K, &K) -> Ordering> Comparator<K> for F {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// An ordering over whole entries which only considers their keys, as returned by
/// [`OrderedMultiMap::entry_comparator`](super::OrderedMultiMap::entry_comparator).
pub struct EntryComparator<'a, C> {
    pub(crate) inner: &'a C,
}

impl<'a, C> EntryComparator<'a, C> {
    /// Compares two `(key, value)` pairs by key alone.
    pub fn compare<K, V>(&self, a: (&K, &V), b: (&K, &V)) -> Ordering
    where
        C: Comparator<K>,
    {
        self.inner.compare(a.0, b.0)
    }

    /// Returns true if the key of `a` is ordered strictly before the key of `b`.
    pub fn less<K, V>(&self, a: (&K, &V), b: (&K, &V)) -> bool
    where
        C: Comparator<K>,
    {
        self.inner.less(a.0, b.0)
    }
}

impl<'a, C> Clone for EntryComparator<'a, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, C> Copy for EntryComparator<'a, C> {}

impl<'a, C: Debug> Debug for EntryComparator<'a, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntryComparator").field(self.inner).finish()
    }
}
