use std::iter::FusedIterator;
use std::marker::PhantomData;

use super::OrderedMultiMap;
use crate::collections::tree::node::{next_index, prev_index, Node, Tree};
use crate::util::option::OptionExtension;

impl<K, V, P, C> IntoIterator for OrderedMultiMap<K, V, P, C> {
    type Item = (K, V);

    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            front: self.tree.first(),
            back: self.tree.last(),
            remaining: self.tree.len,
            tree: self.tree,
        }
    }
}

/// A type for owned iteration over an [`OrderedMultiMap`], in key order. Produces values of type
/// `(K, V)`.
///
/// See [`OrderedMultiMap::into_iter`].
pub struct IntoIter<K, V> {
    pub(crate) tree: Tree<K, V>,
    pub(crate) front: Option<usize>,
    pub(crate) back: Option<usize>,
    pub(crate) remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        // Links are left untouched, only the entry is taken, so walking on stays valid.
        self.front = self.tree.next(index);
        self.remaining -= 1;
        self.tree.entries[index].take()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        self.back = self.tree.prev(index);
        self.remaining -= 1;
        self.tree.entries[index].take()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<'a, K, V, P, C> IntoIterator for &'a OrderedMultiMap<K, V, P, C> {
    type Item = (&'a K, &'a V);

    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        Iter::new(&self.tree)
    }
}

/// A type for borrowed iteration over an [`OrderedMultiMap`], in key order. Produces values of
/// type `(&K, &V)`.
///
/// See [`OrderedMultiMap::iter`] and [`OrderedMultiMap::range`].
pub struct Iter<'a, K, V> {
    pub(crate) tree: &'a Tree<K, V>,
    pub(crate) front: Option<usize>,
    pub(crate) back: Option<usize>,
    pub(crate) remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a Tree<K, V>) -> Iter<'a, K, V> {
        Iter {
            tree,
            front: tree.first(),
            back: tree.last(),
            remaining: tree.len,
        }
    }

    /// Creates an iterator over the nodes from `first` up to, but excluding, `end`.
    ///
    /// # Panics
    /// Panics if `end` can't be reached by walking forwards from `first`.
    pub(crate) fn between(
        tree: &'a Tree<K, V>,
        first: Option<usize>,
        end: Option<usize>,
    ) -> Iter<'a, K, V> {
        let mut back = None;
        let mut remaining = 0;
        let mut current = first;
        while current != end {
            let index = match current {
                Some(index) => index,
                None => panic!("The end of the range comes before its start!"),
            };
            back = Some(index);
            remaining += 1;
            current = tree.next(index);
        }

        Iter {
            tree,
            front: first,
            back,
            remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        self.front = self.tree.next(index);
        self.remaining -= 1;
        Some(self.tree.entry(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        self.back = self.tree.prev(index);
        self.remaining -= 1;
        Some(self.tree.entry(index))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V, P, C> IntoIterator for &'a mut OrderedMultiMap<K, V, P, C> {
    type Item = (&'a K, &'a mut V);

    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let tree = &mut self.tree;
        IterMut {
            front: tree.first(),
            back: tree.last(),
            remaining: tree.len,
            nodes: &tree.nodes,
            entries: tree.entries.as_mut_ptr(),
            _phantom: PhantomData,
        }
    }
}

/// A type for mutably borrowed iteration over an [`OrderedMultiMap`], in key order. Produces
/// values of type `(&K, &mut V)`.
///
/// See [`OrderedMultiMap::iter_mut`].
pub struct IterMut<'a, K, V> {
    pub(crate) nodes: &'a [Node],
    pub(crate) entries: *mut Option<(K, V)>,
    pub(crate) front: Option<usize>,
    pub(crate) back: Option<usize>,
    pub(crate) remaining: usize,
    pub(crate) _phantom: PhantomData<&'a mut (K, V)>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    fn entry(&mut self, index: usize) -> (&'a K, &'a mut V) {
        // SAFETY: `entries` points to a live slice the iterator mutably borrows for 'a, which is
        // at least as long as `nodes`, and `index` came from walking `nodes`. Each index is
        // yielded at most once because `remaining` counts down as both ends move towards each
        // other, so no two returned references alias.
        let slot = unsafe { &mut *self.entries.add(index) };
        let (key, value) = slot.as_mut().unreachable();
        (key, value)
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        self.front = next_index(self.nodes, index);
        self.remaining -= 1;
        Some(self.entry(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        self.back = prev_index(self.nodes, index);
        self.remaining -= 1;
        Some(self.entry(index))
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}

impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}

/// An iterator over the keys of an [`OrderedMultiMap`], in order.
///
/// See [`OrderedMultiMap::keys`].
pub struct Keys<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, _)| k)
    }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

impl<'a, K, V> FusedIterator for Keys<'a, K, V> {}

impl<'a, K, V> Clone for Keys<'a, K, V> {
    fn clone(&self) -> Self {
        Keys(self.0.clone())
    }
}

/// An iterator over the values of an [`OrderedMultiMap`], in key order.
///
/// See [`OrderedMultiMap::values`].
pub struct Values<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, v)| v)
    }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}

impl<'a, K, V> FusedIterator for Values<'a, K, V> {}

/// A mutable iterator over the values of an [`OrderedMultiMap`], in key order.
///
/// See [`OrderedMultiMap::values_mut`].
pub struct ValuesMut<'a, K, V>(pub(crate) IterMut<'a, K, V>);

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for ValuesMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, v)| v)
    }
}

impl<'a, K, V> ExactSizeIterator for ValuesMut<'a, K, V> {}

impl<'a, K, V> FusedIterator for ValuesMut<'a, K, V> {}

/// An owning iterator over the keys of an [`OrderedMultiMap`], in order.
///
/// See [`OrderedMultiMap::into_keys`].
pub struct IntoKeys<K, V>(pub(crate) IntoIter<K, V>);

impl<K, V> Iterator for IntoKeys<K, V> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoKeys<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for IntoKeys<K, V> {}

impl<K, V> FusedIterator for IntoKeys<K, V> {}

/// An owning iterator over the values of an [`OrderedMultiMap`], in key order.
///
/// See [`OrderedMultiMap::into_values`].
pub struct IntoValues<K, V>(pub(crate) IntoIter<K, V>);

impl<K, V> Iterator for IntoValues<K, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoValues<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for IntoValues<K, V> {}

impl<K, V> FusedIterator for IntoValues<K, V> {}
