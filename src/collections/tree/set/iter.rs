use std::cmp::{self, Ordering};
use std::iter::{FusedIterator, Peekable};

use super::OrderedMultiSet;
use crate::collections::tree::compare::Comparator;
use crate::collections::tree::map::{self, IntoKeys};

impl<T, P, C> IntoIterator for OrderedMultiSet<T, P, C> {
    type Item = T;

    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(IntoKeys(self.inner.into_iter()))
    }
}

/// A type for owned iteration over an [`OrderedMultiSet`], in order. Produces values of type `T`.
///
/// See [`OrderedMultiSet::into_iter`].
pub struct IntoIter<T>(pub(crate) IntoKeys<T, ()>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<'a, T, P, C> IntoIterator for &'a OrderedMultiSet<T, P, C> {
    type Item = &'a T;

    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        Iter(map::Iter::new(&self.inner.tree))
    }
}

/// A type for borrowed iteration over an [`OrderedMultiSet`], in order. Produces values of type
/// `&T`.
///
/// See [`OrderedMultiSet::iter`].
pub struct Iter<'a, T>(pub(crate) map::Iter<'a, T, ()>);

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(item, _)| item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(item, _)| item)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter(self.0.clone())
    }
}

/// A lazy iterator over the items in one set but not another, in order.
///
/// See [`OrderedMultiSet::difference`].
pub struct Difference<'a, T, C> {
    pub(crate) left: Peekable<Iter<'a, T>>,
    pub(crate) right: Peekable<Iter<'a, T>>,
    pub(crate) comparator: &'a C,
}

impl<'a, T, C: Comparator<T>> Iterator for Difference<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = *self.left.peek()?;
            let Some(&other) = self.right.peek() else {
                return self.left.next();
            };

            match self.comparator.compare(item, other) {
                Ordering::Less => return self.left.next(),
                Ordering::Equal => {
                    self.left.next();
                    self.right.next();
                },
                Ordering::Greater => {
                    self.right.next();
                },
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.left.size_hint().1)
    }
}

impl<'a, T, C: Comparator<T>> FusedIterator for Difference<'a, T, C> {}

/// A lazy iterator over the items in exactly one of two sets, in order.
///
/// See [`OrderedMultiSet::symmetric_difference`].
pub struct SymmetricDifference<'a, T, C> {
    pub(crate) left: Peekable<Iter<'a, T>>,
    pub(crate) right: Peekable<Iter<'a, T>>,
    pub(crate) comparator: &'a C,
}

impl<'a, T, C: Comparator<T>> Iterator for SymmetricDifference<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // An exhausted side orders after everything on the other side.
            let order = match (self.left.peek(), self.right.peek()) {
                (None, None) => return None,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(&item), Some(&other)) => self.comparator.compare(item, other),
            };

            match order {
                Ordering::Less => return self.left.next(),
                Ordering::Greater => return self.right.next(),
                Ordering::Equal => {
                    self.left.next();
                    self.right.next();
                },
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.left.size_hint().1;
        let right = self.right.size_hint().1;
        (0, left.zip(right).and_then(|(l, r)| l.checked_add(r)))
    }
}

impl<'a, T, C: Comparator<T>> FusedIterator for SymmetricDifference<'a, T, C> {}

/// A lazy iterator over the items in both of two sets, in order.
///
/// See [`OrderedMultiSet::intersection`].
pub struct Intersection<'a, T, C> {
    pub(crate) left: Peekable<Iter<'a, T>>,
    pub(crate) right: Peekable<Iter<'a, T>>,
    pub(crate) comparator: &'a C,
}

impl<'a, T, C: Comparator<T>> Iterator for Intersection<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = *self.left.peek()?;
            let other = *self.right.peek()?;

            match self.comparator.compare(item, other) {
                Ordering::Less => {
                    self.left.next();
                },
                Ordering::Greater => {
                    self.right.next();
                },
                Ordering::Equal => {
                    self.right.next();
                    return self.left.next();
                },
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.left.size_hint().1;
        let right = self.right.size_hint().1;
        (0, left.zip(right).map(|(l, r)| cmp::min(l, r)))
    }
}

impl<'a, T, C: Comparator<T>> FusedIterator for Intersection<'a, T, C> {}

/// A lazy iterator over the items in either of two sets, in order. Items present in both are
/// yielded once.
///
/// See [`OrderedMultiSet::union`].
pub struct Union<'a, T, C> {
    pub(crate) left: Peekable<Iter<'a, T>>,
    pub(crate) right: Peekable<Iter<'a, T>>,
    pub(crate) comparator: &'a C,
}

impl<'a, T, C: Comparator<T>> Iterator for Union<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let order = match (self.left.peek(), self.right.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(&item), Some(&other)) => self.comparator.compare(item, other),
        };

        match order {
            Ordering::Less => self.left.next(),
            Ordering::Greater => self.right.next(),
            Ordering::Equal => {
                self.right.next();
                self.left.next()
            },
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (left_min, left_max) = self.left.size_hint();
        let (right_min, right_max) = self.right.size_hint();
        (
            cmp::max(left_min, right_min),
            left_max.zip(right_max).and_then(|(l, r)| l.checked_add(r)),
        )
    }
}

impl<'a, T, C: Comparator<T>> FusedIterator for Union<'a, T, C> {}
