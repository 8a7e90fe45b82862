//! A module containing [`OrderedMultiSet`] and associated types, including the lazy set algebra
//! iterators [`Difference`], [`SymmetricDifference`], [`Intersection`] and [`Union`].

mod iter;
mod ordered_set;

pub use iter::*;
pub use ordered_set::*;
