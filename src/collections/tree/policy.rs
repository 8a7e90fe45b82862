//! Key uniqueness policies, chosen by type parameter.

mod sealed {
    pub trait Sealed {}
}

/// Decides whether a collection may hold several entries with equivalent keys.
///
/// The policy is only consulted while searching for an insertion slot: a [`Unique`] collection
/// stops at an equivalent key and rejects the insertion, while a [`Multi`] collection keeps
/// descending to the right so the new entry lands after every existing equivalent entry.
pub trait KeyPolicy: sealed::Sealed {
    /// True if equivalent keys may be stored side by side.
    const ALLOWS_DUPLICATES: bool;
}

/// Every key is stored at most once. (Map / Set semantics.)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unique;

/// Equivalent keys are stored in insertion order. (MultiMap / MultiSet semantics.)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Multi;

impl sealed::Sealed for Unique {}
impl sealed::Sealed for Multi {}

impl KeyPolicy for Unique {
    const ALLOWS_DUPLICATES: bool = false;
}

impl KeyPolicy for Multi {
    const ALLOWS_DUPLICATES: bool = true;
}
