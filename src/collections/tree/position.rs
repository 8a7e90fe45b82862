/// An opaque reference to the location of an entry within a tree-based collection, or to the end
/// of the collection.
///
/// A position stays valid until the entry it refers to is erased or extracted; inserting or
/// removing other entries never affects it. Using a position with its own collection after its
/// entry has been removed is reported as a [`PositionError::Stale`](super::PositionError::Stale)
/// (or a panic), even if the underlying slot has since been reused. The check relies on a 32-bit
/// generation per slot, so it can only be fooled after a single slot has been reused 2^32 times.
///
/// Positions are only meaningful for the collection that produced them. A position doesn't record
/// which collection that was: used with a different collection, it may resolve to an unrelated
/// live entry there, which is a logic error. After a [`swap`](super::OrderedMultiMap::swap),
/// positions follow their entries into the other collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(pub(crate) Option<Handle>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Handle {
    pub index: usize,
    pub generation: u32,
}

impl Position {
    /// The end marker, positioned after the last entry of any collection.
    pub const END: Position = Position(None);

    /// Returns true if this is the end marker.
    pub const fn is_end(&self) -> bool {
        self.0.is_none()
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::END
    }
}
