use derive_more::{Display, Error, IsVariant};

/// The error produced when a [`Position`](crate::collections::tree::Position) can't be resolved
/// to an entry of the collection it was used with.
///
/// Using a position like this is a contract violation, so most methods panic with this error's
/// message. The `try_` variants return it instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, IsVariant)]
pub enum PositionError {
    /// The position is the end marker, which doesn't refer to an entry.
    #[display("Attempted to access the entry at the end position of an ordered collection!")]
    End,
    /// The position referred to an entry that has since been erased or extracted.
    #[display("Position (slot {index}, generation {generation}) no longer refers to an entry!")]
    Stale {
        index: usize,
        generation: u32,
    },
}
