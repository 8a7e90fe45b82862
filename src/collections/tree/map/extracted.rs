use derive_more::IsVariant;

use crate::collections::tree::Position;

/// An entry which has been detached from its collection by `extract`.
///
/// The node belongs to no collection, so both its key and value may be changed freely before it
/// is handed back to a collection with `insert_node`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtractedNode<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> ExtractedNode<K, V> {
    /// Creates a detached node which isn't (yet) part of any collection.
    pub const fn new(key: K, value: V) -> ExtractedNode<K, V> {
        ExtractedNode { key, value }
    }

    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Returns a mutable reference to the key. This is only possible because the node isn't part
    /// of a collection at the moment.
    pub const fn key_mut(&mut self) -> &mut K {
        &mut self.key
    }

    pub const fn value(&self) -> &V {
        &self.value
    }

    pub const fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Consumes the node, returning its key-value pair.
    pub fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }

    /// Consumes the node, returning only its key. Mostly useful for set nodes.
    pub fn into_key(self) -> K {
        self.key
    }
}

/// The outcome of reinserting an [`ExtractedNode`].
#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum NodeInsert<K, V> {
    /// The node was linked into the collection at this position.
    Inserted(Position),
    /// The collection only allows unique keys and already holds an equivalent one at `existing`.
    /// Ownership of the node goes back to the caller, untouched.
    Occupied {
        existing: Position,
        node: ExtractedNode<K, V>,
    },
}

impl<K, V> NodeInsert<K, V> {
    /// Returns the position of the newly inserted entry or the entry that prevented insertion.
    pub const fn position(&self) -> Position {
        match self {
            NodeInsert::Inserted(position) => *position,
            NodeInsert::Occupied { existing, .. } => *existing,
        }
    }

    /// Returns the rejected node, if insertion failed.
    pub fn into_node(self) -> Option<ExtractedNode<K, V>> {
        match self {
            NodeInsert::Inserted(_) => None,
            NodeInsert::Occupied { node, .. } => Some(node),
        }
    }
}

/// The outcome of [`insert_or_assign`](super::OrderedMultiMap::insert_or_assign).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IsVariant)]
pub enum InsertOrAssign {
    /// The key was absent, so a new entry was created.
    Inserted(Position),
    /// The key was present, so its value was overwritten.
    Assigned(Position),
}

impl InsertOrAssign {
    pub const fn position(&self) -> Position {
        match self {
            InsertOrAssign::Inserted(position) | InsertOrAssign::Assigned(position) => *position,
        }
    }
}
