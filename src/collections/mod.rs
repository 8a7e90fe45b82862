//! Various general-purpose collection types.
//!
//! # Purpose
//! These types exist to explore ordered, node-based storage: balanced trees, stable handles into
//! an arena and iteration that survives mutation elsewhere in the collection.

#[cfg(feature = "tree")]
pub mod tree;
