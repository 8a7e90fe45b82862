//! The node arena and the self-balancing (AVL) tree engine shared by every tree-based collection.
//!
//! Nodes live in slots of an arena and link to each other by slot index, so a node never moves
//! once allocated: rotations and removals only rewrite links. This is what allows a
//! [`Position`] to stay valid while other entries come and go. Freed slots are recycled through a
//! free list, and each slot carries a generation counter which is bumped whenever its entry is
//! removed, so stale positions can be told apart from live ones.
//!
//! Link data ([`Node`]) and entry data are kept in separate vectors. Traversal only ever reads
//! links, which lets mutable iteration hand out `&mut V` for one slot while still reading the
//! links of others.
//!
//! Nothing in this module compares keys. Callers decide where an entry belongs and then ask the
//! tree to [`link`](Tree::link) it there.

use std::cmp;

use super::position::{Handle, Position};
use crate::util::error::PositionError;
use crate::util::option::OptionExtension;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Node {
    pub parent: Option<usize>,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub height: u8,
    pub generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// Where a new node should be attached: below `parent` on the given `side`, or as the root when
/// `parent` is `None`.
pub(crate) type Slot = (Option<usize>, Side);

#[derive(Clone)]
pub(crate) struct Tree<K, V> {
    pub nodes: Vec<Node>,
    pub entries: Vec<Option<(K, V)>>,
    pub free: Vec<usize>,
    pub root: Option<usize>,
    pub len: usize,
}

impl<K, V> Tree<K, V> {
    pub const fn new() -> Tree<K, V> {
        Tree {
            nodes: Vec::new(),
            entries: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    pub fn entry(&self, index: usize) -> (&K, &V) {
        let (key, value) = self.entries[index].as_ref().unreachable();
        (key, value)
    }

    pub fn entry_mut(&mut self, index: usize) -> (&K, &mut V) {
        let (key, value) = self.entries[index].as_mut().unreachable();
        (key, value)
    }

    pub fn key(&self, index: usize) -> &K {
        self.entry(index).0
    }

    pub fn first(&self) -> Option<usize> {
        self.root.map(|root| leftmost(&self.nodes, root))
    }

    pub fn last(&self) -> Option<usize> {
        self.root.map(|root| rightmost(&self.nodes, root))
    }

    pub fn next(&self, index: usize) -> Option<usize> {
        next_index(&self.nodes, index)
    }

    pub fn prev(&self, index: usize) -> Option<usize> {
        prev_index(&self.nodes, index)
    }

    /// Creates the public handle for the node at `index`, or the end marker for `None`.
    pub fn position(&self, index: Option<usize>) -> Position {
        Position(index.map(|index| Handle {
            index,
            generation: self.nodes[index].generation,
        }))
    }

    /// Resolves `position` to the index of a live node.
    pub fn resolve(&self, position: Position) -> Result<usize, PositionError> {
        let handle = position.0.ok_or(PositionError::End)?;
        match self.nodes.get(handle.index) {
            Some(node)
                if node.generation == handle.generation
                    && self.entries[handle.index].is_some() =>
            {
                Ok(handle.index)
            },
            _ => Err(PositionError::Stale {
                index: handle.index,
                generation: handle.generation,
            }),
        }
    }

    /// Resolves a position which may legitimately be the end marker, such as the exclusive end of
    /// a range.
    pub fn resolve_bound(&self, position: Position) -> Result<Option<usize>, PositionError> {
        match position.0 {
            None => Ok(None),
            Some(_) => self.resolve(position).map(Some),
        }
    }

    /// Returns the slot a node would need to occupy to sit directly before the node at `at`, or
    /// after the last node if `at` is `None`. The returned slot is always empty: the left child of
    /// `at` if it has none, otherwise the right child of its in-order predecessor.
    pub fn slot_before(&self, at: Option<usize>) -> Slot {
        match at {
            Some(index) => match self.nodes[index].left {
                None => (Some(index), Side::Left),
                Some(left) => (Some(rightmost(&self.nodes, left)), Side::Right),
            },
            None => (self.last(), Side::Right),
        }
    }

    /// Allocates a node for the provided entry in `slot` and rebalances, returning the new node's
    /// index.
    pub fn link(&mut self, slot: Slot, key: K, value: V) -> usize {
        let (parent, side) = slot;
        let index = self.alloc(key, value, parent);

        match parent {
            None => {
                debug_assert!(self.root.is_none(), "root slot is already occupied");
                self.root = Some(index);
            },
            Some(parent) => {
                let child = match side {
                    Side::Left => &mut self.nodes[parent].left,
                    Side::Right => &mut self.nodes[parent].right,
                };
                debug_assert!(child.is_none(), "child slot is already occupied");
                *child = Some(index);
            },
        }

        self.len += 1;
        self.retrace(parent);
        index
    }

    /// Detaches the node at `index` from the tree and returns its entry. No other node changes
    /// index.
    pub fn unlink(&mut self, index: usize) -> (K, V) {
        let Node { parent, left, right, height, .. } = self.nodes[index];

        let retrace_from = match (left, right) {
            (Some(left), Some(right)) => {
                // The in-order successor takes this node's place. It's relinked rather than having
                // its entry moved, so that positions referring to it stay valid.
                let successor = leftmost(&self.nodes, right);
                let retrace_from = if successor == right {
                    Some(successor)
                } else {
                    let successor_parent = self.nodes[successor].parent.unreachable();
                    let successor_right = self.nodes[successor].right;

                    self.nodes[successor_parent].left = successor_right;
                    if let Some(child) = successor_right {
                        self.nodes[child].parent = Some(successor_parent);
                    }

                    self.nodes[successor].right = Some(right);
                    self.nodes[right].parent = Some(successor);
                    Some(successor_parent)
                };

                self.nodes[successor].left = Some(left);
                self.nodes[left].parent = Some(successor);
                self.nodes[successor].parent = parent;
                self.nodes[successor].height = height;
                self.replace_child(parent, index, Some(successor));
                retrace_from
            },
            (child, None) | (None, child) => {
                if let Some(child) = child {
                    self.nodes[child].parent = parent;
                }
                self.replace_child(parent, index, child);
                parent
            },
        };

        self.len -= 1;
        let entry = self.release(index);
        self.retrace(retrace_from);
        entry
    }

    /// Keeps only the entries for which `keep` returns true, in a single in-order pass. The
    /// surviving nodes are relinked into a perfectly balanced shape without moving, so their
    /// positions stay valid. Returns the number of entries removed.
    pub fn retain<F: FnMut(&K, &mut V) -> bool>(&mut self, mut keep: F) -> usize {
        let mut survivors = Vec::with_capacity(self.len);
        let mut doomed = Vec::new();

        // Decide everything before touching any links, so a panicking predicate leaves the tree
        // intact.
        let mut current = self.first();
        while let Some(index) = current {
            current = self.next(index);
            let (key, value) = self.entry_mut(index);
            if keep(key, value) {
                survivors.push(index);
            } else {
                doomed.push(index);
            }
        }

        if doomed.is_empty() {
            return 0;
        }

        self.root = self.build(&survivors, None);
        self.len = survivors.len();
        for index in doomed.iter().copied() {
            drop(self.release(index));
        }
        doomed.len()
    }

    /// Drops every entry while keeping slot generations, so positions from before the clear are
    /// still recognised as stale.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
        self.free.clear();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.take().is_some() {
                let node = &mut self.nodes[index];
                node.generation = node.generation.wrapping_add(1);
            }
            self.free.push(index);
        }
    }

    pub(crate) fn alloc(&mut self, key: K, value: V, parent: Option<usize>) -> usize {
        let mut node = Node {
            parent,
            left: None,
            right: None,
            height: 1,
            generation: 0,
        };

        match self.free.pop() {
            Some(index) => {
                node.generation = self.nodes[index].generation;
                self.nodes[index] = node;
                self.entries[index] = Some((key, value));
                index
            },
            None => {
                self.nodes.push(node);
                self.entries.push(Some((key, value)));
                self.nodes.len() - 1
            },
        }
    }

    pub(crate) fn release(&mut self, index: usize) -> (K, V) {
        let entry = self.entries[index].take().unreachable();
        let node = &mut self.nodes[index];
        node.generation = node.generation.wrapping_add(1);
        node.parent = None;
        node.left = None;
        node.right = None;
        self.free.push(index);
        entry
    }

    /// Builds a balanced subtree over `order`, which must list node indices in key order, and
    /// returns its root.
    fn build(&mut self, order: &[usize], parent: Option<usize>) -> Option<usize> {
        if order.is_empty() {
            return None;
        }

        let middle = order.len() / 2;
        let index = order[middle];
        let left = self.build(&order[..middle], Some(index));
        let right = self.build(&order[middle + 1..], Some(index));
        let height = 1 + cmp::max(self.height(left), self.height(right));

        let node = &mut self.nodes[index];
        node.parent = parent;
        node.left = left;
        node.right = right;
        node.height = height;
        Some(index)
    }

    fn height(&self, index: Option<usize>) -> u8 {
        index.map_or(0, |index| self.nodes[index].height)
    }

    fn update_height(&mut self, index: usize) {
        let Node { left, right, .. } = self.nodes[index];
        self.nodes[index].height = 1 + cmp::max(self.height(left), self.height(right));
    }

    fn balance(&self, index: usize) -> i16 {
        let Node { left, right, .. } = self.nodes[index];
        i16::from(self.height(left)) - i16::from(self.height(right))
    }

    /// Points whichever link of `parent` referred to `old` (or the root, if there is no parent) at
    /// `new` instead.
    fn replace_child(&mut self, parent: Option<usize>, old: usize, new: Option<usize>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = &mut self.nodes[parent];
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            },
        }
    }

    fn rotate_left(&mut self, index: usize) -> usize {
        let pivot = self.nodes[index].right.unreachable();
        let inner = self.nodes[pivot].left;

        self.nodes[index].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(index);
        }

        let parent = self.nodes[index].parent;
        self.nodes[pivot].parent = parent;
        self.replace_child(parent, index, Some(pivot));

        self.nodes[pivot].left = Some(index);
        self.nodes[index].parent = Some(pivot);

        self.update_height(index);
        self.update_height(pivot);
        pivot
    }

    fn rotate_right(&mut self, index: usize) -> usize {
        let pivot = self.nodes[index].left.unreachable();
        let inner = self.nodes[pivot].right;

        self.nodes[index].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(index);
        }

        let parent = self.nodes[index].parent;
        self.nodes[pivot].parent = parent;
        self.replace_child(parent, index, Some(pivot));

        self.nodes[pivot].right = Some(index);
        self.nodes[index].parent = Some(pivot);

        self.update_height(index);
        self.update_height(pivot);
        pivot
    }

    /// Restores the AVL balance of the subtree rooted at `index`, returning the subtree's new
    /// root.
    fn rebalance(&mut self, index: usize) -> usize {
        self.update_height(index);

        let balance = self.balance(index);
        if balance > 1 {
            let left = self.nodes[index].left.unreachable();
            if self.balance(left) < 0 {
                self.rotate_left(left);
            }
            self.rotate_right(index)
        } else if balance < -1 {
            let right = self.nodes[index].right.unreachable();
            if self.balance(right) > 0 {
                self.rotate_right(right);
            }
            self.rotate_left(index)
        } else {
            index
        }
    }

    /// Walks from `from` towards the root, rebalancing each subtree. Stops early once a subtree's
    /// height comes out the same as before, because nothing above it can have changed.
    fn retrace(&mut self, from: Option<usize>) {
        let mut current = from;
        while let Some(index) = current {
            let before = self.nodes[index].height;
            let top = self.rebalance(index);
            if self.nodes[top].height == before {
                break;
            }
            current = self.nodes[top].parent;
        }
    }
}

impl<K, V> Tree<K, V> {
    /// Draws the tree sideways, with left subtrees above their parent and right subtrees below.
    /// Each node is drawn on its own line by `label`.
    pub fn render<F: Fn(&K, &V) -> String>(&self, label: &F) -> String {
        self.render_from(self.root, label)
    }

    fn render_from<F: Fn(&K, &V) -> String>(&self, index: Option<usize>, label: &F) -> String {
        match index {
            Some(index) => {
                let Node { left, right, .. } = self.nodes[index];
                let (key, value) = self.entry(index);
                format!(
                    "{}\n{}\n{}",
                    self.render_from(left, label)
                        .lines()
                        .map(|l| String::from("┌    ") + l)
                        .collect::<Vec<_>>()
                        .join("\n"),
                    label(key, value),
                    self.render_from(right, label)
                        .lines()
                        .map(|l| String::from("└    ") + l)
                        .collect::<Vec<_>>()
                        .join("\n")
                )
            },
            None => String::from("-"),
        }
    }
}

impl<K, V> Default for Tree<K, V> {
    fn default() -> Self {
        Tree::new()
    }
}

#[cfg(test)]
impl<K, V> Tree<K, V> {
    /// Checks every structural invariant of the tree, panicking on the first violation, and
    /// returns the node indices in order.
    pub(crate) fn verify(&self) -> Vec<usize> {
        if let Some(root) = self.root {
            assert_eq!(self.nodes[root].parent, None, "The root shouldn't have a parent.");
        }

        let mut order = Vec::with_capacity(self.len);
        self.verify_from(self.root, &mut order);

        assert_eq!(order.len(), self.len, "Length should match the number of linked nodes.");
        assert_eq!(
            self.entries.iter().filter(|e| e.is_some()).count(),
            self.len,
            "Only linked nodes should hold entries."
        );
        assert_eq!(
            self.free.len() + self.len,
            self.nodes.len(),
            "Every slot should be either linked or free."
        );

        let mut walked = Vec::with_capacity(self.len);
        let mut current = self.first();
        while let Some(index) = current {
            walked.push(index);
            current = self.next(index);
        }
        assert_eq!(walked, order, "Successor links should visit nodes in order.");

        order
    }

    fn verify_from(&self, index: Option<usize>, order: &mut Vec<usize>) -> u8 {
        let Some(index) = index else { return 0 };
        let Node { left, right, height, .. } = self.nodes[index];

        for child in [left, right].into_iter().flatten() {
            assert_eq!(
                self.nodes[child].parent,
                Some(index),
                "Children should link back to their parent."
            );
        }

        let left_height = self.verify_from(left, order);
        order.push(index);
        let right_height = self.verify_from(right, order);

        assert!(
            left_height.abs_diff(right_height) <= 1,
            "Subtree heights should differ by at most one."
        );
        assert_eq!(
            height,
            1 + cmp::max(left_height, right_height),
            "Stored heights should be accurate."
        );
        height
    }
}

pub(crate) fn leftmost(nodes: &[Node], mut index: usize) -> usize {
    while let Some(left) = nodes[index].left {
        index = left;
    }
    index
}

pub(crate) fn rightmost(nodes: &[Node], mut index: usize) -> usize {
    while let Some(right) = nodes[index].right {
        index = right;
    }
    index
}

/// Finds the in-order successor of `index` using links alone.
pub(crate) fn next_index(nodes: &[Node], index: usize) -> Option<usize> {
    if let Some(right) = nodes[index].right {
        return Some(leftmost(nodes, right));
    }

    let mut child = index;
    let mut parent = nodes[index].parent;
    while let Some(p) = parent {
        if nodes[p].left == Some(child) {
            return Some(p);
        }
        child = p;
        parent = nodes[p].parent;
    }
    None
}

/// Finds the in-order predecessor of `index` using links alone.
pub(crate) fn prev_index(nodes: &[Node], index: usize) -> Option<usize> {
    if let Some(left) = nodes[index].left {
        return Some(rightmost(nodes, left));
    }

    let mut child = index;
    let mut parent = nodes[index].parent;
    while let Some(p) = parent {
        if nodes[p].right == Some(child) {
            return Some(p);
        }
        child = p;
        parent = nodes[p].parent;
    }
    None
}
