// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot storage, structure edits, and sibling queries.

use alloc::vec::Vec;
use core::fmt;

use crate::types::NodeId;

/// A tree of payload-carrying nodes with ordered children.
///
/// All queries take a [`NodeId`] and quietly answer `None` (or an empty slice)
/// when the id is stale, so callers holding non-owning ids can detect removal
/// without extra bookkeeping.
///
/// ## Example
///
/// ```rust
/// use understory_item_tree::Tree;
///
/// let mut tree = Tree::new();
/// let list = tree.insert(None, "list");
/// let a = tree.insert(Some(list), "a");
/// let b = tree.insert(Some(list), "b");
///
/// assert_eq!(tree.child_after(a), Some(b));
/// tree.remove(a);
/// assert!(!tree.is_alive(a));
/// assert_eq!(tree.child_at(list, 0), Some(b));
/// ```
pub struct Tree<T> {
    /// slots
    nodes: Vec<Option<Node<T>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl<T> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct Node<T> {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    payload: T,
}

impl<T> Tree<T> {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Insert a new node as the last child of `parent` (or as a root if `None`).
    pub fn insert(&mut self, parent: Option<NodeId>, payload: T) -> NodeId {
        let id = self.alloc(payload);
        if let Some(p) = parent {
            self.link_parent(id, p, None);
        }
        id
    }

    /// Insert a new node as child number `pos` of `parent`.
    ///
    /// Positions past the end append.
    pub fn insert_at(&mut self, parent: NodeId, pos: usize, payload: T) -> NodeId {
        let id = self.alloc(payload);
        self.link_parent(id, parent, Some(pos));
        id
    }

    /// Remove a node and its subtree.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.parent_of(id) {
            self.unlink_parent(id, parent);
        }
        self.free_subtree(id);
    }

    /// Returns true if `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Payload of a live node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|n| &n.payload)
    }

    /// Mutable payload of a live node.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_opt_mut(id).map(|n| &mut n.payload)
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    #[must_use]
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or empty slice if node is stale.
    #[must_use]
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[][..], |n| n.children.as_slice())
    }

    /// Number of children of a live node.
    #[must_use]
    pub fn child_count(&self, parent: NodeId) -> usize {
        self.children_of(parent).len()
    }

    /// Child number `pos` of `parent`.
    #[must_use]
    pub fn child_at(&self, parent: NodeId, pos: usize) -> Option<NodeId> {
        self.children_of(parent).get(pos).copied()
    }

    /// Last child of `parent`.
    #[must_use]
    pub fn last_child(&self, parent: NodeId) -> Option<NodeId> {
        self.children_of(parent).last().copied()
    }

    /// Position of `id` among its parent's children.
    #[must_use]
    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.children_of(parent).iter().position(|&c| c == id)
    }

    /// Sibling immediately before `id`.
    #[must_use]
    pub fn child_before(&self, id: NodeId) -> Option<NodeId> {
        let pos = self.position_of(id)?;
        let parent = self.parent_of(id)?;
        self.child_at(parent, pos.checked_sub(1)?)
    }

    /// Sibling immediately after `id`.
    #[must_use]
    pub fn child_after(&self, id: NodeId) -> Option<NodeId> {
        let pos = self.position_of(id)?;
        let parent = self.parent_of(id)?;
        self.child_at(parent, pos + 1)
    }

    // --- internals ---

    fn alloc(&mut self, payload: T) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, payload));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, payload)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId stores 32-bit slot indices."
        )]
        let idx = idx as u32;
        NodeId::new(idx, generation)
    }

    fn free_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id.idx()).and_then(Option::take) else {
            return;
        };
        self.free_list.push(id.idx());
        for child in node.children {
            self.free_subtree(child);
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId, pos: Option<usize>) {
        let Some(p) = self.node_opt_mut(parent) else {
            return;
        };
        let pos = pos.map_or(p.children.len(), |pos| pos.min(p.children.len()));
        p.children.insert(pos, id);
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = Some(parent);
        }
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_opt_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = None;
        }
    }
}

impl<T> Node<T> {
    fn new(generation: u32, payload: T) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            payload,
        }
    }
}
