// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborators of the window adapter: the node container and its scroll pattern.

use core::fmt;

use understory_item_tree::{NodeId, Tree};
use understory_staggered::{Measurable, ScrollAlign};

/// The scrollable container that realizes jumps and animated scrolls.
pub trait ScrollablePattern {
    /// Scrolls so that `index` is placed according to `align`.
    fn scroll_to_index(
        &mut self,
        index: usize,
        animate: bool,
        align: ScrollAlign,
        extra_offset: Option<f64>,
    );

    /// Switches the current page to `index`.
    fn change_index(&mut self, index: usize, animate: bool);

    /// Returns `true` for paged containers, which jump via [`Self::change_index`].
    fn is_paged(&self) -> bool {
        false
    }
}

/// The parent node whose children are the realized items.
///
/// Positions are child positions within the parent, which may include nodes
/// owned by siblings of the lazy window.
pub trait ItemContainer {
    /// Child at position `pos`.
    fn child_at(&self, pos: usize) -> Option<NodeId>;
    /// Sibling before `node`.
    fn child_before(&self, node: NodeId) -> Option<NodeId>;
    /// Sibling after `node`.
    fn child_after(&self, node: NodeId) -> Option<NodeId>;
    /// Last child.
    fn last_child(&self) -> Option<NodeId>;
    /// Number of children.
    fn child_count(&self) -> usize;
    /// Returns `true` if `node` still exists.
    fn is_alive(&self, node: NodeId) -> bool;
    /// The item behind `node`, ready to be measured.
    fn measurable(&mut self, node: NodeId) -> Option<&mut dyn Measurable>;
    /// The scrollable pattern, if the container has one.
    fn pattern(&mut self) -> Option<&mut dyn ScrollablePattern>;
}

/// [`ItemContainer`] over the children of one node of an item [`Tree`].
pub struct TreeContainer<'a, T> {
    tree: &'a mut Tree<T>,
    container: NodeId,
    pattern: Option<&'a mut dyn ScrollablePattern>,
}

impl<T> fmt::Debug for TreeContainer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeContainer")
            .field("tree", &self.tree)
            .field("container", &self.container)
            .field("pattern", &self.pattern.is_some())
            .finish()
    }
}

impl<'a, T: Measurable> TreeContainer<'a, T> {
    /// Binds the children of `container`.
    pub fn new(tree: &'a mut Tree<T>, container: NodeId) -> Self {
        Self {
            tree,
            container,
            pattern: None,
        }
    }

    /// Attaches the scrollable pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: &'a mut dyn ScrollablePattern) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

impl<T: Measurable> ItemContainer for TreeContainer<'_, T> {
    fn child_at(&self, pos: usize) -> Option<NodeId> {
        self.tree.child_at(self.container, pos)
    }

    fn child_before(&self, node: NodeId) -> Option<NodeId> {
        self.tree.child_before(node)
    }

    fn child_after(&self, node: NodeId) -> Option<NodeId> {
        self.tree.child_after(node)
    }

    fn last_child(&self) -> Option<NodeId> {
        self.tree.last_child(self.container)
    }

    fn child_count(&self) -> usize {
        self.tree.child_count(self.container)
    }

    fn is_alive(&self, node: NodeId) -> bool {
        self.tree.is_alive(node)
    }

    fn measurable(&mut self, node: NodeId) -> Option<&mut dyn Measurable> {
        match self.tree.get_mut(node) {
            Some(item) => Some(item),
            None => None,
        }
    }

    fn pattern(&mut self) -> Option<&mut dyn ScrollablePattern> {
        match &mut self.pattern {
            Some(pattern) => Some(&mut **pattern),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemContainer, ScrollablePattern, TreeContainer};
    use kurbo::Size;
    use understory_item_tree::Tree;
    use understory_staggered::ScrollAlign;

    #[derive(Default)]
    struct Paged {
        pages: alloc::vec::Vec<usize>,
    }

    impl ScrollablePattern for Paged {
        fn scroll_to_index(&mut self, _: usize, _: bool, _: ScrollAlign, _: Option<f64>) {}

        fn change_index(&mut self, index: usize, _: bool) {
            self.pages.push(index);
        }

        fn is_paged(&self) -> bool {
            true
        }
    }

    #[test]
    fn tree_container_walks_children() {
        let mut tree = Tree::new();
        let list = tree.insert(None, Size::ZERO);
        let a = tree.insert(Some(list), Size::new(10.0, 10.0));
        let b = tree.insert(Some(list), Size::new(10.0, 20.0));
        let mut pattern = Paged::default();
        let mut container = TreeContainer::new(&mut tree, list).with_pattern(&mut pattern);

        assert_eq!(container.child_count(), 2);
        assert_eq!(container.child_at(1), Some(b));
        assert_eq!(container.child_after(a), Some(b));
        assert_eq!(container.child_before(b), Some(a));
        assert_eq!(container.last_child(), Some(b));
        assert!(container.measurable(a).is_some());
        let paged = container.pattern().expect("pattern attached");
        assert!(paged.is_paged());
        paged.change_index(3, false);
        assert_eq!(pattern.pages, [3]);
    }
}
