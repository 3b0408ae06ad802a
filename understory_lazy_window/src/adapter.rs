// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scroll window adapter.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use kurbo::Size;
use understory_item_tree::NodeId;
use understory_staggered::{Axis, FillAlgorithm, FillDirection, ScrollAlign};

use crate::container::ItemContainer;

/// Deltas smaller than this are treated as no movement.
const OFFSET_EPSILON: f64 = 1e-3;

/// A jump or scroll target waiting to be realized by [`ScrollWindowAdapter::prepare`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingJump {
    /// Target item index.
    pub index: usize,
    /// Placement of the target within the viewport.
    pub align: ScrollAlign,
    /// Additional offset applied after alignment.
    pub extra_offset: Option<f64>,
}

/// Item index of a jump request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpIndex {
    /// A concrete item index.
    At(usize),
    /// The last item.
    Last,
}

/// Callback notified when the window wants to be recomposed around an index.
///
/// The node argument is `None` when the call refreshes the pivot rather than
/// a specific node.
pub type Updater = Box<dyn FnMut(usize, Option<NodeId>)>;

/// Decides which items of a lazy container exist and in what order they are measured.
///
/// The adapter owns a [`FillAlgorithm`] and two index maps between item
/// indices and the container's nodes. It never creates or destroys nodes; it
/// asks its [`ItemContainer`] for them and tolerates their disappearance.
///
/// A layout pass looks like:
///
/// 1. [`prepare`](Self::prepare) once.
/// 2. [`need_more_elements`](Self::need_more_elements) with `None` to get the
///    pivot, then repeatedly with the last returned node in each direction
///    until it answers `None`.
pub struct ScrollWindowAdapter<F> {
    fill: F,
    size: Size,
    axis: Axis,
    mark_index: usize,
    total_count: usize,
    offset: usize,
    index_to_node: HashMap<usize, NodeId>,
    node_to_index: HashMap<NodeId, usize>,
    filled: HashSet<usize>,
    jump_pending: Option<PendingJump>,
    target: Option<PendingJump>,
    range_mode: bool,
    updaters: Vec<Updater>,
}

impl<F: fmt::Debug> fmt::Debug for ScrollWindowAdapter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollWindowAdapter")
            .field("fill", &self.fill)
            .field("size", &self.size)
            .field("axis", &self.axis)
            .field("mark_index", &self.mark_index)
            .field("total_count", &self.total_count)
            .field("offset", &self.offset)
            .field("mapped", &self.index_to_node.len())
            .field("jump_pending", &self.jump_pending)
            .field("target", &self.target)
            .field("range_mode", &self.range_mode)
            .field("updaters", &self.updaters.len())
            .finish_non_exhaustive()
    }
}

impl<F: FillAlgorithm> ScrollWindowAdapter<F> {
    /// Creates an adapter with an empty viewport and no items.
    pub fn new(fill: F) -> Self {
        Self {
            fill,
            size: Size::ZERO,
            axis: Axis::Vertical,
            mark_index: 0,
            total_count: 0,
            offset: 0,
            index_to_node: HashMap::new(),
            node_to_index: HashMap::new(),
            filled: HashSet::new(),
            jump_pending: None,
            target: None,
            range_mode: false,
            updaters: Vec::new(),
        }
    }

    /// The fill algorithm.
    #[must_use]
    pub fn fill(&self) -> &F {
        &self.fill
    }

    /// The fill algorithm, mutably.
    pub fn fill_mut(&mut self) -> &mut F {
        &mut self.fill
    }

    /// Current pivot index.
    #[must_use]
    pub fn mark_index(&self) -> usize {
        self.mark_index
    }

    /// Number of items in the virtual list.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Sets the number of items, forgetting nodes mapped to indices past the end.
    pub fn set_total_count(&mut self, total_count: usize) {
        self.total_count = total_count;
        self.mark_index = self.mark_index.min(total_count.saturating_sub(1));
        let node_to_index = &mut self.node_to_index;
        self.index_to_node.retain(|&index, node| {
            let keep = index < total_count;
            if !keep {
                node_to_index.remove(node);
            }
            keep
        });
    }

    /// Position of the first item within the container's children.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current viewport size.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.size
    }

    /// Current main axis.
    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Pending discontinuous jump, if any.
    #[must_use]
    pub fn pending_jump(&self) -> Option<PendingJump> {
        self.jump_pending
    }

    /// Pending animated scroll target, if any.
    #[must_use]
    pub fn target(&self) -> Option<PendingJump> {
        self.target
    }

    /// Returns `true` if the window is driven by index ranges.
    #[must_use]
    pub fn is_range_mode(&self) -> bool {
        self.range_mode
    }

    /// Switches between per-item callbacks and index-range driving.
    pub fn set_range_mode(&mut self, range_mode: bool) {
        self.range_mode = range_mode;
    }

    /// Registers a recompose callback.
    pub fn register_updater(&mut self, updater: impl FnMut(usize, Option<NodeId>) + 'static) {
        self.updaters.push(Box::new(updater));
    }

    /// Calls every updater with `(index, None)`.
    pub fn request_recompose(&mut self, index: usize) {
        for updater in &mut self.updaters {
            updater(index, None);
        }
    }

    /// Returns the next node to lay out beyond `mark_item` in `direction`.
    ///
    /// With no `mark_item`, the pivot node is returned instead. `None` means the
    /// window is complete in that direction; a node measured by the final call
    /// stays placed and tracked.
    pub fn need_more_elements<C: ItemContainer + ?Sized>(
        &mut self,
        container: &mut C,
        mark_item: Option<NodeId>,
        direction: FillDirection,
    ) -> Option<NodeId> {
        let Some(mark_item) = mark_item else {
            return self.init_pivot_item(container, direction);
        };
        let Some(&cur) = self.node_to_index.get(&mark_item) else {
            log::warn!("edge node {mark_item:?} is not tracked by the window");
            return None;
        };
        let new_idx = match direction {
            FillDirection::Start => cur.checked_sub(1)?,
            FillDirection::End => cur + 1,
        };
        if new_idx >= self.total_count {
            return None;
        }
        let sibling = match direction {
            FillDirection::Start => container.child_before(mark_item),
            FillDirection::End => container.child_after(mark_item),
        };
        let Some(node) = sibling else {
            log::warn!("no {direction:?} sibling next to item {cur}; tree and window disagree");
            return None;
        };
        self.record(new_idx, node);

        if self.target.is_some() {
            if self.fill_to_target(direction, cur) {
                log::debug!("scroll target reached at item {cur}");
                self.target = None;
                return None;
            }
            self.measure(container, node, new_idx, direction);
            return Some(node);
        }

        self.measure(container, node, new_idx, direction);
        self.fill
            .can_fill_more(self.axis, self.size, new_idx, direction)
            .then_some(node)
    }

    /// Locates and measures the pivot node for `mark_index`.
    ///
    /// Falls back to the container's last child when the pivot node is gone.
    pub fn init_pivot_item<C: ItemContainer + ?Sized>(
        &mut self,
        container: &mut C,
        direction: FillDirection,
    ) -> Option<NodeId> {
        if self.mark_index >= self.total_count {
            return None;
        }
        let known = self
            .index_to_node
            .get(&self.mark_index)
            .copied()
            .filter(|&node| container.is_alive(node));
        let node = match known {
            Some(node) => node,
            None => {
                if !self.index_to_node.is_empty() {
                    log::debug!("pivot node for item {} is gone; clearing index maps", self.mark_index);
                }
                self.index_to_node.clear();
                self.node_to_index.clear();
                container.last_child()?
            }
        };
        if !self.filled.contains(&self.mark_index) {
            match container.measurable(node) {
                Some(item) => {
                    self.fill
                        .fill_mark_item(self.size, self.axis, item, self.mark_index);
                }
                None => log::warn!("pivot node {node:?} cannot be measured"),
            }
            self.filled.insert(self.mark_index);
        }
        self.record(self.mark_index, node);
        self.fill
            .can_fill_more(self.axis, self.size, self.mark_index, direction)
            .then_some(node)
    }

    /// Resolves a child position of the container to a node.
    ///
    /// Positions outside the window are forwarded to the container; positions
    /// inside go through the index map, erasing entries whose node is gone.
    pub fn child_by_index<C: ItemContainer + ?Sized>(
        &mut self,
        container: &C,
        index: usize,
    ) -> Option<NodeId> {
        if index < self.offset || index >= self.offset + self.total_count {
            return container.child_at(index);
        }
        let item = index - self.offset;
        let node = *self.index_to_node.get(&item)?;
        if container.is_alive(node) {
            return Some(node);
        }
        self.index_to_node.remove(&item);
        self.node_to_index.remove(&node);
        None
    }

    /// Child position of a tracked node.
    #[must_use]
    pub fn index_of_child(&self, node: NodeId) -> Option<usize> {
        self.node_to_index.get(&node).map(|index| self.offset + index)
    }

    /// Restarts the window at `index` after the data source changed shape.
    pub fn prepare_reset(&mut self, index: usize, extra_offset: Option<f64>) {
        log::debug!("window reset to item {index}");
        self.jump_pending = Some(PendingJump {
            index,
            align: ScrollAlign::Start,
            extra_offset,
        });
        self.mark_index = index;
        self.fill.mark_jump();
        self.request_recompose(index);
    }

    /// Requests a jump to `index`.
    pub fn prepare_jump(&mut self, index: JumpIndex, align: ScrollAlign, extra_offset: Option<f64>) {
        let last = self.total_count.saturating_sub(1);
        let index = match index {
            JumpIndex::At(index) => index.min(last),
            JumpIndex::Last => last,
        };
        if index == self.mark_index {
            return;
        }
        log::debug!("jump to item {index} requested");
        self.jump_pending = Some(PendingJump {
            index,
            align,
            extra_offset,
        });
        self.mark_index = index;
        self.request_recompose(index);
    }

    /// Requests an animated scroll toward `index`.
    ///
    /// Returns `true` if the same target is already pending.
    pub fn prepare_load_to_target(
        &mut self,
        index: usize,
        align: ScrollAlign,
        extra_offset: Option<f64>,
    ) -> bool {
        if self.target.is_some_and(|target| target.index == index) {
            return true;
        }
        self.target = Some(PendingJump {
            index,
            align,
            extra_offset,
        });
        self.request_recompose(self.mark_index);
        false
    }

    /// Feeds a scroll delta through the fill algorithm.
    ///
    /// Returns `false` when the caller must not commit the offset without a new
    /// fill pass having been scheduled.
    pub fn update_sliding_offset(&mut self, delta: f64) -> bool {
        if delta < OFFSET_EPSILON && delta > -OFFSET_EPSILON {
            return false;
        }
        self.fill.on_sliding_offset_update(delta);
        if self.range_mode {
            let more = self
                .fill
                .on_sliding_offset_update_in_range(self.size, self.axis, delta);
            if more {
                if let Some((start, _)) = self.fill.range() {
                    self.mark_index = start;
                }
                self.request_recompose(self.mark_index);
            }
            return more;
        }
        let range = self.fill.range();
        let can_fill = if delta < 0.0 {
            range.is_none_or(|(_, end)| {
                self.fill
                    .can_fill_more(self.axis, self.size, end, FillDirection::End)
            })
        } else {
            range.is_none_or(|(start, _)| {
                self.fill
                    .can_fill_more(self.axis, self.size, start, FillDirection::Start)
            })
        };
        if !can_fill {
            return false;
        }
        if let Some(mark) = self.fill.mark_index() {
            self.mark_index = mark;
        }
        self.request_recompose(self.mark_index);
        true
    }

    /// Starts a layout pass.
    ///
    /// `offset` is the position of the window's first item among the
    /// container's children. Pending jumps are handed to the container's
    /// scrollable pattern here.
    pub fn prepare<C: ItemContainer + ?Sized>(&mut self, container: &mut C, offset: usize) {
        self.offset = offset;
        self.filled.clear();
        self.fill.pre_fill(self.size, self.axis, self.total_count);
        if let Some(jump) = self.jump_pending.take() {
            let in_range = self
                .fill
                .range()
                .is_some_and(|(start, end)| (start..=end).contains(&self.mark_index));
            if !in_range {
                self.fill.mark_jump();
            }
            match container.pattern() {
                Some(pattern) if pattern.is_paged() => pattern.change_index(self.mark_index, false),
                Some(pattern) => {
                    pattern.scroll_to_index(self.mark_index, false, jump.align, jump.extra_offset);
                }
                None => log::warn!("jump to item {} has no scrollable pattern", self.mark_index),
            }
        } else if let Some(target) = self.target {
            match container.pattern() {
                Some(pattern) if pattern.is_paged() => pattern.change_index(target.index, true),
                Some(pattern) => {
                    pattern.scroll_to_index(target.index, true, target.align, target.extra_offset);
                }
                None => log::warn!("scroll target {} has no scrollable pattern", target.index),
            }
        }
    }

    /// Updates the viewport, recomposing if the change revealed room for items.
    pub fn update_viewport(&mut self, size: Size, axis: Axis) {
        if self.size == size && self.axis == axis {
            return;
        }
        self.size = size;
        self.axis = axis;
        let more = self
            .fill
            .range()
            .is_none_or(|(_, end)| self.fill.can_fill_more(axis, size, end, FillDirection::End));
        if more {
            if let Some(mark) = self.fill.mark_index() {
                self.mark_index = mark;
            }
            self.request_recompose(self.mark_index);
        }
    }

    /// Returns `true` once `index` has reached or passed the pending target.
    #[must_use]
    pub fn fill_to_target(&self, direction: FillDirection, index: usize) -> bool {
        let Some(target) = self.target else {
            return true;
        };
        match direction {
            FillDirection::End => index >= target.index,
            FillDirection::Start => index <= target.index,
        }
    }

    fn record(&mut self, index: usize, node: NodeId) {
        if let Some(old) = self.index_to_node.insert(index, node)
            && old != node
        {
            self.node_to_index.remove(&old);
        }
        if let Some(old) = self.node_to_index.insert(node, index)
            && old != index
        {
            self.index_to_node.remove(&old);
        }
    }

    fn measure<C: ItemContainer + ?Sized>(
        &mut self,
        container: &mut C,
        node: NodeId,
        index: usize,
        direction: FillDirection,
    ) {
        if !self.filled.insert(index) {
            return;
        }
        let Some(item) = container.measurable(node) else {
            log::warn!("node {node:?} for item {index} cannot be measured");
            return;
        };
        match direction {
            FillDirection::End => self.fill.fill_next(self.size, self.axis, item, index),
            FillDirection::Start => self.fill.fill_prev(self.size, self.axis, item, index),
        }
    }
}
