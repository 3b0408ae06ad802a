// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The fill algorithm capability consumed by window adapters.

use alloc::collections::BTreeSet;

use kurbo::Size;

use crate::measurer::Measurable;
use crate::{Axis, FillDirection};

/// Decides where items go and whether more of them fit.
///
/// A window adapter drives an implementation through one layout pass:
/// [`pre_fill`](Self::pre_fill), then a pivot via
/// [`fill_mark_item`](Self::fill_mark_item), then neighbors via
/// [`fill_next`](Self::fill_next) / [`fill_prev`](Self::fill_prev) for as long
/// as [`can_fill_more`](Self::can_fill_more) allows.
pub trait FillAlgorithm {
    /// Refreshes layout state for a new pass.
    fn pre_fill(&mut self, viewport: Size, axis: Axis, total_count: usize);

    /// Discards every placed item ahead of a discontinuous jump.
    fn mark_jump(&mut self);

    /// Places the pivot item `index` unless it is already placed.
    fn fill_mark_item(&mut self, viewport: Size, axis: Axis, item: &mut dyn Measurable, index: usize);

    /// Places `index` after the current end.
    fn fill_next(&mut self, viewport: Size, axis: Axis, item: &mut dyn Measurable, index: usize);

    /// Places `index` before the current start.
    fn fill_prev(&mut self, viewport: Size, axis: Axis, item: &mut dyn Measurable, index: usize);

    /// Moves every placed item by `delta` along the main axis.
    fn on_sliding_offset_update(&mut self, delta: f64);

    /// Range-mode variant: drops items that left the viewport and reports
    /// whether the edge being revealed by `delta` needs more items.
    fn on_sliding_offset_update_in_range(&mut self, viewport: Size, axis: Axis, delta: f64)
    -> bool;

    /// Returns `true` if there is room for another item next to `index` in `direction`.
    fn can_fill_more(
        &mut self,
        axis: Axis,
        viewport: Size,
        index: usize,
        direction: FillDirection,
    ) -> bool;

    /// Index of the first visible item, after dropping items above the viewport.
    fn mark_index(&mut self) -> Option<usize>;

    /// First and last placed item indices.
    fn range(&self) -> Option<(usize, usize)>;
}

/// Fill algorithm without geometry.
///
/// It remembers which indices were placed and never asks for more, so a window
/// driven by it materializes the pivot item only.
#[derive(Debug, Clone, Default)]
pub struct DummyFillAlgorithm {
    placed: BTreeSet<usize>,
}

impl DummyFillAlgorithm {
    /// Creates an empty algorithm.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FillAlgorithm for DummyFillAlgorithm {
    fn pre_fill(&mut self, _viewport: Size, _axis: Axis, total_count: usize) {
        self.placed.retain(|&index| index < total_count);
    }

    fn mark_jump(&mut self) {
        self.placed.clear();
    }

    fn fill_mark_item(&mut self, _: Size, _: Axis, _: &mut dyn Measurable, index: usize) {
        self.placed.insert(index);
    }

    fn fill_next(&mut self, _: Size, _: Axis, _: &mut dyn Measurable, index: usize) {
        self.placed.insert(index);
    }

    fn fill_prev(&mut self, _: Size, _: Axis, _: &mut dyn Measurable, index: usize) {
        self.placed.insert(index);
    }

    fn on_sliding_offset_update(&mut self, _delta: f64) {}

    fn on_sliding_offset_update_in_range(&mut self, _: Size, _: Axis, _: f64) -> bool {
        false
    }

    fn can_fill_more(&mut self, _: Axis, _: Size, _: usize, _: FillDirection) -> bool {
        false
    }

    fn mark_index(&mut self) -> Option<usize> {
        self.placed.first().copied()
    }

    fn range(&self) -> Option<(usize, usize)> {
        Some((*self.placed.first()?, *self.placed.last()?))
    }
}

#[cfg(test)]
mod tests {
    use super::{DummyFillAlgorithm, FillAlgorithm};
    use crate::{Axis, FillDirection};
    use kurbo::Size;

    #[test]
    fn dummy_tracks_placed_indices_only() {
        let viewport = Size::new(100.0, 100.0);
        let mut fill = DummyFillAlgorithm::new();
        assert_eq!(fill.range(), None);
        let mut item = Size::new(10.0, 10.0);
        fill.fill_mark_item(viewport, Axis::Vertical, &mut item, 4);
        fill.fill_next(viewport, Axis::Vertical, &mut item, 5);
        fill.fill_prev(viewport, Axis::Vertical, &mut item, 3);
        assert_eq!(fill.range(), Some((3, 5)));
        assert_eq!(fill.mark_index(), Some(3));
        assert!(!fill.can_fill_more(Axis::Vertical, viewport, 5, FillDirection::End));

        fill.pre_fill(viewport, Axis::Vertical, 5);
        assert_eq!(fill.range(), Some((3, 4)));
        fill.mark_jump();
        assert_eq!(fill.mark_index(), None);
    }
}
