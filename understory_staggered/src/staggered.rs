// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-lane staggered (masonry) fill algorithm.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Size;

use crate::fill_algorithm::FillAlgorithm;
use crate::filler::{SectionEndFiller, SectionFiller, SectionStartFiller};
use crate::initializer::SectionInitializer;
use crate::measurer::{LayoutBackend, Measurable, Measurer, create_measurer};
use crate::section::Section;
use crate::{Axis, FillDirection};

/// Places items into sections of parallel lanes, always growing the shortest lane.
///
/// Lane positions are relative to the viewport: `0.0` is its leading edge and
/// the viewport's main extent is its trailing edge. Scrolling shifts lanes
/// through [`FillAlgorithm::on_sliding_offset_update`].
pub struct StaggeredFillAlgorithm<I> {
    initializer: I,
    sections: Vec<Section>,
    measurer: Option<Box<dyn Measurer>>,
    sync_cache_cnt: usize,
}

impl<I: fmt::Debug> fmt::Debug for StaggeredFillAlgorithm<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaggeredFillAlgorithm")
            .field("initializer", &self.initializer)
            .field("sections", &self.sections)
            .field("sync_cache_cnt", &self.sync_cache_cnt)
            .finish_non_exhaustive()
    }
}

fn measurer_slot<'m>(
    slot: &'m mut Option<Box<dyn Measurer>>,
    backend: LayoutBackend,
    viewport: Size,
    axis: Axis,
) -> &'m dyn Measurer {
    &**slot.get_or_insert_with(|| create_measurer(backend, viewport, axis))
}

impl<I: SectionInitializer> StaggeredFillAlgorithm<I> {
    /// Creates an algorithm whose sections come from `initializer`.
    pub fn new(initializer: I) -> Self {
        Self {
            initializer,
            sections: Vec::new(),
            measurer: None,
            sync_cache_cnt: 0,
        }
    }

    /// Current sections.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Layout properties the sections are built from.
    #[must_use]
    pub fn initializer(&self) -> &I {
        &self.initializer
    }

    /// Mutable layout properties; changes apply on the next [`FillAlgorithm::pre_fill`].
    pub fn initializer_mut(&mut self) -> &mut I {
        &mut self.initializer
    }

    /// Extra items kept placed beyond the viewport.
    #[must_use]
    pub fn sync_cache_count(&self) -> usize {
        self.sync_cache_cnt
    }

    /// The container flavor in use.
    #[must_use]
    pub fn backend(&self) -> LayoutBackend {
        self.initializer.backend()
    }

    fn section_of(&self, index: usize) -> Option<usize> {
        let si = self
            .sections
            .partition_point(|s| s.max_item.is_some_and(|max| max < index));
        self.sections
            .get(si)
            .filter(|s| s.owns(index))
            .map(|_| si)
    }

    fn can_fill_more_at_end(&mut self, axis: Axis, bound: f64, si: usize) -> bool {
        let section = &self.sections[si];
        let complete = section
            .max_item
            .is_some_and(|max| section.end_idx() == Some(max));
        if !complete {
            let gap = section.main_gap;
            return section.lanes.iter().any(|l| l.next_end_start(gap) < bound);
        }
        if si + 1 >= self.sections.len() {
            return false;
        }
        let (head, tail) = self.sections.split_at_mut(si + 1);
        let next = &mut tail[0];
        if !next.is_empty() {
            return true;
        }
        head[si].prepare_next_section(axis, next);
        next.lanes.iter().any(|l| l.end_pos < bound)
    }

    fn can_fill_more_at_start(&mut self, axis: Axis, si: usize) -> bool {
        let section = &self.sections[si];
        if section.start_idx() != Some(section.min_item) {
            let gap = section.main_gap;
            return section.lanes.iter().any(|l| l.next_start_end(gap) > 0.0);
        }
        if si == 0 {
            return false;
        }
        let (head, tail) = self.sections.split_at_mut(si);
        let prev = &mut head[si - 1];
        if !prev.is_empty() {
            return true;
        }
        tail[0].prepare_prev_section(axis, prev);
        prev.lanes.iter().any(|l| l.start_pos > 0.0)
    }
}

impl<I: SectionInitializer> FillAlgorithm for StaggeredFillAlgorithm<I> {
    fn pre_fill(&mut self, viewport: Size, axis: Axis, total_count: usize) {
        let fresh = self.initializer.init_sections(total_count, viewport, axis);
        if self.initializer.compare(&self.sections, &fresh) {
            log::debug!(
                "section layout changed: {} -> {} sections",
                self.sections.len(),
                fresh.len()
            );
            self.sections = fresh;
        }
        let backend = self.initializer.backend();
        self.measurer = Some(create_measurer(backend, viewport, axis));
        self.sync_cache_cnt = usize::from(backend == LayoutBackend::Swiper);
        let end = axis.main(viewport);
        for section in &mut self.sections {
            section.prune_front(0.0);
            section.prune_back(end);
        }
    }

    fn mark_jump(&mut self) {
        for section in &mut self.sections {
            section.reset_lanes(0.0);
        }
    }

    fn fill_mark_item(&mut self, viewport: Size, axis: Axis, item: &mut dyn Measurable, index: usize) {
        let Some(si) = self.section_of(index) else {
            log::warn!("mark item {index} belongs to no section");
            return;
        };
        let backend = self.initializer.backend();
        let section = &mut self.sections[si];
        if section.contains(index) {
            return;
        }
        if !section.is_empty() {
            log::warn!(
                "mark item {index} is not among placed items {:?}..={:?}; appending it",
                section.start_idx(),
                section.end_idx()
            );
        }
        let bound = axis.main(viewport);
        let measurer = measurer_slot(&mut self.measurer, backend, viewport, axis);
        SectionEndFiller::new(section, f64::INFINITY).fill(measurer, item, index, bound);
    }

    fn fill_next(&mut self, viewport: Size, axis: Axis, item: &mut dyn Measurable, index: usize) {
        let Some(si) = self.section_of(index) else {
            log::warn!("item {index} belongs to no section");
            return;
        };
        if self.sections[si].contains(index) {
            return;
        }
        if si > 0 && index == self.sections[si].min_item {
            let (head, tail) = self.sections.split_at_mut(si);
            head[si - 1].prepare_next_section(axis, &mut tail[0]);
        }
        let backend = self.initializer.backend();
        let measurer = measurer_slot(&mut self.measurer, backend, viewport, axis);
        let section = &mut self.sections[si];
        SectionEndFiller::new(section, f64::INFINITY).fill(measurer, item, index, f64::INFINITY);
    }

    fn fill_prev(&mut self, viewport: Size, axis: Axis, item: &mut dyn Measurable, index: usize) {
        let Some(si) = self.section_of(index) else {
            log::warn!("item {index} belongs to no section");
            return;
        };
        if self.sections[si].contains(index) {
            return;
        }
        if si + 1 < self.sections.len() && self.sections[si].max_item == Some(index) {
            let (head, tail) = self.sections.split_at_mut(si + 1);
            tail[0].prepare_prev_section(axis, &mut head[si]);
        }
        let backend = self.initializer.backend();
        let measurer = measurer_slot(&mut self.measurer, backend, viewport, axis);
        let section = &mut self.sections[si];
        SectionStartFiller::new(section, f64::NEG_INFINITY).fill(
            measurer,
            item,
            index,
            f64::NEG_INFINITY,
        );
    }

    fn on_sliding_offset_update(&mut self, delta: f64) {
        let mut delta = delta;
        if delta > 0.0
            && let Some(first) = self.sections.first()
            && first.start_idx() == Some(0)
        {
            delta = delta.min((-first.start_pos()).max(0.0));
        }
        for section in &mut self.sections {
            section.shift(delta);
        }
    }

    fn on_sliding_offset_update_in_range(
        &mut self,
        viewport: Size,
        axis: Axis,
        delta: f64,
    ) -> bool {
        let end = axis.main(viewport);
        for section in &mut self.sections {
            section.prune_front(0.0);
            section.prune_back(end);
        }
        let Some((first, last)) = self.range() else {
            return true;
        };
        if delta < 0.0 {
            self.can_fill_more(axis, viewport, last, FillDirection::End)
        } else if delta > 0.0 {
            self.can_fill_more(axis, viewport, first, FillDirection::Start)
        } else {
            false
        }
    }

    fn can_fill_more(
        &mut self,
        axis: Axis,
        viewport: Size,
        index: usize,
        direction: FillDirection,
    ) -> bool {
        let Some(si) = self.section_of(index) else {
            return false;
        };
        let section = &self.sections[si];
        if section.contains(index) {
            let edge = match direction {
                FillDirection::End => section.end_idx(),
                FillDirection::Start => section.start_idx(),
            };
            if edge != Some(index) {
                return true;
            }
        }
        let bound = axis.main(viewport);
        let geometric = match direction {
            FillDirection::End => self.can_fill_more_at_end(axis, bound, si),
            FillDirection::Start => self.can_fill_more_at_start(axis, si),
        };
        if geometric {
            return true;
        }
        let section = &self.sections[si];
        match direction {
            FillDirection::End => {
                section.end_idx().is_none()
                    || section.items_beyond_end(bound) < self.sync_cache_cnt
            }
            FillDirection::Start => {
                section.start_idx().is_none()
                    || section.items_before_start(0.0) < self.sync_cache_cnt
            }
        }
    }

    fn mark_index(&mut self) -> Option<usize> {
        for section in &mut self.sections {
            section.prune_front(0.0);
        }
        self.sections.iter().find_map(Section::start_idx)
    }

    fn range(&self) -> Option<(usize, usize)> {
        let first = self.sections.iter().find_map(Section::start_idx)?;
        let last = self.sections.iter().rev().find_map(Section::end_idx)?;
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::StaggeredFillAlgorithm;
    use crate::fill_algorithm::FillAlgorithm;
    use crate::initializer::{SectionSpec, StaggeredLayoutProps};
    use crate::measurer::LayoutBackend;
    use crate::section::nearly_eq;
    use crate::{Axis, FillDirection};
    use alloc::vec;
    use kurbo::{Insets, Size};

    const VIEWPORT: Size = Size::new(300.0, 100.0);
    const AXIS: Axis = Axis::Vertical;

    fn item() -> Size {
        Size::new(100.0, 10.0)
    }

    /// Mark item plus forward fill, the way a window adapter drives a pass.
    fn fill_forward<I: crate::SectionInitializer>(
        fill: &mut StaggeredFillAlgorithm<I>,
        start: usize,
        total: usize,
    ) -> usize {
        fill.fill_mark_item(VIEWPORT, AXIS, &mut item(), start);
        let mut cur = start;
        while cur + 1 < total && fill.can_fill_more(AXIS, VIEWPORT, cur, FillDirection::End) {
            cur += 1;
            fill.fill_next(VIEWPORT, AXIS, &mut item(), cur);
        }
        cur
    }

    fn three_lane_grid() -> StaggeredFillAlgorithm<StaggeredLayoutProps> {
        let mut fill = StaggeredFillAlgorithm::new(StaggeredLayoutProps::with_lanes(3, 2.0, 0.0));
        fill.pre_fill(VIEWPORT, AXIS, 100);
        fill
    }

    #[test]
    fn forward_fill_covers_the_viewport() {
        let mut fill = three_lane_grid();
        let last = fill_forward(&mut fill, 0, 100);
        // Item starts 0, 12, ... 96 in each of three lanes.
        assert_eq!(last, 26);
        assert_eq!(fill.range(), Some((0, 26)));
        for lane in fill.sections()[0].lanes() {
            assert_eq!(lane.items().len(), 9);
            assert!(nearly_eq(lane.end_pos(), 106.0));
        }
    }

    #[test]
    fn forward_fill_stops_at_the_last_item() {
        let mut fill = StaggeredFillAlgorithm::new(StaggeredLayoutProps::with_lanes(3, 2.0, 0.0));
        fill.pre_fill(VIEWPORT, AXIS, 5);
        assert_eq!(fill_forward(&mut fill, 0, 5), 4);
        assert!(!fill.can_fill_more(AXIS, VIEWPORT, 4, FillDirection::End));
    }

    #[test]
    fn fill_mark_item_is_idempotent() {
        let mut fill = three_lane_grid();
        fill.fill_mark_item(VIEWPORT, AXIS, &mut item(), 0);
        let before = fill.sections()[0].clone();
        fill.fill_mark_item(VIEWPORT, AXIS, &mut item(), 0);
        let after = &fill.sections()[0];
        assert_eq!(after.item_count(), 1);
        assert_eq!(after.lanes(), before.lanes());
        assert_eq!(after.lane_index_of(0), before.lane_index_of(0));
    }

    #[test]
    fn foreign_mark_item_is_appended_to_the_shortest_lane() {
        let mut fill = three_lane_grid();
        fill_forward(&mut fill, 0, 100);
        fill.fill_mark_item(VIEWPORT, AXIS, &mut item(), 50);
        let section = &fill.sections()[0];
        assert_eq!(section.item_count(), 28);
        assert_eq!(section.start_idx(), Some(0));
        assert_eq!(section.end_idx(), Some(50));
        // All lanes end at 106; ties go to the first lane.
        assert_eq!(section.lane_index_of(50), Some(0));
        assert!(nearly_eq(section.lanes()[0].end_pos(), 118.0));
        assert!(nearly_eq(section.lanes()[1].end_pos(), 106.0));
    }

    #[test]
    fn offset_never_overscrolls_the_first_item() {
        let mut fill = three_lane_grid();
        fill_forward(&mut fill, 0, 100);
        fill.on_sliding_offset_update(-30.0);
        assert!(nearly_eq(fill.sections()[0].start_pos(), -30.0));
        fill.on_sliding_offset_update(1000.0);
        assert!(nearly_eq(fill.sections()[0].start_pos(), 0.0));
        fill.on_sliding_offset_update(5.0);
        assert!(nearly_eq(fill.sections()[0].start_pos(), 0.0));
    }

    #[test]
    fn mark_index_follows_the_scroll() {
        let mut fill = three_lane_grid();
        fill_forward(&mut fill, 0, 100);
        fill.on_sliding_offset_update(-30.0);
        // Rows at -30..-20 and -18..-8 are gone; the row at -6..4 stays.
        assert_eq!(fill.mark_index(), Some(6));
        assert_eq!(fill.range(), Some((6, 26)));
    }

    #[test]
    fn backward_fill_reveals_earlier_items() {
        let mut fill = three_lane_grid();
        fill_forward(&mut fill, 0, 100);
        fill.on_sliding_offset_update(-30.0);
        fill.mark_index();
        assert!(!fill.can_fill_more(AXIS, VIEWPORT, 6, FillDirection::Start));

        fill.on_sliding_offset_update(20.0);
        assert!(fill.can_fill_more(AXIS, VIEWPORT, 6, FillDirection::Start));
        fill.fill_prev(VIEWPORT, AXIS, &mut item(), 5);
        let section = &fill.sections()[0];
        assert_eq!(section.start_idx(), Some(5));
        let lane = section.lanes()[section.lane_index_of(5).unwrap()].clone();
        let sum: f64 = lane.items().iter().map(|i| i.main_extent).sum();
        #[allow(clippy::cast_precision_loss, reason = "Small test item counts")]
        let gaps = 2.0 * (lane.items().len() - 1) as f64;
        assert!(nearly_eq(lane.end_pos() - lane.start_pos(), sum + gaps));
        assert!(nearly_eq(lane.start_pos(), 2.0));
    }

    #[test]
    fn first_section_stops_backward_fill_at_item_zero() {
        let mut fill = three_lane_grid();
        fill_forward(&mut fill, 0, 100);
        assert!(!fill.can_fill_more(AXIS, VIEWPORT, 0, FillDirection::Start));
    }

    #[test]
    fn sections_chain_with_margins() {
        let props = StaggeredLayoutProps {
            sections: vec![SectionSpec {
                item_count: 2,
                main_gap: 1.0,
                margin: Insets::new(0.0, 0.0, 0.0, 4.0),
                ..SectionSpec::default()
            }],
            lanes: 2,
            ..StaggeredLayoutProps::default()
        };
        let mut fill = StaggeredFillAlgorithm::new(props);
        fill.pre_fill(VIEWPORT, AXIS, 40);
        let last = fill_forward(&mut fill, 0, 40);
        // Header ends at 21, body rows begin at 25.
        let body = &fill.sections()[1];
        assert_eq!(body.start_idx(), Some(2));
        assert_eq!(body.lane_index_of(2), Some(0));
        let first = body.lanes()[0].placements(0.0).next().unwrap();
        assert!(nearly_eq(first.1, 25.0));
        // Two body lanes with rows at 25, 35, ... 95.
        assert_eq!(last, 17);
        assert_eq!(fill.range(), Some((0, 17)));
    }

    #[test]
    fn backward_fill_crosses_into_the_previous_section() {
        let props = StaggeredLayoutProps {
            sections: vec![SectionSpec {
                item_count: 3,
                ..SectionSpec::default()
            }],
            lanes: 2,
            ..StaggeredLayoutProps::default()
        };
        let mut fill = StaggeredFillAlgorithm::new(props);
        fill.pre_fill(VIEWPORT, AXIS, 20);
        fill.mark_jump();
        fill.fill_mark_item(VIEWPORT, AXIS, &mut item(), 3);
        fill.on_sliding_offset_update(50.0);
        assert!(fill.can_fill_more(AXIS, VIEWPORT, 3, FillDirection::Start));
        fill.fill_prev(VIEWPORT, AXIS, &mut item(), 2);
        let header = &fill.sections()[0];
        assert_eq!(header.start_idx(), Some(2));
        assert!(nearly_eq(header.end_pos(), 50.0));
        assert!(nearly_eq(header.start_pos(), 40.0));
    }

    #[test]
    fn swiper_keeps_one_extra_page() {
        let props = StaggeredLayoutProps {
            backend: LayoutBackend::Swiper,
            ..StaggeredLayoutProps::default()
        };
        let mut fill = StaggeredFillAlgorithm::new(props);
        fill.pre_fill(VIEWPORT, AXIS, 10);
        assert_eq!(fill.sync_cache_count(), 1);
        assert_eq!(fill_forward(&mut fill, 0, 10), 1);
    }

    #[test]
    fn range_mode_prunes_and_reports_the_revealed_edge() {
        let mut fill = three_lane_grid();
        fill_forward(&mut fill, 0, 100);
        fill.on_sliding_offset_update(-30.0);
        assert!(fill.on_sliding_offset_update_in_range(VIEWPORT, AXIS, -30.0));
        assert_eq!(fill.range().map(|r| r.0), Some(6));
        assert!(!fill.on_sliding_offset_update_in_range(VIEWPORT, AXIS, 0.0));
    }

    #[test]
    fn unchanged_layout_keeps_lane_state() {
        let mut fill = three_lane_grid();
        fill_forward(&mut fill, 0, 100);
        fill.pre_fill(VIEWPORT, AXIS, 100);
        assert_eq!(fill.range(), Some((0, 26)));
        fill.pre_fill(VIEWPORT, AXIS, 120);
        assert_eq!(fill.range(), None);
    }
}
