// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy shortest-lane placement.
//!
//! A filler is single use: it borrows a [`Section`], snapshots which lanes can
//! still grow toward the bound, and then places one item per [`SectionFiller::fill`]
//! call into whichever lane is currently shortest.

use alloc::collections::BinaryHeap;
use core::cmp::{Ordering, Reverse};

use crate::measurer::{Measurable, Measurer};
use crate::section::{ItemInfo, Section};

/// Places items into a section one at a time.
pub trait SectionFiller {
    /// Returns `true` if some lane can still take an item.
    fn can_fill(&self) -> bool;

    /// Measures `item` and places it as `index` in the best lane.
    ///
    /// Returns `false` without doing anything if no lane can take the item.
    /// After placement the lane is queued again only if its next candidate
    /// position is still inside `bound`.
    fn fill(
        &mut self,
        measurer: &dyn Measurer,
        item: &mut dyn Measurable,
        index: usize,
        bound: f64,
    ) -> bool;
}

/// Heap entry. `key` is the main position for end fills and the negated
/// position for start fills, so both fillers pop the smallest key and break
/// ties on the lower lane.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    key: f64,
    lane: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| self.lane.cmp(&other.lane))
    }
}

fn measure_for_lane(
    section: &Section,
    lane: usize,
    measurer: &dyn Measurer,
    item: &mut dyn Measurable,
    index: usize,
) -> Option<ItemInfo> {
    let cross = section.lanes.get(lane)?.cross_extent;
    let user_len = section.user_def_main_len.as_ref().map(|len| len(index));
    let main_extent = measurer.measure(item, index, cross, user_len);
    Some(ItemInfo { index, main_extent })
}

/// Appends items after the current end of a section.
#[derive(Debug)]
pub struct SectionEndFiller<'a> {
    section: &'a mut Section,
    queue: BinaryHeap<Reverse<Candidate>>,
}

impl<'a> SectionEndFiller<'a> {
    /// Queues every lane whose next item would start before `bound`.
    pub fn new(section: &'a mut Section, bound: f64) -> Self {
        let gap = section.main_gap;
        let queue = section
            .lanes
            .iter()
            .enumerate()
            .filter_map(|(lane, l)| {
                let pos = l.next_end_start(gap);
                (pos < bound).then_some(Reverse(Candidate { key: pos, lane }))
            })
            .collect();
        Self { section, queue }
    }
}

impl SectionFiller for SectionEndFiller<'_> {
    fn can_fill(&self) -> bool {
        !self.queue.is_empty()
    }

    fn fill(
        &mut self,
        measurer: &dyn Measurer,
        item: &mut dyn Measurable,
        index: usize,
        bound: f64,
    ) -> bool {
        let Some(Reverse(Candidate { lane, .. })) = self.queue.pop() else {
            return false;
        };
        let Some(info) = measure_for_lane(self.section, lane, measurer, item, index) else {
            return false;
        };
        self.section.append(lane, info);
        log::trace!("placed item {index} at the end of lane {lane}");
        let pos = self.section.lanes[lane].next_end_start(self.section.main_gap);
        if pos < bound {
            self.queue.push(Reverse(Candidate { key: pos, lane }));
        }
        true
    }
}

/// Prepends items before the current start of a section.
#[derive(Debug)]
pub struct SectionStartFiller<'a> {
    section: &'a mut Section,
    queue: BinaryHeap<Reverse<Candidate>>,
}

impl<'a> SectionStartFiller<'a> {
    /// Queues every lane whose next item would end after `bound`.
    pub fn new(section: &'a mut Section, bound: f64) -> Self {
        let gap = section.main_gap;
        let queue = section
            .lanes
            .iter()
            .enumerate()
            .filter_map(|(lane, l)| {
                let pos = l.next_start_end(gap);
                (pos > bound).then_some(Reverse(Candidate { key: -pos, lane }))
            })
            .collect();
        Self { section, queue }
    }
}

impl SectionFiller for SectionStartFiller<'_> {
    fn can_fill(&self) -> bool {
        !self.queue.is_empty()
    }

    fn fill(
        &mut self,
        measurer: &dyn Measurer,
        item: &mut dyn Measurable,
        index: usize,
        bound: f64,
    ) -> bool {
        let Some(Reverse(Candidate { lane, .. })) = self.queue.pop() else {
            return false;
        };
        let Some(info) = measure_for_lane(self.section, lane, measurer, item, index) else {
            return false;
        };
        self.section.prepend(lane, info);
        log::trace!("placed item {index} at the start of lane {lane}");
        let pos = self.section.lanes[lane].next_start_end(self.section.main_gap);
        if pos > bound {
            self.queue.push(Reverse(Candidate { key: -pos, lane }));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{SectionEndFiller, SectionFiller, SectionStartFiller};
    use crate::Axis;
    use crate::measurer::FlowItemMeasurer;
    use crate::section::{Section, nearly_eq};
    use kurbo::Size;

    fn measurer() -> FlowItemMeasurer {
        FlowItemMeasurer::new(Size::new(300.0, 100.0), Axis::Vertical)
    }

    fn three_lanes() -> Section {
        Section::new(0, None, [100.0, 100.0, 100.0]).with_gaps(2.0, 0.0)
    }

    #[test]
    fn nine_equal_items_level_three_lanes() {
        let mut section = three_lanes();
        let m = measurer();
        let mut filler = SectionEndFiller::new(&mut section, 100.0);
        for index in 0..9 {
            let mut item = Size::new(100.0, 10.0);
            assert!(filler.fill(&m, &mut item, index, 100.0));
        }
        for lane in section.lanes() {
            assert_eq!(lane.items().len(), 3);
            assert!(nearly_eq(lane.end_pos(), 34.0));
        }
        // Ties go to the lower lane.
        assert_eq!(section.lane_index_of(0), Some(0));
        assert_eq!(section.lane_index_of(1), Some(1));
        assert_eq!(section.lane_index_of(3), Some(0));
    }

    #[test]
    fn lanes_stay_balanced_under_constant_extents() {
        let mut section = Section::new(0, None, [50.0, 50.0, 50.0, 50.0]).with_gaps(3.0, 0.0);
        let m = measurer();
        let mut filler = SectionEndFiller::new(&mut section, f64::INFINITY);
        for index in 0..37 {
            let mut item = Size::new(50.0, 17.0);
            assert!(filler.fill(&m, &mut item, index, f64::INFINITY));
        }
        let ends: alloc::vec::Vec<f64> = section.lanes().iter().map(|l| l.end_pos()).collect();
        let max = ends.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = ends.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(max - min <= 17.0 + 3.0 + 1e-9);
    }

    #[test]
    fn shortest_lane_takes_the_next_item() {
        let mut section = Section::new(0, None, [50.0, 50.0]).with_gaps(0.0, 0.0);
        let m = measurer();
        let mut filler = SectionEndFiller::new(&mut section, 1000.0);
        let mut tall = Size::new(50.0, 80.0);
        let mut short = Size::new(50.0, 10.0);
        filler.fill(&m, &mut tall, 0, 1000.0);
        filler.fill(&m, &mut short, 1, 1000.0);
        filler.fill(&m, &mut short, 2, 1000.0);
        assert_eq!(section.lane_index_of(2), Some(1));
    }

    #[test]
    fn end_filler_stops_at_the_bound() {
        let mut section = three_lanes();
        let m = measurer();
        let mut filler = SectionEndFiller::new(&mut section, 25.0);
        let mut placed = 0;
        while filler.can_fill() {
            let mut item = Size::new(100.0, 10.0);
            assert!(filler.fill(&m, &mut item, placed, 25.0));
            placed += 1;
        }
        // Each lane takes items starting at 0, 12 and 24.
        assert_eq!(placed, 9);
        let mut item = Size::new(100.0, 10.0);
        assert!(!filler.fill(&m, &mut item, placed, 25.0));
    }

    #[test]
    fn lanes_beyond_the_bound_are_not_queued() {
        let mut section = three_lanes();
        section.reset_lanes(120.0);
        let filler = SectionEndFiller::new(&mut section, 100.0);
        assert!(!filler.can_fill());
    }

    #[test]
    fn start_filler_grows_the_lowest_start_first() {
        let mut section = Section::new(0, None, [50.0, 50.0]).with_gaps(2.0, 0.0);
        section.reset_lanes(40.0);
        let m = measurer();
        let mut filler = SectionStartFiller::new(&mut section, 0.0);
        let mut item = Size::new(50.0, 15.0);
        for index in (0..4).rev() {
            assert!(filler.fill(&m, &mut item, index, 0.0));
        }
        // Next candidates end at 6, still above the bound.
        assert!(filler.can_fill());
        for lane in section.lanes() {
            assert_eq!(lane.items().len(), 2);
            assert!(nearly_eq(lane.start_pos(), 8.0));
            let sum: f64 = lane.items().iter().map(|i| i.main_extent).sum();
            assert!(nearly_eq(lane.end_pos() - lane.start_pos(), sum + 2.0));
        }
        assert_eq!(section.start_idx(), Some(0));
        assert_eq!(section.end_idx(), Some(3));
    }

    #[test]
    fn user_main_len_overrides_measurement() {
        let mut section =
            Section::new(0, None, [50.0]).with_main_len(alloc::rc::Rc::new(|i| if i == 2 { 7.0 } else { 5.0 }));
        let m = measurer();
        let mut filler = SectionEndFiller::new(&mut section, 100.0);
        let mut item = Size::new(50.0, 99.0);
        filler.fill(&m, &mut item, 2, 100.0);
        assert!(nearly_eq(section.end_pos(), 7.0));
    }
}
