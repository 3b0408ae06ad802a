// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Section and lane bookkeeping for staggered layouts.
//!
//! A [`Section`] owns a contiguous run of item indices laid out across one or
//! more parallel [`Lane`]s. Each lane tracks the main-axis span of the items it
//! currently holds; items enter and leave only at the two ends of a lane.
//!
//! Positions are expressed in viewport space: `0.0` is the leading edge of the
//! viewport and the viewport's main extent is its trailing edge.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::fmt;

use hashbrown::HashMap;
use kurbo::Insets;
use smallvec::SmallVec;

use crate::Axis;

/// User-supplied main-axis length for an item index.
pub type MainLenFn = Rc<dyn Fn(usize) -> f64>;

/// Tolerance used when comparing lane positions.
pub(crate) const POSITION_EPSILON: f64 = 1e-3;

pub(crate) fn nearly_eq(a: f64, b: f64) -> bool {
    let d = a - b;
    d < POSITION_EPSILON && d > -POSITION_EPSILON
}

/// One placed item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemInfo {
    /// Item index in the virtual list.
    pub index: usize,
    /// Size of the item along the main axis.
    pub main_extent: f64,
}

/// A single track of items within a [`Section`].
///
/// When `items` is non-empty, `end_pos - start_pos` equals the sum of the item
/// extents plus one gap between each pair of neighbors. An empty lane has
/// `start_pos == end_pos`, the position its next item would take.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lane {
    pub(crate) start_pos: f64,
    pub(crate) end_pos: f64,
    pub(crate) items: VecDeque<ItemInfo>,
    pub(crate) cross_extent: f64,
}

impl Lane {
    /// Creates an empty lane positioned at `pos`.
    #[must_use]
    pub fn new(pos: f64, cross_extent: f64) -> Self {
        Self {
            start_pos: pos,
            end_pos: pos,
            items: VecDeque::new(),
            cross_extent,
        }
    }

    /// Main-axis position of the leading edge of the first item.
    #[must_use]
    pub fn start_pos(&self) -> f64 {
        self.start_pos
    }

    /// Main-axis position of the trailing edge of the last item.
    #[must_use]
    pub fn end_pos(&self) -> f64 {
        self.end_pos
    }

    /// Cross-axis size available to items in this lane.
    #[must_use]
    pub fn cross_extent(&self) -> f64 {
        self.cross_extent
    }

    /// Items in index order.
    #[must_use]
    pub fn items(&self) -> &VecDeque<ItemInfo> {
        &self.items
    }

    /// Returns `true` if no items are placed in this lane.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Where the next appended item would start.
    #[must_use]
    pub fn next_end_start(&self, gap: f64) -> f64 {
        if self.items.is_empty() {
            self.end_pos
        } else {
            self.end_pos + gap
        }
    }

    /// Where the next prepended item would end.
    #[must_use]
    pub fn next_start_end(&self, gap: f64) -> f64 {
        if self.items.is_empty() {
            self.start_pos
        } else {
            self.start_pos - gap
        }
    }

    /// Iterates over `(item, start, end)` for every placed item.
    pub fn placements(&self, gap: f64) -> impl Iterator<Item = (ItemInfo, f64, f64)> + '_ {
        let mut pos = self.start_pos;
        self.items.iter().map(move |item| {
            let start = pos;
            let end = start + item.main_extent;
            pos = end + gap;
            (*item, start, end)
        })
    }

    pub(crate) fn push_back(&mut self, item: ItemInfo, gap: f64) {
        let start = self.next_end_start(gap);
        if self.items.is_empty() {
            self.start_pos = start;
        }
        self.end_pos = start + item.main_extent;
        self.items.push_back(item);
    }

    pub(crate) fn push_front(&mut self, item: ItemInfo, gap: f64) {
        let end = self.next_start_end(gap);
        if self.items.is_empty() {
            self.end_pos = end;
        }
        self.start_pos = end - item.main_extent;
        self.items.push_front(item);
    }

    fn pop_front(&mut self, gap: f64) -> Option<ItemInfo> {
        let item = self.items.pop_front()?;
        if self.items.is_empty() {
            self.start_pos = self.end_pos + gap;
            self.end_pos = self.start_pos;
        } else {
            self.start_pos += item.main_extent + gap;
        }
        Some(item)
    }

    fn pop_back(&mut self, gap: f64) -> Option<ItemInfo> {
        let item = self.items.pop_back()?;
        if self.items.is_empty() {
            self.end_pos = self.start_pos - gap;
            self.start_pos = self.end_pos;
        } else {
            self.end_pos -= item.main_extent + gap;
        }
        Some(item)
    }

    fn reset(&mut self, pos: f64) {
        self.items.clear();
        self.start_pos = pos;
        self.end_pos = pos;
    }

    fn shift(&mut self, delta: f64) {
        self.start_pos += delta;
        self.end_pos += delta;
    }
}

/// A contiguous run of items sharing one lane configuration.
#[derive(Clone)]
pub struct Section {
    /// Gap between consecutive items of a lane.
    pub main_gap: f64,
    /// Gap between neighboring lanes.
    pub cross_gap: f64,
    /// First item index owned by this section.
    pub min_item: usize,
    /// Last item index owned by this section (inclusive), `None` if unbounded.
    pub max_item: Option<usize>,
    /// Outer margins of the section.
    pub margin: Insets,
    /// Optional per-index main length that overrides measurement.
    pub user_def_main_len: Option<MainLenFn>,
    pub(crate) lanes: SmallVec<[Lane; 4]>,
    pub(crate) idx_to_lane: HashMap<usize, usize>,
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("main_gap", &self.main_gap)
            .field("cross_gap", &self.cross_gap)
            .field("min_item", &self.min_item)
            .field("max_item", &self.max_item)
            .field("margin", &self.margin)
            .field("user_def_main_len", &self.user_def_main_len.is_some())
            .field("lanes", &self.lanes)
            .finish_non_exhaustive()
    }
}

impl Section {
    /// Creates a section owning `min_item..=max_item` with lanes of the given cross extents.
    ///
    /// All lanes start empty at position `0.0`.
    #[must_use]
    pub fn new(
        min_item: usize,
        max_item: Option<usize>,
        lane_cross_extents: impl IntoIterator<Item = f64>,
    ) -> Self {
        Self {
            main_gap: 0.0,
            cross_gap: 0.0,
            min_item,
            max_item,
            margin: Insets::ZERO,
            user_def_main_len: None,
            lanes: lane_cross_extents
                .into_iter()
                .map(|cross| Lane::new(0.0, cross))
                .collect(),
            idx_to_lane: HashMap::new(),
        }
    }

    /// Sets the main and cross gaps.
    #[must_use]
    pub fn with_gaps(mut self, main_gap: f64, cross_gap: f64) -> Self {
        self.main_gap = main_gap;
        self.cross_gap = cross_gap;
        self
    }

    /// Sets the section margins.
    #[must_use]
    pub fn with_margin(mut self, margin: Insets) -> Self {
        self.margin = margin;
        self
    }

    /// Sets a per-index main length that overrides measurement.
    #[must_use]
    pub fn with_main_len(mut self, main_len: MainLenFn) -> Self {
        self.user_def_main_len = Some(main_len);
        self
    }

    /// The lanes of this section.
    #[must_use]
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Returns `true` if `index` falls inside this section's item range.
    #[must_use]
    pub fn owns(&self, index: usize) -> bool {
        index >= self.min_item && self.max_item.is_none_or(|max| index <= max)
    }

    /// Returns `true` if `index` is currently placed in one of the lanes.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.idx_to_lane.contains_key(&index)
    }

    /// Returns `true` if no lane holds any item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(Lane::is_empty)
    }

    /// Number of placed items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.idx_to_lane.len()
    }

    /// Smallest placed item index, `None` if the section holds no items.
    #[must_use]
    pub fn start_idx(&self) -> Option<usize> {
        self.lanes
            .iter()
            .filter_map(|lane| lane.items.front().map(|item| item.index))
            .min()
    }

    /// Largest placed item index, `None` if the section holds no items.
    #[must_use]
    pub fn end_idx(&self) -> Option<usize> {
        self.lanes
            .iter()
            .filter_map(|lane| lane.items.back().map(|item| item.index))
            .max()
    }

    /// Smallest lane start position.
    ///
    /// A section without lanes is malformed; this logs and returns `0.0`.
    #[must_use]
    pub fn start_pos(&self) -> f64 {
        let Some((first, rest)) = self.lanes.split_first() else {
            log::warn!("start_pos queried on a section without lanes");
            return 0.0;
        };
        rest.iter().fold(first.start_pos, |pos, lane| {
            if !nearly_eq(lane.start_pos, pos) && lane.start_pos < pos {
                lane.start_pos
            } else {
                pos
            }
        })
    }

    /// Largest lane end position.
    ///
    /// A section without lanes is malformed; this logs and returns `0.0`.
    #[must_use]
    pub fn end_pos(&self) -> f64 {
        let Some((first, rest)) = self.lanes.split_first() else {
            log::warn!("end_pos queried on a section without lanes");
            return 0.0;
        };
        rest.iter().fold(first.end_pos, |pos, lane| {
            if !nearly_eq(lane.end_pos, pos) && lane.end_pos > pos {
                lane.end_pos
            } else {
                pos
            }
        })
    }

    /// Ordinal of the lane holding `index`.
    #[must_use]
    pub fn lane_index_of(&self, index: usize) -> Option<usize> {
        self.idx_to_lane.get(&index).copied()
    }

    /// The lane holding `index`.
    ///
    /// Unknown indices log a warning and yield `None`.
    #[must_use]
    pub fn lane_of(&self, index: usize) -> Option<&Lane> {
        let lane = self
            .idx_to_lane
            .get(&index)
            .and_then(|&lane| self.lanes.get(lane));
        if lane.is_none() {
            log::warn!("no lane holds item {index}");
        }
        lane
    }

    /// Chains `next` directly after this section.
    ///
    /// Every lane of `next` is emptied and moved to this section's end position
    /// plus the margins separating the two sections.
    pub fn prepare_next_section(&self, axis: Axis, next: &mut Self) {
        let pos = self.end_pos() + axis.margin_end(&self.margin) + axis.margin_start(&next.margin);
        next.reset_lanes(pos);
    }

    /// Chains `prev` directly before this section.
    ///
    /// Lanes of `prev` are shifted (not reset) so that its trailing edge lands
    /// right before this section, keeping the stagger between its lanes.
    pub fn prepare_prev_section(&self, axis: Axis, prev: &mut Self) {
        if prev.lanes.is_empty() {
            log::warn!("cannot chain a previous section without lanes");
            return;
        }
        let required_end =
            self.start_pos() - axis.margin_start(&self.margin) - axis.margin_end(&prev.margin);
        let diff = required_end - prev.end_pos();
        for lane in &mut prev.lanes {
            lane.items.clear();
            lane.end_pos += diff;
            lane.start_pos = lane.end_pos;
        }
        prev.idx_to_lane.clear();
    }

    /// Removes leading items whose trailing edge is at or before `start`.
    ///
    /// Items leave in index order, so the section stays contiguous. Pruning stops
    /// at the first boundary item that is still (partially) visible. If the
    /// boundary bookkeeping is inconsistent, this logs and stops early.
    pub fn prune_front(&mut self, start: f64) {
        let gap = self.main_gap;
        while let Some(index) = self.start_idx() {
            let Some(lane) = self
                .idx_to_lane
                .get(&index)
                .and_then(|&lane| self.lanes.get_mut(lane))
            else {
                log::warn!("item {index} has no lane; section is corrupted, prune stopped");
                return;
            };
            match lane.items.front() {
                Some(front) if front.index == index => {
                    if lane.start_pos + front.main_extent > start {
                        return;
                    }
                }
                _ => {
                    log::warn!(
                        "front of lane for item {index} does not match; section is corrupted, prune stopped"
                    );
                    return;
                }
            }
            lane.pop_front(gap);
            self.idx_to_lane.remove(&index);
        }
    }

    /// Removes trailing items whose leading edge is at or after `end`.
    ///
    /// Mirror image of [`Section::prune_front`].
    pub fn prune_back(&mut self, end: f64) {
        let gap = self.main_gap;
        while let Some(index) = self.end_idx() {
            let Some(lane) = self
                .idx_to_lane
                .get(&index)
                .and_then(|&lane| self.lanes.get_mut(lane))
            else {
                log::warn!("item {index} has no lane; section is corrupted, prune stopped");
                return;
            };
            match lane.items.back() {
                Some(back) if back.index == index => {
                    if lane.end_pos - back.main_extent < end {
                        return;
                    }
                }
                _ => {
                    log::warn!(
                        "back of lane for item {index} does not match; section is corrupted, prune stopped"
                    );
                    return;
                }
            }
            lane.pop_back(gap);
            self.idx_to_lane.remove(&index);
        }
    }

    /// Empties every lane and moves it to `pos`.
    pub fn reset_lanes(&mut self, pos: f64) {
        for lane in &mut self.lanes {
            lane.reset(pos);
        }
        self.idx_to_lane.clear();
    }

    /// Empties every lane in place, collapsing each onto its start position.
    pub fn clear_items(&mut self) {
        for lane in &mut self.lanes {
            let pos = lane.start_pos;
            lane.reset(pos);
        }
        self.idx_to_lane.clear();
    }

    /// Moves every lane by `delta` along the main axis.
    pub fn shift(&mut self, delta: f64) {
        for lane in &mut self.lanes {
            lane.shift(delta);
        }
    }

    /// Number of placed items that start at or after `bound`.
    #[must_use]
    pub fn items_beyond_end(&self, bound: f64) -> usize {
        self.lanes
            .iter()
            .flat_map(|lane| lane.placements(self.main_gap))
            .filter(|&(_, start, _)| start >= bound)
            .count()
    }

    /// Number of placed items that end at or before `bound`.
    #[must_use]
    pub fn items_before_start(&self, bound: f64) -> usize {
        self.lanes
            .iter()
            .flat_map(|lane| lane.placements(self.main_gap))
            .filter(|&(_, _, end)| end <= bound)
            .count()
    }

    /// Returns `true` if `other` describes the same lane configuration.
    ///
    /// Placed items and lane positions are ignored.
    #[must_use]
    pub fn same_structure(&self, other: &Self) -> bool {
        let main_len_eq = match (&self.user_def_main_len, &other.user_def_main_len) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };
        main_len_eq
            && self.min_item == other.min_item
            && self.max_item == other.max_item
            && nearly_eq(self.main_gap, other.main_gap)
            && nearly_eq(self.cross_gap, other.cross_gap)
            && self.margin == other.margin
            && self.lanes.len() == other.lanes.len()
            && self
                .lanes
                .iter()
                .zip(other.lanes.iter())
                .all(|(a, b)| nearly_eq(a.cross_extent, b.cross_extent))
    }

    pub(crate) fn append(&mut self, lane: usize, item: ItemInfo) {
        let gap = self.main_gap;
        if let Some(target) = self.lanes.get_mut(lane) {
            target.push_back(item, gap);
            self.idx_to_lane.insert(item.index, lane);
        }
    }

    pub(crate) fn prepend(&mut self, lane: usize, item: ItemInfo) {
        let gap = self.main_gap;
        if let Some(target) = self.lanes.get_mut(lane) {
            target.push_front(item, gap);
            self.idx_to_lane.insert(item.index, lane);
        }
    }
}
