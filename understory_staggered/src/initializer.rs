// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Section construction from layout properties.

use alloc::vec::Vec;
use core::fmt;

use kurbo::{Insets, Size};

use crate::Axis;
use crate::measurer::LayoutBackend;
use crate::section::{MainLenFn, Section};

/// Produces the section list for a container.
pub trait SectionInitializer {
    /// Builds fresh, empty sections covering `total_count` items.
    fn init_sections(&self, total_count: usize, viewport: Size, axis: Axis) -> Vec<Section>;

    /// Returns `true` if `cur` differs structurally from `prev`.
    ///
    /// Lane contents are ignored; only the configuration is compared.
    fn compare(&self, prev: &[Section], cur: &[Section]) -> bool {
        prev.len() != cur.len()
            || prev
                .iter()
                .zip(cur)
                .any(|(a, b)| !a.same_structure(b))
    }

    /// The container flavor, which selects the measurer.
    fn backend(&self) -> LayoutBackend {
        LayoutBackend::Flow
    }
}

/// Configuration of one section.
#[derive(Clone)]
pub struct SectionSpec {
    /// Number of items in the section.
    pub item_count: usize,
    /// Number of lanes. Zero is treated as one.
    pub lanes: usize,
    /// Gap between items of a lane.
    pub main_gap: f64,
    /// Gap between lanes.
    pub cross_gap: f64,
    /// Outer margins.
    pub margin: Insets,
    /// Optional fixed main length per item index.
    pub main_len: Option<MainLenFn>,
}

impl fmt::Debug for SectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionSpec")
            .field("item_count", &self.item_count)
            .field("lanes", &self.lanes)
            .field("main_gap", &self.main_gap)
            .field("cross_gap", &self.cross_gap)
            .field("margin", &self.margin)
            .field("main_len", &self.main_len.is_some())
            .finish()
    }
}

impl Default for SectionSpec {
    fn default() -> Self {
        Self {
            item_count: 0,
            lanes: 1,
            main_gap: 0.0,
            cross_gap: 0.0,
            margin: Insets::ZERO,
            main_len: None,
        }
    }
}

impl SectionSpec {
    fn build(&self, min_item: usize, max_item: usize, viewport: Size, axis: Axis) -> Section {
        let lanes = self.lanes.max(1);
        #[allow(clippy::cast_precision_loss, reason = "Lane counts are small")]
        let n = lanes as f64;
        let cross = axis.cross(viewport) - axis.cross_margin(&self.margin);
        let lane_cross = ((cross - self.cross_gap * (n - 1.0)) / n).max(0.0);
        let section = Section::new(
            min_item,
            Some(max_item),
            core::iter::repeat_n(lane_cross, lanes),
        )
        .with_gaps(self.main_gap, self.cross_gap)
        .with_margin(self.margin);
        match &self.main_len {
            Some(len) => section.with_main_len(len.clone()),
            None => section,
        }
    }
}

/// Layout properties of a staggered container.
///
/// Items not covered by `sections` fall into one trailing section built from
/// the fallback lane count and gaps.
#[derive(Debug, Clone)]
pub struct StaggeredLayoutProps {
    /// Explicit sections, in item order.
    pub sections: Vec<SectionSpec>,
    /// Lane count for items outside `sections`.
    pub lanes: usize,
    /// Main gap for items outside `sections`.
    pub main_gap: f64,
    /// Cross gap for items outside `sections`.
    pub cross_gap: f64,
    /// Container flavor.
    pub backend: LayoutBackend,
}

impl Default for StaggeredLayoutProps {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
            lanes: 1,
            main_gap: 0.0,
            cross_gap: 0.0,
            backend: LayoutBackend::Flow,
        }
    }
}

impl StaggeredLayoutProps {
    /// A single-section layout with `lanes` lanes.
    #[must_use]
    pub fn with_lanes(lanes: usize, main_gap: f64, cross_gap: f64) -> Self {
        Self {
            lanes,
            main_gap,
            cross_gap,
            ..Self::default()
        }
    }
}

impl SectionInitializer for StaggeredLayoutProps {
    fn init_sections(&self, total_count: usize, viewport: Size, axis: Axis) -> Vec<Section> {
        let mut out = Vec::new();
        let mut start = 0;
        for spec in &self.sections {
            if start >= total_count {
                break;
            }
            if spec.item_count == 0 {
                continue;
            }
            let end = (start + spec.item_count).min(total_count) - 1;
            out.push(spec.build(start, end, viewport, axis));
            start = end + 1;
        }
        if start < total_count {
            let fallback = SectionSpec {
                item_count: total_count - start,
                lanes: self.lanes,
                main_gap: self.main_gap,
                cross_gap: self.cross_gap,
                ..SectionSpec::default()
            };
            out.push(fallback.build(start, total_count - 1, viewport, axis));
        }
        out
    }

    fn backend(&self) -> LayoutBackend {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::{SectionInitializer, SectionSpec, StaggeredLayoutProps};
    use crate::Axis;
    use alloc::vec;
    use kurbo::{Insets, Size};

    #[test]
    fn single_section_covers_every_item() {
        let props = StaggeredLayoutProps::with_lanes(3, 2.0, 10.0);
        let sections = props.init_sections(50, Size::new(320.0, 600.0), Axis::Vertical);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].min_item, 0);
        assert_eq!(sections[0].max_item, Some(49));
        assert_eq!(sections[0].lanes().len(), 3);
        assert_eq!(sections[0].lanes()[0].cross_extent(), 100.0);
    }

    #[test]
    fn no_items_means_no_sections() {
        let props = StaggeredLayoutProps::default();
        assert!(
            props
                .init_sections(0, Size::new(320.0, 600.0), Axis::Vertical)
                .is_empty()
        );
    }

    #[test]
    fn explicit_sections_then_fallback() {
        let props = StaggeredLayoutProps {
            sections: vec![
                SectionSpec {
                    item_count: 1,
                    margin: Insets::new(10.0, 0.0, 10.0, 0.0),
                    ..SectionSpec::default()
                },
                SectionSpec {
                    item_count: 10,
                    lanes: 2,
                    ..SectionSpec::default()
                },
            ],
            lanes: 4,
            ..StaggeredLayoutProps::default()
        };
        let sections = props.init_sections(20, Size::new(400.0, 600.0), Axis::Vertical);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].lanes()[0].cross_extent(), 380.0);
        assert_eq!((sections[1].min_item, sections[1].max_item), (1, Some(10)));
        assert_eq!((sections[2].min_item, sections[2].max_item), (11, Some(19)));
        assert_eq!(sections[2].lanes().len(), 4);

        let truncated = props.init_sections(5, Size::new(400.0, 600.0), Axis::Vertical);
        assert_eq!(truncated.len(), 2);
        assert_eq!(truncated[1].max_item, Some(4));
    }

    #[test]
    fn compare_detects_structural_changes_only() {
        let props = StaggeredLayoutProps::with_lanes(2, 0.0, 0.0);
        let a = props.init_sections(10, Size::new(200.0, 600.0), Axis::Vertical);
        let b = props.init_sections(10, Size::new(200.0, 900.0), Axis::Vertical);
        assert!(!props.compare(&a, &b));
        let c = props.init_sections(10, Size::new(300.0, 600.0), Axis::Vertical);
        assert!(props.compare(&a, &c));
        let d = props.init_sections(11, Size::new(200.0, 600.0), Axis::Vertical);
        assert!(props.compare(&a, &d));
    }
}
