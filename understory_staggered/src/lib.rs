// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Staggered: multi-lane fill algorithms for lazy containers.
//!
//! This crate decides *where* the items of a virtualized container go and
//! *whether* more of them fit in the viewport. It knows nothing about nodes,
//! widgets, or rendering; a window adapter (see `understory_lazy_window`) feeds
//! it measurable items one at a time.
//!
//! The core concepts are:
//!
//! - [`Section`]: a contiguous run of item indices laid out across parallel
//!   [`Lane`]s with shared gaps and margins.
//! - [`SectionEndFiller`] / [`SectionStartFiller`]: greedy shortest-lane
//!   placement, the usual masonry heuristic.
//! - [`Measurer`]: derives an item's [`LayoutConstraint`] from its lane and the
//!   container flavor ([`LayoutBackend`]).
//! - [`FillAlgorithm`]: the capability a window adapter drives, implemented by
//!   [`StaggeredFillAlgorithm`] and the geometry-free [`DummyFillAlgorithm`].
//! - [`SectionInitializer`]: builds sections from layout properties such as
//!   [`StaggeredLayoutProps`].
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Size;
//! use understory_staggered::{
//!     Axis, FillAlgorithm, FillDirection, StaggeredFillAlgorithm, StaggeredLayoutProps,
//! };
//!
//! // Three columns with a 2px row gap in a 300x100 viewport.
//! let mut fill = StaggeredFillAlgorithm::new(StaggeredLayoutProps::with_lanes(3, 2.0, 0.0));
//! let viewport = Size::new(300.0, 100.0);
//! fill.pre_fill(viewport, Axis::Vertical, 1000);
//!
//! // `Size` measures as itself, clamped to the constraint.
//! fill.fill_mark_item(viewport, Axis::Vertical, &mut Size::new(100.0, 10.0), 0);
//! let mut last = 0;
//! while fill.can_fill_more(Axis::Vertical, viewport, last, FillDirection::End) {
//!     last += 1;
//!     fill.fill_next(viewport, Axis::Vertical, &mut Size::new(100.0, 10.0), last);
//! }
//! assert_eq!(fill.range(), Some((0, last)));
//! ```
//!
//! Positions are viewport-relative: `0.0` is the viewport's leading edge.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod axis;
mod fill_algorithm;
mod filler;
mod initializer;
mod measurer;
mod section;
mod staggered;

pub use axis::{Axis, FillDirection, ScrollAlign};
pub use fill_algorithm::{DummyFillAlgorithm, FillAlgorithm};
pub use filler::{SectionEndFiller, SectionFiller, SectionStartFiller};
pub use initializer::{SectionInitializer, SectionSpec, StaggeredLayoutProps};
pub use measurer::{
    FlowItemMeasurer, LayoutBackend, LayoutConstraint, ListItemMeasurer, Measurable, Measurer,
    SwiperItemMeasurer, create_measurer,
};
pub use section::{ItemInfo, Lane, MainLenFn, Section};
pub use staggered::StaggeredFillAlgorithm;
