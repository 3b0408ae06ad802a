// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item measurement strategies.
//!
//! A [`Measurer`] turns a lane's cross extent (and an optional user-defined main
//! length) into a [`LayoutConstraint`], asks the item to lay itself out, and
//! reports the resulting main-axis extent.

use alloc::boxed::Box;

use kurbo::Size;

use crate::Axis;

/// Which container flavor drives the layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LayoutBackend {
    /// Waterfall / grid: items fill the lane width.
    #[default]
    Flow,
    /// List: items may be narrower than the lane.
    List,
    /// Swiper: every item occupies a full page.
    Swiper,
}

/// Size bounds handed to an item for its layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstraint {
    /// Smallest allowed size.
    pub min: Size,
    /// Largest allowed size. Infinite along unbounded axes.
    pub max: Size,
    /// Size that percentage-based dimensions resolve against.
    pub percent_reference: Size,
}

impl LayoutConstraint {
    /// Clamps `size` into `min..=max` on both axes.
    #[must_use]
    pub fn clamp(&self, size: Size) -> Size {
        Size::new(
            size.width.max(self.min.width).min(self.max.width),
            size.height.max(self.min.height).min(self.max.height),
        )
    }
}

/// Something that can lay itself out under a constraint.
pub trait Measurable {
    /// Performs a layout pass and returns the resulting size.
    fn measure(&mut self, constraint: &LayoutConstraint) -> Size;
}

impl Measurable for Size {
    fn measure(&mut self, constraint: &LayoutConstraint) -> Size {
        constraint.clamp(*self)
    }
}

/// Strategy that derives item constraints from container properties.
pub trait Measurer {
    /// The main axis this measurer was built for.
    fn axis(&self) -> Axis;

    /// Constraint for an item placed in a lane of `cross_len`.
    fn constraint(&self, cross_len: f64, user_main_len: Option<f64>) -> LayoutConstraint;

    /// Lays out `item` and returns its main-axis extent.
    ///
    /// A user-defined main length takes precedence over the measured size, though
    /// the item is still laid out with it.
    fn measure(
        &self,
        item: &mut dyn Measurable,
        index: usize,
        cross_len: f64,
        user_main_len: Option<f64>,
    ) -> f64 {
        let constraint = self.constraint(cross_len, user_main_len);
        let size = item.measure(&constraint);
        let extent = user_main_len.unwrap_or_else(|| self.axis().main(size));
        log::trace!("measured item {index}: main extent {extent}");
        extent
    }
}

/// Items are stretched across the lane; the main axis is free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowItemMeasurer {
    viewport: Size,
    axis: Axis,
}

/// Items may be narrower than the lane; the main axis is free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListItemMeasurer {
    viewport: Size,
    axis: Axis,
}

/// Items fill one viewport page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwiperItemMeasurer {
    viewport: Size,
    axis: Axis,
}

impl FlowItemMeasurer {
    /// Creates a measurer for `viewport`.
    #[must_use]
    pub const fn new(viewport: Size, axis: Axis) -> Self {
        Self { viewport, axis }
    }
}

impl ListItemMeasurer {
    /// Creates a measurer for `viewport`.
    #[must_use]
    pub const fn new(viewport: Size, axis: Axis) -> Self {
        Self { viewport, axis }
    }
}

impl SwiperItemMeasurer {
    /// Creates a measurer for `viewport`.
    #[must_use]
    pub const fn new(viewport: Size, axis: Axis) -> Self {
        Self { viewport, axis }
    }
}

impl Measurer for FlowItemMeasurer {
    fn axis(&self) -> Axis {
        self.axis
    }

    fn constraint(&self, cross_len: f64, user_main_len: Option<f64>) -> LayoutConstraint {
        let (min_main, max_main) = match user_main_len {
            Some(len) => (len, len),
            None => (0.0, f64::INFINITY),
        };
        LayoutConstraint {
            min: self.axis.size(min_main, cross_len),
            max: self.axis.size(max_main, cross_len),
            percent_reference: self.axis.size(self.axis.main(self.viewport), cross_len),
        }
    }
}

impl Measurer for ListItemMeasurer {
    fn axis(&self) -> Axis {
        self.axis
    }

    fn constraint(&self, cross_len: f64, user_main_len: Option<f64>) -> LayoutConstraint {
        let (min_main, max_main) = match user_main_len {
            Some(len) => (len, len),
            None => (0.0, f64::INFINITY),
        };
        LayoutConstraint {
            min: self.axis.size(min_main, 0.0),
            max: self.axis.size(max_main, cross_len),
            percent_reference: self.axis.size(self.axis.main(self.viewport), cross_len),
        }
    }
}

impl Measurer for SwiperItemMeasurer {
    fn axis(&self) -> Axis {
        self.axis
    }

    fn constraint(&self, cross_len: f64, user_main_len: Option<f64>) -> LayoutConstraint {
        let main = user_main_len.unwrap_or_else(|| self.axis.main(self.viewport));
        let page = self.axis.size(main, cross_len);
        LayoutConstraint {
            min: page,
            max: page,
            percent_reference: page,
        }
    }
}

/// Builds the measurer matching `backend`.
#[must_use]
pub fn create_measurer(backend: LayoutBackend, viewport: Size, axis: Axis) -> Box<dyn Measurer> {
    match backend {
        LayoutBackend::Flow => Box::new(FlowItemMeasurer::new(viewport, axis)),
        LayoutBackend::List => Box::new(ListItemMeasurer::new(viewport, axis)),
        LayoutBackend::Swiper => Box::new(SwiperItemMeasurer::new(viewport, axis)),
    }
}
