// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout axis, fill direction, and alignment vocabulary shared by the fill algorithms.

use kurbo::{Insets, Size};

/// The main (scrolling) axis of a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Items flow left to right; lanes are rows.
    Horizontal,
    /// Items flow top to bottom; lanes are columns.
    #[default]
    Vertical,
}

impl Axis {
    /// Extent of `size` along the main axis.
    #[must_use]
    pub const fn main(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Extent of `size` along the cross axis.
    #[must_use]
    pub const fn cross(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.height,
            Self::Vertical => size.width,
        }
    }

    /// Builds a [`Size`] from main/cross extents.
    #[must_use]
    pub const fn size(self, main: f64, cross: f64) -> Size {
        match self {
            Self::Horizontal => Size::new(main, cross),
            Self::Vertical => Size::new(cross, main),
        }
    }

    /// Margin on the leading edge of the main axis (top or left).
    #[must_use]
    pub const fn margin_start(self, margin: &Insets) -> f64 {
        match self {
            Self::Horizontal => margin.x0,
            Self::Vertical => margin.y0,
        }
    }

    /// Margin on the trailing edge of the main axis (bottom or right).
    #[must_use]
    pub const fn margin_end(self, margin: &Insets) -> f64 {
        match self {
            Self::Horizontal => margin.x1,
            Self::Vertical => margin.y1,
        }
    }

    /// Sum of the cross-axis margins.
    #[must_use]
    pub const fn cross_margin(self, margin: &Insets) -> f64 {
        match self {
            Self::Horizontal => margin.y0 + margin.y1,
            Self::Vertical => margin.x0 + margin.x1,
        }
    }
}

/// The edge of the window that is being grown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillDirection {
    /// Toward lower indices (top/left).
    Start,
    /// Toward higher indices (bottom/right).
    End,
}

impl FillDirection {
    /// The other edge.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

/// Alignment of a jump or scroll target within the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScrollAlign {
    /// Align the start of the item with the start of the viewport.
    #[default]
    Start,
    /// Center the item within the viewport.
    Center,
    /// Align the end of the item with the end of the viewport.
    End,
    /// Move just enough to make the item fully visible.
    Auto,
    /// Leave alignment to the scrollable container.
    None,
}
