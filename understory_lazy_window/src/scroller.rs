// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Imperative scrolling commands for a scrollable container.

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use kurbo::{Point, Rect, Vec2};
use understory_staggered::ScrollAlign;

/// An edge of the scrollable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollEdge {
    /// The leading edge (top or left).
    Start,
    /// The trailing edge (bottom or right).
    End,
}

/// The scrollable container behind a [`Scroller`].
pub trait ScrollController {
    /// Scrolls to an absolute content offset.
    fn scroll_to(&mut self, offset: Vec2, animate: bool);
    /// Scrolls so that item `index` is placed according to `align`.
    fn scroll_to_index(
        &mut self,
        index: usize,
        animate: bool,
        align: ScrollAlign,
        extra_offset: Option<f64>,
    );
    /// Scrolls to one edge of the content.
    fn scroll_edge(&mut self, edge: ScrollEdge);
    /// Starts a fling with the given main-axis velocity.
    fn fling(&mut self, velocity: f64);
    /// Scrolls by a relative delta.
    fn scroll_by(&mut self, delta: Vec2);
    /// Scrolls one viewport forward (`next`) or backward.
    fn scroll_page(&mut self, next: bool, animate: bool);
    /// Bounds of a realized item, in viewport coordinates.
    fn item_rect(&self, index: usize) -> Option<Rect>;
    /// Index of the item under `point`.
    fn item_index(&self, point: Point) -> Option<usize>;
    /// Returns `true` if the content is scrolled to its end.
    fn is_at_end(&self) -> bool;
    /// Current content offset.
    fn current_offset(&self) -> Vec2;
}

/// A handle that forwards commands to a bound [`ScrollController`].
///
/// The scroller holds the controller weakly. Commands issued while unbound, or
/// after the controller was dropped, are discarded with a warning; queries
/// answer `None`, `false`, or a zero offset.
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use kurbo::{Point, Rect, Vec2};
/// use understory_lazy_window::{ScrollController, ScrollEdge, Scroller};
/// use understory_staggered::ScrollAlign;
///
/// #[derive(Default)]
/// struct Offset(Vec2);
///
/// impl ScrollController for Offset {
///     fn scroll_to(&mut self, offset: Vec2, _: bool) { self.0 = offset; }
///     fn scroll_to_index(&mut self, _: usize, _: bool, _: ScrollAlign, _: Option<f64>) {}
///     fn scroll_edge(&mut self, _: ScrollEdge) {}
///     fn fling(&mut self, _: f64) {}
///     fn scroll_by(&mut self, delta: Vec2) { self.0 += delta; }
///     fn scroll_page(&mut self, _: bool, _: bool) {}
///     fn item_rect(&self, _: usize) -> Option<Rect> { None }
///     fn item_index(&self, _: Point) -> Option<usize> { None }
///     fn is_at_end(&self) -> bool { false }
///     fn current_offset(&self) -> Vec2 { self.0 }
/// }
///
/// let controller = Rc::new(RefCell::new(Offset::default()));
/// let mut scroller = Scroller::new();
/// scroller.bind(&controller);
/// scroller.scroll_by(Vec2::new(0.0, 40.0));
/// assert_eq!(scroller.current_offset(), Vec2::new(0.0, 40.0));
///
/// drop(controller);
/// assert!(!scroller.is_bound());
/// ```
#[derive(Default)]
pub struct Scroller {
    controller: Option<Weak<RefCell<dyn ScrollController>>>,
}

impl fmt::Debug for Scroller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scroller")
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl Scroller {
    /// Creates an unbound scroller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the scroller to `controller`, replacing any previous binding.
    pub fn bind<C: ScrollController + 'static>(&mut self, controller: &Rc<RefCell<C>>) {
        let shared: Rc<RefCell<dyn ScrollController>> = controller.clone();
        self.controller = Some(Rc::downgrade(&shared));
    }

    /// Drops the binding.
    pub fn unbind(&mut self) {
        self.controller = None;
    }

    /// Returns `true` while the bound controller is alive.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(|controller| controller.strong_count() > 0)
    }

    /// Scrolls to an absolute content offset.
    pub fn scroll_to(&self, offset: Vec2, animate: bool) {
        self.with_controller("scroll_to", |c| c.scroll_to(offset, animate));
    }

    /// Scrolls so that item `index` is placed according to `align`.
    pub fn scroll_to_index(
        &self,
        index: usize,
        animate: bool,
        align: ScrollAlign,
        extra_offset: Option<f64>,
    ) {
        self.with_controller("scroll_to_index", |c| {
            c.scroll_to_index(index, animate, align, extra_offset);
        });
    }

    /// Scrolls to one edge of the content.
    pub fn scroll_edge(&self, edge: ScrollEdge) {
        self.with_controller("scroll_edge", |c| c.scroll_edge(edge));
    }

    /// Starts a fling. A zero velocity is ignored.
    pub fn fling(&self, velocity: f64) {
        if velocity == 0.0 {
            log::warn!("ignoring fling with zero velocity");
            return;
        }
        self.with_controller("fling", |c| c.fling(velocity));
    }

    /// Scrolls by a relative delta.
    pub fn scroll_by(&self, delta: Vec2) {
        self.with_controller("scroll_by", |c| c.scroll_by(delta));
    }

    /// Scrolls one viewport forward (`next`) or backward.
    pub fn scroll_page(&self, next: bool, animate: bool) {
        self.with_controller("scroll_page", |c| c.scroll_page(next, animate));
    }

    /// Bounds of a realized item.
    #[must_use]
    pub fn item_rect(&self, index: usize) -> Option<Rect> {
        self.with_controller("item_rect", |c| c.item_rect(index))
            .flatten()
    }

    /// Index of the item under `point`.
    #[must_use]
    pub fn item_index(&self, point: Point) -> Option<usize> {
        self.with_controller("item_index", |c| c.item_index(point))
            .flatten()
    }

    /// Returns `true` if the content is scrolled to its end.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.with_controller("is_at_end", |c| c.is_at_end())
            .unwrap_or(false)
    }

    /// Current content offset, or zero when unbound.
    #[must_use]
    pub fn current_offset(&self) -> Vec2 {
        self.with_controller("current_offset", |c| c.current_offset())
            .unwrap_or(Vec2::ZERO)
    }

    fn with_controller<R>(
        &self,
        op: &str,
        f: impl FnOnce(&mut dyn ScrollController) -> R,
    ) -> Option<R> {
        let Some(controller) = self.controller.as_ref().and_then(Weak::upgrade) else {
            log::warn!("{op} on a scroller without a live controller");
            return None;
        };
        let Ok(mut guard) = controller.try_borrow_mut() else {
            log::warn!("{op} while the scroll controller is busy");
            return None;
        };
        Some(f(&mut *guard))
    }
}
