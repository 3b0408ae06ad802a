// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Lazy Window: decides which items of a lazy container exist.
//!
//! A lazy container only realizes the items that fit its viewport. This crate
//! runs that decision loop on top of a [`FillAlgorithm`] from
//! `understory_staggered`:
//!
//! - [`ScrollWindowAdapter`]: tracks the pivot item, maps item indices to the
//!   container's nodes, feeds new nodes to the fill algorithm, and schedules
//!   recomposition when scrolling or resizing reveals room.
//! - [`ItemContainer`] / [`ScrollablePattern`]: what the adapter needs from the
//!   container node and its scrollable behavior. [`TreeContainer`] implements
//!   them over an `understory_item_tree` tree.
//! - [`Scroller`]: imperative scrolling commands forwarded to a
//!   [`ScrollController`].
//!
//! The adapter never owns nodes. Nodes may disappear between passes; stale
//! mappings are dropped when they are found.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Size;
//! use understory_item_tree::Tree;
//! use understory_lazy_window::{ScrollWindowAdapter, TreeContainer};
//! use understory_staggered::{
//!     Axis, FillAlgorithm, FillDirection, StaggeredFillAlgorithm, StaggeredLayoutProps,
//! };
//!
//! let mut tree = Tree::new();
//! let list = tree.insert(None, Size::ZERO);
//!
//! // Two columns of 20px rows in a 200x50 viewport.
//! let mut adapter = ScrollWindowAdapter::new(StaggeredFillAlgorithm::new(
//!     StaggeredLayoutProps::with_lanes(2, 0.0, 0.0),
//! ));
//! adapter.set_total_count(100);
//! adapter.update_viewport(Size::new(200.0, 50.0), Axis::Vertical);
//! adapter.prepare(&mut TreeContainer::new(&mut tree, list), 0);
//!
//! // The host creates the pivot node, then one node per request.
//! tree.insert(Some(list), Size::new(100.0, 20.0));
//! let mut edge =
//!     adapter.need_more_elements(&mut TreeContainer::new(&mut tree, list), None, FillDirection::End);
//! while let Some(node) = edge {
//!     tree.insert(Some(list), Size::new(100.0, 20.0));
//!     let mut container = TreeContainer::new(&mut tree, list);
//!     edge = adapter.need_more_elements(&mut container, Some(node), FillDirection::End);
//! }
//!
//! // Three rows per column reach past the viewport's end.
//! assert_eq!(adapter.fill().range(), Some((0, 5)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.
//!
//! [`FillAlgorithm`]: understory_staggered::FillAlgorithm

#![no_std]

extern crate alloc;

mod adapter;
mod container;
mod scroller;

pub use adapter::{JumpIndex, PendingJump, ScrollWindowAdapter, Updater};
pub use container::{ItemContainer, ScrollablePattern, TreeContainer};
pub use scroller::{ScrollController, ScrollEdge, Scroller};
