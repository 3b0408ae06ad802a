// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Item Tree: a generational node tree with sibling navigation.
//!
//! Lazy containers keep their realized items as children of a container node.
//! Windowing code only refers to those nodes through non-owning [`NodeId`]s and
//! walks them by position or by sibling ([`Tree::child_before`],
//! [`Tree::child_after`], [`Tree::last_child`]). Because ids are generational, a
//! removed node is detectable through [`Tree::is_alive`] even after its slot is
//! reused.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod tree;
mod types;

pub use tree::Tree;
pub use types::NodeId;
