// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identifiers.

/// Identifier for a node in the tree (generational).
///
/// Removing a node frees its slot; a later insert may reuse the slot with a
/// higher generation, so an old `NodeId` never aliases the new node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Slot generation of this identifier.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.1
    }
}
