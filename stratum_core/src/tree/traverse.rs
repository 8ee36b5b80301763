// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use super::id::{INVALID, NodeId};
use super::store::Tree;

/// An iterator over the direct children of a node, in child order.
///
/// Created by [`Canvas::children`](crate::canvas::Canvas::children).
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a Tree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a Tree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

impl Tree {
    /// Slot indices of the direct children of `idx`, in child order.
    pub(crate) fn child_indices(&self, idx: u32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut c = self.first_child[idx as usize];
        while c != INVALID {
            out.push(c);
            c = self.next_sibling[c as usize];
        }
        out
    }

    /// Pre-order slot indices of the subtree rooted at `idx`.
    pub(crate) fn subtree(&self, idx: u32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack = alloc::vec![idx];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.child_indices(n).into_iter().rev());
        }
        out
    }

    /// Returns `true` if `ancestor` is `idx` or one of its ancestors.
    pub(crate) fn is_ancestor_or_self(&self, ancestor: u32, idx: u32) -> bool {
        let mut n = idx;
        while n != INVALID {
            if n == ancestor {
                return true;
            }
            n = self.parent[n as usize];
        }
        false
    }
}
