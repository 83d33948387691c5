// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{ControlId, INVALID};
use super::store::ControlTree;

/// An iterator over the direct children of a control, in insertion order.
///
/// Created by [`ControlTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a ControlTree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a ControlTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = ControlId;

    fn next(&mut self) -> Option<ControlId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

impl ControlTree {
    /// Pre-order (paint order) list of `root` and its descendants.
    #[must_use]
    pub fn descendants(&self, root: ControlId) -> Vec<ControlId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let first = stack.len();
            stack.extend(self.children(id));
            stack[first..].reverse();
        }
        out
    }

    /// Ancestors of `id` starting with its parent.
    #[must_use]
    pub fn ancestors(&self, id: ControlId) -> Vec<ControlId> {
        let mut out = Vec::new();
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            out.push(p);
            cur = self.parent(p);
        }
        out
    }

    /// Whether `id` is `ancestor` or lies in its subtree.
    #[must_use]
    pub fn is_in_subtree(&self, id: ControlId, ancestor: ControlId) -> bool {
        id == ancestor || self.ancestors(id).contains(&ancestor)
    }

    /// First control named `name` in the subtree of `root`, in paint order.
    #[must_use]
    pub fn find_by_name(&self, root: ControlId, name: &str) -> Option<ControlId> {
        self.descendants(root)
            .into_iter()
            .find(|&id| self.props(id).name == name)
    }
}
