// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays control storage with allocation, topology, and property
//! management.

use understory_dirty::{Channel, CycleHandling, DirtyTracker, EagerPolicy};

use trellis_core::dirty;
use trellis_core::geometry::{Rect, Size};

use super::id::{ControlId, INVALID};
use super::props::ControlProps;
use super::traverse::Children;
use crate::widget::{ContentModel, FixedAdvanceMeasurer, Invalidate, TextMeasurer, Widget};

/// Struct-of-arrays storage for a control hierarchy.
///
/// Controls are addressed by [`ControlId`] handles. Each control occupies a
/// slot in parallel arrays; destroyed controls are recycled via a free list
/// and generation counters make stale handles panic instead of aliasing a
/// newer control.
///
/// Ownership flows parent to child: destroying a control destroys its whole
/// subtree. The parent link is a plain index used for walking upwards.
#[derive(Debug)]
pub struct ControlTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Properties and behavior --
    pub(crate) props: Vec<ControlProps>,
    pub(crate) widgets: Vec<Option<Box<dyn Widget>>>,

    // -- Layout results --
    pub(crate) desired: Vec<Size>,
    pub(crate) arranged: Vec<Rect>,
    pub(crate) last_available: Vec<Option<Size>>,
    pub(crate) last_final: Vec<Option<Rect>>,
    pub(crate) needs_measure: Vec<bool>,
    pub(crate) needs_arrange: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    text_measurer: Box<dyn TextMeasurer>,
}

impl Default for ControlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlTree {
    /// Creates an empty tree using fixed-advance text metrics.
    #[must_use]
    pub fn new() -> Self {
        Self::with_text_measurer(FixedAdvanceMeasurer)
    }

    /// Creates an empty tree with custom text metrics.
    #[must_use]
    pub fn with_text_measurer(measurer: impl TextMeasurer + 'static) -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            props: Vec::new(),
            widgets: Vec::new(),
            desired: Vec::new(),
            arranged: Vec::new(),
            last_available: Vec::new(),
            last_final: Vec::new(),
            needs_measure: Vec::new(),
            needs_arrange: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            text_measurer: Box::new(measurer),
        }
    }

    /// The text metrics used during measure.
    #[must_use]
    pub fn text_measurer(&self) -> &dyn TextMeasurer {
        &*self.text_measurer
    }

    // -- Allocation API --

    /// Creates a detached control and returns its handle.
    pub fn create(&mut self, widget: impl Widget) -> ControlId {
        self.create_boxed(Box::new(widget))
    }

    /// Creates a detached control from a boxed widget.
    pub fn create_boxed(&mut self, widget: Box<dyn Widget>) -> ControlId {
        let props = ControlProps {
            focusable: widget.focusable(),
            ..ControlProps::default()
        };
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.props[i] = props;
            self.widgets[i] = Some(widget);
            self.desired[i] = Size::ZERO;
            self.arranged[i] = Rect::ZERO;
            self.last_available[i] = None;
            self.last_final[i] = None;
            self.needs_measure[i] = true;
            self.needs_arrange[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.props.push(props);
            self.widgets.push(Some(widget));
            self.desired.push(Size::ZERO);
            self.arranged.push(Rect::ZERO);
            self.last_available.push(None);
            self.last_final.push(None);
            self.needs_measure.push(true);
            self.needs_arrange.push(true);
            self.generation.push(0);
            idx
        };

        self.dirty.mark(idx, dirty::TOPOLOGY);

        ControlId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a control and its entire subtree.
    ///
    /// Returns the destroyed handles in pre-order so callers can drop any
    /// per-control bookkeeping (event slots, focus, capture).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, id: ControlId) -> Vec<ControlId> {
        self.validate(id);
        if self.parent[id.idx as usize] != INVALID {
            self.detach(id.idx);
        }
        let doomed = self.descendants(id);
        for &dead in &doomed {
            let i = dead.idx as usize;
            self.dirty.remove_key(dead.idx);
            self.widgets[i] = None;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.generation[i] += 1;
            self.free_list.push(dead.idx);
        }
        tracing::trace!(?id, count = doomed.len(), "destroyed subtree");
        doomed
    }

    /// Returns whether the given handle refers to a live control.
    #[must_use]
    pub fn is_alive(&self, id: ControlId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Number of live controls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns `true` if no controls are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- Topology API --

    /// Appends `child` to `parent`'s children.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, or
    /// if `parent`'s widget cannot take another child.
    pub fn add_child(&mut self, parent: ControlId, child: ControlId) {
        let index = self.child_count(parent);
        self.insert_child(parent, index, child);
    }

    /// Inserts `child` at position `index` among `parent`'s children.
    /// An index past the end appends.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, if
    /// `child` is `parent` or one of its ancestors, or if `parent`'s widget
    /// cannot take another child.
    pub fn insert_child(&mut self, parent: ControlId, index: usize, child: ControlId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
        assert!(
            !self.is_in_subtree(parent, child),
            "cannot add a control to its own subtree"
        );
        self.check_capacity(parent);
        self.link(parent.idx, index, child.idx);
    }

    /// Detaches `child` from its parent without destroying it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the control has no parent.
    pub fn remove_child(&mut self, child: ControlId) {
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] != INVALID,
            "control has no parent"
        );
        self.detach(child.idx);
    }

    /// Moves `child` to the end of `new_parent`'s children, detaching it from
    /// its current parent first.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `new_parent` lies in `child`'s
    /// subtree, or if `new_parent` cannot take another child.
    pub fn reparent(&mut self, child: ControlId, new_parent: ControlId) {
        self.validate(child);
        self.validate(new_parent);
        assert!(
            !self.is_in_subtree(new_parent, child),
            "cannot add a control to its own subtree"
        );
        if self.parent[child.idx as usize] == new_parent.idx {
            return;
        }
        self.check_capacity(new_parent);
        if self.parent[child.idx as usize] != INVALID {
            self.detach(child.idx);
        }
        let index = self.child_count(new_parent);
        self.link(new_parent.idx, index, child.idx);
    }

    /// Returns the parent of a control, if any.
    #[must_use]
    pub fn parent(&self, id: ControlId) -> Option<ControlId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a control.
    #[must_use]
    pub fn children(&self, id: ControlId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(&self, id: ControlId) -> usize {
        self.children(id).count()
    }

    // -- Properties --

    /// The control's base properties.
    #[must_use]
    pub fn props(&self, id: ControlId) -> &ControlProps {
        self.validate(id);
        &self.props[id.idx as usize]
    }

    /// Edits the control's base properties and invalidates whatever the edit
    /// affects.
    pub fn update_props(&mut self, id: ControlId, f: impl FnOnce(&mut ControlProps)) {
        self.validate(id);
        let i = id.idx as usize;
        let before = self.props[i].clone();
        f(&mut self.props[i]);
        let after = &self.props[i];
        if before.layout_differs(after) {
            self.invalidate(id, Invalidate::Measure);
        } else if before != *after {
            self.invalidate(id, Invalidate::Visual);
        }
    }

    /// The control's widget.
    #[must_use]
    pub fn widget_dyn(&self, id: ControlId) -> &dyn Widget {
        self.validate(id);
        self.widgets[id.idx as usize]
            .as_deref()
            .unwrap_or_else(|| panic!("widget of {id:?} is in use"))
    }

    /// The control's widget as a concrete type.
    #[must_use]
    pub fn widget<W: Widget>(&self, id: ControlId) -> Option<&W> {
        self.widget_dyn(id).downcast_ref()
    }

    /// Mutable access to the control's widget as a concrete type.
    ///
    /// The control is invalidated for re-measure, since the tree cannot see
    /// what the caller changes.
    pub fn widget_mut<W: Widget>(&mut self, id: ControlId) -> Option<&mut W> {
        self.validate(id);
        let is_w = self.widget::<W>(id).is_some();
        if is_w {
            self.invalidate(id, Invalidate::Measure);
        }
        self.widgets[id.idx as usize]
            .as_deref_mut()
            .and_then(|w| w.downcast_mut())
    }

    /// The widget's element name.
    #[must_use]
    pub fn type_name(&self, id: ControlId) -> &'static str {
        self.widget_dyn(id).type_name()
    }

    // -- Invalidation --

    /// Marks a control (and, for layout work, its ancestors) dirty.
    pub fn invalidate(&mut self, id: ControlId, what: Invalidate) {
        self.validate(id);
        let idx = id.idx;
        if what >= Invalidate::Measure {
            self.dirty.mark_with(idx, dirty::MEASURE, &EagerPolicy);
        }
        if what >= Invalidate::Arrange {
            self.dirty.mark_with(idx, dirty::ARRANGE, &EagerPolicy);
        }
        self.dirty.mark(idx, dirty::VISUAL);
    }

    /// Shorthand for [`invalidate`](Self::invalidate) with
    /// [`Invalidate::Measure`].
    pub fn invalidate_measure(&mut self, id: ControlId) {
        self.invalidate(id, Invalidate::Measure);
    }

    /// Shorthand for [`invalidate`](Self::invalidate) with
    /// [`Invalidate::Arrange`].
    pub fn invalidate_arrange(&mut self, id: ControlId) {
        self.invalidate(id, Invalidate::Arrange);
    }

    /// Shorthand for [`invalidate`](Self::invalidate) with
    /// [`Invalidate::Visual`].
    pub fn invalidate_visual(&mut self, id: ControlId) {
        self.invalidate(id, Invalidate::Visual);
    }

    /// Whether the cached desired size is current.
    pub fn is_measure_valid(&mut self, id: ControlId) -> bool {
        self.validate(id);
        self.sync_dirty();
        !self.needs_measure[id.idx as usize]
    }

    /// Whether the arranged rect is current.
    pub fn is_arrange_valid(&mut self, id: ControlId) -> bool {
        self.validate(id);
        self.sync_dirty();
        !self.needs_arrange[id.idx as usize]
    }

    /// Drains the pending layout channels into the per-control flags.
    pub(crate) fn sync_dirty(&mut self) {
        for idx in self.drain(dirty::MEASURE) {
            self.needs_measure[idx as usize] = true;
        }
        for idx in self.drain(dirty::ARRANGE) {
            self.needs_arrange[idx as usize] = true;
        }
    }

    /// Drains the repaint and topology channels, returning the live controls
    /// that changed since the last call.
    pub fn take_visual_changes(&mut self) -> Vec<ControlId> {
        let mut changed = self.drain(dirty::VISUAL);
        changed.extend(self.drain(dirty::TOPOLOGY));
        changed.sort_unstable();
        changed.dedup();
        changed
            .into_iter()
            .filter(|&idx| !self.free_list.contains(&idx))
            .map(|idx| self.id_at(idx))
            .collect()
    }

    fn drain(&mut self, channel: Channel) -> Vec<u32> {
        let len = self.len;
        self.dirty
            .drain(channel)
            .affected()
            .deterministic()
            .run()
            .filter(|&idx| idx < len)
            .collect()
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: ControlId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale ControlId: {id:?} (current gen: {})",
            self.generation.get(id.idx as usize).copied().unwrap_or(0)
        );
    }

    pub(crate) fn id_at(&self, idx: u32) -> ControlId {
        ControlId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    fn check_capacity(&self, parent: ControlId) {
        let count = self.child_count(parent);
        match self.widget_dyn(parent).content_model() {
            ContentModel::Leaf => panic!("{} cannot have children", self.type_name(parent)),
            ContentModel::Single => assert!(
                count == 0,
                "{} already has content",
                self.type_name(parent)
            ),
            ContentModel::Many => {}
        }
    }

    fn link(&mut self, p: u32, index: usize, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        // Find the sibling that `c` goes after, if any.
        let mut prev = INVALID;
        let mut next = self.first_child[p as usize];
        let mut i = 0;
        while next != INVALID && i < index {
            prev = next;
            next = self.next_sibling[next as usize];
            i += 1;
        }

        self.prev_sibling[c as usize] = prev;
        self.next_sibling[c as usize] = next;
        if prev == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[prev as usize] = c;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = c;
        }

        // A parent's layout depends on its children.
        let _ = self.dirty.add_dependency(p, c, dirty::MEASURE);
        let _ = self.dirty.add_dependency(p, c, dirty::ARRANGE);

        self.mark_layout(c);
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Unlinks a control from its parent's child list.
    fn detach(&mut self, c: u32) {
        let p = self.parent[c as usize];
        let prev = self.prev_sibling[c as usize];
        let next = self.next_sibling[c as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[c as usize] = INVALID;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        self.dirty.remove_dependency(p, c, dirty::MEASURE);
        self.dirty.remove_dependency(p, c, dirty::ARRANGE);

        self.mark_layout(p);
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    fn mark_layout(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::MEASURE, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::ARRANGE, &EagerPolicy);
    }

    /// Temporarily removes a control's widget so that its hooks can borrow
    /// the tree mutably.
    pub(crate) fn take_widget(&mut self, id: ControlId) -> Option<Box<dyn Widget>> {
        self.widgets[id.idx as usize].take()
    }

    pub(crate) fn restore_widget(&mut self, id: ControlId, widget: Box<dyn Widget>) {
        self.widgets[id.idx as usize] = Some(widget);
    }
}
