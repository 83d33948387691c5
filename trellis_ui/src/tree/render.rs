// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Painting and hit testing.

use trellis_core::geometry::{Affine, Point};
use trellis_render::cache::ResourceCache;
use trellis_render::context::RenderContext;

use super::id::ControlId;
use super::props::Visibility;
use super::store::ControlTree;
use crate::widget::RenderCx;

impl ControlTree {
    /// Paints `root` and its subtree, parent before children.
    ///
    /// Each control is drawn with the context translated to its arranged
    /// origin. Group opacity below one becomes a layer and `clip_to_bounds`
    /// becomes a rectangle clip; both are popped before returning, so the
    /// context's stack depths are unchanged.
    pub fn render(&self, root: ControlId, ctx: &mut dyn RenderContext, cache: &mut ResourceCache) {
        self.validate(root);
        self.render_node(root, Point::ORIGIN, ctx, cache);
    }

    fn render_node(
        &self,
        id: ControlId,
        parent_origin: Point,
        ctx: &mut dyn RenderContext,
        cache: &mut ResourceCache,
    ) {
        let i = id.idx as usize;
        let props = &self.props[i];
        if props.visibility != Visibility::Visible || props.opacity <= 0.0 {
            return;
        }
        let rect = self.arranged[i];

        ctx.push_state();
        ctx.multiply_transform(Affine::translate(rect.origin() - parent_origin));
        let layered = props.opacity < 1.0;
        if layered {
            ctx.push_layer(props.opacity);
        }
        if props.clip_to_bounds {
            ctx.push_clip_rect(rect.size().to_rect());
        }

        if let Some(widget) = self.widgets[i].as_deref() {
            let mut cx = RenderCx {
                ctx: &mut *ctx,
                cache: &mut *cache,
                props,
                size: rect.size(),
            };
            widget.render(&mut cx);
        }
        for child in self.children(id) {
            self.render_node(child, rect.origin(), ctx, cache);
        }

        if props.clip_to_bounds {
            ctx.pop_clip();
        }
        if layered {
            ctx.pop_layer();
        }
        ctx.pop_state();
    }

    /// Returns the deepest hit-testable control under `point`, or `None`.
    ///
    /// Later siblings are painted on top, so they are tested first. Hidden
    /// and collapsed subtrees never hit. A control with `hit_test_visible`
    /// unset is transparent, but its children can still be hit. Children
    /// outside their parent's rect are reachable unless the parent clips.
    #[must_use]
    pub fn hit_test(&self, root: ControlId, point: Point) -> Option<ControlId> {
        self.validate(root);
        self.hit_node(root, point)
    }

    fn hit_node(&self, id: ControlId, point: Point) -> Option<ControlId> {
        let i = id.idx as usize;
        let props = &self.props[i];
        if props.visibility != Visibility::Visible {
            return None;
        }
        let rect = self.arranged[i];
        let inside = rect.contains(point);
        if props.clip_to_bounds && !inside {
            return None;
        }
        let children: Vec<ControlId> = self.children(id).collect();
        if let Some(hit) = children
            .into_iter()
            .rev()
            .find_map(|child| self.hit_node(child, point))
        {
            return Some(hit);
        }
        (inside && props.hit_test_visible).then_some(id)
    }

    /// Converts a window point into `id`'s local coordinates.
    #[must_use]
    pub fn to_local(&self, id: ControlId, point: Point) -> Point {
        point - self.arranged_rect(id).origin().to_vec2()
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::color::Color;
    use trellis_core::geometry::{Rect, Size};
    use trellis_render::software::{DrawKind, SoftwareContext};

    use super::*;
    use crate::panels::{Canvas, StackPanel};
    use crate::widgets::Rectangle;

    fn filled(tree: &mut ControlTree, color: Color, w: f64, h: f64) -> ControlId {
        let id = tree.create(Rectangle::filled(color));
        tree.update_props(id, |p| {
            p.width = Some(w);
            p.height = Some(h);
        });
        id
    }

    #[test]
    fn later_sibling_wins_overlap() {
        let mut tree = ControlTree::new();
        let canvas = tree.create(Canvas::new());
        let a = filled(&mut tree, Color::RED, 50.0, 50.0);
        let b = filled(&mut tree, Color::BLUE, 50.0, 50.0);
        tree.add_child(canvas, a);
        tree.add_child(canvas, b);
        tree.update_props(b, |p| {
            p.canvas_left = Some(25.0);
            p.canvas_top = Some(25.0);
        });
        tree.update_layout(canvas, Size::new(200.0, 200.0));

        assert_eq!(tree.hit_test(canvas, Point::new(30.0, 30.0)), Some(b));
        assert_eq!(tree.hit_test(canvas, Point::new(10.0, 10.0)), Some(a));
        assert_eq!(tree.hit_test(canvas, Point::new(150.0, 150.0)), Some(canvas));
    }

    #[test]
    fn transparent_and_hidden_controls_do_not_hit() {
        let mut tree = ControlTree::new();
        let canvas = tree.create(Canvas::new());
        let a = filled(&mut tree, Color::RED, 50.0, 50.0);
        let b = filled(&mut tree, Color::BLUE, 50.0, 50.0);
        tree.add_child(canvas, a);
        tree.add_child(canvas, b);
        tree.update_props(b, |p| p.hit_test_visible = false);
        tree.update_layout(canvas, Size::new(100.0, 100.0));
        assert_eq!(tree.hit_test(canvas, Point::new(10.0, 10.0)), Some(a));

        tree.update_props(a, |p| p.visibility = Visibility::Hidden);
        assert_eq!(tree.hit_test(canvas, Point::new(10.0, 10.0)), Some(canvas));
    }

    #[test]
    fn render_translates_children_and_balances_stacks() {
        let mut tree = ControlTree::new();
        let stack = tree.create(StackPanel::vertical());
        let a = filled(&mut tree, Color::RED, 20.0, 10.0);
        let b = filled(&mut tree, Color::BLUE, 20.0, 10.0);
        tree.add_child(stack, a);
        tree.add_child(stack, b);
        tree.update_props(b, |p| {
            p.opacity = 0.5;
        });
        tree.update_props(stack, |p| p.clip_to_bounds = true);
        tree.update_layout(stack, Size::new(20.0, 40.0));

        let mut ctx = SoftwareContext::new(20, 40);
        let mut cache = ResourceCache::new();
        ctx.begin_draw();
        tree.render(stack, &mut ctx, &mut cache);
        assert_eq!(ctx.state_depth(), 0);
        assert_eq!(ctx.clip_depth(), 0);
        assert_eq!(ctx.layer_depth(), 0);
        assert!(ctx.end_draw().is_ok());

        let rects: Vec<Rect> = ctx
            .commands()
            .iter()
            .filter(|c| c.kind == DrawKind::Rectangle)
            .map(|c| c.bounds)
            .collect();
        assert_eq!(
            rects,
            vec![
                Rect::new(0.0, 0.0, 20.0, 10.0),
                Rect::new(0.0, 10.0, 20.0, 20.0)
            ]
        );
    }

    #[test]
    fn arrange_then_render_is_deterministic() {
        let build = || {
            let mut tree = ControlTree::new();
            let stack = tree.create(StackPanel::vertical().with_spacing(4.0));
            for c in [Color::RED, Color::GREEN, Color::BLUE] {
                let r = filled(&mut tree, c, 30.0, 15.0);
                tree.add_child(stack, r);
            }
            (tree, stack)
        };
        let run = |tree: &mut ControlTree, stack: ControlId| {
            tree.arrange(stack, Rect::new(0.0, 0.0, 64.0, 64.0));
            let mut ctx = SoftwareContext::new(64, 64);
            let mut cache = ResourceCache::new();
            ctx.begin_draw();
            tree.render(stack, &mut ctx, &mut cache);
            let _ = ctx.end_draw();
            ctx.take_commands()
        };

        let (mut t1, s1) = build();
        t1.measure(s1, Size::new(64.0, 64.0));
        let first = run(&mut t1, s1);
        let second = run(&mut t1, s1);
        assert_eq!(first, second);

        let (mut t2, s2) = build();
        t2.measure(s2, Size::new(64.0, 64.0));
        assert_eq!(first, run(&mut t2, s2), "fresh tree, same result");
    }
}
