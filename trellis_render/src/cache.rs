// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoization of brushes and text formats by semantic identity.
//!
//! Solid brushes are keyed by [`Color::to_argb_u32`], so colors that quantize
//! to the same 8-bit channels share one brush. Text formats are keyed by the
//! exact `(family, size)` pair; sizes are compared bit for bit.
//!
//! Entries are only ever dropped wholesale. There is no eviction and no
//! byte budget. Handles returned by the cache belong to the context they
//! were created on and become meaningless after a clear or a device loss;
//! subscribe [`ResourceCache::clear_all`] to the engine's device-lost
//! notification so the next frame rebuilds them.

use rustc_hash::FxHashMap;
use trellis_core::color::Color;

use crate::context::{RenderContext, TextFormatDesc};
use crate::resource::{Brush, TextFormat};

/// Brush and text-format cache.
#[derive(Debug, Default)]
pub struct ResourceCache {
    brushes: FxHashMap<u32, Brush>,
    text_formats: FxHashMap<String, FxHashMap<u32, TextFormat>>,
}

impl ResourceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached brush for `color`, creating it on a miss.
    ///
    /// Returns `None` if the context fails to create the brush; nothing is
    /// cached in that case, so the next call retries.
    pub fn solid_color_brush(&mut self, ctx: &mut dyn RenderContext, color: Color) -> Option<Brush> {
        let key = color.to_argb_u32();
        if let Some(brush) = self.brushes.get(&key) {
            return Some(*brush);
        }
        let Some(brush) = ctx.create_solid_color_brush(color) else {
            tracing::warn!(color = %color.to_hex(), "solid brush creation failed");
            return None;
        };
        self.brushes.insert(key, brush);
        Some(brush)
    }

    /// Returns the cached text format for `(family, size)`, creating a
    /// regular-weight format on a miss.
    pub fn text_format(&mut self, ctx: &mut dyn RenderContext, family: &str, size: f32) -> Option<TextFormat> {
        let bits = size.to_bits();
        if let Some(format) = self.text_formats.get(family).and_then(|m| m.get(&bits)) {
            return Some(*format);
        }
        let Some(format) = ctx.create_text_format(&TextFormatDesc::new(family, size)) else {
            tracing::warn!(family, size, "text format creation failed");
            return None;
        };
        self.text_formats
            .entry(family.to_owned())
            .or_default()
            .insert(bits, format);
        Some(format)
    }

    /// Drops every cached brush.
    pub fn clear_brushes(&mut self) {
        self.brushes.clear();
    }

    /// Drops every cached text format.
    pub fn clear_text_formats(&mut self) {
        self.text_formats.clear();
    }

    /// Drops everything.
    pub fn clear_all(&mut self) {
        self.clear_brushes();
        self.clear_text_formats();
    }

    /// Number of cached brushes.
    #[must_use]
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    /// Number of cached text formats.
    #[must_use]
    pub fn text_format_count(&self) -> usize {
        self.text_formats.values().map(FxHashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::engine::{GraphicsApi, RenderEngine, TargetDesc, WindowHandle};
    use crate::software::{SoftwareBackend, SoftwareConfig, SoftwareContext};

    #[test]
    fn same_color_returns_same_brush() {
        let mut ctx = SoftwareContext::new(4, 4);
        let mut cache = ResourceCache::new();
        let a = cache.solid_color_brush(&mut ctx, Color::new(1.0, 0.0, 0.0, 1.0));
        let b = cache.solid_color_brush(&mut ctx, Color::new(1.0, 0.0, 0.0, 1.0));
        assert!(a.is_some());
        assert_eq!(a, b);
        assert_eq!(cache.brush_count(), 1);
    }

    #[test]
    fn different_color_returns_different_brush() {
        let mut ctx = SoftwareContext::new(4, 4);
        let mut cache = ResourceCache::new();
        let red = cache.solid_color_brush(&mut ctx, Color::RED);
        let dark_red = cache.solid_color_brush(&mut ctx, Color::new(0.8, 0.0, 0.0, 1.0));
        let nearly_red = cache.solid_color_brush(&mut ctx, Color::new(0.9999, 0.0, 0.0, 1.0));
        assert_ne!(red, dark_red);
        assert_eq!(red, nearly_red, "quantizes to the same key");
    }

    #[test]
    fn text_formats_key_on_exact_size() {
        let mut ctx = SoftwareContext::new(4, 4);
        let mut cache = ResourceCache::new();
        let a = cache.text_format(&mut ctx, "Segoe UI", 12.0);
        let b = cache.text_format(&mut ctx, "Segoe UI", 12.0);
        let c = cache.text_format(&mut ctx, "Segoe UI", 12.01);
        let d = cache.text_format(&mut ctx, "Consolas", 12.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(cache.text_format_count(), 3);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut ctx = SoftwareContext::new(4, 4);
        ctx.set_config(SoftwareConfig {
            fail_resources: true,
            ..SoftwareConfig::default()
        });
        let mut cache = ResourceCache::new();
        assert!(cache.solid_color_brush(&mut ctx, Color::RED).is_none());
        assert_eq!(cache.brush_count(), 0);

        ctx.set_config(SoftwareConfig::default());
        assert!(cache.solid_color_brush(&mut ctx, Color::RED).is_some());
    }

    #[test]
    fn clears_are_wholesale() {
        let mut ctx = SoftwareContext::new(4, 4);
        let mut cache = ResourceCache::new();
        let before = cache.solid_color_brush(&mut ctx, Color::RED);
        cache.text_format(&mut ctx, "Segoe UI", 9.0);
        cache.clear_brushes();
        assert_eq!(cache.brush_count(), 0);
        assert_eq!(cache.text_format_count(), 1);
        let after = cache.solid_color_brush(&mut ctx, Color::RED);
        assert_ne!(before, after, "recreated after clear");
        cache.clear_all();
        assert_eq!(cache.text_format_count(), 0);
    }

    #[test]
    fn device_loss_subscription_clears_cache() {
        let mut engine = RenderEngine::new(SoftwareBackend::default());
        assert!(engine.initialize(GraphicsApi::Software));
        engine
            .create_render_target(&TargetDesc::new(WindowHandle(1), 8, 8))
            .expect("target");
        let cache = Rc::new(RefCell::new(ResourceCache::new()));
        let c = cache.clone();
        engine.on_device_lost(move || c.borrow_mut().clear_all());

        let ctx = engine.context().expect("target");
        assert!(cache.borrow_mut().solid_color_brush(ctx, Color::RED).is_some());
        engine.recover_device().expect("recover");
        assert_eq!(cache.borrow().brush_count(), 0);
    }
}
