// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render target ownership, frame lifecycle, and device-loss recovery.
//!
//! A [`RenderEngine`] owns one on-screen target created by a [`Backend`] and
//! hands out independent [`OffscreenTarget`]s on demand.
//!
//! # State machine
//!
//! ```text
//!                 initialize()           create_render_target()
//!  Uninitialized ─────────────► Initialized ─────────────────► TargetBound
//!        ▲                         ▲    ◄──destroy_render_target()─┘ │ ▲
//!        │                         │                   begin_frame() │ │ present()
//!        └──────── shutdown() ─────┴────────────────────────────────▼ │
//!                                                          FrameInProgress
//! ```
//!
//! # Device loss
//!
//! A device is lost when `end_draw` reports [`DrawError::DeviceLost`] or a
//! resize fails. [`present`](RenderEngine::present) then recovers before
//! returning, and [`begin_frame`](RenderEngine::begin_frame) recovers first
//! if a loss is still pending. Recovery notifies every "device lost"
//! subscriber, recreates the device and the on-screen target, and then
//! notifies every "device restored" subscriber, in that order. Subscribers
//! rebuild whatever device resources they cached.

use std::path::Path;
use std::time::{Duration, Instant};

use image::{DynamicImage, RgbaImage};
use thiserror::Error;

use crate::context::{DrawError, RenderContext};

/// Graphics API requested at initialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GraphicsApi {
    /// Hardware-accelerated device.
    #[default]
    Hardware,
    /// CPU rasterizer.
    Software,
    /// Software emulation of the hardware pipeline.
    Warp,
}

/// An opaque native window handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

/// Parameters for the on-screen render target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetDesc {
    /// Window the target presents into.
    pub window: WindowHandle,
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
    /// Dots per inch; 96 is unscaled.
    pub dpi: f32,
}

impl TargetDesc {
    /// An unscaled target for `window`.
    #[must_use]
    pub const fn new(window: WindowHandle, width: u32, height: u32) -> Self {
        Self {
            window,
            width,
            height,
            dpi: 96.0,
        }
    }
}

/// Lifecycle state of a [`RenderEngine`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No device.
    #[default]
    Uninitialized,
    /// Device created, no on-screen target.
    Initialized,
    /// On-screen target bound and idle.
    TargetBound,
    /// Between `begin_frame` and `present`.
    FrameInProgress,
}

/// Outcome of a successful [`RenderEngine::present`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresentStatus {
    /// The frame reached the screen.
    Presented,
    /// The device was lost; the frame was dropped and the device recovered.
    Recovered,
}

/// Cumulative engine counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames that reached the screen.
    pub frames_presented: u64,
    /// Frames discarded because of a failure.
    pub frames_dropped: u64,
    /// Device losses observed.
    pub device_losses: u64,
    /// Successful recoveries.
    pub recoveries: u64,
    /// Wall time between the last `begin_frame` and `present`.
    pub last_frame_time: Duration,
    /// Primitives submitted in the last frame.
    pub draw_calls: usize,
}

/// Handle to a device-loss subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Errors reported by the engine and off-screen targets.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No device; call `initialize` first.
    #[error("render engine is not initialized")]
    NotInitialized,
    /// No on-screen target is bound.
    #[error("no render target is bound")]
    NoTarget,
    /// The operation is not allowed while a frame is open.
    #[error("a frame is already in progress")]
    FrameInProgress,
    /// `present` without `begin_frame`.
    #[error("no frame in progress")]
    NoFrame,
    /// Backend failure other than device loss.
    #[error("backend failure: {0}")]
    Backend(String),
    /// The device was lost.
    #[error("render device lost")]
    DeviceLost,
    /// The device could not be recreated after a loss.
    #[error("device recovery failed: {0}")]
    RecoveryFailed(String),
    /// Encoding a snapshot failed.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    /// File I/O failed.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    /// The surface has zero area or was never drawn.
    #[error("surface is empty")]
    EmptySurface,
}

impl From<DrawError> for EngineError {
    fn from(err: DrawError) -> Self {
        match err {
            DrawError::DeviceLost => Self::DeviceLost,
            DrawError::NotDrawing => Self::NoFrame,
            DrawError::Backend(msg) => Self::Backend(msg),
        }
    }
}

/// Encoded image formats for [`OffscreenTarget::save_to_file`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Portable Network Graphics.
    Png,
    /// JPEG; alpha is discarded.
    Jpeg,
    /// Windows bitmap.
    Bmp,
}

impl ImageFormat {
    /// Chooses a format from a path's extension, case-insensitively:
    /// `.jpg`/`.jpeg` → JPEG, `.bmp` → BMP, anything else → PNG.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("jpg" | "jpeg") => Self::Jpeg,
            Some("bmp") => Self::Bmp,
            _ => Self::Png,
        }
    }

    fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// A drawable surface that is not bound to a window.
pub trait OffscreenTarget: RenderContext {
    /// Snapshot of the surface after a completed `begin_draw`/`end_draw`
    /// pair; `None` before the first completed draw.
    fn to_bitmap(&self) -> Option<RgbaImage>;

    /// Encodes a snapshot to `path`, choosing the format with
    /// [`ImageFormat::from_path`].
    ///
    /// # Errors
    ///
    /// [`EngineError::EmptySurface`] before the first completed draw,
    /// otherwise any encoding or I/O failure.
    fn save_to_file(&self, path: &Path) -> Result<(), EngineError> {
        let image = self.to_bitmap().ok_or(EngineError::EmptySurface)?;
        let format = ImageFormat::from_path(path);
        let image = DynamicImage::ImageRgba8(image);
        match format {
            ImageFormat::Jpeg | ImageFormat::Bmp => image
                .to_rgb8()
                .save_with_format(path, format.to_image_format())?,
            ImageFormat::Png => image.save_with_format(path, format.to_image_format())?,
        }
        tracing::debug!(path = %path.display(), ?format, "saved off-screen target");
        Ok(())
    }
}

/// Device and target factory for a graphics API.
pub trait Backend {
    /// On-screen target type.
    type Context: RenderContext;
    /// Off-screen target type.
    type Offscreen: OffscreenTarget;

    /// Creates the device for `api`.
    ///
    /// # Errors
    ///
    /// Fails when the API is unavailable.
    fn create_device(&mut self, api: GraphicsApi) -> Result<(), EngineError>;

    /// Releases the device and everything created from it.
    fn release_device(&mut self);

    /// Creates the on-screen target.
    ///
    /// # Errors
    ///
    /// Fails without a device or when the window cannot be bound.
    fn create_target(&mut self, desc: &TargetDesc) -> Result<Self::Context, EngineError>;

    /// Resizes the on-screen target.
    ///
    /// # Errors
    ///
    /// Any failure; the engine treats it as device loss.
    fn resize_target(&mut self, target: &mut Self::Context, width: u32, height: u32) -> Result<(), EngineError>;

    /// Creates an off-screen target.
    ///
    /// # Errors
    ///
    /// Fails without a device or for an empty size.
    fn create_offscreen(&mut self, width: u32, height: u32, alpha: bool) -> Result<Self::Offscreen, EngineError>;
}

type Callback = Box<dyn FnMut()>;

/// Owns a backend device, its on-screen target, and the frame lifecycle.
pub struct RenderEngine<B: Backend> {
    backend: B,
    api: Option<GraphicsApi>,
    target: Option<B::Context>,
    desc: Option<TargetDesc>,
    state: EngineState,
    device_lost: bool,
    stats: FrameStats,
    frame_started: Option<Instant>,
    lost_subscribers: Vec<(SubscriptionId, Callback)>,
    restored_subscribers: Vec<(SubscriptionId, Callback)>,
    next_subscription: u64,
    cache_budget: usize,
}

impl<B: Backend> core::fmt::Debug for RenderEngine<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderEngine")
            .field("api", &self.api)
            .field("desc", &self.desc)
            .field("state", &self.state)
            .field("device_lost", &self.device_lost)
            .field("stats", &self.stats)
            .field("lost_subscribers", &self.lost_subscribers.len())
            .field("restored_subscribers", &self.restored_subscribers.len())
            .field("cache_budget", &self.cache_budget)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> RenderEngine<B> {
    /// Creates an uninitialized engine.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            api: None,
            target: None,
            desc: None,
            state: EngineState::Uninitialized,
            device_lost: false,
            stats: FrameStats::default(),
            frame_started: None,
            lost_subscribers: Vec::new(),
            restored_subscribers: Vec::new(),
            next_subscription: 0,
            cache_budget: 0,
        }
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Cumulative counters.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// API of the live device.
    pub fn api(&self) -> Option<GraphicsApi> {
        self.api
    }

    /// Descriptor of the bound target, reflecting the latest resize.
    pub fn target_desc(&self) -> Option<TargetDesc> {
        self.desc
    }

    /// Creates the device. Returns `false`, leaving the engine
    /// uninitialized, if the backend cannot provide `api`.
    ///
    /// Initializing an initialized engine shuts it down first.
    pub fn initialize(&mut self, api: GraphicsApi) -> bool {
        if self.state != EngineState::Uninitialized {
            self.shutdown();
        }
        match self.backend.create_device(api) {
            Ok(()) => {
                self.api = Some(api);
                self.state = EngineState::Initialized;
                tracing::debug!(?api, "render engine initialized");
                true
            }
            Err(err) => {
                self.backend.release_device();
                tracing::warn!(?api, %err, "render engine initialization failed");
                false
            }
        }
    }

    /// Binds the on-screen target, releasing any previous one first.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotInitialized`], [`EngineError::FrameInProgress`], or
    /// a backend failure.
    pub fn create_render_target(&mut self, desc: &TargetDesc) -> Result<(), EngineError> {
        match self.state {
            EngineState::Uninitialized => return Err(EngineError::NotInitialized),
            EngineState::FrameInProgress => return Err(EngineError::FrameInProgress),
            EngineState::Initialized | EngineState::TargetBound => {}
        }
        if self.target.take().is_some() {
            tracing::debug!("releasing previous render target");
            self.state = EngineState::Initialized;
            self.desc = None;
        }
        let target = self.backend.create_target(desc)?;
        self.target = Some(target);
        self.desc = Some(*desc);
        self.state = EngineState::TargetBound;
        tracing::debug!(
            window = desc.window.0,
            width = desc.width,
            height = desc.height,
            "render target created"
        );
        Ok(())
    }

    /// Resizes the on-screen target.
    ///
    /// A backend failure is not returned; it marks the device lost so the
    /// next frame recovers it.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoTarget`] when no target is bound.
    pub fn resize_render_target(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        let Some(target) = self.target.as_mut() else {
            return Err(EngineError::NoTarget);
        };
        if let Some(desc) = self.desc.as_mut() {
            desc.width = width;
            desc.height = height;
        }
        if let Err(err) = self.backend.resize_target(target, width, height) {
            tracing::warn!(%err, width, height, "resize failed, treating as device loss");
            self.mark_device_lost();
        }
        Ok(())
    }

    /// Releases the on-screen target.
    pub fn destroy_render_target(&mut self) {
        if self.target.take().is_some() {
            self.desc = None;
            self.frame_started = None;
            self.state = EngineState::Initialized;
            tracing::debug!("render target destroyed");
        }
    }

    /// Opens a frame on the on-screen target, recovering a lost device
    /// first.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotInitialized`], [`EngineError::NoTarget`],
    /// [`EngineError::FrameInProgress`], or a recovery failure.
    pub fn begin_frame(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Uninitialized => return Err(EngineError::NotInitialized),
            EngineState::FrameInProgress => return Err(EngineError::FrameInProgress),
            EngineState::Initialized | EngineState::TargetBound => {}
        }
        if self.device_lost {
            self.recover_device()?;
        }
        if self.state != EngineState::TargetBound {
            return Err(EngineError::NoTarget);
        }
        let target = self.target.as_mut().ok_or(EngineError::NoTarget)?;
        target.begin_draw();
        self.frame_started = Some(Instant::now());
        self.state = EngineState::FrameInProgress;
        Ok(())
    }

    /// The on-screen target's drawing surface.
    pub fn context(&mut self) -> Option<&mut B::Context> {
        self.target.as_mut()
    }

    /// Closes the frame and presents it.
    ///
    /// A device loss reported by `end_draw` drops the frame and recovers the
    /// device before returning [`PresentStatus::Recovered`].
    ///
    /// # Errors
    ///
    /// [`EngineError::NoFrame`] without an open frame,
    /// [`EngineError::Backend`] for an ordinary backend failure, and
    /// [`EngineError::RecoveryFailed`] when recovery fails.
    pub fn present(&mut self) -> Result<PresentStatus, EngineError> {
        if self.state != EngineState::FrameInProgress {
            return Err(EngineError::NoFrame);
        }
        self.state = EngineState::TargetBound;
        let target = self.target.as_mut().ok_or(EngineError::NoTarget)?;
        let result = target.end_draw();
        self.stats.draw_calls = target.draw_call_count();
        if let Some(start) = self.frame_started.take() {
            self.stats.last_frame_time = start.elapsed();
        }
        match result {
            Ok(()) => {
                self.stats.frames_presented += 1;
                Ok(PresentStatus::Presented)
            }
            Err(DrawError::DeviceLost) => {
                self.stats.frames_dropped += 1;
                self.mark_device_lost();
                self.recover_device()?;
                Ok(PresentStatus::Recovered)
            }
            Err(err) => {
                self.stats.frames_dropped += 1;
                tracing::warn!(%err, "frame dropped");
                Err(err.into())
            }
        }
    }

    /// Whether a device loss is pending recovery.
    pub fn is_device_lost(&self) -> bool {
        self.device_lost
    }

    /// Tears down and recreates the device and on-screen target.
    ///
    /// Fires "device lost" subscribers before teardown and "device restored"
    /// subscribers after the target exists again.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotInitialized`] without a device, or
    /// [`EngineError::RecoveryFailed`] when the backend cannot recreate it.
    /// After a failed recovery the engine stays lost and the next
    /// `begin_frame` tries again.
    pub fn recover_device(&mut self) -> Result<(), EngineError> {
        let Some(api) = self.api else {
            return Err(EngineError::NotInitialized);
        };
        tracing::debug!(?api, "recovering render device");
        for (_, cb) in &mut self.lost_subscribers {
            cb();
        }

        self.target = None;
        self.frame_started = None;
        self.backend.release_device();

        if let Err(err) = self.backend.create_device(api) {
            tracing::warn!(%err, "device recreation failed");
            self.device_lost = true;
            self.state = EngineState::Initialized;
            return Err(EngineError::RecoveryFailed(err.to_string()));
        }
        self.state = EngineState::Initialized;
        if let Some(desc) = self.desc {
            match self.backend.create_target(&desc) {
                Ok(target) => {
                    self.target = Some(target);
                    self.state = EngineState::TargetBound;
                }
                Err(err) => {
                    tracing::warn!(%err, "render target recreation failed");
                    self.device_lost = true;
                    return Err(EngineError::RecoveryFailed(err.to_string()));
                }
            }
        }

        self.device_lost = false;
        self.stats.recoveries += 1;
        for (_, cb) in &mut self.restored_subscribers {
            cb();
        }
        tracing::debug!("render device restored");
        Ok(())
    }

    /// Subscribes to device loss. Runs before device resources are torn
    /// down.
    pub fn on_device_lost(&mut self, f: impl FnMut() + 'static) -> SubscriptionId {
        let id = self.next_subscription_id();
        self.lost_subscribers.push((id, Box::new(f)));
        id
    }

    /// Subscribes to device restoration. Runs after the target is
    /// recreated.
    pub fn on_device_restored(&mut self, f: impl FnMut() + 'static) -> SubscriptionId {
        let id = self.next_subscription_id();
        self.restored_subscribers.push((id, Box::new(f)));
        id
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.lost_subscribers.len() + self.restored_subscribers.len();
        self.lost_subscribers.retain(|(s, _)| *s != id);
        self.restored_subscribers.retain(|(s, _)| *s != id);
        before != self.lost_subscribers.len() + self.restored_subscribers.len()
    }

    /// Creates an independent off-screen target.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotInitialized`] without a device,
    /// [`EngineError::EmptySurface`] for a zero size, or a backend failure.
    pub fn create_offscreen_target(&mut self, width: u32, height: u32, alpha: bool) -> Result<B::Offscreen, EngineError> {
        if self.state == EngineState::Uninitialized {
            return Err(EngineError::NotInitialized);
        }
        self.backend.create_offscreen(width, height, alpha)
    }

    /// Records the resource cache budget in bytes. The budget is not
    /// enforced.
    pub fn set_resource_cache_budget(&mut self, bytes: usize) {
        self.cache_budget = bytes;
    }

    /// The recorded resource cache budget.
    pub fn resource_cache_budget(&self) -> usize {
        self.cache_budget
    }

    /// Releases the target and device from any state.
    pub fn shutdown(&mut self) {
        self.target = None;
        self.desc = None;
        self.frame_started = None;
        if self.api.take().is_some() {
            self.backend.release_device();
        }
        self.device_lost = false;
        self.state = EngineState::Uninitialized;
        tracing::debug!("render engine shut down");
    }

    fn mark_device_lost(&mut self) {
        if !self.device_lost {
            self.device_lost = true;
            self.stats.device_losses += 1;
            tracing::warn!("render device lost");
        }
    }

    fn next_subscription_id(&mut self) -> SubscriptionId {
        self.next_subscription += 1;
        SubscriptionId(self.next_subscription)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use trellis_core::color::Color;

    use super::*;
    use crate::software::{SoftwareBackend, SoftwareConfig};

    fn bound_engine() -> RenderEngine<SoftwareBackend> {
        let mut engine = RenderEngine::new(SoftwareBackend::default());
        assert!(engine.initialize(GraphicsApi::Software));
        engine
            .create_render_target(&TargetDesc::new(WindowHandle(1), 32, 32))
            .expect("target");
        engine
    }

    #[test]
    fn lifecycle_states() {
        let mut engine = RenderEngine::new(SoftwareBackend::default());
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(matches!(
            engine.begin_frame(),
            Err(EngineError::NotInitialized)
        ));

        assert!(engine.initialize(GraphicsApi::Software));
        assert_eq!(engine.state(), EngineState::Initialized);
        assert!(matches!(engine.begin_frame(), Err(EngineError::NoTarget)));

        engine
            .create_render_target(&TargetDesc::new(WindowHandle(7), 10, 10))
            .expect("target");
        assert_eq!(engine.state(), EngineState::TargetBound);

        engine.begin_frame().expect("frame");
        assert_eq!(engine.state(), EngineState::FrameInProgress);
        assert!(matches!(
            engine.begin_frame(),
            Err(EngineError::FrameInProgress)
        ));
        assert_eq!(engine.present().expect("present"), PresentStatus::Presented);
        assert_eq!(engine.state(), EngineState::TargetBound);
        assert!(matches!(engine.present(), Err(EngineError::NoFrame)));

        engine.destroy_render_target();
        assert_eq!(engine.state(), EngineState::Initialized);
        engine.shutdown();
        assert_eq!(engine.state(), EngineState::Uninitialized);
    }

    #[test]
    fn failed_initialize_leaves_nothing_live() {
        let mut engine = RenderEngine::new(SoftwareBackend::new(SoftwareConfig {
            unavailable_api: Some(GraphicsApi::Hardware),
            ..SoftwareConfig::default()
        }));
        assert!(!engine.initialize(GraphicsApi::Hardware));
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert_eq!(engine.backend().device(), None);
        assert!(engine.initialize(GraphicsApi::Warp), "fallback API works");
    }

    #[test]
    fn device_loss_recovers_with_ordered_callbacks() {
        let mut engine = bound_engine();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        engine.on_device_lost(move || l.borrow_mut().push("lost"));
        let l = log.clone();
        engine.on_device_restored(move || l.borrow_mut().push("restored"));

        engine.begin_frame().expect("frame");
        engine.context().expect("target").lose_device();
        assert_eq!(engine.present().expect("present"), PresentStatus::Recovered);

        assert_eq!(*log.borrow(), vec!["lost", "restored"]);
        assert!(!engine.is_device_lost());
        assert_eq!(engine.state(), EngineState::TargetBound);
        let stats = engine.stats();
        assert_eq!(stats.device_losses, 1);
        assert_eq!(stats.recoveries, 1);
        assert_eq!(stats.frames_dropped, 1);

        engine.begin_frame().expect("frame after recovery");
        assert_eq!(engine.present().expect("present"), PresentStatus::Presented);
    }

    #[test]
    fn failed_resize_becomes_device_loss() {
        let mut engine = bound_engine();
        engine.backend_mut().set_config(SoftwareConfig {
            fail_resize: true,
            ..SoftwareConfig::default()
        });
        engine.resize_render_target(64, 48).expect("resize never errors");
        assert!(engine.is_device_lost());

        engine.backend_mut().set_config(SoftwareConfig::default());
        engine.begin_frame().expect("recovers first");
        assert!(!engine.is_device_lost());
        let size = engine.context().expect("target").size();
        assert_eq!((size.width, size.height), (64.0, 48.0), "recreated at the new size");
        engine.present().expect("present");
    }

    #[test]
    fn failed_recovery_is_reported_and_retried() {
        let mut engine = bound_engine();
        engine.begin_frame().expect("frame");
        engine.context().expect("target").lose_device();
        engine.backend_mut().set_config(SoftwareConfig {
            unavailable_api: Some(GraphicsApi::Software),
            ..SoftwareConfig::default()
        });
        assert!(matches!(
            engine.present(),
            Err(EngineError::RecoveryFailed(_))
        ));
        assert!(engine.is_device_lost());

        engine.backend_mut().set_config(SoftwareConfig::default());
        engine.recover_device().expect("retry");
        assert_eq!(engine.state(), EngineState::TargetBound);
    }

    #[test]
    fn unsubscribe_removes_callbacks() {
        let mut engine = bound_engine();
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        let id = engine.on_device_lost(move || *h.borrow_mut() += 1);
        assert!(engine.unsubscribe(id));
        assert!(!engine.unsubscribe(id));
        engine.recover_device().expect("recover");
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn recreating_target_replaces_old_one() {
        let mut engine = bound_engine();
        engine
            .create_render_target(&TargetDesc::new(WindowHandle(2), 8, 8))
            .expect("second target");
        assert_eq!(engine.target_desc().map(|d| d.window), Some(WindowHandle(2)));
        assert_eq!(engine.context().map(|c| c.size().width), Some(8.0));
    }

    #[test]
    fn stats_track_draw_calls() {
        let mut engine = bound_engine();
        engine.begin_frame().expect("frame");
        let ctx = engine.context().expect("target");
        ctx.clear(Color::WHITE);
        let brush = ctx.create_solid_color_brush(Color::RED).expect("brush");
        ctx.fill_rectangle(kurbo::Rect::new(0.0, 0.0, 4.0, 4.0), brush);
        engine.present().expect("present");
        assert_eq!(engine.stats().draw_calls, 2);
        assert_eq!(engine.stats().frames_presented, 1);
    }

    #[test]
    fn image_format_from_extension() {
        assert_eq!(ImageFormat::from_path(Path::new("a.JPG")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("a.jpeg")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("a.Bmp")), ImageFormat::Bmp);
        assert_eq!(ImageFormat::from_path(Path::new("a.png")), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("a.tiff")), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("noext")), ImageFormat::Png);
    }

    #[test]
    fn offscreen_save_round_trip() {
        let mut engine = bound_engine();
        let mut target = engine.create_offscreen_target(4, 4, true).expect("offscreen");
        let path = std::env::temp_dir().join(format!("trellis-offscreen-{}.png", std::process::id()));
        assert!(matches!(
            target.save_to_file(&path),
            Err(EngineError::EmptySurface)
        ));

        target.begin_draw();
        target.clear(Color::GREEN);
        target.end_draw().expect("draw");
        target.save_to_file(&path).expect("save");
        let loaded = image::open(&path).expect("decode").to_rgba8();
        assert_eq!(loaded.get_pixel(1, 1).0, [0, 255, 0, 255]);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(
            engine.create_offscreen_target(0, 4, true),
            Err(EngineError::EmptySurface)
        ));
    }
}
