// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An owning collection of animations advanced together.
//!
//! A [`Timeline`] stores animations of any [`Animatable`] type behind
//! generational [`AnimationId`] handles. Each [`update`](Timeline::update)
//! scales the delta by the timeline's time scale, advances every animation,
//! and removes the ones that completed during that update. Handles to
//! removed animations simply stop resolving.

use core::any::Any;
use core::fmt;

use crate::animation::{Animatable, Animation, AnimationConfig, AnimationState};

/// A handle to an animation owned by a [`Timeline`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId {
    idx: u32,
    generation: u32,
}

impl fmt::Debug for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnimationId({}@gen{})", self.idx, self.generation)
    }
}

/// Type-erased access to an [`Animation`].
trait Playback {
    fn update(&mut self, delta_ms: f64);
    fn state(&self) -> AnimationState;
    fn play(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Animatable> Playback for Animation<T> {
    fn update(&mut self, delta_ms: f64) {
        Self::update(self, delta_ms);
    }
    fn state(&self) -> AnimationState {
        Self::state(self)
    }
    fn play(&mut self) {
        Self::play(self);
    }
    fn pause(&mut self) {
        Self::pause(self);
    }
    fn resume(&mut self) {
        Self::resume(self);
    }
    fn stop(&mut self) {
        Self::stop(self);
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A set of animations sharing a clock.
pub struct Timeline {
    slots: Vec<Option<Box<dyn Playback>>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    time_scale: f64,
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("len", &self.len())
            .field("time_scale", &self.time_scale)
            .finish_non_exhaustive()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    /// Creates an empty timeline running at normal speed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            time_scale: 1.0,
        }
    }

    /// Creates an idle animation owned by this timeline.
    pub fn animate<T: Animatable>(&mut self, from: T, to: T, config: AnimationConfig) -> AnimationId {
        self.insert(Animation::new(from, to, config))
    }

    /// Takes ownership of an existing animation.
    pub fn insert<T: Animatable>(&mut self, animation: Animation<T>) -> AnimationId {
        let boxed: Box<dyn Playback> = Box::new(animation);
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(boxed);
            AnimationId {
                idx,
                generation: self.generation[idx as usize],
            }
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Some(boxed));
            self.generation.push(0);
            AnimationId { idx, generation: 0 }
        }
    }

    /// Whether `id` still refers to an owned animation.
    #[must_use]
    pub fn contains(&self, id: AnimationId) -> bool {
        self.slot(id).is_some()
    }

    /// Number of owned animations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Returns `true` if the timeline owns no animations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows an animation with its concrete value type.
    ///
    /// Returns `None` if the handle is stale or `T` does not match.
    #[must_use]
    pub fn get<T: Animatable>(&self, id: AnimationId) -> Option<&Animation<T>> {
        self.slot(id)?.as_any().downcast_ref()
    }

    /// Mutably borrows an animation with its concrete value type.
    pub fn get_mut<T: Animatable>(&mut self, id: AnimationId) -> Option<&mut Animation<T>> {
        self.slot_mut(id)?.as_any_mut().downcast_mut()
    }

    /// Lifecycle state of an animation, or `None` for a stale handle.
    #[must_use]
    pub fn state(&self, id: AnimationId) -> Option<AnimationState> {
        self.slot(id).map(|a| a.state())
    }

    /// Starts or resumes an animation. Returns `false` for a stale handle.
    pub fn play(&mut self, id: AnimationId) -> bool {
        self.with_slot(id, |a| a.play())
    }

    /// Pauses an animation. Returns `false` for a stale handle.
    pub fn pause(&mut self, id: AnimationId) -> bool {
        self.with_slot(id, |a| a.pause())
    }

    /// Resumes an animation. Returns `false` for a stale handle.
    pub fn resume(&mut self, id: AnimationId) -> bool {
        self.with_slot(id, |a| a.resume())
    }

    /// Stops an animation without removing it. Returns `false` for a stale
    /// handle.
    pub fn stop(&mut self, id: AnimationId) -> bool {
        self.with_slot(id, |a| a.stop())
    }

    /// Removes an animation. Returns `false` for a stale handle.
    pub fn remove(&mut self, id: AnimationId) -> bool {
        if self.slot(id).is_none() {
            return false;
        }
        self.release(id.idx);
        true
    }

    /// Pauses every playing animation.
    pub fn pause_all(&mut self) {
        self.slots.iter_mut().flatten().for_each(|a| a.pause());
    }

    /// Resumes every paused animation.
    pub fn resume_all(&mut self) {
        self.slots.iter_mut().flatten().for_each(|a| a.resume());
    }

    /// Stops every animation.
    pub fn stop_all(&mut self) {
        self.slots.iter_mut().flatten().for_each(|a| a.stop());
    }

    /// Current time scale.
    #[must_use]
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Sets the multiplier applied to every update delta.
    ///
    /// Negative and NaN values are treated as `0.0`.
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = if scale.is_nan() { 0.0 } else { scale.max(0.0) };
    }

    /// Advances every animation by `delta_ms × time_scale` and removes the
    /// ones that completed. Returns the number removed.
    pub fn update(&mut self, delta_ms: f64) -> usize {
        let dt = delta_ms * self.time_scale;
        let mut finished = Vec::new();
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            let Some(anim) = slot else { continue };
            let was_playing = anim.state() == AnimationState::Playing;
            anim.update(dt);
            if was_playing && anim.state() == AnimationState::Completed {
                finished.push(idx);
            }
        }
        for &idx in &finished {
            self.release(u32::try_from(idx).unwrap_or(u32::MAX));
        }
        finished.len()
    }

    fn release(&mut self, idx: u32) {
        if let Some(slot) = self.slots.get_mut(idx as usize) {
            *slot = None;
            self.generation[idx as usize] = self.generation[idx as usize].wrapping_add(1);
            self.free_list.push(idx);
        }
    }

    fn with_slot(&mut self, id: AnimationId, f: impl FnOnce(&mut dyn Playback)) -> bool {
        match self.slot_mut(id) {
            Some(anim) => {
                f(anim);
                true
            }
            None => false,
        }
    }

    fn slot(&self, id: AnimationId) -> Option<&dyn Playback> {
        if self.generation.get(id.idx as usize) != Some(&id.generation) {
            return None;
        }
        self.slots[id.idx as usize].as_deref()
    }

    fn slot_mut(&mut self, id: AnimationId) -> Option<&mut (dyn Playback + 'static)> {
        if self.generation.get(id.idx as usize) != Some(&id.generation) {
            return None;
        }
        self.slots[id.idx as usize].as_deref_mut()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::animation::{Direction, Iterations};
    use crate::geometry::Point;

    #[test]
    fn completed_animations_are_removed() {
        let mut tl = Timeline::new();
        let short = tl.animate(0.0, 1.0, AnimationConfig::new(100.0));
        let long = tl.animate(0.0, 1.0, AnimationConfig::new(1000.0));
        assert!(tl.play(short));
        assert!(tl.play(long));

        assert_eq!(tl.update(150.0), 1);
        assert!(!tl.contains(short));
        assert!(tl.contains(long));
        assert_eq!(tl.len(), 1);
    }

    #[test]
    fn stale_handles_do_not_resolve_after_slot_reuse() {
        let mut tl = Timeline::new();
        let a = tl.animate(0.0, 1.0, AnimationConfig::new(10.0));
        assert!(tl.remove(a));
        let b = tl.animate(0.0, 2.0, AnimationConfig::new(10.0));
        assert!(!tl.contains(a));
        assert!(tl.contains(b));
        assert!(!tl.play(a));
        assert!(!tl.remove(a));
    }

    #[test]
    fn typed_access_requires_matching_type() {
        let mut tl = Timeline::new();
        let id = tl.animate(Point::ORIGIN, Point::new(4.0, 4.0), AnimationConfig::new(10.0));
        assert!(tl.get::<Point>(id).is_some());
        assert!(tl.get::<f64>(id).is_none());
        tl.get_mut::<Point>(id)
            .expect("typed animation")
            .set_progress(0.5);
        assert_eq!(
            tl.get::<Point>(id).map(Animation::value),
            Some(Point::new(2.0, 2.0))
        );
    }

    #[test]
    fn time_scale_multiplies_deltas() {
        let mut tl = Timeline::new();
        let id = tl.animate(0.0, 100.0, AnimationConfig::new(1000.0));
        tl.play(id);
        tl.set_time_scale(2.0);
        tl.update(100.0);
        assert_eq!(tl.get::<f64>(id).map(Animation::value), Some(20.0));

        tl.set_time_scale(-1.0);
        assert_eq!(tl.time_scale(), 0.0);
        tl.update(100.0);
        assert_eq!(tl.get::<f64>(id).map(Animation::value), Some(20.0));
    }

    #[test]
    fn pause_and_resume_all() {
        let mut tl = Timeline::new();
        let a = tl.animate(0.0, 1.0, AnimationConfig::new(100.0));
        let b = tl.animate(0.0, 1.0, AnimationConfig::new(100.0));
        tl.play(a);
        tl.play(b);
        tl.pause_all();
        assert_eq!(tl.update(500.0), 0);
        assert_eq!(tl.state(a), Some(AnimationState::Paused));
        tl.resume_all();
        assert_eq!(tl.update(500.0), 2);
        assert!(tl.is_empty());
    }

    #[test]
    fn stop_all_keeps_animations_idle() {
        let mut tl = Timeline::new();
        let a = tl.animate(0.0, 1.0, AnimationConfig::new(100.0));
        tl.play(a);
        tl.update(50.0);
        tl.stop_all();
        assert_eq!(tl.state(a), Some(AnimationState::Idle));
        assert_eq!(tl.update(500.0), 0);
        assert!(tl.contains(a));
    }

    #[test]
    fn completion_callback_fires_through_timeline() {
        let mut tl = Timeline::new();
        let done = Rc::new(Cell::new(false));
        let d = done.clone();
        let id = tl.animate(
            0.0,
            1.0,
            AnimationConfig::new(1000.0)
                .with_iterations(Iterations::Count(2))
                .with_direction(Direction::Alternate),
        );
        tl.get_mut::<f64>(id)
            .expect("f64 animation")
            .on_complete(move || d.set(true));
        tl.play(id);
        tl.update(2500.0);
        assert!(done.get());
        assert!(!tl.contains(id));
    }
}
