// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-driven interpolation of a typed value.
//!
//! An [`Animation`] interpolates between two [`Animatable`] values over
//! `duration_ms`, shaped by an [`Easing`]. Runtime behavior is governed by
//! [`AnimationConfig`]:
//!
//! - **delay**: time spent before the first iteration starts. Any part of a
//!   delta that overshoots the delay carries into the same update.
//! - **iterations**: a finite count or [`Iterations::Infinite`].
//! - **direction**: [`Direction::Alternate`] and
//!   [`Direction::AlternateReverse`] flip direction at each iteration
//!   boundary.
//! - **fill mode**: which value is reported during the delay and after
//!   completion.
//!
//! # Lifecycle
//!
//! ```text
//!   Idle ──play()──► Playing ──pause()──► Paused
//!    ▲                 │  ▲                 │
//!    │                 │  └────resume()─────┘
//!    └────stop()───────┤
//!                      └──iterations exhausted──► Completed
//! ```
//!
//! Only a `Playing` animation accepts time through [`Animation::update`].
//! [`Animation::set_progress`] seeks in any state without changing it.

use core::fmt;

use kurbo::{Point, Rect, Size, Vec2};

use crate::color::Color;
use crate::easing::Easing;

/// A value that can be linearly interpolated.
pub trait Animatable: Copy + fmt::Debug + 'static {
    /// Interpolates from `self` towards `to`; `t == 0` yields `self` and
    /// `t == 1` yields `to`. Overshooting easings pass `t` outside `[0, 1]`.
    #[must_use]
    fn lerp(self, to: Self, t: f64) -> Self;
}

impl Animatable for f64 {
    fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Animatable for f32 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "interpolation factor precision loss is acceptable"
    )]
    fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t as f32
    }
}

impl Animatable for Point {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self::lerp(self, to, t)
    }
}

impl Animatable for Vec2 {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self::lerp(self, to, t)
    }
}

impl Animatable for Size {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self::new(
            self.width.lerp(to.width, t),
            self.height.lerp(to.height, t),
        )
    }
}

impl Animatable for Rect {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self::new(
            self.x0.lerp(to.x0, t),
            self.y0.lerp(to.y0, t),
            self.x1.lerp(to.x1, t),
            self.y1.lerp(to.y1, t),
        )
    }
}

impl Animatable for Color {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "interpolation factor precision loss is acceptable"
    )]
    fn lerp(self, to: Self, t: f64) -> Self {
        Self::lerp(self, to, t as f32)
    }
}

/// How many times an animation runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Iterations {
    /// A fixed number of iterations.
    Count(u32),
    /// Repeats until stopped.
    Infinite,
}

/// Playback direction across iterations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Every iteration runs start → end.
    #[default]
    Normal,
    /// Every iteration runs end → start.
    Reverse,
    /// Odd iterations run start → end, even ones end → start.
    Alternate,
    /// Like [`Alternate`](Self::Alternate) but the first iteration is
    /// reversed.
    AlternateReverse,
}

impl Direction {
    const fn alternates(self) -> bool {
        matches!(self, Self::Alternate | Self::AlternateReverse)
    }
}

/// Which value an animation reports outside of its active interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillMode {
    /// Nothing during the delay; the start value after completion.
    None,
    /// Keeps the final value after completion.
    #[default]
    Forwards,
    /// Applies the start value while the delay is pending.
    Backwards,
    /// Both [`Forwards`](Self::Forwards) and [`Backwards`](Self::Backwards).
    Both,
}

impl FillMode {
    const fn fills_forwards(self) -> bool {
        matches!(self, Self::Forwards | Self::Both)
    }

    const fn fills_backwards(self) -> bool {
        matches!(self, Self::Backwards | Self::Both)
    }
}

/// Lifecycle state of an [`Animation`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimationState {
    /// Not started, or stopped.
    #[default]
    Idle,
    /// Advancing with each update.
    Playing,
    /// Suspended; keeps its position.
    Paused,
    /// Ran every iteration.
    Completed,
}

/// Timing configuration for an [`Animation`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationConfig {
    /// Length of one iteration in milliseconds.
    pub duration_ms: f64,
    /// Time before the first iteration starts, in milliseconds.
    pub delay_ms: f64,
    /// Easing applied to normalized time.
    pub easing: Easing,
    /// Number of iterations.
    pub iterations: Iterations,
    /// Direction policy.
    pub direction: Direction,
    /// Fill policy.
    pub fill_mode: FillMode,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::new(300.0)
    }
}

impl AnimationConfig {
    /// A single linear forward iteration lasting `duration_ms`.
    #[must_use]
    pub const fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            delay_ms: 0.0,
            easing: Easing::Linear,
            iterations: Iterations::Count(1),
            direction: Direction::Normal,
            fill_mode: FillMode::Forwards,
        }
    }

    /// Sets the start delay.
    #[must_use]
    pub const fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Sets the easing curve.
    #[must_use]
    pub const fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Sets the iteration count.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: Iterations) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the direction policy.
    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the fill policy.
    #[must_use]
    pub const fn with_fill_mode(mut self, fill_mode: FillMode) -> Self {
        self.fill_mode = fill_mode;
        self
    }
}

/// Interpolates a typed value over time.
pub struct Animation<T: Animatable> {
    from: T,
    to: T,
    config: AnimationConfig,

    state: AnimationState,
    elapsed_ms: f64,
    delay_elapsed_ms: f64,
    iteration: u32,
    reversed: bool,
    value: T,

    on_update: Option<Box<dyn FnMut(T)>>,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl<T: Animatable> fmt::Debug for Animation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("delay_elapsed_ms", &self.delay_elapsed_ms)
            .field("iteration", &self.iteration)
            .field("reversed", &self.reversed)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl<T: Animatable> Animation<T> {
    /// Creates an idle animation from `from` to `to`.
    #[must_use]
    pub fn new(from: T, to: T, config: AnimationConfig) -> Self {
        Self {
            from,
            to,
            config,
            state: AnimationState::Idle,
            elapsed_ms: 0.0,
            delay_elapsed_ms: 0.0,
            iteration: 0,
            reversed: config.direction == Direction::AlternateReverse,
            value: from,
            on_update: None,
            on_complete: None,
        }
    }

    /// Registers the callback invoked with every newly computed value.
    pub fn on_update(&mut self, f: impl FnMut(T) + 'static) -> &mut Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Registers the callback invoked once when the last iteration finishes.
    pub fn on_complete(&mut self, f: impl FnMut() + 'static) -> &mut Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// The start value.
    #[must_use]
    pub fn from(&self) -> T {
        self.from
    }

    /// The end value.
    #[must_use]
    pub fn to(&self) -> T {
        self.to
    }

    /// Replaces both endpoints. Takes effect at the next computed value.
    pub fn set_values(&mut self, from: T, to: T) {
        self.from = from;
        self.to = to;
    }

    /// The timing configuration.
    #[must_use]
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// The lifecycle state.
    #[must_use]
    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// The most recently computed value.
    #[must_use]
    pub fn value(&self) -> T {
        self.value
    }

    /// Time elapsed within the current iteration.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Number of completed iterations.
    #[must_use]
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Whether the current iteration runs end → start.
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.config.direction == Direction::Reverse || self.reversed
    }

    /// Starts playback.
    ///
    /// From `Idle` or `Completed` this restarts from the beginning
    /// (including the delay); from `Paused` it resumes; while `Playing` it
    /// does nothing.
    pub fn play(&mut self) {
        match self.state {
            AnimationState::Playing => {}
            AnimationState::Paused => self.state = AnimationState::Playing,
            AnimationState::Idle | AnimationState::Completed => {
                self.rewind();
                self.state = AnimationState::Playing;
                if self.config.delay_ms > 0.0 && self.config.fill_mode.fills_backwards() {
                    let start = self.sample(0.0);
                    self.emit(start);
                }
            }
        }
    }

    /// Suspends a playing animation.
    pub fn pause(&mut self) {
        if self.state == AnimationState::Playing {
            self.state = AnimationState::Paused;
        }
    }

    /// Continues a paused animation.
    pub fn resume(&mut self) {
        if self.state == AnimationState::Paused {
            self.state = AnimationState::Playing;
        }
    }

    /// Returns a playing or paused animation to `Idle` and rewinds it.
    pub fn stop(&mut self) {
        if matches!(
            self.state,
            AnimationState::Playing | AnimationState::Paused
        ) {
            self.state = AnimationState::Idle;
            self.rewind();
        }
    }

    /// Seeks to `progress` (clamped to `[0, 1]`) within the current
    /// iteration and immediately recomputes the value.
    ///
    /// The lifecycle state is left untouched.
    pub fn set_progress(&mut self, progress: f64) {
        let p = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.elapsed_ms = p * self.config.duration_ms.max(0.0);
        let value = self.sample(p);
        self.emit(value);
    }

    /// Advances a playing animation by `delta_ms`.
    ///
    /// Does nothing unless the state is `Playing`.
    pub fn update(&mut self, delta_ms: f64) {
        if self.state != AnimationState::Playing || !delta_ms.is_finite() {
            return;
        }
        let mut dt = delta_ms.max(0.0);

        if self.delay_elapsed_ms < self.config.delay_ms {
            self.delay_elapsed_ms += dt;
            if self.delay_elapsed_ms < self.config.delay_ms {
                return;
            }
            dt = self.delay_elapsed_ms - self.config.delay_ms;
            self.delay_elapsed_ms = self.config.delay_ms;
        }

        let duration = self.config.duration_ms;
        if duration <= 0.0 || self.config.iterations == Iterations::Count(0) {
            self.finish();
            return;
        }

        self.elapsed_ms += dt;
        let wrapped = (self.elapsed_ms / duration).floor();
        if wrapped >= 1.0 {
            if let Iterations::Count(n) = self.config.iterations {
                let remaining = n.saturating_sub(self.iteration);
                if wrapped >= f64::from(remaining) {
                    // The final iteration ends without flipping direction.
                    if self.config.direction.alternates() && remaining % 2 == 0 {
                        self.reversed = !self.reversed;
                    }
                    self.iteration = n;
                    self.finish();
                    return;
                }
            }
            #[allow(
                clippy::cast_possible_truncation,
                reason = "float to int casts saturate; iteration counts past u32::MAX stay pinned"
            )]
            let whole = wrapped as u32;
            self.iteration = self.iteration.saturating_add(whole);
            // Above 2^53 every representable count is even.
            if self.config.direction.alternates() && wrapped % 2.0 == 1.0 {
                self.reversed = !self.reversed;
            }
            self.elapsed_ms = self.elapsed_ms.rem_euclid(duration);
        }

        let value = self.sample(self.elapsed_ms / duration);
        self.emit(value);
    }

    /// Value at normalized time `t` of the current iteration.
    fn sample(&self, t: f64) -> T {
        let t = if self.is_reversed() { 1.0 - t } else { t };
        self.from.lerp(self.to, self.config.easing.apply(t))
    }

    fn rewind(&mut self) {
        self.elapsed_ms = 0.0;
        self.delay_elapsed_ms = 0.0;
        self.iteration = 0;
        self.reversed = self.config.direction == Direction::AlternateReverse;
    }

    fn finish(&mut self) {
        self.state = AnimationState::Completed;
        self.elapsed_ms = self.config.duration_ms.max(0.0);
        let value = if self.config.fill_mode.fills_forwards() {
            if self.is_reversed() { self.from } else { self.to }
        } else {
            // First-iteration start value.
            match self.config.direction {
                Direction::Reverse | Direction::AlternateReverse => self.to,
                Direction::Normal | Direction::Alternate => self.from,
            }
        };
        self.emit(value);
        if let Some(cb) = self.on_complete.as_mut() {
            cb();
        }
    }

    fn emit(&mut self, value: T) {
        self.value = value;
        if let Some(cb) = self.on_update.as_mut() {
            cb(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;

    fn linear(duration: f64) -> AnimationConfig {
        AnimationConfig::new(duration)
    }

    #[test]
    fn only_playing_accepts_time() {
        let mut a = Animation::new(0.0, 100.0, linear(1000.0));
        a.update(500.0);
        assert_eq!(a.elapsed_ms(), 0.0, "idle ignores updates");

        a.play();
        a.update(250.0);
        assert_eq!(a.value(), 25.0);

        a.pause();
        a.update(250.0);
        assert_eq!(a.value(), 25.0, "paused ignores updates");
        assert_eq!(a.state(), AnimationState::Paused);

        a.resume();
        a.update(250.0);
        assert_eq!(a.value(), 50.0);
    }

    #[test]
    fn stop_returns_to_idle_and_rewinds() {
        let mut a = Animation::new(0.0, 1.0, linear(100.0));
        a.play();
        a.update(40.0);
        a.stop();
        assert_eq!(a.state(), AnimationState::Idle);
        assert_eq!(a.elapsed_ms(), 0.0);

        // Stop from paused also works.
        a.play();
        a.pause();
        a.stop();
        assert_eq!(a.state(), AnimationState::Idle);
    }

    #[test]
    fn delay_residual_carries_into_same_update() {
        let mut a = Animation::new(0.0_f64, 100.0, linear(1000.0).with_delay(100.0));
        a.play();
        a.update(60.0);
        assert_eq!(a.elapsed_ms(), 0.0, "still inside the delay");
        a.update(60.0);
        assert_eq!(a.elapsed_ms(), 20.0, "20ms past the delay boundary");
        assert!((a.value() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn completes_and_snaps_to_final_value() {
        let completed = Rc::new(Cell::new(0));
        let c = completed.clone();
        let mut a = Animation::new(0.0, 10.0, linear(100.0).with_easing(Easing::BackOut));
        a.on_complete(move || c.set(c.get() + 1));
        a.play();
        a.update(150.0);
        assert_eq!(a.state(), AnimationState::Completed);
        assert_eq!(a.value(), 10.0);
        assert_eq!(completed.get(), 1);

        a.update(100.0);
        assert_eq!(completed.get(), 1, "completed animations ignore time");
    }

    #[test]
    fn alternate_two_iterations_ends_on_reversed_final_value() {
        let mut a = Animation::new(
            0.0_f64,
            100.0,
            linear(1000.0)
                .with_iterations(Iterations::Count(2))
                .with_direction(Direction::Alternate),
        );
        a.play();
        for _ in 0..15 {
            a.update(100.0);
        }
        assert_eq!(a.state(), AnimationState::Playing);
        assert!(a.is_reversed(), "second iteration runs backwards");
        assert!((a.value() - 50.0).abs() < 1e-9, "value {}", a.value());

        for _ in 0..10 {
            a.update(100.0);
        }
        assert_eq!(a.state(), AnimationState::Completed);
        assert_eq!(a.iteration(), 2);
        assert_eq!(a.value(), 0.0, "clamped to the reversed iteration's end");
    }

    #[test]
    fn infinite_animation_survives_huge_delta() {
        let mut a = Animation::new(
            0.0,
            1.0,
            linear(1.0).with_iterations(Iterations::Infinite),
        );
        a.play();
        a.update(1e17);
        assert_eq!(a.state(), AnimationState::Playing);
        assert_eq!(a.iteration(), u32::MAX, "iteration count saturates");
        assert!(a.elapsed_ms() < 1.0, "elapsed {}", a.elapsed_ms());

        let mut tiny = Animation::new(
            0.0,
            1.0,
            linear(1e-9).with_iterations(Iterations::Infinite),
        );
        tiny.play();
        tiny.update(16.0);
        assert_eq!(tiny.state(), AnimationState::Playing);
    }

    #[test]
    fn skipping_many_iterations_keeps_alternate_parity() {
        let alternating = || {
            let mut a = Animation::new(
                0.0_f64,
                100.0,
                linear(10.0)
                    .with_iterations(Iterations::Infinite)
                    .with_direction(Direction::Alternate),
            );
            a.play();
            a
        };

        let mut odd = alternating();
        odd.update(10.0 * 1001.0 + 2.5);
        assert_eq!(odd.iteration(), 1001);
        assert!(odd.is_reversed(), "odd skip runs backwards");
        assert!((odd.value() - 75.0).abs() < 1e-6, "value {}", odd.value());

        let mut even = alternating();
        even.update(10.0 * 1000.0 + 2.5);
        assert_eq!(even.iteration(), 1000);
        assert!(!even.is_reversed(), "even skip runs forwards");
        assert!((even.value() - 25.0).abs() < 1e-6, "value {}", even.value());
    }

    #[test]
    fn counted_alternate_finishes_in_one_step() {
        let mut a = Animation::new(
            0.0,
            100.0,
            linear(10.0)
                .with_iterations(Iterations::Count(3))
                .with_direction(Direction::Alternate)
                .with_fill_mode(FillMode::Forwards),
        );
        a.play();
        a.update(1e12);
        assert_eq!(a.state(), AnimationState::Completed);
        assert_eq!(a.iteration(), 3);
        assert_eq!(a.value(), 100.0, "third iteration runs forwards");
    }

    #[test]
    fn single_large_delta_completes_without_extrapolating() {
        let mut a = Animation::new(
            0.0,
            100.0,
            linear(1000.0)
                .with_iterations(Iterations::Count(2))
                .with_direction(Direction::Alternate),
        );
        a.play();
        a.update(2500.0);
        assert_eq!(a.state(), AnimationState::Completed);
        assert_eq!(a.value(), 0.0);
    }

    #[test]
    fn reverse_direction_runs_backwards() {
        let mut a = Animation::new(0.0, 100.0, linear(100.0).with_direction(Direction::Reverse));
        a.play();
        a.update(25.0);
        assert_eq!(a.value(), 75.0);
        a.update(100.0);
        assert_eq!(a.value(), 0.0);
    }

    #[test]
    fn alternate_reverse_starts_reversed() {
        let mut a = Animation::new(
            0.0,
            100.0,
            linear(100.0)
                .with_iterations(Iterations::Count(2))
                .with_direction(Direction::AlternateReverse),
        );
        a.play();
        a.update(25.0);
        assert_eq!(a.value(), 75.0);
        a.update(100.0);
        assert_eq!(a.value(), 25.0, "second iteration runs forwards");
        a.update(100.0);
        assert_eq!(a.value(), 100.0);
    }

    #[test]
    fn infinite_iterations_never_complete() {
        let mut a = Animation::new(
            0.0_f64,
            1.0,
            linear(10.0).with_iterations(Iterations::Infinite),
        );
        a.play();
        a.update(10_005.0);
        assert_eq!(a.state(), AnimationState::Playing);
        assert_eq!(a.iteration(), 1000);
        assert!((a.value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn set_progress_recomputes_without_state_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let mut a = Animation::new(0.0, 200.0, linear(1000.0));
        a.on_update(move |v| s.borrow_mut().push(v));
        a.set_progress(0.5);
        assert_eq!(a.state(), AnimationState::Idle);
        assert_eq!(a.value(), 100.0);
        assert_eq!(a.elapsed_ms(), 500.0);
        a.set_progress(7.0);
        assert_eq!(a.value(), 200.0);
        assert_eq!(*seen.borrow(), vec![100.0, 200.0]);
    }

    #[test]
    fn fill_modes() {
        let cfg = linear(100.0).with_delay(50.0);

        let mut backwards = Animation::new(
            5.0,
            10.0,
            cfg.with_fill_mode(FillMode::Backwards),
        );
        let seen = Rc::new(Cell::new(f64::NAN));
        let s = seen.clone();
        backwards.on_update(move |v| s.set(v));
        backwards.play();
        assert_eq!(seen.get(), 5.0, "backwards fill applies the start value during the delay");
        backwards.update(500.0);
        assert_eq!(backwards.value(), 5.0, "no forwards fill: reverts to the start value");

        let mut none = Animation::new(5.0, 10.0, cfg.with_fill_mode(FillMode::None));
        none.play();
        none.update(500.0);
        assert_eq!(none.value(), 5.0);

        let mut both = Animation::new(5.0, 10.0, cfg.with_fill_mode(FillMode::Both));
        both.play();
        both.update(500.0);
        assert_eq!(both.value(), 10.0);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut a = Animation::new(0.0, 3.0, linear(0.0));
        a.play();
        a.update(0.0);
        assert_eq!(a.state(), AnimationState::Completed);
        assert_eq!(a.value(), 3.0);
    }

    #[test]
    fn replay_after_completion_restarts() {
        let mut a = Animation::new(0.0_f64, 1.0, linear(10.0));
        a.play();
        a.update(20.0);
        assert_eq!(a.state(), AnimationState::Completed);
        a.play();
        assert_eq!(a.state(), AnimationState::Playing);
        assert_eq!(a.iteration(), 0);
        a.update(5.0);
        assert!((a.value() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn typed_values_interpolate() {
        let mut a = Animation::new(
            Color::BLACK,
            Color::WHITE,
            linear(100.0),
        );
        a.play();
        a.update(50.0);
        assert_eq!(a.value(), Color::new(0.5, 0.5, 0.5, 1.0));

        let mut p = Animation::new(Point::new(0.0, 0.0), Point::new(10.0, 20.0), linear(10.0));
        p.play();
        p.update(5.0);
        assert_eq!(p.value(), Point::new(5.0, 10.0));
    }
}
