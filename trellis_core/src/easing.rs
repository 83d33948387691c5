// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing functions mapping normalized time to warped progress.
//!
//! Every function takes `t` in `[0, 1]` (inputs outside are clamped) and
//! satisfies `ease(0) == 0` and `ease(1) == 1`. Elastic and Back overshoot
//! the unit interval in between.

use core::f64::consts::PI;

const BACK_C1: f64 = 1.701_58;
const BACK_C2: f64 = BACK_C1 * 1.525;
const BACK_C3: f64 = BACK_C1 + 1.0;
const ELASTIC_C4: f64 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f64 = (2.0 * PI) / 4.5;
const BOUNCE_N1: f64 = 7.5625;
const BOUNCE_D1: f64 = 2.75;

/// An easing curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    /// Constant velocity.
    #[default]
    Linear,
    /// `t²`.
    QuadIn,
    /// Decelerating quadratic.
    QuadOut,
    /// Quadratic in both halves.
    QuadInOut,
    /// `t³`.
    CubicIn,
    /// Decelerating cubic.
    CubicOut,
    /// Cubic in both halves.
    CubicInOut,
    /// `t⁴`.
    QuartIn,
    /// Decelerating quartic.
    QuartOut,
    /// Quartic in both halves.
    QuartInOut,
    /// Damped sine wind-up.
    ElasticIn,
    /// Damped sine overshoot.
    ElasticOut,
    /// Damped sine at both ends.
    ElasticInOut,
    /// Mirrored bounce.
    BounceIn,
    /// Ball dropping onto the end value.
    BounceOut,
    /// Bounce at both ends.
    BounceInOut,
    /// Pulls back before moving.
    BackIn,
    /// Overshoots then settles.
    BackOut,
    /// Pull back and overshoot.
    BackInOut,
    /// Quarter cosine.
    SineIn,
    /// Quarter sine.
    SineOut,
    /// Half cosine.
    SineInOut,
    /// Exponential ramp.
    ExpoIn,
    /// Exponential settle.
    ExpoOut,
    /// Exponential at both ends.
    ExpoInOut,
    /// Circular ramp.
    CircIn,
    /// Circular settle.
    CircOut,
    /// Circular at both ends.
    CircInOut,
}

impl Easing {
    /// Every easing variant, in declaration order.
    pub const ALL: [Self; 28] = [
        Self::Linear,
        Self::QuadIn,
        Self::QuadOut,
        Self::QuadInOut,
        Self::CubicIn,
        Self::CubicOut,
        Self::CubicInOut,
        Self::QuartIn,
        Self::QuartOut,
        Self::QuartInOut,
        Self::ElasticIn,
        Self::ElasticOut,
        Self::ElasticInOut,
        Self::BounceIn,
        Self::BounceOut,
        Self::BounceInOut,
        Self::BackIn,
        Self::BackOut,
        Self::BackInOut,
        Self::SineIn,
        Self::SineOut,
        Self::SineInOut,
        Self::ExpoIn,
        Self::ExpoOut,
        Self::ExpoInOut,
        Self::CircIn,
        Self::CircOut,
        Self::CircInOut,
    ];

    /// Evaluates the curve at `t`, clamping `t` into `[0, 1]` first.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,

            Self::QuadIn => t * t,
            Self::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }

            Self::CubicIn => t * t * t,
            Self::CubicOut => 1.0 - (1.0 - t).powi(3),
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }

            Self::QuartIn => t.powi(4),
            Self::QuartOut => 1.0 - (1.0 - t).powi(4),
            Self::QuartInOut => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }

            Self::ElasticIn => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    -(2.0_f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
                }
            }
            Self::ElasticOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    2.0_f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
            Self::ElasticInOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    -(2.0_f64.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        / 2.0
                } else {
                    (2.0_f64.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        / 2.0
                        + 1.0
                }
            }

            Self::BounceIn => 1.0 - bounce_out(1.0 - t),
            Self::BounceOut => bounce_out(t),
            Self::BounceInOut => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }

            Self::BackIn => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Self::BackOut => {
                1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2)
            }
            Self::BackInOut => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2)
                        + 2.0)
                        / 2.0
                }
            }

            Self::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Self::SineOut => (t * PI / 2.0).sin(),
            Self::SineInOut => -((PI * t).cos() - 1.0) / 2.0,

            Self::ExpoIn => {
                if t == 0.0 {
                    0.0
                } else {
                    2.0_f64.powf(10.0 * t - 10.0)
                }
            }
            Self::ExpoOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f64.powf(-10.0 * t)
                }
            }
            Self::ExpoInOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    2.0_f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }

            Self::CircIn => 1.0 - (1.0 - t * t).sqrt(),
            Self::CircOut => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Self::CircInOut => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
        }
    }

    /// Returns the canonical kebab-case name, e.g. `"ease-out-bounce"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::QuadIn => "ease-in-quad",
            Self::QuadOut => "ease-out-quad",
            Self::QuadInOut => "ease-in-out-quad",
            Self::CubicIn => "ease-in-cubic",
            Self::CubicOut => "ease-out-cubic",
            Self::CubicInOut => "ease-in-out-cubic",
            Self::QuartIn => "ease-in-quart",
            Self::QuartOut => "ease-out-quart",
            Self::QuartInOut => "ease-in-out-quart",
            Self::ElasticIn => "ease-in-elastic",
            Self::ElasticOut => "ease-out-elastic",
            Self::ElasticInOut => "ease-in-out-elastic",
            Self::BounceIn => "ease-in-bounce",
            Self::BounceOut => "ease-out-bounce",
            Self::BounceInOut => "ease-in-out-bounce",
            Self::BackIn => "ease-in-back",
            Self::BackOut => "ease-out-back",
            Self::BackInOut => "ease-in-out-back",
            Self::SineIn => "ease-in-sine",
            Self::SineOut => "ease-out-sine",
            Self::SineInOut => "ease-in-out-sine",
            Self::ExpoIn => "ease-in-expo",
            Self::ExpoOut => "ease-out-expo",
            Self::ExpoInOut => "ease-in-out-expo",
            Self::CircIn => "ease-in-circ",
            Self::CircOut => "ease-out-circ",
            Self::CircInOut => "ease-in-out-circ",
        }
    }

    /// Looks up an easing by name.
    ///
    /// Accepts the kebab-case names returned by [`name`](Self::name) as well
    /// as the variant spelling (`"BounceOut"`), case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL.into_iter().find(|e| {
            let kebab: String = e.name().chars().filter(|c| *c != '-').collect();
            kebab == wanted || variant_key(*e) == wanted
        })
    }
}

/// Lower-case variant spelling with no separators, e.g. `"bounceout"`.
fn variant_key(e: Easing) -> String {
    format!("{e:?}").to_ascii_lowercase()
}

fn bounce_out(t: f64) -> f64 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let t = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let t = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984_375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn every_easing_hits_both_endpoints() {
        for e in Easing::ALL {
            let start = e.apply(0.0);
            let end = e.apply(1.0);
            assert!(start.abs() < EPS, "{e:?}(0) = {start}");
            assert!((end - 1.0).abs() < EPS, "{e:?}(1) = {end}");
        }
    }

    #[test]
    fn inputs_are_clamped() {
        for e in Easing::ALL {
            assert_eq!(e.apply(-0.5), e.apply(0.0), "{e:?} below range");
            assert_eq!(e.apply(1.5), e.apply(1.0), "{e:?} above range");
            assert_eq!(e.apply(f64::NAN), e.apply(0.0), "{e:?} NaN");
        }
    }

    #[test]
    fn in_out_pairs_are_symmetric_at_midpoint() {
        for e in [
            Easing::QuadInOut,
            Easing::CubicInOut,
            Easing::QuartInOut,
            Easing::SineInOut,
            Easing::ExpoInOut,
            Easing::CircInOut,
            Easing::BackInOut,
            Easing::BounceInOut,
        ] {
            assert!((e.apply(0.5) - 0.5).abs() < 1e-6, "{e:?}(0.5) = {}", e.apply(0.5));
        }
    }

    #[test]
    fn power_curves_match_formulas() {
        assert!((Easing::QuadIn.apply(0.5) - 0.25).abs() < EPS);
        assert!((Easing::CubicIn.apply(0.5) - 0.125).abs() < EPS);
        assert!((Easing::QuartOut.apply(0.5) - 0.9375).abs() < EPS);
        assert!((Easing::QuadInOut.apply(0.25) - 0.125).abs() < EPS);
    }

    #[test]
    fn bounce_segments() {
        // First segment ends at 1 / 2.75 with value 1.0.
        let knee = 1.0 / 2.75;
        assert!((Easing::BounceOut.apply(knee - 1e-12) - 1.0).abs() < 1e-6);
        // Third-segment bottom at 2.25 / 2.75.
        assert!((Easing::BounceOut.apply(2.25 / 2.75) - 0.9375).abs() < EPS);
        assert!((Easing::BounceIn.apply(0.25) - (1.0 - Easing::BounceOut.apply(0.75))).abs() < EPS);
    }

    #[test]
    fn back_overshoots() {
        assert!(Easing::BackIn.apply(0.2) < 0.0, "BackIn pulls back first");
        assert!(Easing::BackOut.apply(0.8) > 1.0, "BackOut overshoots");
    }

    #[test]
    fn elastic_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::ElasticOut.apply(f64::from(i) / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.0, "ElasticOut should overshoot, peak {peak}");
    }

    #[test]
    fn expo_special_cases_avoid_residue() {
        assert_eq!(Easing::ExpoIn.apply(0.0), 0.0);
        assert_eq!(Easing::ExpoOut.apply(1.0), 1.0);
        assert!(Easing::ExpoIn.apply(1e-6) > 0.0);
    }

    #[test]
    fn names_round_trip() {
        for e in Easing::ALL {
            assert_eq!(Easing::from_name(e.name()), Some(e), "{}", e.name());
            assert_eq!(Easing::from_name(&format!("{e:?}")), Some(e));
        }
        assert_eq!(Easing::from_name("EASE_OUT_BOUNCE"), Some(Easing::BounceOut));
        assert_eq!(Easing::from_name("wobble"), None);
    }
}
