//! Easing curves mapping a normalized time fraction to a progress fraction.
//!
//! The cubic bezier form is parametric: the curve parameter is not the
//! time fraction, so evaluation inverts the x component numerically with
//! a bounded binary search before sampling the y component.

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Cubic parametric curve through (0,0) and (1,1) with two control points.
///
/// Control-point x coordinates must be finite and inside `[0,1]` so the
/// x component is monotonic and invertible; y coordinates only need to be
/// finite (anticipate/overshoot shapes leave `[0,1]`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCubicBezier")]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

/// Unvalidated wire form; deserialization funnels through
/// [`CubicBezier::new`] so a persisted curve cannot skip validation.
#[derive(Deserialize)]
struct RawCubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl TryFrom<RawCubicBezier> for CubicBezier {
    type Error = MotionError;

    fn try_from(raw: RawCubicBezier) -> Result<Self, MotionError> {
        Self::new(raw.x1, raw.y1, raw.x2, raw.y2)
    }
}

impl CubicBezier {
    // Depth of the binary search used to invert the x component.
    const SEARCH_DEPTH: usize = 48;
    const SEARCH_TOLERANCE: f64 = 1e-9;

    // Step used for the numeric derivative.
    const DIFF_STEP: f64 = 1e-5;

    /// Creates a validated curve from the two control points.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, MotionError> {
        for (index, axis, value, bounded) in [
            (1, "x", x1, true),
            (1, "y", y1, false),
            (2, "x", x2, true),
            (2, "y", y2, false),
        ] {
            let in_range = if bounded {
                value.is_finite() && (0.0..=1.0).contains(&value)
            } else {
                value.is_finite()
            };
            if !in_range {
                return Err(MotionError::ControlPointOutOfRange { index, axis, value });
            }
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// Progress fraction at time fraction `x` (clamped to `[0,1]`).
    pub fn value(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        let t = self.find_t(x);
        Self::sample(t, self.y1, self.y2)
    }

    /// Derivative d(progress)/d(time fraction) at `x`.
    ///
    /// The endpoints are evaluated analytically as the limit of the
    /// parametric ratio `by'/bx'`, so a flat start (y1 = 0 with x1 > 0,
    /// as in the Material standard curve) reports an exact zero instead
    /// of the small positive value a finite difference would see.
    /// Interior points use a central difference on `value`.
    pub fn slope(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return Self::limit_slope([
                (self.x1, self.y1),
                (self.x2 - 2.0 * self.x1, self.y2 - 2.0 * self.y1),
                (
                    1.0 - 3.0 * self.x2 + 3.0 * self.x1,
                    1.0 - 3.0 * self.y2 + 3.0 * self.y1,
                ),
            ]);
        }
        if x >= 1.0 {
            return Self::limit_slope([
                (1.0 - self.x2, 1.0 - self.y2),
                (1.0 - 2.0 * self.x2 + self.x1, 1.0 - 2.0 * self.y2 + self.y1),
                (
                    1.0 - 3.0 * self.x2 + 3.0 * self.x1,
                    1.0 - 3.0 * self.y2 + 3.0 * self.y1,
                ),
            ]);
        }
        let lo = (x - Self::DIFF_STEP).max(0.0);
        let hi = (x + Self::DIFF_STEP).min(1.0);
        (self.value(hi) - self.value(lo)) / (hi - lo)
    }

    /// Tangent slope at an endpoint: the first derivative order whose
    /// components do not both vanish determines the limit of `by'/bx'`
    /// (successive orders are the l'Hopital fallbacks).
    fn limit_slope(orders: [(f64, f64); 3]) -> f64 {
        for (dx, dy) in orders {
            if dx.abs() > f64::EPSILON || dy.abs() > f64::EPSILON {
                if dx.abs() <= f64::EPSILON {
                    return if dy > 0.0 {
                        f64::INFINITY
                    } else {
                        f64::NEG_INFINITY
                    };
                }
                return dy / dx;
            }
        }
        1.0
    }

    /// Binary search for the curve parameter `t` with `bx(t) == x`.
    ///
    /// The x component is monotonic because both control x values sit in
    /// `[0,1]`, so the bracket [0,1] always contains exactly one root.
    fn find_t(&self, x: f64) -> f64 {
        let mut lo = 0.0_f64;
        let mut hi = 1.0_f64;
        let mut t = x;
        for _ in 0..Self::SEARCH_DEPTH {
            let bx = Self::sample(t, self.x1, self.x2);
            if (bx - x).abs() <= Self::SEARCH_TOLERANCE {
                break;
            }
            if bx < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) * 0.5;
        }
        t
    }

    /// One bezier component in Horner form, endpoints fixed at 0 and 1.
    #[inline]
    fn sample(t: f64, p1: f64, p2: f64) -> f64 {
        let a = 1.0 - 3.0 * p2 + 3.0 * p1;
        let b = 3.0 * p2 - 6.0 * p1;
        let c = 3.0 * p1;
        ((a * t + b) * t + c) * t
    }
}

/// An easing curve: a reparameterization of elapsed-time fraction into
/// progress fraction, with an evaluable derivative.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Easing {
    /// Identity mapping.
    Linear,
    /// Cubic bezier curve.
    Bezier(CubicBezier),
    /// Piecewise-parabola bounce (comes to rest after three rebounds).
    Bounce,
    /// Exponentially damped sinusoid settling on the target.
    Elastic,
}

impl Easing {
    /// Material "standard" curve (0.4, 0.0, 0.2, 1.0).
    pub fn standard() -> Self {
        Easing::Bezier(CubicBezier {
            x1: 0.4,
            y1: 0.0,
            x2: 0.2,
            y2: 1.0,
        })
    }

    /// Material "decelerate" curve (0.0, 0.0, 0.2, 1.0).
    ///
    /// Starts with a strictly positive slope, which makes it the natural
    /// choice for splicing onto a moving profile.
    pub fn decelerate() -> Self {
        Easing::Bezier(CubicBezier {
            x1: 0.0,
            y1: 0.0,
            x2: 0.2,
            y2: 1.0,
        })
    }

    /// Material "accelerate" curve (0.4, 0.0, 1.0, 1.0).
    pub fn accelerate() -> Self {
        Easing::Bezier(CubicBezier {
            x1: 0.4,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
        })
    }

    /// Anticipate: backs up slightly before heading to the target.
    pub fn anticipate() -> Self {
        Easing::Bezier(CubicBezier {
            x1: 0.36,
            y1: -0.56,
            x2: 0.66,
            y2: 1.0,
        })
    }

    /// Overshoot: passes the target and settles back.
    pub fn overshoot() -> Self {
        Easing::Bezier(CubicBezier {
            x1: 0.34,
            y1: 1.56,
            x2: 0.64,
            y2: 1.0,
        })
    }

    /// Progress fraction at time fraction `x` (clamped to `[0,1]`).
    pub fn value(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        match self {
            Easing::Linear => x,
            Easing::Bezier(curve) => curve.value(x),
            Easing::Bounce => bounce(x),
            Easing::Elastic => elastic(x),
        }
    }

    /// Derivative d(progress)/d(time fraction) at `x`.
    pub fn slope(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        match self {
            Easing::Linear => 1.0,
            Easing::Bezier(curve) => curve.slope(x),
            Easing::Bounce => bounce_slope(x),
            Easing::Elastic => elastic_slope(x),
        }
    }
}

const BOUNCE_N: f64 = 7.5625;
const BOUNCE_D: f64 = 2.75;

fn bounce(x: f64) -> f64 {
    if x >= 1.0 {
        return 1.0;
    }
    if x < 1.0 / BOUNCE_D {
        BOUNCE_N * x * x
    } else if x < 2.0 / BOUNCE_D {
        let x = x - 1.5 / BOUNCE_D;
        BOUNCE_N * x * x + 0.75
    } else if x < 2.5 / BOUNCE_D {
        let x = x - 2.25 / BOUNCE_D;
        BOUNCE_N * x * x + 0.9375
    } else {
        let x = x - 2.625 / BOUNCE_D;
        BOUNCE_N * x * x + 0.984375
    }
}

fn bounce_slope(x: f64) -> f64 {
    let shift = if x < 1.0 / BOUNCE_D {
        0.0
    } else if x < 2.0 / BOUNCE_D {
        1.5 / BOUNCE_D
    } else if x < 2.5 / BOUNCE_D {
        2.25 / BOUNCE_D
    } else {
        2.625 / BOUNCE_D
    };
    2.0 * BOUNCE_N * (x - shift)
}

const ELASTIC_PERIOD: f64 = 2.0 * std::f64::consts::PI / 3.0;

fn elastic(x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let theta = (10.0 * x - 0.75) * ELASTIC_PERIOD;
    (-10.0 * x).exp2() * theta.sin() + 1.0
}

fn elastic_slope(x: f64) -> f64 {
    let theta = (10.0 * x - 0.75) * ELASTIC_PERIOD;
    let decay = (-10.0 * x).exp2();
    decay * 10.0 * (ELASTIC_PERIOD * theta.cos() - std::f64::consts::LN_2 * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bezier_rejects_x_out_of_range() {
        let result = CubicBezier::new(1.5, 0.0, 0.2, 1.0);
        match result {
            Err(MotionError::ControlPointOutOfRange { index, axis, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(axis, "x");
            }
            other => panic!("expected ControlPointOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn bezier_rejects_non_finite_y() {
        assert!(CubicBezier::new(0.4, f64::NAN, 0.2, 1.0).is_err());
        assert!(CubicBezier::new(0.4, 0.0, 0.2, f64::INFINITY).is_err());
    }

    #[test]
    fn bezier_allows_overshooting_y() {
        assert!(CubicBezier::new(0.34, 1.56, 0.64, 1.0).is_ok());
    }

    #[test]
    fn endpoints_are_exact() {
        let curves = [
            Easing::Linear,
            Easing::standard(),
            Easing::decelerate(),
            Easing::accelerate(),
            Easing::anticipate(),
            Easing::overshoot(),
            Easing::Bounce,
            Easing::Elastic,
        ];
        for curve in curves {
            assert_eq!(curve.value(0.0), 0.0, "{:?} at 0", curve);
            assert_eq!(curve.value(1.0), 1.0, "{:?} at 1", curve);
        }
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        let curve = Easing::standard();
        assert_eq!(curve.value(-0.5), 0.0);
        assert_eq!(curve.value(1.5), 1.0);
    }

    #[test]
    fn standard_curve_is_monotonic() {
        let curve = Easing::standard();
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = curve.value(i as f64 / 100.0);
            assert!(v >= prev, "dip at {}", i);
            prev = v;
        }
    }

    #[test]
    fn linear_bezier_matches_identity() {
        let curve = match CubicBezier::new(1.0 / 3.0, 1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0) {
            Ok(c) => c,
            Err(e) => panic!("unexpected error: {:?}", e),
        };
        for i in 0..=20 {
            let x = i as f64 / 20.0;
            assert_relative_eq!(curve.value(x), x, epsilon = 1e-6);
        }
    }

    #[test]
    fn linear_slope_is_one() {
        assert_eq!(Easing::Linear.slope(0.3), 1.0);
    }

    #[test]
    fn decelerate_starts_with_positive_slope() {
        let slope = Easing::decelerate().slope(0.0);
        assert!(slope > 1.0, "slope {}", slope);
    }

    #[test]
    fn flat_start_slope_is_exactly_zero() {
        assert_eq!(Easing::standard().slope(0.0), 0.0);
        assert_eq!(Easing::accelerate().slope(0.0), 0.0);
    }

    #[test]
    fn endpoint_slopes_are_analytic() {
        // decelerate (0, 0, 0.2, 1): both first derivatives vanish at
        // x = 0, so the limit comes from the second order, y2/x2 = 5.
        assert_relative_eq!(Easing::decelerate().slope(0.0), 5.0, epsilon = 1e-12);
        assert_eq!(Easing::decelerate().slope(1.0), 0.0);
        assert!(Easing::anticipate().slope(0.0) < 0.0);
        assert!(Easing::overshoot().slope(0.0) > 0.0);
    }

    #[test]
    fn bezier_slope_matches_secant() {
        let curve = Easing::decelerate();
        let h = 1e-4;
        for i in 1..10 {
            let x = i as f64 / 10.0;
            let secant = (curve.value(x + h) - curve.value(x - h)) / (2.0 * h);
            assert_relative_eq!(curve.slope(x), secant, epsilon = 1e-2);
        }
    }

    #[test]
    fn bounce_stays_in_unit_range() {
        for i in 0..=1000 {
            let v = bounce(i as f64 / 1000.0);
            assert!((0.0..=1.0).contains(&v), "bounce({}) = {}", i, v);
        }
    }

    #[test]
    fn bounce_lands_exactly() {
        assert_relative_eq!(bounce(1.0 - 1e-12), 1.0, epsilon = 1e-9);
        assert_eq!(bounce(1.0), 1.0);
    }

    #[test]
    fn elastic_starts_with_positive_slope() {
        let slope = elastic_slope(0.0);
        assert_relative_eq!(slope, 10.0 * std::f64::consts::LN_2, epsilon = 1e-9);
    }

    #[test]
    fn bounce_slope_is_zero_at_rebound_peaks() {
        // Each parabola bottoms out at its shift point.
        assert_relative_eq!(bounce_slope(1.5 / BOUNCE_D), 0.0, epsilon = 1e-12);
        assert_relative_eq!(bounce_slope(2.25 / BOUNCE_D), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn deserialization_validates_control_points() {
        let result: Result<CubicBezier, _> =
            serde_json::from_str(r#"{"x1":5.0,"y1":0.0,"x2":0.2,"y2":1.0}"#);
        assert!(result.is_err());
        let ok: Result<CubicBezier, _> =
            serde_json::from_str(r#"{"x1":0.4,"y1":0.0,"x2":0.2,"y2":1.0}"#);
        assert!(ok.is_ok());
    }

    #[test]
    fn easing_serializes_round_trip() {
        let curve = Easing::overshoot();
        let json = match serde_json::to_string(&curve) {
            Ok(j) => j,
            Err(e) => panic!("serialize failed: {}", e),
        };
        let back: Easing = match serde_json::from_str(&json) {
            Ok(c) => c,
            Err(e) => panic!("deserialize failed: {}", e),
        };
        assert_eq!(curve, back);
    }
}
