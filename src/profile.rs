//! 1-D motion-profile solver.
//!
//! Given start/end position, a start velocity, and ceilings on peak
//! velocity, peak acceleration and total duration, selects one of four
//! canonical trajectory shapes and stores the result as
//! constant-acceleration stages:
//!
//! 1. pure ramp-down (braking distance already covers the travel)
//! 2. cruise then ramp-down (start velocity at or above the ceiling)
//! 3. ramp-up / ramp-down (triangular velocity profile)
//! 4. ramp-up / cruise / ramp-down (trapezoidal profile)
//!
//! The problem is folded onto the positive axis first (as the direction
//! sign), so every shape is solved for positive distance and unfolded
//! when the stages are stored.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::easing::Easing;
use crate::error::MotionError;
use crate::stage::Stage;

pub(crate) const EPS_DISTANCE: f64 = 1e-9;
pub(crate) const EPS_TIME: f64 = 1e-9;
const EPS_VELOCITY: f64 = 1e-9;

/// Ceilings a profile must respect.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Peak velocity magnitude.
    pub max_velocity: f64,
    /// Peak acceleration magnitude. The duration ceiling overrides this
    /// one when the two conflict; the velocity ceiling is never raised.
    pub max_acceleration: f64,
    /// Total duration ceiling in seconds.
    pub max_duration: f64,
}

impl Limits {
    /// Creates validated limits; every ceiling must be positive and finite.
    pub fn new(
        max_velocity: f64,
        max_acceleration: f64,
        max_duration: f64,
    ) -> Result<Self, MotionError> {
        let limits = Self {
            max_velocity,
            max_acceleration,
            max_duration,
        };
        limits.validate()?;
        Ok(limits)
    }

    /// Re-checks the ceilings (fields are public, so `configure` calls
    /// this again).
    pub fn validate(&self) -> Result<(), MotionError> {
        for (name, value) in [
            ("velocity", self.max_velocity),
            ("acceleration", self.max_acceleration),
            ("duration", self.max_duration),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MotionError::InvalidLimit { name, value });
            }
        }
        Ok(())
    }
}

/// Easing overlay replacing the sampling of the final stage.
#[derive(Clone, Copy, Debug, PartialEq)]
struct EasedTail {
    easing: Easing,
    splice_time: f64,
    splice_pos: f64,
    /// Signed distance remaining at the splice point.
    distance: f64,
    /// Retimed tail duration chosen so the initial slope matches the
    /// incoming velocity.
    duration: f64,
}

impl EasedTail {
    fn position(&self, t: f64) -> f64 {
        let u = (t - self.splice_time) / self.duration;
        self.splice_pos + self.distance * self.easing.value(u)
    }

    fn velocity(&self, t: f64) -> f64 {
        let u = (t - self.splice_time) / self.duration;
        self.distance * self.easing.slope(u) / self.duration
    }
}

/// A solved 1-D motion profile: at most three constant-acceleration
/// stages ending at rest on the destination, optionally reshaped by an
/// easing overlay on the final stage.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionProfile {
    stages: Vec<Stage>,
    duration: f64,
    start_pos: f64,
    end_pos: f64,
    start_vel: f64,
    tail: Option<EasedTail>,
}

impl MotionProfile {
    /// Solves a profile from `start_pos` to `end_pos` entering at
    /// `start_vel`, honoring `limits`.
    pub fn configure(
        start_pos: f64,
        end_pos: f64,
        start_vel: f64,
        limits: Limits,
    ) -> Result<Self, MotionError> {
        for (name, value) in [
            ("start_pos", start_pos),
            ("end_pos", end_pos),
            ("start_vel", start_vel),
        ] {
            if !value.is_finite() {
                return Err(MotionError::NonFiniteInput { name, value });
            }
        }
        limits.validate()?;

        let delta = end_pos - start_pos;
        if delta.abs() <= EPS_DISTANCE {
            debug!(start_pos, end_pos, "zero-distance motion, empty profile");
            return Ok(Self {
                stages: Vec::new(),
                duration: 0.0,
                start_pos,
                end_pos,
                start_vel,
                tail: None,
            });
        }

        let direction = delta.signum();
        let folded = solve(delta.abs(), start_vel * direction, limits);

        // Unfold back onto the caller's axis.
        let stages: Vec<Stage> = folded
            .iter()
            .map(|s| {
                Stage::new(
                    s.start_time,
                    s.end_time,
                    start_pos + direction * s.start_pos,
                    start_pos + direction * s.end_pos,
                    direction * s.start_vel,
                    direction * s.end_vel,
                )
            })
            .collect();
        let duration = stages.last().map(|s| s.end_time).unwrap_or(0.0);

        Ok(Self {
            stages,
            duration,
            start_pos,
            end_pos,
            start_vel,
            tail: None,
        })
    }

    /// Grafts an easing curve onto the final stage, retiming it so the
    /// slope at the splice point matches the incoming velocity.
    ///
    /// The easing must start with a strictly positive slope; a flat
    /// start would introduce a velocity discontinuity and is refused.
    pub fn with_easing(mut self, easing: Easing) -> Result<Self, MotionError> {
        let Some(last) = self.stages.last().copied() else {
            return Ok(self);
        };
        if last.start_vel.abs() <= EPS_VELOCITY || last.distance().abs() <= EPS_DISTANCE {
            debug!("final stage carries no motion, easing skipped");
            return Ok(self);
        }

        let slope = easing.slope(0.0);
        if !slope.is_finite() || slope <= 0.0 {
            return Err(MotionError::FlatEasingStart { slope });
        }

        // distance and entry velocity share a sign, so the retimed
        // duration is positive.
        let duration = last.distance() / last.start_vel * slope;
        self.tail = Some(EasedTail {
            easing,
            splice_time: last.start_time,
            splice_pos: last.start_pos,
            distance: last.distance(),
            duration,
        });
        self.duration = last.start_time + duration;
        debug!(
            splice_time = last.start_time,
            tail_duration = duration,
            "easing grafted onto final stage"
        );
        Ok(self)
    }

    /// Position at absolute time `t`. Before the start the profile holds
    /// the start position; after the end it rests on the destination.
    pub fn position(&self, t: f64) -> f64 {
        if let Some(tail) = &self.tail {
            if t >= tail.splice_time {
                if t >= self.duration {
                    return self.end_pos;
                }
                return tail.position(t);
            }
        }
        if t >= self.duration {
            return self.end_pos;
        }
        if t <= 0.0 {
            return self.start_pos;
        }
        match self.stages.iter().find(|s| t <= s.end_time) {
            Some(stage) => stage.position_at(t),
            None => self.end_pos,
        }
    }

    /// Velocity at absolute time `t`. Before the start the profile holds
    /// the start velocity; after the end it is zero.
    pub fn velocity(&self, t: f64) -> f64 {
        if let Some(tail) = &self.tail {
            if t >= tail.splice_time {
                if t >= self.duration {
                    return 0.0;
                }
                return tail.velocity(t);
            }
        }
        if t >= self.duration {
            return 0.0;
        }
        if t <= 0.0 {
            return self.start_vel;
        }
        match self.stages.iter().find(|s| t <= s.end_time) {
            Some(stage) => stage.velocity_at(t),
            None => 0.0,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// The underlying kinematic plan. When an easing is grafted, the
    /// final stage describes the motion the overlay replaced.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn start_position(&self) -> f64 {
        self.start_pos
    }

    pub fn end_position(&self) -> f64 {
        self.end_pos
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Uniformly retimes the whole profile to `target` seconds: times
    /// scale by `target / duration`, velocities by the inverse, so every
    /// stage still covers the same distance.
    pub(crate) fn stretch_to(&mut self, target: f64) {
        if self.duration <= EPS_TIME || target <= EPS_TIME {
            return;
        }
        let scale = target / self.duration;
        for stage in &mut self.stages {
            stage.start_time *= scale;
            stage.end_time *= scale;
            stage.start_vel /= scale;
            stage.end_vel /= scale;
        }
        if let Some(tail) = &mut self.tail {
            tail.splice_time *= scale;
            tail.duration *= scale;
        }
        self.start_vel /= scale;
        self.duration = target;
    }

    /// Rebuilds the stage list on the given boundary times. Exact as
    /// long as every original stage boundary is among `boundaries`,
    /// because splitting a constant-acceleration stage at an interior
    /// time yields two exact sub-stages. Only valid before easing is
    /// grafted.
    pub(crate) fn resample(&self, boundaries: &[f64]) -> Self {
        debug_assert!(self.tail.is_none());
        let mut stages = Vec::with_capacity(boundaries.len().saturating_sub(1));
        for pair in boundaries.windows(2) {
            let (t0, t1) = (pair[0], pair[1]);
            stages.push(Stage::new(
                t0,
                t1,
                self.position(t0),
                self.position(t1),
                self.velocity(t0),
                self.velocity(t1),
            ));
        }
        Self {
            stages,
            duration: boundaries.last().copied().unwrap_or(0.0),
            start_pos: self.start_pos,
            end_pos: self.end_pos,
            start_vel: self.start_vel,
            tail: None,
        }
    }
}

/// Case analysis in the direction-folded frame (distance positive,
/// velocity positive toward the target).
fn solve(d: f64, v0: f64, limits: Limits) -> Vec<Stage> {
    let max_v = limits.max_velocity;
    let max_a = limits.max_acceleration;
    let max_t = limits.max_duration;

    if v0 > 0.0 {
        let brake_dist = v0 * v0 / (2.0 * max_a);
        if brake_dist >= d {
            // Braking at the ceiling would overshoot; brake harder so we
            // stop exactly on the target.
            let t_stop = 2.0 * d / v0;
            if t_stop > max_t {
                if let Some(stages) = cruise_brake_for_budget(d, v0, max_t) {
                    debug!(
                        shape = "cruise + ramp-down",
                        duration = max_t,
                        "profile re-solved for the duration ceiling"
                    );
                    return stages;
                }
                warn!(t_stop, max_t, "ramp-down exceeds the duration ceiling");
            }
            debug!(shape = "ramp-down", duration = t_stop, "profile selected");
            return vec![Stage::new(0.0, t_stop, 0.0, d, v0, 0.0)];
        }
        if v0 >= max_v {
            // Already at the velocity ceiling: hold it, then brake.
            let brake_time = v0 / max_a;
            let cruise_dist = d - brake_dist;
            let cruise_time = cruise_dist / v0;
            if cruise_time + brake_time > max_t {
                if let Some(stages) = cruise_brake_for_budget(d, v0, max_t) {
                    debug!(
                        shape = "cruise + ramp-down",
                        duration = max_t,
                        "profile re-solved for the duration ceiling"
                    );
                    return stages;
                }
                warn!(
                    duration = cruise_time + brake_time,
                    max_t, "cruise profile exceeds the duration ceiling at the velocity ceiling"
                );
            }
            debug!(
                shape = "cruise + ramp-down",
                duration = cruise_time + brake_time,
                "profile selected"
            );
            return vec![
                Stage::new(0.0, cruise_time, 0.0, cruise_dist, v0, v0),
                Stage::new(cruise_time, cruise_time + brake_time, cruise_dist, d, v0, 0.0),
            ];
        }
    }

    // A start velocity pointing away from the target (v0 < 0) folds into
    // the ramp-up phase: v*dv = a*ds makes the peak formula hold for the
    // net displacement either way.
    let peak = (max_a * d + 0.5 * v0 * v0).sqrt();
    if peak <= max_v {
        let total = (2.0 * peak - v0) / max_a;
        if total <= max_t {
            debug!(shape = "ramp-up + ramp-down", duration = total, "profile selected");
            return triangle(d, v0, peak, max_a);
        }
    } else {
        let total = trapezoid_time(d, v0, max_v, max_a);
        if total <= max_t {
            debug!(
                shape = "ramp-up + cruise + ramp-down",
                duration = total,
                "profile selected"
            );
            return trapezoid(d, v0, max_v, max_a);
        }
    }

    // Over the duration ceiling: re-solve the acceleration from the time
    // budget. First try a triangular shape filling the budget exactly.
    let budget_a = triangle_accel_for_budget(d, v0, max_t);
    if budget_a.is_finite() && budget_a > 0.0 {
        let budget_peak = (budget_a * d + 0.5 * v0 * v0).sqrt();
        if budget_peak <= max_v {
            debug!(
                shape = "ramp-up + ramp-down",
                duration = max_t,
                acceleration = budget_a,
                "profile re-solved for the duration ceiling"
            );
            return triangle(d, v0, budget_peak, budget_a);
        }
    }

    // Triangular peak would break the velocity ceiling: cruise at the
    // ceiling and solve the acceleration that fills the budget.
    if max_v * max_t > d {
        let budget_a =
            (2.0 * max_v * max_v - 2.0 * max_v * v0 + v0 * v0) / (2.0 * (max_v * max_t - d));
        if budget_a.is_finite() && budget_a > 0.0 {
            let ramp_dist = (2.0 * max_v * max_v - v0 * v0) / (2.0 * budget_a);
            if ramp_dist <= d + EPS_DISTANCE {
                debug!(
                    shape = "ramp-up + cruise + ramp-down",
                    duration = max_t,
                    acceleration = budget_a,
                    "profile re-solved for the duration ceiling"
                );
                return trapezoid(d, v0, max_v, budget_a);
            }
        }
    }

    // The budget cannot be met without breaking the velocity ceiling.
    warn!(
        max_t,
        "duration ceiling infeasible, falling back to the acceleration-limited profile"
    );
    if peak <= max_v {
        triangle(d, v0, peak, max_a)
    } else {
        trapezoid(d, v0, max_v, max_a)
    }
}

/// Accelerate `v0 -> peak`, then decelerate `peak -> 0`, with the final
/// stage snapped onto the exact destination.
fn triangle(d: f64, v0: f64, peak: f64, accel: f64) -> Vec<Stage> {
    let t1 = (peak - v0) / accel;
    let d1 = (peak * peak - v0 * v0) / (2.0 * accel);
    let t2 = peak / accel;
    vec![
        Stage::new(0.0, t1, 0.0, d1, v0, peak),
        Stage::new(t1, t1 + t2, d1, d, peak, 0.0),
    ]
}

/// Accelerate `v0 -> cruise`, hold, decelerate `cruise -> 0`.
fn trapezoid(d: f64, v0: f64, cruise: f64, accel: f64) -> Vec<Stage> {
    let t1 = (cruise - v0) / accel;
    let d1 = (cruise * cruise - v0 * v0) / (2.0 * accel);
    let t3 = cruise / accel;
    let d3 = cruise * cruise / (2.0 * accel);
    let d2 = (d - d1 - d3).max(0.0);
    let t2 = d2 / cruise;
    vec![
        Stage::new(0.0, t1, 0.0, d1, v0, cruise),
        Stage::new(t1, t1 + t2, d1, d1 + d2, cruise, cruise),
        Stage::new(t1 + t2, t1 + t2 + t3, d1 + d2, d, cruise, 0.0),
    ]
}

fn trapezoid_time(d: f64, v0: f64, cruise: f64, accel: f64) -> f64 {
    let t1 = (cruise - v0) / accel;
    let d1 = (cruise * cruise - v0 * v0) / (2.0 * accel);
    let t3 = cruise / accel;
    let d3 = cruise * cruise / (2.0 * accel);
    let d2 = (d - d1 - d3).max(0.0);
    t1 + d2 / cruise + t3
}

/// Cruise at `v0`, then brake to rest on the target, with the brake
/// deceleration chosen so the whole motion takes exactly `t_budget`.
///
/// Total time is `(d + brake_dist) / v0`, so `brake_dist = v0*t_budget - d`.
/// Infeasible when that is not positive: `d / v0` (cruising the whole
/// way) is the shortest any profile entering at `v0` can take.
fn cruise_brake_for_budget(d: f64, v0: f64, t_budget: f64) -> Option<Vec<Stage>> {
    let brake_dist = v0 * t_budget - d;
    if brake_dist <= EPS_DISTANCE || brake_dist >= d - EPS_DISTANCE {
        return None;
    }
    let cruise_dist = d - brake_dist;
    let cruise_time = cruise_dist / v0;
    let brake_time = 2.0 * brake_dist / v0;
    Some(vec![
        Stage::new(0.0, cruise_time, 0.0, cruise_dist, v0, v0),
        Stage::new(cruise_time, cruise_time + brake_time, cruise_dist, d, v0, 0.0),
    ])
}

/// Acceleration making a triangular profile cover distance `d` from
/// start velocity `v0` in exactly `t_budget` seconds.
///
/// From `total = (2*peak - v0) / a` and `peak² = a*d + v0²/2`:
/// `a²T² + 2a(T*v0 - 2d) - v0² = 0`, solved for the positive root.
fn triangle_accel_for_budget(d: f64, v0: f64, t_budget: f64) -> f64 {
    let half_b = t_budget * v0 - 2.0 * d;
    let discriminant = half_b * half_b + t_budget * t_budget * v0 * v0;
    (-half_b + discriminant.sqrt()) / (t_budget * t_budget)
}
