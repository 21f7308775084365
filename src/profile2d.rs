//! 2-D motion synchronizer.
//!
//! Solves the X and Y axes independently under shared limits, then
//! stretches the faster axis to the duration of the slower (dominant)
//! one so a drag or fling finishes both axes at the same instant.
//! After stretching, both stage lists are rebuilt on the union of the
//! two boundary-time sets, so the axes carry identical stage boundaries
//! and the same stage count.

use tracing::debug;

use crate::easing::Easing;
use crate::error::MotionError;
use crate::profile::{Limits, MotionProfile, EPS_TIME};

/// Which axis dictates the synchronized duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// A pair of 1-D profiles synchronized to a common duration.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionProfile2d {
    x: MotionProfile,
    y: MotionProfile,
    dominant: Axis,
    duration: f64,
}

impl MotionProfile2d {
    /// Solves both axes and synchronizes them.
    pub fn configure(
        start: (f64, f64),
        end: (f64, f64),
        start_vel: (f64, f64),
        limits: Limits,
    ) -> Result<Self, MotionError> {
        let mut x = MotionProfile::configure(start.0, end.0, start_vel.0, limits)?;
        let mut y = MotionProfile::configure(start.1, end.1, start_vel.1, limits)?;

        let dominant = if x.duration() >= y.duration() {
            Axis::X
        } else {
            Axis::Y
        };
        let duration = x.duration().max(y.duration());

        if duration > EPS_TIME {
            match dominant {
                Axis::X => y.stretch_to(duration),
                Axis::Y => x.stretch_to(duration),
            }
            let boundaries = merged_boundaries(&x, &y, duration);
            x = x.resample(&boundaries);
            y = y.resample(&boundaries);
        }

        debug!(
            ?dominant,
            duration,
            stages = x.stage_count(),
            "axes synchronized"
        );
        Ok(Self {
            x,
            y,
            dominant,
            duration,
        })
    }

    /// Grafts the easing onto the final stage of both axes, then
    /// re-stretches the faster axis so simultaneity survives the
    /// retiming.
    pub fn with_easing(mut self, easing: Easing) -> Result<Self, MotionError> {
        self.x = self.x.with_easing(easing)?;
        self.y = self.y.with_easing(easing)?;

        let duration = self.x.duration().max(self.y.duration());
        if self.x.duration() < duration {
            self.x.stretch_to(duration);
        }
        if self.y.duration() < duration {
            self.y.stretch_to(duration);
        }
        self.duration = duration;
        Ok(self)
    }

    pub fn position(&self, t: f64) -> (f64, f64) {
        (self.x.position(t), self.y.position(t))
    }

    pub fn velocity(&self, t: f64) -> (f64, f64) {
        (self.x.velocity(t), self.y.velocity(t))
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn dominant_axis(&self) -> Axis {
        self.dominant
    }

    /// Stage count, identical for both axes.
    pub fn stage_count(&self) -> usize {
        self.x.stage_count()
    }

    pub fn x(&self) -> &MotionProfile {
        &self.x
    }

    pub fn y(&self) -> &MotionProfile {
        &self.y
    }

    pub fn is_done(&self, t: f64) -> bool {
        t >= self.duration
    }
}

/// Union of both profiles' stage-boundary times, plus the interval
/// endpoints, sorted and deduplicated.
fn merged_boundaries(x: &MotionProfile, y: &MotionProfile, duration: f64) -> Vec<f64> {
    let mut times = Vec::with_capacity(2 + x.stage_count() * 2 + y.stage_count() * 2);
    times.push(0.0);
    times.push(duration);
    for profile in [x, y] {
        for stage in profile.stages() {
            times.push(stage.start_time);
            times.push(stage.end_time);
        }
    }
    times.retain(|t| t.is_finite() && *t >= 0.0 && *t <= duration);
    times.sort_by(|a, b| a.total_cmp(b));
    let tolerance = EPS_TIME * duration.max(1.0);
    times.dedup_by(|a, b| (*a - *b).abs() <= tolerance);
    times
}
