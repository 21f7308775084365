use serde::{Deserialize, Serialize};

/// A single constant-acceleration segment of a motion profile.
///
/// Velocity is linear in time across the segment, so position is the
/// start position plus the average of the entry velocity and the
/// instantaneous velocity, times the elapsed time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub start_time: f64,
    pub end_time: f64,
    pub start_pos: f64,
    pub end_pos: f64,
    pub start_vel: f64,
    pub end_vel: f64,
}

impl Stage {
    pub fn new(
        start_time: f64,
        end_time: f64,
        start_pos: f64,
        end_pos: f64,
        start_vel: f64,
        end_vel: f64,
    ) -> Self {
        Self {
            start_time,
            end_time,
            start_pos,
            end_pos,
            start_vel,
            end_vel,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn distance(&self) -> f64 {
        self.end_pos - self.start_pos
    }

    /// Constant acceleration over the segment (zero for a cruise or a
    /// degenerate zero-length segment).
    pub fn acceleration(&self) -> f64 {
        let dt = self.duration();
        if dt <= 0.0 {
            0.0
        } else {
            (self.end_vel - self.start_vel) / dt
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_time && t <= self.end_time
    }

    /// Instantaneous velocity at absolute time `t` (clamped to the
    /// segment bounds).
    pub fn velocity_at(&self, t: f64) -> f64 {
        let dt = self.duration();
        if dt <= 0.0 {
            return self.end_vel;
        }
        let f = ((t - self.start_time) / dt).clamp(0.0, 1.0);
        self.start_vel + (self.end_vel - self.start_vel) * f
    }

    /// Position at absolute time `t` (clamped to the segment bounds).
    pub fn position_at(&self, t: f64) -> f64 {
        let dt = self.duration();
        if dt <= 0.0 {
            return self.end_pos;
        }
        let t = t.clamp(self.start_time, self.end_time);
        let elapsed = t - self.start_time;
        self.start_pos + 0.5 * (self.start_vel + self.velocity_at(t)) * elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cruise_stage_is_linear() {
        let stage = Stage::new(1.0, 3.0, 10.0, 14.0, 2.0, 2.0);
        assert_eq!(stage.acceleration(), 0.0);
        assert_relative_eq!(stage.position_at(2.0), 12.0);
        assert_relative_eq!(stage.velocity_at(2.0), 2.0);
    }

    #[test]
    fn ramp_stage_integrates_velocity() {
        // Decelerate 4 -> 0 over 2s starting at pos 0: covers 4 units.
        let stage = Stage::new(0.0, 2.0, 0.0, 4.0, 4.0, 0.0);
        assert_relative_eq!(stage.acceleration(), -2.0);
        assert_relative_eq!(stage.velocity_at(1.0), 2.0);
        assert_relative_eq!(stage.position_at(1.0), 3.0);
        assert_relative_eq!(stage.position_at(2.0), 4.0);
    }

    #[test]
    fn sampling_clamps_to_bounds() {
        let stage = Stage::new(0.0, 2.0, 0.0, 4.0, 4.0, 0.0);
        assert_relative_eq!(stage.position_at(-1.0), 0.0);
        assert_relative_eq!(stage.position_at(5.0), 4.0);
        assert_relative_eq!(stage.velocity_at(5.0), 0.0);
    }

    #[test]
    fn zero_length_stage_reports_end_state() {
        let stage = Stage::new(1.0, 1.0, 2.0, 2.0, 0.0, 0.0);
        assert_eq!(stage.position_at(1.0), 2.0);
        assert_eq!(stage.acceleration(), 0.0);
    }
}
