use crate::profile2d::MotionProfile2d;

/// Samples a synchronized 2-D profile in discrete ticks at a fixed
/// frequency, the way an animation loop consumes it: one `tick` per
/// frame, then read the current position.
#[derive(Clone, Debug)]
pub struct FrameSampler {
    profile: MotionProfile2d,

    /// Sampling frequency in Hz.
    freq: f64,

    /// Current frame index.
    tick: u64,

    /// Frame index at (or past) the profile end.
    last_tick: u64,
}

impl FrameSampler {
    /// Creates a sampler over `profile` running at `freq` Hz.
    pub fn new(profile: MotionProfile2d, freq: u16) -> Self {
        let freq = f64::from(freq.max(1));
        let last_tick = (profile.duration() * freq).ceil() as u64;
        Self {
            profile,
            freq,
            tick: 0,
            last_tick,
        }
    }

    /// Advances one frame. Does nothing once the motion is finished, so
    /// the sampler parks on the end state.
    pub fn tick(&mut self) {
        if self.tick < self.last_tick {
            self.tick += 1;
        }
    }

    /// Elapsed time at the current frame, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.tick as f64 / self.freq
    }

    /// Current (x, y) position.
    pub fn position(&self) -> (f64, f64) {
        self.profile.position(self.elapsed())
    }

    /// Current (x, y) velocity.
    pub fn velocity(&self) -> (f64, f64) {
        self.profile.velocity(self.elapsed())
    }

    pub fn is_done(&self) -> bool {
        self.tick >= self.last_tick
    }

    pub fn profile(&self) -> &MotionProfile2d {
        &self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Limits;
    use approx::assert_relative_eq;

    fn profile() -> MotionProfile2d {
        let limits = match Limits::new(10.0, 10.0, 100.0) {
            Ok(l) => l,
            Err(e) => panic!("unexpected error: {:?}", e),
        };
        match MotionProfile2d::configure((0.0, 0.0), (20.0, 8.0), (0.0, 0.0), limits) {
            Ok(p) => p,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    #[test]
    fn runs_to_the_destination() {
        let profile = profile();
        let end = (profile.position(profile.duration()).0, 8.0);
        let mut sampler = FrameSampler::new(profile, 60);
        let mut guard = 0;
        while !sampler.is_done() {
            sampler.tick();
            guard += 1;
            assert!(guard < 100_000, "sampler never finished");
        }
        let (x, y) = sampler.position();
        assert_relative_eq!(x, end.0, epsilon = 1e-9);
        assert_relative_eq!(y, end.1, epsilon = 1e-9);
        let (vx, vy) = sampler.velocity();
        assert_eq!(vx, 0.0);
        assert_eq!(vy, 0.0);
    }

    #[test]
    fn ticking_past_the_end_parks_on_the_end_state() {
        let mut sampler = FrameSampler::new(profile(), 60);
        for _ in 0..100_000 {
            sampler.tick();
        }
        let elapsed = sampler.elapsed();
        sampler.tick();
        assert_eq!(sampler.elapsed(), elapsed);
    }

    #[test]
    fn frames_are_evenly_spaced() {
        let mut sampler = FrameSampler::new(profile(), 100);
        sampler.tick();
        assert_relative_eq!(sampler.elapsed(), 0.01);
        sampler.tick();
        assert_relative_eq!(sampler.elapsed(), 0.02);
    }

    #[test]
    fn zero_frequency_is_clamped() {
        let sampler = FrameSampler::new(profile(), 0);
        assert!(sampler.elapsed().is_finite());
    }
}
