//! # drag2d_motion
//!
//! A small library for computing 2D drag/fling motion profiles in Rust.
//!
//! This library provides the following modules:
//! - `easing` for bezier/bounce/elastic curves remapping elapsed time to progress.
//! - `stage` for describing a single constant-acceleration motion segment.
//! - `profile` for solving a 1-D acceleration–cruise–deceleration profile.
//! - `profile2d` for synchronizing two 1-D profiles into one 2-D motion.
//! - `sampler` for sampling a synchronized motion in discrete ticks.

pub mod easing;
pub mod error;
pub mod profile;
pub mod profile2d;
pub mod sampler;
pub mod stage;

// Re-export main structs for convenience:
pub use easing::{CubicBezier, Easing};
pub use error::MotionError;
pub use profile::{Limits, MotionProfile};
pub use profile2d::{Axis, MotionProfile2d};
pub use sampler::FrameSampler;
pub use stage::Stage;
