use thiserror::Error;

/// Errors produced while configuring easing curves and motion profiles.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    /// A bezier control point coordinate is outside its valid range.
    ///
    /// Control-point x coordinates must stay in `[0, 1]` so the curve is
    /// a function of the time fraction; y coordinates only have to be
    /// finite (overshoot/anticipate shapes leave `[0, 1]` on purpose).
    #[error("control point {index} {axis} coordinate {value} is outside its valid range")]
    ControlPointOutOfRange {
        /// Which control point (1 or 2).
        index: usize,
        /// Which coordinate ("x" or "y").
        axis: &'static str,
        /// The offending value.
        value: f64,
    },

    /// A position or velocity input was NaN or infinite.
    #[error("{name} must be finite, got {value}")]
    NonFiniteInput {
        /// Parameter name as passed to the configure call.
        name: &'static str,
        /// The offending value.
        value: f64,
    },

    /// A motion limit was zero, negative, NaN, or infinite.
    #[error("{name} limit must be positive and finite, got {value}")]
    InvalidLimit {
        /// Which limit ("velocity", "acceleration" or "duration").
        name: &'static str,
        /// The offending value.
        value: f64,
    },

    /// The easing curve starts flat (or reversed), so it cannot be
    /// spliced onto a profile without a velocity discontinuity.
    #[error("easing curve has non-positive initial slope {slope}; cannot preserve splice velocity")]
    FlatEasingStart {
        /// The curve's slope at time fraction zero.
        slope: f64,
    },
}
