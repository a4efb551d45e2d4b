//! Score scaling onto the shared `[0, 100]` range.

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;
/// Returned when a range collapses and there is nothing to compare against.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Clamps into `[0, 100]`; NaN becomes 0.
pub fn bounded(score: f64) -> f64 {
    if score.is_nan() {
        return MIN_SCORE;
    }
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// Linear rescale of `value` from `[min, max]`.
pub fn linear(value: f64, min: f64, max: f64) -> f64 {
    let collapsed = max.is_nan() || min.is_nan() || max <= min;
    if collapsed || !value.is_finite() {
        return NEUTRAL_SCORE;
    }
    bounded((value - min) / (max - min) * MAX_SCORE)
}

/// Min-max normalization against statistics gathered over a candidate set.
pub fn min_max(value: f64, min: f64, max: f64) -> f64 {
    linear(value, min, max)
}

/// Min-max over `ln(1 + x)`, damping the influence of very large counts.
pub fn log_scaled(value: f64, min: f64, max: f64) -> f64 {
    let log = |x: f64| x.max(0.0).ln_1p();
    linear(log(value), log(min), log(max))
}
