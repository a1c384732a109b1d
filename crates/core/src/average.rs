//! Average arithmetic for venue aggregates
//!
//! Pure numeric routines, no I/O. Every result is rounded to two decimal
//! places (half away from zero) at each step, matching the precision the
//! venue record persists, so replaying the same inputs reproduces the same
//! aggregate.
//!
//! Two addition rules exist:
//! - [`add_value_to_average`]: the prior average counts as one sample
//! - [`add_value_weighted`]: the prior average is weighted by its sample count
//!
//! Removal always weights by the count supplied by the caller.

/// Number of decimal digits kept on every average
pub const DECIMAL_PLACES: i32 = 2;

/// Tolerance applied before rounding so that values such as `2.245`, whose
/// binary form sits just below the half, still round away from zero.
const ROUNDING_EPSILON: f64 = 1e-9;

/// Round to [`DECIMAL_PLACES`] digits, half away from zero
pub fn round_to_precision(value: f64) -> f64 {
    let scale = 10f64.powi(DECIMAL_PLACES);
    let scaled = value * scale;
    (scaled + scaled.signum() * ROUNDING_EPSILON).round() / scale
}

/// Average of the present values, rounded; `None` if no value is present
pub fn average_ignoring_absent<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(round_to_precision(sum / count as f64))
    }
}

/// Fold a new value into an average, treating the average as one sample
///
/// Equivalent to `average_ignoring_absent([new_value, current_average])`.
/// An absent `new_value` leaves the average unchanged.
pub fn add_value_to_average(new_value: Option<f64>, current_average: Option<f64>) -> Option<f64> {
    if new_value.is_none() {
        return current_average;
    }
    average_ignoring_absent([new_value, current_average])
}

/// Fold a new value into an average built from `samples_before` values
///
/// An absent `new_value` leaves the average unchanged. With no prior samples
/// (or no prior average) the result is the new value itself.
pub fn add_value_weighted(
    new_value: Option<f64>,
    current_average: Option<f64>,
    samples_before: u32,
) -> Option<f64> {
    let Some(value) = new_value else {
        return current_average;
    };
    match current_average {
        Some(avg) if samples_before > 0 => {
            let n = samples_before as f64;
            Some(round_to_precision((avg * n + value) / (n + 1.0)))
        }
        _ => Some(round_to_precision(value)),
    }
}

/// Take a value back out of an average built from `count_before_removal` values
///
/// An absent `value_to_remove` leaves the average unchanged.
///
/// # Contract
///
/// `count_before_removal` must be at least 2. Removing the last sample is
/// handled by the caller (the venue or category becomes absent), never here.
pub fn remove_value_from_average(
    value_to_remove: Option<f64>,
    current_average: f64,
    count_before_removal: u32,
) -> f64 {
    let Some(value) = value_to_remove else {
        return current_average;
    };
    debug_assert!(
        count_before_removal >= 2,
        "removing from an average of {} samples",
        count_before_removal
    );
    let n = count_before_removal as f64;
    round_to_precision((current_average * n - value) / (n - 1.0))
}
