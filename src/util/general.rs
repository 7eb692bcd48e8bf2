//! General-purpose utility functions.

use crate::error::{Error, Result};

/// Converts a power value to decibels.
///
/// Zero and negative powers have no decibel value, so these (and `NaN`)
/// map to `NaN`.
#[inline]
pub fn pow2db(power: f64) -> f64 {
    if power > 0.0 {
        10.0 * power.log10()
    } else {
        f64::NAN
    }
}

/// In-place variant of `pow2db()`.
pub fn pow2db_in_place(powers: &mut [f64]) {
    powers.iter_mut().for_each(|p| *p = pow2db(*p));
}

/// Returns whether `value` lies within `tolerance` of `target`. Useful for
/// checking approximate equality.
pub fn within_tolerance(value: f64, target: f64, tolerance: f64) -> bool {
    (value - target).abs() <= tolerance
}

/// The FFT length used for a window of `window_len` samples: the smallest
/// power of two which is at least `max(window_len, min_len)`.
///
/// # Errors
///
/// Returns [`Error::Config`] if that power of two does not fit in a `usize`.
pub fn fft_len(window_len: usize, min_len: usize) -> Result<usize> {
    let len = window_len.max(min_len);

    len.checked_next_power_of_two().ok_or_else(|| {
        Error::Config(format!(
            "FFT length for {len} samples overflows a power of two"
        ))
    })
}

/// The arithmetic mean of `values`, or `NaN` if it is empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    values.iter().sum::<f64>() / values.len() as f64
}

/// The median of `values`, averaging the two central values for
/// even-length input. Returns `NaN` if `values` is empty.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Converts a duration in seconds to a whole number of samples, rounding
/// halfway cases to the nearest even count.
///
/// The second value is `true` if the duration was not an exact number of
/// samples.
pub fn secs_to_samples(secs: f64, sample_rate: f64) -> (usize, bool) {
    let exact = secs * sample_rate;
    let rounded = exact.round_ties_even();

    (rounded.max(0.0) as usize, exact.fract() != 0.0)
}
