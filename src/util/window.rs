//! Module containing window functions and buffer helpers.

use std::f64::consts::TAU;

/// Multiplies each element of both buffers together.
///
/// Requires `target.len() <= other.len()`
pub fn multiply_buffers(target: &mut [f64], other: &[f64]) {
    debug_assert!(target.len() <= other.len());
    target.iter_mut().zip(other).for_each(|(a, b)| *a *= *b);
}

/// This function is used for the "cosine sum" family of windows. The
/// periodic formulation is used, as it suits FFT-based analysis.
fn cosine_sum(slice: &mut [f64], coeffs: &[f64]) {
    let size = slice.len() as f64;

    for (n, x) in slice.iter_mut().enumerate() {
        let mut sum = 0.0;

        // we skip 1 because the first element is only used later
        // and so that we don't multiply τ by 0
        for (i, coeff) in coeffs.iter().enumerate().skip(1) {
            let s1 = ((i as f64 * TAU) * (n as f64) / size).cos();
            sum += coeff * s1;
        }

        *x = coeffs[0] - sum;
    }
}

/// A periodic Hann window.
pub fn hann(size: usize) -> Vec<f64> {
    let mut vec = vec![0.0; size];
    hann_in_place(&mut vec);
    vec
}

/// In-place variant of `hann()`.
pub fn hann_in_place(slice: &mut [f64]) {
    cosine_sum(slice, &[0.5, 0.5]);
}
