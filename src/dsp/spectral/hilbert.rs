//! FFT-based Hilbert transform.

use crate::prelude::*;
use realfft::RealFftPlanner;

/// Computes the analytic signal of `signal`.
///
/// The returned values are `x[n] + i·H{x}[n]`, where `H` is the Hilbert
/// transform. The imaginary part is found by rotating each positive
/// frequency bin by -90° and dropping the DC and Nyquist bins.
///
/// # Errors
///
/// Returns [`Error::Numerical`] if the FFT fails.
pub fn analytic_signal(signal: &[f64]) -> Result<Vec<Complex<f64>>> {
    let len = signal.len();

    if len == 0 {
        return Ok(Vec::new());
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(len);
    let ifft = planner.plan_fft_inverse(len);

    let mut input = signal.to_vec();
    let mut spectrum = fft.make_output_vec();
    fft.process(&mut input, &mut spectrum)?;

    let last = spectrum.len() - 1;

    for (k, bin) in spectrum.iter_mut().enumerate() {
        let is_nyquist = len % 2 == 0 && k == last;

        *bin = if k == 0 || is_nyquist {
            Complex::default()
        } else {
            // -i · X[k]
            Complex::new(bin.im, -bin.re)
        };
    }

    let mut transformed = ifft.make_output_vec();
    ifft.process(&mut spectrum, &mut transformed)?;

    let scale = (len as f64).recip();

    Ok(signal
        .iter()
        .zip(&transformed)
        .map(|(&re, &im)| Complex::new(re, im * scale))
        .collect())
}
