//! Welch's averaged periodogram.

use crate::dsp::Detrend;
use crate::prelude::*;
use realfft::RealFftPlanner;

/// A one-sided power spectral density estimate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WelchSpectrum {
    /// Bin frequencies in Hz, from DC to Nyquist.
    pub freqs: Vec<f64>,
    /// Power spectral density in units²/Hz.
    pub psd: Vec<f64>,
}

impl WelchSpectrum {
    /// The frequency resolution in Hz.
    pub fn resolution(&self) -> f64 {
        self.freqs.get(1).copied().unwrap_or(0.0)
    }

    /// The mean density of the bins within `[low, high]` Hz, or `NaN` if no
    /// bin falls in that range.
    pub fn band_mean(&self, low: f64, high: f64) -> f64 {
        let in_band: Vec<f64> = self
            .freqs
            .iter()
            .zip(&self.psd)
            .filter(|(&f, _)| low <= f && f <= high)
            .map(|(_, &p)| p)
            .collect();

        mean(&in_band)
    }
}

/// Estimates the power spectral density of `signal` with Welch's method.
///
/// Segments of `segment_len` samples (shortened to the signal length if
/// needed) overlap by `overlap` samples, or by half a segment when `None`.
/// Each segment has its mean removed and a periodic Hann window applied
/// before its periodogram is taken; the periodograms are averaged.
///
/// # Errors
///
/// Returns [`Error::Size`] for an empty signal, and [`Error::Config`] for a
/// zero segment length, a non-positive sample rate, or an overlap which is
/// not shorter than the segment.
pub fn welch(
    signal: &[f64],
    sample_rate: f64,
    segment_len: usize,
    overlap: Option<usize>,
) -> Result<WelchSpectrum> {
    if signal.is_empty() {
        return Err(Error::Size(String::from(
            "Welch's method requires at least 1 sample, got 0",
        )));
    }
    if segment_len == 0 {
        return Err(Error::Config(String::from(
            "Welch segment length must be positive, got 0",
        )));
    }
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(Error::Config(format!(
            "sample rate must be positive, got {sample_rate}"
        )));
    }

    let segment_len = segment_len.min(signal.len());
    let overlap = overlap.unwrap_or(segment_len / 2);

    if overlap >= segment_len {
        return Err(Error::Config(format!(
            "Welch overlap ({overlap}) must be shorter than the segment length ({segment_len})"
        )));
    }

    let step = segment_len - overlap;
    let num_segments = (signal.len() - overlap) / step;

    let window = hann(segment_len);
    let window_energy: f64 = window.iter().map(|w| w * w).sum();
    let scale = (sample_rate * window_energy).recip();

    let fft = RealFftPlanner::<f64>::new().plan_fft_forward(segment_len);
    let mut buffer = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();
    let mut psd = vec![0.0; spectrum.len()];

    for seg in 0..num_segments {
        let start = seg * step;
        buffer.copy_from_slice(&signal[start..start + segment_len]);

        Detrend::Constant.apply(&mut buffer);
        multiply_buffers(&mut buffer, &window);

        fft.process(&mut buffer, &mut spectrum)?;

        for (p, bin) in psd.iter_mut().zip(&spectrum) {
            *p += bin.norm_sqr() * scale;
        }
    }

    // fold the negative frequencies onto the positive ones, leaving DC and
    // (for even lengths) Nyquist alone
    let last = psd.len() - 1;
    let fold_end = if segment_len % 2 == 0 { last } else { last + 1 };
    psd[1..fold_end].iter_mut().for_each(|p| *p *= 2.0);

    psd.iter_mut().for_each(|p| *p /= num_segments as f64);

    let freqs = (0..psd.len())
        .map(|k| k as f64 * sample_rate / segment_len as f64)
        .collect();

    Ok(WelchSpectrum { freqs, psd })
}
