//! Band power and averaged power spectra, both built on Welch's method.

use crate::dsp::{welch, WelchSpectrum};
use crate::prelude::*;
use serde::Serialize;
use tracing::debug;

/// The mean power spectral density of a signal within one band.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandPower {
    pub name: String,
    pub low: f64,
    pub high: f64,
    /// Mean density in units²/Hz; `NaN` if no spectral bin falls in the
    /// band.
    pub power: f64,
}

/// Computes the power of `signal` in each of `bands`, given as
/// `(name, low Hz, high Hz)` with inclusive edges.
///
/// The spectrum is a Welch estimate with segments of
/// [`DEFAULT_WELCH_SEGMENT_LEN`] samples and 50% overlap.
///
/// # Errors
///
/// Fails if the Welch estimate fails; see [`welch()`].
pub fn band_powers(
    signal: &[f64],
    sample_rate: f64,
    bands: &[(&str, f64, f64)],
) -> Result<Vec<BandPower>> {
    let spectrum = welch(signal, sample_rate, DEFAULT_WELCH_SEGMENT_LEN, None)?;

    Ok(bands
        .iter()
        .map(|&(name, low, high)| BandPower {
            name: name.to_string(),
            low,
            high,
            power: spectrum.band_mean(low, high).abs(),
        })
        .collect())
}

/// Splits `signal` into consecutive, non-overlapping chunks of
/// `window_secs` seconds, and averages the Welch spectra of the chunks.
///
/// The first `drop_first` and last `drop_last` chunks are left out, as is
/// any incomplete chunk at the end of the signal.
///
/// # Errors
///
/// Returns [`Error::Config`] if a chunk would be shorter than one sample,
/// or if the dropped chunks would leave none to average.
pub fn average_power_spectrum(
    signal: &[f64],
    sample_rate: f64,
    window_secs: f64,
    drop_first: usize,
    drop_last: usize,
) -> Result<WelchSpectrum> {
    if !(window_secs.is_finite() && window_secs > 0.0) {
        return Err(Error::Config(format!(
            "chunk duration must be a positive number of seconds, got {window_secs}"
        )));
    }

    // truncated, not rounded
    let chunk_len = (window_secs * sample_rate) as usize;

    if chunk_len == 0 {
        return Err(Error::Config(format!(
            "chunk duration of {window_secs} s is shorter than one sample at {sample_rate} Hz"
        )));
    }

    let num_chunks = signal.len() / chunk_len;

    if drop_first + drop_last >= num_chunks {
        return Err(Error::Config(format!(
            "dropping {drop_first} leading and {drop_last} trailing chunks leaves \
             none of the {num_chunks} available"
        )));
    }

    let kept = drop_first..num_chunks - drop_last;
    debug!(num_chunks, ?kept, chunk_len, "averaging chunk spectra");

    let mut average = WelchSpectrum::default();

    for chunk in signal.chunks_exact(chunk_len).take(kept.end).skip(kept.start) {
        let spectrum = welch(chunk, sample_rate, chunk_len, Some(chunk_len / 2))?;

        if average.psd.is_empty() {
            average = spectrum;
        } else {
            for (acc, p) in average.psd.iter_mut().zip(&spectrum.psd) {
                *acc += p;
            }
        }
    }

    let count = kept.len() as f64;
    average.psd.iter_mut().for_each(|p| *p /= count);

    Ok(average)
}
