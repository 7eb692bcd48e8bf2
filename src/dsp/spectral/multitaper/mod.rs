//! Multitaper spectrogram estimation.
//!
//! A series is cut into overlapping windows. Each window is detrended,
//! multiplied by a set of DPSS tapers and transformed, and the
//! magnitude-squared spectra of the tapers are averaged. The per-window
//! estimates may be computed on a pool of worker threads; they are always
//! reassembled in window order.

pub mod aggregate;
pub mod config;
pub mod estimator;
pub mod freqs;
pub mod metadata;
pub mod segments;

pub use config::{
    Adjustment, AdjustmentKind, MultitaperConfig, Parallelism, ResolvedConfig,
};
pub use metadata::SpectrogramMetadata;

use crate::dsp::{SeriesInput, TaperSet};
use crate::prelude::*;
use aggregate::{assemble, estimate_segments};
use estimator::SegmentEstimator;
use freqs::FrequencyAxis;
use segments::{segment_times, window_starts};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// A time-frequency power estimate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Spectrogram {
    /// Power indexed `[frequency][segment]`, in units²/Hz.
    pub power: Vec<Vec<f64>>,
    /// The midpoint of each segment, in seconds.
    pub times: Vec<f64>,
    /// The frequency of each row, in Hz.
    pub freqs: Vec<f64>,
    pub metadata: SpectrogramMetadata,
}

impl Spectrogram {
    /// `(frequencies, segments)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.freqs.len(), self.times.len())
    }

    /// The power matrix in decibels. Zero power maps to `NaN`.
    pub fn to_db(&self) -> Vec<Vec<f64>> {
        self.power
            .iter()
            .map(|row| {
                let mut row = row.clone();
                pow2db_in_place(&mut row);
                row
            })
            .collect()
    }

    /// The power of each frequency averaged over all segments.
    pub fn mean_spectrum(&self) -> Vec<f64> {
        self.power.iter().map(|row| mean(row)).collect()
    }

    /// The power of every frequency in segment `t`, or `None` if there is
    /// no such segment.
    pub fn column(&self, t: usize) -> Option<Vec<f64>> {
        (t < self.times.len())
            .then(|| self.power.iter().map(|row| row[t]).collect())
    }

    /// The frequency with the greatest power in segment `t`.
    pub fn peak_frequency(&self, t: usize) -> Option<f64> {
        let column = self.column(t)?;

        column
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(f, _)| self.freqs[f])
    }
}

/// Computes the multitaper spectrogram of `series`, sampled at
/// `sample_rate` Hz.
///
/// Options the series cannot honour exactly (a band above Nyquist, a
/// non-canonical taper count, windows which are not a whole number of
/// samples) are adjusted, logged at `WARN` and listed in the returned
/// metadata.
///
/// # Errors
///
/// - [`Error::Shape`] if `series` is not one-dimensional.
/// - [`Error::Config`] for invalid options.
/// - [`Error::Size`] if `series` is shorter than one window.
/// - [`Error::Numerical`] if the taper or FFT routines fail on any segment,
///   in which case no partial result is returned.
/// - [`Error::ThreadPool`] if the worker pool cannot be started.
pub fn compute_multitaper_spectrogram<S: SeriesInput + ?Sized>(
    series: &S,
    sample_rate: f64,
    config: &MultitaperConfig,
) -> Result<Spectrogram> {
    let Some(series) = series.as_series() else {
        return Err(Error::Shape(format!(
            "expected a one-dimensional series, got shape {:?}",
            series.shape()
        )));
    };

    let resolved = config.resolve(series.len(), sample_rate)?;
    debug!(?resolved, "resolved multitaper options");

    let starts = window_starts(series.len(), resolved.window_len, resolved.step_len);
    let times = segment_times(&starts, resolved.window_len, sample_rate);
    let axis = FrequencyAxis::new(sample_rate, resolved.nfft, resolved.freq_range);

    let timer = Instant::now();

    let tapers = TaperSet::dpss(
        resolved.window_len,
        resolved.time_bandwidth,
        resolved.num_tapers,
    )?
    .scaled(sample_rate.sqrt());

    let estimator = SegmentEstimator::new(
        &tapers,
        axis.bins(),
        resolved.nfft,
        resolved.detrend,
    );
    let rows = estimate_segments(&estimator, series, &starts, resolved.workers)?;
    let power = assemble(&rows, axis.len(), sample_rate, resolved.num_tapers);

    let compute_time = timer.elapsed();
    debug!(
        segments = starts.len(),
        freqs = axis.len(),
        workers = resolved.workers,
        "multitaper spectrogram computed in {:.3} s",
        compute_time.as_secs_f64()
    );

    let metadata = SpectrogramMetadata::new(&resolved, starts.len(), compute_time);

    Ok(Spectrogram { power, times, freqs: axis.into_freqs(), metadata })
}
