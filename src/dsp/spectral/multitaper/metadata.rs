//! A record of the options a spectrogram was actually computed with.

use super::config::{Adjustment, ResolvedConfig};
use crate::dsp::Detrend;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Informational summary of a spectrogram computation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpectrogramMetadata {
    /// The main lobe width, `2 * TW / window length`, in Hz.
    pub spectral_resolution_hz: f64,
    /// The same width with the window length taken in samples, i.e. in
    /// cycles per sample. Multiply by the sample rate to get Hz.
    pub spectral_resolution_per_sample: f64,
    pub window_len_secs: f64,
    pub window_step_secs: f64,
    pub time_bandwidth: f64,
    pub num_tapers: usize,
    pub min_freq_hz: f64,
    pub max_freq_hz: f64,
    pub detrend: Detrend,
    pub nfft: usize,
    pub num_segments: usize,
    pub workers: usize,
    /// Wall-clock time spent estimating and assembling the segments.
    #[serde(rename = "compute_time_secs", serialize_with = "serialize_secs")]
    pub compute_time: Duration,
    pub adjustments: Vec<Adjustment>,
}

impl SpectrogramMetadata {
    pub fn new(
        resolved: &ResolvedConfig,
        num_segments: usize,
        compute_time: Duration,
    ) -> Self {
        let fs = resolved.sample_rate;
        let window_len_secs = resolved.window_len as f64 / fs;

        Self {
            spectral_resolution_hz: 2.0 * resolved.time_bandwidth / window_len_secs,
            spectral_resolution_per_sample: 2.0 * resolved.time_bandwidth
                / resolved.window_len as f64,
            window_len_secs,
            window_step_secs: resolved.step_len as f64 / fs,
            time_bandwidth: resolved.time_bandwidth,
            num_tapers: resolved.num_tapers,
            min_freq_hz: resolved.freq_range[0],
            max_freq_hz: resolved.freq_range[1],
            detrend: resolved.detrend,
            nfft: resolved.nfft,
            num_segments,
            workers: resolved.workers,
            compute_time,
            adjustments: resolved.adjustments.clone(),
        }
    }
}

fn serialize_secs<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
