//! Spectrogram options and their resolution against a concrete series.

use crate::dsp::Detrend;
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use tracing::warn;

/// How segments are distributed across threads.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Parallelism {
    /// Estimate every segment on the calling thread.
    #[default]
    Sequential,
    /// Estimate segments on a pool of this many worker threads.
    Workers(usize),
    /// Use every available core bar one.
    AllButOne,
}

impl Parallelism {
    /// Interprets a job count in the conventional command-line form: `1` is
    /// sequential, `-1` is every core bar one, and any larger count is a
    /// pool of that size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for `0` or for negative values other than
    /// `-1`.
    pub fn from_jobs(jobs: i64) -> Result<Self> {
        match jobs {
            1 => Ok(Self::Sequential),
            -1 => Ok(Self::AllButOne),
            n if n > 1 => Ok(Self::Workers(n as usize)),
            n => Err(Error::Config(format!(
                "job count must be -1 or a positive integer, got {n}"
            ))),
        }
    }

    /// The number of worker threads to use. Host resources are only
    /// queried here, never during estimation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an explicit pool of zero workers.
    pub fn resolve(self) -> Result<usize> {
        match self {
            Self::Sequential => Ok(1),
            Self::Workers(0) => Err(Error::Config(String::from(
                "worker count must be positive, got 0",
            ))),
            Self::Workers(n) => Ok(n),
            Self::AllButOne => Ok(std::thread::available_parallelism()
                .map_or(1, NonZeroUsize::get)
                .saturating_sub(1)
                .max(1)),
        }
    }
}

/// Options for [`compute_multitaper_spectrogram()`](super::compute_multitaper_spectrogram).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultitaperConfig {
    /// The band to keep, in Hz. Defaults to DC up to Nyquist.
    pub freq_range: Option<[f64; 2]>,
    /// Time-half-bandwidth product.
    pub time_bandwidth: f64,
    /// Defaults to `floor(2 * time_bandwidth) - 1`.
    pub num_tapers: Option<usize>,
    pub window_secs: f64,
    pub step_secs: f64,
    /// Minimum FFT length; the FFT is zero-padded up to this length (rounded
    /// to a power of two) for finer frequency interpolation.
    pub min_nfft: usize,
    pub detrend: Detrend,
    pub parallelism: Parallelism,
}

impl Default for MultitaperConfig {
    fn default() -> Self {
        Self {
            freq_range: None,
            time_bandwidth: DEFAULT_TIME_BANDWIDTH,
            num_tapers: None,
            window_secs: DEFAULT_WINDOW_SECS,
            step_secs: DEFAULT_STEP_SECS,
            min_nfft: 0,
            detrend: Detrend::default(),
            parallelism: Parallelism::default(),
        }
    }
}

impl MultitaperConfig {
    pub fn with_freq_range(mut self, low: f64, high: f64) -> Self {
        self.freq_range = Some([low, high]);
        self
    }

    pub fn with_time_bandwidth(mut self, time_bandwidth: f64) -> Self {
        self.time_bandwidth = time_bandwidth;
        self
    }

    pub fn with_num_tapers(mut self, num_tapers: usize) -> Self {
        self.num_tapers = Some(num_tapers);
        self
    }

    /// Sets the window length and step, both in seconds.
    pub fn with_window(mut self, window_secs: f64, step_secs: f64) -> Self {
        self.window_secs = window_secs;
        self.step_secs = step_secs;
        self
    }

    pub fn with_min_nfft(mut self, min_nfft: usize) -> Self {
        self.min_nfft = min_nfft;
        self
    }

    pub fn with_detrend(mut self, detrend: Detrend) -> Self {
        self.detrend = detrend;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// The taper count which makes full use of the bandwidth,
    /// `floor(2 * time_bandwidth) - 1`.
    pub fn canonical_num_tapers(time_bandwidth: f64) -> i64 {
        (2.0 * time_bandwidth).floor() as i64 - 1
    }

    /// Checks the options against a series of `series_len` samples at
    /// `sample_rate` Hz, filling in defaults and applying the permitted
    /// adjustments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for options which cannot be honoured, and
    /// [`Error::Size`] if the series is shorter than one window.
    pub fn resolve(
        &self,
        series_len: usize,
        sample_rate: f64,
    ) -> Result<ResolvedConfig> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::Config(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        if !(self.time_bandwidth.is_finite() && self.time_bandwidth > 0.0) {
            return Err(Error::Config(format!(
                "time-half-bandwidth product must be positive, got {}",
                self.time_bandwidth
            )));
        }

        let nyquist = sample_rate / 2.0;
        let mut adjustments = Vec::new();

        let [low, mut high] = self.freq_range.unwrap_or([0.0, nyquist]);

        if high > nyquist {
            let adj = Adjustment {
                kind: AdjustmentKind::MaxFrequency,
                requested: high,
                used: nyquist,
                detail: format!(
                    "upper frequency greater than Nyquist; using [{low}, {nyquist}] Hz"
                ),
            };
            warn!("{adj}");
            adjustments.push(adj);
            high = nyquist;
        }
        if low.is_nan() || high.is_nan() || low > high {
            return Err(Error::Config(format!(
                "frequency range must satisfy low <= high, got [{low}, {high}]"
            )));
        }

        let canonical = Self::canonical_num_tapers(self.time_bandwidth);
        let num_tapers = match self.num_tapers {
            None => {
                if canonical < 1 {
                    return Err(Error::Config(format!(
                        "time-half-bandwidth product {} leaves no usable tapers \
                         (floor(2 * TW) - 1 = {canonical})",
                        self.time_bandwidth
                    )));
                }
                canonical as usize
            }
            Some(0) => {
                return Err(Error::Config(String::from(
                    "number of tapers must be positive, got 0",
                )));
            }
            Some(k) => {
                if k as i64 != canonical {
                    let adj = Adjustment {
                        kind: AdjustmentKind::NumTapers,
                        requested: k as f64,
                        used: k as f64,
                        detail: format!(
                            "optimal number of tapers is floor(2 * TW) - 1 ({canonical}); using {k}"
                        ),
                    };
                    warn!("{adj}");
                    adjustments.push(adj);
                }
                k
            }
        };

        let window_len = secs_to_sample_count(
            self.window_secs,
            sample_rate,
            AdjustmentKind::WindowLength,
            &mut adjustments,
        )?;
        let step_len = secs_to_sample_count(
            self.step_secs,
            sample_rate,
            AdjustmentKind::WindowStep,
            &mut adjustments,
        )?;

        if series_len < window_len {
            return Err(Error::Size(format!(
                "series length ({series_len} samples) is shorter than the window ({window_len} samples)"
            )));
        }
        if num_tapers > window_len {
            return Err(Error::Config(format!(
                "number of tapers ({num_tapers}) exceeds the window length ({window_len} samples)"
            )));
        }
        if self.time_bandwidth >= window_len as f64 / 2.0 {
            return Err(Error::Config(format!(
                "time-half-bandwidth product {} must be less than half the window length ({window_len} samples)",
                self.time_bandwidth
            )));
        }

        Ok(ResolvedConfig {
            sample_rate,
            freq_range: [low, high],
            time_bandwidth: self.time_bandwidth,
            num_tapers,
            window_len,
            step_len,
            nfft: fft_len(window_len, self.min_nfft)?,
            detrend: self.detrend,
            workers: self.parallelism.resolve()?,
            adjustments,
        })
    }
}

/// Rounds a duration to whole samples, noting when rounding was needed.
fn secs_to_sample_count(
    secs: f64,
    sample_rate: f64,
    kind: AdjustmentKind,
    adjustments: &mut Vec<Adjustment>,
) -> Result<usize> {
    if !(secs.is_finite() && secs > 0.0) {
        return Err(Error::Config(format!(
            "{kind} must be a positive number of seconds, got {secs}"
        )));
    }

    let (samples, inexact) = secs_to_samples(secs, sample_rate);

    if samples == 0 {
        return Err(Error::Config(format!(
            "{kind} of {secs} s is shorter than one sample at {sample_rate} Hz"
        )));
    }

    if inexact {
        let used = samples as f64 / sample_rate;
        let adj = Adjustment {
            kind,
            requested: secs,
            used,
            detail: format!(
                "{secs} s is not a whole number of samples at {sample_rate} Hz; using {used} s ({samples} samples)"
            ),
        };
        warn!("{adj}");
        adjustments.push(adj);
    }

    Ok(samples)
}

/// The quantity changed by an [`Adjustment`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    MaxFrequency,
    NumTapers,
    WindowLength,
    WindowStep,
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MaxFrequency => "maximum frequency",
            Self::NumTapers => "number of tapers",
            Self::WindowLength => "window length",
            Self::WindowStep => "window step",
        })
    }
}

/// A non-fatal change (or questionable choice) made while resolving the
/// options. `requested` and `used` are in the natural unit of the quantity:
/// Hz, tapers, or seconds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    pub requested: f64,
    pub used: f64,
    pub detail: String,
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requested as {}, using {}: {}",
            self.kind, self.requested, self.used, self.detail
        )
    }
}

/// The options actually used for one spectrogram, in samples where
/// applicable.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig {
    pub sample_rate: f64,
    pub freq_range: [f64; 2],
    pub time_bandwidth: f64,
    pub num_tapers: usize,
    pub window_len: usize,
    pub step_len: usize,
    pub nfft: usize,
    pub detrend: Detrend,
    pub workers: usize,
    pub adjustments: Vec<Adjustment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let resolved = MultitaperConfig::default().resolve(60 * 256, 256.0).unwrap();

        assert_eq!(resolved.num_tapers, 9);
        assert_eq!(resolved.window_len, 1280);
        assert_eq!(resolved.step_len, 256);
        assert_eq!(resolved.nfft, 2048);
        assert_eq!(resolved.freq_range, [0.0, 128.0]);
        assert_eq!(resolved.detrend, Detrend::Linear);
        assert_eq!(resolved.workers, 1);
        assert!(resolved.adjustments.is_empty());
    }

    #[test]
    fn nyquist_clamp_is_reported() {
        let resolved = MultitaperConfig::default()
            .with_freq_range(0.0, 1000.0)
            .resolve(60 * 256, 256.0)
            .unwrap();

        assert_eq!(resolved.freq_range, [0.0, 128.0]);
        assert_eq!(resolved.adjustments.len(), 1);

        let adj = &resolved.adjustments[0];
        assert_eq!(adj.kind, AdjustmentKind::MaxFrequency);
        assert!(within_tolerance(adj.requested, 1000.0, f64::EPSILON));
        assert!(within_tolerance(adj.used, 128.0, f64::EPSILON));
    }

    #[test]
    fn non_canonical_taper_count_is_accepted() {
        let resolved = MultitaperConfig::default()
            .with_num_tapers(4)
            .resolve(60 * 256, 256.0)
            .unwrap();

        assert_eq!(resolved.num_tapers, 4);
        assert_eq!(resolved.adjustments[0].kind, AdjustmentKind::NumTapers);

        let canonical = MultitaperConfig::default()
            .with_num_tapers(9)
            .resolve(60 * 256, 256.0)
            .unwrap();
        assert!(canonical.adjustments.is_empty());
    }

    #[test]
    fn inexact_windows_are_rounded() {
        // 0.333 s is 33.3 samples at 100 Hz
        let resolved = MultitaperConfig::default()
            .with_window(2.0, 0.333)
            .resolve(1000, 100.0)
            .unwrap();

        assert_eq!(resolved.window_len, 200);
        assert_eq!(resolved.step_len, 33);
        assert_eq!(resolved.adjustments.len(), 1);

        let adj = &resolved.adjustments[0];
        assert_eq!(adj.kind, AdjustmentKind::WindowStep);
        assert!(within_tolerance(adj.used, 0.33, 1e-12));
    }

    #[test]
    fn min_nfft_pads_to_power_of_two() {
        let resolved = MultitaperConfig::default()
            .with_window(2.0, 1.0)
            .with_min_nfft(1000)
            .resolve(1024, 256.0)
            .unwrap();

        assert_eq!(resolved.window_len, 512);
        assert_eq!(resolved.nfft, 1024);
    }

    #[test]
    fn bandwidth_too_wide_for_window() {
        // 1 s at 8 Hz is an 8-sample window, and TW = 4 is half of it
        let result = MultitaperConfig::default()
            .with_time_bandwidth(4.0)
            .with_num_tapers(3)
            .with_window(1.0, 1.0)
            .resolve(64, 8.0);

        match result {
            Err(Error::Config(msg)) => {
                assert!(msg.contains("(8 samples)"));
                assert!(msg.contains("product 4 "));
            }
            other => panic!("expected a config error, got {other:?}"),
        }

        let narrower = MultitaperConfig::default()
            .with_time_bandwidth(3.5)
            .with_num_tapers(3)
            .with_window(1.0, 1.0)
            .resolve(64, 8.0);
        assert!(narrower.is_ok());
    }

    #[test]
    fn oversized_min_nfft_is_rejected() {
        let result = MultitaperConfig::default()
            .with_min_nfft(usize::MAX)
            .resolve(60 * 256, 256.0);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn short_series_is_a_size_error() {
        let result = MultitaperConfig::default().resolve(1279, 256.0);
        assert!(matches!(result, Err(Error::Size(_))));
    }

    #[test]
    fn invalid_options() {
        let config = MultitaperConfig::default();

        assert!(matches!(config.resolve(2048, 0.0), Err(Error::Config(_))));
        assert!(matches!(
            config.clone().with_time_bandwidth(0.5).resolve(2048, 256.0),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config.clone().with_num_tapers(0).resolve(2048, 256.0),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config.clone().with_window(5.0, 0.0).resolve(2048, 256.0),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config.clone().with_freq_range(50.0, 10.0).resolve(2048, 256.0),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config
                .with_parallelism(Parallelism::Workers(0))
                .resolve(2048, 256.0),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn job_counts() {
        assert_eq!(Parallelism::from_jobs(1).unwrap(), Parallelism::Sequential);
        assert_eq!(Parallelism::from_jobs(-1).unwrap(), Parallelism::AllButOne);
        assert_eq!(Parallelism::from_jobs(4).unwrap(), Parallelism::Workers(4));
        assert!(Parallelism::from_jobs(0).is_err());
        assert!(Parallelism::from_jobs(-3).is_err());

        assert!(Parallelism::AllButOne.resolve().unwrap() >= 1);
        assert_eq!(Parallelism::Workers(3).resolve().unwrap(), 3);
    }
}
