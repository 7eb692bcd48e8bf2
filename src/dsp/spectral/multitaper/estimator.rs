//! Multitaper power estimate of a single segment.

use crate::dsp::{Detrend, TaperSet};
use crate::prelude::*;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Everything shared by the per-segment estimates of one spectrogram: the
/// tapers, the FFT plan, the selected bins and the detrend mode.
///
/// The estimator is never mutated once built, so one instance is shared by
/// reference between all worker threads. Per-call buffers live in a
/// [`SegmentScratch`], of which each worker owns one.
pub struct SegmentEstimator<'a> {
    tapers: &'a TaperSet,
    bins: &'a [usize],
    nfft: usize,
    detrend: Detrend,

    /// forward fft plan
    fft: Arc<dyn RealToComplex<f64>>,
}

/// Working buffers for [`SegmentEstimator::estimate()`].
pub struct SegmentScratch {
    /// the detrended segment
    segment: Vec<f64>,
    /// the tapered, zero-padded segment
    padded: Vec<f64>,
    spectrum: Vec<Complex<f64>>,
    fft_scratch: Vec<Complex<f64>>,
}

impl<'a> SegmentEstimator<'a> {
    /// # Panics
    ///
    /// Panics if `nfft` is shorter than the tapers.
    pub fn new(
        tapers: &'a TaperSet,
        bins: &'a [usize],
        nfft: usize,
        detrend: Detrend,
    ) -> Self {
        assert!(nfft >= tapers.window_len());

        Self {
            tapers,
            bins,
            nfft,
            detrend,
            fft: RealFftPlanner::new().plan_fft_forward(nfft),
        }
    }

    /// Allocates a set of working buffers for this estimator.
    pub fn scratch(&self) -> SegmentScratch {
        SegmentScratch {
            segment: vec![0.0; self.window_len()],
            padded: self.fft.make_input_vec(),
            spectrum: self.fft.make_output_vec(),
            fft_scratch: self.fft.make_scratch_vec(),
        }
    }

    pub fn window_len(&self) -> usize {
        self.tapers.window_len()
    }

    /// The length of each power vector.
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Returns the magnitude-squared spectrum of `segment` under each taper,
    /// summed over the tapers, at each selected bin.
    ///
    /// The sum is left unnormalised; dividing by `fs² · K` happens once the
    /// whole spectrogram is assembled. A segment of exact zeros skips the
    /// detrend and FFTs and returns zeros.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Numerical`] if the FFT fails.
    ///
    /// # Panics
    ///
    /// Panics if `segment` is not as long as the tapers.
    pub fn estimate(
        &self,
        segment: &[f64],
        scratch: &mut SegmentScratch,
    ) -> Result<Vec<f64>> {
        let window_len = self.window_len();
        assert_eq!(segment.len(), window_len);

        let mut power = vec![0.0; self.num_bins()];

        if segment.iter().all(|&x| x == 0.0) {
            return Ok(power);
        }

        scratch.segment.copy_from_slice(segment);
        self.detrend.apply(&mut scratch.segment);

        for taper in self.tapers.iter() {
            let (windowed, padding) = scratch.padded.split_at_mut(window_len);

            for ((dst, &x), &w) in windowed.iter_mut().zip(&scratch.segment).zip(taper) {
                *dst = x * w;
            }
            // the fft uses its input as scratch space
            padding.fill(0.0);

            self.fft.process_with_scratch(
                &mut scratch.padded,
                &mut scratch.spectrum,
                &mut scratch.fft_scratch,
            )?;

            for (p, &k) in power.iter_mut().zip(self.bins) {
                let bin = scratch.spectrum[self.spectrum_index(k)];
                *p += bin.im * bin.im + bin.re * bin.re;
            }
        }

        Ok(power)
    }

    /// Maps a bin of the full FFT onto the one-sided spectrum. The input is
    /// real, so bins above Nyquist mirror those below it.
    #[inline]
    fn spectrum_index(&self, k: usize) -> usize {
        if k <= self.nfft / 2 { k } else { self.nfft - k }
    }
}
