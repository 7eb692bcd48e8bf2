//! Frequency axis and band selection for zero-padded FFTs.

/// The selected output frequencies of a spectrogram, together with the FFT
/// bins they were taken from.
///
/// Bin `k` of an `nfft`-point FFT is labelled with the centre frequency
/// `(k + 0.5) · fs / nfft`, and a bin is selected when its label lies within
/// the requested band (inclusive at both ends).
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyAxis {
    freqs: Vec<f64>,
    mask: Vec<bool>,
    bins: Vec<usize>,
    resolution: f64,
}

impl FrequencyAxis {
    /// # Panics
    ///
    /// Panics if `nfft == 0`.
    pub fn new(sample_rate: f64, nfft: usize, [low, high]: [f64; 2]) -> Self {
        assert_ne!(nfft, 0);

        let resolution = sample_rate / nfft as f64;
        let first = resolution / 2.0;

        let mask: Vec<bool> = (0..nfft)
            .map(|k| {
                let f = (k as f64).mul_add(resolution, first);
                low <= f && f <= high
            })
            .collect();

        let bins: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(k, &selected)| selected.then_some(k))
            .collect();

        let freqs = bins
            .iter()
            .map(|&k| (k as f64).mul_add(resolution, first))
            .collect();

        Self { freqs, mask, bins, resolution }
    }

    pub fn freqs(&self) -> &[f64] {
        &self.freqs
    }

    pub fn into_freqs(self) -> Vec<f64> {
        self.freqs
    }

    /// One flag per FFT bin, `true` for the bins within the band.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// The indices of the selected FFT bins, ascending.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// The spacing of the axis in Hz.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::within_tolerance;

    #[test]
    fn full_band() {
        let axis = FrequencyAxis::new(256.0, 512, [0.0, 128.0]);

        assert_eq!(axis.len(), 256);
        assert_eq!(axis.mask().len(), 512);
        assert!(within_tolerance(axis.resolution(), 0.5, f64::EPSILON));
        assert!(within_tolerance(axis.freqs()[0], 0.25, f64::EPSILON));
        assert!(within_tolerance(axis.freqs()[255], 127.75, 1e-12));
        assert!(axis.freqs().windows(2).all(|w| w[1] > w[0]));
        assert_eq!(axis.bins(), (0..256).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn band_edges_are_inclusive() {
        let axis = FrequencyAxis::new(8.0, 8, [1.5, 3.5]);

        // labels are 0.5, 1.5, 2.5, 3.5, ...
        assert_eq!(axis.bins(), &[1, 2, 3]);
        assert_eq!(axis.freqs(), &[1.5, 2.5, 3.5]);
        assert_eq!(
            axis.mask(),
            &[false, true, true, true, false, false, false, false]
        );
    }

    #[test]
    fn empty_band() {
        let axis = FrequencyAxis::new(256.0, 512, [0.0, 0.1]);
        assert!(axis.is_empty());
    }
}
