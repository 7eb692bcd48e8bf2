//! Discrete prolate spheroidal sequences (Slepian tapers).
//!
//! The tapers are the eigenvectors of the symmetric tridiagonal matrix which
//! commutes with the prolate-spheroidal operator:
//!
//! ```text
//! diag[n]    = ((N - 1 - 2n) / 2)² · cos(2πW)      n = 0 .. N-1
//! offdiag[n] = n (N - n) / 2                        n = 1 .. N-1
//! ```
//!
//! where `W = NW / N` is the half bandwidth in cycles per sample. The
//! eigenvectors of the `K` largest eigenvalues are the tapers.

use crate::prelude::*;
use nalgebra::{DMatrix, SymmetricEigen};
use std::ops::Index;

/// QR sweeps allowed per matrix row before the eigensolver gives up.
const MAX_SWEEPS_PER_ROW: usize = 30;

/// An orthonormal set of DPSS tapers sharing one window length.
///
/// Tapers are ordered by decreasing spectral concentration. Even-indexed
/// tapers are symmetric with a positive sum, and odd-indexed tapers are
/// antisymmetric with a positive first lobe.
#[derive(Clone, Debug)]
pub struct TaperSet {
    tapers: Vec<Vec<f64>>,
    time_bandwidth: f64,
}

impl TaperSet {
    /// Computes `num_tapers` DPSS tapers of `window_len` samples for the
    /// time-half-bandwidth product `time_bandwidth`, each with unit energy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `window_len` is `0`, if `time_bandwidth`
    /// is not positive or not below half the window length, or if
    /// `num_tapers` is `0` or exceeds `window_len`. Returns
    /// [`Error::Numerical`] if the eigensolver does not converge.
    pub fn dpss(
        window_len: usize,
        time_bandwidth: f64,
        num_tapers: usize,
    ) -> Result<Self> {
        if window_len == 0 {
            return Err(Error::Config(String::from(
                "tapers require a window of at least 1 sample, got 0",
            )));
        }
        if !(time_bandwidth.is_finite() && time_bandwidth > 0.0) {
            return Err(Error::Config(format!(
                "time-half-bandwidth product must be positive, got {time_bandwidth}"
            )));
        }
        if time_bandwidth >= window_len as f64 / 2.0 {
            return Err(Error::Config(format!(
                "time-half-bandwidth product {time_bandwidth} must be less than half the window length ({window_len} samples)"
            )));
        }
        if num_tapers == 0 || num_tapers > window_len {
            return Err(Error::Config(format!(
                "number of tapers must be between 1 and the window length ({window_len}), got {num_tapers}"
            )));
        }

        let matrix = prolate_matrix(window_len, time_bandwidth);
        let eigen = SymmetricEigen::try_new(
            matrix,
            f64::EPSILON,
            MAX_SWEEPS_PER_ROW * window_len,
        )
        .ok_or_else(|| {
            Error::Numerical(format!(
                "prolate eigendecomposition of a {window_len}-sample window did not converge"
            ))
        })?;

        let mut order: Vec<usize> = (0..window_len).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a])
        });

        let mut tapers: Vec<Vec<f64>> = order[..num_tapers]
            .iter()
            .map(|&k| eigen.eigenvectors.column(k).iter().copied().collect())
            .collect();

        fix_signs(&mut tapers);

        Ok(Self { tapers, time_bandwidth })
    }

    /// Multiplies every taper by `factor`.
    pub fn scaled(mut self, factor: f64) -> Self {
        for taper in &mut self.tapers {
            taper.iter_mut().for_each(|x| *x *= factor);
        }

        self
    }

    /// The number of tapers in the set.
    pub fn num_tapers(&self) -> usize {
        self.tapers.len()
    }

    /// The length of each taper in samples.
    pub fn window_len(&self) -> usize {
        self.tapers[0].len()
    }

    pub fn time_bandwidth(&self) -> f64 {
        self.time_bandwidth
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.tapers.iter().map(Vec::as_slice)
    }

    /// The fraction of taper `k`'s energy which lies within the band
    /// `[-W, W]`, where `W` is the half bandwidth in cycles per sample.
    ///
    /// This is `O(N²)` in the window length, and is intended for inspection
    /// rather than for use per segment.
    pub fn concentration(&self, k: usize) -> f64 {
        let taper = &self.tapers[k];
        let len = taper.len();
        let w = self.time_bandwidth / len as f64;
        let energy: f64 = taper.iter().map(|x| x * x).sum();

        let mut in_band = 2.0 * w * energy;

        for lag in 1..len {
            let acf: f64 = taper[..len - lag]
                .iter()
                .zip(&taper[lag..])
                .map(|(a, b)| a * b)
                .sum();
            in_band += 2.0 * acf * (TAU * w * lag as f64).sin()
                / (PI * lag as f64);
        }

        in_band / energy
    }
}

impl Index<usize> for TaperSet {
    type Output = [f64];

    fn index(&self, k: usize) -> &Self::Output {
        &self.tapers[k]
    }
}

/// The symmetric tridiagonal matrix which commutes with the prolate
/// operator, stored densely for the eigensolver.
fn prolate_matrix(len: usize, time_bandwidth: f64) -> DMatrix<f64> {
    let w = time_bandwidth / len as f64;
    let cos_w = (TAU * w).cos();

    DMatrix::from_fn(len, len, |i, j| {
        if i == j {
            let centre = (len as f64 - 1.0 - 2.0 * i as f64) / 2.0;
            centre * centre * cos_w
        } else if i.abs_diff(j) == 1 {
            let n = i.max(j);
            (n * (len - n)) as f64 / 2.0
        } else {
            0.0
        }
    })
}

/// Applies the usual sign convention: symmetric tapers sum to a positive
/// value, and antisymmetric tapers start with a positive lobe.
fn fix_signs(tapers: &mut [Vec<f64>]) {
    let Some(len) = tapers.first().map(Vec::len) else {
        return;
    };
    let threshold = (1.0 / len as f64).max(1e-7);

    for (k, taper) in tapers.iter_mut().enumerate() {
        let flip = if k % 2 == 0 {
            taper.iter().sum::<f64>() < 0.0
        } else {
            taper
                .iter()
                .find(|x| *x * *x > threshold)
                .is_some_and(|x| *x < 0.0)
        };

        if flip {
            taper.iter_mut().for_each(|x| *x = -*x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn tapers_are_orthonormal() {
        let tapers = TaperSet::dpss(64, 4.0, 7).unwrap();

        for i in 0..tapers.num_tapers() {
            for j in 0..tapers.num_tapers() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(within_tolerance(dot(&tapers[i], &tapers[j]), expected, 1e-10));
            }
        }
    }

    #[test]
    fn long_windows_are_orthonormal() {
        let tapers = TaperSet::dpss(1280, 5.0, 9).unwrap();

        assert_eq!(tapers.window_len(), 1280);
        for i in 0..9 {
            for j in 0..9 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(within_tolerance(dot(&tapers[i], &tapers[j]), expected, 1e-9));
            }
        }
    }

    #[test]
    fn concentration_decreases_with_order() {
        let tapers = TaperSet::dpss(8, 2.0, 3).unwrap();

        assert!(within_tolerance(tapers.concentration(0), 0.999_983_854_5, 1e-8));
        assert!(within_tolerance(tapers.concentration(1), 0.998_861_864_4, 1e-8));
        assert!(within_tolerance(tapers.concentration(2), 0.971_451_887_4, 1e-8));
    }

    #[test]
    fn symmetry_and_signs() {
        let tapers = TaperSet::dpss(65, 3.0, 5).unwrap();
        let len = tapers.window_len();

        for (k, taper) in tapers.iter().enumerate() {
            for n in 0..len {
                let mirrored = taper[len - 1 - n];
                let expected = if k % 2 == 0 { mirrored } else { -mirrored };
                assert!(within_tolerance(taper[n], expected, 1e-10));
            }
        }

        assert!(tapers[0].iter().sum::<f64>() > 0.0);
        assert!(tapers[1][1] > 0.0);
    }

    #[test]
    fn scaling_multiplies_every_sample() {
        let tapers = TaperSet::dpss(32, 2.5, 4).unwrap();
        let scaled = tapers.clone().scaled(16.0);

        for (a, b) in tapers.iter().zip(scaled.iter()) {
            for (x, y) in a.iter().zip(b) {
                assert!(within_tolerance(x * 16.0, *y, 1e-12));
            }
        }
    }

    #[test]
    fn single_sample_window() {
        let tapers = TaperSet::dpss(1, 0.25, 1).unwrap();
        assert!(within_tolerance(tapers[0][0], 1.0, 1e-12));
    }

    #[test]
    fn bandwidth_must_be_below_half_the_window() {
        let err = TaperSet::dpss(8, 4.0, 3).unwrap_err();

        match err {
            Error::Config(msg) => {
                assert!(msg.contains("8 samples"));
                assert!(msg.contains('4'));
            }
            other => panic!("expected a config error, got {other:?}"),
        }
        assert!(matches!(TaperSet::dpss(1, 0.5, 1), Err(Error::Config(_))));
        assert!(TaperSet::dpss(9, 4.0, 3).is_ok());
    }

    #[test]
    fn eigenvalue_order_matches_concentration() {
        let tapers = TaperSet::dpss(48, 3.0, 6).unwrap();

        for k in 1..tapers.num_tapers() {
            assert!(tapers.concentration(k) < tapers.concentration(k - 1));
        }
    }

    #[test]
    fn bad_arguments() {
        assert!(matches!(TaperSet::dpss(0, 4.0, 1), Err(Error::Config(_))));
        assert!(matches!(TaperSet::dpss(64, 0.0, 1), Err(Error::Config(_))));
        assert!(matches!(TaperSet::dpss(64, 4.0, 0), Err(Error::Config(_))));
        assert!(matches!(TaperSet::dpss(4, 1.0, 5), Err(Error::Config(_))));
    }
}
