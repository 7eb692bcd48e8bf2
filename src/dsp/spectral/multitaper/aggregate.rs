//! Fan-out of the segment estimates and assembly of the spectrogram matrix.

use super::estimator::{SegmentEstimator, SegmentScratch};
use crate::prelude::*;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

/// Estimates every segment of `series` starting at `starts`, returning one
/// power vector per segment in the order of `starts`.
///
/// With `workers <= 1` the segments are processed on the calling thread.
/// Otherwise a pool of `workers` threads is built for this call; each
/// thread allocates its own scratch buffers and shares the estimator. The
/// output order never depends on which segment finishes first.
///
/// # Errors
///
/// Any failing segment aborts the whole call, and no partial result is
/// returned. Also fails if the worker pool cannot be built.
pub fn estimate_segments(
    estimator: &SegmentEstimator<'_>,
    series: &[f64],
    starts: &[usize],
    workers: usize,
) -> Result<Vec<Vec<f64>>> {
    let window_len = estimator.window_len();
    let estimate = |scratch: &mut SegmentScratch, &start: &usize| {
        estimator.estimate(&series[start..start + window_len], scratch)
    };

    if workers <= 1 {
        let mut scratch = estimator.scratch();
        return starts
            .iter()
            .map(|start| estimate(&mut scratch, start))
            .collect();
    }

    let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;

    pool.install(|| {
        starts
            .par_iter()
            .map_init(|| estimator.scratch(), estimate)
            .collect()
    })
}

/// Arranges per-segment power vectors into a `[frequency][segment]` matrix
/// and completes the taper average, dividing by `fs²` and then by the taper
/// count.
pub fn assemble(
    rows: &[Vec<f64>],
    num_freqs: usize,
    sample_rate: f64,
    num_tapers: usize,
) -> Vec<Vec<f64>> {
    let fs_squared = sample_rate * sample_rate;
    let num_tapers = num_tapers as f64;

    (0..num_freqs)
        .map(|f| {
            rows.iter()
                .map(|row| row[f] / fs_squared / num_tapers)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::spectral::multitaper::freqs::FrequencyAxis;
    use crate::dsp::{Detrend, TaperSet};
    use rand::Rng;

    fn noise(len: usize) -> Vec<f64> {
        let mut rng = rand::rng();
        (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
    }

    #[test]
    fn assemble_transposes_and_normalises() {
        let rows = vec![vec![2.0, 4.0, 6.0], vec![8.0, 10.0, 12.0]];
        let matrix = assemble(&rows, 3, 2.0, 2);

        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix[0], vec![0.25, 1.0]);
        assert_eq!(matrix[1], vec![0.5, 1.25]);
        assert_eq!(matrix[2], vec![0.75, 1.5]);
    }

    #[test]
    fn pool_preserves_segment_order() {
        let tapers = TaperSet::dpss(128, 3.0, 5).unwrap().scaled(8.0);
        let axis = FrequencyAxis::new(64.0, 128, [0.0, 32.0]);
        let estimator = SegmentEstimator::new(&tapers, axis.bins(), 128, Detrend::Linear);

        let series = noise(4096);
        let starts: Vec<usize> = (0..=series.len() - 128).step_by(17).collect();

        let sequential = estimate_segments(&estimator, &series, &starts, 1).unwrap();
        let pooled = estimate_segments(&estimator, &series, &starts, 4).unwrap();

        assert_eq!(sequential.len(), starts.len());
        assert_eq!(sequential, pooled);
    }

    #[test]
    fn each_row_belongs_to_its_segment() {
        let tapers = TaperSet::dpss(64, 2.0, 3).unwrap();
        let axis = FrequencyAxis::new(64.0, 64, [0.0, 32.0]);
        let estimator = SegmentEstimator::new(&tapers, axis.bins(), 64, Detrend::Off);

        // silence followed by noise: only later segments carry power
        let mut series = vec![0.0; 256];
        series.extend(noise(256));
        let starts: Vec<usize> = (0..=series.len() - 64).step_by(64).collect();

        let rows = estimate_segments(&estimator, &series, &starts, 3).unwrap();

        for (row, &start) in rows.iter().zip(&starts) {
            let silent = start + 64 <= 256;
            assert_eq!(row.iter().all(|&p| p == 0.0), silent);
        }
    }
}
