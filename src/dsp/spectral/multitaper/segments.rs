//! Segmentation of a series into overlapping windows.

/// The start offsets of every full window: `0, step, 2·step, …` while the
/// window still fits within the series.
///
/// # Panics
///
/// Panics if `step_len == 0`.
pub fn window_starts(
    series_len: usize,
    window_len: usize,
    step_len: usize,
) -> Vec<usize> {
    assert_ne!(step_len, 0);

    if series_len < window_len {
        return Vec::new();
    }

    (0..=series_len - window_len).step_by(step_len).collect()
}

/// The time in seconds of each window's midpoint.
pub fn segment_times(
    starts: &[usize],
    window_len: usize,
    sample_rate: f64,
) -> Vec<f64> {
    let half = (window_len as f64 / 2.0).round_ties_even() as usize;

    starts
        .iter()
        .map(|&start| (start + half) as f64 / sample_rate)
        .collect()
}
