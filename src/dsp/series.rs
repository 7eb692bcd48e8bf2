//! Traits for buffers which may be analysed as a time series.

/// A buffer which may be passed to the spectral estimators.
///
/// Only one-dimensional buffers are a valid series; channel-major buffers
/// report their full shape so that the estimators can reject them with a
/// useful message.
pub trait SeriesInput {
    /// The dimensions of the buffer, outermost first.
    fn shape(&self) -> Vec<usize>;

    /// The samples of the buffer, if it is one-dimensional.
    fn as_series(&self) -> Option<&[f64]>;
}

impl SeriesInput for [f64] {
    #[inline]
    fn shape(&self) -> Vec<usize> {
        vec![self.len()]
    }

    #[inline]
    fn as_series(&self) -> Option<&[f64]> {
        Some(self)
    }
}

impl SeriesInput for Vec<f64> {
    #[inline]
    fn shape(&self) -> Vec<usize> {
        vec![self.len()]
    }

    #[inline]
    fn as_series(&self) -> Option<&[f64]> {
        Some(self.as_slice())
    }
}

impl<const N: usize> SeriesInput for [f64; N] {
    #[inline]
    fn shape(&self) -> Vec<usize> {
        vec![N]
    }

    #[inline]
    fn as_series(&self) -> Option<&[f64]> {
        Some(self.as_slice())
    }
}

impl SeriesInput for [Vec<f64>] {
    fn shape(&self) -> Vec<usize> {
        channel_major_shape(self.iter().map(Vec::len), self.len())
    }

    fn as_series(&self) -> Option<&[f64]> {
        None
    }
}

impl SeriesInput for Vec<Vec<f64>> {
    fn shape(&self) -> Vec<usize> {
        self.as_slice().shape()
    }

    fn as_series(&self) -> Option<&[f64]> {
        None
    }
}

impl SeriesInput for [&[f64]] {
    fn shape(&self) -> Vec<usize> {
        channel_major_shape(self.iter().map(|ch| ch.len()), self.len())
    }

    fn as_series(&self) -> Option<&[f64]> {
        None
    }
}

/// The shape of a channel-major buffer. Ragged buffers report the length
/// of their first channel.
fn channel_major_shape(
    mut lens: impl Iterator<Item = usize>,
    num_channels: usize,
) -> Vec<usize> {
    vec![num_channels, lens.next().unwrap_or(0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_buffers_are_series() {
        let samples = vec![0.0, 1.0, 2.0];

        assert_eq!(samples.shape(), vec![3]);
        assert_eq!(samples.as_series(), Some(&[0.0, 1.0, 2.0][..]));
        assert_eq!([1.0; 4].shape(), vec![4]);
    }

    #[test]
    fn channel_major_buffers_are_not_series() {
        let channels = vec![vec![0.0; 5], vec![0.0; 5]];

        assert_eq!(channels.shape(), vec![2, 5]);
        assert!(channels.as_series().is_none());
    }
}
