//! Trend removal applied to each segment before spectral analysis.

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The trend removed from a segment before it is tapered.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Detrend {
    /// Remove the least-squares line through the segment.
    #[default]
    Linear,
    /// Remove the segment's mean.
    Constant,
    /// Leave the segment untouched.
    Off,
}

impl Detrend {
    /// Removes the trend from `buffer` in place.
    pub fn apply(self, buffer: &mut [f64]) {
        match self {
            Self::Linear => remove_linear_trend(buffer),
            Self::Constant => remove_mean(buffer),
            Self::Off => (),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Constant => "constant",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for Detrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Detrend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(Self::Linear),
            "constant" => Ok(Self::Constant),
            "off" => Ok(Self::Off),
            other => Err(Error::Config(format!(
                "detrend must be one of \"linear\", \"constant\" or \"off\", got \"{other}\""
            ))),
        }
    }
}

fn remove_mean(buffer: &mut [f64]) {
    if buffer.is_empty() {
        return;
    }

    let avg = mean(buffer);
    buffer.iter_mut().for_each(|x| *x -= avg);
}

/// Subtracts the least-squares line through `buffer`. The abscissa is
/// centred on the middle of the buffer, so the fitted intercept is the mean.
fn remove_linear_trend(buffer: &mut [f64]) {
    let len = buffer.len();

    if len < 2 {
        remove_mean(buffer);
        return;
    }

    let centre = (len - 1) as f64 / 2.0;
    let avg = mean(buffer);

    let (cross, spread) = buffer.iter().enumerate().fold(
        (0.0, 0.0),
        |(cross, spread), (n, &x)| {
            let t = n as f64 - centre;
            (t.mul_add(x - avg, cross), t.mul_add(t, spread))
        },
    );

    let slope = cross / spread;

    for (n, x) in buffer.iter_mut().enumerate() {
        *x -= slope.mul_add(n as f64 - centre, avg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_removes_a_line() {
        let mut buffer: Vec<f64> =
            (0..100).map(|n| 3.0f64.mul_add(n as f64, -7.5)).collect();

        Detrend::Linear.apply(&mut buffer);

        assert!(buffer.iter().all(|&x| within_tolerance(x, 0.0, 1e-10)));
    }

    #[test]
    fn linear_ignores_added_line() {
        let original: Vec<f64> =
            (0..64).map(|n| (TAU * 4.5 * n as f64 / 64.0).cos()).collect();
        let mut plain = original.clone();
        let mut sloped: Vec<f64> = original
            .iter()
            .enumerate()
            .map(|(n, x)| 0.25f64.mul_add(n as f64, x + 2.0))
            .collect();

        Detrend::Linear.apply(&mut plain);
        Detrend::Linear.apply(&mut sloped);

        for (a, b) in plain.iter().zip(&sloped) {
            assert!(within_tolerance(*a, *b, 1e-10));
        }
    }

    #[test]
    fn constant_removes_mean() {
        let mut buffer = vec![1.0, 2.0, 3.0, 6.0];
        Detrend::Constant.apply(&mut buffer);

        assert_eq!(buffer, vec![-2.0, -1.0, 0.0, 3.0]);
    }

    #[test]
    fn off_is_a_no_op() {
        let mut buffer = vec![1.0, 5.0, -2.0];
        Detrend::Off.apply(&mut buffer);

        assert_eq!(buffer, vec![1.0, 5.0, -2.0]);
    }

    #[test]
    fn parse_modes() {
        assert_eq!("linear".parse::<Detrend>().unwrap(), Detrend::Linear);
        assert_eq!("constant".parse::<Detrend>().unwrap(), Detrend::Constant);
        assert_eq!("off".parse::<Detrend>().unwrap(), Detrend::Off);
        assert!(matches!("quadratic".parse::<Detrend>(), Err(Error::Config(_))));
    }
}
