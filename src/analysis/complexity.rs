//! Lempel-Ziv complexity of the analytic signal.

use crate::dsp::analytic_signal;
use crate::prelude::*;
use serde::Serialize;

/// Lempel-Ziv complexity of the binarised amplitude and phase of a signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LzComplexity {
    pub amplitude: usize,
    pub phase: usize,
}

/// The number of distinct phrases in the Lempel-Ziv (1976) parsing of
/// `bits`.
///
/// Each new phrase is the shortest substring which cannot be copied from
/// earlier in the sequence; a trailing phrase which could be copied still
/// counts.
pub fn lempel_ziv_complexity(bits: &[bool]) -> usize {
    let len = bits.len();

    if len < 2 {
        return len;
    }

    // u: start of the candidate source, v: current match length,
    // w: start of the current phrase
    let (mut u, mut v, mut w) = (0, 1, 1);
    let mut v_max = 1;
    let mut complexity = 1;

    loop {
        if bits[u + v - 1] == bits[w + v - 1] {
            v += 1;

            if w + v >= len {
                complexity += 1;
                break;
            }
        } else {
            v_max = v_max.max(v);
            u += 1;

            if u == w {
                complexity += 1;
                w += v_max;

                if w >= len {
                    break;
                }

                u = 0;
                v = 1;
                v_max = 1;
            } else {
                v = 1;
            }
        }
    }

    complexity
}

/// Computes the Lempel-Ziv complexity of `signal`'s instantaneous
/// amplitude and phase.
///
/// Both are taken from the analytic signal and binarised against their
/// median: a sample strictly above the median is a one.
///
/// # Errors
///
/// Returns [`Error::Size`] for an empty signal, and [`Error::Numerical`] if
/// the Hilbert transform fails.
pub fn lzc(signal: &[f64]) -> Result<LzComplexity> {
    if signal.is_empty() {
        return Err(Error::Size(String::from(
            "Lempel-Ziv complexity requires at least 1 sample, got 0",
        )));
    }

    let analytic = analytic_signal(signal)?;

    let amplitude: Vec<f64> = analytic.iter().map(|z| z.norm()).collect();
    let phase: Vec<f64> = analytic.iter().map(|z| z.im.atan2(z.re)).collect();

    Ok(LzComplexity {
        amplitude: lempel_ziv_complexity(&above_median(&amplitude)),
        phase: lempel_ziv_complexity(&above_median(&phase)),
    })
}

fn above_median(values: &[f64]) -> Vec<bool> {
    let threshold = median(values);
    values.iter().map(|&x| x > threshold).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn known_sequences() {
        assert_eq!(lempel_ziv_complexity(&bits("1001111011000010")), 6);
        assert_eq!(lempel_ziv_complexity(&bits("01111000011001")), 5);
        assert_eq!(lempel_ziv_complexity(&bits("0101010101")), 3);
        assert_eq!(lempel_ziv_complexity(&bits("0000000")), 2);
        assert_eq!(lempel_ziv_complexity(&bits("01")), 2);
        assert_eq!(lempel_ziv_complexity(&bits("1")), 1);
        assert_eq!(lempel_ziv_complexity(&[]), 0);
    }

    #[test]
    fn structured_signals_are_simple() {
        // a 10 Hz carrier with a slow 1 Hz envelope
        let signal: Vec<f64> = (0..4096)
            .map(|n| {
                let t = n as f64 / 256.0;
                let envelope = 0.5f64.mul_add((TAU * t + 0.3).sin(), 1.0);
                envelope * (TAU * 10.0 * t + 0.1).sin()
            })
            .collect();

        let structured = lzc(&signal).unwrap();
        assert!(structured.amplitude < 20);
        assert!(structured.phase < 20);

        let mut rng = rand::rng();
        let noise: Vec<f64> = (0..4096).map(|_| rng.random_range(-1.0..1.0)).collect();

        let random = lzc(&noise).unwrap();
        assert!(random.amplitude > 100);
        assert!(random.phase > 100);
    }

    #[test]
    fn empty_signal_is_an_error() {
        assert!(matches!(lzc(&[]), Err(Error::Size(_))));
    }
}
