//! Biquad filter using the [direct form 1](https://en.wikipedia.org/wiki/Digital_biquad_filter#Direct_form_1).
//!
//! The notch design places a pair of zeros on the unit circle at the notch
//! frequency, with a -3 dB bandwidth of `freq / q`.

use super::Filter;
use crate::prelude::*;

/// Filter coefficients, normalised so that `a0` is `1`.
#[derive(Debug, Clone, Copy)]
struct Coefs {
    /// INPUT side
    b0: f64,
    /// INPUT side
    b1: f64,
    /// INPUT side
    b2: f64,
    /// OUTPUT side
    a1: f64,
    /// OUTPUT side
    a2: f64,
}

impl Coefs {
    /// A coefficient state which leaves the input signal totally unaffected.
    fn identity() -> Self {
        Self { b0: 1.0, b1: 0.0, b2: 0.0, a1: 0.0, a2: 0.0 }
    }

    /// The gain at 0 Hz.
    fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }
}

impl Default for Coefs {
    fn default() -> Self {
        Self::identity()
    }
}

/// A second-order IIR filter.
///
/// `process()` runs the filter causally. `filtfilt()` runs it forwards and
/// then backwards over a whole buffer, which cancels the phase response and
/// squares the magnitude response.
#[derive(Debug, Clone, Default)]
pub struct BiquadFilter {
    coefs: Coefs,
    delayed_in: (f64, f64),
    delayed_out: (f64, f64),
}

impl Filter for BiquadFilter {
    fn process(&mut self, sample: f64) -> f64 {
        let Coefs { b0, b1, b2, a1, a2 } = self.coefs;

        let bottom_sum = self.delayed_in.1 * b2 + self.delayed_out.1 * -a2;
        let middle_sum = self.delayed_in.0 * b1 + self.delayed_out.0 * -a1;
        let output = bottom_sum + middle_sum + (sample * b0);

        self.delayed_in = (sample, self.delayed_in.0);
        self.delayed_out = (output, self.delayed_out.0);

        output
    }
}

impl BiquadFilter {
    /// Creates a notch filter at `freq` Hz with quality factor `q`, for a
    /// signal sampled at `sample_rate` Hz.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `sample_rate` or `q` is not positive,
    /// or if `freq` does not lie strictly between 0 Hz and Nyquist.
    pub fn notch(freq: f64, q: f64, sample_rate: f64) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::Config(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        if !(freq > 0.0 && freq < sample_rate / 2.0) {
            return Err(Error::Config(format!(
                "notch frequency must lie between 0 and {} Hz, got {freq}",
                sample_rate / 2.0
            )));
        }
        if !(q.is_finite() && q > 0.0) {
            return Err(Error::Config(format!(
                "notch quality factor must be positive, got {q}"
            )));
        }

        let phi = (TAU * freq) / sample_rate;
        let gain = 1.0 / (1.0 + (phi / (2.0 * q)).tan());
        let cos = phi.cos();

        let coefs = Coefs {
            b0: gain,
            b1: -2.0 * gain * cos,
            b2: gain,
            a1: -2.0 * gain * cos,
            a2: 2.0f64.mul_add(gain, -1.0),
        };

        Ok(Self { coefs, ..Self::default() })
    }

    /// Clears the filter's delay lines.
    pub fn reset(&mut self) {
        self.delayed_in = (0.0, 0.0);
        self.delayed_out = (0.0, 0.0);
    }

    /// Sets the delay lines to the state reached after an endless run of
    /// `sample`, so that a signal starting at `sample` has no onset
    /// transient.
    pub fn settle(&mut self, sample: f64) {
        let output = self.coefs.dc_gain() * sample;

        self.delayed_in = (sample, sample);
        self.delayed_out = (output, output);
    }

    /// The number of samples reflected onto each end of the buffer by
    /// `filtfilt()`.
    pub const fn padding_len() -> usize {
        9
    }

    /// Filters `buffer` in place with zero phase: forwards, then backwards.
    ///
    /// Both ends are extended by an odd reflection of `padding_len()`
    /// samples, and each pass starts from the settled state of its first
    /// sample. This leaves the filter's delay lines in an arbitrary state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Size`] if `buffer` is not longer than
    /// `padding_len()`.
    pub fn filtfilt(&mut self, buffer: &mut [f64]) -> Result<()> {
        let pad = Self::padding_len();
        let len = buffer.len();

        if len <= pad {
            return Err(Error::Size(format!(
                "zero-phase filtering needs more than {pad} samples, got {len}"
            )));
        }

        let first = buffer[0];
        let last = buffer[len - 1];

        let mut extended = Vec::with_capacity(len + 2 * pad);
        extended.extend(buffer[1..=pad].iter().rev().map(|x| 2.0 * first - x));
        extended.extend_from_slice(buffer);
        extended.extend(
            buffer[len - 1 - pad..len - 1].iter().rev().map(|x| 2.0 * last - x),
        );

        self.settle(extended[0]);
        self.process_block(&mut extended);

        extended.reverse();
        self.settle(extended[0]);
        self.process_block(&mut extended);
        extended.reverse();

        buffer.copy_from_slice(&extended[pad..pad + len]);

        Ok(())
    }
}
