//! Module for time domain filters.

pub mod biquad;

pub use biquad::BiquadFilter;

/// Per-sample processing shared by the filters in this module.
pub trait Filter: Send {
    /// Generic processing method for a filter.
    fn process(&mut self, sample: f64) -> f64;

    /// Processes `buffer` in place, in order.
    fn process_block(&mut self, buffer: &mut [f64]) {
        buffer.iter_mut().for_each(|x| *x = self.process(*x));
    }
}
