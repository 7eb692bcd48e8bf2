//! Module for spectral (frequency domain) analysis.

pub mod hilbert;
pub mod multitaper;
pub mod welch;

pub use multitaper::{compute_multitaper_spectrogram, Spectrogram};
pub use welch::{welch, WelchSpectrum};
