//! Digital signal processors and utilities.

pub mod detrend;
pub mod filtering;
pub mod series;
pub mod spectral;
pub mod tapers;

pub use detrend::Detrend;
pub use filtering::{BiquadFilter, Filter};
pub use series::SeriesInput;
pub use spectral::{
    hilbert::analytic_signal,
    multitaper::{compute_multitaper_spectrogram, Spectrogram},
    welch::{welch, WelchSpectrum},
};
pub use tapers::TaperSet;
