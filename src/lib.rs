#![allow(
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::return_self_not_must_use,
    clippy::cast_precision_loss
)]

// Error taxonomy
pub mod error;

// Signal processing
pub mod dsp;

// Statistics computed from spectra
pub mod analysis;

// Sensor-stream ingestion
pub mod io;

// General utilities
pub mod util;

// Some widely-used re-exports
pub mod prelude;

// Program-wide defaults
pub mod settings;

pub use dsp::spectral::multitaper::{
    compute_multitaper_spectrogram, Adjustment, MultitaperConfig,
    Parallelism, Spectrogram, SpectrogramMetadata,
};
pub use dsp::{Detrend, SeriesInput, TaperSet};
pub use error::{Error, Result};
pub use util::pow2db;
