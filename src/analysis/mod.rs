//! Summary statistics of EEG channels.

pub mod band_power;
pub mod complexity;

pub use band_power::{average_power_spectrum, band_powers, BandPower};
pub use complexity::{lempel_ziv_complexity, lzc, LzComplexity};
