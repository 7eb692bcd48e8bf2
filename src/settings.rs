//! Program-wide defaults and recording constants.

/// The default time-half-bandwidth product (`window duration * half
/// bandwidth`), in Hz·s.
pub const DEFAULT_TIME_BANDWIDTH: f64 = 5.0;

/// The default spectrogram window length in seconds.
pub const DEFAULT_WINDOW_SECS: f64 = 5.0;

/// The default spectrogram window step in seconds.
pub const DEFAULT_STEP_SECS: f64 = 1.0;

/// The sample rate of the headband's EEG stream.
pub const EEG_SAMPLE_RATE: f64 = 256.0;

/// The number of samples carried by each EEG packet.
pub const EEG_SAMPLES_PER_PACKET: usize = 12;

/// Electrode names by index, in the headband's standard montage.
pub const EEG_ELECTRODE_NAMES: [&str; 4] = ["TP9", "AF7", "AF8", "TP10"];

/// The default mains frequency notched out of EEG recordings, in Hz.
pub const DEFAULT_LINE_FREQ: f64 = 60.0;

/// The quality factor of the mains notch filter.
pub const NOTCH_Q: f64 = 30.0;

/// Default segment length for Welch's method.
pub const DEFAULT_WELCH_SEGMENT_LEN: usize = 256;

/// The conventional EEG frequency bands, as `(name, low Hz, high Hz)`.
pub const DEFAULT_EEG_BANDS: [(&str, f64, f64); 5] = [
    ("delta", 1.0, 4.0),
    ("theta", 4.0, 8.0),
    ("alpha", 8.0, 13.0),
    ("beta", 13.0, 30.0),
    ("gamma", 30.0, 45.0),
];
