//! Loading of headband EEG recordings.

pub mod parse;
pub mod recording;

pub use parse::{load_eeg, load_eeg_jsonl, load_eeg_session};
pub use recording::{Channel, EegPacket, EegRecording};
