//! Uniformly sampled EEG channels assembled from headband packets.

use crate::dsp::filtering::BiquadFilter;
use crate::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One packet of samples from a single electrode.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EegPacket {
    /// Packet sequence number, shared by the packets of every electrode
    /// sampled at the same time.
    pub index: i64,
    pub electrode: usize,
    pub samples: Vec<f64>,
}

/// A named channel of samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    pub name: String,
    pub samples: Vec<f64>,
}

/// EEG channels sharing one sample clock.
#[derive(Clone, Debug, PartialEq)]
pub struct EegRecording {
    pub sample_rate: f64,
    /// Ordered by electrode index.
    pub channels: Vec<Channel>,
}

impl EegRecording {
    /// Lays `packets` out on a common time axis.
    ///
    /// Sample `i` of a packet lands at `(index - first_index) * 12 + i`,
    /// where `first_index` is the smallest index present. Samples missing
    /// from a channel (dropped packets) are linearly interpolated from
    /// their neighbours, holding the nearest value at either end.
    /// `names` labels the electrodes by index; electrodes without a name
    /// are labelled by number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Size`] if the packets carry no samples.
    pub fn from_packets(packets: &[EegPacket], names: &[&str]) -> Result<Self> {
        let Some(first_index) = packets.iter().map(|p| p.index).min() else {
            return Err(Error::Size(String::from("no EEG packets found")));
        };

        let offset = |p: &EegPacket| {
            (p.index - first_index) as usize * EEG_SAMPLES_PER_PACKET
        };

        let len = packets
            .iter()
            .map(|p| offset(p) + p.samples.len())
            .max()
            .unwrap_or(0);

        let mut columns: BTreeMap<usize, Vec<f64>> = BTreeMap::new();

        for packet in packets.iter().filter(|p| !p.samples.is_empty()) {
            let column = columns
                .entry(packet.electrode)
                .or_insert_with(|| vec![f64::NAN; len]);

            let start = offset(packet);
            column[start..start + packet.samples.len()]
                .copy_from_slice(&packet.samples);
        }

        if columns.is_empty() {
            return Err(Error::Size(String::from("EEG packets carry no samples")));
        }

        let missing: usize = columns.values_mut().map(|c| fill_gaps(c)).sum();

        if missing > 0 {
            let total = len * columns.len();
            warn!(
                "{missing}/{total} EEG samples missing ({:.2}%), interpolating",
                100.0 * missing as f64 / total as f64
            );
        }

        let channels: Vec<Channel> = columns
            .into_iter()
            .map(|(electrode, samples)| Channel {
                name: names
                    .get(electrode)
                    .map_or_else(|| format!("electrode {electrode}"), |n| n.to_string()),
                samples,
            })
            .collect();

        debug!(
            channels = channels.len(),
            samples = len,
            packets = packets.len(),
            "assembled EEG recording"
        );

        Ok(Self { sample_rate: EEG_SAMPLE_RATE, channels })
    }

    /// The channel labelled `name`, ignoring case.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    /// The number of samples in each channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, |c| c.samples.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate
    }

    /// Notches `line_freq` Hz (mains interference) out of every channel
    /// with a zero-phase biquad of quality factor [`NOTCH_Q`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `line_freq` is not between 0 Hz and
    /// Nyquist, and [`Error::Size`] if the channels are too short to filter.
    pub fn remove_line_noise(&mut self, line_freq: f64) -> Result<()> {
        let mut filter = BiquadFilter::notch(line_freq, NOTCH_Q, self.sample_rate)?;

        for channel in &mut self.channels {
            filter.filtfilt(&mut channel.samples)?;
        }

        debug!(line_freq, channels = self.channels.len(), "notch filtered EEG");

        Ok(())
    }
}

/// Replaces each `NaN` in `samples` by linear interpolation between the
/// nearest valid samples either side, or by the nearest valid sample at the
/// ends. Returns the number of values replaced.
fn fill_gaps(samples: &mut [f64]) -> usize {
    let valid: Vec<usize> = samples
        .iter()
        .enumerate()
        .filter_map(|(i, x)| (!x.is_nan()).then_some(i))
        .collect();

    let (Some(&first), Some(&last)) = (valid.first(), valid.last()) else {
        return 0;
    };

    let missing = samples.len() - valid.len();

    let head = samples[first];
    samples[..first].fill(head);
    let tail = samples[last];
    samples[last + 1..].fill(tail);

    for pair in valid.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (ya, yb) = (samples[a], samples[b]);
        let span = (b - a) as f64;

        for i in a + 1..b {
            let t = (i - a) as f64 / span;
            samples[i] = t.mul_add(yb - ya, ya);
        }
    }

    missing
}
