//! Readers for the headband's two recording formats.
//!
//! Streamed recordings are line-delimited JSON, one record per line, with a
//! `type` field naming the sensor (`eeg`, `ppg`, `accel`, ...). Session
//! exports are a single JSON object holding one array of packets per
//! electrode, along with the electrode names.

use super::recording::{EegPacket, EegRecording};
use crate::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};

#[derive(Deserialize)]
struct SessionFile {
    eeg: Vec<Vec<EegPacket>>,
    #[serde(default)]
    metadata: SessionMetadata,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionMetadata {
    #[serde(default)]
    electrode_names: Vec<String>,
}

/// Reads the EEG records of a line-delimited stream. Blank lines and
/// records of other sensors are skipped. With `line_freq`, every channel is
/// notch filtered at that frequency.
///
/// # Errors
///
/// Returns [`Error::Record`] for a line which is not valid JSON or an
/// invalid EEG record, [`Error::Io`] if reading fails, and [`Error::Size`]
/// if the stream holds no EEG samples. Notch failures are described in
/// [`EegRecording::remove_line_noise()`].
pub fn load_eeg_jsonl<R: BufRead>(
    reader: R,
    line_freq: Option<f64>,
) -> Result<EegRecording> {
    let mut packets: Vec<EegPacket> = Vec::new();
    let mut skipped = 0_usize;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        let record_err = |source| Error::Record { line: i + 1, source };
        let record: Value = serde_json::from_str(line).map_err(record_err)?;

        if record.get("type").and_then(Value::as_str) == Some("eeg") {
            packets.push(serde_json::from_value(record).map_err(record_err)?);
        } else {
            skipped += 1;
        }
    }

    debug!(eeg = packets.len(), skipped, "read stream records");

    let recording = EegRecording::from_packets(&packets, &EEG_ELECTRODE_NAMES)?;
    apply_notch(recording, line_freq)
}

/// Reads a single-object session export, notch filtering at `line_freq` if
/// given.
///
/// # Errors
///
/// Returns [`Error::Json`] if the document is malformed, and
/// [`Error::Size`] if it holds no EEG samples.
pub fn load_eeg_session(json: &str, line_freq: Option<f64>) -> Result<EegRecording> {
    let session: SessionFile = serde_json::from_str(json)?;
    let packets: Vec<EegPacket> = session.eeg.into_iter().flatten().collect();

    let names: Vec<&str> = if session.metadata.electrode_names.is_empty() {
        EEG_ELECTRODE_NAMES.to_vec()
    } else {
        session.metadata.electrode_names.iter().map(String::as_str).collect()
    };

    let recording = EegRecording::from_packets(&packets, &names)?;
    apply_notch(recording, line_freq)
}

/// Loads the EEG channels of a recording in either format.
///
/// A file whose first line is a JSON object with a `type` field is read as
/// a stream; anything else is read as a session export.
///
/// # Errors
///
/// Fails if the file cannot be read or parsed; see [`load_eeg_jsonl()`] and
/// [`load_eeg_session()`].
pub fn load_eeg(
    path: impl AsRef<Path>,
    line_freq: Option<f64>,
) -> Result<EegRecording> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let first_line = contents.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let is_stream = serde_json::from_str::<Value>(first_line)
        .is_ok_and(|v| v.get("type").is_some());

    info!(
        "loading {} as a {}",
        path.display(),
        if is_stream { "record stream" } else { "session export" }
    );

    if is_stream {
        load_eeg_jsonl(contents.as_bytes(), line_freq)
    } else {
        load_eeg_session(&contents, line_freq)
    }
}

fn apply_notch(
    mut recording: EegRecording,
    line_freq: Option<f64>,
) -> Result<EegRecording> {
    if let Some(freq) = line_freq {
        recording.remove_line_noise(freq)?;
    }

    Ok(recording)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &str = r#"
{"type":"eeg","index":7,"electrode":0,"timestamp":1.5,"samples":[0,1,2,3,4,5,6,7,8,9,10,11]}
{"type":"ppg","index":3,"ppgChannel":1,"samples":[1,2,3,4,5,6]}
{"type":"eeg","index":7,"electrode":2,"samples":[1,1,1,1,1,1,1,1,1,1,1,1]}

{"type":"eeg","index":8,"electrode":0,"samples":[12,13,14,15,16,17,18,19,20,21,22,23]}
{"type":"eeg","index":8,"electrode":2,"samples":[2,2,2,2,2,2,2,2,2,2,2,2]}
{"type":"accel","sequenceId":1,"samples":[{"x":0,"y":0,"z":1}]}
"#;

    #[test]
    fn stream_skips_other_sensors() {
        let rec = load_eeg_jsonl(STREAM.as_bytes(), None).unwrap();

        assert!(within_tolerance(rec.sample_rate, 256.0, f64::EPSILON));
        assert_eq!(rec.channel_names(), vec!["TP9", "AF8"]);
        assert_eq!(rec.len(), 24);
        assert_eq!(rec.channels[0].samples[13], 13.0);
        assert_eq!(rec.channel("AF8").unwrap().samples[12], 2.0);
    }

    #[test]
    fn bad_lines_are_reported() {
        let stream = "{\"type\":\"ppg\"}\n{\"type\":\"eeg\",\"index\":0}\n";

        match load_eeg_jsonl(stream.as_bytes(), None) {
            Err(Error::Record { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a record error, got {other:?}"),
        }

        assert!(matches!(
            load_eeg_jsonl("not json".as_bytes(), None),
            Err(Error::Record { line: 1, .. })
        ));
    }

    #[test]
    fn stream_without_eeg_is_a_size_error() {
        let stream = "{\"type\":\"ppg\",\"samples\":[]}\n";
        assert!(matches!(load_eeg_jsonl(stream.as_bytes(), None), Err(Error::Size(_))));
    }

    #[test]
    fn session_uses_its_electrode_names() {
        let json = r#"{
            "start_ts": 0,
            "eeg": [
                [{"index": 0, "electrode": 0, "samples": [0,0,0,0,0,0,0,0,0,0,0,0]}],
                [{"index": 0, "electrode": 1, "samples": [1,1,1,1,1,1,1,1,1,1,1,1]}]
            ],
            "metadata": {"electrodeNames": ["Fp1", "Fp2"], "deviceName": "test"}
        }"#;

        let rec = load_eeg_session(json, None).unwrap();

        assert_eq!(rec.channel_names(), vec!["Fp1", "Fp2"]);
        assert_eq!(rec.len(), 12);
        assert!(rec.channel("fp2").unwrap().samples.iter().all(|&x| x == 1.0));
    }

    #[test]
    fn stream_can_be_notch_filtered() {
        let stream: String = (0..40)
            .map(|index| {
                let samples: Vec<String> = (0..12)
                    .map(|i| {
                        let n = (index * 12 + i) as f64;
                        format!("{:.6}", (TAU * 60.0 * n / 256.0).sin())
                    })
                    .collect();
                format!(
                    "{{\"type\":\"eeg\",\"index\":{index},\"electrode\":0,\"samples\":[{}]}}\n",
                    samples.join(",")
                )
            })
            .collect();

        let raw = load_eeg_jsonl(stream.as_bytes(), None).unwrap();
        let notched = load_eeg_jsonl(stream.as_bytes(), Some(DEFAULT_LINE_FREQ)).unwrap();

        let energy = |rec: &EegRecording| -> f64 {
            rec.channels[0].samples[160..320].iter().map(|x| x * x).sum()
        };
        assert_eq!(notched.len(), 480);
        assert!(energy(&notched) < energy(&raw) * 0.01);

        assert!(matches!(
            load_eeg_jsonl(stream.as_bytes(), Some(500.0)),
            Err(Error::Config(_))
        ));
    }
}
