//! Multitaper spectrogram of one electrode of a headband EEG recording.
//!
//! The spectrogram (in dB), its axes and metadata are written to stdout as
//! JSON, together with the conventional band powers and the Lempel-Ziv
//! complexity of the channel. Diagnostics go to stderr.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use taperscope::analysis::{band_powers, lzc, BandPower, LzComplexity};
use taperscope::io::load_eeg;
use taperscope::settings::*;
use taperscope::{
    compute_multitaper_spectrogram, Detrend, MultitaperConfig, Parallelism,
    SpectrogramMetadata,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "taperscope")]
#[command(version, about = "Multitaper EEG spectrograms", long_about = None)]
struct Cli {
    /// Recording to analyse (JSONL stream or JSON session export)
    input: PathBuf,

    /// Electrode to analyse
    #[arg(short, long, default_value = "AF7")]
    electrode: String,

    /// Frequency band to keep in Hz (defaults to 0 Hz up to Nyquist)
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
    band: Option<Vec<f64>>,

    /// Time-half-bandwidth product
    #[arg(long, default_value_t = DEFAULT_TIME_BANDWIDTH)]
    time_bandwidth: f64,

    /// Number of tapers (defaults to floor(2 * TW) - 1)
    #[arg(long)]
    tapers: Option<usize>,

    /// Window length in seconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_SECS)]
    window: f64,

    /// Window step in seconds
    #[arg(long, default_value_t = DEFAULT_STEP_SECS)]
    step: f64,

    /// Minimum FFT length
    #[arg(long, default_value_t = 0)]
    min_nfft: usize,

    /// Detrending of each window (linear, constant, off)
    #[arg(long, default_value = "linear")]
    detrend: Detrend,

    /// Mains frequency to notch out of the recording in Hz
    #[arg(long, default_value_t = DEFAULT_LINE_FREQ)]
    line_freq: f64,

    /// Skip the mains notch filter
    #[arg(long)]
    no_notch: bool,

    /// Worker threads; -1 uses every core bar one
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    jobs: i64,

    /// Enable verbose output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct Report<'a> {
    electrode: &'a str,
    times: &'a [f64],
    freqs: &'a [f64],
    /// Non-positive power is written as `null`.
    power_db: Vec<Vec<f64>>,
    metadata: &'a SpectrogramMetadata,
    band_powers: Vec<BandPower>,
    complexity: LzComplexity,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let line_freq = (!cli.no_notch).then_some(cli.line_freq);

    let recording = load_eeg(&cli.input, line_freq)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;

    let channel = recording.channel(&cli.electrode).with_context(|| {
        format!(
            "No electrode named {} (available: {})",
            cli.electrode,
            recording.channel_names().join(", ")
        )
    })?;

    info!(
        "{}: {} samples ({:.1} s) at {} Hz",
        channel.name,
        channel.samples.len(),
        recording.duration_secs(),
        recording.sample_rate
    );

    let mut config = MultitaperConfig::default()
        .with_time_bandwidth(cli.time_bandwidth)
        .with_window(cli.window, cli.step)
        .with_min_nfft(cli.min_nfft)
        .with_detrend(cli.detrend)
        .with_parallelism(Parallelism::from_jobs(cli.jobs)?);

    if let Some(band) = &cli.band {
        config = config.with_freq_range(band[0], band[1]);
    }
    if let Some(k) = cli.tapers {
        config = config.with_num_tapers(k);
    }

    let spectrogram =
        compute_multitaper_spectrogram(&channel.samples, recording.sample_rate, &config)
            .context("Failed to compute spectrogram")?;

    let (num_freqs, num_times) = spectrogram.shape();
    info!(
        "{num_freqs} frequencies x {num_times} windows in {:.3} s",
        spectrogram.metadata.compute_time.as_secs_f64()
    );

    let report = Report {
        electrode: &channel.name,
        times: &spectrogram.times,
        freqs: &spectrogram.freqs,
        power_db: spectrogram.to_db(),
        metadata: &spectrogram.metadata,
        band_powers: band_powers(&channel.samples, recording.sample_rate, &DEFAULT_EEG_BANDS)
            .context("Failed to compute band powers")?,
        complexity: lzc(&channel.samples).context("Failed to compute complexity")?,
    };

    let mut out = BufWriter::new(std::io::stdout().lock());
    serde_json::to_writer_pretty(&mut out, &report).context("Failed to write report")?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
