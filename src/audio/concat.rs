//! Ordered concatenation of per-chunk WAV files into one output file.
//!
//! The concatenation step is modeled as a capability so the driver stays
//! free of process-spawning concerns: [`SoxConcatenator`] shells out to the
//! external `sox` tool, [`PcmConcatenator`] joins samples in-process.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Errors raised during audio concatenation.
#[derive(Debug, Error)]
pub enum ConcatError {
    #[error("no input files to concatenate")]
    NoInputs,

    #[error("concatenation tool '{0}' not found on PATH")]
    ToolUnavailable(String),

    #[error("concatenation tool failed with {status}")]
    ToolFailed { status: std::process::ExitStatus },

    #[error("failed to spawn concatenation tool: {0}")]
    Spawn(std::io::Error),

    #[error("sample rate mismatch in {}: found {found} Hz, expected {expected} Hz", path.display())]
    SampleRateMismatch { path: PathBuf, found: u32, expected: u32 },

    #[error("audio format mismatch in {}: {found_channels} ch / {found_bits}-bit, expected {expected_channels} ch / {expected_bits}-bit", path.display())]
    FormatMismatch {
        path: PathBuf,
        found_channels: u16,
        found_bits: u16,
        expected_channels: u16,
        expected_bits: u16,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: hound::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: hound::Error },
}

/// Joins a sequence of audio files into one continuous waveform.
///
/// Inputs share one sample rate and are joined strictly in the given
/// order. A single input is passed through like any other list.
pub trait AudioConcatenator {
    /// Concatenate `inputs` in order into `output`.
    ///
    /// # Errors
    /// Returns an error if `inputs` is empty or the backing tool fails.
    fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ConcatError>;
}

/// Concatenation via the external SoX tool.
pub struct SoxConcatenator {
    binary: String, // Tool name or path, normally "sox"
}

impl Default for SoxConcatenator {
    fn default() -> Self {
        Self::new("sox")
    }
}

impl SoxConcatenator {
    /// Create a concatenator invoking the given binary.
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

impl AudioConcatenator for SoxConcatenator {
    fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ConcatError> {
        if inputs.is_empty() {
            return Err(ConcatError::NoInputs);
        }

        debug!("Running {} --combine concatenate on {} file(s)", self.binary, inputs.len());

        let status = Command::new(&self.binary)
            .arg("--combine")
            .arg("concatenate")
            .args(inputs)
            .arg(output)
            .status()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    ConcatError::ToolUnavailable(self.binary.clone())
                } else {
                    ConcatError::Spawn(e)
                }
            })?;

        if !status.success() {
            return Err(ConcatError::ToolFailed { status });
        }

        Ok(())
    }
}

/// In-process PCM concatenation, with no external tool dependency.
#[derive(Default)]
pub struct PcmConcatenator;

impl AudioConcatenator for PcmConcatenator {
    fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ConcatError> {
        if inputs.is_empty() {
            return Err(ConcatError::NoInputs);
        }

        let mut out_spec: Option<hound::WavSpec> = None;
        let mut samples: Vec<i16> = Vec::new();

        for path in inputs {
            let mut reader = hound::WavReader::open(path).map_err(|source| ConcatError::Read { path: path.clone(), source })?;
            let spec = reader.spec();

            match out_spec {
                None => out_spec = Some(spec),
                Some(expected) if spec.sample_rate != expected.sample_rate => {
                    return Err(ConcatError::SampleRateMismatch {
                        path: path.clone(),
                        found: spec.sample_rate,
                        expected: expected.sample_rate,
                    });
                }
                // Samples are appended raw, so channel layout and bit depth
                // must match as well
                Some(expected) if spec != expected => {
                    return Err(ConcatError::FormatMismatch {
                        path: path.clone(),
                        found_channels: spec.channels,
                        found_bits: spec.bits_per_sample,
                        expected_channels: expected.channels,
                        expected_bits: expected.bits_per_sample,
                    });
                }
                Some(_) => {}
            }

            for sample in reader.samples::<i16>() {
                samples.push(sample.map_err(|source| ConcatError::Read { path: path.clone(), source })?);
            }
        }

        // out_spec is always set here since inputs is non-empty
        let spec = out_spec.expect("at least one input");
        debug!("Joining {} samples into {}", samples.len(), output.display());

        let write = || -> Result<(), hound::Error> {
            let mut writer = hound::WavWriter::create(output, spec)?;
            for sample in &samples {
                writer.write_sample(*sample)?;
            }
            writer.finalize()
        };
        write().map_err(|source| ConcatError::Write { path: output.to_path_buf(), source })?;

        Ok(())
    }
}
