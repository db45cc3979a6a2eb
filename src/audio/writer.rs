//! WAV file writing for synthesized audio.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors raised while writing WAV files.
#[derive(Debug, Error)]
pub enum WavError {
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: hound::Error },
}

/// Write mono f32 samples to `path` as 16-bit PCM.
///
/// Samples outside [-1.0, 1.0] are clamped before quantization.
///
/// # Arguments
/// * `path` - Destination file path
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz (as reported by the synthesizer)
///
/// # Errors
/// Returns [`WavError::Write`] on filesystem or encoding failure.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), WavError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let write = || -> Result<(), hound::Error> {
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in samples {
            let clamped = sample.clamp(-1.0, 1.0);
            writer.write_sample((clamped * i16::MAX as f32) as i16)?;
        }
        writer.finalize()
    };

    write().map_err(|source| WavError::Write { path: path.to_path_buf(), source })?;

    debug!("Wrote {} samples to {}", samples.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let samples = vec![0.0f32, 0.5, -0.5, 1.0, -1.0];

        write_wav(&path, &samples, 24000).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len() as usize, samples.len());
    }

    #[test]
    fn test_out_of_range_samples_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clamped.wav");

        write_wav(&path, &[2.0, -2.0], 24000).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let values: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(values[0], i16::MAX);
        assert_eq!(values[1], -i16::MAX);
    }
}
