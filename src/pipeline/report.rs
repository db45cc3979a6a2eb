//! Per-chunk and per-file outcome reporting.
//!
//! Synthesis failures are recoverable: the driver accumulates explicit
//! `(chunk index, outcome)` pairs and classifies the file afterwards,
//! instead of relying on caught-and-logged exceptions.

use std::path::PathBuf;

/// Result of synthesizing one chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    /// Chunk synthesized and written to a temporary WAV file.
    Synthesized { path: PathBuf, samples: usize },
    /// Chunk skipped; its audio is missing from the final output.
    Failed { error: String },
}

/// Final outcome for one input file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Every chunk synthesized and concatenated.
    Complete { chunks: usize },
    /// Output produced, but some chunks failed and their audio is missing.
    Partial { synthesized: usize, failed: Vec<usize> },
    /// No chunk succeeded; concatenation was skipped.
    NoAudio,
    /// Audio was synthesized but the concatenation step failed.
    ConcatenationFailed { error: String },
    /// Input file was empty after whitespace normalization; skipped.
    Empty,
}

/// Outcome record for one processed input file.
#[derive(Debug)]
pub struct FileReport {
    pub file: PathBuf,                      // Input file path
    pub outcome: FileOutcome,               // Classified result
    pub chunks: Vec<(usize, ChunkOutcome)>, // Per-chunk outcomes in input order
}

/// Ordered paths of the successfully synthesized chunk files.
pub fn synthesized_paths(chunks: &[(usize, ChunkOutcome)]) -> Vec<PathBuf> {
    chunks
        .iter()
        .filter_map(|(_, outcome)| match outcome {
            ChunkOutcome::Synthesized { path, .. } => Some(path.clone()),
            ChunkOutcome::Failed { .. } => None,
        })
        .collect()
}

/// Total sample count across the successfully synthesized chunks.
pub fn total_samples(chunks: &[(usize, ChunkOutcome)]) -> usize {
    chunks
        .iter()
        .map(|(_, outcome)| match outcome {
            ChunkOutcome::Synthesized { samples, .. } => *samples,
            ChunkOutcome::Failed { .. } => 0,
        })
        .sum()
}

/// Indices of the chunks that failed synthesis.
pub fn failed_indices(chunks: &[(usize, ChunkOutcome)]) -> Vec<usize> {
    chunks
        .iter()
        .filter_map(|(index, outcome)| match outcome {
            ChunkOutcome::Failed { .. } => Some(*index),
            ChunkOutcome::Synthesized { .. } => None,
        })
        .collect()
}

/// Aggregate counts over one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub complete: usize,
    pub partial: usize,
    pub no_audio: usize,
    pub concat_failed: usize,
    pub empty: usize,
    pub errored: usize, // Files that failed before synthesis (read or chunking)
}

impl BatchSummary {
    /// Record one file outcome.
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Complete { .. } => self.complete += 1,
            FileOutcome::Partial { .. } => self.partial += 1,
            FileOutcome::NoAudio => self.no_audio += 1,
            FileOutcome::ConcatenationFailed { .. } => self.concat_failed += 1,
            FileOutcome::Empty => self.empty += 1,
        }
    }

    /// Total number of files seen.
    pub fn total(&self) -> usize {
        self.complete + self.partial + self.no_audio + self.concat_failed + self.empty + self.errored
    }

    /// True when every file produced complete output (empty files are fine).
    pub fn is_clean(&self) -> bool {
        self.partial == 0 && self.no_audio == 0 && self.concat_failed == 0 && self.errored == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthesized(index: usize) -> (usize, ChunkOutcome) {
        (index, ChunkOutcome::Synthesized { path: PathBuf::from(format!("{:04}.wav", index + 1)), samples: 100 })
    }

    fn failed(index: usize) -> (usize, ChunkOutcome) {
        (index, ChunkOutcome::Failed { error: "boom".to_string() })
    }

    #[test]
    fn test_synthesized_paths_preserve_order() {
        let chunks = vec![synthesized(0), failed(1), synthesized(2)];
        let paths = synthesized_paths(&chunks);
        assert_eq!(paths, vec![PathBuf::from("0001.wav"), PathBuf::from("0003.wav")]);
    }

    #[test]
    fn test_total_samples_ignores_failures() {
        let chunks = vec![synthesized(0), failed(1), synthesized(2)];
        assert_eq!(total_samples(&chunks), 200);
    }

    #[test]
    fn test_failed_indices() {
        let chunks = vec![failed(0), synthesized(1), failed(2)];
        assert_eq!(failed_indices(&chunks), vec![0, 2]);
    }

    #[test]
    fn test_summary_counts_and_cleanliness() {
        let mut summary = BatchSummary::default();
        summary.record(&FileOutcome::Complete { chunks: 3 });
        summary.record(&FileOutcome::Empty);
        assert_eq!(summary.total(), 2);
        assert!(summary.is_clean());

        summary.record(&FileOutcome::Partial { synthesized: 2, failed: vec![1] });
        assert!(!summary.is_clean());
        assert_eq!(summary.partial, 1);
    }

    #[test]
    fn test_summary_counts_failures() {
        let mut summary = BatchSummary::default();
        summary.record(&FileOutcome::NoAudio);
        summary.record(&FileOutcome::ConcatenationFailed { error: "sox exited 1".to_string() });
        summary.errored += 1;
        assert_eq!(summary.total(), 3);
        assert!(!summary.is_clean());
    }
}
