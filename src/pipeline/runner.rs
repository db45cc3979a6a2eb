//! Sequential batch driver: read, chunk, synthesize, write, concatenate.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::audio::{AudioConcatenator, PcmConcatenator, SoxConcatenator, write_wav};
use crate::config::{AppConfig, ConcatBackend};
use crate::text::{RuleTokenizer, chunk_text, normalize_whitespace};
use crate::tts::{SpeechSynthesizer, Synthesizer};

use super::report::{BatchSummary, ChunkOutcome, FileOutcome, FileReport, failed_indices, synthesized_paths, total_samples};

/// Sequential batch narrator.
///
/// Processes files one at a time and chunks within a file one at a time;
/// output chunk order is preserved through numbered temp files and the
/// ordered path list handed to the concatenator.
pub struct Narrator {
    config: AppConfig,                        // Application configuration
    synthesizer: Box<dyn SpeechSynthesizer>,  // TTS engine
    concatenator: Box<dyn AudioConcatenator>, // Chunk-joining backend
    tokenizer: RuleTokenizer,                 // Sentence boundary detector
}

impl Narrator {
    /// Create a narrator from validated configuration.
    ///
    /// # Errors
    /// Returns an error if the TTS synthesizer fails to initialize.
    pub fn new(config: AppConfig) -> Result<Self> {
        let synthesizer = Box::new(Synthesizer::new(&config)?);

        let concatenator: Box<dyn AudioConcatenator> = match config.concat {
            ConcatBackend::Sox => Box::new(SoxConcatenator::default()),
            ConcatBackend::Pcm => Box::new(PcmConcatenator),
        };

        Ok(Self { config, synthesizer, concatenator, tokenizer: RuleTokenizer::new() })
    }

    /// Process every `.txt` file in the input directory, in sorted order.
    ///
    /// Per-file failures never abort the batch; they are counted in the
    /// returned summary.
    ///
    /// # Errors
    /// Returns an error only for setup-level failures (unreadable input
    /// directory, output directory creation).
    pub fn run(&mut self) -> Result<BatchSummary> {
        let inputs = collect_input_files(&self.config.input_dir)?;
        let mut summary = BatchSummary::default();

        if inputs.is_empty() {
            warn!("No .txt files found in {}", self.config.input_dir.display());
            return Ok(summary);
        }

        fs::create_dir_all(&self.config.output_dir).with_context(|| format!("failed to create output directory {}", self.config.output_dir.display()))?;
        fs::create_dir_all(&self.config.temp_dir).with_context(|| format!("failed to create temp directory {}", self.config.temp_dir.display()))?;

        info!("Narrating {} file(s) from {}", inputs.len(), self.config.input_dir.display());

        for path in &inputs {
            match self.process_file(path) {
                Ok(report) => {
                    debug!("{}: {} chunk(s), outcome {:?}", report.file.display(), report.chunks.len(), report.outcome);
                    summary.record(&report.outcome);
                }
                Err(e) => {
                    error!("❌ Failed to process {}: {:#}", path.display(), e);
                    summary.errored += 1;
                }
            }
        }

        info!(
            "Batch done: {} complete, {} partial, {} without audio, {} concat failures, {} empty, {} errored",
            summary.complete, summary.partial, summary.no_audio, summary.concat_failed, summary.empty, summary.errored
        );

        Ok(summary)
    }

    /// Process a single input file end to end.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, chunking fails
    /// (tokenizer errors propagate, text is never silently dropped), or the
    /// per-file temp directory cannot be created. Synthesis and
    /// concatenation failures are recorded in the report instead.
    fn process_file(&mut self, path: &Path) -> Result<FileReport> {
        let stem = path.file_stem().and_then(|s| s.to_str()).with_context(|| format!("invalid file name: {}", path.display()))?.to_string();

        let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let text = normalize_whitespace(&raw);

        if text.is_empty() {
            info!("Skipping {}: empty", path.display());
            return Ok(FileReport { file: path.to_path_buf(), outcome: FileOutcome::Empty, chunks: Vec::new() });
        }

        let chunks = chunk_text(&text, self.config.max_chars, &self.tokenizer).with_context(|| format!("failed to chunk {}", path.display()))?;

        info!("Processing {} ({} chars, {} chunks)", path.display(), text.chars().count(), chunks.len());

        let chunk_dir = self.config.temp_dir.join(&stem);
        fs::create_dir_all(&chunk_dir).with_context(|| format!("failed to create {}", chunk_dir.display()))?;

        let mut outcomes: Vec<(usize, ChunkOutcome)> = Vec::with_capacity(chunks.len());

        for (i, chunk) in chunks.iter().enumerate() {
            debug!("Synthesizing chunk {}/{}", i + 1, chunks.len());
            let wav_path = chunk_dir.join(format!("{:04}.wav", i + 1));

            // A failing chunk is skipped, logged, and surfaced in the report;
            // the remaining chunks still get synthesized.
            let outcome = match self.synthesizer.synthesize_chunk(chunk) {
                Ok(samples) if samples.is_empty() => {
                    warn!("Chunk {}/{} of {} produced no samples", i + 1, chunks.len(), path.display());
                    ChunkOutcome::Failed { error: "synthesizer returned no samples".to_string() }
                }
                Ok(samples) => match write_wav(&wav_path, &samples, self.synthesizer.sample_rate()) {
                    Ok(()) => ChunkOutcome::Synthesized { path: wav_path, samples: samples.len() },
                    Err(e) => {
                        warn!("❌ Failed to write chunk {}/{} of {}: {}", i + 1, chunks.len(), path.display(), e);
                        ChunkOutcome::Failed { error: e.to_string() }
                    }
                },
                Err(e) => {
                    warn!("❌ Synthesis failed for chunk {}/{} of {}: {:#}", i + 1, chunks.len(), path.display(), e);
                    ChunkOutcome::Failed { error: format!("{:#}", e) }
                }
            };

            outcomes.push((i, outcome));
        }

        let wav_paths = synthesized_paths(&outcomes);
        let failed = failed_indices(&outcomes);

        if wav_paths.is_empty() {
            warn!("⚠️  No audio generated for {}", path.display());
            return Ok(FileReport { file: path.to_path_buf(), outcome: FileOutcome::NoAudio, chunks: outcomes });
        }

        // A single-chunk file goes through the concatenator like any other;
        // no rename special case.
        let output_path = self.config.output_dir.join(format!("{}.wav", stem));
        let outcome = match self.concatenator.concatenate(&wav_paths, &output_path) {
            Ok(()) => {
                let seconds = total_samples(&outcomes) as f32 / self.synthesizer.sample_rate() as f32;
                info!("✅ Wrote {} ({:.1}s)", output_path.display(), seconds);

                if !self.config.keep_temp
                    && let Err(e) = fs::remove_dir_all(&chunk_dir)
                {
                    warn!("Failed to remove temp directory {}: {}", chunk_dir.display(), e);
                }

                if failed.is_empty() {
                    FileOutcome::Complete { chunks: outcomes.len() }
                } else {
                    warn!("⚠️  Output for {} is missing {} chunk(s)", path.display(), failed.len());
                    FileOutcome::Partial { synthesized: wav_paths.len(), failed }
                }
            }
            Err(e) => {
                error!("❌ Concatenation failed for {}: {}", path.display(), e);
                FileOutcome::ConcatenationFailed { error: e.to_string() }
            }
        };

        Ok(FileReport { file: path.to_path_buf(), outcome, chunks: outcomes })
    }
}

/// Collect the `.txt` files of `dir` in sorted order.
fn collect_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| format!("failed to read input directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("failed to list {}", dir.display()))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ConcatError;
    use clap::Parser;
    use std::fs::File;
    use std::io::Write;

    /// Synthesizer stub returning a fixed number of samples per chunk,
    /// failing on the configured call indices.
    struct StubSynthesizer {
        fail_on: Vec<usize>, // Zero-based chunk call indices that fail
        calls: usize,
        sample_rate: u32,
    }

    impl StubSynthesizer {
        fn new(fail_on: Vec<usize>, sample_rate: u32) -> Self {
            Self { fail_on, calls: 0, sample_rate }
        }
    }

    impl SpeechSynthesizer for StubSynthesizer {
        fn synthesize_chunk(&mut self, _chunk: &str) -> Result<Vec<f32>> {
            let call = self.calls;
            self.calls += 1;
            if self.fail_on.contains(&call) {
                anyhow::bail!("synthesis rejected");
            }
            Ok(vec![0.1; 100])
        }

        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }
    }

    /// Concatenator stub that always fails.
    struct BrokenConcatenator;

    impl AudioConcatenator for BrokenConcatenator {
        fn concatenate(&self, _inputs: &[PathBuf], _output: &Path) -> Result<(), ConcatError> {
            Err(ConcatError::ToolUnavailable("stub".to_string()))
        }
    }

    // Three sentences of ~27 chars each; with --max-chars 30 every
    // sentence becomes its own chunk.
    const THREE_SENTENCES: &str = "Alpha beta gamma delta one. Epsilon zeta eta theta two. Iota kappa lambda mu three.";

    fn test_config(root: &Path) -> AppConfig {
        let arg = |p: PathBuf| p.into_os_string().into_string().unwrap();
        AppConfig::parse_from([
            "narrator".to_string(),
            "--input-dir".to_string(),
            arg(root.join("in")),
            "--output-dir".to_string(),
            arg(root.join("out")),
            "--temp-dir".to_string(),
            arg(root.join("tmp")),
            "--concat".to_string(),
            "pcm".to_string(),
            "--max-chars".to_string(),
            "30".to_string(),
        ])
    }

    fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        File::create(&path).unwrap().write_all(contents.as_bytes()).unwrap();
        path
    }

    fn narrator_with(config: AppConfig, synthesizer: impl SpeechSynthesizer + 'static, concatenator: impl AudioConcatenator + 'static) -> Narrator {
        Narrator {
            config,
            synthesizer: Box::new(synthesizer),
            concatenator: Box::new(concatenator),
            tokenizer: RuleTokenizer::new(),
        }
    }

    #[test]
    fn test_complete_file_concatenates_and_cleans_temp() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir.path().join("in"), "story.txt", THREE_SENTENCES);
        let config = test_config(dir.path());
        fs::create_dir_all(&config.output_dir).unwrap();

        let mut narrator = narrator_with(config, StubSynthesizer::new(vec![], 16000), PcmConcatenator);
        let report = narrator.process_file(&input).unwrap();

        assert_eq!(report.outcome, FileOutcome::Complete { chunks: 3 });
        assert!(!dir.path().join("tmp/story").exists(), "temp chunk dir must be removed");

        // Output carries the synthesizer-reported rate and all 300 samples
        let reader = hound::WavReader::open(dir.path().join("out/story.wav")).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.len(), 300);
    }

    #[test]
    fn test_failing_chunk_yields_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir.path().join("in"), "story.txt", THREE_SENTENCES);
        let config = test_config(dir.path());
        fs::create_dir_all(&config.output_dir).unwrap();

        let mut narrator = narrator_with(config, StubSynthesizer::new(vec![1], 24000), PcmConcatenator);
        let report = narrator.process_file(&input).unwrap();

        match report.outcome {
            FileOutcome::Partial { synthesized, failed } => {
                assert_eq!(synthesized, 2);
                assert_eq!(failed, vec![1]);
            }
            other => panic!("expected partial outcome, got {:?}", other),
        }

        // The surviving chunks are joined in order, the failed one is absent
        let reader = hound::WavReader::open(dir.path().join("out/story.wav")).unwrap();
        assert_eq!(reader.len(), 200);
    }

    #[test]
    fn test_all_chunks_failing_skips_concatenation() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir.path().join("in"), "story.txt", THREE_SENTENCES);
        let config = test_config(dir.path());
        fs::create_dir_all(&config.output_dir).unwrap();

        let mut narrator = narrator_with(config, StubSynthesizer::new(vec![0, 1, 2], 24000), PcmConcatenator);
        let report = narrator.process_file(&input).unwrap();

        assert_eq!(report.outcome, FileOutcome::NoAudio);
        assert_eq!(report.chunks.len(), 3);
        assert!(!dir.path().join("out/story.wav").exists(), "no output without audio");
    }

    #[test]
    fn test_concat_failure_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("in");
        write_input(&input_dir, "a.txt", THREE_SENTENCES);
        write_input(&input_dir, "b.txt", THREE_SENTENCES);
        write_input(&input_dir, "empty.txt", " \n ");
        let config = test_config(dir.path());

        let mut narrator = narrator_with(config, StubSynthesizer::new(vec![], 24000), BrokenConcatenator);
        let summary = narrator.run().unwrap();

        // Both non-empty files hit the concat failure; the run still
        // finished the whole batch
        assert_eq!(summary.concat_failed, 2);
        assert_eq!(summary.empty, 1);
        assert_eq!(summary.complete, 0);
        assert_eq!(summary.total(), 3);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_collect_input_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt", "notes.md", "c.txt"] {
            File::create(dir.path().join(name)).unwrap().write_all(b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub.txt")).unwrap(); // Directory, must be ignored

        let files = collect_input_files(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_collect_input_files_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(collect_input_files(&missing).is_err());
    }
}
