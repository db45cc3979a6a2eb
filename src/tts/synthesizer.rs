//! Text-to-speech synthesizer using Kokoro models.

use anyhow::Result;
use sherpa_rs::OnnxConfig;
use sherpa_rs::tts::{CommonTtsConfig, KokoroTts, KokoroTtsConfig};
use tracing::{debug, info, warn};

use crate::config::AppConfig;

/// Maps a text chunk and voice settings to a waveform.
///
/// The driver depends on this seam rather than on the Kokoro engine
/// directly, mirroring [`AudioConcatenator`](crate::audio::AudioConcatenator).
pub trait SpeechSynthesizer {
    /// Synthesize one text chunk into audio samples.
    ///
    /// # Errors
    /// Returns an error if generation fails; the caller decides whether to
    /// skip the chunk or abort.
    fn synthesize_chunk(&mut self, chunk: &str) -> Result<Vec<f32>>;

    /// Native sample rate of the synthesized audio, in Hz.
    fn sample_rate(&self) -> u32;
}

/// Text-to-speech synthesizer using Kokoro models.
///
/// The synthesizer reports its native sample rate; the driver reads it from
/// here and threads it through WAV writing and concatenation.
pub struct Synthesizer {
    tts: KokoroTts,   // Kokoro TTS engine
    sample_rate: u32, // Output sample rate, verified against the model
    speaker_id: i32,  // Speaker/voice identifier
    speed: f32,       // Speech speed multiplier
}

impl Synthesizer {
    /// Create a new TTS synthesizer.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Returns
    /// A new `Synthesizer` instance.
    ///
    /// # Errors
    /// Returns an error if TTS initialization fails (e.g., missing model files).
    pub fn new(config: &AppConfig) -> Result<Self> {
        let provider = config.effective_provider();

        info!("Initializing Kokoro TTS synthesizer with {} provider", provider);
        info!("TTS voice: {} (speaker ID: {})", config.tts_voice, config.tts_speaker_id);

        let tts_config = KokoroTtsConfig {
            model: config.tts_model_path().to_string_lossy().to_string(),
            voices: config.tts_voices_path().to_string_lossy().to_string(),
            tokens: config.tts_tokens_path().to_string_lossy().to_string(),
            data_dir: config.tts_data_dir().to_string_lossy().to_string(),
            dict_dir: config.tts_dict_dir().to_string_lossy().to_string(),
            lexicon: config.tts_lexicon(),           // Lexicon files for English/Chinese voices
            lang: config.tts_language().to_string(), // For non-English voices without lexicon
            length_scale: 1.0 / config.tts_speed,    // length_scale is inverse of speed
            onnx_config: OnnxConfig {
                provider: provider.as_sherpa_provider().to_string(),
                num_threads: config.tts_threads.try_into().unwrap_or(2),
                debug: config.verbose,
            },
            common_config: CommonTtsConfig { max_num_sentences: 1, ..Default::default() }, // Kokoro only supports 1
        };

        let tts = KokoroTts::new(tts_config);

        // Kokoro uses 24000 Hz; verified against the rate the model reports
        // on each synthesis call
        let sample_rate = 24000_u32;
        info!("TTS sample rate: {} Hz", sample_rate);

        Ok(Self { tts, sample_rate, speaker_id: config.tts_speaker_id, speed: config.tts_speed })
    }
}

impl SpeechSynthesizer for Synthesizer {
    fn synthesize_chunk(&mut self, chunk: &str) -> Result<Vec<f32>> {
        if chunk.trim().is_empty() {
            return Ok(Vec::new());
        }

        debug!("Synthesizing chunk ({} chars)", chunk.chars().count());

        let audio = self.tts.create(chunk, self.speaker_id, self.speed).map_err(|e| anyhow::anyhow!("TTS generation failed: {}", e))?;

        // Adopt the model's reported rate so a model change can't silently
        // mislabel the WAVs
        let model_rate = audio.sample_rate as u32;
        if model_rate != 0 && model_rate != self.sample_rate {
            warn!("Model reports {} Hz instead of {} Hz, using the model's rate", model_rate, self.sample_rate);
            self.sample_rate = model_rate;
        }

        debug!("Generated speech ({} samples)", audio.samples.len());
        Ok(audio.samples)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
