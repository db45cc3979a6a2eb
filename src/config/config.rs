//! Application configuration and CLI argument parsing.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::voices;

/// Hardware acceleration provider for ONNX models.
/// Auto-detected based on platform if not specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// CPU inference (default fallback, always available)
    #[default]
    Cpu,
    /// NVIDIA CUDA acceleration (Linux only, requires CUDA toolkit)
    Cuda,
    /// Apple CoreML acceleration (macOS only, uses Neural Engine)
    #[value(name = "coreml")]
    CoreMl,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Cpu => write!(f, "cpu"),
            Provider::Cuda => write!(f, "cuda"),
            Provider::CoreMl => write!(f, "coreml"),
        }
    }
}

impl Provider {
    /// Convert to sherpa-rs provider string.
    pub fn as_sherpa_provider(&self) -> &'static str {
        match self {
            Provider::Cpu => "cpu",
            Provider::Cuda => "cuda",
            Provider::CoreMl => "coreml",
        }
    }
}

/// Backend used to join per-chunk audio into the final output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConcatBackend {
    /// External SoX process (`sox --combine concatenate`)
    #[default]
    Sox,
    /// In-process PCM concatenation (no external tool required)
    Pcm,
}

/// Batch narrator application configuration.
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "narrator")]
#[command(author, version, about = "Batch text-to-speech narrator for directories of text files", long_about = None)]
pub struct AppConfig {
    /// List all available TTS voices and exit
    #[arg(long)]
    pub list_voices: bool,

    /// Show detailed information about a specific voice and exit
    #[arg(long)]
    pub voice_info: Option<String>,

    /// Directory containing input .txt files
    #[arg(long, short = 'i', env = "INPUT_DIR", default_value = "frames")]
    pub input_dir: PathBuf,

    /// Directory receiving one .wav file per input file
    #[arg(long, short = 'o', env = "OUTPUT_DIR", default_value = "frames_audio")]
    pub output_dir: PathBuf,

    /// Base directory for per-file temporary chunk audio
    #[arg(long, env = "TEMP_DIR", default_value = "temp_audio")]
    pub temp_dir: PathBuf,

    /// Directory containing the Kokoro TTS model files
    #[arg(long, short = 'd', env = "MODEL_DIR", default_value_os_t = default_model_dir())]
    pub model_dir: PathBuf,

    /// Maximum characters per synthesis chunk (text is packed by sentence,
    /// never split mid-sentence)
    #[arg(long, default_value = "400", value_parser = parse_max_chars)]
    pub max_chars: usize,

    /// Text-to-speech speed multiplier (0.9-0.95 for more natural speech)
    #[arg(long, default_value = "0.95")]
    pub tts_speed: f32,

    /// TTS voice name for Kokoro (e.g., af_bella for high-quality American female).
    /// See <https://huggingface.co/hexgrad/Kokoro-82M/blob/main/VOICES.md>
    #[arg(long, default_value = "af_bella")]
    pub tts_voice: String,

    /// TTS speaker ID for Kokoro model (af_bella=2 in v1.0, bf_emma=21)
    #[arg(long, default_value = "2")]
    pub tts_speaker_id: i32,

    /// Hardware acceleration provider (auto-detected if not specified)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Concatenation backend for joining chunk audio
    #[arg(long, value_enum, default_value = "sox")]
    pub concat: ConcatBackend,

    /// Keep per-chunk temporary audio files after concatenation
    #[arg(long)]
    pub keep_temp: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Number of threads for the TTS model (0 = auto-detect based on CPU cores)
    #[arg(long, default_value = "0")]
    pub tts_threads: usize,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    pub fn from_args() -> Self {
        let mut config = Self::parse();

        // Handle voice listing commands
        if config.list_voices {
            voices::print_voices();
            std::process::exit(0);
        }

        if let Some(ref voice_name) = config.voice_info {
            match voices::print_voice_info(voice_name) {
                Ok(_) => std::process::exit(0),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        config.normalize_thread_counts();
        config
    }

    /// Auto-detect and normalize the TTS thread count.
    ///
    /// With CUDA, a single thread is used because the GPU handles
    /// parallelism internally; multiple CPU threads with GPU inference can
    /// cause resource contention and CUDA allocation failures.
    fn normalize_thread_counts(&mut self) {
        if self.tts_threads == 0 {
            self.tts_threads = if self.effective_provider() == Provider::Cuda {
                1
            } else {
                // Leave headroom for other tasks and prevent oversubscription
                (num_cpus::get() / 3).max(1)
            };
        }

        if self.verbose {
            info!("CPU cores: {}, Provider: {}, TTS threads: {}", num_cpus::get(), self.effective_provider(), self.tts_threads);
        }
    }

    /// Get the effective acceleration provider.
    pub fn effective_provider(&self) -> Provider {
        self.provider.unwrap_or_else(detect_provider)
    }

    /// Get the path to the Kokoro TTS model (multi-lang v1.0 - supports CoreML).
    pub fn tts_model_path(&self) -> PathBuf {
        self.tts_dir().join("model.onnx")
    }

    /// Get the path to the Kokoro TTS voices.bin file.
    pub fn tts_voices_path(&self) -> PathBuf {
        self.tts_dir().join("voices.bin")
    }

    /// Get the path to the TTS tokens file.
    pub fn tts_tokens_path(&self) -> PathBuf {
        self.tts_dir().join("tokens.txt")
    }

    /// Get the path to the TTS data directory.
    pub fn tts_data_dir(&self) -> PathBuf {
        self.tts_dir().join("espeak-ng-data")
    }

    /// Get the path to the TTS dict directory (for Chinese segmentation).
    pub fn tts_dict_dir(&self) -> PathBuf {
        self.tts_dir().join("dict")
    }

    fn tts_dir(&self) -> PathBuf {
        self.model_dir.join("tts").join("kokoro-multi-lang-v1_0")
    }

    /// Get the lexicon file path for Kokoro TTS based on voice name.
    /// The model includes lexicon-us-en.txt (American), lexicon-gb-en.txt (British), lexicon-zh.txt (Chinese).
    /// For English/Chinese, use lexicon files. For other languages, return empty (use lang instead).
    pub fn tts_lexicon(&self) -> String {
        let tts_dir = self.tts_dir();
        if self.tts_voice.len() >= 2 {
            match &self.tts_voice[..2] {
                "af" | "am" => tts_dir.join("lexicon-us-en.txt").to_string_lossy().to_string(),
                "bf" | "bm" => tts_dir.join("lexicon-gb-en.txt").to_string_lossy().to_string(),
                "zf" | "zm" => {
                    // Chinese with English fallback
                    format!("{},{}", tts_dir.join("lexicon-us-en.txt").to_string_lossy(), tts_dir.join("lexicon-zh.txt").to_string_lossy())
                }
                _ => String::new(), // Other languages use lang parameter
            }
        } else {
            tts_dir.join("lexicon-us-en.txt").to_string_lossy().to_string() // Default
        }
    }

    /// Get the language code for non-English voices that need espeak-ng.
    /// For English/Chinese, lexicon files are used instead.
    pub fn tts_language(&self) -> &str {
        if self.tts_voice.len() >= 2 {
            match &self.tts_voice[..2] {
                "ef" | "em" => "es",    // Spanish
                "ff" => "fr",           // French
                "hf" | "hm" => "hi",    // Hindi
                "if" | "im" => "it",    // Italian
                "jf" | "jm" => "ja",    // Japanese
                "pf" | "pm" => "pt-br", // Portuguese BR
                _ => "",                // English/Chinese use lexicon files
            }
        } else {
            "" // Default (use lexicon)
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.exists() {
            anyhow::bail!("Input directory does not exist: {}", self.input_dir.display());
        }

        if !self.model_dir.exists() {
            anyhow::bail!("Model directory does not exist: {}", self.model_dir.display());
        }

        // Check required model files
        let required_files = [self.tts_model_path(), self.tts_voices_path(), self.tts_tokens_path()];

        for path in &required_files {
            if !path.exists() {
                anyhow::bail!("Required model file not found: {}", path.display());
            }
        }

        if self.tts_speed <= 0.0 {
            anyhow::bail!("TTS speed must be positive");
        }

        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        info!("Configuration:");
        info!("  Input directory: {}", self.input_dir.display());
        info!("  Output directory: {}", self.output_dir.display());
        info!("  Temp directory: {}", self.temp_dir.display());
        info!("  Model directory: {}", self.model_dir.display());
        info!("  Max chars per chunk: {}", self.max_chars);
        info!("  TTS voice: {}", self.tts_voice);
        info!("  TTS speed: {}", self.tts_speed);
        info!("  Provider: {}", self.effective_provider());
        info!("  Concat backend: {:?}", self.concat);
        if self.keep_temp {
            info!("  Keeping temporary chunk audio");
        }
    }
}

/// Get the default model directory (~/.narrator/models).
fn default_model_dir() -> PathBuf {
    if let Some(home_dir) = dirs::home_dir() {
        home_dir.join(".narrator").join("models")
    } else {
        PathBuf::from("models")
    }
}

/// Auto-detect the best hardware acceleration provider.
fn detect_provider() -> Provider {
    #[cfg(target_os = "macos")]
    {
        info!("Detected macOS, using CoreML provider");
        Provider::CoreMl
    }

    #[cfg(target_os = "linux")]
    {
        if has_nvidia_gpu() {
            info!("Detected NVIDIA GPU, using CUDA provider");
            Provider::Cuda
        } else {
            info!("No GPU detected, using CPU provider");
            Provider::Cpu
        }
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        info!("Using CPU provider");
        Provider::Cpu
    }
}

/// Check if an NVIDIA GPU is available (Linux only).
#[cfg(target_os = "linux")]
fn has_nvidia_gpu() -> bool {
    use std::path::Path;

    // Check for NVIDIA device files
    let nvidia_paths = [
        "/dev/nvidia0",
        "/dev/nvidiactl",
        "/dev/nvidia-uvm",
        // Jetson devices
        "/dev/nvhost-ctrl",
        "/dev/nvhost-ctrl-gpu",
    ];

    for path in &nvidia_paths {
        if Path::new(path).exists() {
            return true;
        }
    }

    // Check for Tegra (Jetson) devices
    if Path::new("/etc/nv_tegra_release").exists() {
        return true;
    }

    false
}

/// Parse and validate the per-chunk character budget (must be > 0).
fn parse_max_chars(s: &str) -> Result<usize, String> {
    let value: usize = s.parse().map_err(|_| format!("'{}' is not a valid integer", s))?;
    if value == 0 {
        Err("max-chars must be greater than zero".to_string())
    } else {
        Ok(value)
    }
}
