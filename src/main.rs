//! Narrator - a batch text-to-speech driver.
//!
//! Reads UTF-8 text files from an input directory, splits each into
//! speakable chunks at sentence boundaries, synthesizes the chunks with a
//! Kokoro TTS model (sherpa-onnx), and concatenates the per-chunk audio
//! into one WAV file per input file.

mod audio;
mod config;
mod pipeline;
mod text;
mod tts;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use config::AppConfig;
use pipeline::Narrator;

fn main() -> Result<()> {
    // Parse command line arguments
    let config = AppConfig::from_args();

    // Initialize logging with time-only format
    // Respect RUST_LOG env var, fallback to verbose flag, default to info
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| if config.verbose { EnvFilter::try_new("debug") } else { EnvFilter::try_new("info") })
        .unwrap();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    info!("🎙️  Narrator v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("❌ Configuration error: {}", e);
        error!("Check --input-dir and --model-dir, or run with --help.");
        std::process::exit(1);
    }

    config.log_config();

    let mut narrator = Narrator::new(config)?;
    let summary = narrator.run()?;

    if summary.is_clean() {
        info!("✅ All {} file(s) narrated", summary.total());
        Ok(())
    } else {
        error!("❌ Finished with failures ({} of {} file(s) incomplete)", summary.total() - summary.complete - summary.empty, summary.total());
        std::process::exit(1);
    }
}
