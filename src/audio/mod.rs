//! Audio output module: WAV writing and ordered concatenation.

mod concat;
pub mod writer;

pub use concat::{AudioConcatenator, ConcatError, PcmConcatenator, SoxConcatenator};
pub use writer::{WavError, write_wav};
