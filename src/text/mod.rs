//! Text processing module: whitespace normalization, sentence
//! tokenization, and sentence-aware chunking for synthesis.

mod chunker;
mod sentence;

pub use chunker::{ChunkError, chunk_text};
pub use sentence::{RuleTokenizer, SentenceTokenizer, TokenizeError};

/// Collapse all whitespace runs to single spaces and trim the ends.
///
/// Raw text files often carry hard line wraps and indentation that would
/// otherwise leak into sentence boundaries.
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
