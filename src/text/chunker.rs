//! Sentence-aware text chunking for speech synthesis.
//!
//! Greedy first-fit packing: consecutive sentences are accumulated until
//! adding the next one would exceed the character budget, then the
//! accumulator is flushed as one chunk. Sentences are never split, so a
//! single oversized sentence becomes its own over-length chunk rather than
//! being truncated mid-sentence.

use thiserror::Error;

use super::sentence::{SentenceTokenizer, TokenizeError};

/// Errors raised by text chunking.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// The character budget is zero.
    #[error("invalid configuration: max_chars must be greater than zero")]
    InvalidConfiguration,

    /// The upstream sentence tokenizer failed.
    #[error("sentence tokenization failed: {0}")]
    Tokenization(#[from] TokenizeError),
}

/// Split `text` into chunks of at most `max_chars` characters, breaking
/// only at sentence boundaries.
///
/// Character counts are Unicode scalar counts, not bytes. Chunk order
/// matches input sentence order, no chunk is empty, and rejoining the
/// chunks with single spaces reproduces the sentence stream.
///
/// # Arguments
/// * `text` - Normalized input text (see [`normalize_whitespace`](super::normalize_whitespace))
/// * `max_chars` - Maximum characters per chunk; must be greater than zero
/// * `tokenizer` - Sentence boundary detector
///
/// # Returns
/// Ordered sequence of non-empty chunks; empty input yields an empty
/// sequence.
///
/// # Errors
/// Returns [`ChunkError::InvalidConfiguration`] if `max_chars` is zero, or
/// [`ChunkError::Tokenization`] if the tokenizer fails.
pub fn chunk_text<T>(text: &str, max_chars: usize, tokenizer: &T) -> Result<Vec<String>, ChunkError>
where
    T: SentenceTokenizer + ?Sized,
{
    if max_chars == 0 {
        return Err(ChunkError::InvalidConfiguration);
    }

    let sentences = tokenizer.tokenize(text)?;

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0; // Chars in `current`, including trailing separator

    for sentence in sentences {
        let sentence_len = sentence.chars().count();

        // Flush when adding this sentence (plus a joining space) would
        // overflow the budget. The check only fires when the accumulator is
        // non-empty, so a lone oversized sentence still gets its own chunk.
        if !current.is_empty() && current_len + sentence_len + 1 > max_chars {
            chunks.push(current.trim().to_string());
            current.clear();
            current_len = 0;
        }

        current.push_str(&sentence);
        current.push(' ');
        current_len += sentence_len + 1;
    }

    if !current.is_empty() {
        chunks.push(current.trim().to_string());
    }

    Ok(chunks)
}
