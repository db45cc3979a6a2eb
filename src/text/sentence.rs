//! Rule-based sentence boundary detection.

use std::collections::HashSet;

use thiserror::Error;

/// Errors raised by sentence tokenization.
#[derive(Debug, Error)]
pub enum TokenizeError {
    /// The input contains bytes that cannot appear in speakable text.
    #[error("malformed text: contains NUL at offset {offset}")]
    MalformedText { offset: usize },
}

/// Splits text into an ordered sequence of sentences.
///
/// The chunker treats this as a fixed capability: sentences come back in
/// input order and are never reordered downstream.
pub trait SentenceTokenizer {
    /// Split `text` into sentences.
    ///
    /// # Errors
    /// Returns an error if the text cannot be tokenized (e.g., malformed
    /// input). Errors must propagate; text is never silently dropped.
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizeError>;
}

/// Punctuation-driven sentence splitter with abbreviation handling.
///
/// Splits on `.`, `!`, and `?`, but keeps common honorifics ("Mr.", "Dr.")
/// and initialisms ("U.S.") inside their sentence.
pub struct RuleTokenizer {
    abbreviations: HashSet<String>, // Lowercased tokens including trailing dot
}

/// Honorifics and common abbreviations that end with a period but do not
/// terminate a sentence.
const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "prof.", "sr.", "jr.", "st.", "vs.", "etc.", "no.", "vol.", "ch.", "fig.", "approx.",
];

impl Default for RuleTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTokenizer {
    /// Create a tokenizer with the default abbreviation set.
    pub fn new() -> Self {
        let abbreviations = DEFAULT_ABBREVIATIONS.iter().map(|a| a.to_string()).collect();
        Self { abbreviations }
    }

    /// Check whether the period at `dot_idx` ends an abbreviation rather
    /// than a sentence.
    fn is_abbreviation(&self, chars: &[char], dot_idx: usize) -> bool {
        if chars.get(dot_idx).copied() != Some('.') {
            return false;
        }

        // Walk back to the start of the word the period attaches to.
        let mut start = dot_idx;
        while start > 0 && chars[start - 1].is_alphabetic() {
            start -= 1;
        }
        if start == dot_idx {
            return false;
        }

        let token: String = chars[start..dot_idx].iter().collect();
        let lookup = format!("{}.", token.to_lowercase());
        if self.abbreviations.contains(&lookup) {
            return true;
        }

        if token.chars().count() == 1 {
            // Interior periods of initialisms like "U.S." or "e.g." are
            // non-terminal.
            if start >= 2 && chars[start - 1] == '.' && chars[start - 2].is_alphabetic() {
                return true;
            }

            // Also avoid splitting at the first period when another "X."
            // follows ("J. R. R. Tolkien").
            let mut next = dot_idx + 1;
            while next < chars.len() && chars[next].is_whitespace() {
                next += 1;
            }
            if next + 1 < chars.len() && chars[next].is_alphabetic() && chars[next + 1] == '.' {
                return true;
            }
        }

        false
    }
}

impl SentenceTokenizer for RuleTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizeError> {
        if let Some(offset) = text.find('\0') {
            return Err(TokenizeError::MalformedText { offset });
        }

        let chars: Vec<char> = text.chars().collect();
        let mut sentences = Vec::new();
        let mut current = String::new();

        for (idx, c) in chars.iter().copied().enumerate() {
            current.push(c);

            let boundary = match c {
                '!' | '?' => true,
                '.' => !self.is_abbreviation(&chars, idx),
                _ => false,
            };

            if boundary {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }

        // Don't forget trailing text without terminal punctuation
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            sentences.push(trimmed.to_string());
        }

        Ok(sentences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_split() {
        let tokenizer = RuleTokenizer::new();
        let sentences = tokenizer.tokenize("Hello world. This is a test.").unwrap();
        assert_eq!(sentences, vec!["Hello world.", "This is a test."]);
    }

    #[test]
    fn test_exclamation_and_question() {
        let tokenizer = RuleTokenizer::new();
        let sentences = tokenizer.tokenize("Stop! Why? Because.").unwrap();
        assert_eq!(sentences, vec!["Stop!", "Why?", "Because."]);
    }

    #[test]
    fn test_trailing_fragment_kept() {
        let tokenizer = RuleTokenizer::new();
        let sentences = tokenizer.tokenize("First sentence. and then some").unwrap();
        assert_eq!(sentences, vec!["First sentence.", "and then some"]);
    }

    #[test]
    fn test_does_not_split_honorifics() {
        let tokenizer = RuleTokenizer::new();
        let sentences = tokenizer.tokenize("Mr. Smith walked in. Mrs. Jones stayed.").unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "Mr. Smith walked in.");
    }

    #[test]
    fn test_keeps_initialism_together() {
        let tokenizer = RuleTokenizer::new();
        let sentences = tokenizer.tokenize("This uses U.S. spelling. Next sentence.").unwrap();
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let tokenizer = RuleTokenizer::new();
        assert!(tokenizer.tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_nul_byte_rejected() {
        let tokenizer = RuleTokenizer::new();
        let err = tokenizer.tokenize("bad\0text").unwrap_err();
        assert!(matches!(err, TokenizeError::MalformedText { offset: 3 }));
    }
}
