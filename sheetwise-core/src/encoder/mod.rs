//! Text encodings of a grid or of its compressed form

mod compressed;
mod json;
mod vanilla;

pub use compressed::{CompressedEncoder, LlmProvider};
pub use json::JsonEncoder;
pub use vanilla::VanillaEncoder;

use crate::error::Result;

/// Turns a structure into text for a downstream model
pub trait Encoder {
    type Input: ?Sized;

    fn encode(&self, input: &Self::Input) -> Result<String>;

    /// Rough token count of text this encoder produced
    fn estimate_tokens(&self, encoded: &str) -> usize;
}

/// Every output the toolkit can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Vanilla { include_format: bool },
    Json,
    Compressed(LlmProvider),
}

/// Whitespace-separated words plus runs of punctuation
pub(crate) fn count_words_and_punctuation(text: &str) -> usize {
    let words = text.split_whitespace().count();
    let mut clusters = 0;
    let mut in_cluster = false;
    for ch in text.chars() {
        let punct = ch.is_ascii_punctuation();
        if punct && !in_cluster {
            clusters += 1;
        }
        in_cluster = punct;
    }
    words + clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_words_and_punctuation() {
        assert_eq!(count_words_and_punctuation(""), 0);
        assert_eq!(count_words_and_punctuation("plain words here"), 3);
        // "A1:A5" is one word with one cluster; "->" is a word that is also a cluster
        assert_eq!(count_words_and_punctuation("x -> A1:A5"), 5);
    }
}
