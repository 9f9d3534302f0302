//! Word-boundary tokenization used to size chunks

use unicode_segmentation::UnicodeSegmentation;

/// A token and its byte span in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token text
    pub text: &'a str,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

/// Tokenizer based on Unicode word boundaries (UAX #29).
///
/// Every non-whitespace segment counts as one token, so words, numbers and
/// individual punctuation marks are separate tokens.
pub struct WordTokenizer;

impl WordTokenizer {
    /// Split text into tokens with byte spans
    pub fn tokenize(text: &str) -> Vec<Token<'_>> {
        text.split_word_bound_indices()
            .filter(|(_, segment)| !segment.chars().all(char::is_whitespace))
            .map(|(start, segment)| Token {
                text: segment,
                start,
                end: start + segment.len(),
            })
            .collect()
    }

    /// Count tokens in text
    pub fn count_tokens(text: &str) -> usize {
        text.split_word_bounds()
            .filter(|segment| !segment.chars().all(char::is_whitespace))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_and_punctuation() {
        let tokens: Vec<&str> = WordTokenizer::tokenize("Hello world, this is a test!")
            .iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(tokens, vec!["Hello", "world", ",", "this", "is", "a", "test", "!"]);
    }

    #[test]
    fn test_spans_point_into_source() {
        let text = "  p < 0.05\nwas  significant.";
        for token in WordTokenizer::tokenize(text) {
            assert_eq!(&text[token.start..token.end], token.text);
        }
        assert_eq!(WordTokenizer::count_tokens(text), 6); // p, <, 0.05, was, significant, .
    }

    #[test]
    fn test_empty_and_blank() {
        assert!(WordTokenizer::tokenize("").is_empty());
        assert_eq!(WordTokenizer::count_tokens(" \n\t "), 0);
    }

    #[test]
    fn test_non_ascii() {
        let tokens = WordTokenizer::tokenize("naïve café – résumé");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["naïve", "café", "–", "résumé"]);
    }
}
