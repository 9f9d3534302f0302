//! Overlapping token-window chunking

use crate::config::ChunkerConfig;
use crate::types::{Chunk, SourceDocument};

use super::tokenizer::WordTokenizer;

/// Splits text into fixed-size token windows with overlap
#[derive(Debug, Clone, Copy)]
pub struct TokenChunker {
    /// Maximum tokens per chunk
    chunk_size: usize,
    /// Tokens shared by consecutive chunks
    overlap: usize,
}

impl TokenChunker {
    /// Create a chunker from an already validated configuration
    pub fn new(config: &ChunkerConfig) -> Self {
        debug_assert!(config.overlap_tokens < config.chunk_size_tokens);
        Self {
            chunk_size: config.chunk_size_tokens,
            overlap: config.overlap_tokens,
        }
    }

    /// Token spans `[start, end)` of each window over `total` tokens
    pub fn windows(&self, total: usize) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        if total == 0 {
            return spans;
        }

        let step = self.chunk_size - self.overlap;
        let mut start = 0usize;
        loop {
            let end = (start + self.chunk_size).min(total);
            spans.push((start, end));
            if end >= total {
                break;
            }
            start += step;
        }
        spans
    }

    /// Number of windows produced for `total` tokens
    pub fn expected_chunks(&self, total: usize) -> usize {
        match total {
            0 => 0,
            t if t < self.chunk_size => 1,
            t => {
                let step = self.chunk_size - self.overlap;
                (t - self.overlap).div_ceil(step)
            }
        }
    }

    /// Chunk a document's text
    pub fn chunk_document(&self, doc: &SourceDocument) -> Vec<Chunk> {
        self.chunk_text(&doc.name, &doc.text)
    }

    /// Chunk text attributed to `source`.
    ///
    /// Chunk text is the slice of the source spanning the window's first to
    /// last token, so original spacing and punctuation attachment survive.
    pub fn chunk_text(&self, source: &str, text: &str) -> Vec<Chunk> {
        let tokens = WordTokenizer::tokenize(text);

        self.windows(tokens.len())
            .into_iter()
            .enumerate()
            .map(|(index, (start, end))| {
                let byte_start = tokens[start].start;
                let byte_end = tokens[end - 1].end;
                Chunk::new(
                    source,
                    index,
                    text[byte_start..byte_end].to_string(),
                    start,
                    end,
                )
            })
            .collect()
    }
}
