//! Chunk records

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A token window of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Identifier of the document the chunk came from
    #[serde(alias = "source")]
    pub source_document: String,
    /// Position of the chunk within its document
    pub chunk_index: usize,
    /// Text content
    pub text: String,
    /// First token of the chunk (inclusive)
    pub start_offset: usize,
    /// Token after the last one in the chunk (exclusive)
    pub end_offset: usize,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(
        source_document: impl Into<String>,
        chunk_index: usize,
        text: String,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Self {
            source_document: source_document.into(),
            chunk_index,
            text,
            start_offset,
            end_offset,
        }
    }

    /// Number of tokens the chunk spans
    pub fn token_count(&self) -> usize {
        self.end_offset - self.start_offset
    }
}

/// Ordered chunks across all documents, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkCollection(Vec<Chunk>);

impl ChunkCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append one document's chunks
    pub fn extend_document(&mut self, chunks: Vec<Chunk>) {
        self.0.extend(chunks);
    }

    /// Per-document chunk counts, in the order documents first appear
    pub fn document_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for chunk in &self.0 {
            match counts.last_mut() {
                Some((name, count)) if *name == chunk.source_document => *count += 1,
                _ => counts.push((chunk.source_document.as_str(), 1)),
            }
        }
        counts
    }

    /// Chunks belonging to one document
    pub fn for_document<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Chunk> + 'a {
        self.0.iter().filter(move |c| c.source_document == name)
    }

}

impl Deref for ChunkCollection {
    type Target = [Chunk];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Chunk>> for ChunkCollection {
    fn from(chunks: Vec<Chunk>) -> Self {
        Self(chunks)
    }
}

impl IntoIterator for ChunkCollection {
    type Item = Chunk;
    type IntoIter = std::vec::IntoIter<Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChunkCollection {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
