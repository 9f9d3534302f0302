//! Core types for the chunking pipeline

pub mod chunk;
pub mod document;
pub mod summary;

pub use chunk::{Chunk, ChunkCollection};
pub use document::{DocumentType, SourceDocument};
pub use summary::{ExtractionFailure, ProcessingSummary, SkippedDocument};
