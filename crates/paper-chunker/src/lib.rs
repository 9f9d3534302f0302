//! paper-chunker: batch preprocessing of PDF papers into overlapping token chunks
//!
//! Walks a directory of documents, extracts their main body text, splits it
//! into fixed-size token windows that overlap, and persists the chunks as
//! JSON records for downstream indexing.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod storage;
pub mod types;

pub use config::{ChunkerConfig, ExtractionConfig, OutputConfig, PreprocessConfig, ProcessingConfig};
pub use error::{Error, Result};
pub use ingestion::{DiscoveredDocument, DocumentChunker, ProcessingOutcome};
pub use storage::{load_chunks, save_chunks, OutputFormat};
pub use types::{
    chunk::{Chunk, ChunkCollection},
    document::{DocumentType, SourceDocument},
    summary::{ExtractionFailure, ProcessingSummary},
};
