//! Document ingestion pipeline: discovery, extraction, chunking

mod chunker;
mod cleaner;
mod discovery;
mod parser;
mod pipeline;
mod tokenizer;

pub use chunker::TokenChunker;
pub use cleaner::TextCleaner;
pub use discovery::{DiscoveredDocument, DocumentDiscovery};
pub use parser::DocumentExtractor;
pub use pipeline::{DocumentChunker, ProcessingOutcome};
pub use tokenizer::{Token, WordTokenizer};
