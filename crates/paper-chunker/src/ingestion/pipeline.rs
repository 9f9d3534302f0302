//! Batch orchestration: discover, extract, chunk, persist

use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;

use crate::config::{ChunkerConfig, OutputConfig, PreprocessConfig};
use crate::error::{Error, Result};
use crate::storage;
use crate::types::{
    Chunk, ChunkCollection, ExtractionFailure, ProcessingSummary, SkippedDocument, SourceDocument,
};

use super::chunker::TokenChunker;
use super::discovery::{DiscoveredDocument, DocumentDiscovery};
use super::parser::DocumentExtractor;

/// Chunks and summary produced by one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingOutcome {
    /// All chunks in discovery order
    pub chunks: ChunkCollection,
    /// Counts and per-document problems
    pub summary: ProcessingSummary,
}

/// Turns a directory of documents into an ordered chunk collection
pub struct DocumentChunker {
    config: PreprocessConfig,
    extractor: DocumentExtractor,
    chunker: TokenChunker,
}

impl DocumentChunker {
    /// Create a chunker, validating the configuration and the source directory
    pub fn new(config: PreprocessConfig) -> Result<Self> {
        config.validate()?;
        config.chunking.validate()?;

        Ok(Self {
            extractor: DocumentExtractor::new(&config.extraction),
            chunker: TokenChunker::new(&config.chunking),
            config,
        })
    }

    /// Create a chunker with default extraction and output settings
    pub fn with_chunking(chunking: ChunkerConfig) -> Result<Self> {
        Self::new(PreprocessConfig {
            chunking,
            ..Default::default()
        })
    }

    /// Active configuration
    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Enumerate documents in the source directory
    pub fn discover(&self) -> Result<DocumentDiscovery> {
        DocumentDiscovery::new(&self.config.chunking.source_directory, &self.config.extraction)
    }

    /// Extract one document's cleaned text
    pub fn extract(&self, doc: &DiscoveredDocument) -> Result<SourceDocument> {
        self.extractor.extract(doc)
    }

    /// Split one document into token windows
    pub fn chunk(&self, doc: &SourceDocument) -> Vec<Chunk> {
        self.chunker.chunk_document(doc)
    }

    /// Discover, extract and chunk every document
    pub fn process_all(&self) -> Result<ProcessingOutcome> {
        let documents: Vec<DiscoveredDocument> = self.discover()?.collect();
        self.process_documents(&documents, |_| {})
    }

    /// Extract and chunk the given documents, calling `on_document` after each one
    pub fn process_documents<F>(
        &self,
        documents: &[DiscoveredDocument],
        mut on_document: F,
    ) -> Result<ProcessingOutcome>
    where
        F: FnMut(&DiscoveredDocument),
    {
        tracing::info!(
            "Processing {} documents from {}",
            documents.len(),
            self.config.chunking.source_directory.display()
        );

        let mut batch = BatchState::new(documents.len(), self.config.processing.skip_duplicates);

        if self.config.processing.parallel {
            let extracted = self.extract_parallel(documents)?;
            for (doc, result) in documents.iter().zip(extracted) {
                batch.absorb(doc, result, &self.chunker)?;
                on_document(doc);
            }
        } else {
            for doc in documents {
                let result = self.extractor.extract(doc);
                batch.absorb(doc, result, &self.chunker)?;
                on_document(doc);
            }
        }

        let outcome = batch.finish();
        tracing::info!(
            "Processed {} of {} documents into {} chunks ({} failed, {} duplicates skipped)",
            outcome.summary.documents_processed,
            outcome.summary.documents_discovered,
            outcome.summary.chunks_produced,
            outcome.summary.failures.len(),
            outcome.summary.skipped_duplicates.len()
        );
        Ok(outcome)
    }

    /// Write chunks to `path`, using the configured format or the one implied by the extension
    pub fn persist(&self, path: impl AsRef<Path>, chunks: &ChunkCollection) -> Result<()> {
        let output = OutputConfig {
            path: path.as_ref().to_path_buf(),
            format: self.config.output.format,
        };
        storage::save_chunks(&output.path, chunks, output.resolved_format())
    }

    /// Extract on a rayon pool; results keep the input order
    fn extract_parallel(&self, documents: &[DiscoveredDocument]) -> Result<Vec<Result<SourceDocument>>> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = self.config.processing.threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| Error::invalid_config(format!("cannot start extraction pool: {}", e)))?;

        Ok(pool.install(|| {
            documents
                .par_iter()
                .map(|doc| self.extractor.extract(doc))
                .collect()
        }))
    }
}

/// Accumulates output while documents are absorbed in discovery order
struct BatchState {
    chunks: ChunkCollection,
    summary: ProcessingSummary,
    skip_duplicates: bool,
    seen_hashes: HashMap<String, String>,
}

impl BatchState {
    fn new(discovered: usize, skip_duplicates: bool) -> Self {
        Self {
            chunks: ChunkCollection::new(),
            summary: ProcessingSummary {
                documents_discovered: discovered,
                ..Default::default()
            },
            skip_duplicates,
            seen_hashes: HashMap::new(),
        }
    }

    /// Record one document's result; errors that are not tied to the document abort the batch
    fn absorb(
        &mut self,
        doc: &DiscoveredDocument,
        result: Result<SourceDocument>,
        chunker: &TokenChunker,
    ) -> Result<()> {
        let source = match result {
            Ok(source) => source,
            Err(e) if e.is_per_document() => {
                tracing::warn!("Skipping {}: {}", doc.name, e);
                self.summary.failures.push(ExtractionFailure {
                    path: doc.path.clone(),
                    message: e.to_string(),
                });
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if self.skip_duplicates {
            if let Some(original) = self.seen_hashes.get(&source.content_hash) {
                tracing::warn!("Skipping {}: same text as {}", doc.name, original);
                self.summary.skipped_duplicates.push(SkippedDocument {
                    path: doc.path.clone(),
                    duplicate_of: original.clone(),
                });
                return Ok(());
            }
            self.seen_hashes
                .insert(source.content_hash.clone(), source.name.clone());
        }

        let chunks = chunker.chunk_document(&source);
        tracing::debug!(
            "{} ({}): {} pages, {} chunks",
            source.name,
            source.doc_type.display_name(),
            source.page_count.map_or_else(|| "-".to_string(), |n| n.to_string()),
            chunks.len()
        );

        self.summary.documents_processed += 1;
        self.summary.chunks_produced += chunks.len();
        self.chunks.extend_document(chunks);
        Ok(())
    }

    fn finish(self) -> ProcessingOutcome {
        ProcessingOutcome {
            chunks: self.chunks,
            summary: self.summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn text_config(dir: &Path, size: usize, overlap: usize) -> PreprocessConfig {
        let mut config = PreprocessConfig::default();
        config.chunking = ChunkerConfig {
            source_directory: dir.to_path_buf(),
            chunk_size_tokens: size,
            overlap_tokens: overlap,
        };
        config.extraction.extensions = vec!["txt".to_string()];
        config
    }

    fn words(prefix: &str, n: usize) -> String {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_new_rejects_bad_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocumentChunker::new(text_config(dir.path(), 50, 50)).err().unwrap();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_new_rejects_missing_directory() {
        let err = DocumentChunker::new(text_config(Path::new("/no/such/dir"), 50, 5))
            .err()
            .unwrap();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_two_document_scenario() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), words("a", 1200)).unwrap();
        fs::write(dir.path().join("b.txt"), words("b", 300)).unwrap();

        let chunker = DocumentChunker::new(text_config(dir.path(), 500, 50)).unwrap();
        let outcome = chunker.process_all().unwrap();

        assert_eq!(outcome.summary.documents_processed, 2);
        assert_eq!(outcome.summary.chunks_produced, 4);
        let spans: Vec<(&str, usize, usize)> = outcome
            .chunks
            .iter()
            .map(|c| (c.source_document.as_str(), c.start_offset, c.end_offset))
            .collect();
        assert_eq!(
            spans,
            vec![
                ("a.txt", 0, 500),
                ("a.txt", 450, 950),
                ("a.txt", 900, 1200),
                ("b.txt", 0, 300),
            ]
        );
        assert!(outcome.chunks[0].text.starts_with("a0 a1"));
        assert!(outcome.chunks[2].text.ends_with("a1199"));
    }

    #[test]
    fn test_identical_documents_both_chunked_by_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "same body text here").unwrap();
        fs::write(dir.path().join("b.txt"), "same body text here").unwrap();

        let chunker = DocumentChunker::new(text_config(dir.path(), 10, 2)).unwrap();
        let outcome = chunker.process_all().unwrap();

        assert_eq!(outcome.summary.documents_processed, 2);
        assert_eq!(outcome.chunks.document_counts(), vec![("a.txt", 1), ("b.txt", 1)]);
        assert!(outcome.summary.skipped_duplicates.is_empty());
        assert!(outcome.summary.is_complete());
    }

    #[test]
    fn test_duplicates_skipped_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "same body text").unwrap();
        fs::write(dir.path().join("b.txt"), "same body text").unwrap();

        let mut config = text_config(dir.path(), 10, 2);
        config.processing.skip_duplicates = true;
        let outcome = DocumentChunker::new(config).unwrap().process_all().unwrap();

        assert_eq!(outcome.summary.documents_processed, 1);
        assert_eq!(outcome.summary.chunks_produced, 1);
        assert_eq!(outcome.summary.skipped_duplicates.len(), 1);
        assert_eq!(outcome.summary.skipped_duplicates[0].duplicate_of, "a.txt");
        assert!(!outcome.summary.is_complete());
    }

    #[test]
    fn test_batch_aborts_on_non_document_error() {
        let doc = DiscoveredDocument {
            name: "a.txt".to_string(),
            path: "a.txt".into(),
        };
        let chunker = TokenChunker::new(&ChunkerConfig::default());
        let mut batch = BatchState::new(1, false);

        let err = batch
            .absorb(&doc, Err(Error::invalid_config("bad")), &chunker)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        batch
            .absorb(&doc, Err(Error::extraction("a.txt", "broken")), &chunker)
            .unwrap();
        assert_eq!(batch.finish().summary.failures.len(), 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..6 {
            fs::write(dir.path().join(format!("doc{}.txt", i)), words(&format!("d{}w", i), 40 + i * 17)).unwrap();
        }
        fs::write(dir.path().join("empty.txt"), "").unwrap();

        let sequential = DocumentChunker::new(text_config(dir.path(), 16, 4))
            .unwrap()
            .process_all()
            .unwrap();

        let mut config = text_config(dir.path(), 16, 4);
        config.processing.parallel = true;
        config.processing.threads = Some(3);
        let parallel = DocumentChunker::new(config).unwrap().process_all().unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(sequential.summary.failures.len(), 1);
    }

    #[test]
    fn test_progress_callback_sees_every_document() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();

        let chunker = DocumentChunker::new(text_config(dir.path(), 10, 2)).unwrap();
        let docs: Vec<_> = chunker.discover().unwrap().collect();
        let mut seen = Vec::new();
        chunker
            .process_documents(&docs, |d| seen.push(d.name.clone()))
            .unwrap();
        assert_eq!(seen, vec!["a.txt", "b.txt"]);
    }
}
