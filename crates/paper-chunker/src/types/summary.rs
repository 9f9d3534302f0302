//! Batch outcome reporting

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A document that could not be extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    /// Path of the failed document
    pub path: PathBuf,
    /// Error message
    pub message: String,
}

/// A document skipped because its text repeats an earlier document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    /// Path of the skipped document
    pub path: PathBuf,
    /// Name of the earlier document with identical text
    pub duplicate_of: String,
}

/// Counts reported after a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    /// Documents found by discovery
    pub documents_discovered: usize,
    /// Documents extracted and chunked successfully
    pub documents_processed: usize,
    /// Chunks in the output collection
    pub chunks_produced: usize,
    /// Per-document extraction failures
    pub failures: Vec<ExtractionFailure>,
    /// Documents skipped as duplicates
    pub skipped_duplicates: Vec<SkippedDocument>,
}

impl ProcessingSummary {
    /// Whether every discovered document made it into the output
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped_duplicates.is_empty()
    }
}
