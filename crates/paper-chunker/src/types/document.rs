//! Source document types

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Supported document types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// PDF document
    Pdf,
    /// Plain text or markdown file
    Text,
    /// Anything else
    Unknown,
}

impl DocumentType {
    /// Detect document type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" | "md" | "markdown" => Self::Text,
            _ => Self::Unknown,
        }
    }

    /// Detect document type from a path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Text => "Text File",
            Self::Unknown => "Unknown",
        }
    }
}

/// A document whose text has been extracted and cleaned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Identifier written into chunk records (file name relative to the source directory)
    pub name: String,
    /// Full path on disk
    pub path: PathBuf,
    /// Document type
    pub doc_type: DocumentType,
    /// Cleaned main-body text
    pub text: String,
    /// Page count, when the format has pages
    pub page_count: Option<usize>,
    /// SHA-256 of the cleaned text
    pub content_hash: String,
}

impl SourceDocument {
    /// Create a document from extracted text
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        doc_type: DocumentType,
        text: String,
        page_count: Option<usize>,
    ) -> Self {
        let content_hash = hash_content(&text);
        Self {
            name: name.into(),
            path: path.into(),
            doc_type,
            text,
            page_count,
            content_hash,
        }
    }
}

/// Hash content for duplicate detection
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
