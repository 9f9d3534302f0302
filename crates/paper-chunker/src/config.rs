//! Configuration for the chunking pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::storage::OutputFormat;

/// Main preprocessing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PreprocessConfig {
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkerConfig,
    /// Text extraction configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Batch processing configuration
    #[serde(default)]
    pub processing: ProcessingConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl PreprocessConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_config(format!("cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        Ok(config)
    }

    /// Render configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::invalid_config(e.to_string()))
    }

    /// Validate every section that can be checked without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate_window()?;
        self.extraction.validate()?;
        if self.processing.threads == Some(0) {
            return Err(Error::invalid_config("processing.threads must be at least 1"));
        }
        Ok(())
    }
}

/// Token window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Directory scanned for input documents
    #[serde(default = "default_source_directory")]
    pub source_directory: PathBuf,
    /// Maximum number of tokens per chunk
    #[serde(default = "default_chunk_size_tokens")]
    pub chunk_size_tokens: usize,
    /// Tokens shared between consecutive chunks of one document
    #[serde(default = "default_overlap_tokens")]
    pub overlap_tokens: usize,
}

fn default_source_directory() -> PathBuf { PathBuf::from("papers") }
fn default_chunk_size_tokens() -> usize { 500 }
fn default_overlap_tokens() -> usize { 50 }

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            source_directory: default_source_directory(),
            chunk_size_tokens: default_chunk_size_tokens(),
            overlap_tokens: default_overlap_tokens(),
        }
    }
}

impl ChunkerConfig {
    /// Build a validated chunker configuration
    pub fn new(
        source_directory: impl Into<PathBuf>,
        chunk_size_tokens: usize,
        overlap_tokens: usize,
    ) -> Result<Self> {
        let config = Self {
            source_directory: source_directory.into(),
            chunk_size_tokens,
            overlap_tokens,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the window parameters
    pub fn validate_window(&self) -> Result<()> {
        if self.chunk_size_tokens == 0 {
            return Err(Error::invalid_config(
                "chunk_size_tokens must be a positive integer",
            ));
        }
        // An overlap >= chunk size would never advance the window
        if self.overlap_tokens >= self.chunk_size_tokens {
            return Err(Error::invalid_config(format!(
                "overlap_tokens ({}) must be smaller than chunk_size_tokens ({})",
                self.overlap_tokens, self.chunk_size_tokens
            )));
        }
        Ok(())
    }

    /// Check the window parameters and that the source directory exists
    pub fn validate(&self) -> Result<()> {
        self.validate_window()?;
        if !self.source_directory.is_dir() {
            return Err(Error::NotFound(self.source_directory.clone()));
        }
        Ok(())
    }

    /// Number of tokens the window advances between chunks
    pub fn step(&self) -> usize {
        self.chunk_size_tokens - self.overlap_tokens
    }
}

/// Text extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// File extensions treated as documents (case-insensitive, no dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Descend into subdirectories of the source directory
    #[serde(default)]
    pub recursive: bool,
    /// Drop lines that look like figure or table captions
    #[serde(default = "default_true")]
    pub skip_captions: bool,
    /// Drop lines that contain only a page number
    #[serde(default = "default_true")]
    pub skip_page_numbers: bool,
    /// Cut the text at the References / Bibliography section
    #[serde(default = "default_true")]
    pub truncate_at_references: bool,
    /// Seconds to wait for the primary PDF extractor before falling back
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_extensions() -> Vec<String> { vec!["pdf".to_string()] }
fn default_true() -> bool { true }
fn default_timeout_secs() -> u64 { 60 }

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            recursive: false,
            skip_captions: true,
            skip_page_numbers: true,
            truncate_at_references: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ExtractionConfig {
    /// Check extraction settings
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(Error::invalid_config(
                "extraction.extensions must list at least one extension",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_config("extraction.timeout_secs must be positive"));
        }
        Ok(())
    }

    /// Whether a path has one of the configured extensions
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Batch processing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Extract documents in parallel (output order is unchanged)
    #[serde(default)]
    pub parallel: bool,
    /// Worker threads for parallel extraction (default: CPU count)
    #[serde(default)]
    pub threads: Option<usize>,
    /// Skip documents whose cleaned text matches an earlier document
    #[serde(default)]
    pub skip_duplicates: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            skip_duplicates: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination file for the chunk records
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    /// Output format (inferred from the extension when unset)
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

fn default_output_path() -> PathBuf { PathBuf::from("pdf_chunks.json") }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: None,
        }
    }
}

impl OutputConfig {
    /// Format that will be used for the configured path
    pub fn resolved_format(&self) -> OutputFormat {
        self.format
            .unwrap_or_else(|| OutputFormat::from_path(&self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PreprocessConfig::default();
        assert_eq!(config.chunking.chunk_size_tokens, 500);
        assert_eq!(config.chunking.overlap_tokens, 50);
        assert_eq!(config.chunking.step(), 450);
        assert_eq!(config.extraction.extensions, vec!["pdf".to_string()]);
        assert!(!config.processing.skip_duplicates);
        assert_eq!(config.output.resolved_format(), OutputFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_window_validation() {
        let zero = ChunkerConfig {
            chunk_size_tokens: 0,
            overlap_tokens: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate_window(), Err(Error::InvalidConfig(_))));

        let equal = ChunkerConfig {
            chunk_size_tokens: 100,
            overlap_tokens: 100,
            ..Default::default()
        };
        assert!(matches!(equal.validate_window(), Err(Error::InvalidConfig(_))));

        let larger = ChunkerConfig {
            chunk_size_tokens: 100,
            overlap_tokens: 150,
            ..Default::default()
        };
        assert!(matches!(larger.validate_window(), Err(Error::InvalidConfig(_))));

        let ok = ChunkerConfig {
            chunk_size_tokens: 1,
            overlap_tokens: 0,
            ..Default::default()
        };
        assert!(ok.validate_window().is_ok());
    }

    #[test]
    fn test_missing_directory() {
        let err = ChunkerConfig::new("/definitely/not/here", 500, 50).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_window_checked_before_directory() {
        let err = ChunkerConfig::new("/definitely/not/here", 10, 10).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_partial_toml() {
        let config = PreprocessConfig::from_toml_str(
            r#"
            [chunking]
            chunk_size_tokens = 256

            [output]
            path = "out/chunks.jsonl"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size_tokens, 256);
        assert_eq!(config.chunking.overlap_tokens, 50);
        assert!(config.extraction.truncate_at_references);
        assert_eq!(config.output.resolved_format(), OutputFormat::JsonLines);
    }

    #[test]
    fn test_bad_toml_is_invalid_config() {
        let err = PreprocessConfig::from_toml_str("[chunking]\nchunk_size_tokens = -3\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = PreprocessConfig::default();
        config.processing.parallel = true;
        config.output.format = Some(OutputFormat::JsonLines);

        let raw = config.to_toml_string().unwrap();
        let parsed = PreprocessConfig::from_toml_str(&raw).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_extension_matching() {
        let config = ExtractionConfig::default();
        assert!(config.matches(Path::new("papers/a.pdf")));
        assert!(config.matches(Path::new("papers/B.PDF")));
        assert!(!config.matches(Path::new("papers/notes.txt")));
        assert!(!config.matches(Path::new("papers/README")));
    }
}
