//! Chunk file persistence

mod json;

pub use json::{load_chunks, save_chunks};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk encoding of a chunk collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    #[default]
    #[serde(rename = "json")]
    Json,
    /// One JSON record per line
    #[serde(rename = "jsonl", alias = "ndjson")]
    #[cfg_attr(feature = "cli", value(name = "jsonl", alias = "ndjson"))]
    JsonLines,
}

impl OutputFormat {
    /// Infer the format from a file extension (`.jsonl`/`.ndjson` -> JSON Lines)
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("jsonl") | Some("ndjson") => Self::JsonLines,
            _ => Self::Json,
        }
    }
}
