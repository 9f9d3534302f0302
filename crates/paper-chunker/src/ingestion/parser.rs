//! Document text extraction

use regex::{Captures, Regex};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::types::{DocumentType, SourceDocument};

use super::cleaner::TextCleaner;
use super::discovery::DiscoveredDocument;

/// Typographic characters mapped to ASCII equivalents
const ASCII_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2010}', "-"),   // Hyphen
    ('\u{2011}', "-"),   // Non-breaking hyphen
    ('\u{2012}', "-"),   // Figure dash
    ('\u{2013}', "-"),   // En dash
    ('\u{2014}', "--"),  // Em dash
    ('\u{2212}', "-"),   // Minus sign
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2022}', "* "),  // Bullet
    ('\u{2026}', "..."),
    ('\u{00A0}', " "),   // Non-breaking space
    ('\u{2002}', " "),
    ('\u{2003}', " "),
    ('\u{2009}', " "),
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\0', ""),
];

/// Extracts and cleans the text of one document
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    cleaner: TextCleaner,
    timeout: Duration,
    glyph_name: Regex,
}

impl DocumentExtractor {
    /// Create an extractor for the given settings
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            cleaner: TextCleaner::new(config),
            timeout: Duration::from_secs(config.timeout_secs),
            glyph_name: Regex::new(r"[(<]?\buni([0-9A-Fa-f]{4})\b[)>]?")
                .unwrap_or_else(|e| panic!("invalid glyph pattern: {e}")),
        }
    }

    /// Override how long the primary PDF extractor may run before the fallback takes over
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read a discovered document and produce its cleaned text
    pub fn extract(&self, doc: &DiscoveredDocument) -> Result<SourceDocument> {
        let doc_type = DocumentType::from_path(&doc.path);
        let data = read_document(&doc.name, &doc.path)?;

        let (pages, page_count) = match doc_type {
            DocumentType::Pdf => {
                let pages = self.extract_pdf_pages(&doc.name, &data)?;
                let count = pages.len();
                (pages, Some(count))
            }
            DocumentType::Text => (split_text_pages(&data), None),
            DocumentType::Unknown => {
                return Err(Error::extraction(&doc.name, "unsupported document type"));
            }
        };

        let pages: Vec<String> = pages.iter().map(|p| self.cleanup_glyphs(p)).collect();
        let text = self.cleaner.main_body(&pages);

        if text.trim().is_empty() {
            return Err(Error::extraction(
                &doc.name,
                "no text content could be extracted (document may be image-based)",
            ));
        }

        Ok(SourceDocument::new(
            doc.name.clone(),
            doc.path.clone(),
            doc_type,
            text,
            page_count,
        ))
    }

    /// Extract PDF text page by page, falling back to lopdf on failure or timeout
    fn extract_pdf_pages(&self, name: &str, data: &[u8]) -> Result<Vec<String>> {
        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        // pdf-extract can hang or panic on unusual fonts, so it runs on its own thread
        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem_by_pages(&data_vec)
                .map_err(|e| e.to_string());
            let _ = tx.send(result);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(pages)) => {
                let _ = handle.join();
                if pages.iter().all(|p| p.trim().is_empty()) {
                    tracing::debug!("pdf-extract found no text in {}, trying fallback", name);
                    return extract_pdf_pages_fallback(name, data);
                }
                Ok(pages)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                tracing::warn!("pdf-extract failed on {}: {}, trying fallback", name, e);
                extract_pdf_pages_fallback(name, data)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // The worker thread cannot be cancelled; it is left to finish on its own
                tracing::error!(
                    "PDF extraction of {} timed out after {}s, trying fallback",
                    name,
                    self.timeout.as_secs()
                );
                extract_pdf_pages_fallback(name, data)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                tracing::error!("PDF extraction thread crashed on {}", name);
                extract_pdf_pages_fallback(name, data)
            }
        }
    }

    /// Replace leaked glyph names and typographic characters
    fn cleanup_glyphs(&self, text: &str) -> String {
        let decoded = self.glyph_name.replace_all(text, |caps: &Captures| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        });

        let mut result = String::with_capacity(decoded.len());
        for c in decoded.chars() {
            match ASCII_REPLACEMENTS.iter().find(|(from, _)| *from == c) {
                Some((_, to)) => result.push_str(to),
                None => result.push(c),
            }
        }
        result
    }
}

/// Read a document's bytes; the file handle is released before returning
fn read_document(name: &str, path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::extraction(name, format!("cannot read file: {}", e)))
}

/// Split plain text into pages on form feeds
fn split_text_pages(data: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(data)
        .split('\u{000C}')
        .map(str::to_string)
        .collect()
}

/// Fallback PDF text extraction using lopdf directly
fn extract_pdf_pages_fallback(name: &str, data: &[u8]) -> Result<Vec<String>> {
    let doc = lopdf::Document::load_mem(data)
        .map_err(|e| Error::extraction(name, format!("failed to load PDF: {}", e)))?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                tracing::debug!("Could not extract page {} of {}: {}", page_number, name, e);
                pages.push(String::new());
            }
        }
    }

    if pages.iter().all(|p| p.trim().is_empty()) {
        tracing::warn!("Fallback extraction found no text in {}, PDF may be image-based or encrypted", name);
        return Err(Error::extraction(
            name,
            "PDF has no extractable text (image-based or encrypted)",
        ));
    }

    Ok(pages)
}
