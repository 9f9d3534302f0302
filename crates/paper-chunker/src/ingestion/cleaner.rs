//! Main-body filtering and whitespace normalization

use regex::Regex;

use crate::config::ExtractionConfig;

/// Reduces raw page text to cleaned main-body text
#[derive(Debug, Clone)]
pub struct TextCleaner {
    skip_captions: bool,
    skip_page_numbers: bool,
    truncate_at_references: bool,
    caption: Regex,
    page_number: Regex,
    references: Regex,
    bibliography: Regex,
    hyphen_break: Regex,
    newlines: Regex,
    spaces: Regex,
}

impl TextCleaner {
    /// Create a cleaner for the given extraction settings
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            skip_captions: config.skip_captions,
            skip_page_numbers: config.skip_page_numbers,
            truncate_at_references: config.truncate_at_references,
            caption: compile(r"(?i)^\s*(Figure|Fig\.|Table)\s*\d+"),
            page_number: compile(r"^\d+\s*$"),
            references: compile(r"(?i)\bReferences\b"),
            bibliography: compile(r"(?i)\bBibliography\b"),
            hyphen_break: compile(r"-\s*\n\s*"),
            newlines: compile(r"\n+"),
            spaces: compile(r"[ \t]+"),
        }
    }

    /// Clean a document given as a list of page texts
    pub fn main_body<S: AsRef<str>>(&self, pages: &[S]) -> String {
        let joined = pages
            .iter()
            .map(|page| self.filter_page(page.as_ref()))
            .collect::<Vec<_>>()
            .join("\n");

        let body = if self.truncate_at_references {
            self.truncate_references(&joined)
        } else {
            &joined
        };

        self.normalize(body)
    }

    /// Drop blank, caption and page-number lines and join the rest of a page
    pub fn filter_page(&self, page: &str) -> String {
        let mut out = String::new();
        for line in page.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if self.skip_captions && self.caption.is_match(line) {
                continue;
            }
            if self.skip_page_numbers && self.page_number.is_match(trimmed) {
                continue;
            }

            if !out.is_empty() {
                // "experi-" at a line end continues on the next line
                if ends_with_word_hyphen(&out) {
                    out.pop();
                } else {
                    out.push(' ');
                }
            }
            out.push_str(trimmed);
        }
        out
    }

    /// Cut text at the first References heading, then at the first Bibliography heading
    pub fn truncate_references<'a>(&self, text: &'a str) -> &'a str {
        let text = match self.references.find(text) {
            Some(m) => &text[..m.start()],
            None => text,
        };
        match self.bibliography.find(text) {
            Some(m) => &text[..m.start()],
            None => text,
        }
    }

    /// Join hyphenated line breaks and collapse whitespace runs
    pub fn normalize(&self, text: &str) -> String {
        let text = self.hyphen_break.replace_all(text, "");
        let text = self.newlines.replace_all(&text, "\n");
        let text = self.spaces.replace_all(&text, " ");
        text.trim().to_string()
    }
}

fn compile(pattern: &str) -> Regex {
    // Patterns are fixed literals
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

fn ends_with_word_hyphen(text: &str) -> bool {
    let mut chars = text.chars().rev();
    matches!(
        (chars.next(), chars.next()),
        (Some('-'), Some(c)) if c.is_alphabetic()
    )
}
