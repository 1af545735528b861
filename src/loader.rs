//! Document text extraction.
//!
//! The [`DocumentLoader`] trait turns a binary document payload into raw
//! text. [`PdfLoader`] (feature `pdf`) is the production implementation;
//! the system currently ingests PDF only.

use crate::error::Result;

#[cfg(feature = "pdf")]
use crate::error::RagError;

/// Extracts raw text from a binary document payload.
///
/// Implementations have no side effects. A well-formed document with no
/// extractable text yields an empty string, not an error — the chunker then
/// produces zero units.
pub trait DocumentLoader: Send + Sync {
    /// Extract the full text of a document.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ParseError`](crate::error::RagError::ParseError)
    /// if the payload is malformed or of an unsupported format.
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// A [`DocumentLoader`] for PDF payloads, backed by the `pdf-extract` crate.
///
/// Extracted text is cleaned line by line: surrounding whitespace is trimmed
/// and blank lines are dropped, so a pages-of-images PDF collapses to an
/// empty string.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

#[cfg(feature = "pdf")]
impl PdfLoader {
    /// Create a new PDF loader.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "pdf")]
impl DocumentLoader for PdfLoader {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(RagError::ParseError("empty document payload".to_string()));
        }

        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| RagError::ParseError(format!("failed to extract PDF text: {e}")))?;

        let cleaned = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(cleaned)
    }
}
