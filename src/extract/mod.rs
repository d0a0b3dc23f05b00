// Content extraction
//
// Turns an uploaded file into plain text for the query dispatcher. The
// supported formats are a closed set selected by file-name suffix; the
// heavy lifting for binary formats is delegated to external crates
// (`pdf-extract`, `zip`).

pub mod docx;
pub mod pdf;
pub mod txt;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use txt::TxtExtractor;

use crate::Error;
use std::path::Path;

/// The closed set of document formats this client can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Select a format from the file-name suffix, case-insensitively.
    /// Anything outside the supported set is rejected before any byte of
    /// the file is read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let suffix = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match suffix.as_deref() {
            Some("txt") => Ok(DocumentKind::PlainText),
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("docx") => Ok(DocumentKind::Docx),
            _ => Err(Error::UnsupportedFile),
        }
    }
}

/// Extract the full plain-text content of `path` in one shot. The caller
/// gets either the whole document or an error; there are no partial
/// results.
pub fn extract(path: impl AsRef<Path>) -> Result<String, Error> {
    let path = path.as_ref();
    let kind = DocumentKind::from_path(path)?;
    tracing::debug!(path = %path.display(), ?kind, "extracting document");
    let text = match kind {
        DocumentKind::PlainText => TxtExtractor::extract(path)?,
        DocumentKind::Pdf => PdfExtractor::extract(path)?,
        DocumentKind::Docx => DocxExtractor::extract(path)?,
    };
    Ok(text)
}
