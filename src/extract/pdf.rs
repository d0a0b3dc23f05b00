// PDF extractor
//
// Page iteration and text-run joining happen inside the `pdf-extract`
// crate; this client only sees the concatenated result.
use anyhow::{Context, Result};
use pdf_extract::extract_text;
use std::path::Path;

pub struct PdfExtractor;

impl PdfExtractor {
    pub fn extract(path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        extract_text(path)
            .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))
    }
}
