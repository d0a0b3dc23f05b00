// Plain text extractor
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub struct TxtExtractor;

impl TxtExtractor {
    /// Read the file as UTF-8 text, with no transformation applied.
    pub fn extract(path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file: {}", path.display()))
    }
}
