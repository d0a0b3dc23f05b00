// DOCX extractor
//
// DOCX files are ZIP archives; the body text lives in word/document.xml
// as `<w:t>` runs grouped into `<w:p>` paragraphs.
use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

static TEXT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").unwrap());

pub struct DocxExtractor;

impl DocxExtractor {
    pub fn extract(path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open DOCX file: {}", path.display()))?;
        let mut archive = ZipArchive::new(file)
            .with_context(|| format!("Failed to read DOCX as ZIP: {}", path.display()))?;

        let mut document_xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|_| anyhow!("Invalid DOCX file: word/document.xml not found"))?
            .read_to_string(&mut document_xml)?;

        Ok(Self::raw_text(&document_xml))
    }

    /// Collect the text runs of each paragraph, then join paragraphs with
    /// blank lines the way raw-text DOCX converters do.
    fn raw_text(document_xml: &str) -> String {
        let mut paragraphs = Vec::new();
        for paragraph_xml in document_xml.split("</w:p>") {
            let mut paragraph = String::new();
            for run in TEXT_RUN.captures_iter(paragraph_xml) {
                paragraph.push_str(&decode_entities(&run[1]));
            }
            if !paragraph.trim().is_empty() {
                paragraphs.push(paragraph.trim().to_string());
            }
        }
        paragraphs.join("\n\n")
    }
}

/// Undo the XML escaping OOXML applies to run text.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn fake_docx(document_xml: &str) -> Result<tempfile::NamedTempFile> {
        let file = tempfile::NamedTempFile::new()?;
        let mut writer = zip::ZipWriter::new(file.reopen()?);
        writer.start_file("word/document.xml", FileOptions::default())?;
        writer.write_all(document_xml.as_bytes())?;
        writer.finish()?;
        Ok(file)
    }

    #[test]
    fn extracts_runs_and_paragraphs() -> Result<()> {
        let xml = concat!(
            r#"<w:document><w:body>"#,
            r#"<w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:t xml:space="preserve">world</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>Second paragraph</w:t></w:r></w:p>"#,
            r#"</w:body></w:document>"#
        );
        let file = fake_docx(xml)?;
        let text = DocxExtractor::extract(file.path())?;
        assert_eq!(text, "Hello world\n\nSecond paragraph");
        Ok(())
    }

    #[test]
    fn run_text_is_unescaped() {
        let xml = "<w:p><w:r><w:t>a &amp; b &lt;c&gt;</w:t></w:r></w:p>";
        assert_eq!(DocxExtractor::raw_text(xml), "a & b <c>");
    }

    #[test]
    fn archive_without_document_xml_is_invalid() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        let mut writer = zip::ZipWriter::new(file.reopen()?);
        writer.start_file("unrelated.txt", FileOptions::default())?;
        writer.write_all(b"nope")?;
        writer.finish()?;

        let err = DocxExtractor::extract(file.path()).unwrap_err();
        assert!(err.to_string().contains("word/document.xml not found"));
        Ok(())
    }
}
