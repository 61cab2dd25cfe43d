//! DOCX source extraction.

use super::{file_name, push_tables, ContentExtractor};
use crate::error::Result;
use crate::model::{BlockType, ExtractedContent, Paragraph};
use crate::package::DocxDocument;
use crate::tree::DocumentTree;
use std::path::Path;

/// Extracts body paragraphs, then tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    /// Create a new DOCX extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract an opened document.
    pub fn extract_document(&self, doc: &DocxDocument, source_file: &str) -> ExtractedContent {
        let mut content = ExtractedContent::new(source_file);
        for paragraph in doc.paragraphs() {
            let text = paragraph.plain_text();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            content.push(block_type(&paragraph, text), text);
        }
        push_tables(&mut content, doc.tables());
        content
    }
}

/// Heading and title styles are headings; list styles and dash or bullet
/// prefixed text are list items.
fn block_type(paragraph: &Paragraph, text: &str) -> BlockType {
    let style = paragraph.style_name().to_lowercase();
    if style.contains("heading") || style.contains("title") {
        BlockType::Heading
    } else if style.contains("list") || text.starts_with(['-', '•', '*']) {
        BlockType::List
    } else {
        BlockType::Paragraph
    }
}

impl ContentExtractor for DocxExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn extract(&self, path: &Path) -> Result<ExtractedContent> {
        let doc = DocxDocument::open(path)?;
        Ok(self.extract_document(&doc, &file_name(path)))
    }

    fn extract_bytes(&self, bytes: &[u8], source_file: &str) -> Result<ExtractedContent> {
        let doc = DocxDocument::from_bytes(bytes)?;
        Ok(self.extract_document(&doc, source_file))
    }
}
