//! PPTX source extraction.

use super::{file_name, push_tables, ContentExtractor};
use crate::error::Result;
use crate::model::{BlockType, ExtractedContent};
use crate::package::SlideDeck;
use std::path::Path;

/// Extracts slide text in presentation order.
///
/// Per slide, text shapes come first (title placeholders as headings,
/// indented paragraphs as list items), then tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxExtractor;

impl PptxExtractor {
    /// Create a new PPTX extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract an opened deck.
    pub fn extract_deck(&self, deck: &SlideDeck, source_file: &str) -> ExtractedContent {
        let mut content = ExtractedContent::new(source_file);
        for slide in deck.slides() {
            for shape in slide.shapes() {
                for (level, text) in &shape.paragraphs {
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    let kind = if shape.is_title {
                        BlockType::Heading
                    } else if *level > 0 {
                        BlockType::List
                    } else {
                        BlockType::Paragraph
                    };
                    content.push(kind, text);
                }
            }
            push_tables(&mut content, slide.tables());
        }
        content
    }
}

impl ContentExtractor for PptxExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["pptx"]
    }

    fn name(&self) -> &str {
        "pptx"
    }

    fn extract(&self, path: &Path) -> Result<ExtractedContent> {
        let deck = SlideDeck::open(path)?;
        Ok(self.extract_deck(&deck, &file_name(path)))
    }

    fn extract_bytes(&self, bytes: &[u8], source_file: &str) -> Result<ExtractedContent> {
        let deck = SlideDeck::from_bytes(bytes)?;
        Ok(self.extract_deck(&deck, source_file))
    }
}
