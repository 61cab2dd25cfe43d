//! Source content blocks handed over by extraction collaborators.

use serde::{Deserialize, Serialize};

/// Kind of an extracted block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Heading or title text
    Heading,
    /// Running text
    Paragraph,
    /// List item
    List,
    /// Table flattened to text
    Table,
}

impl BlockType {
    /// Upper-case label used in text summaries.
    pub fn label(&self) -> &'static str {
        match self {
            BlockType::Heading => "HEADING",
            BlockType::Paragraph => "PARAGRAPH",
            BlockType::List => "LIST",
            BlockType::Table => "TABLE",
        }
    }
}

/// One ordered block of source content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Stable identifier (`b0`, `b1`, ...)
    pub id: String,

    /// Block kind
    #[serde(rename = "type")]
    pub block_type: BlockType,

    /// Text content
    pub content: String,
}

impl ContentBlock {
    /// Create a block.
    pub fn new(id: impl Into<String>, block_type: BlockType, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type,
            content: content.into(),
        }
    }
}

/// Ordered blocks extracted from one source document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// Blocks in source order
    pub blocks: Vec<ContentBlock>,

    /// Source file name
    pub source_file: String,
}

impl ExtractedContent {
    /// Create an empty container for a source.
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            blocks: Vec::new(),
            source_file: source_file.into(),
        }
    }

    /// Append a block, numbering it after the blocks already present.
    pub fn push(&mut self, block_type: BlockType, content: impl Into<String>) {
        let id = format!("b{}", self.blocks.len());
        self.blocks.push(ContentBlock::new(id, block_type, content));
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Render blocks as `[TYPE] content` paragraphs.
    pub fn to_text_summary(&self) -> String {
        blocks_to_text_summary(&self.blocks)
    }
}

/// Render a block slice as `[TYPE] content` paragraphs.
pub fn blocks_to_text_summary(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .map(|b| format!("[{}] {}", b.block_type.label(), b.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_numbers_blocks() {
        let mut content = ExtractedContent::new("source.docx");
        content.push(BlockType::Heading, "Intro");
        content.push(BlockType::Paragraph, "Body text");

        assert_eq!(content.len(), 2);
        assert_eq!(content.blocks[1].id, "b1");
    }

    #[test]
    fn test_text_summary() {
        let mut content = ExtractedContent::new("source.docx");
        content.push(BlockType::Heading, "Intro");
        content.push(BlockType::List, "- one");

        assert_eq!(content.to_text_summary(), "[HEADING] Intro\n\n[LIST] - one");
    }

    #[test]
    fn test_block_serde_uses_type_key() {
        let block = ContentBlock::new("b0", BlockType::Table, "a | b");
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"id":"b0","type":"table","content":"a | b"}"#);
    }
}
