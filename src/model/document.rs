//! In-memory document tree.

use super::{Paragraph, StyleSheet};
use crate::error::{Error, Result};
use crate::tree::DocumentTree;
use serde::{Deserialize, Serialize};

/// A format-independent document: a style sheet and an ordered paragraph
/// sequence.
///
/// Used for tests, benchmarks and callers that hold content outside any
/// package format. Package backends expose the same operations through
/// [`DocumentTree`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Paragraph styles available to the document
    pub styles: StyleSheet,

    /// Paragraphs in document order
    pub paragraphs: Vec<Paragraph>,

    /// Document title property
    pub title: Option<String>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with the given style sheet.
    pub fn with_styles(styles: StyleSheet) -> Self {
        Self {
            styles,
            ..Default::default()
        }
    }

    /// Add a paragraph.
    pub fn push(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    /// Builder: add a paragraph.
    pub fn with_paragraph(mut self, paragraph: Paragraph) -> Self {
        self.push(paragraph);
        self
    }

    /// Plain text of all paragraphs, one per line.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DocumentTree for Document {
    fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    fn paragraph(&self, index: usize) -> Option<Paragraph> {
        self.paragraphs.get(index).cloned()
    }

    fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    fn replace_text(&mut self, index: usize, text: &str) -> Result<()> {
        let count = self.paragraphs.len();
        let paragraph = self.paragraphs.get_mut(index).ok_or_else(|| {
            Error::Rendering(format!("paragraph {} out of range ({})", index, count))
        })?;

        let target = paragraph
            .runs
            .iter()
            .position(|r| !r.text.is_empty())
            .unwrap_or(0);
        if paragraph.runs.is_empty() {
            paragraph.add_text(text);
            return Ok(());
        }
        for (i, run) in paragraph.runs.iter_mut().enumerate() {
            run.text = if i == target {
                text.to_string()
            } else {
                String::new()
            };
        }
        Ok(())
    }

    fn truncate(&mut self, len: usize) -> Result<()> {
        self.paragraphs.truncate(len);
        Ok(())
    }

    fn append(&mut self, paragraph: Paragraph) -> Result<()> {
        self.paragraphs.push(paragraph);
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }
}
