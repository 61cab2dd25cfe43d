//! Editable paragraph sequence shared by all document backends.
//!
//! The reconstruction engine never touches a package format directly. It
//! sees an indexable list of paragraphs that can be read, text-patched in
//! place, truncated and appended to; each backend maps those operations
//! onto its own storage.

use crate::error::Result;
use crate::model::{Paragraph, StyleSheet, TextStyle};

/// An ordered, append/truncate-only paragraph sequence.
pub trait DocumentTree {
    /// Number of paragraphs.
    fn paragraph_count(&self) -> usize;

    /// Snapshot of the paragraph at `index`.
    ///
    /// Style names are resolved to display names.
    fn paragraph(&self, index: usize) -> Option<Paragraph>;

    /// Paragraph styles defined by the document.
    fn styles(&self) -> &StyleSheet;

    /// Replace the visible text of a paragraph.
    ///
    /// The first text-carrying run receives the new text and keeps its
    /// formatting; other runs are emptied. Paragraph properties are not
    /// touched.
    fn replace_text(&mut self, index: usize, text: &str) -> Result<()>;

    /// Drop every paragraph at index `len` and beyond.
    fn truncate(&mut self, len: usize) -> Result<()>;

    /// Append a paragraph at the end of the document.
    ///
    /// `paragraph.style.style_name` names the paragraph style; run styles
    /// carry only the attributes to set explicitly.
    fn append(&mut self, paragraph: Paragraph) -> Result<()>;

    /// Set the document title property.
    fn set_title(&mut self, title: &str);

    /// Whether a paragraph style with this name exists.
    fn has_style(&self, name: &str) -> bool {
        self.styles().contains(name)
    }

    /// Character formatting declared by a named style.
    fn style_font(&self, name: &str) -> Option<TextStyle> {
        self.styles().resolved_font(name)
    }

    /// Snapshot of all paragraphs.
    fn paragraphs(&self) -> Vec<Paragraph> {
        (0..self.paragraph_count())
            .filter_map(|i| self.paragraph(i))
            .collect()
    }
}
