//! Sections produced by the mapping collaborator.

use serde::{Deserialize, Serialize};

/// Structural tag of a body item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyItemKind {
    /// Running text
    #[default]
    #[serde(alias = "paragraph")]
    Text,
    /// Secondary heading inside a section
    #[serde(alias = "heading")]
    Subheading,
    /// List item
    #[serde(alias = "list", alias = "list_item")]
    Bullet,
}

impl BodyItemKind {
    /// Rank used when several items carry the same text: the more
    /// structured tag wins.
    pub fn priority(&self) -> u8 {
        match self {
            BodyItemKind::Text => 0,
            BodyItemKind::Subheading => 1,
            BodyItemKind::Bullet => 2,
        }
    }
}

/// One typed entry of a section body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyItem {
    /// Structural tag
    #[serde(rename = "type", default)]
    pub kind: BodyItemKind,

    /// Text content
    pub content: String,
}

impl BodyItem {
    /// Create an item.
    pub fn new(kind: BodyItemKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    /// Running-text item.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(BodyItemKind::Text, content)
    }

    /// Subheading item.
    pub fn subheading(content: impl Into<String>) -> Self {
        Self::new(BodyItemKind::Subheading, content)
    }

    /// Bullet item.
    pub fn bullet(content: impl Into<String>) -> Self {
        Self::new(BodyItemKind::Bullet, content)
    }
}

/// A titled unit of reconstructed content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section title
    pub title: String,

    /// Ordered body items
    #[serde(default)]
    pub body: Vec<BodyItem>,
}

impl Section {
    /// Create a section.
    pub fn new(title: impl Into<String>, body: Vec<BodyItem>) -> Self {
        Self {
            title: title.into(),
            body,
        }
    }

    /// Number of body items.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
