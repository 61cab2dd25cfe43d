//! Paragraph and text-level types.

use serde::{Deserialize, Serialize};

/// A paragraph node of a document tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in the paragraph
    pub runs: Vec<TextRun>,

    /// Paragraph style
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Create a paragraph with a single run in the given named style.
    pub fn styled(style_name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut p = Self::with_text(text);
        p.style.style_name = Some(style_name.into());
        p
    }

    /// Add plain text to the paragraph.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.runs.push(TextRun::new(text));
    }

    /// Add a styled text run.
    pub fn add_run(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    /// First run carrying text, falling back to the first run.
    pub fn first_run(&self) -> Option<&TextRun> {
        self.runs
            .iter()
            .find(|r| !r.text.is_empty())
            .or_else(|| self.runs.first())
    }

    /// Style display name, or empty when unstyled.
    pub fn style_name(&self) -> &str {
        self.style.style_name.as_deref().unwrap_or_default()
    }

    /// Whether the paragraph is centered.
    pub fn is_centered(&self) -> bool {
        self.style.alignment == Alignment::Center
    }
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content (tabs as `\t`, breaks as `\n`)
    pub text: String,

    /// Run-level character formatting
    pub style: TextStyle,
}

impl TextRun {
    /// Create a new text run with inherited formatting.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Create a run with explicit formatting.
    pub fn with_style(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::with_style(
            text,
            TextStyle {
                bold: Some(true),
                ..Default::default()
            },
        )
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Character formatting.
///
/// `None` means "inherit from the paragraph style"; this is what lets a
/// rebuilt paragraph pick up the template's look without restating it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,

    /// Font size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,

    /// Text color (hex, e.g. "1F3864")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Bold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    /// Italic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
}

impl TextStyle {
    /// Check if any attribute is set.
    pub fn has_styling(&self) -> bool {
        self.font_name.is_some()
            || self.font_size.is_some()
            || self.color.is_some()
            || self.bold.is_some()
            || self.italic.is_some()
    }

    /// Fill unset attributes from `fallback`.
    pub fn or(&self, fallback: &TextStyle) -> TextStyle {
        TextStyle {
            font_name: self.font_name.clone().or_else(|| fallback.font_name.clone()),
            font_size: self.font_size.or(fallback.font_size),
            color: self.color.clone().or_else(|| fallback.color.clone()),
            bold: self.bold.or(fallback.bold),
            italic: self.italic.or(fallback.italic),
        }
    }

    /// Whether the text renders bold.
    pub fn is_bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }
}

/// Paragraph-level properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Style identifier inside the package (e.g. "Heading1")
    pub style_id: Option<String>,

    /// Style display name (e.g. "heading 1")
    pub style_name: Option<String>,

    /// Text alignment
    pub alignment: Alignment,

    /// Outline level (0 = top level) when set directly on the paragraph
    pub outline_level: Option<u8>,

    /// Left indent in points
    pub indent_left: Option<f32>,

    /// First-line indent in points (negative for a hanging indent)
    pub first_line_indent: Option<f32>,
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
}

impl Alignment {
    /// Parse a WordprocessingML / DrawingML justification value.
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "center" | "ctr" => Alignment::Center,
            "right" | "end" | "r" => Alignment::Right,
            "both" | "distribute" | "just" | "dist" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }
}
