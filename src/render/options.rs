//! Rendering options and configuration.

use serde::{Deserialize, Serialize};

/// Options for front-matter update and body rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Explicit document title (defaults to the first section title)
    pub document_title: Option<String>,

    /// Rewrite the detected cover title
    pub update_cover: bool,

    /// Rewrite detected table-of-contents entries
    pub update_toc: bool,

    /// Number of leading paragraphs considered for the cover title
    pub cover_scan_limit: usize,

    /// Minimum score a cover candidate must exceed
    pub cover_min_score: f32,

    /// Insert a blank paragraph between sections
    pub section_spacing: bool,

    /// Hanging indent for fallback bullets, in points
    pub bullet_indent_pt: f32,

    /// Glyph prefixed to fallback bullets
    pub bullet_glyph: char,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title.
    pub fn with_document_title(mut self, title: impl Into<String>) -> Self {
        self.document_title = Some(title.into());
        self
    }

    /// Enable or disable the cover title rewrite.
    pub fn with_cover_update(mut self, enabled: bool) -> Self {
        self.update_cover = enabled;
        self
    }

    /// Enable or disable the table-of-contents rewrite.
    pub fn with_toc_update(mut self, enabled: bool) -> Self {
        self.update_toc = enabled;
        self
    }

    /// Set how many leading paragraphs are scanned for a cover title.
    pub fn with_cover_scan_limit(mut self, limit: usize) -> Self {
        self.cover_scan_limit = limit;
        self
    }

    /// Set the cover score threshold.
    pub fn with_cover_min_score(mut self, score: f32) -> Self {
        self.cover_min_score = score;
        self
    }

    /// Enable or disable blank paragraphs between sections.
    pub fn with_section_spacing(mut self, enabled: bool) -> Self {
        self.section_spacing = enabled;
        self
    }

    /// Set the fallback bullet indent.
    pub fn with_bullet_indent(mut self, points: f32) -> Self {
        self.bullet_indent_pt = points.max(0.0);
        self
    }

    /// Set the fallback bullet glyph.
    pub fn with_bullet_glyph(mut self, glyph: char) -> Self {
        self.bullet_glyph = glyph;
        self
    }

    /// Title to place on the cover, given the merged section titles.
    pub fn resolve_title<'a>(&'a self, titles: &'a [String]) -> Option<&'a str> {
        self.document_title
            .as_deref()
            .or_else(|| titles.first().map(String::as_str))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            document_title: None,
            update_cover: true,
            update_toc: true,
            cover_scan_limit: 10,
            cover_min_score: 20.0,
            section_spacing: true,
            bullet_indent_pt: 18.0,
            bullet_glyph: '•',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_title() {
        let titles = vec!["Summary".to_string(), "Skills".to_string()];
        assert_eq!(RenderOptions::new().resolve_title(&titles), Some("Summary"));
        assert_eq!(
            RenderOptions::new()
                .with_document_title(" Annual Report ")
                .resolve_title(&titles),
            Some("Annual Report")
        );
        assert_eq!(RenderOptions::new().resolve_title(&[]), None);
    }

    #[test]
    fn test_partial_json() {
        let options: RenderOptions = serde_json::from_str(r#"{"update_toc":false}"#).unwrap();
        assert!(!options.update_toc);
        assert!(options.update_cover);
        assert_eq!(options.cover_scan_limit, 10);
    }
}
