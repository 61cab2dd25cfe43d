//! Render report with statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a reconstruction job did to its template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderReport {
    /// One-line style profile description
    pub profile_summary: String,

    /// First replaceable paragraph index
    pub safe_zone_end: usize,

    /// Paragraph index of the rewritten cover title
    pub cover_title_index: Option<usize>,

    /// Table-of-contents entries detected in the safe zone
    pub toc_entries_found: usize,

    /// Table-of-contents entries rewritten
    pub toc_entries_updated: usize,

    /// Paragraphs removed after the safe zone
    pub paragraphs_removed: usize,

    /// Sections placed in the document
    pub sections_rendered: usize,

    /// Sections that found no place (slides only)
    pub sections_unplaced: usize,

    /// Body items written
    pub items_emitted: usize,

    /// Body items dropped as duplicates
    pub items_deduplicated: usize,

    /// Mapping chunks
    pub chunks_total: usize,

    /// Mapping chunks that used a fallback section
    pub chunks_fallback: usize,

    /// Where the document was saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// When rendering finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered_at: Option<DateTime<Utc>>,
}

impl RenderReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a cover title was rewritten.
    pub fn cover_updated(&self) -> bool {
        self.cover_title_index.is_some()
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
