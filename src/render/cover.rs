//! Cover title detection.
//!
//! Templates have no explicit title marker. Each leading paragraph is scored
//! on its style name, size, weight, alignment and position, and the best
//! candidate above a threshold is taken as the cover title.

use crate::analyze::classify::is_top_level_heading;
use crate::model::{Paragraph, StyleSheet};

/// Paragraphs shorter than this (trimmed, in characters) are never a title.
const MIN_TITLE_CHARS: usize = 5;

/// Paragraphs longer than this are penalised as prose.
const LONG_TEXT_CHARS: usize = 150;

/// The attributes a cover candidate is scored on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverCandidate {
    /// Paragraph index
    pub index: usize,

    /// Trimmed text length in characters
    pub text_len: usize,

    /// Lower-cased style name
    pub style_name: String,

    /// Whether the style is a first-level heading
    pub top_level_heading: bool,

    /// Effective font size in points
    pub font_size: Option<f32>,

    /// Effective bold
    pub bold: bool,

    /// Center aligned
    pub centered: bool,
}

impl CoverCandidate {
    /// Collect the scoring attributes of a paragraph.
    ///
    /// Font size and weight come from the first text run, falling back to
    /// what the paragraph style declares.
    pub fn from_paragraph(index: usize, paragraph: &Paragraph, styles: &StyleSheet) -> Self {
        let style_font = paragraph
            .style
            .style_name
            .as_deref()
            .and_then(|name| styles.resolved_font(name))
            .unwrap_or_default();
        let run_font = paragraph
            .first_run()
            .map(|r| r.style.or(&style_font))
            .unwrap_or(style_font);

        Self {
            index,
            text_len: paragraph.plain_text().trim().chars().count(),
            style_name: paragraph.style_name().to_lowercase(),
            top_level_heading: is_top_level_heading(paragraph, styles),
            font_size: run_font.font_size,
            bold: run_font.is_bold(),
            centered: paragraph.is_centered(),
        }
    }
}

/// Score a cover candidate.
///
/// Returns 0 for text too short to be a title.
pub fn cover_score(candidate: &CoverCandidate) -> f32 {
    if candidate.text_len < MIN_TITLE_CHARS {
        return 0.0;
    }

    let mut score = 0.0;
    if candidate.style_name.contains("title") {
        score += 100.0;
    }
    if candidate.style_name.contains("cover") {
        score += 80.0;
    }
    if candidate.top_level_heading {
        score += 50.0;
    }
    if let Some(size) = candidate.font_size {
        score += size.clamp(0.0, 50.0);
    }
    if candidate.bold {
        score += 20.0;
    }
    if candidate.centered {
        score += 15.0;
    }
    score += 10usize.saturating_sub(candidate.index) as f32 * 2.0;
    if candidate.text_len > LONG_TEXT_CHARS {
        score -= 30.0;
    }
    score
}

/// Find the cover title among the first `limit` paragraphs.
///
/// Paragraphs listed in `excluded` are never candidates. Returns the index
/// of the best candidate scoring above `min_score`; ties go to the earlier
/// paragraph.
pub fn find_cover_title(
    paragraphs: &[Paragraph],
    styles: &StyleSheet,
    limit: usize,
    min_score: f32,
    excluded: &[usize],
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (index, paragraph) in paragraphs.iter().take(limit).enumerate() {
        if excluded.contains(&index) {
            continue;
        }
        let candidate = CoverCandidate::from_paragraph(index, paragraph, styles);
        let score = cover_score(&candidate);
        log::debug!(
            "Cover candidate {} '{}' scored {}",
            index,
            candidate.style_name,
            score
        );
        if score > min_score && best.is_none_or(|(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}
