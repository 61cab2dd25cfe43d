//! Paragraph role classification.
//!
//! Templates carry no explicit "this is a heading" marker beyond their style
//! names and outline levels, so roles are inferred from those.

use crate::model::{Paragraph, StyleSheet};

/// Deepest outline level Word treats as a heading; level 9 is body text.
const MAX_HEADING_LEVEL: u8 = 9;

/// Outline level of a heading paragraph, 1-based.
///
/// Recognised from a `heading N` style name (any case or spacing), from an
/// outline level set directly on the paragraph, or from the first style
/// along its `based_on` chain that declares an outline level or a
/// `heading N` name. A declared body-text level (9) ends the search.
pub fn heading_level(paragraph: &Paragraph, styles: &StyleSheet) -> Option<u8> {
    let from_name = [
        paragraph.style.style_name.as_deref(),
        paragraph.style.style_id.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find_map(numbered_heading);
    if from_name.is_some() {
        return from_name;
    }

    if let Some(level) = paragraph.style.outline_level {
        return outline_to_level(level);
    }

    let mut current = paragraph
        .style
        .style_id
        .as_deref()
        .and_then(|id| styles.by_id(id))
        .or_else(|| {
            paragraph
                .style
                .style_name
                .as_deref()
                .and_then(|name| styles.by_name(name))
        });
    // Bounded walk, a malformed sheet may contain a cycle.
    for _ in 0..16 {
        let def = current?;
        if let Some(level) = def.outline_level {
            return outline_to_level(level);
        }
        if let Some(level) = numbered_heading(&def.name).or_else(|| numbered_heading(&def.id)) {
            return Some(level);
        }
        current = def.based_on.as_deref().and_then(|id| styles.by_id(id));
    }
    None
}

fn outline_to_level(outline: u8) -> Option<u8> {
    (outline < MAX_HEADING_LEVEL).then_some(outline + 1)
}

fn numbered_heading(name: &str) -> Option<u8> {
    let squashed: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    squashed
        .strip_prefix("heading")?
        .parse()
        .ok()
        .filter(|level: &u8| (1..=MAX_HEADING_LEVEL).contains(level))
}

/// Whether the paragraph opens a top-level section.
pub fn is_top_level_heading(paragraph: &Paragraph, styles: &StyleSheet) -> bool {
    heading_level(paragraph, styles) == Some(1)
}

/// Whether the paragraph is any kind of heading or title.
pub fn is_heading(paragraph: &Paragraph, styles: &StyleSheet) -> bool {
    if heading_level(paragraph, styles).is_some() {
        return true;
    }
    let name = paragraph.style_name().to_lowercase();
    name.contains("heading") || name.contains("title")
}

/// Whether the paragraph belongs to a table of contents.
pub fn is_toc(paragraph: &Paragraph) -> bool {
    let name = paragraph.style_name().to_lowercase();
    if name.starts_with("toc") || name.contains("contents") {
        return true;
    }
    let text = paragraph.plain_text().trim().to_lowercase();
    text == "contents" || text == "table of contents"
}
