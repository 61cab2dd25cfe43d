//! Rendering of merged sections into a template.
//!
//! Word-processing templates go through two passes over the same
//! [`DocumentTree`]: the front matter (cover title, table of contents) is
//! text-patched in place, then everything after the safe zone is replaced by
//! freshly styled section paragraphs. Slide decks take one section per
//! slide.

mod body;
mod cover;
mod front;
mod options;
mod report;
mod slides;
mod toc;

pub use body::{clean_bullet_text, dedup_body, rebuild_body, BodyStats};
pub use cover::{cover_score, find_cover_title, CoverCandidate};
pub use front::{update_front_matter, FrontMatterUpdate};
pub use options::RenderOptions;
pub use report::RenderReport;
pub use slides::render_slides;
pub use toc::{find_toc, rewrite_entry, TocLayout};

use crate::error::{Error, Result};
use crate::model::{Section, StyleProfile};
use crate::tree::DocumentTree;

/// Update the front matter and rebuild the body of a document.
///
/// Any failure is reported as [`Error::Rendering`]; the document is then in
/// an unspecified state and must not be saved.
pub fn render_document<D: DocumentTree + ?Sized>(
    doc: &mut D,
    profile: &StyleProfile,
    sections: &[Section],
    options: &RenderOptions,
) -> Result<RenderReport> {
    render_inner(doc, profile, sections, options).map_err(Error::into_rendering)
}

fn render_inner<D: DocumentTree + ?Sized>(
    doc: &mut D,
    profile: &StyleProfile,
    sections: &[Section],
    options: &RenderOptions,
) -> Result<RenderReport> {
    if profile.safe_zone_end > doc.paragraph_count() {
        return Err(Error::Rendering(format!(
            "safe zone ends at paragraph {} but the document has {}",
            profile.safe_zone_end,
            doc.paragraph_count()
        )));
    }

    let titles: Vec<String> = sections.iter().map(|s| s.title.trim().to_string()).collect();
    let front = update_front_matter(doc, profile, &titles, options)?;
    let body = rebuild_body(doc, profile, sections, options)?;

    Ok(RenderReport {
        profile_summary: profile.summary(),
        safe_zone_end: profile.safe_zone_end,
        cover_title_index: front.cover_title_index,
        toc_entries_found: front.toc_entries_found,
        toc_entries_updated: front.toc_entries_updated,
        paragraphs_removed: body.paragraphs_removed,
        sections_rendered: body.sections,
        items_emitted: body.items_emitted,
        items_deduplicated: body.items_deduplicated,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BodyItem, Document, Paragraph, RoleStyle, StyleDef, StyleSheet};

    fn profile(safe_zone_end: usize) -> StyleProfile {
        StyleProfile {
            heading: RoleStyle::named("Heading 1"),
            subheading: RoleStyle::named("Heading 2"),
            body: RoleStyle::named("Normal"),
            bullet: RoleStyle::named("List Bullet"),
            safe_zone_end,
            first_content_index: (safe_zone_end > 0).then_some(safe_zone_end),
        }
    }

    fn document(texts: &[&str]) -> Document {
        let mut styles = StyleSheet::new();
        styles.add(StyleDef::new("Normal"));
        let mut doc = Document::with_styles(styles);
        for text in texts {
            doc.push(Paragraph::styled("Normal", *text));
        }
        doc
    }

    #[test]
    fn test_safe_zone_survives() {
        let mut doc = document(&["Logo", "Confidential", "Old heading", "Old body"]);
        let sections = vec![Section::new("Intro", vec![BodyItem::text("Hello")])];

        let report =
            render_document(&mut doc, &profile(2), &sections, &RenderOptions::default()).unwrap();

        assert_eq!(report.safe_zone_end, 2);
        assert_eq!(report.paragraphs_removed, 2);
        let texts: Vec<_> = doc.paragraphs.iter().map(|p| p.plain_text()).collect();
        assert_eq!(texts, vec!["Logo", "Confidential", "Intro", "Hello"]);
    }

    #[test]
    fn test_no_heading_replaces_everything() {
        let mut doc = document(&["plain", "text only"]);
        let sections = vec![
            Section::new("A", vec![BodyItem::text("one")]),
            Section::new("B", vec![]),
        ];

        render_document(&mut doc, &profile(0), &sections, &RenderOptions::default()).unwrap();

        let texts: Vec<_> = doc.paragraphs.iter().map(|p| p.plain_text()).collect();
        assert_eq!(texts, vec!["A", "one", "", "B"]);
    }

    #[test]
    fn test_safe_zone_past_end_is_rendering_error() {
        let mut doc = document(&["only"]);
        let err = render_document(&mut doc, &profile(3), &[], &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Rendering(_)));
    }
}
