//! Slide-deck rendering: one section per slide.

use super::body::{clean_bullet_text, dedup_body};
use super::{RenderOptions, RenderReport};
use crate::model::{BodyItemKind, Section};
use crate::package::SlideDeck;

/// Place sections on the slides of a deck, in order.
///
/// Section `i` replaces the title and body text of slide `i`; formatting of
/// the existing runs is kept. Sections beyond the last slide are counted in
/// the report and skipped, slides beyond the last section are left as they
/// are.
pub fn render_slides(
    deck: &mut SlideDeck,
    sections: &[Section],
    options: &RenderOptions,
) -> RenderReport {
    let mut report = RenderReport::new();
    let slide_count = deck.slide_count();

    let titles: Vec<String> = sections.iter().map(|s| s.title.clone()).collect();
    if let Some(title) = options.resolve_title(&titles) {
        deck.set_title(title);
    }

    for (index, section) in sections.iter().enumerate() {
        let Some(slide) = deck.slide_mut(index) else {
            report.sections_unplaced += 1;
            continue;
        };

        if !slide.set_title(section.title.trim()) {
            log::warn!("{}: no title placeholder for '{}'", slide.part, section.title);
        }

        let items = dedup_body(&section.body);
        report.items_deduplicated += section.body.len() - items.len();
        let lines: Vec<String> = items
            .iter()
            .map(|item| match item.kind {
                BodyItemKind::Bullet => clean_bullet_text(&item.content),
                _ => item.content.trim().to_string(),
            })
            .filter(|line| !line.is_empty())
            .collect();

        if !lines.is_empty() {
            if slide.set_body(&lines) {
                report.items_emitted += lines.len();
            } else {
                log::warn!("{}: no body shape for '{}'", slide.part, section.title);
            }
        }
        report.sections_rendered += 1;
    }

    if report.sections_unplaced > 0 {
        log::warn!(
            "{} section(s) did not fit on {} slide(s)",
            report.sections_unplaced,
            slide_count
        );
    }
    log::info!("Rendered {} section(s) onto slides", report.sections_rendered);
    report
}
