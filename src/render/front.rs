//! Front-matter update: cover title and table of contents.

use super::cover::find_cover_title;
use super::toc::{find_toc, rewrite_entry};
use super::RenderOptions;
use crate::error::Result;
use crate::model::StyleProfile;
use crate::tree::DocumentTree;

/// What the front-matter pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatterUpdate {
    /// Paragraph index of the rewritten cover title
    pub cover_title_index: Option<usize>,
    /// Table-of-contents entries detected
    pub toc_entries_found: usize,
    /// Table-of-contents entries rewritten
    pub toc_entries_updated: usize,
}

/// Patch the cover title and table-of-contents text inside the safe zone.
///
/// Only text is replaced, in place; no safe-zone paragraph is added,
/// removed or restyled. With no safe zone this is a no-op.
pub fn update_front_matter<D: DocumentTree + ?Sized>(
    doc: &mut D,
    profile: &StyleProfile,
    titles: &[String],
    options: &RenderOptions,
) -> Result<FrontMatterUpdate> {
    let mut update = FrontMatterUpdate::default();
    let zone_end = profile.safe_zone_end.min(doc.paragraph_count());
    if zone_end == 0 {
        return Ok(update);
    }
    let front: Vec<_> = (0..zone_end).filter_map(|i| doc.paragraph(i)).collect();
    let layout = find_toc(&front);
    let toc_indices: Vec<usize> = layout
        .heading
        .into_iter()
        .chain(layout.entries.iter().copied())
        .collect();

    if let Some(title) = options.resolve_title(titles) {
        doc.set_title(title);
        if options.update_cover {
            let limit = options.cover_scan_limit.min(zone_end);
            // table-of-contents paragraphs belong to the TOC rewrite
            if let Some(index) = find_cover_title(
                &front,
                doc.styles(),
                limit,
                options.cover_min_score,
                &toc_indices,
            ) {
                log::info!("Cover title at paragraph {} set to '{}'", index, title);
                doc.replace_text(index, title)?;
                update.cover_title_index = Some(index);
            } else {
                log::debug!("No cover title candidate in the first {} paragraphs", limit);
            }
        }
    }

    if options.update_toc {
        update.toc_entries_found = layout.entries.len();
        for (ordinal, (&index, title)) in layout.entries.iter().zip(titles).enumerate() {
            let text = rewrite_entry(&front[index].plain_text(), ordinal + 1, title);
            doc.replace_text(index, &text)?;
            update.toc_entries_updated += 1;
        }
        if update.toc_entries_found > 0 {
            log::info!(
                "Updated {} of {} table-of-contents entries",
                update.toc_entries_updated,
                update.toc_entries_found
            );
        }
    }
    Ok(update)
}
