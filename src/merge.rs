//! Chunk merging.
//!
//! Combines the per-chunk section lists returned by mapping into one ordered
//! list with unique titles. Runs in two passes: first sections split by a
//! chunk cut are re-joined, then any remaining repeats of a title are folded
//! into its first occurrence.

use crate::model::Section;
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// Normalized form of a section title used for identity.
///
/// Unicode NFC, trimmed, lower-cased, inner whitespace collapsed.
pub fn normalize_title(title: &str) -> String {
    title
        .nfc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Merge chunk results into one title-unique section list.
///
/// Relative order of first-seen titles is preserved, and body items of
/// merged sections keep arrival order (earlier chunks first).
pub fn merge_chunks(chunks: Vec<Vec<Section>>) -> Vec<Section> {
    let chunk_count = chunks.len();
    let joined = join_boundaries(chunks);
    let merged = dedup_titles(joined);
    log::info!(
        "Merged {} chunk(s) into {} section(s)",
        chunk_count,
        merged.len()
    );
    merged
}

/// Re-join a section split across a chunk boundary.
///
/// When a chunk opens with the title the previous chunk closed with, the two
/// are one section cut in half.
fn join_boundaries(chunks: Vec<Vec<Section>>) -> Vec<Section> {
    let mut result: Vec<Section> = Vec::new();

    for (index, chunk) in chunks.into_iter().enumerate() {
        let mut sections = chunk.into_iter();
        if let Some(first) = sections.next() {
            match result.last_mut() {
                Some(last) if normalize_title(&last.title) == normalize_title(&first.title) => {
                    log::debug!(
                        "Chunk {} continues section '{}' across the boundary",
                        index + 1,
                        last.title
                    );
                    last.body.extend(first.body);
                }
                _ => result.push(first),
            }
        }
        result.extend(sections);
    }
    result
}

/// Fold later sections into the first one with the same normalized title.
fn dedup_titles(sections: Vec<Section>) -> Vec<Section> {
    let mut result: Vec<Section> = Vec::with_capacity(sections.len());
    let mut seen: HashMap<String, usize> = HashMap::new();

    for section in sections {
        let key = normalize_title(&section.title);
        match seen.get(&key) {
            Some(&at) => {
                log::debug!(
                    "Merging duplicate section '{}' into '{}'",
                    section.title,
                    result[at].title
                );
                result[at].body.extend(section.body);
            }
            None => {
                seen.insert(key, result.len());
                result.push(section);
            }
        }
    }
    result
}
