//! Splitting source content into mapping-sized chunks.

use crate::model::{BodyItem, ContentBlock, Section};

/// Split blocks into ordered sub-slices of at most `size` blocks.
///
/// A `size` of zero disables chunking.
pub fn chunk_blocks(blocks: &[ContentBlock], size: usize) -> Vec<&[ContentBlock]> {
    if blocks.is_empty() {
        return Vec::new();
    }
    if size == 0 || blocks.len() <= size {
        return vec![blocks];
    }
    blocks.chunks(size).collect()
}

/// Section standing in for a chunk whose mapping failed.
///
/// Titled by chunk position (1-based) and carrying the chunk's raw blocks as
/// text items, so no source content is lost.
pub fn fallback_section(chunk_index: usize, blocks: &[ContentBlock]) -> Section {
    let body = blocks
        .iter()
        .filter(|b| !b.content.trim().is_empty())
        .map(|b| BodyItem::text(b.content.trim()))
        .collect();
    Section::new(format!("Section {}", chunk_index + 1), body)
}
