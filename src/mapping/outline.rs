//! Structural mapping without a language model.

use super::{MappingRequest, SemanticMapper};
use crate::error::Result;
use crate::model::{BlockType, BodyItem, Section};
use serde::Serialize;

/// Maps content by its own outline: every heading block opens a section,
/// list blocks become bullets and everything else running text.
///
/// Useful offline and as a baseline; content before the first heading goes
/// into a section titled by chunk position.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineMapper;

#[derive(Serialize)]
struct Response<'a> {
    sections: &'a [Section],
}

impl SemanticMapper for OutlineMapper {
    fn name(&self) -> &str {
        "outline"
    }

    fn map_chunk(&self, request: &MappingRequest<'_>) -> Result<String> {
        let mut sections: Vec<Section> = Vec::new();

        for block in request.blocks {
            let text = block.content.trim();
            if text.is_empty() {
                continue;
            }
            if block.block_type == BlockType::Heading {
                sections.push(Section::new(text, Vec::new()));
                continue;
            }
            if sections.is_empty() {
                sections.push(Section::new(
                    format!("Section {}", request.chunk_index + 1),
                    Vec::new(),
                ));
            }
            let item = match block.block_type {
                BlockType::List => BodyItem::bullet(text),
                _ => BodyItem::text(text),
            };
            if let Some(last) = sections.last_mut() {
                last.body.push(item);
            }
        }

        Ok(serde_json::to_string(&Response {
            sections: &sections,
        })?)
    }
}
