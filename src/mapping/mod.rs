//! Semantic mapping of source content into sections.
//!
//! The mapping itself is delegated to a [`SemanticMapper`] collaborator
//! (typically a language model behind some transport). This module chunks
//! the source, calls the collaborator per chunk with retries, validates its
//! responses and substitutes a fallback section for any chunk that keeps
//! failing, so a single bad chunk never aborts a job.

mod chunk;
mod command;
mod outline;
mod response;

pub use chunk::{chunk_blocks, fallback_section};
pub use command::CommandMapper;
pub use outline::OutlineMapper;
pub use response::parse_response;

use crate::error::Result;
use crate::model::{blocks_to_text_summary, ContentBlock, Section};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Instruction handed to the collaborator with every chunk.
pub const DEFAULT_INSTRUCTION: &str = "Organise the source content into titled sections. \
Use only text that appears in the source; do not invent content. \
Respond with JSON only: {\"sections\":[{\"title\":\"...\",\"body\":[{\"type\":\"text|subheading|bullet\",\"content\":\"...\"}]}]}";

/// Options for the mapping stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingOptions {
    /// Maximum blocks per collaborator call (0 = no chunking)
    pub chunk_size: usize,

    /// Extra attempts after a failed call
    pub max_retries: u32,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,

    /// Map chunks concurrently
    pub parallel: bool,

    /// Instruction payload sent with each chunk
    pub instruction: String,
}

impl MappingOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the retry budget.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Enable or disable concurrent chunk mapping.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the instruction payload.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Per-call timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for MappingOptions {
    fn default() -> Self {
        Self {
            chunk_size: 40,
            max_retries: 2,
            timeout_secs: 60,
            parallel: true,
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }
}

/// One collaborator call.
#[derive(Debug, Clone, Serialize)]
pub struct MappingRequest<'a> {
    /// Position of the chunk (0-based)
    pub chunk_index: usize,

    /// Total number of chunks
    pub chunk_count: usize,

    /// Instruction payload
    pub instruction: &'a str,

    /// Blocks of this chunk, in source order
    pub blocks: &'a [ContentBlock],
}

impl MappingRequest<'_> {
    /// Blocks rendered as `[TYPE] content` paragraphs.
    pub fn content_summary(&self) -> String {
        blocks_to_text_summary(self.blocks)
    }
}

/// The semantic mapping collaborator.
///
/// Returns the raw response text for one chunk; validation happens in the
/// engine. Implementations are called concurrently when chunks are mapped
/// in parallel.
pub trait SemanticMapper: Send + Sync {
    /// Collaborator name for logs.
    fn name(&self) -> &str {
        "mapper"
    }

    /// Map one chunk.
    fn map_chunk(&self, request: &MappingRequest<'_>) -> Result<String>;
}

impl<F> SemanticMapper for F
where
    F: Fn(&MappingRequest<'_>) -> Result<String> + Send + Sync,
{
    fn map_chunk(&self, request: &MappingRequest<'_>) -> Result<String> {
        self(request)
    }
}

/// Result of mapping one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkResult {
    /// Position of the chunk
    pub index: usize,

    /// Sections produced for the chunk
    pub sections: Vec<Section>,

    /// Calls made
    pub attempts: u32,

    /// Whether the sections are a synthesized fallback
    pub fallback: bool,
}

/// Results of all chunks, in chunk order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingOutcome {
    /// Per-chunk results
    pub chunks: Vec<ChunkResult>,
}

impl MappingOutcome {
    /// Number of chunks that fell back.
    pub fn fallback_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.fallback).count()
    }

    /// Section lists ready for merging.
    pub fn into_sections(self) -> Vec<Vec<Section>> {
        self.chunks.into_iter().map(|c| c.sections).collect()
    }
}

/// Map source blocks into per-chunk section lists.
///
/// Never fails: a chunk whose calls all fail is replaced by
/// [`fallback_section`]. Results are returned in chunk order even when
/// chunks are mapped concurrently.
pub fn map_blocks<M: SemanticMapper + ?Sized>(
    mapper: &M,
    blocks: &[ContentBlock],
    options: &MappingOptions,
) -> MappingOutcome {
    let chunks = chunk_blocks(blocks, options.chunk_size);
    let count = chunks.len();
    log::info!(
        "Mapping {} blocks in {} chunk(s) with '{}'",
        blocks.len(),
        count,
        mapper.name()
    );

    let map_one = |(index, chunk): (usize, &&[ContentBlock])| {
        map_chunk_with_retry(mapper, index, count, chunk, options)
    };
    let results: Vec<ChunkResult> = if options.parallel && count > 1 {
        chunks.par_iter().enumerate().map(map_one).collect()
    } else {
        chunks.iter().enumerate().map(map_one).collect()
    };

    let outcome = MappingOutcome { chunks: results };
    if outcome.fallback_count() > 0 {
        log::warn!(
            "{} of {} chunk(s) used fallback sections",
            outcome.fallback_count(),
            count
        );
    }
    outcome
}

fn map_chunk_with_retry<M: SemanticMapper + ?Sized>(
    mapper: &M,
    index: usize,
    count: usize,
    blocks: &[ContentBlock],
    options: &MappingOptions,
) -> ChunkResult {
    let request = MappingRequest {
        chunk_index: index,
        chunk_count: count,
        instruction: &options.instruction,
        blocks,
    };

    let budget = options.max_retries + 1;
    let mut attempts = 0;
    while attempts < budget {
        attempts += 1;
        let outcome = mapper
            .map_chunk(&request)
            .and_then(|raw| parse_response(&raw));
        match outcome {
            Ok(sections) => {
                log::debug!(
                    "Chunk {}/{} mapped to {} section(s) on attempt {}",
                    index + 1,
                    count,
                    sections.len(),
                    attempts
                );
                return ChunkResult {
                    index,
                    sections,
                    attempts,
                    fallback: false,
                };
            }
            Err(e) if e.is_retryable() => {
                log::warn!(
                    "Chunk {}/{} attempt {}/{} failed: {}",
                    index + 1,
                    count,
                    attempts,
                    budget,
                    e
                );
            }
            Err(e) => {
                log::warn!("Chunk {}/{} failed without retry: {}", index + 1, count, e);
                break;
            }
        }
    }

    ChunkResult {
        index,
        sections: vec![fallback_section(index, blocks)],
        attempts,
        fallback: true,
    }
}
