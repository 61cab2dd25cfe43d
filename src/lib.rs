//! # retemplate
//!
//! Template reconstruction engine for Rust.
//!
//! This library rebuilds a DOCX (or PPTX) template around new content. The
//! template's cover page, table of contents, headings and fonts are kept;
//! its body is replaced by sections derived from a source document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use retemplate::{CommandMapper, Retemplate};
//!
//! fn main() -> retemplate::Result<()> {
//!     let report = Retemplate::new()
//!         .with_mapper(CommandMapper::from_command_line("python3 map_sections.py")?)
//!         .reconstruct("source.docx", "template.docx", "output.docx")?;
//!
//!     println!("{}", report.to_json()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Style DNA**: [`analyze::extract_style_dna`] recovers per-role styles and
//!   the safe zone (front matter that is never deleted)
//! - **Mapping**: [`mapping::map_blocks`] chunks the source and calls a
//!   [`SemanticMapper`] per chunk, with retries and fallback sections
//! - **Merging**: [`merge::merge_chunks`] joins split sections and removes
//!   duplicate titles
//! - **Rendering**: [`render::render_document`] patches the cover title and
//!   table of contents, then rebuilds the body in the template's styles

pub mod analyze;
pub mod convert;
pub mod detect;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod merge;
pub mod model;
pub mod package;
pub mod pipeline;
mod process;
pub mod render;
pub mod tree;
pub mod xml;

// Re-export commonly used types
pub use analyze::{analyze_file, extract_style_dna, AnalyzeOptions};
pub use convert::{CommandConverter, ConverterRegistry, FormatConverter};
pub use detect::{detect_format_from_bytes, detect_format_from_path, DocumentFormat};
pub use error::{Error, Result};
pub use extract::{ContentExtractor, DocxExtractor, ExtractorRegistry, PptxExtractor};
pub use mapping::{
    map_blocks, CommandMapper, MappingOptions, MappingOutcome, MappingRequest, OutlineMapper,
    SemanticMapper,
};
pub use merge::{merge_chunks, normalize_title};
pub use model::{
    Alignment, BlockType, BodyItem, BodyItemKind, ContentBlock, Document, ExtractedContent,
    Paragraph, ParagraphStyle, RoleStyle, Section, StyleProfile, StyleSheet, TextRun, TextStyle,
};
pub use package::{DocxDocument, SlideDeck};
pub use pipeline::{reconstruct_file, MappedContent, ReconstructOptions, Retemplate};
pub use render::{render_document, render_slides, RenderOptions, RenderReport};
pub use tree::DocumentTree;

#[cfg(feature = "async")]
pub use pipeline::reconstruct_file_async;

use std::path::Path;

/// Extract the content blocks of a source document.
///
/// # Example
///
/// ```no_run
/// let content = retemplate::extract_file("source.pptx").unwrap();
/// println!("{}", content.to_text_summary());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<ExtractedContent> {
    ExtractorRegistry::with_defaults().extract(path.as_ref())
}

/// Parse a mapping response (one JSON document per chunk) and merge the
/// chunks into one section list.
///
/// # Example
///
/// ```
/// let merged = retemplate::merge_responses(&[
///     r#"[{"title":"Experience","body":["worked at X"]}]"#,
///     r#"[{"title":"experience","body":["worked at Y"]}]"#,
/// ])
/// .unwrap();
/// assert_eq!(merged.len(), 1);
/// ```
pub fn merge_responses<S: AsRef<str>>(responses: &[S]) -> Result<Vec<Section>> {
    let chunks = responses
        .iter()
        .map(|r| mapping::parse_response(r.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(merge_chunks(chunks))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_responses_rejects_invalid_chunk() {
        let result = merge_responses(&["[]", "not json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_file_unknown_extension() {
        let result = extract_file("notes.md");
        assert!(matches!(result, Err(Error::UnsupportedFileType(_))));
    }

    #[test]
    fn test_detect_format_empty_data() {
        assert!(matches!(
            detect_format_from_bytes(&[]),
            Err(Error::UnknownFormat)
        ));
    }
}
