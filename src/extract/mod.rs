//! Source content extraction with a plugin architecture.
//!
//! Extraction turns a source document into ordered [`ContentBlock`]s for
//! mapping. Extractors are registered per file extension and dispatched by
//! the registry.
//!
//! # Example
//!
//! ```no_run
//! use retemplate::extract::ExtractorRegistry;
//! use std::path::Path;
//!
//! fn main() -> retemplate::Result<()> {
//!     let registry = ExtractorRegistry::with_defaults();
//!     let content = registry.extract(Path::new("source.docx"))?;
//!     println!("{}", content.to_text_summary());
//!     Ok(())
//! }
//! ```
//!
//! [`ContentBlock`]: crate::model::ContentBlock

mod docx;
mod pptx;

pub use docx::DocxExtractor;
pub use pptx::PptxExtractor;

use crate::error::{Error, Result};
use crate::model::{BlockType, ExtractedContent};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Trait for source content extractors.
///
/// Implement this trait to feed a new source format into the engine.
pub trait ContentExtractor: Send + Sync {
    /// Supported file extensions, lowercase without the dot.
    fn supported_extensions(&self) -> &[&str];

    /// Name of this extractor.
    fn name(&self) -> &str;

    /// Extract a file.
    fn extract(&self, path: &Path) -> Result<ExtractedContent>;

    /// Extract from bytes; `source_file` names the content.
    fn extract_bytes(&self, bytes: &[u8], source_file: &str) -> Result<ExtractedContent>;

    /// Check if this extractor supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry mapping file extensions to extractors.
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn ContentExtractor>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Create a registry with the built-in DOCX and PPTX extractors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxExtractor::new()));
        registry.register(Arc::new(PptxExtractor::new()));
        registry
    }

    /// Register an extractor for all its extensions.
    ///
    /// A later registration for the same extension replaces the earlier one.
    pub fn register(&mut self, extractor: Arc<dyn ContentExtractor>) {
        for ext in extractor.supported_extensions() {
            self.extractors.insert(ext.to_lowercase(), extractor.clone());
        }
    }

    /// Get an extractor by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn ContentExtractor>> {
        self.extractors
            .get(&ext.trim_start_matches('.').to_lowercase())
            .cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.get_by_extension(ext).is_some()
    }

    /// All supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extractors.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Extract a file with the extractor for its extension.
    pub fn extract(&self, path: &Path) -> Result<ExtractedContent> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFileType("file has no extension".into()))?;
        let extractor = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFileType(format!("no extractor for .{}", ext)))?;

        let content = extractor.extract(path)?;
        log::info!(
            "Extracted {} block(s) from {} with '{}'",
            content.len(),
            path.display(),
            extractor.name()
        );
        Ok(content)
    }

    /// Extract bytes with the extractor for `ext`.
    pub fn extract_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        source_file: &str,
    ) -> Result<ExtractedContent> {
        let extractor = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFileType(format!("no extractor for .{}", ext)))?;
        extractor.extract_bytes(bytes, source_file)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Append each non-empty table as one block: cells joined by `" | "`, rows
/// by newlines, blank rows dropped.
fn push_tables(content: &mut ExtractedContent, tables: Vec<Vec<Vec<String>>>) {
    for table in tables {
        let rows: Vec<String> = table
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| {
                row.iter()
                    .map(|cell| cell.trim())
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect();
        if !rows.is_empty() {
            content.push(BlockType::Table, rows.join("\n"));
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_with_defaults() {
        let registry = ExtractorRegistry::with_defaults();
        assert!(registry.supports("docx"));
        assert!(registry.supports(".PPTX"));
        assert!(!registry.supports("pdf"));
        assert_eq!(registry.supported_extensions(), vec!["docx", "pptx"]);
    }

    #[test]
    fn test_unknown_extension() {
        let registry = ExtractorRegistry::with_defaults();
        let err = registry.extract(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(_)));
    }

    #[test]
    fn test_push_tables_skips_blank_rows() {
        let mut content = ExtractedContent::new("t");
        push_tables(
            &mut content,
            vec![
                vec![
                    vec!["Name".into(), "Role".into()],
                    vec![" ".into(), "".into()],
                    vec!["Ada".into(), " Engineer ".into()],
                ],
                vec![vec!["".into()]],
            ],
        );
        assert_eq!(content.len(), 1);
        assert_eq!(content.blocks[0].content, "Name | Role\nAda | Engineer");
    }
}
