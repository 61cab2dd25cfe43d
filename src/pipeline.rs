//! End-to-end reconstruction jobs.
//!
//! A job extracts the source, maps it into sections chunk by chunk, merges
//! the chunks, and renders the merged sections into a copy of the template
//! saved at the output path. The template file itself is never modified.

use crate::analyze::{extract_style_dna, AnalyzeOptions};
use crate::convert::{ConverterRegistry, FormatConverter};
use crate::detect::{detect_format_from_path, DocumentFormat};
use crate::error::{Error, Result};
use crate::extract::{ContentExtractor, ExtractorRegistry};
use crate::mapping::{map_blocks, MappingOptions, OutlineMapper, SemanticMapper};
use crate::merge::merge_chunks;
use crate::model::{ExtractedContent, Section};
use crate::package::{DocxDocument, SlideDeck};
use crate::render::{render_document, render_slides, RenderOptions, RenderReport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Options for a whole reconstruction job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructOptions {
    /// Style analysis fallbacks
    pub analyze: AnalyzeOptions,

    /// Chunking, retries and timeouts of the mapping stage
    pub mapping: MappingOptions,

    /// Front-matter and body rendering
    pub render: RenderOptions,
}

impl ReconstructOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file; missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Set the analysis options.
    pub fn with_analyze(mut self, analyze: AnalyzeOptions) -> Self {
        self.analyze = analyze;
        self
    }

    /// Set the mapping options.
    pub fn with_mapping(mut self, mapping: MappingOptions) -> Self {
        self.mapping = mapping;
        self
    }

    /// Set the render options.
    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }
}

/// Sections produced by mapping and merging one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedContent {
    /// Merged, title-unique sections
    pub sections: Vec<Section>,

    /// Number of mapping chunks
    pub chunks_total: usize,

    /// Chunks that fell back to raw content
    pub chunks_fallback: usize,
}

/// Builder for reconstruction jobs.
///
/// # Example
///
/// ```no_run
/// use retemplate::{CommandMapper, Retemplate};
///
/// let report = Retemplate::new()
///     .with_mapper(CommandMapper::new("map-sections"))
///     .with_chunk_size(30)
///     .reconstruct("source.docx", "template.docx", "out.docx")?;
/// println!("{} sections", report.sections_rendered);
/// # Ok::<(), retemplate::Error>(())
/// ```
pub struct Retemplate {
    options: ReconstructOptions,
    mapper: Arc<dyn SemanticMapper>,
    extractors: ExtractorRegistry,
    converters: ConverterRegistry,
}

impl Retemplate {
    /// Create a builder with default options and the [`OutlineMapper`].
    pub fn new() -> Self {
        Self {
            options: ReconstructOptions::default(),
            mapper: Arc::new(OutlineMapper),
            extractors: ExtractorRegistry::with_defaults(),
            converters: ConverterRegistry::new(),
        }
    }

    /// Replace all options.
    pub fn with_options(mut self, options: ReconstructOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the mapping collaborator.
    pub fn with_mapper<M: SemanticMapper + 'static>(mut self, mapper: M) -> Self {
        self.mapper = Arc::new(mapper);
        self
    }

    /// Set a shared mapping collaborator.
    pub fn with_shared_mapper(mut self, mapper: Arc<dyn SemanticMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Register an additional source extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractors.register(extractor);
        self
    }

    /// Register a post-render converter.
    pub fn with_converter(mut self, converter: Arc<dyn FormatConverter>) -> Self {
        self.converters.register(converter);
        self
    }

    /// Set the mapping chunk size.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.options.mapping = self.options.mapping.with_chunk_size(size);
        self
    }

    /// Set the document title written to the cover.
    pub fn with_document_title(mut self, title: impl Into<String>) -> Self {
        self.options.render = self.options.render.with_document_title(title);
        self
    }

    /// Map chunks one after another.
    pub fn sequential(mut self) -> Self {
        self.options.mapping = self.options.mapping.with_parallel(false);
        self
    }

    /// Current options.
    pub fn options(&self) -> &ReconstructOptions {
        &self.options
    }

    /// Extract a source document.
    pub fn extract<P: AsRef<Path>>(&self, source: P) -> Result<ExtractedContent> {
        self.extractors.extract(source.as_ref())
    }

    /// Map extracted content into merged sections.
    pub fn map(&self, content: &ExtractedContent) -> MappedContent {
        let outcome = map_blocks(&*self.mapper, &content.blocks, &self.options.mapping);
        let chunks_total = outcome.chunks.len();
        let chunks_fallback = outcome.fallback_count();
        MappedContent {
            sections: merge_chunks(outcome.into_sections()),
            chunks_total,
            chunks_fallback,
        }
    }

    /// Run a full job: extract, map, merge and render.
    pub fn reconstruct<S, T, O>(&self, source: S, template: T, output: O) -> Result<RenderReport>
    where
        S: AsRef<Path>,
        T: AsRef<Path>,
        O: AsRef<Path>,
    {
        let content = self.extract(source)?;
        self.reconstruct_content(&content, template, output)
    }

    /// Render already extracted content into a template.
    pub fn reconstruct_content<T, O>(
        &self,
        content: &ExtractedContent,
        template: T,
        output: O,
    ) -> Result<RenderReport>
    where
        T: AsRef<Path>,
        O: AsRef<Path>,
    {
        let mapped = self.map(content);
        let mut report = self.render_sections(&mapped.sections, template, output)?;
        report.chunks_total = mapped.chunks_total;
        report.chunks_fallback = mapped.chunks_fallback;
        Ok(report)
    }

    /// Render merged sections into a template and save the result.
    ///
    /// DOCX templates get the full front-matter update and body rebuild;
    /// PPTX templates take one section per slide. PDF templates cannot be
    /// rewritten.
    pub fn render_sections<T, O>(
        &self,
        sections: &[Section],
        template: T,
        output: O,
    ) -> Result<RenderReport>
    where
        T: AsRef<Path>,
        O: AsRef<Path>,
    {
        let template = template.as_ref();
        let output = output.as_ref();
        let format = detect_format_from_path(template)?;
        if output
            .extension()
            .and_then(|e| e.to_str())
            .and_then(DocumentFormat::from_extension)
            .is_some_and(|f| f != format)
        {
            log::warn!(
                "{} is saved as {} like its template",
                output.display(),
                format
            );
        }

        let mut report = match format {
            DocumentFormat::Docx => {
                let mut doc = DocxDocument::open(template).map_err(Error::into_analysis)?;
                let profile = extract_style_dna(&doc, &self.options.analyze)?;
                let report = render_document(&mut doc, &profile, sections, &self.options.render)?;
                doc.save(output).map_err(Error::into_rendering)?;
                report
            }
            DocumentFormat::Pptx => {
                let mut deck = SlideDeck::open(template).map_err(Error::into_analysis)?;
                let report = render_slides(&mut deck, sections, &self.options.render);
                deck.save(output).map_err(Error::into_rendering)?;
                report
            }
            DocumentFormat::Pdf => {
                return Err(Error::UnsupportedFileType(
                    "PDF templates are fixed-layout and cannot be body-rewritten; \
                     use a DOCX template and convert the result"
                        .to_string(),
                ))
            }
        };

        report.output_path = Some(output.to_path_buf());
        report.rendered_at = Some(chrono::Utc::now());
        log::info!("Saved {}", output.display());
        Ok(report)
    }

    /// Convert a rendered document with a registered converter.
    pub fn convert<I: AsRef<Path>, O: AsRef<Path>>(&self, input: I, output: O) -> Result<()> {
        self.converters.convert(input.as_ref(), output.as_ref())
    }
}

impl Default for Retemplate {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a full job with an explicit mapper and options.
pub fn reconstruct_file<S, T, O>(
    source: S,
    template: T,
    output: O,
    mapper: Arc<dyn SemanticMapper>,
    options: ReconstructOptions,
) -> Result<RenderReport>
where
    S: AsRef<Path>,
    T: AsRef<Path>,
    O: AsRef<Path>,
{
    Retemplate::new()
        .with_options(options)
        .with_shared_mapper(mapper)
        .reconstruct(source, template, output)
}

/// Run a full job on the blocking thread pool of the current Tokio runtime.
#[cfg(feature = "async")]
pub async fn reconstruct_file_async(
    source: std::path::PathBuf,
    template: std::path::PathBuf,
    output: std::path::PathBuf,
    mapper: Arc<dyn SemanticMapper>,
    options: ReconstructOptions,
) -> Result<RenderReport> {
    tokio::task::spawn_blocking(move || {
        reconstruct_file(source, template, output, mapper, options)
    })
    .await
    .map_err(|e| Error::Other(format!("reconstruction task failed: {}", e)))?
}
