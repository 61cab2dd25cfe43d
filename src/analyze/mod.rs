//! Style DNA extraction.
//!
//! Recovers the per-role styling of a template and the boundary between its
//! preserved front matter and its replaceable content.

pub mod classify;

use crate::detect::{detect_format_from_path, DocumentFormat};
use crate::error::{Error, Result};
use crate::model::{Paragraph, RoleStyle, StyleProfile, TextStyle};
use crate::package::DocxDocument;
use crate::tree::DocumentTree;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fallback style names used when a template does not show a role itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeOptions {
    /// Style for section headings when none is found
    pub heading_style: String,

    /// Style for secondary headings
    pub subheading_style: String,

    /// Style for running text when none is found
    pub body_style: String,

    /// Style for list items
    pub bullet_style: String,
}

impl AnalyzeOptions {
    /// Create options with the conventional Word style names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subheading style name.
    pub fn with_subheading_style(mut self, name: impl Into<String>) -> Self {
        self.subheading_style = name.into();
        self
    }

    /// Set the bullet style name.
    pub fn with_bullet_style(mut self, name: impl Into<String>) -> Self {
        self.bullet_style = name.into();
        self
    }

    /// Set the body fallback style name.
    pub fn with_body_style(mut self, name: impl Into<String>) -> Self {
        self.body_style = name.into();
        self
    }

    /// Set the heading fallback style name.
    pub fn with_heading_style(mut self, name: impl Into<String>) -> Self {
        self.heading_style = name.into();
        self
    }
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            heading_style: "Heading 1".to_string(),
            subheading_style: "Heading 2".to_string(),
            body_style: "Normal".to_string(),
            bullet_style: "List Bullet".to_string(),
        }
    }
}

/// Derive the style profile of a template.
///
/// The first top-level heading marks both `first_content_index` and the end
/// of the safe zone. A template without one has no safe zone at all: every
/// paragraph is replaceable.
pub fn extract_style_dna<D: DocumentTree + ?Sized>(
    doc: &D,
    options: &AnalyzeOptions,
) -> Result<StyleProfile> {
    let count = doc.paragraph_count();
    let styles = doc.styles();

    let mut heading: Option<(usize, Paragraph)> = None;
    for index in 0..count {
        let paragraph = read(doc, index)?;
        if classify::is_top_level_heading(&paragraph, styles) {
            log::debug!(
                "Paragraph {} is the first top-level heading ('{}')",
                index,
                paragraph.style_name()
            );
            heading = Some((index, paragraph));
            break;
        }
    }

    let (heading_role, body_scan_start, first_content_index) = match &heading {
        Some((index, paragraph)) => (
            role_from(paragraph, &options.heading_style, false),
            index + 1,
            Some(*index),
        ),
        None => {
            log::warn!("Template has no top-level heading; the whole document is replaceable");
            (
                RoleStyle {
                    style_name: options.heading_style.clone(),
                    font: doc.style_font(&options.heading_style).unwrap_or_default(),
                },
                0,
                None,
            )
        }
    };

    let mut body_role = None;
    for index in body_scan_start..count {
        let paragraph = read(doc, index)?;
        if paragraph.is_empty() {
            continue;
        }
        if classify::is_heading(&paragraph, styles) || classify::is_toc(&paragraph) {
            log::debug!("Paragraph {} skipped for body role ('{}')", index, paragraph.style_name());
            continue;
        }
        log::debug!("Paragraph {} sets the body role ('{}')", index, paragraph.style_name());
        body_role = Some(role_from(&paragraph, &options.body_style, true));
        break;
    }
    let body = body_role.unwrap_or_else(|| RoleStyle::named(&options.body_style));

    let subheading = derived_role(doc, &options.subheading_style, &body);
    let bullet = derived_role(doc, &options.bullet_style, &body);

    let profile = StyleProfile {
        heading: heading_role,
        subheading,
        body,
        bullet,
        safe_zone_end: first_content_index.unwrap_or(0),
        first_content_index,
    };
    log::info!("Style DNA: {}", profile.summary());
    Ok(profile)
}

/// Open a template from disk and derive its style profile.
pub fn analyze_file<P: AsRef<Path>>(path: P, options: &AnalyzeOptions) -> Result<StyleProfile> {
    let path = path.as_ref();
    let format = detect_format_from_path(path).map_err(Error::into_analysis)?;
    match format {
        DocumentFormat::Docx => {
            let doc = DocxDocument::open(path).map_err(Error::into_analysis)?;
            extract_style_dna(&doc, options)
        }
        other => Err(Error::UnsupportedFileType(format!(
            "{}: style analysis needs a DOCX template",
            other
        ))),
    }
}

fn read<D: DocumentTree + ?Sized>(doc: &D, index: usize) -> Result<Paragraph> {
    doc.paragraph(index)
        .ok_or_else(|| Error::Analysis(format!("paragraph {} could not be read", index)))
}

/// Role taken from a sample paragraph's style and first run.
fn role_from(paragraph: &Paragraph, fallback_style: &str, with_italic: bool) -> RoleStyle {
    let style_name = match paragraph.style_name() {
        "" => fallback_style.to_string(),
        name => name.to_string(),
    };
    let font = paragraph
        .first_run()
        .map(|run| TextStyle {
            font_name: run.style.font_name.clone(),
            font_size: run.style.font_size,
            color: run.style.color.clone(),
            bold: run.style.bold,
            italic: if with_italic { run.style.italic } else { None },
        })
        .unwrap_or_default();
    RoleStyle { style_name, font }
}

/// Role named by convention, inheriting body attributes the style does not
/// declare itself.
fn derived_role<D: DocumentTree + ?Sized>(doc: &D, style_name: &str, body: &RoleStyle) -> RoleStyle {
    let font = match doc.style_font(style_name) {
        Some(declared) => declared.or(&body.font),
        None => body.font.clone(),
    };
    RoleStyle {
        style_name: style_name.to_string(),
        font,
    }
}
