//! Container format detection.

use crate::error::{Error, Result};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Document container formats the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// WordprocessingML package (.docx)
    Docx,
    /// PresentationML package (.pptx)
    Pptx,
    /// Fixed-layout PDF
    Pdf,
}

impl DocumentFormat {
    /// Lower-case file extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pptx => "pptx",
            DocumentFormat::Pdf => "pdf",
        }
    }

    /// Look a format up by file extension (case-insensitive, dot optional).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "docx" => Some(DocumentFormat::Docx),
            "pptx" => Some(DocumentFormat::Pptx),
            "pdf" => Some(DocumentFormat::Pdf),
            _ => None,
        }
    }

    /// MIME type of the container.
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            DocumentFormat::Pdf => "application/pdf",
        }
    }

    /// Whether the body of a document in this format can be rewritten.
    pub fn is_reconstructable(&self) -> bool {
        !matches!(self, DocumentFormat::Pdf)
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Main parts that identify an OOXML package.
const DOCX_MAIN_PART: &str = "word/document.xml";
const PPTX_MAIN_PART: &str = "ppt/presentation.xml";

/// Detect the container format of a file.
///
/// # Example
/// ```no_run
/// use retemplate::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("template.docx").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocumentFormat> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    match detect_format_from_bytes(&data) {
        // Packages with a relocated main part are only recognised by name.
        Err(Error::UnknownFormat) if data.starts_with(ZIP_MAGIC) => path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(DocumentFormat::from_extension)
            .filter(DocumentFormat::is_reconstructable)
            .ok_or(Error::UnknownFormat),
        other => other,
    }
}

/// Detect the container format from the full file content.
///
/// Zip containers are opened to look for the package's main part, so the
/// whole file is needed, not just its header.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocumentFormat> {
    if data.starts_with(PDF_MAGIC) {
        return Ok(DocumentFormat::Pdf);
    }
    if !data.starts_with(ZIP_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let archive = zip::ZipArchive::new(Cursor::new(data)).map_err(|_| Error::UnknownFormat)?;
    let mut has_docx = false;
    let mut has_pptx = false;
    for name in archive.file_names() {
        match name {
            DOCX_MAIN_PART => has_docx = true,
            PPTX_MAIN_PART => has_pptx = true,
            _ => {}
        }
    }

    match (has_docx, has_pptx) {
        (true, _) => Ok(DocumentFormat::Docx),
        (false, true) => Ok(DocumentFormat::Pptx),
        _ => Err(Error::UnknownFormat),
    }
}

/// Check if a file is a supported document.
pub fn is_supported<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_with(entries: &[&str]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for name in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"<x/>").unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_detect_pdf() {
        let format = detect_format_from_bytes(b"%PDF-1.7\n%test").unwrap();
        assert_eq!(format, DocumentFormat::Pdf);
        assert!(!format.is_reconstructable());
    }

    #[test]
    fn test_detect_docx_and_pptx() {
        let docx = zip_with(&["[Content_Types].xml", "word/document.xml"]);
        assert_eq!(detect_format_from_bytes(&docx).unwrap(), DocumentFormat::Docx);

        let pptx = zip_with(&["[Content_Types].xml", "ppt/presentation.xml"]);
        assert_eq!(detect_format_from_bytes(&pptx).unwrap(), DocumentFormat::Pptx);
    }

    #[test]
    fn test_detect_plain_zip_is_unknown() {
        let data = zip_with(&["readme.txt"]);
        assert!(matches!(
            detect_format_from_bytes(&data),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_garbage() {
        assert!(matches!(
            detect_format_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(detect_format_from_bytes(b""), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_path_falls_back_to_extension_for_packages() {
        let dir = tempfile::tempdir().unwrap();
        let data = zip_with(&["[Content_Types].xml", "word/main.xml"]);
        let docx = dir.path().join("relocated.docx");
        let other = dir.path().join("relocated.zip");
        std::fs::write(&docx, &data).unwrap();
        std::fs::write(&other, &data).unwrap();

        assert_eq!(detect_format_from_path(&docx).unwrap(), DocumentFormat::Docx);
        assert!(matches!(
            detect_format_from_path(&other),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(DocumentFormat::from_extension("DOCX"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension(".pptx"), Some(DocumentFormat::Pptx));
        assert_eq!(DocumentFormat::from_extension("odt"), None);
    }
}
