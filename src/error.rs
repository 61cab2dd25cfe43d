//! Error types for retemplate library.

use std::io;
use thiserror::Error;

/// Result type alias for retemplate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while analysing or reconstructing documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized.
    #[error("Unknown file format: not a DOCX, PPTX or PDF document")]
    UnknownFormat,

    /// The format has no reconstruction (or extraction) path.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Error reading or writing the zip container.
    #[error("Package archive error: {0}")]
    Archive(String),

    /// Malformed XML inside a package part.
    #[error("XML error: {0}")]
    Xml(String),

    /// A required package part is missing.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Style DNA extraction failed.
    #[error("Template analysis failed: {0}")]
    Analysis(String),

    /// Front-matter update or body rebuild failed.
    #[error("Rendering failed: {0}")]
    Rendering(String),

    /// A mapping response was not parseable or not schema-valid.
    #[error("Mapping response rejected: {0}")]
    ResponseValidation(String),

    /// The mapping collaborator could not be reached or timed out.
    #[error("Mapping collaborator failed: {0}")]
    Mapper(String),

    /// Post-render format conversion failed.
    #[error("Format conversion failed: {0}")]
    Conversion(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap any error raised while mutating or saving a document.
    ///
    /// Rendering errors pass through unchanged so the first failure keeps
    /// its own message.
    pub fn into_rendering(self) -> Self {
        match self {
            Error::Rendering(_) => self,
            other => Error::Rendering(other.to_string()),
        }
    }

    /// Wrap any error raised while inspecting a template.
    pub fn into_analysis(self) -> Self {
        match self {
            Error::Analysis(_) | Error::UnsupportedFileType(_) => self,
            other => Error::Analysis(other.to_string()),
        }
    }

    /// Whether the mapping layer should retry after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ResponseValidation(_) | Error::Mapper(_) | Error::Json(_)
        )
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => {
                Error::MissingPart("file not found in archive".to_string())
            }
            other => Error::Archive(other.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
