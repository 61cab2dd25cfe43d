//! Post-render format conversion with a plugin architecture.
//!
//! A rebuilt document can optionally be handed to a converter that produces
//! another rendition of it (typically a fixed-layout PDF). Converters are
//! registered per target extension and dispatched by the registry.
//!
//! # Example
//!
//! ```no_run
//! use retemplate::convert::{CommandConverter, ConverterRegistry};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! fn main() -> retemplate::Result<()> {
//!     let mut registry = ConverterRegistry::new();
//!     registry.register(Arc::new(
//!         CommandConverter::new("soffice", "docx", "pdf")
//!             .with_args(["--headless", "--convert-to", "pdf", "--outdir", "{outdir}", "{input}"]),
//!     ));
//!
//!     registry.convert(Path::new("out.docx"), Path::new("out.pdf"))?;
//!     Ok(())
//! }
//! ```

mod command;

pub use command::CommandConverter;

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Trait for format converters.
pub trait FormatConverter: Send + Sync {
    /// Extension of the input, lowercase without the dot.
    fn source_extension(&self) -> &str;

    /// Extension of the produced file, lowercase without the dot.
    fn target_extension(&self) -> &str;

    /// Name of this converter.
    fn name(&self) -> &str;

    /// Convert `input` into a new file at `output`.
    fn convert(&self, input: &Path, output: &Path) -> Result<()>;

    /// Check if this converter reads the given extension.
    fn accepts(&self, ext: &str) -> bool {
        self.source_extension()
            .eq_ignore_ascii_case(ext.trim_start_matches('.'))
    }
}

/// Registry of converters keyed by target extension.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn FormatConverter>>,
    by_name: HashMap<String, Arc<dyn FormatConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Register a converter under its target extension and name.
    pub fn register(&mut self, converter: Arc<dyn FormatConverter>) {
        self.converters
            .insert(converter.target_extension().to_lowercase(), converter.clone());
        self.by_name
            .insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by target extension.
    pub fn get_by_target(&self, ext: &str) -> Option<Arc<dyn FormatConverter>> {
        self.converters
            .get(&ext.trim_start_matches('.').to_lowercase())
            .cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn FormatConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if a target extension can be produced.
    pub fn supports(&self, ext: &str) -> bool {
        self.get_by_target(ext).is_some()
    }

    /// Convert `input` to `output`, choosing the converter by the extension
    /// of `output`.
    pub fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let target = extension(output)?;
        let converter = self
            .get_by_target(target)
            .ok_or_else(|| Error::Conversion(format!("no converter producing .{}", target)))?;

        let source = extension(input)?;
        if !converter.accepts(source) {
            return Err(Error::Conversion(format!(
                "{} converts .{} files, not .{}",
                converter.name(),
                converter.source_extension(),
                source
            )));
        }

        converter.convert(input, output)?;
        log::info!(
            "Converted {} to {} with '{}'",
            input.display(),
            output.display(),
            converter.name()
        );
        Ok(())
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn extension(path: &Path) -> Result<&str> {
    path.extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| Error::Conversion(format!("{} has no extension", path.display())))
}
