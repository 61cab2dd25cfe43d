//! OOXML package access.
//!
//! A [`Package`] holds every zip entry in memory, in archive order, so a
//! template can be edited part by part and written back without disturbing
//! the parts the engine does not understand.

mod docx;
mod pptx;
mod props;
mod rels;
mod styles;

pub use docx::DocxDocument;
pub use pptx::{ShapeText, Slide, SlideDeck};
pub use props::update_core_properties;
pub use rels::{rels_path_for, resolve_target, Relationship, Relationships};
pub use styles::parse_styles;

use crate::error::{Error, Result};
use crate::xml::XmlDocument;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// One archive entry.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    stored: bool,
}

/// An opened OOXML zip package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    /// Read a package from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Read a package from memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut buf = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut buf)?;
            entries.push(Entry {
                name: file.name().to_string(),
                stored: file.compression() == CompressionMethod::Stored,
                data: buf,
            });
        }

        log::debug!("Opened package with {} parts", entries.len());
        Ok(Self { entries })
    }

    /// Part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Check whether a part exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Raw bytes of a part.
    pub fn read(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Parse a part as XML.
    pub fn read_xml(&self, name: &str) -> Result<XmlDocument> {
        let data = self
            .read(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))?;
        XmlDocument::parse_bytes(data).map_err(|e| Error::Xml(format!("{}: {}", name, e)))
    }

    /// Parse a part as XML if it exists.
    pub fn read_xml_opt(&self, name: &str) -> Result<Option<XmlDocument>> {
        if self.contains(name) {
            self.read_xml(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Replace (or add) a part.
    pub fn write(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry {
                name: name.to_string(),
                data,
                stored: false,
            }),
        }
    }

    /// Serialize and store an XML part.
    pub fn write_xml(&mut self, name: &str, doc: &XmlDocument) -> Result<()> {
        let data = doc.to_bytes()?;
        self.write(name, data);
        Ok(())
    }

    /// Relationships of a part (empty when it has none).
    pub fn relationships(&self, part: &str) -> Result<Relationships> {
        match self.read_xml_opt(&rels_path_for(part))? {
            Some(doc) => Ok(Relationships::from_xml(&doc.root)),
            None => Ok(Relationships::default()),
        }
    }

    /// Build the zip archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            let method = if entry.stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.data)?;
        }
        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }

    /// Write the package to `path`.
    ///
    /// The archive is written to a temporary file next to the destination
    /// and renamed into place once complete, so a failure never leaves a
    /// partial file at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let data = self.to_bytes()?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        log::debug!("Saved package to {} ({} bytes)", path.display(), data.len());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers that assemble small packages for unit tests.

    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    /// Build a zip archive from `(name, content)` pairs.
    pub fn zip_bytes(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::zip_bytes;
    use super::*;

    #[test]
    fn test_roundtrip_keeps_part_order() {
        let data = zip_bytes(&[
            ("[Content_Types].xml", "<Types/>"),
            ("word/document.xml", "<w:document/>"),
            ("word/media/image1.png", "PNG"),
        ]);
        let mut pkg = Package::from_bytes(&data).unwrap();
        pkg.write("word/document.xml", b"<w:document><w:body/></w:document>".to_vec());

        let reread = Package::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        let names: Vec<_> = reread.part_names().collect();
        assert_eq!(
            names,
            vec!["[Content_Types].xml", "word/document.xml", "word/media/image1.png"]
        );
        assert_eq!(reread.read("word/media/image1.png"), Some(&b"PNG"[..]));
        assert!(reread
            .read_xml("word/document.xml")
            .unwrap()
            .root
            .child("w:body")
            .is_some());
    }

    #[test]
    fn test_missing_part() {
        let pkg = Package::from_bytes(&zip_bytes(&[("a.xml", "<a/>")])).unwrap();
        assert!(matches!(pkg.read_xml("b.xml"), Err(Error::MissingPart(_))));
        assert!(pkg.read_xml_opt("b.xml").unwrap().is_none());
    }

    #[test]
    fn test_save_is_atomic_rename() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out.docx");
        let pkg = Package::from_bytes(&zip_bytes(&[("a.xml", "<a/>")])).unwrap();

        pkg.save(&out).unwrap();

        assert!(out.exists());
        let leftovers = fs::read_dir(out.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_not_a_zip() {
        assert!(Package::from_bytes(b"plain text").is_err());
    }
}
