//! Package relationships (`_rels/*.rels`).

use crate::xml::XmlElement;

/// One relationship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship id (`rId1`)
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target, relative to the source part's folder
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

/// Relationships of one part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    /// Entries in document order
    pub items: Vec<Relationship>,
}

impl Relationships {
    /// Read `<Relationships>` content.
    pub fn from_xml(root: &XmlElement) -> Self {
        let items = root
            .elements()
            .filter(|el| el.is("Relationship"))
            .filter_map(|el| {
                Some(Relationship {
                    id: el.attr("Id")?.to_string(),
                    rel_type: el.attr("Type").unwrap_or_default().to_string(),
                    target: el.attr("Target")?.to_string(),
                    external: el.attr("TargetMode") == Some("External"),
                })
            })
            .collect();
        Self { items }
    }

    /// Find a relationship by id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// First relationship whose type ends with `suffix`.
    pub fn by_type_suffix(&self, suffix: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type.ends_with(suffix))
    }
}

/// Path of the relationships part belonging to `part`.
///
/// `word/document.xml` → `word/_rels/document.xml.rels`
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that declares it.
///
/// Handles absolute targets (`/ppt/slides/slide1.xml`) and `..` segments.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    #[test]
    fn test_rels_path() {
        assert_eq!(rels_path_for("word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(rels_path_for("ppt/slides/slide1.xml"), "ppt/slides/_rels/slide1.xml.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("ppt/presentation.xml", "slides/slide2.xml"), "ppt/slides/slide2.xml");
        assert_eq!(resolve_target("ppt/slides/slide1.xml", "../slideLayouts/slideLayout1.xml"), "ppt/slideLayouts/slideLayout1.xml");
        assert_eq!(resolve_target("word/document.xml", "/word/styles.xml"), "word/styles.xml");
    }

    #[test]
    fn test_parse_relationships() {
        let doc = XmlDocument::parse(
            r#"<Relationships xmlns="x">
                <Relationship Id="rId1" Type="http://x/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
                <Relationship Id="rId2" Type="http://x/hyperlink" Target="https://example.com" TargetMode="External"/>
            </Relationships>"#,
        )
        .unwrap();
        let rels = Relationships::from_xml(&doc.root);

        assert_eq!(rels.items.len(), 2);
        assert_eq!(rels.get("rId1").unwrap().target, "slides/slide1.xml");
        assert!(rels.get("rId2").unwrap().external);
        assert_eq!(rels.by_type_suffix("/slide").unwrap().id, "rId1");
    }
}
