//! PresentationML backend.

use super::{props, resolve_target, Package};
use crate::error::{Error, Result};
use crate::xml::{XmlDocument, XmlElement, XmlNode};
use std::path::Path;

const DEFAULT_MAIN_PART: &str = "ppt/presentation.xml";

/// Text of one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeText {
    /// Title or centered-title placeholder
    pub is_title: bool,
    /// Paragraphs as `(indent level, text)`
    pub paragraphs: Vec<(u8, String)>,
}

/// One slide part.
#[derive(Debug, Clone)]
pub struct Slide {
    /// Part name inside the package
    pub part: String,
    xml: XmlDocument,
}

impl Slide {
    /// Text shapes in drawing order, groups flattened.
    pub fn shapes(&self) -> Vec<ShapeText> {
        let mut found = Vec::new();
        if let Some(tree) = self.tree() {
            collect_shapes(tree, &mut found);
        }
        found
            .into_iter()
            .filter_map(|sp| {
                let body = sp.child("p:txBody")?;
                Some(ShapeText {
                    is_title: is_title_shape(sp),
                    paragraphs: body
                        .elements()
                        .filter(|el| el.is("a:p"))
                        .map(|p| {
                            let level = p
                                .child("a:pPr")
                                .and_then(|ppr| ppr.attr("lvl"))
                                .and_then(|v| v.parse().ok())
                                .unwrap_or(0);
                            (level, drawing_paragraph_text(p))
                        })
                        .collect(),
                })
            })
            .collect()
    }

    /// Text of every table: rows of cell texts.
    pub fn tables(&self) -> Vec<Vec<Vec<String>>> {
        let mut tables = Vec::new();
        if let Some(tree) = self.tree() {
            tree.descendants("a:tbl", &mut tables);
        }
        tables
            .into_iter()
            .map(|tbl| {
                tbl.elements()
                    .filter(|el| el.is("a:tr"))
                    .map(|tr| {
                        tr.elements()
                            .filter(|el| el.is("a:tc"))
                            .map(|tc| {
                                let mut paragraphs = Vec::new();
                                tc.descendants("a:p", &mut paragraphs);
                                paragraphs
                                    .into_iter()
                                    .map(drawing_paragraph_text)
                                    .collect::<Vec<_>>()
                                    .join("\n")
                                    .trim()
                                    .to_string()
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }

    /// Current title placeholder text.
    pub fn title(&self) -> Option<String> {
        self.shapes()
            .into_iter()
            .find(|s| s.is_title)
            .map(|s| {
                s.paragraphs
                    .into_iter()
                    .map(|(_, t)| t)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
    }

    /// Replace the title placeholder text. Returns false when the slide has
    /// no title placeholder.
    pub fn set_title(&mut self, text: &str) -> bool {
        let Some(path) = self.shape_path(true) else {
            return false;
        };
        let Some(body) = self.shape_mut(&path).and_then(|sp| sp.child_mut("p:txBody")) else {
            return false;
        };

        let mut first_seen = false;
        body.children.retain(|node| match node {
            XmlNode::Element(el) if el.is("a:p") => !std::mem::replace(&mut first_seen, true),
            _ => true,
        });
        let p = body.child_or_insert("a:p", false);

        let mut replaced = false;
        for run in p.elements_mut().filter(|el| el.is("a:r")) {
            let t = run.child_or_insert("a:t", false);
            if replaced {
                t.children.clear();
            } else {
                t.children = vec![XmlNode::Text(text.to_string())];
                replaced = true;
            }
        }
        if !replaced {
            insert_before_end_props(
                p,
                XmlElement::new("a:r").with_child(XmlElement::new("a:t").with_text(text)),
            );
        }
        true
    }

    /// Replace the paragraphs of the first non-title text shape, one
    /// paragraph per line. Returns false when there is no such shape.
    ///
    /// New paragraphs copy the paragraph and run properties of the shape's
    /// first paragraph.
    pub fn set_body(&mut self, lines: &[String]) -> bool {
        let Some(path) = self.shape_path(false) else {
            return false;
        };
        let Some(body) = self.shape_mut(&path).and_then(|sp| sp.child_mut("p:txBody")) else {
            return false;
        };

        let first = body.child("a:p");
        let ppr = first.and_then(|p| p.child("a:pPr")).cloned();
        let rpr = first
            .and_then(|p| p.elements().find(|el| el.is("a:r")))
            .and_then(|r| r.child("a:rPr"))
            .cloned();

        body.remove_elements(|el| el.is("a:p"));
        for line in lines {
            let mut p = XmlElement::new("a:p");
            if let Some(ppr) = &ppr {
                p = p.with_child(ppr.clone());
            }
            let mut r = XmlElement::new("a:r");
            if let Some(rpr) = &rpr {
                r = r.with_child(rpr.clone());
            }
            p = p.with_child(r.with_child(XmlElement::new("a:t").with_text(line.as_str())));
            body.children.push(XmlNode::Element(p));
        }
        if lines.is_empty() {
            body.children.push(XmlNode::Element(XmlElement::new("a:p")));
        }
        true
    }

    fn tree(&self) -> Option<&XmlElement> {
        self.xml.root.path(&["p:cSld", "p:spTree"])
    }

    /// Child-position path from `p:spTree` to the first text shape whose
    /// title flag equals `title`.
    fn shape_path(&self, title: bool) -> Option<Vec<usize>> {
        fn walk(el: &XmlElement, title: bool, path: &mut Vec<usize>) -> bool {
            for (i, node) in el.children.iter().enumerate() {
                let XmlNode::Element(child) = node else {
                    continue;
                };
                path.push(i);
                if child.is("p:sp")
                    && child.child("p:txBody").is_some()
                    && is_title_shape(child) == title
                {
                    return true;
                }
                if child.is("p:grpSp") && walk(child, title, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        walk(self.tree()?, title, &mut path).then_some(path)
    }

    fn shape_mut(&mut self, path: &[usize]) -> Option<&mut XmlElement> {
        let mut current = self.xml.root.path_mut(&["p:cSld", "p:spTree"])?;
        for &i in path {
            current = current.children.get_mut(i)?.as_element_mut()?;
        }
        Some(current)
    }
}

/// A `.pptx` template opened for editing.
#[derive(Debug, Clone)]
pub struct SlideDeck {
    package: Package,
    slides: Vec<Slide>,
    title: Option<String>,
}

impl SlideDeck {
    /// Open a deck from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }

    /// Open a deck from memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(data)?)
    }

    /// Wrap an opened package, loading slides in presentation order.
    pub fn from_package(package: Package) -> Result<Self> {
        let main_part = package
            .relationships("")?
            .by_type_suffix("/officeDocument")
            .map(|r| resolve_target("", &r.target))
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());

        let presentation = package.read_xml(&main_part)?;
        let rels = package.relationships(&main_part)?;

        let mut slides = Vec::new();
        if let Some(list) = presentation.root.child("p:sldIdLst") {
            for sld in list.elements().filter(|el| el.is("p:sldId")) {
                let Some(rid) = sld.attr("r:id") else {
                    continue;
                };
                let rel = rels.get(rid).ok_or_else(|| {
                    Error::MissingPart(format!("{}: relationship {}", main_part, rid))
                })?;
                let part = resolve_target(&main_part, &rel.target);
                let xml = package.read_xml(&part)?;
                slides.push(Slide { part, xml });
            }
        }

        log::debug!("Opened {} with {} slides", main_part, slides.len());
        Ok(Self {
            package,
            slides,
            title: None,
        })
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Slide by position.
    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    /// Set the document title property written on save.
    pub fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    /// Serialize the edited slides into the package and write it out.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        for slide in &self.slides {
            self.package.write_xml(&slide.part, &slide.xml)?;
        }
        props::update_core_properties(&mut self.package, self.title.as_deref(), chrono::Utc::now())?;
        self.package.save(path)
    }
}

fn collect_shapes<'a>(el: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
    for child in el.elements() {
        if child.is("p:sp") {
            out.push(child);
        } else if child.is("p:grpSp") {
            collect_shapes(child, out);
        }
    }
}

fn is_title_shape(sp: &XmlElement) -> bool {
    sp.path(&["p:nvSpPr", "p:nvPr", "p:ph"])
        .and_then(|ph| ph.attr("type"))
        .is_some_and(|t| matches!(t, "title" | "ctrTitle"))
}

fn drawing_paragraph_text(p: &XmlElement) -> String {
    let mut text = String::new();
    for child in p.elements() {
        match child.name.as_str() {
            "a:r" | "a:fld" => {
                if let Some(t) = child.child("a:t") {
                    text.push_str(&t.text_content());
                }
            }
            "a:br" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Insert a run ahead of the trailing `a:endParaRPr`, if any.
fn insert_before_end_props(p: &mut XmlElement, run: XmlElement) {
    let at = p
        .children
        .iter()
        .position(|n| matches!(n, XmlNode::Element(el) if el.is("a:endParaRPr")))
        .unwrap_or(p.children.len());
    p.children.insert(at, XmlNode::Element(run));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::testing::zip_bytes;

    const PRESENTATION: &str = r#"<p:presentation xmlns:p="p" xmlns:r="r">
        <p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst>
    </p:presentation>"#;

    const RELS: &str = r#"<Relationships xmlns="x">
        <Relationship Id="rId2" Type="t/slide" Target="slides/slide1.xml"/>
        <Relationship Id="rId3" Type="t/slide" Target="slides/slide2.xml"/>
    </Relationships>"#;

    fn slide(title: &str, body: &str) -> String {
        format!(
            r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>
                <p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
                  <p:txBody><a:bodyPr/><a:p><a:r><a:rPr b="1"/><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>
                <p:grpSp><p:sp><p:nvSpPr><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr>
                  <p:txBody><a:bodyPr/><a:p><a:pPr lvl="1"/><a:r><a:rPr sz="1800"/><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:grpSp>
            </p:spTree></p:cSld></p:sld>"#,
            title, body
        )
    }

    fn deck() -> SlideDeck {
        let one = slide("First", "alpha");
        let two = slide("Second", "beta");
        SlideDeck::from_bytes(&zip_bytes(&[
            ("ppt/presentation.xml", PRESENTATION),
            ("ppt/_rels/presentation.xml.rels", RELS),
            ("ppt/slides/slide1.xml", one.as_str()),
            ("ppt/slides/slide2.xml", two.as_str()),
        ]))
        .unwrap()
    }

    #[test]
    fn test_slides_follow_presentation_order() {
        let deck = deck();
        assert_eq!(deck.slide_count(), 2);
        assert_eq!(deck.slides()[0].part, "ppt/slides/slide2.xml");
        assert_eq!(deck.slides()[0].title().as_deref(), Some("Second"));
    }

    #[test]
    fn test_shapes_report_levels() {
        let deck = deck();
        let shapes = deck.slides()[1].shapes();
        assert_eq!(shapes.len(), 2);
        assert!(shapes[0].is_title);
        assert_eq!(shapes[1].paragraphs, vec![(1, "alpha".to_string())]);
    }

    #[test]
    fn test_set_title_and_body() {
        let mut deck = deck();
        let slide = deck.slide_mut(0).unwrap();

        assert!(slide.set_title("Overview"));
        assert!(slide.set_body(&["one".to_string(), "two".to_string()]));

        let shapes = slide.shapes();
        assert_eq!(shapes[0].paragraphs, vec![(0, "Overview".to_string())]);
        assert_eq!(
            shapes[1].paragraphs,
            vec![(1, "one".to_string()), (1, "two".to_string())]
        );

        let xml = String::from_utf8(slide.xml.to_bytes().unwrap()).unwrap();
        assert!(xml.contains(r#"<a:rPr b="1"/><a:t>Overview</a:t>"#));
        assert_eq!(xml.matches(r#"<a:rPr sz="1800"/>"#).count(), 2);
    }
}
