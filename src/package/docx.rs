//! WordprocessingML backend.

use super::{props, resolve_target, styles::parse_styles, Package};
use crate::error::{Error, Result};
use crate::model::{Alignment, Paragraph, ParagraphStyle, StyleSheet, TextRun, TextStyle};
use crate::tree::DocumentTree;
use crate::xml::{XmlDocument, XmlElement, XmlNode};
use std::path::Path;

const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// Elements that wrap runs without being runs themselves.
const RUN_CONTAINERS: &[&str] = &[
    "w:hyperlink",
    "w:ins",
    "w:smartTag",
    "w:fldSimple",
    "w:customXml",
    "w:sdt",
    "w:sdtContent",
];

/// Run children that carry visible text.
const TEXT_CHILDREN: &[&str] = &["w:t", "w:tab", "w:br", "w:cr"];

/// Where an indexed paragraph lives inside `w:body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Location {
    /// Child position in `w:body`
    body: usize,
    /// Child position inside `w:sdt/w:sdtContent`, for content controls
    inner: Option<usize>,
}

/// A `.docx` template opened for editing.
///
/// The paragraph sequence covers paragraphs directly under `w:body` and those
/// wrapped in body-level content controls (where Word keeps its generated
/// table of contents). Paragraphs inside tables are not indexed, but tables
/// past a truncation point are removed together with the paragraphs.
#[derive(Debug, Clone)]
pub struct DocxDocument {
    package: Package,
    main_part: String,
    document: XmlDocument,
    styles: StyleSheet,
    index: Vec<Location>,
    title: Option<String>,
}

impl DocxDocument {
    /// Open a template from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }

    /// Open a template from memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(data)?)
    }

    /// Wrap an opened package.
    pub fn from_package(package: Package) -> Result<Self> {
        let main_part = package
            .relationships("")?
            .by_type_suffix("/officeDocument")
            .map(|r| resolve_target("", &r.target))
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());

        let document = package.read_xml(&main_part)?;
        if document.root.child("w:body").is_none() {
            return Err(Error::MissingPart(format!("{}: w:body", main_part)));
        }

        let styles_part = package
            .relationships(&main_part)?
            .by_type_suffix("/styles")
            .map(|r| resolve_target(&main_part, &r.target));
        let styles = match styles_part {
            Some(part) => match package.read_xml_opt(&part)? {
                Some(doc) => parse_styles(&doc.root),
                None => StyleSheet::new(),
            },
            None => StyleSheet::new(),
        };

        let mut doc = Self {
            package,
            main_part,
            document,
            styles,
            index: Vec::new(),
            title: None,
        };
        doc.reindex();
        log::debug!(
            "Opened {} with {} paragraphs, {} styles",
            doc.main_part,
            doc.index.len(),
            doc.styles.styles.len()
        );
        Ok(doc)
    }

    /// Text of every body-level table: rows of cell texts.
    pub fn tables(&self) -> Vec<Vec<Vec<String>>> {
        let Some(body) = self.body() else {
            return Vec::new();
        };
        body.elements()
            .filter(|el| el.is("w:tbl"))
            .map(|tbl| {
                tbl.elements()
                    .filter(|el| el.is("w:tr"))
                    .map(|tr| {
                        tr.elements()
                            .filter(|el| el.is("w:tc"))
                            .map(|tc| {
                                tc.elements()
                                    .filter(|el| el.is("w:p"))
                                    .map(paragraph_text)
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

    /// Serialize the edited document into the package and write it out.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.package.write_xml(&self.main_part, &self.document)?;
        props::update_core_properties(&mut self.package, self.title.as_deref(), chrono::Utc::now())?;
        self.package.save(path)
    }

    fn body(&self) -> Option<&XmlElement> {
        self.document.root.child("w:body")
    }

    fn body_mut(&mut self) -> Result<&mut XmlElement> {
        self.document
            .root
            .child_mut("w:body")
            .ok_or_else(|| Error::MissingPart("w:body".to_string()))
    }

    fn reindex(&mut self) {
        self.index.clear();
        let Some(body) = self.document.root.child("w:body") else {
            return;
        };
        for (i, node) in body.children.iter().enumerate() {
            let XmlNode::Element(el) = node else {
                continue;
            };
            if el.is("w:p") {
                self.index.push(Location { body: i, inner: None });
            } else if el.is("w:sdt") {
                if let Some(content) = el.child("w:sdtContent") {
                    for (j, inner) in content.children.iter().enumerate() {
                        if matches!(inner, XmlNode::Element(p) if p.is("w:p")) {
                            self.index.push(Location {
                                body: i,
                                inner: Some(j),
                            });
                        }
                    }
                }
            }
        }
    }

    fn element_at(&self, loc: Location) -> Option<&XmlElement> {
        let node = self.body()?.children.get(loc.body)?.as_element()?;
        match loc.inner {
            None => Some(node),
            Some(j) => node.child("w:sdtContent")?.children.get(j)?.as_element(),
        }
    }

    fn element_at_mut(&mut self, loc: Location) -> Result<&mut XmlElement> {
        let missing = || Error::Rendering(format!("paragraph node {:?} vanished", loc));
        let node = self
            .body_mut()?
            .children
            .get_mut(loc.body)
            .and_then(XmlNode::as_element_mut)
            .ok_or_else(missing)?;
        match loc.inner {
            None => Ok(node),
            Some(j) => node
                .child_mut("w:sdtContent")
                .and_then(|c| c.children.get_mut(j))
                .and_then(XmlNode::as_element_mut)
                .ok_or_else(missing),
        }
    }

    fn build_paragraph(&self, paragraph: &Paragraph) -> XmlElement {
        let mut p = XmlElement::new("w:p");
        let mut ppr = XmlElement::new("w:pPr");

        if let Some(name) = paragraph.style.style_name.as_deref().filter(|n| !n.is_empty()) {
            match self.styles.by_name(name) {
                Some(def) => {
                    ppr = ppr.with_child(XmlElement::new("w:pStyle").with_attr("w:val", &def.id));
                }
                None => log::warn!("Style '{}' not defined in template; emitting unstyled", name),
            }
        }

        let style = &paragraph.style;
        if style.indent_left.is_some() || style.first_line_indent.is_some() {
            let mut ind = XmlElement::new("w:ind");
            if let Some(left) = style.indent_left {
                ind.set_attr("w:left", twips(left));
            }
            match style.first_line_indent {
                Some(first) if first < 0.0 => ind.set_attr("w:hanging", twips(-first)),
                Some(first) => ind.set_attr("w:firstLine", twips(first)),
                None => {}
            }
            ppr = ppr.with_child(ind);
        }

        let jc = match style.alignment {
            Alignment::Left => None,
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
            Alignment::Justify => Some("both"),
        };
        if let Some(jc) = jc {
            ppr = ppr.with_child(XmlElement::new("w:jc").with_attr("w:val", jc));
        }
        if let Some(level) = style.outline_level {
            ppr = ppr.with_child(XmlElement::new("w:outlineLvl").with_attr("w:val", level.to_string()));
        }

        if !ppr.children.is_empty() {
            p = p.with_child(ppr);
        }

        for run in paragraph.runs.iter().filter(|r| !r.text.is_empty()) {
            let mut r = XmlElement::new("w:r");
            if run.style.has_styling() {
                r = r.with_child(build_run_properties(&run.style));
            }
            set_run_text(&mut r, &run.text);
            p = p.with_child(r);
        }
        p
    }
}

impl DocumentTree for DocxDocument {
    fn paragraph_count(&self) -> usize {
        self.index.len()
    }

    fn paragraph(&self, index: usize) -> Option<Paragraph> {
        let el = self.element_at(*self.index.get(index)?)?;
        Some(read_paragraph(el, &self.styles))
    }

    fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    fn replace_text(&mut self, index: usize, text: &str) -> Result<()> {
        let loc = *self.index.get(index).ok_or_else(|| {
            Error::Rendering(format!(
                "paragraph {} out of range ({})",
                index,
                self.index.len()
            ))
        })?;
        let p = self.element_at_mut(loc)?;

        let mut runs = Vec::new();
        collect_runs(p, &mut runs);
        let target = runs
            .iter()
            .position(|r| r.elements().any(|c| c.is("w:t") || c.is("w:tab")));
        let has_runs = !runs.is_empty();

        if !has_runs {
            let mut r = XmlElement::new("w:r");
            set_run_text(&mut r, text);
            p.children.push(XmlNode::Element(r));
            return Ok(());
        }

        let target = target.unwrap_or(0);
        let mut ordinal = 0;
        for_each_run_mut(p, &mut |run| {
            if ordinal == target {
                set_run_text(run, text);
            } else {
                run.remove_elements(|c| TEXT_CHILDREN.contains(&c.name.as_str()));
            }
            ordinal += 1;
        });
        Ok(())
    }

    fn truncate(&mut self, len: usize) -> Result<()> {
        let Some(&loc) = self.index.get(len) else {
            return Ok(());
        };

        let mut cut = loc.body;
        if let Some(j) = loc.inner {
            let sdt = self.element_at_mut(Location { body: loc.body, inner: None })?;
            if let Some(content) = sdt.child_mut("w:sdtContent") {
                let first_para = content
                    .children
                    .iter()
                    .position(|n| matches!(n, XmlNode::Element(p) if p.is("w:p")));
                if first_para.is_some_and(|first| first < j) {
                    content.children.truncate(j);
                    cut = loc.body + 1;
                }
            }
        }

        let body = self.body_mut()?;
        let mut position = 0;
        body.children.retain(|node| {
            let keep = position < cut || matches!(node, XmlNode::Element(el) if el.is("w:sectPr"));
            position += 1;
            keep
        });

        self.reindex();
        Ok(())
    }

    fn append(&mut self, paragraph: Paragraph) -> Result<()> {
        let p = self.build_paragraph(&paragraph);
        let body = self.body_mut()?;
        let at = match body.children.iter().rposition(|n| matches!(n, XmlNode::Element(_))) {
            Some(i) if matches!(&body.children[i], XmlNode::Element(el) if el.is("w:sectPr")) => i,
            _ => body.children.len(),
        };
        body.children.insert(at, XmlNode::Element(p));
        self.reindex();
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }
}

fn twips(points: f32) -> String {
    ((points * 20.0).round() as i64).to_string()
}

fn is_run_container(el: &XmlElement) -> bool {
    RUN_CONTAINERS.contains(&el.name.as_str())
}

fn collect_runs<'a>(el: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
    for child in el.elements() {
        if child.is("w:r") {
            out.push(child);
        } else if is_run_container(child) {
            collect_runs(child, out);
        }
    }
}

fn for_each_run_mut(el: &mut XmlElement, f: &mut dyn FnMut(&mut XmlElement)) {
    for child in el.elements_mut() {
        if child.is("w:r") {
            f(child);
        } else if is_run_container(child) {
            for_each_run_mut(child, f);
        }
    }
}

/// Replace the text children of a run, keeping its properties.
fn set_run_text(run: &mut XmlElement, text: &str) {
    run.remove_elements(|c| TEXT_CHILDREN.contains(&c.name.as_str()));

    let mut segment = String::new();
    let flush = |run: &mut XmlElement, segment: &mut String| {
        if !segment.is_empty() {
            run.children.push(XmlNode::Element(
                XmlElement::new("w:t")
                    .with_attr("xml:space", "preserve")
                    .with_text(std::mem::take(segment)),
            ));
        }
    };
    for ch in text.chars() {
        match ch {
            '\t' => {
                flush(run, &mut segment);
                run.children.push(XmlNode::Element(XmlElement::new("w:tab")));
            }
            '\n' => {
                flush(run, &mut segment);
                run.children.push(XmlNode::Element(XmlElement::new("w:br")));
            }
            _ => segment.push(ch),
        }
    }
    flush(run, &mut segment);
}

fn run_text(run: &XmlElement) -> String {
    let mut text = String::new();
    for child in run.elements() {
        match child.name.as_str() {
            "w:t" => text.push_str(&child.text_content()),
            "w:tab" => text.push('\t'),
            "w:br" | "w:cr" => text.push('\n'),
            "w:noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }
    text
}

pub(crate) fn paragraph_text(p: &XmlElement) -> String {
    let mut runs = Vec::new();
    collect_runs(p, &mut runs);
    runs.into_iter().map(run_text).collect()
}

fn toggle(el: Option<&XmlElement>) -> Option<bool> {
    el.map(|e| !matches!(e.attr("w:val"), Some("0" | "false" | "off")))
}

/// Read `w:rPr` into a [`TextStyle`].
pub(crate) fn read_run_properties(rpr: &XmlElement) -> TextStyle {
    let fonts = rpr.child("w:rFonts");
    TextStyle {
        font_name: fonts
            .and_then(|f| f.attr("w:ascii").or_else(|| f.attr("w:hAnsi")).or_else(|| f.attr("w:eastAsia")))
            .map(str::to_string),
        font_size: rpr
            .child("w:sz")
            .and_then(|s| s.attr("w:val"))
            .and_then(|v| v.parse::<f32>().ok())
            .map(|half_points| half_points / 2.0),
        color: rpr
            .child("w:color")
            .and_then(|c| c.attr("w:val"))
            .filter(|v| *v != "auto")
            .map(str::to_string),
        bold: toggle(rpr.child("w:b")),
        italic: toggle(rpr.child("w:i")),
    }
}

fn build_run_properties(style: &TextStyle) -> XmlElement {
    let mut rpr = XmlElement::new("w:rPr");
    if let Some(font) = &style.font_name {
        rpr = rpr.with_child(
            XmlElement::new("w:rFonts")
                .with_attr("w:ascii", font)
                .with_attr("w:hAnsi", font)
                .with_attr("w:cs", font),
        );
    }
    if let Some(bold) = style.bold {
        let b = XmlElement::new("w:b");
        rpr = rpr.with_child(if bold { b } else { b.with_attr("w:val", "0") });
    }
    if let Some(italic) = style.italic {
        let i = XmlElement::new("w:i");
        rpr = rpr.with_child(if italic { i } else { i.with_attr("w:val", "0") });
    }
    if let Some(color) = &style.color {
        rpr = rpr.with_child(XmlElement::new("w:color").with_attr("w:val", color));
    }
    if let Some(size) = style.font_size {
        let half_points = ((size * 2.0).round() as i64).to_string();
        rpr = rpr
            .with_child(XmlElement::new("w:sz").with_attr("w:val", &half_points))
            .with_child(XmlElement::new("w:szCs").with_attr("w:val", half_points));
    }
    rpr
}

fn read_paragraph(p: &XmlElement, styles: &StyleSheet) -> Paragraph {
    let mut style = ParagraphStyle::default();

    if let Some(ppr) = p.child("w:pPr") {
        if let Some(id) = ppr.child("w:pStyle").and_then(|s| s.attr("w:val")) {
            style.style_name = Some(styles.name_for_id(id));
            style.style_id = Some(id.to_string());
        }
        if let Some(jc) = ppr.child("w:jc").and_then(|j| j.attr("w:val")) {
            style.alignment = Alignment::from_ooxml(jc);
        }
        style.outline_level = ppr
            .child("w:outlineLvl")
            .and_then(|o| o.attr("w:val"))
            .and_then(|v| v.parse().ok());
        if let Some(ind) = ppr.child("w:ind") {
            let points = |key: &str| {
                ind.attr(key)
                    .and_then(|v| v.parse::<f32>().ok())
                    .map(|t| t / 20.0)
            };
            style.indent_left = points("w:left").or_else(|| points("w:start"));
            style.first_line_indent = points("w:hanging")
                .map(|h| -h)
                .or_else(|| points("w:firstLine"));
        }
    }

    let mut runs = Vec::new();
    collect_runs(p, &mut runs);
    let runs = runs
        .into_iter()
        .map(|r| {
            TextRun::with_style(
                run_text(r),
                r.child("w:rPr").map(read_run_properties).unwrap_or_default(),
            )
        })
        .collect();

    Paragraph { runs, style }
}
