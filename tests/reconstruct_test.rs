//! End-to-end tests: templates written to disk, rebuilt, and read back.

use retemplate::mapping::MappingRequest;
use retemplate::package::Package;
use retemplate::{
    BodyItem, DocumentTree, DocxDocument, Error, RenderOptions, ReconstructOptions, Result,
    Retemplate, Section, SlideDeck,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

const STYLES: &str = r#"<w:styles xmlns:w="urn:w">
    <w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/>
        <w:rPr><w:rFonts w:ascii="Calibri"/><w:sz w:val="22"/></w:rPr></w:style>
    <w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/>
        <w:rPr><w:b/><w:sz w:val="56"/></w:rPr></w:style>
    <w:style w:type="paragraph" w:styleId="TOCHeading"><w:name w:val="TOC Heading"/></w:style>
    <w:style w:type="paragraph" w:styleId="TOC1"><w:name w:val="toc 1"/></w:style>
    <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/>
        <w:pPr><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style>
    <w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/>
        <w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style>
    <w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/></w:style>
</w:styles>"#;

const CORE: &str = r#"<cp:coreProperties xmlns:cp="c" xmlns:dc="d" xmlns:dcterms="t">
    <dc:title>Old Report</dc:title><dcterms:modified>2001-01-01T00:00:00Z</dcterms:modified>
</cp:coreProperties>"#;

fn para(style: &str, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        style, text
    )
}

fn toc_entry(text: &str, page: u32) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="TOC1"/></w:pPr><w:r><w:t>{}</w:t><w:tab/><w:t>{}</w:t></w:r></w:p>"#,
        text, page
    )
}

fn write_zip(path: &Path, parts: &[(&str, String)]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, data) in parts {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn write_docx(path: &Path, body: &str) {
    let document = format!(
        r#"<w:document xmlns:w="urn:w"><w:body>{}<w:sectPr><w:pgSz w:w="12240"/></w:sectPr></w:body></w:document>"#,
        body
    );
    write_zip(
        path,
        &[
            ("[Content_Types].xml", "<Types/>".to_string()),
            (
                "_rels/.rels",
                format!(
                    r#"<Relationships><Relationship Id="rId1" Type="{}" Target="word/document.xml"/></Relationships>"#,
                    OFFICE_DOCUMENT
                ),
            ),
            ("word/document.xml", document),
            (
                "word/_rels/document.xml.rels",
                r#"<Relationships><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#
                    .to_string(),
            ),
            ("word/styles.xml", STYLES.to_string()),
            ("docProps/core.xml", CORE.to_string()),
        ],
    );
}

/// Cover, contents with two entries, then the replaceable body.
fn report_template(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("template.docx");
    let body = [
        para("Title", "Old Report Title"),
        para("TOCHeading", "Contents"),
        toc_entry("1. Old Intro", 3),
        toc_entry("2. Old Body", 5),
        para("Heading1", "Old Intro"),
        r#"<w:p><w:pPr><w:pStyle w:val="Normal"/></w:pPr><w:r><w:rPr><w:sz w:val="22"/></w:rPr><w:t>Old body text</w:t></w:r></w:p>"#.to_string(),
        para("Heading2", "Old subheading"),
        para("ListBullet", "Old bullet"),
        r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>old cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#.to_string(),
    ]
    .concat();
    write_docx(&path, &body);
    path
}

fn source_document(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("source.docx");
    let body = [
        para("Heading1", "Profile"),
        para("Normal", "Engineer with ten years of experience."),
        para("Heading1", "Work"),
        para("ListBullet", "Built the billing platform"),
    ]
    .concat();
    write_docx(&path, &body);
    path
}

fn sections() -> Vec<Section> {
    vec![
        Section::new(
            "Overview",
            vec![
                BodyItem::text("Engineer with ten years of experience."),
                BodyItem::subheading("Focus"),
            ],
        ),
        Section::new(
            "Experience",
            vec![
                BodyItem::bullet("- Built the billing platform"),
                BodyItem::text("Built the billing platform"),
            ],
        ),
    ]
}

fn texts(doc: &DocxDocument) -> Vec<String> {
    doc.paragraphs().iter().map(|p| p.plain_text()).collect()
}

fn core_title(path: &Path) -> String {
    Package::open(path)
        .unwrap()
        .read_xml("docProps/core.xml")
        .unwrap()
        .root
        .child("dc:title")
        .unwrap()
        .text_content()
}

#[test]
fn test_render_sections_keeps_front_matter_and_rewrites_body() {
    let dir = TempDir::new().unwrap();
    let template = report_template(&dir);
    let output = dir.path().join("out.docx");

    let engine = Retemplate::new().with_document_title("Annual Report");
    let report = engine.render_sections(&sections(), &template, &output).unwrap();

    assert_eq!(report.safe_zone_end, 4);
    assert_eq!(report.cover_title_index, Some(0));
    assert!(report.cover_updated());
    assert_eq!(report.toc_entries_found, 2);
    assert_eq!(report.toc_entries_updated, 2);
    assert_eq!(report.sections_rendered, 2);
    assert_eq!(report.items_deduplicated, 1);
    assert_eq!(report.output_path.as_deref(), Some(output.as_path()));
    assert!(report.rendered_at.is_some());

    let doc = DocxDocument::open(&output).unwrap();
    let all = texts(&doc);
    assert_eq!(all[0], "Annual Report");
    assert_eq!(all[1], "Contents");
    assert_eq!(all[2], "1. Overview\t3");
    assert_eq!(all[3], "2. Experience\t5");
    assert_eq!(all[4], "Overview");

    let heading = doc.paragraph(4).unwrap();
    assert_eq!(heading.style_name(), "heading 1");

    assert!(all.iter().any(|t| t == "Experience"));
    assert!(all.iter().any(|t| t == "Focus"));
    assert!(all.iter().any(|t| t.contains("Built the billing platform")));
    assert!(!all.iter().any(|t| t.starts_with("Old")));
    assert!(doc.tables().is_empty());

    assert_eq!(core_title(&output), "Annual Report");
}

#[test]
fn test_template_file_is_not_modified() {
    let dir = TempDir::new().unwrap();
    let template = report_template(&dir);
    let before = fs::read(&template).unwrap();

    Retemplate::new()
        .render_sections(&sections(), &template, dir.path().join("out.docx"))
        .unwrap();

    assert_eq!(fs::read(&template).unwrap(), before);
}

#[test]
fn test_front_matter_updates_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let template = report_template(&dir);
    let output = dir.path().join("out.docx");

    let options = ReconstructOptions::new().with_render(
        RenderOptions::new()
            .with_cover_update(false)
            .with_toc_update(false),
    );
    let report = Retemplate::new()
        .with_options(options)
        .render_sections(&sections(), &template, &output)
        .unwrap();

    assert!(!report.cover_updated());
    assert_eq!(report.toc_entries_updated, 0);

    let all = texts(&DocxDocument::open(&output).unwrap());
    assert_eq!(all[0], "Old Report Title");
    assert_eq!(all[2], "1. Old Intro\t3");
    assert_eq!(all[4], "Overview");
}

#[test]
fn test_reconstruct_with_closure_mapper() {
    let dir = TempDir::new().unwrap();
    let source = source_document(&dir);
    let template = report_template(&dir);
    let output = dir.path().join("out.docx");

    let mapper = |req: &MappingRequest<'_>| -> Result<String> {
        assert!(req.content_summary().contains("billing platform"));
        Ok(r#"{"sections":[
            {"title":"Profile","body":["Engineer with ten years of experience."]},
            {"title":"Work","body":[{"type":"bullet","content":"Built the billing platform"}]}
        ]}"#
            .to_string())
    };

    let report = Retemplate::new()
        .with_mapper(mapper)
        .sequential()
        .reconstruct(&source, &template, &output)
        .unwrap();

    assert_eq!(report.chunks_total, 1);
    assert_eq!(report.chunks_fallback, 0);
    assert_eq!(report.sections_rendered, 2);

    let all = texts(&DocxDocument::open(&output).unwrap());
    assert_eq!(all[0], "Profile");
    assert_eq!(all[2], "1. Profile\t3");
    assert_eq!(all[4], "Profile");
    assert!(all.iter().any(|t| t == "Work"));
}

#[test]
fn test_failing_mapper_falls_back_to_source_text() {
    let dir = TempDir::new().unwrap();
    let source = source_document(&dir);
    let template = report_template(&dir);
    let output = dir.path().join("out.docx");

    let mapper =
        |_: &MappingRequest<'_>| -> Result<String> { Err(Error::Mapper("offline".into())) };
    let mut options = ReconstructOptions::new();
    options.mapping.max_retries = 0;

    let report = Retemplate::new()
        .with_options(options)
        .with_mapper(mapper)
        .reconstruct(&source, &template, &output)
        .unwrap();

    assert_eq!(report.chunks_fallback, 1);
    let all = texts(&DocxDocument::open(&output).unwrap());
    assert_eq!(all[4], "Section 1");
    assert!(all.iter().any(|t| t == "Engineer with ten years of experience."));
}

#[test]
fn test_template_without_heading_is_fully_replaced() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("plain.docx");
    write_docx(
        &template,
        &[para("Normal", "Only text"), para("Normal", "More text")].concat(),
    );
    let output = dir.path().join("out.docx");

    let report = Retemplate::new()
        .render_sections(&sections(), &template, &output)
        .unwrap();

    assert_eq!(report.safe_zone_end, 0);
    assert_eq!(report.cover_title_index, None);
    let all = texts(&DocxDocument::open(&output).unwrap());
    assert_eq!(all[0], "Overview");
    assert!(!all.iter().any(|t| t.contains("Only text")));
}

fn slide(title: &str, body: &str) -> String {
    format!(
        r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>
            <p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
              <p:txBody><a:bodyPr/><a:p><a:r><a:rPr b="1"/><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>
            <p:sp><p:nvSpPr><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr>
              <p:txBody><a:bodyPr/><a:p><a:r><a:rPr sz="2000"/><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>
        </p:spTree></p:cSld></p:sld>"#,
        title, body
    )
}

fn write_pptx(path: &Path) {
    write_zip(
        path,
        &[
            ("[Content_Types].xml", "<Types/>".to_string()),
            (
                "_rels/.rels",
                format!(
                    r#"<Relationships><Relationship Id="rId1" Type="{}" Target="ppt/presentation.xml"/></Relationships>"#,
                    OFFICE_DOCUMENT
                ),
            ),
            (
                "ppt/presentation.xml",
                r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst>
                    <p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/>
                </p:sldIdLst></p:presentation>"#
                    .to_string(),
            ),
            (
                "ppt/_rels/presentation.xml.rels",
                r#"<Relationships>
                    <Relationship Id="rId2" Type="t/slide" Target="slides/slide1.xml"/>
                    <Relationship Id="rId3" Type="t/slide" Target="slides/slide2.xml"/>
                </Relationships>"#
                    .to_string(),
            ),
            ("ppt/slides/slide1.xml", slide("Old first", "old text")),
            ("ppt/slides/slide2.xml", slide("Old second", "more old text")),
        ],
    );
}

#[test]
fn test_slides_receive_one_section_each() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("deck.pptx");
    write_pptx(&template);
    let output = dir.path().join("out.pptx");

    let mut all = sections();
    all.push(Section::new("Extra", vec![BodyItem::text("does not fit")]));

    let report = Retemplate::new()
        .render_sections(&all, &template, &output)
        .unwrap();
    assert_eq!(report.sections_rendered, 2);
    assert_eq!(report.sections_unplaced, 1);

    let deck = SlideDeck::open(&output).unwrap();
    let slides = deck.slides();
    assert_eq!(slides.len(), 2);
    assert_eq!(slides[0].title().as_deref(), Some("Overview"));
    assert_eq!(slides[1].title().as_deref(), Some("Experience"));

    let body: Vec<String> = slides[1]
        .shapes()
        .into_iter()
        .find(|s| !s.is_title)
        .unwrap()
        .paragraphs
        .into_iter()
        .map(|(_, t)| t)
        .collect();
    assert_eq!(body, vec!["Built the billing platform"]);
}

#[test]
fn test_pdf_template_is_unsupported() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("template.pdf");
    fs::write(&template, b"%PDF-1.7\n%%EOF").unwrap();

    let err = Retemplate::new()
        .render_sections(&sections(), &template, dir.path().join("out.pdf"))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFileType(_)));
}

#[test]
fn test_options_from_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.json");
    fs::write(
        &path,
        r#"{"mapping":{"chunk_size":5},"render":{"update_toc":false}}"#,
    )
    .unwrap();

    let options = ReconstructOptions::from_json_file(&path).unwrap();
    assert_eq!(options.mapping.chunk_size, 5);
    assert!(!options.render.update_toc);
    assert!(options.render.update_cover);

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        ReconstructOptions::from_json_file(&path),
        Err(Error::Config(_))
    ));
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_reconstruct_file_async() {
    use retemplate::{reconstruct_file_async, OutlineMapper};
    use std::sync::Arc;

    let dir = TempDir::new().unwrap();
    let source = source_document(&dir);
    let template = report_template(&dir);
    let output = dir.path().join("out.docx");

    let report = reconstruct_file_async(
        source,
        template,
        output.clone(),
        Arc::new(OutlineMapper),
        ReconstructOptions::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.sections_rendered, 2);
    let all = texts(&DocxDocument::open(&output).unwrap());
    assert_eq!(all[4], "Profile");
    assert!(all.iter().any(|t| t == "Work"));
}
