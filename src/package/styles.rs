//! `word/styles.xml` reader.

use super::docx::read_run_properties;
use crate::model::{StyleDef, StyleSheet};
use crate::xml::XmlElement;

/// Collect the paragraph styles of a WordprocessingML style part.
///
/// Character, table and numbering styles are skipped; only paragraph styles
/// can be named by `w:pStyle`.
pub fn parse_styles(root: &XmlElement) -> StyleSheet {
    let mut sheet = StyleSheet::new();

    for style in root.elements().filter(|el| el.is("w:style")) {
        let kind = style.attr("w:type").unwrap_or("paragraph");
        if kind != "paragraph" {
            continue;
        }
        let Some(id) = style.attr("w:styleId") else {
            continue;
        };

        let name = style
            .child("w:name")
            .and_then(|n| n.attr("w:val"))
            .unwrap_or(id);

        sheet.add(StyleDef {
            id: id.to_string(),
            name: name.to_string(),
            based_on: style
                .child("w:basedOn")
                .and_then(|b| b.attr("w:val"))
                .map(str::to_string),
            font: style
                .child("w:rPr")
                .map(read_run_properties)
                .unwrap_or_default(),
            outline_level: style
                .path(&["w:pPr", "w:outlineLvl"])
                .and_then(|o| o.attr("w:val"))
                .and_then(|v| v.parse().ok()),
        });
    }

    log::debug!("Parsed {} paragraph styles", sheet.styles.len());
    sheet
}
