//! Core document properties (`docProps/core.xml`).

use super::Package;
use crate::error::Result;
use crate::xml::XmlNode;
use chrono::{DateTime, SecondsFormat, Utc};

const CORE_PART: &str = "docProps/core.xml";

/// Stamp the core properties part before saving.
///
/// `dcterms:modified` is set to `now`; `dc:title` is replaced when a title
/// is given and the element exists. Packages without a core part are left
/// alone.
pub fn update_core_properties(
    package: &mut Package,
    title: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()> {
    let Some(mut doc) = package.read_xml_opt(CORE_PART)? else {
        return Ok(());
    };

    if let Some(modified) = doc.root.child_mut("dcterms:modified") {
        modified.children = vec![XmlNode::Text(
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
        )];
    }
    if let Some(title) = title {
        if let Some(el) = doc.root.child_mut("dc:title") {
            el.children = vec![XmlNode::Text(title.to_string())];
        }
    }

    package.write_xml(CORE_PART, &doc)
}
