//! Body rebuild: section paragraphs styled after the template.

use super::RenderOptions;
use crate::error::Result;
use crate::model::{
    BodyItem, BodyItemKind, Paragraph, ParagraphStyle, RoleStyle, Section, StyleProfile, TextRun,
    TextStyle,
};
use crate::tree::DocumentTree;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Size factor of a subheading rendered in the body style.
const SUBHEADING_SCALE: f32 = 1.1;

fn list_markers() -> &'static [Regex; 3] {
    static RE: OnceLock<[Regex; 3]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"^[-*•‣◦▪●–]\s*").expect("valid regex"),
            Regex::new(r"^\d+[.)]\s+").expect("valid regex"),
            Regex::new(r"^[a-zA-Z][.)]\s+").expect("valid regex"),
        ]
    })
}

/// Strip a leading bullet glyph, `N.` / `N)` number or `a.` / `a)` letter.
///
/// Each marker kind is removed at most once, in that order, so `"- 1. x"`
/// becomes `"x"`.
pub fn clean_bullet_text(text: &str) -> String {
    let mut cleaned = text.trim().to_string();
    for marker in list_markers() {
        if let Some(m) = marker.find(&cleaned) {
            cleaned = cleaned[m.end()..].to_string();
        }
    }
    cleaned.trim().to_string()
}

fn tight_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+[.)]").expect("valid regex"))
}

/// Key under which two body items count as the same content.
///
/// Besides the display markers, a number glued to the text ("1.Item") is
/// dropped, unless a digit follows it as in "3.5 million".
fn dedup_key(content: &str) -> String {
    let cleaned = clean_bullet_text(content);
    let rest = match tight_number().find(&cleaned) {
        Some(m) if !cleaned[m.end()..].starts_with(|c: char| c.is_ascii_digit()) => {
            &cleaned[m.end()..]
        }
        _ => cleaned.as_str(),
    };
    rest.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Collapse items that carry the same content.
///
/// One item is kept per distinct content, in order of first appearance. The
/// kept item is the most structured one of its group (bullet over subheading
/// over text; the earliest among equals). Items with no content are dropped.
pub fn dedup_body(items: &[BodyItem]) -> Vec<BodyItem> {
    let mut groups: Vec<&BodyItem> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = dedup_key(&item.content);
        if key.is_empty() {
            continue;
        }
        match seen.get(&key) {
            Some(&at) => {
                let kept = groups[at];
                if item.kind.priority() > kept.kind.priority() {
                    log::debug!(
                        "Duplicate '{}': {:?} replaces {:?}",
                        key,
                        item.kind,
                        kept.kind
                    );
                    groups[at] = item;
                } else {
                    log::debug!("Duplicate '{}' dropped", key);
                }
            }
            None => {
                seen.insert(key, groups.len());
                groups.push(item);
            }
        }
    }
    groups.into_iter().cloned().collect()
}

/// Counters from one body rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyStats {
    /// Paragraphs removed after the safe zone
    pub paragraphs_removed: usize,
    /// Sections written
    pub sections: usize,
    /// Body items written
    pub items_emitted: usize,
    /// Body items dropped as duplicates
    pub items_deduplicated: usize,
}

/// Replace everything after the safe zone with the rendered sections.
pub fn rebuild_body<D: DocumentTree + ?Sized>(
    doc: &mut D,
    profile: &StyleProfile,
    sections: &[Section],
    options: &RenderOptions,
) -> Result<BodyStats> {
    let mut stats = BodyStats::default();
    let before = doc.paragraph_count();
    doc.truncate(profile.safe_zone_end)?;
    stats.paragraphs_removed = before.saturating_sub(doc.paragraph_count());

    let styler = Styler::new(&*doc, profile, options);

    for (index, section) in sections.iter().enumerate() {
        if index > 0 && options.section_spacing {
            doc.append(Paragraph::styled(profile.body.style_name.clone(), ""))?;
        }
        doc.append(styler.role_paragraph(&profile.heading, section.title.trim()))?;

        let items = dedup_body(&section.body);
        stats.items_deduplicated += section.body.len() - items.len();
        for item in &items {
            if let Some(paragraph) = styler.item_paragraph(item) {
                doc.append(paragraph)?;
                stats.items_emitted += 1;
            }
        }
        stats.sections += 1;
    }

    log::info!(
        "Rebuilt body: removed {} paragraph(s), wrote {} section(s) with {} item(s)",
        stats.paragraphs_removed,
        stats.sections,
        stats.items_emitted
    );
    Ok(stats)
}

/// Paragraph factory for one document and profile.
///
/// Whether the subheading and bullet styles exist is settled once, before
/// the first paragraph is written.
struct Styler<'a> {
    profile: &'a StyleProfile,
    options: &'a RenderOptions,
    has_subheading: bool,
    has_bullet: bool,
    body_size: Option<f32>,
}

impl<'a> Styler<'a> {
    fn new<D: DocumentTree + ?Sized>(
        doc: &D,
        profile: &'a StyleProfile,
        options: &'a RenderOptions,
    ) -> Self {
        let body_size = profile.body.font.font_size.or_else(|| {
            doc.style_font(&profile.body.style_name)
                .and_then(|f| f.font_size)
        });
        let has_subheading = doc.has_style(&profile.subheading.style_name);
        let has_bullet = doc.has_style(&profile.bullet.style_name);
        if !has_subheading {
            log::warn!(
                "Style '{}' not in template, subheadings use bold body text",
                profile.subheading.style_name
            );
        }
        if !has_bullet {
            log::warn!(
                "Style '{}' not in template, bullets are drawn manually",
                profile.bullet.style_name
            );
        }
        Self {
            profile,
            options,
            has_subheading,
            has_bullet,
            body_size,
        }
    }

    fn role_paragraph(&self, role: &RoleStyle, text: &str) -> Paragraph {
        paragraph(&role.style_name, text, role.font.clone())
    }

    fn item_paragraph(&self, item: &BodyItem) -> Option<Paragraph> {
        let profile = self.profile;
        match item.kind {
            BodyItemKind::Text => {
                let text = item.content.trim();
                (!text.is_empty()).then(|| self.role_paragraph(&profile.body, text))
            }
            BodyItemKind::Subheading => {
                let text = item.content.trim();
                if text.is_empty() {
                    return None;
                }
                if self.has_subheading {
                    return Some(self.role_paragraph(&profile.subheading, text));
                }
                let font = TextStyle {
                    bold: Some(true),
                    font_size: self.body_size.map(|s| s * SUBHEADING_SCALE),
                    ..profile.body.font.clone()
                };
                Some(paragraph(&profile.body.style_name, text, font))
            }
            BodyItemKind::Bullet => {
                let text = clean_bullet_text(&item.content);
                if text.is_empty() {
                    return None;
                }
                if self.has_bullet {
                    return Some(self.role_paragraph(&profile.bullet, &text));
                }
                let indent = self.options.bullet_indent_pt;
                let mut p = paragraph(
                    &profile.body.style_name,
                    &format!("{} {}", self.options.bullet_glyph, text),
                    profile.bullet.font.clone(),
                );
                p.style.indent_left = Some(indent);
                p.style.first_line_indent = Some(-indent);
                Some(p)
            }
        }
    }
}

fn paragraph(style_name: &str, text: &str, font: TextStyle) -> Paragraph {
    Paragraph {
        runs: vec![TextRun::with_style(text, font)],
        style: ParagraphStyle {
            style_name: Some(style_name.to_string()),
            ..Default::default()
        },
    }
}
