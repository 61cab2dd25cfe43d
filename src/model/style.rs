//! Style catalog and the recovered style profile ("DNA") of a template.

use super::TextStyle;
use serde::{Deserialize, Serialize};

/// A named paragraph style defined by a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDef {
    /// Identifier referenced from paragraphs (e.g. "Heading1")
    pub id: String,

    /// Display name (e.g. "heading 1")
    pub name: String,

    /// Parent style id
    pub based_on: Option<String>,

    /// Character formatting declared by the style itself
    pub font: TextStyle,

    /// Outline level declared by the style
    pub outline_level: Option<u8>,
}

impl StyleDef {
    /// Create a style whose id is its name without spaces.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.replace(' ', ""),
            name,
            based_on: None,
            font: TextStyle::default(),
            outline_level: None,
        }
    }

    /// Builder: set the declared font attributes.
    pub fn with_font(mut self, font: TextStyle) -> Self {
        self.font = font;
        self
    }

    /// Builder: set the parent style id.
    pub fn based_on(mut self, id: impl Into<String>) -> Self {
        self.based_on = Some(id.into());
        self
    }
}

/// Paragraph styles available in a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    /// Style definitions in declaration order
    pub styles: Vec<StyleDef>,
}

impl StyleSheet {
    /// Create an empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a style.
    pub fn add(&mut self, style: StyleDef) {
        self.styles.push(style);
    }

    /// Look a style up by id.
    pub fn by_id(&self, id: &str) -> Option<&StyleDef> {
        self.styles.iter().find(|s| s.id == id)
    }

    /// Look a style up by display name.
    ///
    /// Matching ignores case and spaces, so "Heading 1", "heading 1" and the
    /// id form "Heading1" all resolve to the same style.
    pub fn by_name(&self, name: &str) -> Option<&StyleDef> {
        let wanted = squash(name);
        self.styles
            .iter()
            .find(|s| squash(&s.name) == wanted)
            .or_else(|| self.styles.iter().find(|s| squash(&s.id) == wanted))
    }

    /// Check whether a style with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name(name).is_some()
    }

    /// Display name for a style id, falling back to the id itself.
    pub fn name_for_id(&self, id: &str) -> String {
        self.by_id(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Character formatting of a style, inherited along `based_on`.
    pub fn resolved_font(&self, name: &str) -> Option<TextStyle> {
        let mut current = self.by_name(name)?;
        let mut font = current.font.clone();
        // Bounded walk: style chains are short, and a malformed sheet may
        // contain a cycle.
        for _ in 0..16 {
            let Some(parent) = current.based_on.as_deref().and_then(|id| self.by_id(id)) else {
                break;
            };
            font = font.or(&parent.font);
            current = parent;
        }
        Some(font)
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Style name and character formatting used for one role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleStyle {
    /// Paragraph style display name
    pub style_name: String,

    /// Character formatting applied on top of the style
    pub font: TextStyle,
}

impl RoleStyle {
    /// Create a role with no explicit formatting.
    pub fn named(style_name: impl Into<String>) -> Self {
        Self {
            style_name: style_name.into(),
            font: TextStyle::default(),
        }
    }
}

/// The recovered style DNA of a template.
///
/// Computed once per render and read-only afterwards. Everything at a
/// paragraph index below `safe_zone_end` is front matter: never deleted or
/// reordered, only text-patched in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    /// Section heading role
    pub heading: RoleStyle,

    /// Secondary heading role
    pub subheading: RoleStyle,

    /// Running text role
    pub body: RoleStyle,

    /// List item role
    pub bullet: RoleStyle,

    /// Index of the first replaceable paragraph
    pub safe_zone_end: usize,

    /// Index of the first top-level heading, if the template has one
    pub first_content_index: Option<usize>,
}

impl StyleProfile {
    /// Whether any front matter is preserved.
    pub fn has_safe_zone(&self) -> bool {
        self.safe_zone_end > 0
    }

    /// One-line description for logs.
    pub fn summary(&self) -> String {
        format!(
            "heading='{}' body='{}' subheading='{}' bullet='{}' safe_zone=0..{}",
            self.heading.style_name,
            self.body.style_name,
            self.subheading.style_name,
            self.bullet.style_name,
            self.safe_zone_end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> StyleSheet {
        let mut sheet = StyleSheet::new();
        sheet.add(StyleDef::new("Normal").with_font(TextStyle {
            font_name: Some("Calibri".into()),
            font_size: Some(11.0),
            ..Default::default()
        }));
        let mut heading = StyleDef::new("heading 1").based_on("Normal");
        heading.id = "Heading1".into();
        heading.font.bold = Some(true);
        heading.font.font_size = Some(16.0);
        sheet.add(heading);
        sheet
    }

    #[test]
    fn test_lookup_ignores_case_and_spaces() {
        let sheet = sheet();
        assert_eq!(sheet.by_name("Heading 1").unwrap().id, "Heading1");
        assert_eq!(sheet.by_name("HEADING1").unwrap().id, "Heading1");
        assert!(sheet.contains("normal"));
        assert!(!sheet.contains("List Bullet"));
        assert_eq!(sheet.name_for_id("Heading1"), "heading 1");
        assert_eq!(sheet.name_for_id("Missing"), "Missing");
    }

    #[test]
    fn test_resolved_font_follows_based_on() {
        let font = sheet().resolved_font("Heading 1").unwrap();
        assert_eq!(font.font_name.as_deref(), Some("Calibri"));
        assert_eq!(font.font_size, Some(16.0));
        assert_eq!(font.bold, Some(true));
    }

    #[test]
    fn test_resolved_font_survives_cycles() {
        let mut sheet = StyleSheet::new();
        sheet.add(StyleDef::new("A").based_on("B"));
        sheet.add(StyleDef::new("B").based_on("A"));
        assert!(sheet.resolved_font("A").is_some());
    }

    #[test]
    fn test_profile_summary() {
        let profile = StyleProfile {
            heading: RoleStyle::named("Heading 1"),
            body: RoleStyle::named("Normal"),
            safe_zone_end: 4,
            first_content_index: Some(4),
            ..Default::default()
        };
        assert!(profile.has_safe_zone());
        assert!(profile.summary().contains("safe_zone=0..4"));
    }
}
