//! Table-of-contents detection and rewrite.

use crate::model::Paragraph;
use regex::Regex;
use std::sync::OnceLock;

fn numbered_entry() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+[.)]\s+\w+").expect("valid regex"))
}

fn trailing_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\s*$").expect("valid regex"))
}

fn leader() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.{2,}|\u{2024}{2,}|\u{2026}").expect("valid regex"))
}

fn ordinal_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+[.)]\s*").expect("valid regex"))
}

/// Table-of-contents layout found in the front matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocLayout {
    /// Index of the "Contents" heading paragraph
    pub heading: Option<usize>,

    /// Entry paragraph indexes in document order
    pub entries: Vec<usize>,
}

impl TocLayout {
    /// Whether any entry was found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Locate table-of-contents entries among `paragraphs`.
///
/// Paragraphs in a `toc` style are entries wherever they appear. After a
/// paragraph mentioning "contents", any non-empty paragraph with a tab, a
/// dotted leader, a leading `N.` / `N)` number or a trailing page number is
/// an entry too.
pub fn find_toc(paragraphs: &[Paragraph]) -> TocLayout {
    let mut layout = TocLayout::default();

    for (index, paragraph) in paragraphs.iter().enumerate() {
        let raw = paragraph.plain_text();
        let text = raw.trim();
        if text.to_lowercase().contains("contents") {
            layout.heading = Some(index);
            continue;
        }
        if text.is_empty() {
            continue;
        }
        if paragraph.style_name().to_lowercase().contains("toc") {
            layout.entries.push(index);
            continue;
        }
        if layout.heading.is_some() && looks_like_entry(&raw) {
            layout.entries.push(index);
        }
    }
    layout
}

fn looks_like_entry(raw: &str) -> bool {
    let text = raw.trim();
    raw.contains('\t')
        || raw.contains("...")
        || raw.contains("\u{2024}\u{2024}\u{2024}")
        || numbered_entry().is_match(text)
        || trailing_number().is_match(text)
}

/// Rewrite one entry to `"{ordinal}. {title}{trailing}"`.
///
/// `trailing` is the original text from the first dotted leader or tab on,
/// so leaders and page numbers survive. Any number prefix already on
/// `title` is dropped.
pub fn rewrite_entry(original: &str, ordinal: usize, title: &str) -> String {
    let dots = leader().find(original).map(|m| m.start());
    let tab = original.find('\t').filter(|&at| at > 0);
    let trailing = match (dots, tab) {
        (Some(a), Some(b)) => &original[a.min(b)..],
        (Some(at), None) | (None, Some(at)) => &original[at..],
        (None, None) => "",
    };
    let title = ordinal_prefix().replace(title.trim(), "");
    format!("{}. {}{}", ordinal, title, trailing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(style: &str, text: &str) -> Paragraph {
        Paragraph::styled(style, text)
    }

    #[test]
    fn test_find_after_heading() {
        let paragraphs = vec![
            para("Title", "Annual Report"),
            para("Normal", "Table of Contents"),
            para("Normal", "1. Introduction\t3"),
            para("Normal", "Results ........ 7"),
            para("Normal", "Appendix 12"),
            para("Normal", ""),
            para("Normal", "Prepared for review"),
        ];

        let layout = find_toc(&paragraphs);
        assert_eq!(layout.heading, Some(1));
        assert_eq!(layout.entries, vec![2, 3, 4]);
    }

    #[test]
    fn test_toc_styles_need_no_heading() {
        let paragraphs = vec![
            para("toc 1", "Overview\t1"),
            para("TOC 2", "Details\t2"),
            para("toc 1", ""),
            para("Normal", "Closing 3"),
        ];

        let layout = find_toc(&paragraphs);
        assert_eq!(layout.heading, None);
        assert_eq!(layout.entries, vec![0, 1]);
    }

    #[test]
    fn test_rewrite_keeps_leader_and_page() {
        assert_eq!(
            rewrite_entry("1. Old Intro ........ 3", 1, "Summary"),
            "1. Summary........ 3"
        );
        assert_eq!(rewrite_entry("Old\t12", 2, "Skills"), "2. Skills\t12");
        assert_eq!(rewrite_entry("Old Title", 3, "3) Projects"), "3. Projects");
    }

    #[test]
    fn test_rewrite_splits_at_first_marker() {
        assert_eq!(
            rewrite_entry("Old\tpart .... 9", 1, "New"),
            "1. New\tpart .... 9"
        );
        // a leading tab is not a split point
        assert_eq!(rewrite_entry("\tOld", 1, "New"), "1. New");
    }
}
