//! Document model types.
//!
//! Format-agnostic types shared by analysis, mapping and rendering: the
//! paragraph tree a template is edited through, the content blocks handed
//! over by extraction, the sections produced by mapping, and the recovered
//! style profile.

mod content;
mod document;
mod paragraph;
mod section;
mod style;

pub use content::{blocks_to_text_summary, BlockType, ContentBlock, ExtractedContent};
pub use document::Document;
pub use paragraph::{Alignment, Paragraph, ParagraphStyle, TextRun, TextStyle};
pub use section::{BodyItem, BodyItemKind, Section};
pub use style::{RoleStyle, StyleDef, StyleProfile, StyleSheet};
