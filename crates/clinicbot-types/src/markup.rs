//! Structured, display-safe markup produced by the markup renderer.
//!
//! The tree is deliberately small: headings, paragraphs and flat lists
//! whose leaves are inert text spans. Front-ends map each node to their
//! own styling; nothing here is ever evaluated.

use serde::{Deserialize, Serialize};

/// An inline span within a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
    /// Explicit line break between accumulated paragraph lines.
    LineBreak,
}

impl Inline {
    /// The literal text carried by this span (empty for line breaks).
    pub fn text(&self) -> &str {
        match self {
            Inline::Text(t) | Inline::Bold(t) | Inline::Italic(t) | Inline::Code(t) => t,
            Inline::LineBreak => "",
        }
    }
}

/// A top-level block, emitted in input line order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { inlines: Vec<Inline> },
    OrderedList { items: Vec<Vec<Inline>> },
    UnorderedList { items: Vec<Vec<Inline>> },
}

/// Concatenate the literal text of a span sequence, rendering line
/// breaks as `\n`.
pub fn plain_text(inlines: &[Inline]) -> String {
    inlines
        .iter()
        .map(|i| match i {
            Inline::LineBreak => "\n",
            other => other.text(),
        })
        .collect()
}
