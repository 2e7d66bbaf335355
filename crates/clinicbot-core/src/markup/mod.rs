//! Constrained Markdown-to-markup rendering.
//!
//! Recognizes a small explicit grammar (two heading levels, flat ordered and
//! unordered lists, paragraphs with line breaks, and bold / italic / code
//! spans) and nothing else. Everything unrecognized passes through as inert
//! paragraph text. Rendering is pure and never fails.

pub mod inline;
pub mod renderer;

pub use inline::parse_inlines;
pub use renderer::{BlockCollector, MarkupVisitor, render, render_with};
