//! Line-oriented block state machine.
//!
//! Each input line is classified (blank, heading, ordered item, unordered
//! item, text) and fed through a small state machine whose open block is
//! one of none / paragraph / ordered list / unordered list. Completed blocks
//! are handed to a [`MarkupVisitor`] in input order.

use clinicbot_types::markup::{Block, Inline};

use super::inline::parse_inlines;

/// Receives completed blocks in input order.
pub trait MarkupVisitor {
    fn heading(&mut self, level: u8, text: &str);
    fn paragraph(&mut self, inlines: Vec<Inline>);
    fn ordered_list(&mut self, items: Vec<Vec<Inline>>);
    fn unordered_list(&mut self, items: Vec<Vec<Inline>>);
}

/// Visitor that collects blocks into a `Vec<Block>`.
#[derive(Debug, Default)]
pub struct BlockCollector {
    pub blocks: Vec<Block>,
}

impl MarkupVisitor for BlockCollector {
    fn heading(&mut self, level: u8, text: &str) {
        self.blocks.push(Block::Heading {
            level,
            text: text.to_string(),
        });
    }

    fn paragraph(&mut self, inlines: Vec<Inline>) {
        self.blocks.push(Block::Paragraph { inlines });
    }

    fn ordered_list(&mut self, items: Vec<Vec<Inline>>) {
        self.blocks.push(Block::OrderedList { items });
    }

    fn unordered_list(&mut self, items: Vec<Vec<Inline>>) {
        self.blocks.push(Block::UnorderedList { items });
    }
}

/// Render Markdown-like text into blocks.
pub fn render(input: &str) -> Vec<Block> {
    let mut collector = BlockCollector::default();
    render_with(input, &mut collector);
    collector.blocks
}

/// Render Markdown-like text, streaming blocks into `visitor`.
pub fn render_with<V: MarkupVisitor>(input: &str, visitor: &mut V) {
    let mut machine = BlockMachine::new(visitor);
    for line in input.lines() {
        machine.feed(classify(line));
    }
    machine.finish();
}

#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    Heading(u8, &'a str),
    Ordered(&'a str),
    Unordered(&'a str),
    Text(&'a str),
}

fn classify(raw: &str) -> LineKind<'_> {
    let line = raw.trim_end();
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return LineKind::Heading(2, rest.trim());
    }
    if let Some(rest) = line.strip_prefix("# ") {
        return LineKind::Heading(1, rest.trim());
    }
    if let Some(rest) = ordered_item(line) {
        return LineKind::Ordered(rest);
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return LineKind::Unordered(rest.trim_start());
    }
    LineKind::Text(line)
}

/// Match `<digits>. <text>` and return the text.
fn ordered_item(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}

enum OpenBlock {
    None,
    Paragraph(Vec<Inline>),
    Ordered(Vec<Vec<Inline>>),
    Unordered(Vec<Vec<Inline>>),
}

struct BlockMachine<'v, V: MarkupVisitor> {
    visitor: &'v mut V,
    open: OpenBlock,
}

impl<'v, V: MarkupVisitor> BlockMachine<'v, V> {
    fn new(visitor: &'v mut V) -> Self {
        Self {
            visitor,
            open: OpenBlock::None,
        }
    }

    fn feed(&mut self, line: LineKind<'_>) {
        match line {
            LineKind::Blank => {
                if matches!(self.open, OpenBlock::Paragraph(_)) {
                    self.flush();
                }
            }
            LineKind::Heading(level, text) => {
                self.flush();
                self.visitor.heading(level, text);
            }
            LineKind::Ordered(text) => {
                if !matches!(self.open, OpenBlock::Ordered(_)) {
                    self.flush();
                    self.open = OpenBlock::Ordered(Vec::new());
                }
                if let OpenBlock::Ordered(items) = &mut self.open {
                    items.push(parse_inlines(text));
                }
            }
            LineKind::Unordered(text) => {
                if !matches!(self.open, OpenBlock::Unordered(_)) {
                    self.flush();
                    self.open = OpenBlock::Unordered(Vec::new());
                }
                if let OpenBlock::Unordered(items) = &mut self.open {
                    items.push(parse_inlines(text));
                }
            }
            LineKind::Text(text) => {
                if !matches!(self.open, OpenBlock::Paragraph(_)) {
                    self.flush();
                    self.open = OpenBlock::Paragraph(Vec::new());
                }
                if let OpenBlock::Paragraph(inlines) = &mut self.open {
                    if !inlines.is_empty() {
                        inlines.push(Inline::LineBreak);
                    }
                    inlines.extend(parse_inlines(text));
                }
            }
        }
    }

    fn flush(&mut self) {
        match std::mem::replace(&mut self.open, OpenBlock::None) {
            OpenBlock::None => {}
            OpenBlock::Paragraph(inlines) => self.visitor.paragraph(inlines),
            OpenBlock::Ordered(items) => self.visitor.ordered_list(items),
            OpenBlock::Unordered(items) => self.visitor.unordered_list(items),
        }
    }

    fn finish(mut self) {
        self.flush();
    }
}
