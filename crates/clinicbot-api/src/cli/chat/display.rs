//! Terminal display of chat messages.
//!
//! Model replies go through the markup renderer and are painted with
//! `console` styles. Crisis replies bypass the renderer entirely and are
//! shown in a boxed red panel.

use console::{measure_text_width, style};

use clinicbot_core::i18n::Catalog;
use clinicbot_core::markup::{MarkupVisitor, render_with};
use clinicbot_types::markup::Inline;
use clinicbot_types::message::{Message, MessageRole, SourceChunk};

/// Bullet glyph for unordered list items.
pub const BULLET: &str = "•";

const INDENT: &str = "  ";
const EXCERPT_CHARS: usize = 120;

/// [`MarkupVisitor`] that writes styled terminal text.
#[derive(Debug, Default)]
pub struct TerminalVisitor {
    out: String,
}

impl TerminalVisitor {
    pub fn finish(self) -> String {
        self.out
    }

    fn push_block(&mut self, block: String) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out.push_str(&block);
        self.out.push('\n');
    }
}

fn paint_inlines(inlines: &[Inline], continuation: &str) -> String {
    let mut line = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(t) => line.push_str(t),
            Inline::Bold(t) => line.push_str(&style(t).bold().to_string()),
            Inline::Italic(t) => line.push_str(&style(t).italic().to_string()),
            Inline::Code(t) => line.push_str(&style(t).yellow().to_string()),
            Inline::LineBreak => {
                line.push('\n');
                line.push_str(continuation);
            }
        }
    }
    line
}

impl MarkupVisitor for TerminalVisitor {
    fn heading(&mut self, level: u8, text: &str) {
        let styled = if level == 1 {
            style(text).cyan().bold().underlined().to_string()
        } else {
            style(text).cyan().bold().to_string()
        };
        self.push_block(format!("{INDENT}{styled}"));
    }

    fn paragraph(&mut self, inlines: Vec<Inline>) {
        self.push_block(format!("{INDENT}{}", paint_inlines(&inlines, INDENT)));
    }

    fn ordered_list(&mut self, items: Vec<Vec<Inline>>) {
        let lines: Vec<String> = items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{INDENT}{}. {}", i + 1, paint_inlines(item, INDENT)))
            .collect();
        self.push_block(lines.join("\n"));
    }

    fn unordered_list(&mut self, items: Vec<Vec<Inline>>) {
        let lines: Vec<String> = items
            .iter()
            .map(|item| {
                format!(
                    "{INDENT}{} {}",
                    style(BULLET).cyan(),
                    paint_inlines(item, INDENT)
                )
            })
            .collect();
        self.push_block(lines.join("\n"));
    }
}

/// Render model text to styled terminal output.
pub fn render_markup(text: &str) -> String {
    let mut visitor = TerminalVisitor::default();
    render_with(text, &mut visitor);
    visitor.finish()
}

/// Boxed panel for crisis-support replies.
pub fn crisis_panel(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let width = lines.iter().map(|l| measure_text_width(l)).max().unwrap_or(0);
    let border = "─".repeat(width + 2);

    let mut out = format!("{INDENT}{}\n", style(format!("┌{border}┐")).red().bold());
    for line in lines {
        let pad = " ".repeat(width - measure_text_width(line));
        out.push_str(&format!(
            "{INDENT}{} {}{} {}\n",
            style("│").red().bold(),
            style(line).red(),
            pad,
            style("│").red().bold()
        ));
    }
    out.push_str(&format!("{INDENT}{}\n", style(format!("└{border}┘")).red().bold()));
    out
}

/// One-line preview of a retrieved source chunk.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

fn render_sources(chunks: &[SourceChunk]) -> Option<String> {
    let lines: Vec<String> = chunks
        .iter()
        .filter_map(|c| c.retrieved_text.as_deref())
        .filter(|t| !t.trim().is_empty())
        .enumerate()
        .map(|(i, t)| {
            style(format!("{INDENT}[{}] {}", i + 1, excerpt(t, EXCERPT_CHARS)))
                .dim()
                .to_string()
        })
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Format one chat message for the terminal.
pub fn format_message(message: &Message, catalog: &Catalog) -> String {
    match message.role {
        MessageRole::User => format!(
            "{INDENT}{} {}\n",
            style(format!("{} >", catalog.patient_label())).green().bold(),
            message.text
        ),
        MessageRole::Model if message.is_crisis => crisis_panel(&message.text),
        MessageRole::Model => {
            let mut out = render_markup(&message.text);
            if let Some(sources) = render_sources(&message.source_chunks) {
                out.push('\n');
                out.push_str(&sources);
                out.push('\n');
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinicbot_types::config::Locale;
    use console::strip_ansi_codes;

    fn plain(s: &str) -> String {
        strip_ansi_codes(s).into_owned()
    }

    #[test]
    fn renders_blocks_in_order() {
        let out = plain(&render_markup("# Title\n- one\n- two\n\nplain"));
        assert_eq!(out, "  Title\n\n  • one\n  • two\n\n  plain\n");
    }

    #[test]
    fn paragraph_line_breaks_keep_indent() {
        let out = plain(&render_markup("line one\nline **two**"));
        assert_eq!(out, "  line one\n  line two\n");
    }

    #[test]
    fn ordered_items_are_renumbered() {
        let out = plain(&render_markup("3. first\n7. second"));
        assert_eq!(out, "  1. first\n  2. second\n");
    }

    #[test]
    fn crisis_panel_is_boxed() {
        let out = plain(&crisis_panel("安心專線 1925\nLifeline 1995"));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].trim_start().starts_with('┌'));
        assert!(lines[1].contains("1925"));
        assert!(lines[3].trim_start().starts_with('└'));
        let widths: Vec<usize> = lines.iter().map(|l| measure_text_width(l)).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn excerpt_flattens_and_truncates() {
        assert_eq!(excerpt("a\n  b\tc", 10), "a b c");
        assert_eq!(excerpt("abcdef", 3), "abc…");
    }

    #[test]
    fn crisis_message_bypasses_markup() {
        let catalog = Catalog::new(Locale::En);
        let msg = Message::crisis("**not bold** 1925");
        let out = plain(&format_message(&msg, &catalog));
        assert!(out.contains("**not bold**"));
    }

    #[test]
    fn model_message_lists_sources() {
        let catalog = Catalog::new(Locale::En);
        let msg = Message::model(
            "Open weekdays.",
            vec![
                SourceChunk { retrieved_text: Some("Mon-Fri 9-5".into()) },
                SourceChunk { retrieved_text: None },
            ],
        );
        let out = plain(&format_message(&msg, &catalog));
        assert!(out.contains("Open weekdays."));
        assert!(out.contains("[1] Mon-Fri 9-5"));
        assert!(!out.contains("[2]"));
    }
}
