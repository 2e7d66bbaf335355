//! Inline span scanner: `**bold**`, `__bold__`, `*italic*`, `_italic_`, `` `code` ``.
//!
//! Spans are matched left to right and never overlap or nest. An opening
//! delimiter without a closing one stays literal text.

use clinicbot_types::markup::Inline;

#[derive(Clone, Copy)]
enum SpanKind {
    Bold,
    Italic,
    Code,
}

/// Delimiters in priority order: double before single at the same position.
const DELIMITERS: &[(&str, SpanKind)] = &[
    ("**", SpanKind::Bold),
    ("__", SpanKind::Bold),
    ("`", SpanKind::Code),
    ("*", SpanKind::Italic),
    ("_", SpanKind::Italic),
];

/// Split one line of text into inline spans.
pub fn parse_inlines(line: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut plain = String::new();
    let mut rest = line;

    while !rest.is_empty() {
        match match_span(rest) {
            Some((span, consumed)) => {
                if !plain.is_empty() {
                    out.push(Inline::Text(std::mem::take(&mut plain)));
                }
                out.push(span);
                rest = &rest[consumed..];
            }
            None => {
                let step = rest.chars().next().map_or(rest.len(), char::len_utf8);
                plain.push_str(&rest[..step]);
                rest = &rest[step..];
            }
        }
    }

    if !plain.is_empty() {
        out.push(Inline::Text(plain));
    }
    out
}

/// Try to match a delimited span at the start of `rest`.
///
/// Returns the span and the number of bytes it consumed. The body must be
/// at least one character long, and the closing delimiter is the nearest
/// one after that first character.
fn match_span(rest: &str) -> Option<(Inline, usize)> {
    for (delim, kind) in DELIMITERS {
        let Some(after) = rest.strip_prefix(delim) else {
            continue;
        };
        let Some(first) = after.chars().next() else {
            continue;
        };
        let first_len = first.len_utf8();
        if let Some(pos) = after[first_len..].find(delim) {
            let body_len = first_len + pos;
            let body = after[..body_len].to_string();
            let span = match kind {
                SpanKind::Bold => Inline::Bold(body),
                SpanKind::Italic => Inline::Italic(body),
                SpanKind::Code => Inline::Code(body),
            };
            return Some((span, delim.len() + body_len + delim.len()));
        }
    }
    None
}
