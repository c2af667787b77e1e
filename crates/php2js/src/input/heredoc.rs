//! Heredoc and nowdoc lowering.
//!
//! The PHP grammar's external scanner corrupts its heredoc stack when it
//! closes a heredoc (`array_pop` inside the multi-evaluating `array_delete`
//! macro), which crashes the parse. Before parsing, every heredoc and nowdoc
//! is rewritten into an equivalent double-quoted literal. Lines are kept in
//! place so parse error locations still point at the original source.

use super::strings::dedent;
use std::borrow::Cow;

/// Rewrite heredocs and nowdocs in `source` into double-quoted literals.
///
/// Only PHP code regions are scanned. Inline HTML, comments and ordinary
/// strings are copied untouched.
pub fn lower_heredocs(source: &str) -> Cow<'_, str> {
    if !source.contains("<<<") {
        return Cow::Borrowed(source);
    }
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut copied = 0;
    let mut pos = 0;
    let mut in_php = false;

    while pos < bytes.len() {
        if !in_php {
            match source[pos..].find("<?") {
                Some(offset) => {
                    pos += offset + 2;
                    in_php = true;
                }
                None => break,
            }
            continue;
        }
        match bytes[pos] {
            b'?' if bytes.get(pos + 1) == Some(&b'>') => {
                pos += 2;
                in_php = false;
            }
            quote @ (b'\'' | b'"' | b'`') => pos = skip_quoted(bytes, pos, quote),
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = source[pos + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |end| pos + 2 + end + 2);
            }
            b'/' if bytes.get(pos + 1) == Some(&b'/') => pos = skip_line_comment(source, pos),
            b'#' if bytes.get(pos + 1) != Some(&b'[') => pos = skip_line_comment(source, pos),
            b'<' if source[pos..].starts_with("<<<") => match Heredoc::parse(source, pos) {
                Some(doc) => {
                    out.push_str(&source[copied..pos]);
                    doc.write_literal(source, &mut out);
                    pos = doc.end;
                    copied = pos;
                }
                None => pos += 3,
            },
            _ => pos += 1,
        }
    }

    if copied == 0 {
        return Cow::Borrowed(source);
    }
    out.push_str(&source[copied..]);
    Cow::Owned(out)
}

fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b if b == quote => return pos + 1,
            _ => pos += 1,
        }
    }
    bytes.len()
}

/// A line comment ends at the newline or at a closing `?>`.
fn skip_line_comment(source: &str, start: usize) -> usize {
    let rest = &source[start..];
    let newline = rest.find('\n').unwrap_or(rest.len());
    let close = rest.find("?>").unwrap_or(rest.len());
    start + newline.min(close)
}

fn is_label_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

struct Heredoc {
    /// Nowdoc bodies are raw text.
    raw: bool,
    body_start: usize,
    body_end: usize,
    /// Whitespace before the closing label, removed from every body line.
    indent: usize,
    /// Byte just past the closing label.
    end: usize,
}

impl Heredoc {
    /// Parse `<<<LABEL`, `<<<"LABEL"` or `<<<'LABEL'` at `start` through its
    /// closing label.
    fn parse(source: &str, start: usize) -> Option<Self> {
        let bytes = source.as_bytes();
        let mut pos = start + 3;
        while matches!(bytes.get(pos), Some(b' ' | b'\t')) {
            pos += 1;
        }
        let quote = match bytes.get(pos) {
            Some(&q @ (b'\'' | b'"')) => {
                pos += 1;
                Some(q)
            }
            _ => None,
        };
        let label_start = pos;
        if bytes.get(pos).is_none_or(|b| b.is_ascii_digit()) {
            return None;
        }
        while bytes.get(pos).is_some_and(|&b| is_label_byte(b)) {
            pos += 1;
        }
        let label = &source[label_start..pos];
        if label.is_empty() {
            return None;
        }
        if let Some(q) = quote {
            if bytes.get(pos) != Some(&q) {
                return None;
            }
            pos += 1;
        }
        if bytes.get(pos) == Some(&b'\r') {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'\n') {
            return None;
        }
        let body_start = pos + 1;

        let mut line_start = body_start;
        loop {
            let line = &source[line_start..];
            let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
            let after = line_start + indent + label.len();
            if line[indent..].starts_with(label) && !bytes.get(after).is_some_and(|&b| is_label_byte(b)) {
                let body_end = if line_start == body_start {
                    body_start
                } else {
                    let end = line_start - 1;
                    if end > body_start && bytes[end - 1] == b'\r' { end - 1 } else { end }
                };
                return Some(Self {
                    raw: quote == Some(b'\''),
                    body_start,
                    body_end,
                    indent,
                    end: after,
                });
            }
            line_start += line.find('\n')? + 1;
        }
    }

    fn write_literal(&self, source: &str, out: &mut String) {
        let mut at_line_start = true;
        let body = dedent(
            &source[self.body_start..self.body_end],
            self.indent,
            &mut at_line_start,
        );
        out.push('"');
        if self.raw {
            escape_raw(&body, out);
        } else {
            escape_interpolated(&body, out);
        }
        out.push('"');

        let original = source[self.body_start - 1..self.end].matches('\n').count();
        let kept = body.matches('\n').count();
        for _ in kept..original {
            out.push('\n');
        }
    }
}

/// Nowdoc text: nothing is special, so escape everything a double-quoted
/// literal would interpret.
fn escape_raw(body: &str, out: &mut String) {
    for c in body.chars() {
        if matches!(c, '\\' | '"' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Heredoc text: escapes and interpolation stay, bare quotes get escaped.
///
/// A heredoc keeps `\"` verbatim, so it becomes `\\\"`. Quotes inside
/// `{$...}` belong to the embedded expression and are left alone.
fn escape_interpolated(body: &str, out: &mut String) {
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('"') => out.push_str("\\\\\\\""),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '"' => out.push_str("\\\""),
            '{' if chars.peek() == Some(&'$') => {
                out.push('{');
                let mut depth = 1;
                for inner in chars.by_ref() {
                    out.push(inner);
                    match inner {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => out.push(c),
        }
    }
}
