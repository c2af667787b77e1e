//! Identifier and literal rendering.

/// JavaScript words that cannot be used as binding names.
const RESERVED: &[&str] = &[
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "switch",
    "throw",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Escape a binding name that collides with a JavaScript keyword.
pub fn identifier(name: &str) -> String {
    if is_reserved(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Normalize a PHP name: `\Foo\Bar` → `Foo_Bar`, keywords escaped.
pub fn php_name(name: &str) -> String {
    let trimmed = name.trim().trim_start_matches('\\');
    let trimmed = trimmed.strip_prefix("namespace\\").unwrap_or(trimmed);
    let joined = trimmed.replace('\\', "_");
    identifier(&joined)
}

fn push_control(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\u{0b}' => out.push_str("\\v"),
        '\u{0c}' => out.push_str("\\f"),
        '\0' => out.push_str("\\x00"),
        c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
        c => out.push(c),
    }
}

/// `"..."` literal.
pub fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c => push_control(&mut out, c),
        }
    }
    out.push('"');
    out
}

/// `'...'` literal.
pub fn single_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            c => push_control(&mut out, c),
        }
    }
    out.push('\'');
    out
}

/// Escape text for the inside of a template literal.
pub fn template_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Template literal for a double-quoted value that still names `$vars`.
///
/// Returns `None` when the value has no `$identifier`.
pub fn interpolate_sigils(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let has_sigil = bytes.windows(2).any(|w| {
        w[0] == b'$' && (w[1].is_ascii_alphabetic() || w[1] == b'_')
    });
    if !has_sigil {
        return None;
    }

    let mut out = String::from("`");
    let mut chars = value.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        let starts_name = c == '$'
            && chars
                .peek()
                .is_some_and(|(_, n)| n.is_ascii_alphabetic() || *n == '_');
        if starts_name {
            let mut name = String::new();
            while let Some(&(_, n)) = chars.peek() {
                if n.is_ascii_alphanumeric() || n == '_' {
                    name.push(n);
                    chars.next();
                } else {
                    break;
                }
            }
            out.push_str("${");
            out.push_str(&identifier(&name));
            out.push('}');
        } else {
            out.push_str(&template_text(&c.to_string()));
        }
    }
    out.push('`');
    Some(out)
}

/// Number literal; legacy octal `017` becomes `0o17`.
pub fn number(text: &str) -> String {
    let digits = text.replace('_', "");
    let legacy_octal = digits.len() > 1
        && digits.starts_with('0')
        && digits.chars().all(|c| ('0'..='7').contains(&c));
    if legacy_octal {
        format!("0o{}", &digits[1..])
    } else {
        text.to_string()
    }
}
