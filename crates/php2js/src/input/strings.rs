//! PHP string literal decoding.

/// Decode the body of a single-quoted literal: only `\\` and `\'` are escapes.
pub fn decode_single(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('\\') | Some('\'') => {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

/// Decode the body of a double-quoted literal or heredoc.
///
/// Unrecognized escapes keep their backslash, as PHP does.
pub fn decode_double(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(&next) = chars.peek() else {
            out.push('\\');
            break;
        };
        match next {
            'n' => push_escape(&mut chars, &mut out, '\n'),
            't' => push_escape(&mut chars, &mut out, '\t'),
            'r' => push_escape(&mut chars, &mut out, '\r'),
            'v' => push_escape(&mut chars, &mut out, '\u{0b}'),
            'e' => push_escape(&mut chars, &mut out, '\u{1b}'),
            'f' => push_escape(&mut chars, &mut out, '\u{0c}'),
            '\\' => push_escape(&mut chars, &mut out, '\\'),
            '$' => push_escape(&mut chars, &mut out, '$'),
            '"' => push_escape(&mut chars, &mut out, '"'),
            '0'..='7' => {
                let mut digits = String::new();
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(&d) if d.is_digit(8) => {
                            digits.push(d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' => {
                chars.next();
                let mut digits = String::new();
                while digits.len() < 2 {
                    match chars.peek() {
                        Some(&d) if d.is_ascii_hexdigit() => {
                            digits.push(d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(ch) if !digits.is_empty() => out.push(ch),
                    _ => {
                        out.push_str("\\x");
                        out.push_str(&digits);
                    }
                }
            }
            'u' => {
                chars.next();
                if chars.peek() != Some(&'{') {
                    out.push_str("\\u");
                    continue;
                }
                chars.next();
                let mut digits = String::new();
                let mut closed = false;
                for d in chars.by_ref() {
                    if d == '}' {
                        closed = true;
                        break;
                    }
                    digits.push(d);
                }
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(ch) if closed => out.push(ch),
                    _ => {
                        out.push_str("\\u{");
                        out.push_str(&digits);
                        if closed {
                            out.push('}');
                        }
                    }
                }
            }
            _ => out.push('\\'),
        }
    }
    out
}

fn push_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, out: &mut String, ch: char) {
    chars.next();
    out.push(ch);
}

/// Strip a heredoc's closing-marker indentation from the start of every line.
///
/// `at_line_start` carries state across fragments split by interpolations.
pub fn dedent(text: &str, indent: usize, at_line_start: &mut bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut skip = if *at_line_start { indent } else { 0 };
    for c in text.chars() {
        if skip > 0 && (c == ' ' || c == '\t') {
            skip -= 1;
            continue;
        }
        skip = 0;
        out.push(c);
        if c == '\n' {
            skip = indent;
        }
    }
    if !text.is_empty() {
        *at_line_start = text.ends_with('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_quoted() {
        assert_eq!(decode_single(r"It\'s"), "It's");
        assert_eq!(decode_single(r"C:\\Users\\file"), r"C:\Users\file");
        assert_eq!(decode_single(r"a\nb"), r"a\nb");
    }

    #[test]
    fn test_double_quoted() {
        assert_eq!(decode_double(r"Line 1\nLine 2\tTabbed"), "Line 1\nLine 2\tTabbed");
        assert_eq!(decode_double(r#"say \"hi\""#), "say \"hi\"");
        assert_eq!(decode_double(r"\$var"), "$var");
        assert_eq!(decode_double(r"\x41\101"), "AA");
        assert_eq!(decode_double(r"\u{1F600}"), "\u{1F600}");
        assert_eq!(decode_double(r"\q"), r"\q");
        assert_eq!(decode_double("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_dedent_across_fragments() {
        let mut at_start = true;
        assert_eq!(dedent("    a\n    b ", 4, &mut at_start), "a\nb ");
        assert!(!at_start);
        assert_eq!(dedent(" tail\n      c", 4, &mut at_start), " tail\n  c");
    }
}
