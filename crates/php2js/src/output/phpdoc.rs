//! PHPDoc to JSDoc conversion.

/// Rewrite a `/** ... */` block as JSDoc lines.
///
/// Variable sigils are dropped, `@param type $x` becomes `@param {type} x`
/// and `@return type` becomes `@returns {type}`. Continuation lines are
/// re-aligned to ` * `.
pub fn to_jsdoc(doc: &str) -> Vec<String> {
    doc.lines()
        .enumerate()
        .map(|(i, line)| {
            let trimmed = line.trim();
            let line = if i == 0 {
                trimmed.to_string()
            } else if trimmed.starts_with('*') {
                format!(" {trimmed}")
            } else {
                format!(" * {trimmed}")
            };
            strip_sigils(&convert_tags(&line))
        })
        .collect()
}

fn strip_sigils(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        let sigil = c == '$'
            && chars
                .peek()
                .is_some_and(|n| n.is_alphanumeric() || *n == '_');
        if !sigil {
            out.push(c);
        }
    }
    out
}

fn is_type_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '|' | '\\' | '[' | ']')
}

fn convert_tags(line: &str) -> String {
    for (tag, js_tag) in [("@param", "@param"), ("@return", "@returns")] {
        let Some(at) = line.find(tag) else {
            continue;
        };
        let after = &line[at + tag.len()..];
        // `@returns` already in JSDoc form
        if !after.starts_with(char::is_whitespace) {
            continue;
        }
        let rest = after.trim_start();
        let type_len = rest
            .char_indices()
            .find(|(_, c)| !is_type_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if type_len == 0 {
            continue;
        }
        let (ty, tail) = rest.split_at(type_len);
        if !tail.is_empty() && !tail.starts_with(char::is_whitespace) {
            continue;
        }
        let converted = format!("{}{js_tag} {{{ty}}}", &line[..at]);
        let tail = tail.trim();
        return if tail.is_empty() {
            converted
        } else {
            format!("{converted} {tail}")
        };
    }
    line.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_doc() {
        let doc = "/**\n * Calculate the sum\n *\n * @param int $a First number\n * @param string|array $data Input\n * @return int The sum\n */";
        assert_eq!(
            to_jsdoc(doc),
            vec![
                "/**",
                " * Calculate the sum",
                " *",
                " * @param {int} a First number",
                " * @param {string|array} data Input",
                " * @returns {int} The sum",
                " */",
            ]
        );
    }

    #[test]
    fn test_untyped_tags_are_kept() {
        assert_eq!(convert_tags(" * @param $x"), " * @param $x");
        assert_eq!(convert_tags(" * @returns {int} n"), " * @returns {int} n");
    }

    #[test]
    fn test_tags_at_end_of_line() {
        let doc = "/**\n * @param int\n * @param $untyped\n * @return int\n */";
        assert_eq!(
            to_jsdoc(doc),
            vec![
                "/**",
                " * @param {int}",
                " * @param untyped",
                " * @returns {int}",
                " */",
            ]
        );
    }
}
