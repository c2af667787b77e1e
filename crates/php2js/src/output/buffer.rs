//! Append-only line buffer.

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Code,
    /// The real `return` of a top-level return; kept only when the module
    /// body is wrapped in a function.
    TopLevelReturn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub depth: usize,
    pub text: String,
    pub kind: LineKind,
}

#[derive(Debug, Default)]
pub struct Buffer {
    lines: Vec<Line>,
    depth: usize,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn line(&mut self, text: impl Into<String>) {
        self.push(text.into(), LineKind::Code);
    }

    pub fn top_level_return(&mut self, text: impl Into<String>) {
        self.push(text.into(), LineKind::TopLevelReturn);
    }

    pub fn blank(&mut self) {
        self.push(String::new(), LineKind::Code);
    }

    fn push(&mut self, text: String, kind: LineKind) {
        self.lines.push(Line {
            depth: self.depth,
            text,
            kind,
        });
    }

    /// Append to the previous line. Returns `false` if there is no
    /// non-empty line to attach to.
    pub fn append(&mut self, suffix: &str) -> bool {
        match self.lines.last_mut() {
            Some(last) if !last.text.is_empty() => {
                last.text.push_str(suffix);
                true
            }
            _ => false,
        }
    }

    /// Render to text. `extra` indents every line further; top-level
    /// return lines are dropped unless `keep_returns` is set.
    ///
    /// Text spanning several lines (closure bodies) already carries its own
    /// indentation, so continuation lines only receive `extra`.
    pub fn render(&self, extra: usize, keep_returns: bool) -> String {
        let mut out = String::new();
        for line in &self.lines {
            if line.kind == LineKind::TopLevelReturn && !keep_returns {
                continue;
            }
            for (i, part) in line.text.split('\n').enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                if part.is_empty() {
                    continue;
                }
                let depth = if i == 0 { line.depth + extra } else { extra };
                out.push_str(&INDENT.repeat(depth));
                out.push_str(part);
            }
            out.push('\n');
        }
        out
    }

    /// Indentation string for `depth` levels.
    pub fn indentation(depth: usize) -> String {
        INDENT.repeat(depth)
    }
}
