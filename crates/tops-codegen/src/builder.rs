//! Structured WAT text builder.
//!
//! An append-only line list with an indentation tracker, so emitted
//! output stays stable for golden tests instead of depending on ad-hoc
//! string interpolation at every call site.

/// Builds WAT text one line at a time. Indentation is two spaces per
/// level.
#[derive(Debug, Default)]
pub struct WatBuilder {
    lines: Vec<String>,
    indent: usize,
}

impl WatBuilder {
    /// Create a builder starting at indent level 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder starting at the given indent level.
    pub fn with_indent(indent: usize) -> Self {
        Self {
            lines: Vec::new(),
            indent,
        }
    }

    /// Append one line at the current indent.
    pub fn line(&mut self, text: impl Into<String>) {
        let text = text.into();
        let mut out = String::with_capacity(self.indent * 2 + text.len());
        for _ in 0..self.indent {
            out.push_str("  ");
        }
        out.push_str(&text);
        self.lines.push(out);
    }

    /// Append a `;;` comment line at the current indent.
    pub fn comment(&mut self, text: impl Into<String>) {
        self.line(format!(";; {}", text.into()));
    }

    /// Append an opening line and step the indent in.
    pub fn open(&mut self, text: impl Into<String>) {
        self.line(text);
        self.indent += 1;
    }

    /// Step the indent out and append the closing `)`.
    pub fn close(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line(")");
    }

    /// Current number of emitted lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing has been emitted yet.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Consume the builder, returning its lines.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
