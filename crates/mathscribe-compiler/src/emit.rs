//! Output sink for emitted source text.
//!
//! The [`SourceWriter`] appends text, indents lines and tracks the
//! [`Location`] of its cursor so diagnostics can point into the output.
//!
//! # Example
//!
//! ```
//! use mathscribe_compiler::emit::SourceWriter;
//!
//! let mut out = SourceWriter::new(4);
//! out.line("void evaluate() {");
//! out.indent();
//! out.line("x = 1;");
//! out.dedent();
//! out.line("}");
//!
//! assert_eq!(out.as_str(), "void evaluate() {\n    x = 1;\n}\n");
//! assert_eq!(out.location().line, 4);
//! ```

use mathscribe_core::Location;

/// Indenting text sink with a tracked cursor.
#[derive(Debug, Clone)]
pub struct SourceWriter {
    text: String,
    location: Location,
    depth: usize,
    indent_width: usize,
    at_line_start: bool,
}

impl SourceWriter {
    /// Create an empty writer indenting by `indent_width` spaces per level.
    pub fn new(indent_width: usize) -> Self {
        Self {
            text: String::new(),
            location: Location::start(),
            depth: 0,
            indent_width,
            at_line_start: true,
        }
    }

    fn push_raw(&mut self, text: &str) {
        self.text.push_str(text);
        self.location.advance(text);
    }

    /// Append text to the current line, indenting first if the line is empty.
    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start {
            let pad = " ".repeat(self.depth * self.indent_width);
            self.push_raw(&pad);
            self.at_line_start = false;
        }
        self.push_raw(text);
    }

    /// End the current line.
    pub fn newline(&mut self) {
        self.push_raw("\n");
        self.at_line_start = true;
    }

    /// Write a whole line.
    pub fn line(&mut self, text: &str) {
        self.write(text);
        self.newline();
    }

    /// End the current line unless the cursor is already at a line start.
    pub fn finish_line(&mut self) {
        if !self.at_line_start {
            self.newline();
        }
    }

    /// Write an empty line unless the output is empty or already ends with one.
    pub fn blank_line(&mut self) {
        self.finish_line();
        if !self.text.is_empty() && !self.text.ends_with("\n\n") {
            self.newline();
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current indentation level.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Cursor position.
    #[inline]
    pub fn location(&self) -> Location {
        self.location
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl Default for SourceWriter {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indentation_applies_once_per_line() {
        let mut out = SourceWriter::new(2);
        out.indent();
        out.write("a");
        out.write(" = ");
        out.write("b;");
        out.newline();
        assert_eq!(out.as_str(), "  a = b;\n");
    }

    #[test]
    fn location_tracks_cursor() {
        let mut out = SourceWriter::new(4);
        out.line("abc");
        out.indent();
        out.write("x");
        let loc = out.location();
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 6);
        assert_eq!(loc.byte_offset, 9);
    }

    #[test]
    fn blank_lines_do_not_stack() {
        let mut out = SourceWriter::new(4);
        out.blank_line();
        assert!(out.is_empty());
        out.line("a");
        out.blank_line();
        out.blank_line();
        out.line("b");
        assert_eq!(out.as_str(), "a\n\nb\n");
    }
}
