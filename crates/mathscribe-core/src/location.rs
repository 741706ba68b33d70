//! Output location tracking for diagnostics.
//!
//! Provides [`Location`], the position of the output cursor when a
//! diagnostic was raised.

use std::fmt;

/// A position in emitted text.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Byte offset from the start of the output (0-indexed).
    pub byte_offset: usize,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub column: u32,
}

impl Location {
    /// Create a location.
    #[inline]
    pub fn new(byte_offset: usize, line: u32, column: u32) -> Self {
        Self {
            byte_offset,
            line,
            column,
        }
    }

    /// The start of the output.
    #[inline]
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Advance past `text`, tracking newlines.
    pub fn advance(&mut self, text: &str) {
        self.byte_offset += text.len();
        match text.rfind('\n') {
            Some(last_newline) => {
                self.line += text.matches('\n').count() as u32;
                self.column = (text.len() - last_newline) as u32;
            }
            None => self.column += text.len() as u32,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.line, self.column, self.byte_offset)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_start() {
        assert_eq!(Location::default(), Location::new(0, 1, 1));
    }

    #[test]
    fn advance_same_line() {
        let mut loc = Location::start();
        loc.advance("double x;");
        assert_eq!(loc, Location::new(9, 1, 10));
    }

    #[test]
    fn advance_across_lines() {
        let mut loc = Location::start();
        loc.advance("ab\ncd\nefg");
        assert_eq!(loc.line, 3);
        assert_eq!(loc.column, 4);
        assert_eq!(loc.byte_offset, 9);
    }

    #[test]
    fn advance_ending_in_newline() {
        let mut loc = Location::start();
        loc.advance("x;\n");
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 1);
    }

    #[test]
    fn display() {
        assert_eq!(Location::new(40, 3, 15).to_string(), "3:15");
    }
}
