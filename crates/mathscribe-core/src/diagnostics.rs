//! Structured diagnostics.
//!
//! A [`Diagnostic`] records what went wrong ([`ErrorCode`] and message), how
//! bad it is ([`Severity`]), when it happened ([`Phase`]), which node caused it
//! and where the output cursor was at the time. [`Diagnostics`] collects them
//! for one translation run.
//!
//! # Example
//!
//! ```
//! use mathscribe_core::{Diagnostic, Diagnostics, ErrorCode, Location, Phase, Severity};
//!
//! let mut diagnostics = Diagnostics::new();
//! diagnostics.push(Diagnostic::new(
//!     Severity::Error,
//!     Phase::DiscoveringTypes,
//!     ErrorCode::NoMatchingVariant,
//!     "no variant of 'gcd' accepts (real)",
//! ));
//!
//! assert!(diagnostics.has_errors());
//! assert_eq!(
//!     diagnostics.to_string(),
//!     "error[E0006] at 1:1 (discovering types): no variant of 'gcd' accepts (real)"
//! );
//! ```

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{Location, NodeId, TranslationError};

/// How grave a diagnostic is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Translation continues and succeeds.
    Warning,
    /// Translation continues but cannot succeed.
    Error,
    /// The current pass is abandoned.
    Fatal,
    /// A defect in the wiring, not in user input; the pass is abandoned.
    InternalError,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::InternalError => "internal error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The phase a diagnostic was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Registration,
    DiscoveringTypes,
    Emitting,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Registration => "registration",
            Phase::DiscoveringTypes => "discovering types",
            Phase::Emitting => "emitting",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of diagnostic codes. The numeric values are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum ErrorCode {
    DuplicateType = 1,
    MissingTranslator = 2,
    AlreadyDeclaredInScope = 3,
    ConflictingDeclaration = 4,
    IncompatibleInferredType = 5,
    NoMatchingVariant = 6,
    UndefinedVariable = 7,
    EmptyIterable = 8,
    ExpectedVariable = 9,
    MissingParameterOrField = 10,
    MalformedLiteralValue = 11,
    InternalError = 12,
    DuplicateFunction = 13,
    UnknownFunction = 14,
    UnknownTypeSymbol = 15,
    IncompatibleOperands = 16,
    ArgumentCountMismatch = 17,
    NotCallable = 18,
    UntypedIdentifier = 19,
    InvalidRange = 20,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", u16::from(*self))
    }
}

/// One diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub phase: Phase,
    pub code: ErrorCode,
    pub message: String,
    /// The offending node. May no longer exist in the tree.
    pub node: Option<NodeId>,
    /// Output cursor position when the diagnostic was raised.
    pub location: Location,
}

impl Diagnostic {
    /// Create a diagnostic with no node at the start location.
    pub fn new(
        severity: Severity,
        phase: Phase,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            phase,
            code,
            message: message.into(),
            node: None,
            location: Location::start(),
        }
    }

    /// Build a diagnostic from a translation error.
    pub fn from_error(error: &TranslationError, phase: Phase) -> Self {
        Self::new(error.severity(), phase, error.code(), error.to_string())
    }

    /// Attach the offending node.
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// Attach the output location.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Check if this is an Error or worse.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity >= Severity::Error
    }

    /// Render with the emitted line at this location and a caret under the column.
    pub fn display_with_output(&self, output: &str) -> String {
        let mut rendered = format!("{self}\n");
        let line = self.location.line;
        if let Some(text) = line
            .checked_sub(1)
            .and_then(|index| output.lines().nth(index as usize))
        {
            let indent = " ".repeat(self.location.column.saturating_sub(1) as usize);
            rendered.push_str("    |\n");
            rendered.push_str(&format!("{line:>3} | {text}\n"));
            rendered.push_str(&format!("    | {indent}^\n"));
        }
        rendered
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] at {} ({}): {}",
            self.severity, self.code, self.location, self.phase, self.message
        )
    }
}

/// Diagnostics collected during one translation run, in the order raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// The most severe diagnostic's severity.
    pub fn worst(&self) -> Option<Severity> {
        self.items.iter().map(|d| d.severity).max()
    }

    /// Check for any diagnostic of severity Error or worse.
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    /// Check for any Fatal or InternalError diagnostic.
    pub fn has_fatal(&self) -> bool {
        self.items.iter().any(|d| d.severity >= Severity::Fatal)
    }

    /// Diagnostics of severity Error or worse.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn with_code(&self, code: ErrorCode) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.code == code)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|d| d.severity == severity).count()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Render every diagnostic against the emitted output.
    pub fn render_with_output(&self, output: &str) -> String {
        self.items
            .iter()
            .map(|d| d.display_with_output(output))
            .collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning() -> Diagnostic {
        Diagnostic::new(
            Severity::Warning,
            Phase::DiscoveringTypes,
            ErrorCode::UntypedIdentifier,
            "type of 'z' could not be inferred",
        )
    }

    #[test]
    fn code_renders_padded() {
        assert_eq!(ErrorCode::UndefinedVariable.to_string(), "E0007");
        assert_eq!(ErrorCode::try_from(20u16).ok(), Some(ErrorCode::InvalidRange));
    }

    #[test]
    fn severity_order() {
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Fatal < Severity::InternalError);
    }

    #[test]
    fn counts_and_filters() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(warning());
        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.worst(), Some(Severity::Warning));

        diagnostics.push(Diagnostic::from_error(
            &TranslationError::ExpectedVariable,
            Phase::Emitting,
        ));
        assert!(diagnostics.has_errors());
        assert!(diagnostics.has_fatal());
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.with_code(ErrorCode::ExpectedVariable).count(), 1);
    }

    #[test]
    fn caret_under_column() {
        let diagnostic = warning().with_location(Location::new(14, 2, 5));
        let rendered = diagnostic.display_with_output("int main() {\n    z = 1;\n}");
        assert!(rendered.contains("  2 |     z = 1;"));
        assert!(rendered.ends_with("    |     ^\n"));
    }

    #[test]
    fn render_skips_missing_line() {
        let diagnostic = warning().with_location(Location::new(0, 9, 1));
        let rendered = diagnostic.display_with_output("one line");
        assert_eq!(rendered.lines().count(), 1);
    }
}
