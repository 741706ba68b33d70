//! Per-run translation settings.

use mathscribe_compiler::EngineOptions;
use mathscribe_compiler::native::NATIVE;

/// Settings for one translation run.
///
/// # Example
///
/// ```
/// use mathscribe::TranslationOptions;
///
/// let options = TranslationOptions::new()
///     .indent_width(2)
///     .entry_point("run")
///     .range_checks(false);
/// assert_eq!(options.backend, "native");
/// assert_eq!(options.indent_width, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOptions {
    /// Backend to emit for.
    pub backend: String,
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// Name of the generated function holding top-level statements.
    pub entry_point: String,
    /// Header included at the top of the output.
    pub runtime_header: String,
    /// Emit run-time validation of range bounds.
    pub range_checks: bool,
    /// Print the value of top-level expression statements.
    pub print_results: bool,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        let engine = EngineOptions::default();
        Self {
            backend: NATIVE.to_string(),
            indent_width: engine.indent_width,
            entry_point: engine.entry_point,
            runtime_header: engine.runtime_header,
            range_checks: engine.range_checks,
            print_results: engine.print_results,
        }
    }
}

impl TranslationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    pub fn indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }

    pub fn runtime_header(mut self, header: impl Into<String>) -> Self {
        self.runtime_header = header.into();
        self
    }

    pub fn range_checks(mut self, enabled: bool) -> Self {
        self.range_checks = enabled;
        self
    }

    pub fn print_results(mut self, enabled: bool) -> Self {
        self.print_results = enabled;
        self
    }

    /// The engine's share of these settings.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            indent_width: self.indent_width,
            entry_point: self.entry_point.clone(),
            runtime_header: self.runtime_header.clone(),
            range_checks: self.range_checks,
            print_results: self.print_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine() {
        let options = TranslationOptions::default();
        assert_eq!(options.backend, NATIVE);
        assert_eq!(options.engine_options(), EngineOptions::default());
    }

    #[test]
    fn builder_overrides() {
        let options = TranslationOptions::new()
            .runtime_header("rt.hpp")
            .print_results(false);
        let engine = options.engine_options();
        assert_eq!(engine.runtime_header, "rt.hpp");
        assert!(!engine.print_results);
        assert!(engine.range_checks);
    }
}
