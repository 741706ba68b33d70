//! Pass 2: dispatch nodes to their backend translators and write text.
//!
//! Unlike discovery, emission does not recover: the first error is recorded
//! against the node it happened at and the run ends.

use mathscribe_core::{NodeId, TranslationError};

use super::{Engine, Result};
use crate::emit::SourceWriter;

/// Where the node being emitted sits in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// A complete statement, on its own line(s).
    Statement,
    /// An expression nested in another construct.
    Value,
}

impl<'a> Engine<'a> {
    /// Emit `node` as an expression.
    pub fn emit_value(&mut self, node: NodeId) -> Result<()> {
        self.emit_at(node, Position::Value)
    }

    /// Emit `node` as a statement.
    pub fn emit_statement(&mut self, node: NodeId) -> Result<()> {
        self.emit_at(node, Position::Statement)
    }

    /// Emit the out-of-line definitions of `node`.
    pub fn emit_definitions(&mut self, node: NodeId) -> Result<()> {
        let tree = self.tree;
        let table = self.translators;
        let result = match tree.kind(node) {
            Some(kind) => table
                .get(&self.backend, kind.tag())
                .and_then(|translator| translator.emit_definitions(node, self)),
            None => Err(stale(node)),
        };
        self.settle(node, result)
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn emit_at(&mut self, node: NodeId, position: Position) -> Result<()> {
        let tree = self.tree;
        let table = self.translators;
        let Some(kind) = tree.kind(node) else {
            return self.settle(node, Err(stale(node)));
        };
        let translator = match table.get(&self.backend, kind.tag()) {
            Ok(translator) => translator,
            Err(error) => return self.settle(node, Err(error)),
        };

        tracing::trace!(node = %node, kind = ?kind.tag(), ?position, "emit");
        let outer = std::mem::replace(&mut self.position, position);
        let result = translator.emit_body(node, self);
        self.position = outer;
        self.settle(node, result)
    }

    /// Record the first failure where it happened; callers above only see
    /// `Aborted`.
    fn settle(&mut self, node: NodeId, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(TranslationError::Aborted) => Err(TranslationError::Aborted),
            Err(error) => {
                tracing::debug!(node = %node, %error, "emission failed");
                self.report(node, error);
                Err(TranslationError::Aborted)
            }
        }
    }

    /// Position of the node being emitted.
    pub fn position(&self) -> Position {
        self.position
    }

    /// A fresh suffix for generated temporaries.
    pub fn next_temp(&mut self) -> u32 {
        self.temporaries += 1;
        self.temporaries
    }

    // ==========================================================================
    // Output
    // ==========================================================================

    pub fn write(&mut self, text: &str) {
        self.out.write(text);
    }

    /// Write `text` and end the line.
    pub fn line(&mut self, text: &str) {
        self.out.line(text);
    }

    pub fn newline(&mut self) {
        self.out.newline();
    }

    pub fn blank_line(&mut self) {
        self.out.blank_line();
    }

    /// End the current line if anything was written on it.
    pub fn finish_line(&mut self) {
        self.out.finish_line();
    }

    pub fn indent(&mut self) {
        self.out.indent();
    }

    pub fn dedent(&mut self) {
        self.out.dedent();
    }

    pub fn out(&self) -> &SourceWriter {
        &self.out
    }
}

fn stale(node: NodeId) -> TranslationError {
    TranslationError::InvalidTree(format!("{node} no longer exists"))
}
