//! Translation units.
//!
//! A `Unit` translates one document repeatedly as it is edited. Identifiers
//! persist between runs, so an identifier that survives an edit keeps its
//! handle and its spelling in the output.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mathscribe::Context;
//! use mathscribe_core::ExprTree;
//!
//! let ctx = Arc::new(Context::with_default_modules().unwrap());
//! let mut unit = ctx.create_unit().unwrap();
//!
//! let mut tree = ExprTree::new();
//! let x = tree.variable("x");
//! let one = tree.integer(1);
//! let assign = tree.assign(x, one);
//! let root = tree.root([assign]);
//!
//! let first = unit.translate(&tree, root).unwrap();
//! let second = unit.translate(&tree, root).unwrap();
//! assert_eq!(first.text, second.text);
//! assert_eq!(unit.runs(), 2);
//! ```

use std::sync::Arc;

use mathscribe_compiler::{SymbolTable, TranslationOutput, TranslationState};
use mathscribe_core::{ExprTree, NodeId};

use crate::context::{Context, ContextError};
use crate::options::TranslationOptions;

/// One document under incremental translation.
pub struct Unit {
    context: Arc<Context>,
    options: TranslationOptions,
    /// Identifiers from the last run
    symbols: SymbolTable,
    last_state: Option<TranslationState>,
    runs: usize,
}

impl Unit {
    /// Create a unit with default options.
    ///
    /// Usually called through [`Context::create_unit`].
    pub fn new(context: Arc<Context>) -> Self {
        Self {
            context,
            options: TranslationOptions::default(),
            symbols: SymbolTable::new(),
            last_state: None,
            runs: 0,
        }
    }

    pub fn with_options(mut self, options: TranslationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TranslationOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: TranslationOptions) {
        self.options = options;
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Identifiers as of the last run.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// State the last run ended in, if any.
    pub fn last_state(&self) -> Option<TranslationState> {
        self.last_state
    }

    /// Number of completed or failed runs since creation or [`reset`](Self::reset).
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Translate the document rooted at `root`.
    ///
    /// Identifiers whose scope was removed from `tree` are dropped first;
    /// the rest lose their types and uses so inference starts over while
    /// handles stay stable.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit's backend is not registered.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn translate(
        &mut self,
        tree: &ExprTree,
        root: NodeId,
    ) -> Result<TranslationOutput, ContextError> {
        let engine = self.context.engine(tree, &self.options)?;

        let mut symbols = std::mem::take(&mut self.symbols);
        let dropped = symbols.retain_live(tree);
        symbols.reset_types();
        tracing::debug!(
            run = self.runs + 1,
            kept = symbols.len(),
            dropped,
            "retranslating unit"
        );

        let output = engine.with_symbols(symbols).run(root);
        self.symbols = output.symbols.clone();
        self.last_state = Some(output.state);
        self.runs += 1;
        Ok(output)
    }

    /// Forget every identifier, as if the document were new.
    pub fn reset(&mut self) {
        self.symbols.clear();
        self.last_state = None;
        self.runs = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathscribe_core::ValueType;

    fn unit() -> Unit {
        let ctx = Arc::new(Context::with_default_modules().unwrap());
        ctx.create_unit().unwrap()
    }

    #[test]
    fn create_unit_requires_seal() {
        let ctx = Arc::new(Context::new());
        assert!(matches!(ctx.create_unit(), Err(ContextError::NotSealed)));
    }

    #[test]
    fn handles_survive_retranslation() {
        let mut unit = unit();
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let one = tree.integer(1);
        let assign = tree.assign(x, one);
        let root = tree.root([assign]);

        let first = unit.translate(&tree, root).unwrap();
        let handle = first.symbols.in_scope(&"x".into(), root).unwrap().handle;

        // Edit: x now holds a real
        let value = tree.child(assign, 1).unwrap();
        tree.remove(value);
        let half = tree.real("0.5");
        tree.append_child(assign, half);

        let second = unit.translate(&tree, root).unwrap();
        assert!(second.is_success(), "{:?}", second.diagnostics);
        let ident = second.symbols.in_scope(&"x".into(), root).unwrap();
        assert_eq!(ident.handle, handle);
        assert_eq!(ident.value_type, ValueType::Real);
        assert_eq!(unit.runs(), 2);
        assert_eq!(unit.last_state(), Some(TranslationState::Completed));
    }

    #[test]
    fn removed_scope_drops_identifiers() {
        let mut unit = unit();
        let mut tree = ExprTree::new();
        let y = tree.variable("y");
        let two = tree.integer(2);
        let assign = tree.assign(y, two);
        let block = tree.block([assign]);
        let root = tree.root([block]);

        unit.translate(&tree, root).unwrap();
        assert_eq!(unit.symbols().len(), 1);

        tree.remove(block);
        let output = unit.translate(&tree, root).unwrap();
        assert!(output.is_success());
        assert!(unit.symbols().is_empty());
    }

    #[test]
    fn reset_forgets_everything() {
        let mut unit = unit();
        let mut tree = ExprTree::new();
        let z = tree.variable("z");
        let root = tree.root([z]);

        unit.translate(&tree, root).unwrap();
        assert_eq!(unit.symbols().len(), 1);
        unit.reset();
        assert!(unit.symbols().is_empty());
        assert_eq!(unit.runs(), 0);
        assert_eq!(unit.last_state(), None);
    }
}
