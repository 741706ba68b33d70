//! The translation engine.
//!
//! An [`Engine`] translates one document tree for one backend in two passes:
//!
//! 1. **Discovering types** ([`discovery`]): a depth-first walk that declares
//!    identifiers in their scopes, applies explicit annotations, infers
//!    types from values and resolves every call site. Errors are collected
//!    and the walk continues where it can.
//! 2. **Emitting** ([`emission`]): a second walk over the same tree that
//!    dispatches every node to its backend [`NodeTranslator`] and writes
//!    text to a [`SourceWriter`]. Any failure here ends the run.
//!
//! The second pass runs only if the first produced no Error-or-worse
//! diagnostic.
//!
//! ```text
//! Idle ──► DiscoveringTypes ──► Emitting ──► Completed
//!                 │                 │
//!                 └──────► Failed ◄─┘
//! ```
//!
//! [`NodeTranslator`]: crate::translator::NodeTranslator

mod discovery;
mod emission;

pub use emission::Position;

use rustc_hash::{FxHashMap, FxHashSet};

use mathscribe_core::{
    Diagnostic, Diagnostics, ExprTree, NodeId, NodeKind, Phase, SymbolError, TranslationError,
    TypeProperties, ValueType,
};
use mathscribe_registry::{FunctionCatalog, ResolvedCall, TypeRegistry, TypeTranslator};

use crate::emit::SourceWriter;
use crate::symbols::{Identifier, IdentifierHandle, SymbolTable};
use crate::translator::TranslatorTable;

type Result<T> = std::result::Result<T, TranslationError>;

// ==========================================================================
// Options and results
// ==========================================================================

/// Output settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
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

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            entry_point: "evaluate".to_string(),
            runtime_header: "mathscribe/runtime.hpp".to_string(),
            range_checks: true,
            print_results: true,
        }
    }
}

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationState {
    Idle,
    DiscoveringTypes,
    Emitting,
    Completed,
    Failed,
}

impl TranslationState {
    /// The diagnostic phase for this state.
    pub fn phase(self) -> Phase {
        match self {
            TranslationState::Emitting | TranslationState::Completed => Phase::Emitting,
            _ => Phase::DiscoveringTypes,
        }
    }
}

/// What a call site (or a bare reference to a catalog constant) resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    Catalog(ResolvedCall),
    User(IdentifierHandle),
}

/// A function defined in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFunction {
    pub definition: NodeId,
    /// Parameters in order. Shorter than the definition's parameter list
    /// only if a parameter failed to declare.
    pub parameters: Vec<IdentifierHandle>,
}

/// The result of a run.
#[derive(Debug)]
pub struct TranslationOutput {
    /// Emitted text. Empty if emission never started; partial if it failed.
    pub text: String,
    pub diagnostics: Diagnostics,
    pub state: TranslationState,
    /// Identifiers of the document, for inspection or reuse by the next run.
    pub symbols: SymbolTable,
}

impl TranslationOutput {
    /// Check if the run completed without Error-or-worse diagnostics.
    pub fn is_success(&self) -> bool {
        self.state == TranslationState::Completed && !self.diagnostics.has_errors()
    }
}

// ==========================================================================
// Engine
// ==========================================================================

/// Two-pass translator for one tree and one backend.
pub struct Engine<'a> {
    types: &'a TypeRegistry,
    catalog: &'a FunctionCatalog,
    translators: &'a TranslatorTable,
    tree: &'a ExprTree,
    backend: String,
    options: EngineOptions,

    state: TranslationState,
    root: Option<NodeId>,
    symbols: SymbolTable,
    diagnostics: Diagnostics,
    /// Open scopes, innermost last.
    scopes: Vec<NodeId>,

    // Results of type discovery
    node_types: FxHashMap<NodeId, ValueType>,
    calls: FxHashMap<NodeId, CallTarget>,
    bindings: FxHashMap<NodeId, IdentifierHandle>,
    functions: FxHashMap<IdentifierHandle, UserFunction>,
    /// Identifiers seen in this run.
    touched: FxHashSet<IdentifierHandle>,
    /// Capabilities the next call site's return type must provide.
    pending_capabilities: TypeProperties,
    /// Catalog calls whose arguments were untyped when first seen.
    deferred_calls: Vec<(NodeId, TypeProperties)>,
    /// Value types the output depends on, in first-use order.
    required_types: Vec<ValueType>,

    // Emission
    out: SourceWriter,
    position: Position,
    temporaries: u32,
}

impl<'a> Engine<'a> {
    /// Create an engine over `tree` for `backend`.
    pub fn new(
        types: &'a TypeRegistry,
        catalog: &'a FunctionCatalog,
        translators: &'a TranslatorTable,
        tree: &'a ExprTree,
        backend: &str,
        options: EngineOptions,
    ) -> Self {
        let out = SourceWriter::new(options.indent_width);
        Self {
            types,
            catalog,
            translators,
            tree,
            backend: backend.to_string(),
            options,
            state: TranslationState::Idle,
            root: None,
            symbols: SymbolTable::new(),
            diagnostics: Diagnostics::new(),
            scopes: Vec::new(),
            node_types: FxHashMap::default(),
            calls: FxHashMap::default(),
            bindings: FxHashMap::default(),
            functions: FxHashMap::default(),
            touched: FxHashSet::default(),
            pending_capabilities: TypeProperties::empty(),
            deferred_calls: Vec::new(),
            required_types: Vec::new(),
            out,
            position: Position::Statement,
            temporaries: 0,
        }
    }

    /// Seed the engine with identifiers from an earlier run of the same
    /// document. Identifiers that are seen again keep their handles.
    pub fn with_symbols(mut self, symbols: SymbolTable) -> Self {
        self.symbols = symbols;
        self
    }

    /// Translate the document rooted at `root`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, root: NodeId) -> TranslationOutput {
        if !matches!(self.tree.kind(root), Some(NodeKind::Root)) {
            self.report(
                root,
                TranslationError::InvalidTree(format!("{root} is not a document root")),
            );
            return self.finish(TranslationState::Failed);
        }
        self.root = Some(root);

        self.state = TranslationState::DiscoveringTypes;
        tracing::debug!(backend = %self.backend, nodes = self.tree.len(), "discovering types");
        let discovered = self.discover_types(root);
        if discovered.is_err() || self.diagnostics.has_errors() {
            tracing::debug!(
                errors = self.diagnostics.error_count(),
                "type discovery failed, skipping emission"
            );
            return self.finish(TranslationState::Failed);
        }

        self.state = TranslationState::Emitting;
        tracing::debug!(identifiers = self.symbols.len(), "emitting");
        let emitted = self.emit_statement(root);
        let state = if emitted.is_ok() && !self.diagnostics.has_errors() {
            TranslationState::Completed
        } else {
            TranslationState::Failed
        };
        self.finish(state)
    }

    fn finish(self, state: TranslationState) -> TranslationOutput {
        tracing::debug!(
            ?state,
            diagnostics = self.diagnostics.len(),
            bytes = self.out.len(),
            "translation finished"
        );
        TranslationOutput {
            text: self.out.into_string(),
            diagnostics: self.diagnostics,
            state,
            symbols: self.symbols,
        }
    }

    // ==========================================================================
    // Diagnostics
    // ==========================================================================

    /// Record `error` against `node` at the current output location.
    pub fn report(&mut self, node: NodeId, error: TranslationError) {
        tracing::trace!(node = %node, %error, "diagnostic");
        let diagnostic = Diagnostic::from_error(&error, self.state.phase())
            .with_node(node)
            .with_location(self.out.location());
        self.diagnostics.push(diagnostic);
    }

    /// Record a failure of work on `node`.
    ///
    /// Returns `Err(Aborted)` if the pass must stop, `Ok(None)` if it can go on.
    fn recover<T>(&mut self, node: NodeId, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(TranslationError::Aborted) => Err(TranslationError::Aborted),
            Err(error) => {
                let abort = error.is_abort();
                self.report(node, error);
                if abort {
                    Err(TranslationError::Aborted)
                } else {
                    Ok(None)
                }
            }
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    // ==========================================================================
    // Context
    // ==========================================================================

    pub fn tree(&self) -> &'a ExprTree {
        self.tree
    }

    pub fn types(&self) -> &'a TypeRegistry {
        self.types
    }

    pub fn catalog(&self) -> &'a FunctionCatalog {
        self.catalog
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn state(&self) -> TranslationState {
        self.state
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The document root being translated.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Check if `node` is a direct child of the document root.
    pub fn is_top_level(&self, node: NodeId) -> bool {
        self.root.is_some() && self.tree.parent(node) == self.root
    }

    // ==========================================================================
    // Scopes
    // ==========================================================================

    /// The innermost open scope.
    pub fn current_scope(&self) -> Result<NodeId> {
        self.scopes
            .last()
            .copied()
            .or(self.root)
            .ok_or_else(|| TranslationError::InvalidTree("no open scope".into()))
    }

    /// Run `f` with `scope` open.
    pub fn scoped<T>(&mut self, scope: NodeId, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.scopes.push(scope);
        let result = f(self);
        self.scopes.pop();
        result
    }

    // ==========================================================================
    // Discovery results
    // ==========================================================================

    /// The static type of a node.
    ///
    /// Variables report their identifier's final type; other nodes the type
    /// computed for them during discovery.
    pub fn static_type(&self, node: NodeId) -> ValueType {
        if let Some(NodeKind::Variable(_)) = self.tree.kind(node)
            && let Ok(ident) = self.identifier_for(node)
        {
            return ident.value_type;
        }
        self.node_types
            .get(&node)
            .copied()
            .unwrap_or(ValueType::None)
    }

    /// The identifier a variable node refers to.
    ///
    /// Uses the binding made during discovery; a node discovery never bound
    /// is resolved by name through the open scopes.
    pub fn identifier_for(&self, node: NodeId) -> Result<&Identifier> {
        let Some(NodeKind::Variable(name)) = self.tree.kind(node) else {
            return Err(TranslationError::ExpectedVariable);
        };
        if let Some(handle) = self.binding(node) {
            return self.identifier(handle);
        }
        let scope = self.current_scope()?;
        self.symbols
            .lookup(name, scope, self.tree)
            .ok_or_else(|| TranslationError::UndefinedVariable(name.to_string()))
    }

    /// The identifier a variable node was bound to during discovery.
    pub fn binding(&self, node: NodeId) -> Option<IdentifierHandle> {
        self.bindings.get(&node).copied()
    }

    /// What a call site resolved to.
    pub fn call_target(&self, node: NodeId) -> Option<&CallTarget> {
        self.calls.get(&node)
    }

    /// A function defined in the document.
    pub fn user_function(&self, handle: IdentifierHandle) -> Option<&UserFunction> {
        self.functions.get(&handle)
    }

    /// The function whose definition is `node`.
    pub fn function_at(&self, node: NodeId) -> Option<(IdentifierHandle, &UserFunction)> {
        self.functions
            .iter()
            .find(|(_, f)| f.definition == node)
            .map(|(&handle, f)| (handle, f))
    }

    /// The identifier behind `handle`.
    pub fn identifier(&self, handle: IdentifierHandle) -> Result<&Identifier> {
        self.symbols
            .get(handle)
            .ok_or_else(|| SymbolError::UnknownHandle(handle.as_u64()).into())
    }

    /// Note that the output depends on `value_type`.
    pub fn require_type(&mut self, value_type: ValueType) {
        if value_type != ValueType::None && !self.required_types.contains(&value_type) {
            self.required_types.push(value_type);
        }
    }

    /// Value types the output depends on, in first-use order.
    pub fn required_types(&self) -> &[ValueType] {
        &self.required_types
    }

    /// The backend translator for a value type.
    pub fn type_translator(&self, value_type: ValueType) -> Result<&'a dyn TypeTranslator> {
        let types = self.types;
        types
            .translator(&self.backend, value_type)
            .map_err(TranslationError::from)
    }

    /// The backend spelling of a value type.
    pub fn spelling(&self, value_type: ValueType) -> Result<String> {
        Ok(self.type_translator(value_type)?.spelling().to_string())
    }
}
