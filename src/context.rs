//! Startup wiring shared by every translation.
//!
//! A `Context` owns the type registry, the function catalog and the node
//! translators of every backend. It is populated once, sealed, and then
//! shared read-only.
//!
//! # Example
//!
//! ```
//! use mathscribe::{Context, TranslationOptions};
//! use mathscribe_core::{ExprTree, Operator};
//!
//! let ctx = Context::with_default_modules().unwrap();
//!
//! let mut tree = ExprTree::new();
//! let a = tree.integer(1);
//! let b = tree.integer(2);
//! let sum = tree.operator(Operator::Add, [a, b]);
//! let root = tree.root([sum]);
//!
//! let output = ctx.translate(&tree, root, &TranslationOptions::default()).unwrap();
//! assert!(output.is_success());
//! assert!(output.text.contains("rt::print(1 + 2);"));
//! ```

use std::sync::Arc;

use thiserror::Error;

use mathscribe_compiler::native::{self, NATIVE};
use mathscribe_compiler::{Engine, TranslationOutput, TranslatorTable};
use mathscribe_core::{ExprTree, MathscribeError, NodeId, NodeKindTag, RegistrationError};
use mathscribe_modules::default_modules;
use mathscribe_registry::{FunctionCatalog, Module, TypeRegistry};

use crate::options::TranslationOptions;
use crate::unit::Unit;

/// A target language: its type translators and node translators.
#[derive(Debug, Clone, Copy)]
pub struct Backend {
    pub name: &'static str,
    pub register_types: fn(&mut TypeRegistry) -> Result<(), RegistrationError>,
    pub register_nodes: fn(&mut TranslatorTable),
}

impl Backend {
    /// C++ against the `rt::` runtime.
    pub fn native() -> Self {
        Self {
            name: NATIVE,
            register_types: native::register_types,
            register_nodes: native::register_nodes,
        }
    }
}

/// Registries and translators for every run.
///
/// Not Debug because translators are trait objects.
pub struct Context {
    types: TypeRegistry,
    catalog: FunctionCatalog,
    translators: TranslatorTable,
    /// Names of installed modules, in installation order
    modules: Vec<String>,
    backends: Vec<&'static str>,
    sealed: bool,
}

impl Context {
    /// Create a context with the default types and nothing else.
    pub fn new() -> Self {
        Self {
            types: TypeRegistry::with_defaults(),
            catalog: FunctionCatalog::new(),
            translators: TranslatorTable::new(),
            modules: Vec::new(),
            backends: Vec::new(),
            sealed: false,
        }
    }

    /// Create a sealed context with the native backend and every built-in
    /// module.
    ///
    /// # Errors
    ///
    /// Returns an error if a registration collides or the native backend is
    /// incomplete.
    pub fn with_default_modules() -> Result<Self, ContextError> {
        let mut ctx = Self::new();
        ctx.register_backend(Backend::native())?;
        for module in default_modules() {
            ctx.install(module)?;
        }
        ctx.seal()?;
        Ok(ctx)
    }

    /// Install a module's functions into the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::AlreadySealed` after [`seal`](Self::seal), or
    /// the registration error of the first colliding function.
    pub fn install(&mut self, module: Module) -> Result<(), ContextError> {
        if self.sealed {
            return Err(ContextError::AlreadySealed);
        }
        module.install_into(&mut self.catalog)?;
        self.modules.push(module.name().to_string());
        Ok(())
    }

    /// Register a backend's type and node translators.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::AlreadySealed` after sealing, or
    /// `DuplicateTranslator` if the backend was registered before.
    pub fn register_backend(&mut self, backend: Backend) -> Result<(), ContextError> {
        if self.sealed {
            return Err(ContextError::AlreadySealed);
        }
        (backend.register_types)(&mut self.types)?;
        (backend.register_nodes)(&mut self.translators);
        self.backends.push(backend.name);
        Ok(())
    }

    /// Verify every registered backend and freeze the context.
    ///
    /// Calling `seal()` again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `IncompleteBackend` for the first backend that lacks a type
    /// translator for a concrete value type or a node translator for a node
    /// kind.
    pub fn seal(&mut self) -> Result<(), ContextError> {
        if self.sealed {
            return Ok(());
        }
        for &backend in &self.backends {
            let missing_types = self.types.verify_backend(backend);
            let missing_nodes = self.translators.missing(backend);
            if !missing_types.is_empty() || !missing_nodes.is_empty() {
                return Err(ContextError::IncompleteBackend {
                    backend: backend.to_string(),
                    missing_types,
                    missing_nodes,
                });
            }
        }
        self.sealed = true;
        tracing::debug!(
            backends = self.backends.len(),
            functions = self.catalog.len(),
            "context sealed"
        );
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn catalog(&self) -> &FunctionCatalog {
        &self.catalog
    }

    pub fn translators(&self) -> &TranslatorTable {
        &self.translators
    }

    /// Names of the installed modules.
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Names of the registered backends.
    pub fn backends(&self) -> &[&'static str] {
        &self.backends
    }

    /// Translate the document rooted at `root` with no earlier symbols.
    ///
    /// # Errors
    ///
    /// Returns `NotSealed` before sealing and `UnknownBackend` for a backend
    /// that was never registered. Problems in the document are reported as
    /// diagnostics in the output, not as errors.
    pub fn translate(
        &self,
        tree: &ExprTree,
        root: NodeId,
        options: &TranslationOptions,
    ) -> Result<TranslationOutput, ContextError> {
        Ok(self.engine(tree, options)?.run(root))
    }

    /// An engine over `tree`, after checking the context can translate.
    pub(crate) fn engine<'a>(
        &'a self,
        tree: &'a ExprTree,
        options: &TranslationOptions,
    ) -> Result<Engine<'a>, ContextError> {
        if !self.sealed {
            return Err(ContextError::NotSealed);
        }
        if !self.backends.iter().any(|&b| b == options.backend) {
            return Err(ContextError::UnknownBackend(options.backend.clone()));
        }
        Ok(Engine::new(
            &self.types,
            &self.catalog,
            &self.translators,
            tree,
            &options.backend,
            options.engine_options(),
        ))
    }

    /// Create a translation unit for one document.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::NotSealed` if the context has not been sealed.
    pub fn create_unit(self: &Arc<Self>) -> Result<Unit, ContextError> {
        if !self.sealed {
            return Err(ContextError::NotSealed);
        }
        Ok(Unit::new(Arc::clone(self)))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during context operations.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("context is already sealed; install modules and backends before seal()")]
    AlreadySealed,

    #[error("context is not sealed; call seal() before translating")]
    NotSealed,

    #[error("unknown backend '{0}'")]
    UnknownBackend(String),

    #[error(
        "backend '{backend}' is incomplete: {} type translator(s) and {} node translator(s) missing",
        missing_types.len(),
        missing_nodes.len()
    )]
    IncompleteBackend {
        backend: String,
        missing_types: Vec<RegistrationError>,
        missing_nodes: Vec<NodeKindTag>,
    },
}

impl ContextError {
    /// The underlying registration errors as `MathscribeError`s.
    ///
    /// Empty for variants without an underlying error.
    pub fn into_errors(self) -> Vec<MathscribeError> {
        match self {
            ContextError::Registration(err) => vec![MathscribeError::from(err)],
            ContextError::IncompleteBackend { missing_types, .. } => {
                missing_types.into_iter().map(MathscribeError::from).collect()
            }
            _ => Vec::new(),
        }
    }
}
