//! Mathscribe: translate mathematical expression trees into native source.
//!
//! A document is an [`ExprTree`] of definitions, assignments, loops and
//! expressions. Translation infers a static type for every quantity, resolves
//! every call against the built-in function catalog, and emits C++ source
//! against a small `rt::` runtime.
//!
//! - [`Context`]: registries and backends, populated once and shared
//! - [`Unit`]: incremental re-translation of one edited document
//! - [`TranslationOptions`]: per-run output settings
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
//! let x = tree.variable("x");
//! let decl = tree.annotate(x, "ℝ");
//! let x_ref = tree.variable("x");
//! let root_of = tree.call("sqrt", [x_ref]);
//! let root = tree.root([decl, root_of]);
//!
//! let output = ctx.translate(&tree, root, &TranslationOptions::default()).unwrap();
//! assert!(output.is_success());
//! assert!(output.text.contains("double x;"));
//! assert!(output.text.contains("rt::print(rt::sqrt(x));"));
//! ```

pub mod context;
pub mod options;
pub mod unit;

pub use context::{Backend, Context, ContextError};
pub use options::TranslationOptions;
pub use unit::Unit;

pub use mathscribe_compiler::{
    DefinedAs, Identifier, IdentifierHandle, SymbolTable, TranslationOutput, TranslationState,
};
pub use mathscribe_core::{
    Diagnostic, Diagnostics, ErrorCode, ExprTree, MathscribeError, NodeId, NodeKind, Operator,
    Phase, Severity, ValueType, VariableName,
};
pub use mathscribe_registry::Module;
