//! Mathscribe core types.
//!
//! Shared by every other mathscribe crate:
//!
//! - [`ValueType`] and the upcast lattice, [`DataType`] and [`TypeProperties`]
//! - [`VariableName`]
//! - [`ExprTree`], the generational arena of expression nodes, and [`NodeKind`]
//! - [`FunctionHash`], the stable identity of catalog functions
//! - The error hierarchy rooted at [`MathscribeError`]
//! - [`Diagnostic`]s and their [`Location`] in emitted output

mod data_type;
mod diagnostics;
mod error;
mod hash;
mod location;
mod name;
mod node;
mod tree;
mod value_type;

pub use data_type::{DataType, TypeProperties};
pub use diagnostics::{Diagnostic, Diagnostics, ErrorCode, Phase, Severity};
pub use error::{
    MathscribeError, RegistrationError, ResolveError, SymbolError, TranslationError,
};
pub use hash::FunctionHash;
pub use location::Location;
pub use name::VariableName;
pub use node::{Literal, LiteralKind, LiteralValue, NodeKind, NodeKindTag, Operator};
pub use tree::{Ancestors, ExprTree, Node, NodeId};
pub use value_type::{DynamicConversion, ValueType};
