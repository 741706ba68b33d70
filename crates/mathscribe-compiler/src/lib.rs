//! Mathscribe Compiler
//!
//! A two-pass translation engine from expression trees to backend source.
//!
//! ## Architecture
//!
//! - **Pass 1 (Type discovery)**: declare identifiers per scope, apply
//!   annotations, infer types and resolve calls
//! - **Pass 2 (Emission)**: dispatch every node to its backend translator
//!
//! ## Modules
//!
//! - [`emit`]: Indenting output sink with cursor tracking
//! - [`engine`]: The translation engine and its state machine
//! - [`naming`]: Mapping names to identifiers of the native target
//! - [`native`]: The C++ backend, including loop lowering
//! - [`range`]: Static planning of literal ranges
//! - [`symbols`]: Scoped symbol table
//! - [`translator`]: Per-backend node translator table
//! - [`typing`]: Result types of operators

pub mod emit;
pub mod engine;
pub mod naming;
pub mod native;
pub mod range;
pub mod symbols;
pub mod translator;
pub mod typing;

pub use emit::SourceWriter;
pub use engine::{
    CallTarget, Engine, EngineOptions, Position, TranslationOutput, TranslationState, UserFunction,
};
pub use range::{RangePlan, RangeProblem};
pub use symbols::{DefinedAs, Identifier, IdentifierHandle, SymbolTable, Use};
pub use translator::{NodeTranslator, TranslatorTable};

// Re-export the error type from core for convenience
pub use mathscribe_core::TranslationError;
