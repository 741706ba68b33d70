//! Registries shared by every translation run.
//!
//! - [`TypeRegistry`]: value types, their declaring symbols and per-backend
//!   [`TypeTranslator`]s
//! - [`FunctionCatalog`]: callable functions and best-fit overload resolution
//! - [`Module`]: installable bundles of functions
//!
//! Both registries are populated at startup, type registry first, and are
//! read-only while translating.

pub mod catalog;
pub mod module;
pub mod overload;
pub mod types;

pub use catalog::{FunctionCatalog, FunctionData, FunctionKind, FunctionVariant, Parameter};
pub use module::Module;
pub use overload::{ArgConversion, ResolvedCall};
pub use types::{TypeRegistry, TypeTranslator};
