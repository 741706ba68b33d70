//! Error types for every phase of translation.
//!
//! ## Error Hierarchy
//!
//! ```text
//! MathscribeError (top-level wrapper)
//! ├── RegistrationError - Type/translator/function registration at startup
//! ├── SymbolError       - Symbol table operations
//! ├── ResolveError      - Function catalog lookups
//! └── TranslationError  - Engine failures (wraps the three above)
//! ```
//!
//! Every [`TranslationError`] maps to one [`ErrorCode`] and one [`Severity`];
//! the engine turns errors into [`Diagnostic`](crate::Diagnostic)s using them.

use thiserror::Error;

use crate::{ErrorCode, NodeKindTag, Severity, ValueType};

fn list_types(types: &[ValueType]) -> String {
    types
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while populating the registries at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A data type for this value type already exists.
    #[error("duplicate type: {0} is already registered")]
    DuplicateType(ValueType),

    /// Another data type already uses this declaring symbol.
    #[error("duplicate type symbol '{0}'")]
    DuplicateTypeSymbol(String),

    /// A type translator for this backend and value type already exists.
    #[error("duplicate translator for {value_type} on backend '{backend}'")]
    DuplicateTranslator {
        backend: String,
        value_type: ValueType,
    },

    /// No type translator for this backend and value type.
    #[error("no translator for {value_type} on backend '{backend}'")]
    MissingTranslator {
        backend: String,
        value_type: ValueType,
    },

    /// A function with this internal or user-visible name already exists.
    #[error("duplicate function '{0}'")]
    DuplicateFunction(String),

    /// A function was registered without any call signature.
    #[error("function '{0}' has no variants")]
    EmptyVariants(String),
}

impl RegistrationError {
    /// The diagnostic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistrationError::DuplicateType(_)
            | RegistrationError::DuplicateTypeSymbol(_)
            | RegistrationError::DuplicateTranslator { .. } => ErrorCode::DuplicateType,
            RegistrationError::MissingTranslator { .. } => ErrorCode::MissingTranslator,
            RegistrationError::DuplicateFunction(_) | RegistrationError::EmptyVariants(_) => {
                ErrorCode::DuplicateFunction
            }
        }
    }
}

// ============================================================================
// Symbol Errors
// ============================================================================

/// Errors raised by symbol table operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// The name is already declared in this exact scope.
    #[error("'{name}' is already declared in this scope")]
    AlreadyDeclaredInScope { name: String },

    /// An explicit type conflicts with an earlier explicit type.
    #[error("'{name}' was declared as {existing} and cannot be redeclared as {requested}")]
    ConflictingDeclaration {
        name: String,
        existing: ValueType,
        requested: ValueType,
    },

    /// An inferred type cannot be reconciled with the one inferred so far.
    #[error("'{name}' is used as both {current} and {observed}")]
    IncompatibleInferredType {
        name: String,
        current: ValueType,
        observed: ValueType,
    },

    /// The identifier handle is not in the table.
    #[error("unknown identifier handle {0}")]
    UnknownHandle(u64),
}

impl SymbolError {
    /// The diagnostic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SymbolError::AlreadyDeclaredInScope { .. } => ErrorCode::AlreadyDeclaredInScope,
            SymbolError::ConflictingDeclaration { .. } => ErrorCode::ConflictingDeclaration,
            SymbolError::IncompatibleInferredType { .. } => ErrorCode::IncompatibleInferredType,
            SymbolError::UnknownHandle(_) => ErrorCode::InternalError,
        }
    }
}

// ============================================================================
// Resolve Errors
// ============================================================================

/// Errors raised when resolving a call against the function catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No function with this name.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// No variant accepts the argument types.
    #[error("no variant of '{name}' accepts ({})", list_types(.arguments))]
    NoMatchingVariant {
        name: String,
        arguments: Vec<ValueType>,
    },
}

impl ResolveError {
    /// The diagnostic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolveError::UnknownFunction(_) => ErrorCode::UnknownFunction,
            ResolveError::NoMatchingVariant { .. } => ErrorCode::NoMatchingVariant,
        }
    }
}

// ============================================================================
// Translation Errors
// ============================================================================

/// Errors raised by the translation engine and its node translators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A variable reference could not be resolved during emission.
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    /// A literal container or matrix has no usable entries.
    #[error("cannot iterate over an empty {0}")]
    EmptyIterable(&'static str),

    /// A loop binding is not a simple name.
    #[error("expected a variable as the loop binding")]
    ExpectedVariable,

    /// A construct is missing a required operand.
    #[error("missing {0}")]
    MissingParameterOrField(&'static str),

    /// A literal's text is not a valid value of its kind.
    #[error("malformed literal '{0}'")]
    MalformedLiteralValue(String),

    /// A type annotation names no registered type.
    #[error("unknown type '{0}'")]
    UnknownTypeSymbol(String),

    /// Operand types have no common upcast.
    #[error("operator '{operator}' cannot combine {}", list_types(.operands))]
    IncompatibleOperands {
        operator: String,
        operands: Vec<ValueType>,
    },

    /// A user function was called with the wrong number of arguments.
    #[error("'{name}' takes {expected} argument(s) but {found} were given")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A call names an identifier that is not a function.
    #[error("'{0}' is not a function")]
    NotCallable(String),

    /// No type could be inferred; the identifier becomes a variant.
    #[error("type of '{0}' could not be inferred; treating it as variant")]
    UntypedIdentifier(String),

    /// A literal range never reaches its end.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// No node translator for this kind on the active backend.
    #[error("no translator for {kind:?} nodes on backend '{backend}'")]
    MissingNodeTranslator { backend: String, kind: NodeKindTag },

    /// The tree does not have the shape a node kind requires.
    #[error("malformed tree: {0}")]
    InvalidTree(String),

    /// The pass was abandoned after a fatal diagnostic was recorded.
    #[error("translation aborted")]
    Aborted,
}

impl TranslationError {
    /// The diagnostic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            TranslationError::Registration(e) => e.code(),
            TranslationError::Symbol(e) => e.code(),
            TranslationError::Resolve(e) => e.code(),
            TranslationError::UndefinedVariable(_) => ErrorCode::UndefinedVariable,
            TranslationError::EmptyIterable(_) => ErrorCode::EmptyIterable,
            TranslationError::ExpectedVariable => ErrorCode::ExpectedVariable,
            TranslationError::MissingParameterOrField(_) => ErrorCode::MissingParameterOrField,
            TranslationError::MalformedLiteralValue(_) => ErrorCode::MalformedLiteralValue,
            TranslationError::UnknownTypeSymbol(_) => ErrorCode::UnknownTypeSymbol,
            TranslationError::IncompatibleOperands { .. } => ErrorCode::IncompatibleOperands,
            TranslationError::ArgumentCountMismatch { .. } => ErrorCode::ArgumentCountMismatch,
            TranslationError::NotCallable(_) => ErrorCode::NotCallable,
            TranslationError::UntypedIdentifier(_) => ErrorCode::UntypedIdentifier,
            TranslationError::InvalidRange(_) => ErrorCode::InvalidRange,
            TranslationError::MissingNodeTranslator { .. } => ErrorCode::MissingTranslator,
            TranslationError::InvalidTree(_) | TranslationError::Aborted => {
                ErrorCode::InternalError
            }
        }
    }

    /// How grave this error is.
    pub fn severity(&self) -> Severity {
        match self {
            TranslationError::UntypedIdentifier(_) | TranslationError::InvalidRange(_) => {
                Severity::Warning
            }
            TranslationError::UndefinedVariable(_)
            | TranslationError::EmptyIterable(_)
            | TranslationError::ExpectedVariable
            | TranslationError::MissingParameterOrField(_) => Severity::Fatal,
            TranslationError::Registration(_)
            | TranslationError::MissingNodeTranslator { .. }
            | TranslationError::InvalidTree(_)
            | TranslationError::Aborted
            | TranslationError::Symbol(SymbolError::UnknownHandle(_)) => {
                Severity::InternalError
            }
            _ => Severity::Error,
        }
    }

    /// Check if this error must abort the current pass.
    #[inline]
    pub fn is_abort(&self) -> bool {
        self.severity() >= Severity::Fatal
    }
}

// ============================================================================
// Unified Error
// ============================================================================

/// The unified error type for all mathscribe operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathscribeError {
    /// A registration error.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// A symbol table error.
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    /// A catalog lookup error.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A translation error.
    #[error(transparent)]
    Translation(#[from] TranslationError),
}

impl MathscribeError {
    /// Check if this is a registration error.
    pub fn is_registration(&self) -> bool {
        matches!(self, MathscribeError::Registration(_))
    }

    /// Check if this is a translation error.
    pub fn is_translation(&self) -> bool {
        matches!(self, MathscribeError::Translation(_))
    }

    /// The diagnostic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            MathscribeError::Registration(e) => e.code(),
            MathscribeError::Symbol(e) => e.code(),
            MathscribeError::Resolve(e) => e.code(),
            MathscribeError::Translation(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_matching_variant_display() {
        let err = ResolveError::NoMatchingVariant {
            name: "gcd".into(),
            arguments: vec![ValueType::Real, ValueType::Set],
        };
        assert_eq!(err.to_string(), "no variant of 'gcd' accepts (real, set)");
        assert_eq!(err.code(), ErrorCode::NoMatchingVariant);
    }

    #[test]
    fn incompatible_operands_display() {
        let err = TranslationError::IncompatibleOperands {
            operator: "+".into(),
            operands: vec![ValueType::Set, ValueType::MatrixReal],
        };
        assert_eq!(err.to_string(), "operator '+' cannot combine set, real matrix");
        assert_eq!(err.code(), ErrorCode::IncompatibleOperands);
    }

    #[test]
    fn wrapped_errors_keep_their_code() {
        let err: TranslationError = SymbolError::AlreadyDeclaredInScope { name: "x".into() }.into();
        assert_eq!(err.code(), ErrorCode::AlreadyDeclaredInScope);
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(err.to_string(), "'x' is already declared in this scope");
    }

    #[test]
    fn severities() {
        assert_eq!(
            TranslationError::UntypedIdentifier("y".into()).severity(),
            Severity::Warning
        );
        assert_eq!(
            TranslationError::EmptyIterable("matrix").severity(),
            Severity::Fatal
        );
        assert!(TranslationError::ExpectedVariable.is_abort());

        let missing = TranslationError::MissingNodeTranslator {
            backend: "native".into(),
            kind: NodeKindTag::While,
        };
        assert_eq!(missing.severity(), Severity::InternalError);
        assert_eq!(missing.code(), ErrorCode::MissingTranslator);
    }

    #[test]
    fn unified_error_from_each_phase() {
        let reg: MathscribeError = RegistrationError::DuplicateType(ValueType::Real).into();
        assert!(reg.is_registration());
        assert_eq!(reg.to_string(), "duplicate type: real is already registered");

        let tr: MathscribeError = TranslationError::NotCallable("x".into()).into();
        assert!(tr.is_translation());
        assert_eq!(tr.code(), ErrorCode::NotCallable);
    }
}
