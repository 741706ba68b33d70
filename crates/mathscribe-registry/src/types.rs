//! TypeRegistry - the catalog of value types and their backend translators.
//!
//! Holds at most one [`DataType`] per [`ValueType`], indexed both by value
//! type and by declaring symbol (`ℝ`, `Matℤ`, ...), plus at most one
//! [`TypeTranslator`] per `(backend, ValueType)` pair.
//!
//! The registry is populated once at startup and read-only afterwards.
//!
//! # Example
//!
//! ```
//! use mathscribe_core::ValueType;
//! use mathscribe_registry::TypeRegistry;
//!
//! let registry = TypeRegistry::with_defaults();
//!
//! let by_type = registry.get(ValueType::Real).unwrap();
//! let by_symbol = registry.get_by_symbol("ℝ").unwrap();
//! assert_eq!(by_type, by_symbol);
//! ```

use rustc_hash::FxHashMap;

use mathscribe_core::{
    DataType, DynamicConversion, RegistrationError, TypeProperties, ValueType,
};

/// Backend-specific spelling of one value type.
///
/// Implemented once per value type per backend.
pub trait TypeTranslator: Send + Sync {
    /// The type as written in the backend's output.
    fn spelling(&self) -> &str;

    /// Whether values of the type are passed by reference.
    fn prefers_reference(&self) -> bool;

    /// A declaration statement for a variable of this type.
    fn declaration(&self, name: &str) -> String;

    /// A function parameter of this type.
    fn parameter(&self, name: &str) -> String;

    /// Preamble lines (includes, helper definitions) a use of the type requires.
    fn definitions(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Declaring symbols and descriptions for the default types.
const DEFAULT_TYPES: [(ValueType, &str, Option<&str>); 12] = [
    (ValueType::None, "undetermined", None),
    (ValueType::Variant, "run-time typed value", Some("Variant")),
    (ValueType::Boolean, "boolean", Some("𝔹")),
    (ValueType::Integer, "integer", Some("ℤ")),
    (ValueType::Real, "real number", Some("ℝ")),
    (ValueType::Complex, "complex number", Some("ℂ")),
    (ValueType::Set, "finite set", Some("Set")),
    (ValueType::Tuple, "tuple", Some("Tuple")),
    (ValueType::MatrixBoolean, "boolean matrix", Some("Mat𝔹")),
    (ValueType::MatrixInteger, "integer matrix", Some("Matℤ")),
    (ValueType::MatrixReal, "real matrix", Some("Matℝ")),
    (ValueType::MatrixComplex, "complex matrix", Some("Matℂ")),
];

/// The catalog of value types.
#[derive(Default)]
pub struct TypeRegistry {
    types: FxHashMap<ValueType, DataType>,
    by_symbol: FxHashMap<String, ValueType>,
    translators: FxHashMap<(String, ValueType), Box<dyn TypeTranslator>>,
    /// Backends in the order their first translator was registered.
    backends: Vec<String>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every value type registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (value_type, description, symbol) in DEFAULT_TYPES {
            let dt = DataType::new(
                value_type,
                description,
                symbol,
                TypeProperties::defaults_for(value_type),
            );
            // Fresh registry, so neither the type nor the symbol can collide.
            let _ = registry.register(dt);
        }
        registry
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a value type.
    pub fn register_type(
        &mut self,
        value_type: ValueType,
        description: impl Into<String>,
        symbol: Option<&str>,
        properties: TypeProperties,
    ) -> Result<(), RegistrationError> {
        self.register(DataType::new(value_type, description, symbol, properties))
    }

    /// Register a prepared data type record.
    pub fn register(&mut self, data_type: DataType) -> Result<(), RegistrationError> {
        if self.types.contains_key(&data_type.value_type) {
            return Err(RegistrationError::DuplicateType(data_type.value_type));
        }
        if let Some(symbol) = &data_type.declaring_symbol {
            if self.by_symbol.contains_key(symbol) {
                return Err(RegistrationError::DuplicateTypeSymbol(symbol.clone()));
            }
            self.by_symbol.insert(symbol.clone(), data_type.value_type);
        }
        tracing::debug!(value_type = %data_type.value_type, "registered type");
        self.types.insert(data_type.value_type, data_type);
        Ok(())
    }

    /// Register the translator for `value_type` on `backend`.
    pub fn register_translator(
        &mut self,
        backend: &str,
        value_type: ValueType,
        translator: Box<dyn TypeTranslator>,
    ) -> Result<(), RegistrationError> {
        let key = (backend.to_string(), value_type);
        if self.translators.contains_key(&key) {
            return Err(RegistrationError::DuplicateTranslator {
                backend: backend.to_string(),
                value_type,
            });
        }
        if !self.backends.iter().any(|b| b == backend) {
            self.backends.push(backend.to_string());
        }
        self.translators.insert(key, translator);
        Ok(())
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get a type by value type.
    pub fn get(&self, value_type: ValueType) -> Option<&DataType> {
        self.types.get(&value_type)
    }

    /// Get a type by its declaring symbol.
    pub fn get_by_symbol(&self, symbol: &str) -> Option<&DataType> {
        self.by_symbol
            .get(symbol)
            .and_then(|value_type| self.types.get(value_type))
    }

    /// Check if a value type is registered.
    pub fn contains(&self, value_type: ValueType) -> bool {
        self.types.contains_key(&value_type)
    }

    /// Properties of a registered type; empty if unregistered.
    pub fn properties(&self, value_type: ValueType) -> TypeProperties {
        self.get(value_type)
            .map(|dt| dt.properties)
            .unwrap_or_default()
    }

    /// Registered types in tag order.
    pub fn types(&self) -> impl Iterator<Item = &DataType> {
        ValueType::ALL.iter().filter_map(|vt| self.types.get(vt))
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// The translator for `value_type` on `backend`.
    pub fn translator(
        &self,
        backend: &str,
        value_type: ValueType,
    ) -> Result<&dyn TypeTranslator, RegistrationError> {
        self.translators
            .get(&(backend.to_string(), value_type))
            .map(|t| &**t)
            .ok_or_else(|| RegistrationError::MissingTranslator {
                backend: backend.to_string(),
                value_type,
            })
    }

    /// Backends with at least one translator, in registration order.
    pub fn backends(&self) -> &[String] {
        &self.backends
    }

    /// Report every registered type, other than `None`, that lacks a
    /// translator on `backend`.
    pub fn verify_backend(&self, backend: &str) -> Vec<RegistrationError> {
        self.types()
            .map(|dt| dt.value_type)
            .filter(|&vt| vt != ValueType::None)
            .filter_map(|vt| self.translator(backend, vt).err())
            .collect()
    }

    // ==========================================================================
    // Conversions
    // ==========================================================================

    /// See [`ValueType::best_upcast`].
    pub fn best_upcast<I>(&self, types: I) -> ValueType
    where
        I: IntoIterator<Item = ValueType>,
    {
        ValueType::best_upcast(types)
    }

    /// See [`ValueType::can_dynamically_convert`].
    pub fn can_dynamically_convert(&self, from: ValueType, to: ValueType) -> DynamicConversion {
        ValueType::can_dynamically_convert(from, to)
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.len())
            .field("translators", &self.translators.len())
            .field("backends", &self.backends)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain(&'static str);

    impl TypeTranslator for Plain {
        fn spelling(&self) -> &str {
            self.0
        }

        fn prefers_reference(&self) -> bool {
            false
        }

        fn declaration(&self, name: &str) -> String {
            format!("{} {name};", self.0)
        }

        fn parameter(&self, name: &str) -> String {
            format!("{} {name}", self.0)
        }
    }

    #[test]
    fn defaults_cover_every_value_type() {
        let registry = TypeRegistry::with_defaults();
        assert_eq!(registry.type_count(), ValueType::ALL.len());
        assert!(registry.get_by_symbol("Matℂ").is_some());
        assert!(registry.get(ValueType::None).unwrap().declaring_symbol.is_none());
    }

    #[test]
    fn lookup_by_type_and_symbol_agree() {
        let mut registry = TypeRegistry::new();
        registry
            .register_type(
                ValueType::Integer,
                "whole number",
                Some("ℤ"),
                TypeProperties::ASSIGNABLE,
            )
            .unwrap();

        let by_type = registry.get(ValueType::Integer).unwrap();
        let by_symbol = registry.get_by_symbol("ℤ").unwrap();
        assert!(std::ptr::eq(by_type, by_symbol));
        assert_eq!(by_type.description, "whole number");
    }

    #[test]
    fn duplicate_type_fails() {
        let mut registry = TypeRegistry::with_defaults();
        let err = registry
            .register_type(ValueType::Real, "again", None, TypeProperties::empty())
            .unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateType(ValueType::Real));
    }

    #[test]
    fn duplicate_symbol_fails() {
        let mut registry = TypeRegistry::new();
        registry
            .register_type(ValueType::Real, "real", Some("R"), TypeProperties::empty())
            .unwrap();
        let err = registry
            .register_type(ValueType::Complex, "complex", Some("R"), TypeProperties::empty())
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateTypeSymbol(_)));
        assert!(!registry.contains(ValueType::Complex));
    }

    #[test]
    fn translators_are_unique_per_backend() {
        let mut registry = TypeRegistry::with_defaults();
        registry
            .register_translator("native", ValueType::Real, Box::new(Plain("double")))
            .unwrap();
        assert!(
            registry
                .register_translator("native", ValueType::Real, Box::new(Plain("float")))
                .is_err()
        );
        registry
            .register_translator("markup", ValueType::Real, Box::new(Plain("mn")))
            .unwrap();

        assert_eq!(registry.translator("native", ValueType::Real).unwrap().spelling(), "double");
        assert_eq!(registry.backends(), ["native", "markup"]);
    }

    #[test]
    fn missing_translator_is_reported() {
        let mut registry = TypeRegistry::with_defaults();
        registry
            .register_translator("native", ValueType::Real, Box::new(Plain("double")))
            .unwrap();

        assert!(matches!(
            registry.translator("native", ValueType::Integer),
            Err(RegistrationError::MissingTranslator { .. })
        ));
        // Eleven registered types besides None, one covered.
        assert_eq!(registry.verify_backend("native").len(), 10);
    }
}
