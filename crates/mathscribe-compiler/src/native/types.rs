//! C++ spellings of the value types.

use mathscribe_core::{RegistrationError, ValueType};
use mathscribe_registry::{TypeRegistry, TypeTranslator};

use super::NATIVE;

/// Spelling of one value type in the generated C++.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    spelling: &'static str,
    by_reference: bool,
    definitions: &'static [&'static str],
}

impl NativeType {
    const fn value(spelling: &'static str) -> Self {
        Self {
            spelling,
            by_reference: false,
            definitions: &[],
        }
    }

    const fn reference(spelling: &'static str) -> Self {
        Self {
            spelling,
            by_reference: true,
            definitions: &[],
        }
    }

    const fn with_definitions(mut self, definitions: &'static [&'static str]) -> Self {
        self.definitions = definitions;
        self
    }

    /// The native type for `value_type`; `None` has no spelling.
    pub fn for_value_type(value_type: ValueType) -> Option<Self> {
        const COMPLEX: &[&str] = &["#include <complex>"];
        let native = match value_type {
            ValueType::None => return None,
            ValueType::Boolean => Self::value("bool"),
            ValueType::Integer => Self::value("long long"),
            ValueType::Real => Self::value("double"),
            ValueType::Complex => Self::value("std::complex<double>").with_definitions(COMPLEX),
            ValueType::Set => Self::reference("rt::Set"),
            ValueType::Tuple => Self::reference("rt::Tuple"),
            ValueType::MatrixBoolean => Self::reference("rt::Matrix<bool>"),
            ValueType::MatrixInteger => Self::reference("rt::Matrix<long long>"),
            ValueType::MatrixReal => Self::reference("rt::Matrix<double>"),
            ValueType::MatrixComplex => {
                Self::reference("rt::Matrix<std::complex<double>>").with_definitions(COMPLEX)
            }
            ValueType::Variant => Self::reference("rt::Variant"),
        };
        Some(native)
    }
}

impl TypeTranslator for NativeType {
    fn spelling(&self) -> &str {
        self.spelling
    }

    fn prefers_reference(&self) -> bool {
        self.by_reference
    }

    fn declaration(&self, name: &str) -> String {
        format!("{} {name};", self.spelling)
    }

    fn parameter(&self, name: &str) -> String {
        if self.by_reference {
            format!("const {}& {name}", self.spelling)
        } else {
            format!("{} {name}", self.spelling)
        }
    }

    fn definitions(&self) -> Vec<String> {
        self.definitions.iter().map(|d| d.to_string()).collect()
    }
}

/// Register a native translator for every value type except `None`.
pub fn register_types(types: &mut TypeRegistry) -> Result<(), RegistrationError> {
    for value_type in ValueType::ALL {
        if let Some(native) = NativeType::for_value_type(value_type) {
            types.register_translator(NATIVE, value_type, Box::new(native))?;
        }
    }
    tracing::debug!(backend = NATIVE, "registered type translators");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_by_value_collections_by_reference() {
        let real = NativeType::for_value_type(ValueType::Real).unwrap();
        assert_eq!(real.declaration("x"), "double x;");
        assert_eq!(real.parameter("x"), "double x");

        let set = NativeType::for_value_type(ValueType::Set).unwrap();
        assert!(set.prefers_reference());
        assert_eq!(set.parameter("s"), "const rt::Set& s");
    }

    #[test]
    fn complex_needs_header() {
        let complex = NativeType::for_value_type(ValueType::MatrixComplex).unwrap();
        assert_eq!(complex.definitions(), ["#include <complex>"]);
        assert!(NativeType::for_value_type(ValueType::None).is_none());
    }

    #[test]
    fn registry_covers_every_type() {
        let mut types = TypeRegistry::with_defaults();
        register_types(&mut types).unwrap();
        assert!(types.verify_backend(NATIVE).is_empty());
        assert!(register_types(&mut types).is_err());
    }
}
