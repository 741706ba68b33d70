//! Registered type records.
//!
//! A [`DataType`] is the registry's description of one [`ValueType`]: a
//! human-readable description, the symbol a document uses to declare it
//! (`ℝ`, `ℤ`, ...), and a set of [`TypeProperties`].

use bitflags::bitflags;

use crate::ValueType;

bitflags! {
    /// Properties of a value type.
    ///
    /// Also used as the capability mask a function's return type must
    /// satisfy during overload resolution.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeProperties: u8 {
        /// Values of this type can be assigned to a variable.
        const ASSIGNABLE = 1 << 0;
        /// The type is a matrix.
        const MATRIX = 1 << 1;
        /// The type can be iterated.
        const CONTAINER = 1 << 2;
        /// The concrete type is decided at run time.
        const VARIANT = 1 << 3;
    }
}

impl TypeProperties {
    /// The properties a value type has when registered with defaults.
    pub fn defaults_for(value_type: ValueType) -> Self {
        match value_type {
            ValueType::None => TypeProperties::empty(),
            ValueType::Variant => TypeProperties::ASSIGNABLE | TypeProperties::VARIANT,
            ValueType::Boolean | ValueType::Integer | ValueType::Real | ValueType::Complex => {
                TypeProperties::ASSIGNABLE
            }
            ValueType::Set | ValueType::Tuple => {
                TypeProperties::ASSIGNABLE | TypeProperties::CONTAINER
            }
            ValueType::MatrixBoolean
            | ValueType::MatrixInteger
            | ValueType::MatrixReal
            | ValueType::MatrixComplex => {
                TypeProperties::ASSIGNABLE | TypeProperties::MATRIX | TypeProperties::CONTAINER
            }
        }
    }
}

/// A registered value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    /// The value type this record describes.
    pub value_type: ValueType,
    /// Description shown to users.
    pub description: String,
    /// Symbol used in documents to declare a quantity of this type.
    pub declaring_symbol: Option<String>,
    /// Type properties.
    pub properties: TypeProperties,
}

impl DataType {
    /// Create a new data type record.
    pub fn new(
        value_type: ValueType,
        description: impl Into<String>,
        declaring_symbol: Option<&str>,
        properties: TypeProperties,
    ) -> Self {
        Self {
            value_type,
            description: description.into(),
            declaring_symbol: declaring_symbol.map(str::to_string),
            properties,
        }
    }

    /// Create a record with default properties and no declaring symbol.
    pub fn simple(value_type: ValueType, description: impl Into<String>) -> Self {
        Self::new(
            value_type,
            description,
            None,
            TypeProperties::defaults_for(value_type),
        )
    }

    /// Check if values of this type can be assigned.
    #[inline]
    pub fn is_assignable(&self) -> bool {
        self.properties.contains(TypeProperties::ASSIGNABLE)
    }

    /// Check if this type is a matrix.
    #[inline]
    pub fn is_matrix(&self) -> bool {
        self.properties.contains(TypeProperties::MATRIX)
    }

    /// Check if this type can be iterated.
    #[inline]
    pub fn is_container(&self) -> bool {
        self.properties.contains(TypeProperties::CONTAINER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_defaults() {
        let props = TypeProperties::defaults_for(ValueType::MatrixReal);
        assert!(props.contains(TypeProperties::MATRIX | TypeProperties::CONTAINER));
        assert!(!props.contains(TypeProperties::VARIANT));
    }

    #[test]
    fn none_has_no_properties() {
        assert!(TypeProperties::defaults_for(ValueType::None).is_empty());
    }

    #[test]
    fn simple_record() {
        let dt = DataType::simple(ValueType::Set, "finite set");
        assert!(dt.is_container());
        assert!(dt.is_assignable());
        assert!(!dt.is_matrix());
        assert_eq!(dt.declaring_symbol, None);
    }
}
