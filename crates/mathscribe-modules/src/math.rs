//! Scalar math: constants, elementary functions, rounding and integer helpers.

use mathscribe_core::ValueType::{Complex, Integer, Real};
use mathscribe_registry::{FunctionData, FunctionVariant, Module};

const CATEGORY: &str = "math";

fn constant(internal: &str, visible: &str, description: &str) -> FunctionData {
    FunctionData::builtin(internal, visible, CATEGORY, description)
        .variant(FunctionVariant::constant(Real))
}

/// A function of one real or complex argument.
fn elementary(name: &str, description: &str) -> FunctionData {
    FunctionData::builtin(name, name, CATEGORY, description)
        .variant(FunctionVariant::new(Real, [(Real, "x")]))
        .variant(FunctionVariant::new(Complex, [(Complex, "z")]))
}

/// A function of one real argument only.
fn real_only(name: &str, description: &str) -> FunctionData {
    FunctionData::builtin(name, name, CATEGORY, description)
        .variant(FunctionVariant::new(Real, [(Real, "x")]))
}

fn rounding(name: &str, description: &str) -> FunctionData {
    FunctionData::builtin(name, name, CATEGORY, description)
        .variant(FunctionVariant::new(Integer, [(Real, "x")]))
}

fn extremum(name: &str, description: &str) -> FunctionData {
    FunctionData::builtin(name, name, CATEGORY, description)
        .variant(FunctionVariant::new(Integer, [(Integer, "a")]).variadic())
        .variant(FunctionVariant::new(Real, [(Real, "a")]).variadic())
}

pub fn module() -> Module {
    Module::new(CATEGORY)
        .function(constant("pi", "π", "ratio of a circle's circumference to its diameter"))
        .function(constant("e", "e", "base of the natural logarithm"))
        // Trigonometric
        .function(elementary("sin", "sine"))
        .function(elementary("cos", "cosine"))
        .function(elementary("tan", "tangent"))
        .function(real_only("asin", "inverse sine"))
        .function(real_only("acos", "inverse cosine"))
        .function(real_only("atan", "inverse tangent"))
        // Exponential and logarithmic
        .function(elementary("exp", "exponential"))
        .function(elementary("ln", "natural logarithm"))
        .function(elementary("sqrt", "square root"))
        .function(
            FunctionData::builtin("log", "log", CATEGORY, "logarithm to a base")
                .variant(FunctionVariant::new(Real, [(Real, "base"), (Real, "x")])),
        )
        // Magnitude and rounding
        .function(
            FunctionData::builtin("abs", "abs", CATEGORY, "absolute value")
                .variant(FunctionVariant::new(Integer, [(Integer, "n")]))
                .variant(FunctionVariant::new(Real, [(Real, "x")]))
                .variant(FunctionVariant::new(Real, [(Complex, "z")])),
        )
        .function(rounding("floor", "round down"))
        .function(rounding("ceil", "round up"))
        .function(rounding("round", "round to nearest"))
        .function(extremum("min", "smallest argument"))
        .function(extremum("max", "largest argument"))
        .function(
            FunctionData::builtin("gcd", "gcd", CATEGORY, "greatest common divisor")
                .variant(FunctionVariant::new(Integer, [(Integer, "a"), (Integer, "b")])),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathscribe_core::{TypeProperties, ValueType};
    use mathscribe_registry::{FunctionCatalog, TypeRegistry};

    fn catalog() -> FunctionCatalog {
        let mut catalog = FunctionCatalog::new();
        module().install_into(&mut catalog).unwrap();
        catalog
    }

    #[test]
    fn constants_have_no_parameters() {
        let catalog = catalog();
        assert!(catalog.find(&"π".into()).unwrap().is_constant());
        assert!(catalog.find(&"pi".into()).unwrap().is_constant());
        assert!(!catalog.find(&"sin".into()).unwrap().is_constant());
    }

    #[test]
    fn abs_of_integer_stays_integer() {
        let types = TypeRegistry::with_defaults();
        let call = catalog()
            .resolve(&"abs".into(), TypeProperties::empty(), &[ValueType::Integer], &types)
            .unwrap();
        assert_eq!(call.return_type, ValueType::Integer);

        let call = catalog()
            .resolve(&"abs".into(), TypeProperties::empty(), &[ValueType::Complex], &types)
            .unwrap();
        assert_eq!(call.return_type, ValueType::Real);
    }

    #[test]
    fn sin_of_integer_upcasts_to_real() {
        let types = TypeRegistry::with_defaults();
        let call = catalog()
            .resolve(&"sin".into(), TypeProperties::empty(), &[ValueType::Integer], &types)
            .unwrap();
        assert_eq!(call.return_type, ValueType::Real);
    }
}
