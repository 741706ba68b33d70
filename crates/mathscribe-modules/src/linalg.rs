//! Linear algebra over matrix values.

use mathscribe_core::ValueType::{
    Complex, Integer, MatrixBoolean, MatrixComplex, MatrixInteger, MatrixReal, Real, Variant,
};
use mathscribe_registry::{FunctionData, FunctionVariant, Module};

const CATEGORY: &str = "linalg";

/// Matrix in, same matrix type out, for every element type.
fn shape_preserving(name: &str, description: &str) -> FunctionData {
    [MatrixBoolean, MatrixInteger, MatrixReal, MatrixComplex]
        .into_iter()
        .fold(
            FunctionData::builtin(name, name, CATEGORY, description),
            |f, m| f.variant(FunctionVariant::new(m, [(m, "m")])),
        )
}

/// Square-matrix reduction to a scalar.
fn reduction(name: &str, description: &str) -> FunctionData {
    FunctionData::builtin(name, name, CATEGORY, description)
        .variant(FunctionVariant::new(Real, [(MatrixReal, "m")]))
        .variant(FunctionVariant::new(Complex, [(MatrixComplex, "m")]))
}

fn dimension(name: &str, description: &str) -> FunctionData {
    FunctionData::builtin(name, name, CATEGORY, description)
        .variant(FunctionVariant::new(Integer, [(Variant, "m")]))
}

pub fn module() -> Module {
    Module::new(CATEGORY)
        .function(reduction("det", "determinant"))
        .function(reduction("trace", "sum of the diagonal"))
        .function(shape_preserving("transpose", "transpose"))
        .function(
            FunctionData::builtin("inverse", "inverse", CATEGORY, "matrix inverse")
                .variant(FunctionVariant::new(MatrixReal, [(MatrixReal, "m")]))
                .variant(FunctionVariant::new(MatrixComplex, [(MatrixComplex, "m")])),
        )
        .function(dimension("rows", "number of rows"))
        .function(dimension("cols", "number of columns"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathscribe_core::{TypeProperties, ValueType};
    use mathscribe_registry::{FunctionCatalog, TypeRegistry};

    #[test]
    fn integer_matrix_determinant_upcasts() {
        let mut catalog = FunctionCatalog::new();
        module().install_into(&mut catalog).unwrap();
        let types = TypeRegistry::with_defaults();

        let call = catalog
            .resolve(&"det".into(), TypeProperties::empty(), &[ValueType::MatrixInteger], &types)
            .unwrap();
        assert_eq!(call.return_type, ValueType::Real);

        let call = catalog
            .resolve(&"transpose".into(), TypeProperties::MATRIX, &[ValueType::MatrixBoolean], &types)
            .unwrap();
        assert_eq!(call.return_type, ValueType::MatrixBoolean);
    }

    #[test]
    fn rows_accepts_anything() {
        let mut catalog = FunctionCatalog::new();
        module().install_into(&mut catalog).unwrap();
        let types = TypeRegistry::with_defaults();

        let call = catalog
            .resolve(&"rows".into(), TypeProperties::empty(), &[ValueType::Tuple], &types)
            .unwrap();
        assert_eq!(call.return_type, ValueType::Integer);
    }
}
