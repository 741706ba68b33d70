//! Static typing of operators.
//!
//! [`operator_type`] computes the result type of an operator applied to
//! operand types that are already known. Operands of type `None` are the
//! caller's business: the engine skips typing when an operand failed earlier,
//! so an error is reported only once.

use mathscribe_core::{Operator, TranslationError, ValueType};

type Result<T> = std::result::Result<T, TranslationError>;

fn incompatible(op: Operator, operands: &[ValueType]) -> TranslationError {
    TranslationError::IncompatibleOperands {
        operator: op.symbol().to_string(),
        operands: operands.to_vec(),
    }
}

/// Raise booleans to integers; arithmetic never yields a boolean.
fn at_least_integer(ty: ValueType) -> ValueType {
    match ty {
        ValueType::Boolean => ValueType::Integer,
        ValueType::MatrixBoolean => ValueType::MatrixInteger,
        other => other,
    }
}

/// Raise to at least real, for division and powers.
fn at_least_real(ty: ValueType) -> ValueType {
    match ty {
        ValueType::Boolean | ValueType::Integer => ValueType::Real,
        ValueType::MatrixBoolean | ValueType::MatrixInteger => ValueType::MatrixReal,
        other => other,
    }
}

/// Result type of `op` applied to `operands`.
///
/// Fails with `IncompatibleOperands` if the operand types do not combine,
/// and with `MissingParameterOrField` if the operand count does not match
/// the operator's arity.
pub fn operator_type(op: Operator, operands: &[ValueType]) -> Result<ValueType> {
    if operands.len() != op.arity() {
        return Err(TranslationError::MissingParameterOrField("operand"));
    }
    if operands.contains(&ValueType::Variant) {
        return Ok(if op.is_comparison() || op.is_logical() {
            ValueType::Boolean
        } else {
            ValueType::Variant
        });
    }

    match op {
        Operator::Add | Operator::Subtract => additive(op, operands[0], operands[1]),
        Operator::Multiply => multiplicative(op, operands[0], operands[1]),
        Operator::Divide => divide(op, operands[0], operands[1]),
        Operator::Power => power(op, operands[0], operands[1]),
        Operator::Negate => {
            let ty = operands[0];
            if ty.is_scalar() || ty.is_matrix() {
                Ok(at_least_integer(ty))
            } else {
                Err(incompatible(op, operands))
            }
        }
        Operator::Equal | Operator::NotEqual => {
            if ValueType::best_upcast(operands.iter().copied()) == ValueType::None {
                Err(incompatible(op, operands))
            } else {
                Ok(ValueType::Boolean)
            }
        }
        Operator::Less | Operator::LessEqual | Operator::Greater | Operator::GreaterEqual => {
            let ordered = |t: ValueType| t.is_scalar() && t != ValueType::Complex;
            if operands.iter().all(|&t| ordered(t)) {
                Ok(ValueType::Boolean)
            } else {
                Err(incompatible(op, operands))
            }
        }
        Operator::And | Operator::Or | Operator::Not => {
            if operands.iter().all(|&t| t == ValueType::Boolean) {
                Ok(ValueType::Boolean)
            } else {
                Err(incompatible(op, operands))
            }
        }
    }
}

fn additive(op: Operator, a: ValueType, b: ValueType) -> Result<ValueType> {
    let both_scalar = a.is_scalar() && b.is_scalar();
    let both_matrix = a.is_matrix() && b.is_matrix();
    if !(both_scalar || both_matrix) {
        return Err(incompatible(op, &[a, b]));
    }
    Ok(at_least_integer(ValueType::best_upcast([a, b])))
}

fn multiplicative(op: Operator, a: ValueType, b: ValueType) -> Result<ValueType> {
    if (a.is_scalar() && b.is_scalar()) || (a.is_matrix() && b.is_matrix()) {
        return Ok(at_least_integer(ValueType::best_upcast([a, b])));
    }
    // Scaling a matrix by a scalar, on either side
    let scaled = match (a.element_type(), b.element_type()) {
        (Some(elem), None) if a.is_matrix() && b.is_scalar() => Some((elem, b)),
        (None, Some(elem)) if a.is_scalar() && b.is_matrix() => Some((elem, a)),
        _ => None,
    };
    scaled
        .and_then(|(elem, scalar)| ValueType::matrix_of(ValueType::best_upcast([elem, scalar])))
        .map(at_least_integer)
        .ok_or_else(|| incompatible(op, &[a, b]))
}

fn divide(op: Operator, a: ValueType, b: ValueType) -> Result<ValueType> {
    if a.is_scalar() && b.is_scalar() {
        return Ok(at_least_real(ValueType::best_upcast([a, b])));
    }
    if a.is_matrix() && b.is_scalar() {
        let elem = a.element_type().unwrap_or(ValueType::None);
        if let Some(m) = ValueType::matrix_of(ValueType::best_upcast([elem, b])) {
            return Ok(at_least_real(m));
        }
    }
    Err(incompatible(op, &[a, b]))
}

fn power(op: Operator, base: ValueType, exponent: ValueType) -> Result<ValueType> {
    if base.is_scalar() && exponent.is_scalar() {
        return Ok(at_least_real(ValueType::best_upcast([base, exponent])));
    }
    // Integer powers of a matrix
    if base.is_matrix() && matches!(exponent, ValueType::Integer | ValueType::Boolean) {
        return Ok(at_least_integer(base));
    }
    Err(incompatible(op, &[base, exponent]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ValueType::*;

    #[test]
    fn arithmetic_upcasts() {
        assert_eq!(operator_type(Operator::Add, &[Real, Integer]).unwrap(), Real);
        assert_eq!(operator_type(Operator::Add, &[Boolean, Boolean]).unwrap(), Integer);
        assert_eq!(operator_type(Operator::Multiply, &[Complex, Integer]).unwrap(), Complex);
        assert_eq!(operator_type(Operator::Divide, &[Integer, Integer]).unwrap(), Real);
        assert_eq!(operator_type(Operator::Power, &[Integer, Integer]).unwrap(), Real);
        assert_eq!(operator_type(Operator::Negate, &[Boolean]).unwrap(), Integer);
    }

    #[test]
    fn matrix_arithmetic() {
        assert_eq!(
            operator_type(Operator::Add, &[MatrixInteger, MatrixReal]).unwrap(),
            MatrixReal
        );
        assert_eq!(
            operator_type(Operator::Multiply, &[Complex, MatrixReal]).unwrap(),
            MatrixComplex
        );
        assert_eq!(
            operator_type(Operator::Divide, &[MatrixInteger, Integer]).unwrap(),
            MatrixReal
        );
        assert_eq!(
            operator_type(Operator::Power, &[MatrixReal, Integer]).unwrap(),
            MatrixReal
        );
    }

    #[test]
    fn matrix_plus_scalar_rejected() {
        let err = operator_type(Operator::Add, &[MatrixReal, Real]).unwrap_err();
        assert_eq!(
            err,
            TranslationError::IncompatibleOperands {
                operator: "+".into(),
                operands: vec![MatrixReal, Real],
            }
        );
        assert!(operator_type(Operator::Add, &[Set, Set]).is_err());
    }

    #[test]
    fn comparisons_yield_boolean() {
        assert_eq!(operator_type(Operator::Less, &[Integer, Real]).unwrap(), Boolean);
        assert_eq!(operator_type(Operator::Equal, &[Set, Set]).unwrap(), Boolean);
        assert!(operator_type(Operator::Less, &[Complex, Real]).is_err());
        assert!(operator_type(Operator::Equal, &[Set, Real]).is_err());
    }

    #[test]
    fn logic_requires_booleans() {
        assert_eq!(operator_type(Operator::And, &[Boolean, Boolean]).unwrap(), Boolean);
        assert_eq!(operator_type(Operator::Not, &[Variant]).unwrap(), Boolean);
        assert!(operator_type(Operator::Or, &[Integer, Boolean]).is_err());
    }

    #[test]
    fn variant_operands_stay_dynamic() {
        assert_eq!(operator_type(Operator::Add, &[Variant, MatrixReal]).unwrap(), Variant);
    }

    #[test]
    fn arity_checked() {
        assert_eq!(
            operator_type(Operator::Add, &[Real]).unwrap_err(),
            TranslationError::MissingParameterOrField("operand")
        );
    }
}
