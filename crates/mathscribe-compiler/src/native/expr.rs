//! Literals, variables and operators.

use mathscribe_core::{LiteralValue, NodeId, NodeKind, Operator, TranslationError, ValueType};

use super::{Result, require_node_type, value_or_statement, variable_spelling};
use crate::engine::{CallTarget, Engine, Position};
use crate::translator::NodeTranslator;

pub struct PlaceholderTranslator;

impl NodeTranslator for PlaceholderTranslator {
    fn emit_body(&self, _node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        match engine.position() {
            Position::Statement => Ok(()),
            Position::Value => Err(TranslationError::MissingParameterOrField("value")),
        }
    }
}

pub struct LiteralTranslator;

impl NodeTranslator for LiteralTranslator {
    fn identify_dependencies(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        require_node_type(engine, node)
    }

    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        let Some(NodeKind::Literal(literal)) = engine.tree().kind(node) else {
            return Err(TranslationError::InvalidTree(format!("{node} is not a literal")));
        };
        let text = match literal.parse() {
            Some(LiteralValue::Boolean(b)) => b.to_string(),
            Some(LiteralValue::Integer(i)) => i.to_string(),
            Some(LiteralValue::Real(r)) => format!("{:?}", r.into_inner()),
            Some(LiteralValue::Imaginary(c)) => {
                format!("std::complex<double>(0.0, {:?})", c.into_inner())
            }
            None => return Err(TranslationError::MalformedLiteralValue(literal.text.clone())),
        };
        value_or_statement(engine, node, |e| {
            e.write(&text);
            Ok(())
        })
    }
}

pub struct VariableTranslator;

impl NodeTranslator for VariableTranslator {
    fn identify_dependencies(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        require_node_type(engine, node)
    }

    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        // A bare reference to a catalog constant such as π
        let text = match engine.call_target(node) {
            Some(CallTarget::Catalog(call)) => format!("rt::{}()", call.internal_name),
            _ => variable_spelling(engine, node)?,
        };
        value_or_statement(engine, node, |e| {
            e.write(&text);
            Ok(())
        })
    }
}

pub struct OperatorTranslator;

impl NodeTranslator for OperatorTranslator {
    fn identify_dependencies(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        require_node_type(engine, node)
    }

    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        let Some(&NodeKind::Operator(op)) = engine.tree().kind(node) else {
            return Err(TranslationError::InvalidTree(format!("{node} is not an operator")));
        };
        let operands = engine.tree().children(node);
        if operands.len() != op.arity() {
            return Err(TranslationError::MissingParameterOrField("operand"));
        }
        value_or_statement(engine, node, |e| emit_operator(e, node, op, operands))
    }
}

fn emit_operator(engine: &mut Engine<'_>, node: NodeId, op: Operator, operands: &[NodeId]) -> Result<()> {
    let result = engine.static_type(node);
    match (op, operands) {
        (Operator::Power, &[base, exponent]) => {
            engine.write("rt::pow(");
            emit_operand(engine, base, result, false)?;
            engine.write(", ");
            engine.emit_value(exponent)?;
            engine.write(")");
        }
        (Operator::Divide, &[a, b]) if is_integral_division(engine, a, b, result) => {
            engine.write("static_cast<double>(");
            engine.emit_value(a)?;
            engine.write(") / ");
            emit_operand(engine, b, result, needs_parens(engine, op, b, 1))?;
        }
        (_, &[operand]) => {
            engine.write(op.symbol());
            // `--x` would read as a decrement
            let parens = match engine.tree().kind(operand) {
                Some(NodeKind::Operator(inner)) => *inner != Operator::Power,
                Some(NodeKind::Literal(literal)) => literal.text.trim_start().starts_with('-'),
                _ => false,
            };
            emit_operand(engine, operand, result, parens)?;
        }
        (_, &[a, b]) => {
            emit_operand(engine, a, result, needs_parens(engine, op, a, 0))?;
            engine.write(&format!(" {} ", op.symbol()));
            emit_operand(engine, b, result, needs_parens(engine, op, b, 1))?;
        }
        _ => return Err(TranslationError::MissingParameterOrField("operand")),
    }
    Ok(())
}

/// Both operands are integral but the quotient is real.
fn is_integral_division(engine: &Engine<'_>, a: NodeId, b: NodeId, result: ValueType) -> bool {
    let integral = |n| matches!(engine.static_type(n), ValueType::Integer | ValueType::Boolean);
    result == ValueType::Real && integral(a) && integral(b)
}

/// Check if an operand must be parenthesised under `op`.
fn needs_parens(engine: &Engine<'_>, op: Operator, operand: NodeId, slot: usize) -> bool {
    let Some(&NodeKind::Operator(inner)) = engine.tree().kind(operand) else {
        return false;
    };
    if inner == Operator::Power {
        return false;
    }
    let left_associative_only = matches!(op, Operator::Subtract | Operator::Divide);
    inner.precedence() < op.precedence()
        || (inner.precedence() == op.precedence() && slot == 1 && left_associative_only)
}

/// Emit an operand, widening real operands of a complex result since
/// `std::complex` arithmetic does not mix element types.
fn emit_operand(engine: &mut Engine<'_>, operand: NodeId, result: ValueType, parens: bool) -> Result<()> {
    let operand_type = engine.static_type(operand);
    let widen = result == ValueType::Complex
        && operand_type.is_scalar()
        && operand_type != ValueType::Complex;
    if widen {
        engine.write("std::complex<double>(");
    } else if parens {
        engine.write("(");
    }
    engine.emit_value(operand)?;
    if widen || parens {
        engine.write(")");
    }
    Ok(())
}
