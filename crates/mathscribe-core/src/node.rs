//! Node kinds of the expression tree.
//!
//! [`NodeKind`] is a closed union; [`NodeKindTag`] is its field-less mirror
//! used to key backend translator tables.

use std::fmt;

use ordered_float::OrderedFloat;

use crate::{ValueType, VariableName};

/// The kind of an expression-tree node, with kind-specific data.
///
/// Child layout per kind:
///
/// | Kind             | Children                                   |
/// |------------------|--------------------------------------------|
/// | `Root`, `Block`  | statements                                 |
/// | `Operator`       | operands                                   |
/// | `FunctionCall`   | arguments                                  |
/// | `FunctionDef`    | parameters..., body                        |
/// | `Assignment`     | target, value                              |
/// | `TypeAnnotation` | target                                     |
/// | `Range`          | first, [second], end                       |
/// | `Matrix`         | `rows * cols` cells, row-major             |
/// | `Set`, `Tuple`   | elements                                   |
/// | `ForEach`        | binding, iterable, body                    |
/// | `While`          | condition, body                            |
/// | `Conditional`    | condition, then, [else]                    |
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The document root.
    Root,
    /// A compound block whose value is its last statement.
    Block,
    /// An empty slot left by the editor.
    Placeholder,
    /// A literal constant.
    Literal(Literal),
    /// A reference to a named quantity.
    Variable(VariableName),
    /// An operator application.
    Operator(Operator),
    /// A call to a user or catalog function.
    FunctionCall(VariableName),
    /// A function definition.
    FunctionDef(VariableName),
    /// `target = value`.
    Assignment,
    /// Explicit type declaration, e.g. `x ∈ ℝ`. Holds the type's declaring symbol.
    TypeAnnotation(String),
    /// A range with an implicit or explicit step.
    Range,
    /// A matrix literal.
    Matrix { rows: usize, cols: usize },
    /// A set literal.
    Set,
    /// A tuple literal.
    Tuple,
    /// Iterate a bound variable over an iterable.
    ForEach,
    /// Loop while a condition holds.
    While,
    /// If/else.
    Conditional,
}

/// Field-less tag of a [`NodeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKindTag {
    Root,
    Block,
    Placeholder,
    Literal,
    Variable,
    Operator,
    FunctionCall,
    FunctionDef,
    Assignment,
    TypeAnnotation,
    Range,
    Matrix,
    Set,
    Tuple,
    ForEach,
    While,
    Conditional,
}

impl NodeKindTag {
    /// Every tag.
    pub const ALL: [NodeKindTag; 17] = [
        NodeKindTag::Root,
        NodeKindTag::Block,
        NodeKindTag::Placeholder,
        NodeKindTag::Literal,
        NodeKindTag::Variable,
        NodeKindTag::Operator,
        NodeKindTag::FunctionCall,
        NodeKindTag::FunctionDef,
        NodeKindTag::Assignment,
        NodeKindTag::TypeAnnotation,
        NodeKindTag::Range,
        NodeKindTag::Matrix,
        NodeKindTag::Set,
        NodeKindTag::Tuple,
        NodeKindTag::ForEach,
        NodeKindTag::While,
        NodeKindTag::Conditional,
    ];
}

impl NodeKind {
    /// The field-less tag for this kind.
    pub fn tag(&self) -> NodeKindTag {
        match self {
            NodeKind::Root => NodeKindTag::Root,
            NodeKind::Block => NodeKindTag::Block,
            NodeKind::Placeholder => NodeKindTag::Placeholder,
            NodeKind::Literal(_) => NodeKindTag::Literal,
            NodeKind::Variable(_) => NodeKindTag::Variable,
            NodeKind::Operator(_) => NodeKindTag::Operator,
            NodeKind::FunctionCall(_) => NodeKindTag::FunctionCall,
            NodeKind::FunctionDef(_) => NodeKindTag::FunctionDef,
            NodeKind::Assignment => NodeKindTag::Assignment,
            NodeKind::TypeAnnotation(_) => NodeKindTag::TypeAnnotation,
            NodeKind::Range => NodeKindTag::Range,
            NodeKind::Matrix { .. } => NodeKindTag::Matrix,
            NodeKind::Set => NodeKindTag::Set,
            NodeKind::Tuple => NodeKindTag::Tuple,
            NodeKind::ForEach => NodeKindTag::ForEach,
            NodeKind::While => NodeKindTag::While,
            NodeKind::Conditional => NodeKindTag::Conditional,
        }
    }

    /// Check if nodes of this kind own a lexical scope.
    pub fn introduces_scope(&self) -> bool {
        matches!(
            self,
            NodeKind::Root
                | NodeKind::Block
                | NodeKind::FunctionDef(_)
                | NodeKind::ForEach
                | NodeKind::While
        )
    }

    /// Check if this kind is a statement rather than a value-producing expression.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Root
                | NodeKind::Assignment
                | NodeKind::TypeAnnotation(_)
                | NodeKind::FunctionDef(_)
                | NodeKind::ForEach
                | NodeKind::While
        )
    }
}

/// Operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Negate,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    Not,
}

impl Operator {
    /// Number of operands.
    pub fn arity(self) -> usize {
        match self {
            Operator::Negate | Operator::Not => 1,
            _ => 2,
        }
    }

    /// Source-level symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract | Operator::Negate => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "^",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Not => "!",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Or => 1,
            Operator::And => 2,
            Operator::Equal | Operator::NotEqual => 3,
            Operator::Less | Operator::LessEqual | Operator::Greater | Operator::GreaterEqual => 4,
            Operator::Add | Operator::Subtract => 5,
            Operator::Multiply | Operator::Divide => 6,
            Operator::Negate | Operator::Not => 7,
            Operator::Power => 8,
        }
    }

    /// Check if this is an arithmetic operator.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add
                | Operator::Subtract
                | Operator::Multiply
                | Operator::Divide
                | Operator::Power
                | Operator::Negate
        )
    }

    /// Check if this is a comparison operator.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::NotEqual
                | Operator::Less
                | Operator::LessEqual
                | Operator::Greater
                | Operator::GreaterEqual
        )
    }

    /// Check if this is a logical operator.
    pub fn is_logical(self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Not)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Lexical category of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Boolean,
    Integer,
    Real,
    /// Imaginary part of a complex number; the text is the coefficient.
    Imaginary,
}

impl LiteralKind {
    /// The value type a literal of this kind has.
    pub fn value_type(self) -> ValueType {
        match self {
            LiteralKind::Boolean => ValueType::Boolean,
            LiteralKind::Integer => ValueType::Integer,
            LiteralKind::Real => ValueType::Real,
            LiteralKind::Imaginary => ValueType::Complex,
        }
    }
}

/// A literal as typed in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: String,
}

/// A parsed literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Boolean(bool),
    Integer(i64),
    Real(OrderedFloat<f64>),
    Imaginary(OrderedFloat<f64>),
}

impl Literal {
    /// Create a literal.
    pub fn new(kind: LiteralKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Parse the literal text.
    ///
    /// Returns `None` if the text is not a valid literal of its kind or
    /// denotes a non-finite number. An empty imaginary coefficient means 1.
    pub fn parse(&self) -> Option<LiteralValue> {
        let text = self.text.trim();
        match self.kind {
            LiteralKind::Boolean => match text {
                "true" => Some(LiteralValue::Boolean(true)),
                "false" => Some(LiteralValue::Boolean(false)),
                _ => None,
            },
            LiteralKind::Integer => text.parse::<i64>().ok().map(LiteralValue::Integer),
            LiteralKind::Real => parse_finite(text).map(LiteralValue::Real),
            LiteralKind::Imaginary if text.is_empty() => {
                Some(LiteralValue::Imaginary(OrderedFloat(1.0)))
            }
            LiteralKind::Imaginary => parse_finite(text).map(LiteralValue::Imaginary),
        }
    }
}

fn parse_finite(text: &str) -> Option<OrderedFloat<f64>> {
    let value = text.parse::<f64>().ok()?;
    value.is_finite().then_some(OrderedFloat(value))
}

impl LiteralValue {
    /// The value as a real number, if it is real-valued.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            LiteralValue::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
            LiteralValue::Integer(i) => Some(i as f64),
            LiteralValue::Real(r) => Some(r.into_inner()),
            LiteralValue::Imaginary(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_cover_all_kinds() {
        assert_eq!(NodeKind::Matrix { rows: 1, cols: 1 }.tag(), NodeKindTag::Matrix);
        assert_eq!(
            NodeKind::TypeAnnotation("ℝ".into()).tag(),
            NodeKindTag::TypeAnnotation
        );
        assert_eq!(NodeKindTag::ALL.len(), 17);
    }

    #[test]
    fn scopes() {
        assert!(NodeKind::Block.introduces_scope());
        assert!(NodeKind::ForEach.introduces_scope());
        assert!(!NodeKind::Conditional.introduces_scope());
        assert!(!NodeKind::Assignment.introduces_scope());
    }

    #[test]
    fn parse_literals() {
        let int = Literal::new(LiteralKind::Integer, "42");
        assert_eq!(int.parse(), Some(LiteralValue::Integer(42)));

        let real = Literal::new(LiteralKind::Real, "2.5");
        assert_eq!(real.parse(), Some(LiteralValue::Real(OrderedFloat(2.5))));

        let imag = Literal::new(LiteralKind::Imaginary, "");
        assert_eq!(imag.parse(), Some(LiteralValue::Imaginary(OrderedFloat(1.0))));
    }

    #[test]
    fn malformed_literals() {
        assert_eq!(Literal::new(LiteralKind::Integer, "4x").parse(), None);
        assert_eq!(Literal::new(LiteralKind::Real, "inf").parse(), None);
        assert_eq!(Literal::new(LiteralKind::Boolean, "yes").parse(), None);
    }

    #[test]
    fn operator_metadata() {
        assert_eq!(Operator::Negate.arity(), 1);
        assert!(Operator::Power.precedence() > Operator::Multiply.precedence());
        assert!(Operator::Less.is_comparison());
        assert!(Operator::Not.is_logical());
    }
}
