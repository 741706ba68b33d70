//! Function calls and user function definitions.
//!
//! Catalog functions are called through the runtime as `rt::<internal>(...)`.
//! Global user functions become C++ functions defined ahead of the entry
//! point; functions defined inside a block become lambdas capturing by
//! reference.

use mathscribe_core::{ExprTree, NodeId, NodeKind, TranslationError, ValueType};
use mathscribe_registry::ArgConversion;

use super::{Result, declare_locals, emit_converted, require_node_type, value_or_statement};
use crate::engine::{CallTarget, Engine, Position};
use crate::symbols::IdentifierHandle;
use crate::translator::NodeTranslator;

pub struct CallTranslator;

impl NodeTranslator for CallTranslator {
    fn identify_dependencies(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        require_node_type(engine, node)
    }

    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        let arguments = engine.tree().children(node);
        let target = engine.call_target(node).cloned().ok_or_else(|| {
            TranslationError::InvalidTree(format!("call {node} was never resolved"))
        })?;

        value_or_statement(engine, node, |e| match target {
            CallTarget::Catalog(call) => {
                e.write(&format!("rt::{}(", call.internal_name));
                for (i, &argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        e.write(", ");
                    }
                    match call.conversions.get(i) {
                        Some(&ArgConversion::Dynamic { to }) => emit_converted(e, argument, to)?,
                        _ => e.emit_value(argument)?,
                    }
                }
                e.write(")");
                Ok(())
            }
            CallTarget::User(handle) => emit_user_call(e, handle, arguments),
        })
    }
}

fn emit_user_call(engine: &mut Engine<'_>, handle: IdentifierHandle, arguments: &[NodeId]) -> Result<()> {
    let spelling = engine.identifier(handle)?.spelling.clone();
    let parameter_types = engine
        .user_function(handle)
        .map(|f| {
            f.parameters
                .iter()
                .map(|&p| engine.identifier(p).map(|i| i.value_type))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    engine.write(&spelling);
    engine.write("(");
    for (i, &argument) in arguments.iter().enumerate() {
        if i > 0 {
            engine.write(", ");
        }
        let to = parameter_types.get(i).copied().unwrap_or(ValueType::Variant);
        emit_converted(engine, argument, to)?;
    }
    engine.write(")");
    Ok(())
}

pub struct FunctionTranslator;

impl NodeTranslator for FunctionTranslator {
    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        if engine.position() == Position::Value {
            return Err(TranslationError::InvalidTree(
                "a function definition has no value".into(),
            ));
        }
        // Global functions are emitted out of line
        if engine.is_top_level(node) {
            return Ok(());
        }

        let signature = Signature::of(engine, node)?;
        engine.write(&format!(
            "auto {} = [&]({}) -> {} {{",
            signature.name,
            signature.parameters.join(", "),
            signature.return_type
        ));
        engine.newline();
        emit_function_body(engine, node, &signature)?;
        engine.line("};");
        Ok(())
    }

    fn emit_definitions(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        let signature = Signature::of(engine, node)?;
        engine.line(&format!("{} {{", signature.declarator()));
        emit_function_body(engine, node, &signature)?;
        engine.line("}");
        Ok(())
    }
}

/// Emit the declaration of a global function.
pub(super) fn emit_prototype(engine: &mut Engine<'_>, node: NodeId) -> Result<()> {
    let signature = Signature::of(engine, node)?;
    engine.line(&format!("{};", signature.declarator()));
    Ok(())
}

/// Spelled-out signature of a user function.
struct Signature {
    name: String,
    parameters: Vec<String>,
    return_type: String,
    returns: ValueType,
    parameter_handles: Vec<IdentifierHandle>,
}

impl Signature {
    fn of(engine: &Engine<'_>, node: NodeId) -> Result<Self> {
        let (handle, function) = engine.function_at(node).ok_or_else(|| {
            TranslationError::InvalidTree(format!("function {node} was never declared"))
        })?;
        let ident = engine.identifier(handle)?;

        let mut parameters = Vec::with_capacity(function.parameters.len());
        for &p in &function.parameters {
            let param = engine.identifier(p)?;
            parameters.push(engine.type_translator(param.value_type)?.parameter(&param.spelling));
        }

        Ok(Self {
            name: ident.spelling.clone(),
            parameters,
            return_type: engine.spelling(ident.value_type)?,
            returns: ident.value_type,
            parameter_handles: function.parameters.clone(),
        })
    }

    fn declarator(&self) -> String {
        format!(
            "{} {}({})",
            self.return_type,
            self.name,
            self.parameters.join(", ")
        )
    }
}

/// Locals, statements and the `return` of a function, one level in.
fn emit_function_body(engine: &mut Engine<'_>, node: NodeId, signature: &Signature) -> Result<()> {
    let Some(&body) = engine.tree().children(node).last() else {
        return Err(TranslationError::MissingParameterOrField("function body"));
    };
    engine.indent();
    engine.scoped(node, |e| {
        declare_locals(e, node, &signature.parameter_handles)?;
        emit_returning(e, body, signature.returns)
    })?;
    engine.dedent();
    Ok(())
}

/// Emit `node` so that its value is returned as `returns`.
pub(super) fn emit_returning(engine: &mut Engine<'_>, node: NodeId, returns: ValueType) -> Result<()> {
    let tree = engine.tree();
    match tree.kind(node) {
        Some(NodeKind::Block) => engine.scoped(node, |e| {
            declare_locals(e, node, &[])?;
            let children = tree.children(node);
            let Some((&last, statements)) = children.split_last() else {
                e.line("return {};");
                return Ok(());
            };
            for &statement in statements {
                e.emit_statement(statement)?;
            }
            emit_returning(e, last, returns)
        }),
        Some(kind) if kind.is_statement() || !has_value(tree, node, kind) => {
            engine.emit_statement(node)?;
            engine.line("return {};");
            Ok(())
        }
        _ => {
            engine.write("return ");
            emit_converted(engine, node, returns)?;
            engine.line(";");
            Ok(())
        }
    }
}

/// Check if a non-statement node yields a value in every case.
fn has_value(tree: &ExprTree, node: NodeId, kind: &NodeKind) -> bool {
    match kind {
        NodeKind::Placeholder => false,
        NodeKind::Conditional => tree.children(node).len() == 3,
        _ => true,
    }
}
