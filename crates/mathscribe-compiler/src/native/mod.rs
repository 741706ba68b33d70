//! The native backend: C++ source against the `rt::` runtime library.
//!
//! Top-level statements become the body of a `void evaluate()` function.
//! Global variables and global functions are emitted at file scope ahead of
//! it, so functions can refer to globals assigned by the entry point.
//!
//! ```text
//! #include "mathscribe/runtime.hpp"
//!
//! double x;
//!
//! void evaluate() {
//!     x = 1.5;
//!     rt::print(x * 2);
//! }
//! ```

mod calls;
mod collections;
mod expr;
mod lowering;
mod stmt;
mod types;

pub use types::{NativeType, register_types};

use mathscribe_core::{DynamicConversion, NodeId, NodeKind, NodeKindTag, TranslationError, ValueType};

use crate::engine::{Engine, Position};
use crate::symbols::IdentifierHandle;
use crate::translator::TranslatorTable;

type Result<T> = std::result::Result<T, TranslationError>;

/// Backend name of the native target.
pub const NATIVE: &str = "native";

/// Register a translator for every node kind.
pub fn register_nodes(table: &mut TranslatorTable) {
    table.register(NATIVE, NodeKindTag::Root, Box::new(stmt::RootTranslator));
    table.register(NATIVE, NodeKindTag::Block, Box::new(stmt::BlockTranslator));
    table.register(NATIVE, NodeKindTag::Placeholder, Box::new(expr::PlaceholderTranslator));
    table.register(NATIVE, NodeKindTag::Literal, Box::new(expr::LiteralTranslator));
    table.register(NATIVE, NodeKindTag::Variable, Box::new(expr::VariableTranslator));
    table.register(NATIVE, NodeKindTag::Operator, Box::new(expr::OperatorTranslator));
    table.register(NATIVE, NodeKindTag::FunctionCall, Box::new(calls::CallTranslator));
    table.register(NATIVE, NodeKindTag::FunctionDef, Box::new(calls::FunctionTranslator));
    table.register(NATIVE, NodeKindTag::Assignment, Box::new(stmt::AssignmentTranslator));
    table.register(NATIVE, NodeKindTag::TypeAnnotation, Box::new(stmt::AnnotationTranslator));
    table.register(NATIVE, NodeKindTag::Range, Box::new(collections::RangeTranslator));
    table.register(NATIVE, NodeKindTag::Matrix, Box::new(collections::MatrixTranslator));
    table.register(NATIVE, NodeKindTag::Set, Box::new(collections::SetTranslator));
    table.register(NATIVE, NodeKindTag::Tuple, Box::new(collections::TupleTranslator));
    table.register(NATIVE, NodeKindTag::ForEach, Box::new(lowering::ForEachTranslator));
    table.register(NATIVE, NodeKindTag::While, Box::new(stmt::WhileTranslator));
    table.register(NATIVE, NodeKindTag::Conditional, Box::new(stmt::ConditionalTranslator));
    tracing::debug!(backend = NATIVE, "registered node translators");
}

// ==========================================================================
// Shared helpers
// ==========================================================================

/// Note the static type of `node` as a dependency of the output.
fn require_node_type(engine: &mut Engine<'_>, node: NodeId) -> Result<()> {
    let value_type = engine.static_type(node);
    engine.require_type(value_type);
    Ok(())
}

/// Check if the value of `node` is a result the document shows: a top-level
/// expression, or the final value of a block or branch that is one.
fn shows_result(engine: &Engine<'_>, node: NodeId) -> bool {
    let tree = engine.tree();
    let Some(parent) = tree.parent(node) else {
        return false;
    };
    match tree.kind(parent) {
        Some(NodeKind::Root) => true,
        Some(NodeKind::Block) => {
            tree.children(parent).last() == Some(&node) && shows_result(engine, parent)
        }
        Some(NodeKind::Conditional) => {
            tree.slot_of(node).is_some_and(|slot| slot > 0) && shows_result(engine, parent)
        }
        _ => false,
    }
}

/// Emit an expression node in either position.
///
/// In statement position the expression is terminated, and printed if it is
/// a shown result.
fn value_or_statement(
    engine: &mut Engine<'_>,
    node: NodeId,
    emit: impl FnOnce(&mut Engine<'_>) -> Result<()>,
) -> Result<()> {
    if engine.position() == Position::Value {
        return emit(engine);
    }
    let print = engine.options().print_results && shows_result(engine, node);
    if print {
        engine.write("rt::print(");
    }
    emit(engine)?;
    if print {
        engine.write(")");
    }
    engine.line(";");
    Ok(())
}

/// Emit `node` as a value of type `to`, with a checked conversion where
/// only the run-time value can tell whether it fits.
fn emit_converted(engine: &mut Engine<'_>, node: NodeId, to: ValueType) -> Result<()> {
    let from = engine.static_type(node);
    let checked = from != to
        && to != ValueType::None
        && engine.types().can_dynamically_convert(from, to) == DynamicConversion::Sometimes;
    if !checked {
        return engine.emit_value(node);
    }
    let spelling = engine.spelling(to)?;
    engine.write(&format!("rt::convert<{spelling}>("));
    engine.emit_value(node)?;
    engine.write(")");
    Ok(())
}

/// Emit `node` with an explicit cast when its type differs from `to`.
fn emit_cast(engine: &mut Engine<'_>, node: NodeId, to: ValueType) -> Result<()> {
    let from = engine.static_type(node);
    if from == to || to == ValueType::Variant {
        return engine.emit_value(node);
    }
    let spelling = engine.spelling(to)?;
    engine.write(&format!("static_cast<{spelling}>("));
    engine.emit_value(node)?;
    engine.write(")");
    Ok(())
}

/// Declare the variables owned by `scope`, except those in `skip`.
fn declare_locals(
    engine: &mut Engine<'_>,
    scope: NodeId,
    skip: &[IdentifierHandle],
) -> Result<()> {
    let declarations = engine
        .symbols()
        .identifiers_in_scope(scope)
        .filter(|i| i.defined_as.is_variable() && !skip.contains(&i.handle))
        .map(|i| Ok(engine.type_translator(i.value_type)?.declaration(&i.spelling)))
        .collect::<Result<Vec<String>>>()?;
    for declaration in declarations {
        engine.line(&declaration);
    }
    Ok(())
}

/// Emit the statements of a loop or branch body, flattening a block body
/// into the surrounding braces.
fn emit_scope_body(engine: &mut Engine<'_>, body: NodeId) -> Result<()> {
    let tree = engine.tree();
    if !matches!(tree.kind(body), Some(NodeKind::Block)) {
        return engine.emit_statement(body);
    }
    engine.scoped(body, |e| {
        declare_locals(e, body, &[])?;
        for &child in tree.children(body) {
            e.emit_statement(child)?;
        }
        Ok(())
    })
}

/// The spelling of a variable node's identifier.
fn variable_spelling(engine: &Engine<'_>, node: NodeId) -> Result<String> {
    Ok(engine.identifier_for(node)?.spelling.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathscribe_core::ExprTree;
    use mathscribe_registry::{FunctionCatalog, TypeRegistry};

    use crate::engine::EngineOptions;

    #[test]
    fn every_node_kind_has_a_translator() {
        let mut table = TranslatorTable::new();
        register_nodes(&mut table);
        assert!(table.missing(NATIVE).is_empty());
    }

    #[test]
    fn results_shown_through_blocks_and_branches() {
        let mut tree = ExprTree::new();
        let inner = tree.integer(1);
        let hidden = tree.integer(2);
        let block = tree.block([hidden, inner]);
        let cond = tree.boolean(true);
        let then = tree.integer(3);
        let branch = tree.conditional(cond, then, None);
        let root = tree.root([block, branch]);

        let types = TypeRegistry::with_defaults();
        let catalog = FunctionCatalog::new();
        let table = TranslatorTable::new();
        let engine = Engine::new(&types, &catalog, &table, &tree, NATIVE, EngineOptions::default());

        assert!(shows_result(&engine, block));
        assert!(shows_result(&engine, inner));
        assert!(!shows_result(&engine, hidden));
        assert!(shows_result(&engine, then));
        assert!(!shows_result(&engine, cond));
        assert!(!shows_result(&engine, root));
    }
}
