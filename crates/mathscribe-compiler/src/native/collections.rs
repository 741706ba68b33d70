//! Matrix, set, tuple and range literals.

use mathscribe_core::{NodeId, NodeKind, TranslationError, ValueType};

use super::{Result, emit_cast, require_node_type, value_or_statement};
use crate::engine::Engine;
use crate::translator::NodeTranslator;

/// Emit `elements` separated by commas, each through `emit`.
fn emit_list(
    engine: &mut Engine<'_>,
    elements: &[NodeId],
    mut emit: impl FnMut(&mut Engine<'_>, NodeId) -> Result<()>,
) -> Result<()> {
    for (i, &element) in elements.iter().enumerate() {
        if i > 0 {
            engine.write(", ");
        }
        emit(engine, element)?;
    }
    Ok(())
}

pub struct MatrixTranslator;

impl NodeTranslator for MatrixTranslator {
    fn identify_dependencies(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        require_node_type(engine, node)
    }

    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        let tree = engine.tree();
        let Some(&NodeKind::Matrix { rows, cols }) = tree.kind(node) else {
            return Err(TranslationError::InvalidTree(format!("{node} is not a matrix")));
        };
        let cells = tree.children(node);
        let matrix_type = engine.static_type(node);

        value_or_statement(engine, node, |e| {
            // Element type decided at run time
            let Some(element) = matrix_type.element_type() else {
                e.write(&format!("rt::make_matrix({rows}, {cols}, {{"));
                emit_list(e, cells, |e, cell| {
                    if matches!(e.tree().kind(cell), Some(NodeKind::Placeholder)) {
                        e.write("rt::Variant{}");
                        Ok(())
                    } else {
                        e.emit_value(cell)
                    }
                })?;
                e.write("})");
                return Ok(());
            };

            let matrix = e.spelling(matrix_type)?;
            let scalar = e.spelling(element)?;
            e.write(&format!("{matrix}({rows}, {cols}, {{"));
            emit_list(e, cells, |e, cell| {
                if matches!(e.tree().kind(cell), Some(NodeKind::Placeholder)) {
                    e.write(&format!("{scalar}{{}}"));
                    Ok(())
                } else {
                    emit_cast(e, cell, element)
                }
            })?;
            e.write("})");
            Ok(())
        })
    }
}

/// Set or tuple literal: `rt::Set{a, b}`.
fn emit_collection(engine: &mut Engine<'_>, node: NodeId, value_type: ValueType) -> Result<()> {
    let elements = engine.tree().children(node);
    let spelling = engine.spelling(value_type)?;
    value_or_statement(engine, node, |e| {
        e.write(&spelling);
        e.write("{");
        emit_list(e, elements, |e, element| e.emit_value(element))?;
        e.write("}");
        Ok(())
    })
}

pub struct SetTranslator;

impl NodeTranslator for SetTranslator {
    fn identify_dependencies(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        require_node_type(engine, node)
    }

    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        emit_collection(engine, node, ValueType::Set)
    }
}

pub struct TupleTranslator;

impl NodeTranslator for TupleTranslator {
    fn identify_dependencies(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        require_node_type(engine, node)
    }

    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        emit_collection(engine, node, ValueType::Tuple)
    }
}

/// A range outside a loop is materialised as a tuple by the runtime.
pub struct RangeTranslator;

impl NodeTranslator for RangeTranslator {
    fn identify_dependencies(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        require_node_type(engine, node)
    }

    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        let bounds = engine.tree().children(node);
        if !(2..=3).contains(&bounds.len()) {
            return Err(TranslationError::MissingParameterOrField("range bound"));
        }
        value_or_statement(engine, node, |e| {
            e.write("rt::range(");
            emit_list(e, bounds, |e, bound| e.emit_value(bound))?;
            e.write(")");
            Ok(())
        })
    }
}
