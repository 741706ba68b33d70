//! The document root, blocks, assignments, declarations and control flow.

use mathscribe_core::{NodeId, NodeKind, TranslationError, ValueType};

use super::calls::{emit_prototype, emit_returning};
use super::{
    Result, declare_locals, emit_converted, emit_scope_body, require_node_type, variable_spelling,
};
use crate::engine::{Engine, Position};
use crate::translator::NodeTranslator;

fn no_value(what: &str) -> TranslationError {
    TranslationError::InvalidTree(format!("{what} has no value"))
}

// ==========================================================================
// Root
// ==========================================================================

pub struct RootTranslator;

impl NodeTranslator for RootTranslator {
    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        if engine.position() == Position::Value {
            return Err(no_value("the document"));
        }
        let tree = engine.tree();
        let options = engine.options().clone();
        let (functions, statements): (Vec<NodeId>, Vec<NodeId>) = tree
            .children(node)
            .iter()
            .copied()
            .partition(|&child| matches!(tree.kind(child), Some(NodeKind::FunctionDef(_))));

        engine.scoped(node, |e| {
            e.line(&format!("#include \"{}\"", options.runtime_header));
            for definition in preamble(e)? {
                e.line(&definition);
            }

            e.blank_line();
            declare_locals(e, node, &[])?;

            if !functions.is_empty() {
                e.blank_line();
                for &function in &functions {
                    emit_prototype(e, function)?;
                }
                for &function in &functions {
                    e.blank_line();
                    e.emit_definitions(function)?;
                }
            }

            e.blank_line();
            e.line(&format!("void {}() {{", options.entry_point));
            e.indent();
            for &statement in &statements {
                e.emit_statement(statement)?;
            }
            e.dedent();
            e.line("}");
            Ok(())
        })
    }
}

/// Definition lines required by the types the output uses, deduplicated.
fn preamble(engine: &Engine<'_>) -> Result<Vec<String>> {
    let mut value_types: Vec<ValueType> = engine.required_types().to_vec();
    for ident in engine.symbols().identifiers() {
        if !value_types.contains(&ident.value_type) {
            value_types.push(ident.value_type);
        }
    }

    let mut lines: Vec<String> = Vec::new();
    for value_type in value_types {
        if value_type == ValueType::None {
            continue;
        }
        for line in engine.type_translator(value_type)?.definitions() {
            if !lines.contains(&line) {
                lines.push(line);
            }
        }
    }
    Ok(lines)
}

// ==========================================================================
// Blocks
// ==========================================================================

pub struct BlockTranslator;

impl NodeTranslator for BlockTranslator {
    fn identify_dependencies(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        require_node_type(engine, node)
    }

    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        match engine.position() {
            Position::Statement => {
                engine.line("{");
                engine.indent();
                emit_scope_body(engine, node)?;
                engine.dedent();
                engine.line("}");
            }
            // An immediately invoked lambda returning the last value
            Position::Value => {
                let value_type = engine.static_type(node);
                if value_type == ValueType::None {
                    engine.line("[&]() {");
                    engine.indent();
                    emit_scope_body(engine, node)?;
                } else {
                    let spelling = engine.spelling(value_type)?;
                    engine.line(&format!("[&]() -> {spelling} {{"));
                    engine.indent();
                    emit_returning(engine, node, value_type)?;
                }
                engine.dedent();
                engine.write("}()");
            }
        }
        Ok(())
    }
}

// ==========================================================================
// Assignments and declarations
// ==========================================================================

pub struct AssignmentTranslator;

impl NodeTranslator for AssignmentTranslator {
    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        let tree = engine.tree();
        let &[target, value] = tree.children(node) else {
            return Err(TranslationError::MissingParameterOrField("assignment operand"));
        };
        let variable = match tree.kind(target) {
            Some(NodeKind::Variable(_)) => target,
            Some(NodeKind::TypeAnnotation(_)) => tree
                .child(target, 0)
                .ok_or(TranslationError::ExpectedVariable)?,
            _ => return Err(TranslationError::ExpectedVariable),
        };
        let spelling = variable_spelling(engine, variable)?;
        let target_type = engine.static_type(variable);

        let statement = engine.position() == Position::Statement;
        engine.write(if statement { "" } else { "(" });
        engine.write(&spelling);
        engine.write(" = ");
        emit_converted(engine, value, target_type)?;
        if statement {
            engine.line(";");
        } else {
            engine.write(")");
        }
        Ok(())
    }
}

pub struct AnnotationTranslator;

impl NodeTranslator for AnnotationTranslator {
    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        // The declaration itself is emitted with the scope's locals
        if engine.position() == Position::Statement {
            return Ok(());
        }
        let variable = engine
            .tree()
            .child(node, 0)
            .ok_or(TranslationError::ExpectedVariable)?;
        let spelling = variable_spelling(engine, variable)?;
        engine.write(&spelling);
        Ok(())
    }
}

// ==========================================================================
// Control flow
// ==========================================================================

pub struct WhileTranslator;

impl NodeTranslator for WhileTranslator {
    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        if engine.position() == Position::Value {
            return Err(no_value("a loop"));
        }
        let &[condition, body] = engine.tree().children(node) else {
            return Err(TranslationError::MissingParameterOrField("loop condition or body"));
        };

        engine.scoped(node, |e| {
            e.write("while (");
            emit_converted(e, condition, ValueType::Boolean)?;
            e.line(") {");
            e.indent();
            declare_locals(e, node, &[])?;
            emit_scope_body(e, body)?;
            e.dedent();
            e.line("}");
            Ok(())
        })
    }
}

pub struct ConditionalTranslator;

impl NodeTranslator for ConditionalTranslator {
    fn identify_dependencies(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        require_node_type(engine, node)
    }

    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        let children = engine.tree().children(node);
        match (engine.position(), children) {
            (Position::Statement, &[condition, then, ref otherwise @ ..]) if otherwise.len() <= 1 => {
                engine.write("if (");
                emit_converted(engine, condition, ValueType::Boolean)?;
                engine.line(") {");
                engine.indent();
                emit_scope_body(engine, then)?;
                engine.dedent();
                if let Some(&otherwise) = otherwise.first() {
                    engine.line("} else {");
                    engine.indent();
                    emit_scope_body(engine, otherwise)?;
                    engine.dedent();
                }
                engine.line("}");
                Ok(())
            }
            (Position::Value, &[condition, then, otherwise]) => {
                let value_type = engine.static_type(node);
                engine.write("(");
                emit_converted(engine, condition, ValueType::Boolean)?;
                engine.write(" ? ");
                emit_branch(engine, then, value_type)?;
                engine.write(" : ");
                emit_branch(engine, otherwise, value_type)?;
                engine.write(")");
                Ok(())
            }
            (Position::Value, &[_, _]) => {
                Err(TranslationError::MissingParameterOrField("else branch"))
            }
            _ => Err(TranslationError::MissingParameterOrField("condition or branch")),
        }
    }
}

/// Both arms of `?:` must have one type; variants are constructed explicitly.
fn emit_branch(engine: &mut Engine<'_>, branch: NodeId, value_type: ValueType) -> Result<()> {
    if value_type != ValueType::Variant || engine.static_type(branch) == ValueType::Variant {
        return engine.emit_value(branch);
    }
    let spelling = engine.spelling(ValueType::Variant)?;
    engine.write(&format!("{spelling}("));
    engine.emit_value(branch)?;
    engine.write(")");
    Ok(())
}
