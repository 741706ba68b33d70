//! Lowering of `for each` loops.
//!
//! The strategy is picked from the static shape of the iterable:
//!
//! | Iterable                          | Strategy                              |
//! |-----------------------------------|---------------------------------------|
//! | anything typed as a matrix        | [`Strategy::Materialized`]            |
//! | `first .. end`                    | [`Strategy::UnitRange`]               |
//! | `first, second .. end`            | [`Strategy::SteppedRange`]            |
//! | a bare variable                   | [`Strategy::Container`]               |
//! | anything else                     | [`Strategy::Materialized`]            |
//!
//! The stepped range recomputes the bound variable from a loop counter each
//! iteration (`first + step * k`) so that real steps do not accumulate
//! rounding error.

use mathscribe_core::{NodeId, NodeKind, TranslationError};

use super::{Result, declare_locals, emit_scope_body};
use crate::engine::{Engine, Position};
use crate::symbols::IdentifierHandle;
use crate::translator::NodeTranslator;

/// How a loop is lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// Count from `first` to `end` inclusive.
    UnitRange { first: NodeId, end: NodeId },
    /// Count `k` from 0 to the step count and compute the bound variable.
    SteppedRange {
        first: NodeId,
        second: NodeId,
        end: NodeId,
    },
    /// Range-for over a named container.
    Container(NodeId),
    /// Evaluate the iterable once, then assign each element.
    Materialized(NodeId),
}

/// The loop variable as declared for the body.
struct Binding {
    handle: IdentifierHandle,
    spelling: String,
    type_spelling: String,
}

pub struct ForEachTranslator;

impl NodeTranslator for ForEachTranslator {
    fn emit_body(&self, node: NodeId, engine: &mut Engine<'_>) -> Result<()> {
        if engine.position() == Position::Value {
            return Err(TranslationError::InvalidTree("a loop has no value".into()));
        }
        let &[binding, iterable, body] = engine.tree().children(node) else {
            return Err(TranslationError::MissingParameterOrField(
                "loop binding, iterable or body",
            ));
        };

        engine.scoped(node, |e| {
            let strategy = choose_strategy(e, iterable)?;
            let binding = resolve_binding(e, binding)?;
            tracing::trace!(node = %node, ?strategy, "lowering loop");

            let n = e.next_temp();
            e.line("{");
            e.indent();
            match strategy {
                Strategy::UnitRange { first, end } => {
                    lower_unit_range(e, n, first, end, &binding, node, body)?
                }
                Strategy::SteppedRange { first, second, end } => {
                    lower_stepped_range(e, n, [first, second, end], &binding, node, body)?
                }
                Strategy::Container(container) => {
                    lower_container(e, container, &binding, node, body)?
                }
                Strategy::Materialized(iterable) => {
                    lower_materialized(e, n, iterable, &binding, node, body)?
                }
            }
            e.dedent();
            e.line("}");
            Ok(())
        })
    }
}

/// Pick the lowering for `iterable`.
pub(crate) fn choose_strategy(engine: &Engine<'_>, iterable: NodeId) -> Result<Strategy> {
    let tree = engine.tree();
    let kind = tree
        .kind(iterable)
        .ok_or_else(|| TranslationError::InvalidTree(format!("{iterable} no longer exists")))?;

    let has_entries = || {
        tree.children(iterable)
            .iter()
            .any(|&c| !matches!(tree.kind(c), Some(NodeKind::Placeholder)))
    };

    if engine.static_type(iterable).is_matrix() {
        if matches!(kind, NodeKind::Matrix { .. }) && !has_entries() {
            return Err(TranslationError::EmptyIterable("matrix"));
        }
        return Ok(Strategy::Materialized(iterable));
    }

    match kind {
        NodeKind::Range => {
            let bounds = tree.children(iterable);
            if bounds
                .iter()
                .any(|&b| matches!(tree.kind(b), Some(NodeKind::Placeholder)))
            {
                return Err(TranslationError::MissingParameterOrField("range bound"));
            }
            match *bounds {
                [first, end] => Ok(Strategy::UnitRange { first, end }),
                [first, second, end] => Ok(Strategy::SteppedRange { first, second, end }),
                _ => Err(TranslationError::MissingParameterOrField("range bound")),
            }
        }
        NodeKind::Variable(_) => Ok(Strategy::Container(iterable)),
        NodeKind::Set if !has_entries() => Err(TranslationError::EmptyIterable("set")),
        NodeKind::Tuple if !has_entries() => Err(TranslationError::EmptyIterable("tuple")),
        _ => Ok(Strategy::Materialized(iterable)),
    }
}

fn resolve_binding(engine: &Engine<'_>, binding: NodeId) -> Result<Binding> {
    if !matches!(engine.tree().kind(binding), Some(NodeKind::Variable(_))) {
        return Err(TranslationError::ExpectedVariable);
    }
    let ident = engine.identifier_for(binding)?;
    Ok(Binding {
        handle: ident.handle,
        spelling: ident.spelling.clone(),
        type_spelling: engine.spelling(ident.value_type)?,
    })
}

/// Locals of the loop scope other than the binding, then the body.
fn emit_loop_body(
    engine: &mut Engine<'_>,
    binding: &Binding,
    scope: NodeId,
    body: NodeId,
) -> Result<()> {
    declare_locals(engine, scope, &[binding.handle])?;
    emit_scope_body(engine, body)?;
    engine.dedent();
    engine.line("}");
    Ok(())
}

/// Write `prefix`, the value of `node`, then end the line with `;`.
fn temp_line(engine: &mut Engine<'_>, prefix: &str, node: NodeId) -> Result<()> {
    engine.write(prefix);
    engine.emit_value(node)?;
    engine.line(";");
    Ok(())
}

fn lower_unit_range(
    engine: &mut Engine<'_>,
    n: u32,
    first: NodeId,
    end: NodeId,
    binding: &Binding,
    scope: NodeId,
    body: NodeId,
) -> Result<()> {
    temp_line(engine, &format!("const auto __first{n} = "), first)?;
    temp_line(engine, &format!("const auto __last{n} = "), end)?;
    if engine.options().range_checks {
        engine.line(&format!("rt::require_ordered(__first{n}, __last{n});"));
    }
    let Binding {
        spelling: i,
        type_spelling: t,
        ..
    } = binding;
    engine.line(&format!("for ({t} {i} = __first{n}; {i} <= __last{n}; ++{i}) {{"));
    engine.indent();
    emit_loop_body(engine, binding, scope, body)
}

fn lower_stepped_range(
    engine: &mut Engine<'_>,
    n: u32,
    [first, second, end]: [NodeId; 3],
    binding: &Binding,
    scope: NodeId,
    body: NodeId,
) -> Result<()> {
    temp_line(engine, &format!("const auto __first{n} = "), first)?;
    engine.write(&format!("const auto __step{n} = ("));
    engine.emit_value(second)?;
    engine.line(&format!(") - __first{n};"));
    temp_line(engine, &format!("const auto __last{n} = "), end)?;
    engine.line(&format!(
        "const long long __count{n} = rt::range_count(__first{n}, __step{n}, __last{n});"
    ));

    let Binding {
        spelling: i,
        type_spelling: t,
        ..
    } = binding;
    engine.line(&format!(
        "for (long long __k{n} = 0; __k{n} <= __count{n}; ++__k{n}) {{"
    ));
    engine.indent();
    engine.line(&format!("{t} {i} = __first{n} + __step{n} * __k{n};"));
    emit_loop_body(engine, binding, scope, body)
}

fn lower_container(
    engine: &mut Engine<'_>,
    container: NodeId,
    binding: &Binding,
    scope: NodeId,
    body: NodeId,
) -> Result<()> {
    let Binding {
        spelling: i,
        type_spelling: t,
        ..
    } = binding;
    engine.write(&format!("for ({t} {i} : "));
    engine.emit_value(container)?;
    engine.line(") {");
    engine.indent();
    emit_loop_body(engine, binding, scope, body)
}

fn lower_materialized(
    engine: &mut Engine<'_>,
    n: u32,
    iterable: NodeId,
    binding: &Binding,
    scope: NodeId,
    body: NodeId,
) -> Result<()> {
    // The iterable may name an outer identifier the binding shadows
    temp_line(engine, &format!("const auto __iter{n} = "), iterable)?;
    engine.line(&format!("{} {};", binding.type_spelling, binding.spelling));
    engine.line(&format!("for (const auto& __elem{n} : __iter{n}) {{"));
    engine.indent();
    engine.line(&format!("rt::assign({}, __elem{n});", binding.spelling));
    emit_loop_body(engine, binding, scope, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathscribe_core::ExprTree;
    use mathscribe_registry::{FunctionCatalog, TypeRegistry};

    use crate::engine::EngineOptions;
    use crate::translator::TranslatorTable;

    fn strategy_of(tree: &ExprTree, iterable: NodeId) -> Result<Strategy> {
        let types = TypeRegistry::with_defaults();
        let catalog = FunctionCatalog::new();
        let table = TranslatorTable::new();
        let engine = Engine::new(&types, &catalog, &table, tree, "native", EngineOptions::default());
        choose_strategy(&engine, iterable)
    }

    #[test]
    fn ranges_pick_counting_loops() {
        let mut tree = ExprTree::new();
        let a = tree.integer(0);
        let b = tree.integer(10);
        let two = tree.range([a, b]);
        assert_eq!(strategy_of(&tree, two), Ok(Strategy::UnitRange { first: a, end: b }));

        let c = tree.integer(0);
        let d = tree.integer(2);
        let e = tree.integer(10);
        let three = tree.range([c, d, e]);
        assert!(matches!(
            strategy_of(&tree, three),
            Ok(Strategy::SteppedRange { .. })
        ));
    }

    #[test]
    fn variables_and_expressions() {
        let mut tree = ExprTree::new();
        let s = tree.variable("s");
        assert_eq!(strategy_of(&tree, s), Ok(Strategy::Container(s)));

        let one = tree.integer(1);
        let set = tree.set([one]);
        assert_eq!(strategy_of(&tree, set), Ok(Strategy::Materialized(set)));
    }

    #[test]
    fn empty_literals_rejected() {
        let mut tree = ExprTree::new();
        let hole = tree.placeholder();
        let set = tree.set([hole]);
        assert_eq!(strategy_of(&tree, set), Err(TranslationError::EmptyIterable("set")));

        let tuple = tree.tuple([]);
        assert_eq!(strategy_of(&tree, tuple), Err(TranslationError::EmptyIterable("tuple")));
    }

    #[test]
    fn incomplete_range_rejected() {
        let mut tree = ExprTree::new();
        let a = tree.integer(0);
        let hole = tree.placeholder();
        let range = tree.range([a, hole]);
        assert_eq!(
            strategy_of(&tree, range),
            Err(TranslationError::MissingParameterOrField("range bound"))
        );

        let lone = tree.integer(1);
        let short = tree.range([lone]);
        assert!(strategy_of(&tree, short).is_err());
    }
}
