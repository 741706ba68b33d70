//! Pass 1: declare identifiers, apply annotations and infer types.
//!
//! The walk is depth-first and left to right. Every node gets a static type
//! (possibly `None` after an error) and is offered to its backend translator
//! through `identify_dependencies`. Errors of Error severity are recorded
//! and the walk continues with the offending node typed `None`; operands
//! typed `None` propagate without further diagnostics. Fatal and internal
//! errors stop the pass.
//!
//! A catalog call whose arguments are still untyped when it is reached is
//! resolved after the walk, once later assignments and implicit variants
//! have fixed the identifier types.

use mathscribe_core::{
    LiteralValue, NodeId, NodeKind, Operator, SymbolError, TranslationError, TypeProperties,
    ValueType, VariableName,
};

use super::{CallTarget, Engine, Result, UserFunction};
use crate::range::RangePlan;
use crate::symbols::{DefinedAs, IdentifierHandle};
use crate::typing;

impl<'a> Engine<'a> {
    /// Run the whole pass from `root`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(super) fn discover_types(&mut self, root: NodeId) -> Result<()> {
        self.discover(root)?;
        if !self.diagnostics.has_errors() {
            self.resolve_deferred_calls(false)?;
            self.default_untyped()?;
            self.resolve_deferred_calls(true)?;
        }
        let touched = &self.touched;
        let dropped = self.symbols.retain_handles(|h| touched.contains(&h));
        if dropped > 0 {
            tracing::debug!(dropped, "dropped identifiers no longer in the document");
        }
        Ok(())
    }

    /// Type `node` and its subtree.
    ///
    /// Returns `Err` only when the pass must stop.
    fn discover(&mut self, node: NodeId) -> Result<ValueType> {
        let result = self.discover_node(node);
        let value_type = self.recover(node, result)?.unwrap_or(ValueType::None);
        self.node_types.insert(node, value_type);

        let tree = self.tree;
        let table = self.translators;
        if let Some(kind) = tree.kind(node) {
            let dependencies = table
                .get(&self.backend, kind.tag())
                .and_then(|translator| translator.identify_dependencies(node, self));
            self.recover(node, dependencies)?;
        }
        Ok(value_type)
    }

    fn discover_node(&mut self, node: NodeId) -> Result<ValueType> {
        let tree = self.tree;
        let Some(kind) = tree.kind(node) else {
            return Err(TranslationError::InvalidTree(format!("{node} no longer exists")));
        };
        tracing::trace!(node = %node, kind = ?kind.tag(), "discover");

        match kind {
            NodeKind::Root | NodeKind::Block => self.scoped(node, |e| e.discover_sequence(node)),
            NodeKind::Placeholder => Ok(ValueType::None),
            NodeKind::Literal(literal) => literal
                .parse()
                .map(|_| literal.kind.value_type())
                .ok_or_else(|| TranslationError::MalformedLiteralValue(literal.text.clone())),
            NodeKind::Variable(name) => self.discover_variable(node, name),
            NodeKind::Operator(op) => self.discover_operator(node, *op),
            NodeKind::FunctionCall(name) => self.discover_call(node, name),
            NodeKind::FunctionDef(name) => self.discover_function(node, name),
            NodeKind::Assignment => self.discover_assignment(node),
            NodeKind::TypeAnnotation(symbol) => self.discover_annotation(node, symbol),
            NodeKind::Range => self.discover_range(node),
            NodeKind::Matrix { rows, cols } => self.discover_matrix(node, *rows, *cols),
            NodeKind::Set => self.discover_elements(node, ValueType::Set),
            NodeKind::Tuple => self.discover_elements(node, ValueType::Tuple),
            NodeKind::ForEach => self.discover_for_each(node),
            NodeKind::While => self.discover_while(node),
            NodeKind::Conditional => self.discover_conditional(node),
        }
    }

    /// Statements of a root or block; the value is the last expression's.
    fn discover_sequence(&mut self, node: NodeId) -> Result<ValueType> {
        let tree = self.tree;
        let mut last = ValueType::None;
        for &child in tree.children(node) {
            let value_type = self.discover(child)?;
            let is_statement = tree.kind(child).is_some_and(NodeKind::is_statement);
            last = if is_statement { ValueType::None } else { value_type };
        }
        Ok(last)
    }

    // ==========================================================================
    // Identifiers
    // ==========================================================================

    /// Nearest identifier for `name` seen in this run.
    fn lookup_seen(&self, name: &VariableName) -> Result<Option<IdentifierHandle>> {
        let scope = self.current_scope()?;
        let tree = self.tree;
        Ok(std::iter::once(scope)
            .chain(tree.ancestors(scope))
            .filter_map(|s| self.symbols.in_scope(name, s))
            .map(|ident| ident.handle)
            .find(|h| self.touched.contains(h)))
    }

    /// Declare `name` in exactly `scope`.
    ///
    /// An identifier persisted from an earlier run is reused; one already
    /// seen in this run is a redeclaration.
    fn declare_in(
        &mut self,
        name: &VariableName,
        scope: NodeId,
        defined_as: DefinedAs,
        primary: NodeId,
    ) -> Result<IdentifierHandle> {
        let handle = match self.symbols.in_scope(name, scope).map(|i| i.handle) {
            Some(handle) if self.touched.contains(&handle) => {
                return Err(SymbolError::AlreadyDeclaredInScope {
                    name: name.to_string(),
                }
                .into());
            }
            Some(handle) => {
                self.symbols.redefine(handle, defined_as, Some(primary))?;
                handle
            }
            None => self
                .symbols
                .declare(name.clone(), scope, defined_as, Some(primary), self.tree)?,
        };
        self.touched.insert(handle);
        Ok(handle)
    }

    /// Bind a variable node to `handle` and record the use.
    fn bind(&mut self, node: NodeId, handle: IdentifierHandle) -> Result<ValueType> {
        let slot = self.tree.slot_of(node).unwrap_or(0);
        self.symbols.record_use(handle, node, slot)?;
        self.bindings.insert(node, handle);
        Ok(self
            .symbols
            .get(handle)
            .map_or(ValueType::None, |i| i.value_type))
    }

    /// Check if `node` is the target of an assignment or annotation.
    fn is_assignable_position(&self, node: NodeId) -> bool {
        let tree = self.tree;
        match tree.parent(node).and_then(|p| tree.kind(p)) {
            Some(NodeKind::Assignment) => tree.slot_of(node) == Some(0),
            Some(NodeKind::TypeAnnotation(_)) => true,
            _ => false,
        }
    }

    fn classify(&self, scope: NodeId, assignable: bool) -> DefinedAs {
        if Some(scope) == self.root {
            DefinedAs::GlobalVariable
        } else if assignable && matches!(self.tree.kind(scope), Some(NodeKind::FunctionDef(_))) {
            DefinedAs::FunctionParameter
        } else {
            DefinedAs::LocalVariable
        }
    }

    fn discover_variable(&mut self, node: NodeId, name: &VariableName) -> Result<ValueType> {
        if let Some(handle) = self.lookup_seen(name)? {
            return self.bind(node, handle);
        }

        let assignable = self.is_assignable_position(node);
        if !assignable
            && let Some(function) = self.catalog.find(name)
            && function.is_constant()
        {
            let call = self
                .catalog
                .resolve(name, TypeProperties::empty(), &[], self.types)?;
            let value_type = call.return_type;
            self.calls.insert(node, CallTarget::Catalog(call));
            return Ok(value_type);
        }

        let scope = self.current_scope()?;
        let defined_as = self.classify(scope, assignable);
        let handle = self.declare_in(name, scope, defined_as, node)?;
        self.bind(node, handle)
    }

    fn symbol_type(&self, symbol: &str) -> Result<ValueType> {
        self.types
            .get_by_symbol(symbol)
            .map(|dt| dt.value_type)
            .ok_or_else(|| TranslationError::UnknownTypeSymbol(symbol.to_string()))
    }

    /// `x ∈ T`: declares `x` in the current scope unless this run already did.
    fn discover_annotation(&mut self, node: NodeId, symbol: &str) -> Result<ValueType> {
        let tree = self.tree;
        let value_type = self.symbol_type(symbol)?;
        let target = tree
            .child(node, 0)
            .ok_or(TranslationError::MissingParameterOrField("annotated variable"))?;
        let Some(NodeKind::Variable(name)) = tree.kind(target) else {
            return Err(TranslationError::ExpectedVariable);
        };

        let scope = self.current_scope()?;
        let existing = self
            .symbols
            .in_scope(name, scope)
            .map(|i| i.handle)
            .filter(|h| self.touched.contains(h));
        let handle = match existing {
            Some(handle) => handle,
            None => {
                let defined_as = self.classify(scope, true);
                self.declare_in(name, scope, defined_as, target)?
            }
        };
        self.bind(target, handle)?;
        self.symbols.set_explicit_type(handle, value_type)?;
        self.node_types.insert(target, value_type);
        Ok(value_type)
    }

    fn discover_assignment(&mut self, node: NodeId) -> Result<ValueType> {
        let tree = self.tree;
        let &[target, value] = tree.children(node) else {
            return Err(TranslationError::MissingParameterOrField("assignment operand"));
        };
        let variable = match tree.kind(target) {
            Some(NodeKind::Variable(_)) => target,
            Some(NodeKind::TypeAnnotation(_)) => tree.child(target, 0).unwrap_or(target),
            _ => return Err(TranslationError::ExpectedVariable),
        };

        self.discover(target)?;
        let value_type = self.discover(value)?;
        let Some(handle) = self.binding(variable) else {
            return Ok(ValueType::None);
        };
        self.symbols.merge_inferred_type(handle, value_type)?;
        Ok(self
            .symbols
            .get(handle)
            .map_or(ValueType::None, |i| i.value_type))
    }

    /// Replace identifiers that never received a type with implicit variants.
    fn default_untyped(&mut self) -> Result<()> {
        let untyped: Vec<(IdentifierHandle, String, Option<NodeId>)> = self
            .symbols
            .identifiers()
            .filter(|i| !i.is_typed() && self.touched.contains(&i.handle))
            .map(|i| (i.handle, i.name.to_string(), i.primary_element))
            .collect();

        for (handle, name, primary) in untyped {
            tracing::warn!(%name, "type could not be inferred, using variant");
            self.symbols.merge_inferred_type(handle, ValueType::Variant)?;
            let node = primary.or(self.root);
            if let Some(node) = node {
                self.report(node, TranslationError::UntypedIdentifier(name));
            }
        }
        Ok(())
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn discover_operator(&mut self, node: NodeId, op: Operator) -> Result<ValueType> {
        let tree = self.tree;
        let mut operands = Vec::with_capacity(op.arity());
        for &child in tree.children(node) {
            operands.push(self.discover(child)?);
        }
        if operands.contains(&ValueType::None) {
            return Ok(ValueType::None);
        }
        typing::operator_type(op, &operands)
    }

    /// Set and tuple literals; elements may be of any type.
    fn discover_elements(&mut self, node: NodeId, value_type: ValueType) -> Result<ValueType> {
        let tree = self.tree;
        for &child in tree.children(node) {
            self.discover(child)?;
        }
        Ok(value_type)
    }

    fn discover_call(&mut self, node: NodeId, name: &VariableName) -> Result<ValueType> {
        let required = std::mem::take(&mut self.pending_capabilities);
        let tree = self.tree;
        let mut arguments = Vec::with_capacity(tree.children(node).len());
        for &child in tree.children(node) {
            arguments.push(self.discover(child)?);
        }

        if let Some(handle) = self.lookup_seen(name)? {
            return self.discover_user_call(node, name, handle, arguments.len());
        }

        if !self.catalog.contains(name) {
            return Err(mathscribe_core::ResolveError::UnknownFunction(name.to_string()).into());
        }
        // Typed once the arguments are, possibly by a later assignment
        if arguments.contains(&ValueType::None) {
            self.deferred_calls.push((node, required));
            return Ok(ValueType::None);
        }
        self.resolve_catalog_call(node, name, required, &arguments)
    }

    fn resolve_catalog_call(
        &mut self,
        node: NodeId,
        name: &VariableName,
        required: TypeProperties,
        arguments: &[ValueType],
    ) -> Result<ValueType> {
        let call = self.catalog.resolve(name, required, arguments, self.types)?;
        tracing::trace!(
            function = %call.internal_name,
            variant = call.variant,
            cost = call.total_cost,
            "resolved call"
        );
        let value_type = call.return_type;
        self.calls.insert(node, CallTarget::Catalog(call));
        Ok(value_type)
    }

    /// Resolve the deferred catalog calls against the identifier types known
    /// after the walk.
    ///
    /// Unless `finalize` is set, calls with an argument that is still untyped
    /// stay deferred. Once set, such arguments count as `Variant` and are
    /// converted at run time.
    fn resolve_deferred_calls(&mut self, finalize: bool) -> Result<()> {
        let tree = self.tree;
        loop {
            let pending = std::mem::take(&mut self.deferred_calls);
            let count = pending.len();
            for (node, required) in pending {
                let Some(NodeKind::FunctionCall(name)) = tree.kind(node) else {
                    continue;
                };
                let mut arguments: Vec<ValueType> = tree
                    .children(node)
                    .iter()
                    .map(|&argument| self.static_type(argument))
                    .collect();
                if arguments.contains(&ValueType::None) {
                    if !finalize {
                        self.deferred_calls.push((node, required));
                        continue;
                    }
                    for argument in arguments.iter_mut().filter(|t| **t == ValueType::None) {
                        *argument = ValueType::Variant;
                    }
                }

                let resolved = self.resolve_catalog_call(node, name, required, &arguments);
                if let Some(value_type) = self.recover(node, resolved)? {
                    self.node_types.insert(node, value_type);
                    self.require_type(value_type);
                    self.propagate_settled(node)?;
                }
            }
            if self.deferred_calls.is_empty() || self.deferred_calls.len() == count {
                return Ok(());
            }
        }
    }

    /// Carry the type of a late-resolved call into the operators, assignment
    /// or loop binding that saw it as `None`.
    fn propagate_settled(&mut self, mut node: NodeId) -> Result<()> {
        let tree = self.tree;
        while let Some(parent) = tree.parent(node) {
            let value_type = self.static_type(node);
            match tree.kind(parent) {
                Some(NodeKind::Operator(op)) if self.static_type(parent) == ValueType::None => {
                    let operands: Vec<ValueType> = tree
                        .children(parent)
                        .iter()
                        .map(|&operand| self.static_type(operand))
                        .collect();
                    if operands.contains(&ValueType::None) {
                        return Ok(());
                    }
                    let result = typing::operator_type(*op, &operands);
                    let Some(result) = self.recover(parent, result)? else {
                        return Ok(());
                    };
                    self.node_types.insert(parent, result);
                    self.require_type(result);
                }
                Some(NodeKind::Assignment) if tree.slot_of(node) == Some(1) => {
                    let target = tree.child(parent, 0);
                    let variable = match target.and_then(|t| tree.kind(t)) {
                        Some(NodeKind::TypeAnnotation(_)) => target.and_then(|t| tree.child(t, 0)),
                        _ => target,
                    };
                    if let Some(handle) = variable.and_then(|v| self.binding(v)) {
                        let merged = self
                            .symbols
                            .merge_inferred_type(handle, value_type)
                            .map_err(TranslationError::from);
                        self.recover(parent, merged)?;
                    }
                    return Ok(());
                }
                Some(NodeKind::ForEach) if tree.slot_of(node) == Some(1) => {
                    let element = self.element_type(node, value_type);
                    let binding = tree.child(parent, 0).and_then(|b| self.binding(b));
                    if let (Some(element), Some(handle)) = (self.recover(node, element)?, binding) {
                        let merged = self
                            .symbols
                            .merge_inferred_type(handle, element)
                            .map_err(TranslationError::from);
                        self.recover(parent, merged)?;
                    }
                    return Ok(());
                }
                _ => return Ok(()),
            }
            node = parent;
        }
        Ok(())
    }

    fn discover_user_call(
        &mut self,
        node: NodeId,
        name: &VariableName,
        handle: IdentifierHandle,
        argument_count: usize,
    ) -> Result<ValueType> {
        let Some(ident) = self.symbols.get(handle) else {
            return Err(SymbolError::UnknownHandle(handle.as_u64()).into());
        };
        if !ident.defined_as.is_function() {
            return Err(TranslationError::NotCallable(name.to_string()));
        }
        let value_type = ident.value_type;

        let expected = self
            .functions
            .get(&handle)
            .map_or(0, |f| self.tree.children(f.definition).len().saturating_sub(1));
        if expected != argument_count {
            return Err(TranslationError::ArgumentCountMismatch {
                name: name.to_string(),
                expected,
                found: argument_count,
            });
        }

        let slot = self.tree.slot_of(node).unwrap_or(0);
        self.symbols.record_use(handle, node, slot)?;
        self.calls.insert(node, CallTarget::User(handle));
        Ok(value_type)
    }

    fn discover_function(&mut self, node: NodeId, name: &VariableName) -> Result<ValueType> {
        let tree = self.tree;
        let Some((&body, parameters)) = tree.children(node).split_last() else {
            return Err(TranslationError::MissingParameterOrField("function body"));
        };

        let scope = self.current_scope()?;
        let defined_as = if Some(scope) == self.root {
            DefinedAs::GlobalFunction
        } else {
            DefinedAs::LocalFunction
        };
        let handle = self.declare_in(name, scope, defined_as, node)?;
        let slot = tree.slot_of(node).unwrap_or(0);
        self.symbols.record_use(handle, node, slot)?;

        let body_type = self.scoped(node, |e| {
            let mut declared = Vec::with_capacity(parameters.len());
            for &parameter in parameters {
                let result = e.discover_parameter(node, parameter);
                if let Some(h) = e.recover(parameter, result)? {
                    declared.push(h);
                }
            }
            e.functions.insert(
                handle,
                UserFunction {
                    definition: node,
                    parameters: declared,
                },
            );
            e.discover(body)
        })?;

        self.symbols.merge_inferred_type(handle, body_type)?;
        Ok(ValueType::None)
    }

    /// A parameter: a bare variable or an annotated one.
    fn discover_parameter(&mut self, def: NodeId, parameter: NodeId) -> Result<IdentifierHandle> {
        let tree = self.tree;
        let (variable, symbol) = match tree.kind(parameter) {
            Some(NodeKind::Variable(_)) => (parameter, None),
            Some(NodeKind::TypeAnnotation(symbol)) => (
                tree.child(parameter, 0)
                    .ok_or(TranslationError::ExpectedVariable)?,
                Some(symbol.as_str()),
            ),
            _ => return Err(TranslationError::ExpectedVariable),
        };
        let Some(NodeKind::Variable(name)) = tree.kind(variable) else {
            return Err(TranslationError::ExpectedVariable);
        };

        let handle = self.declare_in(name, def, DefinedAs::FunctionParameter, variable)?;
        self.bind(variable, handle)?;
        let value_type = match symbol {
            Some(symbol) => {
                let value_type = self.symbol_type(symbol)?;
                self.symbols.set_explicit_type(handle, value_type)?;
                value_type
            }
            None => {
                self.symbols.merge_inferred_type(handle, ValueType::Variant)?;
                ValueType::Variant
            }
        };
        self.node_types.insert(variable, value_type);
        self.node_types.insert(parameter, value_type);
        Ok(handle)
    }

    // ==========================================================================
    // Collections
    // ==========================================================================

    fn discover_range(&mut self, node: NodeId) -> Result<ValueType> {
        let tree = self.tree;
        let children = tree.children(node);
        let mut bounds = Vec::with_capacity(children.len());
        for &child in children {
            bounds.push(self.discover(child)?);
        }
        // Structural problems are reported when the range is lowered
        if !(2..=3).contains(&bounds.len()) || bounds.contains(&ValueType::None) {
            return Ok(ValueType::Tuple);
        }

        let element = ValueType::best_upcast(bounds.iter().copied());
        if !matches!(
            element,
            ValueType::Boolean | ValueType::Integer | ValueType::Real | ValueType::Variant
        ) {
            return Err(TranslationError::IncompatibleOperands {
                operator: "..".into(),
                operands: bounds,
            });
        }

        if let Some(problem) = self.literal_range_problem(children) {
            self.report(node, TranslationError::InvalidRange(problem));
        }
        Ok(ValueType::Tuple)
    }

    /// Plan a range whose bounds are all literals; describe why it cannot run.
    fn literal_range_problem(&self, bounds: &[NodeId]) -> Option<String> {
        let tree = self.tree;
        let values: Vec<f64> = bounds
            .iter()
            .map(|&b| match tree.kind(b) {
                Some(NodeKind::Literal(literal)) => literal.parse().and_then(LiteralValue::as_f64),
                _ => None,
            })
            .collect::<Option<_>>()?;
        let plan = match values.as_slice() {
            &[first, end] => RangePlan::two_bound(first, end),
            &[first, second, end] => RangePlan::three_term(first, second, end),
            _ => return None,
        };
        plan.err().map(|problem| problem.to_string())
    }

    fn discover_matrix(&mut self, node: NodeId, rows: usize, cols: usize) -> Result<ValueType> {
        let tree = self.tree;
        let cells = tree.children(node);
        let mut types = Vec::with_capacity(cells.len());
        for &cell in cells {
            let value_type = self.discover(cell)?;
            if !matches!(tree.kind(cell), Some(NodeKind::Placeholder)) {
                types.push(value_type);
            }
        }
        if cells.len() != rows * cols {
            return Err(TranslationError::InvalidTree(format!(
                "{rows}x{cols} matrix has {} cells",
                cells.len()
            )));
        }

        if types.is_empty() {
            return Ok(ValueType::MatrixReal);
        }
        if types.contains(&ValueType::None) {
            return Ok(ValueType::None);
        }
        match ValueType::best_upcast(types.iter().copied()) {
            ValueType::Variant => Ok(ValueType::Variant),
            element => ValueType::matrix_of(element).ok_or_else(|| {
                TranslationError::IncompatibleOperands {
                    operator: "matrix".into(),
                    operands: types,
                }
            }),
        }
    }

    // ==========================================================================
    // Control flow
    // ==========================================================================

    /// The iterable is typed in the enclosing scope, before the binding
    /// exists; the binding and the body live in the loop's scope.
    fn discover_for_each(&mut self, node: NodeId) -> Result<ValueType> {
        let tree = self.tree;
        let children = tree.children(node);

        let element = match children.get(1) {
            Some(&iterable) => {
                if matches!(tree.kind(iterable), Some(NodeKind::FunctionCall(_))) {
                    self.pending_capabilities = TypeProperties::CONTAINER;
                }
                let iterable_type = self.discover(iterable);
                self.pending_capabilities = TypeProperties::empty();
                let iterable_type = iterable_type?;
                let element = self.element_type(iterable, iterable_type);
                self.recover(iterable, element)?.unwrap_or(ValueType::None)
            }
            None => ValueType::None,
        };

        self.scoped(node, |e| {
            if let Some(&binding) = children.first()
                && let Some(NodeKind::Variable(name)) = tree.kind(binding)
            {
                let declared = e.declare_in(name, node, DefinedAs::LocalVariable, binding);
                if let Some(handle) = e.recover(binding, declared)? {
                    e.bind(binding, handle)?;
                    e.symbols.merge_inferred_type(handle, element)?;
                    e.node_types.insert(binding, element);
                }
            }

            if let Some(&body) = children.get(2) {
                e.discover(body)?;
            }
            Ok(ValueType::None)
        })
    }

    /// Type of the values an iterable yields.
    fn element_type(&self, iterable: NodeId, iterable_type: ValueType) -> Result<ValueType> {
        let tree = self.tree;
        if let Some(NodeKind::Range) = tree.kind(iterable) {
            let bounds = tree
                .children(iterable)
                .iter()
                .map(|b| self.node_types.get(b).copied().unwrap_or(ValueType::None));
            return Ok(match ValueType::best_upcast(bounds) {
                ValueType::Boolean => ValueType::Integer,
                other => other,
            });
        }

        match iterable_type {
            ValueType::None => Ok(ValueType::None),
            ValueType::Set | ValueType::Tuple | ValueType::Variant => Ok(ValueType::Variant),
            t if t.is_matrix() => Ok(t.element_type().unwrap_or(ValueType::Variant)),
            t => Err(TranslationError::IncompatibleOperands {
                operator: "∈".into(),
                operands: vec![t],
            }),
        }
    }

    fn discover_while(&mut self, node: NodeId) -> Result<ValueType> {
        let tree = self.tree;
        let &[condition, body] = tree.children(node) else {
            return Err(TranslationError::MissingParameterOrField("loop condition or body"));
        };
        // Evaluated outside the loop body, so typed in the enclosing scope
        let condition_type = self.discover(condition)?;
        self.check_condition(condition, condition_type, "while")?;
        self.scoped(node, |e| e.discover(body))?;
        Ok(ValueType::None)
    }

    fn discover_conditional(&mut self, node: NodeId) -> Result<ValueType> {
        let tree = self.tree;
        let children = tree.children(node);
        if !(2..=3).contains(&children.len()) {
            return Err(TranslationError::MissingParameterOrField("condition or branch"));
        }

        let condition_type = self.discover(children[0])?;
        self.check_condition(children[0], condition_type, "if")?;
        let mut branches = Vec::with_capacity(2);
        for &branch in &children[1..] {
            branches.push(self.discover(branch)?);
        }
        Ok(ValueType::best_upcast(branches))
    }

    /// Conditions must be boolean; a wrong type is reported on the condition.
    fn check_condition(&mut self, condition: NodeId, value_type: ValueType, keyword: &str) -> Result<()> {
        if matches!(value_type, ValueType::None | ValueType::Boolean | ValueType::Variant) {
            return Ok(());
        }
        let error = TranslationError::IncompatibleOperands {
            operator: keyword.to_string(),
            operands: vec![value_type],
        };
        self.recover::<()>(condition, Err(error))?;
        Ok(())
    }
}
