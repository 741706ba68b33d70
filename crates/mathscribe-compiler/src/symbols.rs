//! Symbol table: every named quantity of a document.
//!
//! An [`Identifier`] is created the first time a name is seen in a scope and
//! carries its declared or inferred type, the tree positions that use it and
//! the spelling it is emitted under. The [`SymbolTable`] indexes identifiers
//! three ways:
//!
//! - by [`IdentifierHandle`] (the storage),
//! - by `(VariableName, scope node)` for scope-chained lookup,
//! - by [`VariableName`] alone for diagnostics and flat queries.
//!
//! Scopes are tree nodes. Lookup walks from a scope node through its
//! ancestors, so the nearest declaration of a name always wins.
//!
//! Identifiers refer to tree nodes by [`NodeId`] only. A node that has been
//! removed from the tree simply stops resolving; [`SymbolTable::retain_live`]
//! drops identifiers whose scope is gone.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::{FxHashMap, FxHashSet};

use mathscribe_core::{ExprTree, NodeId, SymbolError, ValueType, VariableName};

use crate::naming;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an identifier. Never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentifierHandle(u64);

impl IdentifierHandle {
    fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for IdentifierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.0)
    }
}

impl fmt::Display for IdentifierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an identifier came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinedAs {
    Invalid,
    GlobalVariable,
    FunctionParameter,
    LocalVariable,
    GlobalFunction,
    LocalFunction,
}

impl DefinedAs {
    #[inline]
    pub fn is_function(self) -> bool {
        matches!(self, DefinedAs::GlobalFunction | DefinedAs::LocalFunction)
    }

    #[inline]
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            DefinedAs::GlobalVariable | DefinedAs::FunctionParameter | DefinedAs::LocalVariable
        )
    }
}

/// A reference to an identifier from the tree: the node and its value slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Use {
    pub node: NodeId,
    pub slot: usize,
}

/// A named quantity.
///
/// Equality and hashing use the handle alone.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub handle: IdentifierHandle,
    pub name: VariableName,
    pub defined_as: DefinedAs,
    /// The scope node that owns the identifier.
    pub scope: NodeId,
    /// `None` until declared or inferred.
    pub value_type: ValueType,
    pub type_explicit: bool,
    /// The node that introduced the identifier, if any.
    pub primary_element: Option<NodeId>,
    /// Uses in discovery order.
    pub uses: Vec<Use>,
    /// Identifier as written in the emitted source.
    pub spelling: String,
}

impl Identifier {
    /// Check if a type has been assigned.
    #[inline]
    pub fn is_typed(&self) -> bool {
        self.value_type != ValueType::None
    }

    /// Uses whose node still exists in `tree`.
    pub fn live_uses<'a>(&'a self, tree: &'a ExprTree) -> impl Iterator<Item = &'a Use> + 'a {
        self.uses.iter().filter(|u| tree.contains(u.node))
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Identifier {}

impl std::hash::Hash for Identifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

/// Identifier index with three views.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    identifiers: FxHashMap<IdentifierHandle, Identifier>,
    by_scope: FxHashMap<(VariableName, NodeId), IdentifierHandle>,
    by_name: FxHashMap<VariableName, Vec<IdentifierHandle>>,
    /// Handles in discovery order.
    order: Vec<IdentifierHandle>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    pub fn get(&self, handle: IdentifierHandle) -> Option<&Identifier> {
        self.identifiers.get(&handle)
    }

    fn get_mut(&mut self, handle: IdentifierHandle) -> Result<&mut Identifier, SymbolError> {
        self.identifiers
            .get_mut(&handle)
            .ok_or(SymbolError::UnknownHandle(handle.0))
    }

    /// The identifier declared for `name` in exactly `scope`.
    pub fn in_scope(&self, name: &VariableName, scope: NodeId) -> Option<&Identifier> {
        self.by_scope
            .get(&(name.clone(), scope))
            .and_then(|h| self.identifiers.get(h))
    }

    /// Find the nearest declaration of `name`, starting at `scope` and
    /// walking outwards through its ancestors.
    ///
    /// A scope node missing from `tree` resolves nothing.
    pub fn lookup(&self, name: &VariableName, scope: NodeId, tree: &ExprTree) -> Option<&Identifier> {
        if !tree.contains(scope) {
            return None;
        }
        std::iter::once(scope)
            .chain(tree.ancestors(scope))
            .find_map(|s| self.in_scope(name, s))
    }

    /// Every identifier with this name, in discovery order.
    pub fn by_name<'a>(&'a self, name: &VariableName) -> impl Iterator<Item = &'a Identifier> + 'a {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|h| self.identifiers.get(h))
    }

    /// Every identifier, in discovery order.
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.order.iter().filter_map(|h| self.identifiers.get(h))
    }

    /// Identifiers owned by exactly `scope`, in discovery order.
    pub fn identifiers_in_scope(&self, scope: NodeId) -> impl Iterator<Item = &Identifier> {
        self.identifiers().filter(move |i| i.scope == scope)
    }

    // ==========================================================================
    // Mutation
    // ==========================================================================

    /// Declare `name` in `scope`.
    ///
    /// The new identifier has no type and an implicit type flag. Its spelling
    /// gets the handle appended if another name already owns it in a scope
    /// the two identifiers share.
    pub fn declare(
        &mut self,
        name: VariableName,
        scope: NodeId,
        defined_as: DefinedAs,
        primary_element: Option<NodeId>,
        tree: &ExprTree,
    ) -> Result<IdentifierHandle, SymbolError> {
        let key = (name, scope);
        if self.by_scope.contains_key(&key) {
            return Err(SymbolError::AlreadyDeclaredInScope {
                name: key.0.to_string(),
            });
        }
        let (name, scope) = key;

        let handle = IdentifierHandle::next();
        let mut spelling = naming::spell(&name);
        if self.spelling_taken(&spelling, &name, scope, tree) {
            spelling = format!("{spelling}_{handle}");
        }

        tracing::trace!(%name, %handle, ?defined_as, scope = %scope, "declared identifier");
        self.by_scope.insert((name.clone(), scope), handle);
        self.by_name.entry(name.clone()).or_default().push(handle);
        self.order.push(handle);
        self.identifiers.insert(
            handle,
            Identifier {
                handle,
                name,
                defined_as,
                scope,
                value_type: ValueType::None,
                type_explicit: false,
                primary_element,
                uses: Vec::new(),
                spelling,
            },
        );
        Ok(handle)
    }

    /// Check if a differently named identifier spelled `spelling` is visible
    /// from `scope`, or is declared in a scope nested inside it.
    fn spelling_taken(
        &self,
        spelling: &str,
        name: &VariableName,
        scope: NodeId,
        tree: &ExprTree,
    ) -> bool {
        let nested = |inner: NodeId, outer: NodeId| {
            inner == outer || tree.ancestors(inner).any(|s| s == outer)
        };
        self.identifiers().any(|other| {
            other.spelling == spelling
                && other.name != *name
                && (nested(scope, other.scope) || nested(other.scope, scope))
        })
    }

    /// Change how an existing identifier is defined, e.g. when a persisted
    /// variable has become a function.
    pub fn redefine(
        &mut self,
        handle: IdentifierHandle,
        defined_as: DefinedAs,
        primary_element: Option<NodeId>,
    ) -> Result<(), SymbolError> {
        let ident = self.get_mut(handle)?;
        ident.defined_as = defined_as;
        ident.primary_element = primary_element;
        Ok(())
    }

    /// Fix the type of an identifier by explicit declaration.
    ///
    /// Re-asserting the same explicit type succeeds without change.
    pub fn set_explicit_type(
        &mut self,
        handle: IdentifierHandle,
        value_type: ValueType,
    ) -> Result<(), SymbolError> {
        let ident = self.get_mut(handle)?;
        if ident.type_explicit && ident.value_type != value_type {
            return Err(SymbolError::ConflictingDeclaration {
                name: ident.name.to_string(),
                existing: ident.value_type,
                requested: value_type,
            });
        }
        ident.value_type = value_type;
        ident.type_explicit = true;
        Ok(())
    }

    /// Fold a type observed at a use into the identifier's inferred type.
    ///
    /// Explicit types are never changed. Observing `None` is a no-op.
    pub fn merge_inferred_type(
        &mut self,
        handle: IdentifierHandle,
        observed: ValueType,
    ) -> Result<(), SymbolError> {
        let ident = self.get_mut(handle)?;
        if observed == ValueType::None || ident.type_explicit || ident.value_type == observed {
            return Ok(());
        }
        if ident.value_type == ValueType::None {
            ident.value_type = observed;
            return Ok(());
        }

        let joined = ValueType::best_upcast([ident.value_type, observed]);
        if joined == ValueType::None {
            return Err(SymbolError::IncompatibleInferredType {
                name: ident.name.to_string(),
                current: ident.value_type,
                observed,
            });
        }
        tracing::trace!(name = %ident.name, from = %ident.value_type, to = %joined, "widened inferred type");
        ident.value_type = joined;
        Ok(())
    }

    /// Record that `node` uses the identifier in `slot`.
    ///
    /// Returns `true` if the use was not already recorded.
    pub fn record_use(
        &mut self,
        handle: IdentifierHandle,
        node: NodeId,
        slot: usize,
    ) -> Result<bool, SymbolError> {
        let ident = self.get_mut(handle)?;
        let entry = Use { node, slot };
        if ident.uses.contains(&entry) {
            return Ok(false);
        }
        ident.uses.push(entry);
        Ok(true)
    }

    // ==========================================================================
    // Incremental maintenance
    // ==========================================================================

    /// Drop identifiers whose scope node no longer exists, and uses whose
    /// node no longer exists.
    ///
    /// Returns the number of identifiers dropped.
    pub fn retain_live(&mut self, tree: &ExprTree) -> usize {
        let dead: FxHashSet<IdentifierHandle> = self
            .identifiers
            .values()
            .filter(|i| !tree.contains(i.scope))
            .map(|i| i.handle)
            .collect();

        self.remove_all(&dead);

        for ident in self.identifiers.values_mut() {
            ident.uses.retain(|u| tree.contains(u.node));
            if ident.primary_element.is_some_and(|n| !tree.contains(n)) {
                ident.primary_element = None;
            }
        }
        dead.len()
    }

    /// Keep only the identifiers for which `keep` returns true.
    ///
    /// Returns the number of identifiers dropped.
    pub fn retain_handles(&mut self, keep: impl Fn(IdentifierHandle) -> bool) -> usize {
        let dead: FxHashSet<IdentifierHandle> =
            self.order.iter().copied().filter(|&h| !keep(h)).collect();
        self.remove_all(&dead);
        dead.len()
    }

    fn remove_all(&mut self, dead: &FxHashSet<IdentifierHandle>) {
        if dead.is_empty() {
            return;
        }
        self.identifiers.retain(|h, _| !dead.contains(h));
        self.by_scope.retain(|_, h| !dead.contains(h));
        self.by_name.retain(|_, handles| {
            handles.retain(|h| !dead.contains(h));
            !handles.is_empty()
        });
        self.order.retain(|h| !dead.contains(h));
    }

    /// Forget every recorded type and use, keeping names, scopes, handles
    /// and spellings.
    pub fn reset_types(&mut self) {
        for ident in self.identifiers.values_mut() {
            ident.value_type = ValueType::None;
            ident.type_explicit = false;
            ident.uses.clear();
        }
    }

    pub fn clear(&mut self) {
        self.identifiers.clear();
        self.by_scope.clear();
        self.by_name.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root { block { } }
    fn nested() -> (ExprTree, NodeId, NodeId) {
        let mut tree = ExprTree::new();
        let inner = tree.block([]);
        let root = tree.root([inner]);
        (tree, root, inner)
    }

    #[test]
    fn declare_variable() {
        let (tree, root, _) = nested();
        let mut table = SymbolTable::new();
        let h = table
            .declare("x".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();

        let ident = table.get(h).unwrap();
        assert_eq!(ident.value_type, ValueType::None);
        assert!(!ident.type_explicit);
        assert_eq!(ident.spelling, "x");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn redeclaration_error() {
        let (tree, root, inner) = nested();
        let mut table = SymbolTable::new();
        table
            .declare("x".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();

        let err = table
            .declare("x".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap_err();
        assert_eq!(err, SymbolError::AlreadyDeclaredInScope { name: "x".into() });

        // Same name, different scope
        let a = table.in_scope(&"x".into(), root).unwrap().handle;
        let b = table
            .declare("x".into(), inner, DefinedAs::LocalVariable, None, &tree)
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn shadowing_lookup() {
        let (tree, root, inner) = nested();
        let mut table = SymbolTable::new();
        let outer = table
            .declare("x".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();

        assert_eq!(table.lookup(&"x".into(), inner, &tree).unwrap().handle, outer);

        let shadow = table
            .declare("x".into(), inner, DefinedAs::LocalVariable, None, &tree)
            .unwrap();
        assert_eq!(table.lookup(&"x".into(), inner, &tree).unwrap().handle, shadow);
        assert_eq!(table.lookup(&"x".into(), root, &tree).unwrap().handle, outer);
        assert!(table.lookup(&"y".into(), inner, &tree).is_none());
    }

    #[test]
    fn explicit_type_conflict() {
        let (tree, root, _) = nested();
        let mut table = SymbolTable::new();
        let h = table
            .declare("x".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();

        table.set_explicit_type(h, ValueType::Real).unwrap();
        table.set_explicit_type(h, ValueType::Real).unwrap();
        let err = table.set_explicit_type(h, ValueType::Integer).unwrap_err();
        assert!(matches!(err, SymbolError::ConflictingDeclaration { .. }));
        assert_eq!(table.get(h).unwrap().value_type, ValueType::Real);
    }

    #[test]
    fn inference_widens_and_respects_explicit() {
        let (tree, root, _) = nested();
        let mut table = SymbolTable::new();
        let implicit = table
            .declare("n".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();

        table.merge_inferred_type(implicit, ValueType::Integer).unwrap();
        table.merge_inferred_type(implicit, ValueType::None).unwrap();
        assert_eq!(table.get(implicit).unwrap().value_type, ValueType::Integer);
        table.merge_inferred_type(implicit, ValueType::Real).unwrap();
        assert_eq!(table.get(implicit).unwrap().value_type, ValueType::Real);

        let err = table
            .merge_inferred_type(implicit, ValueType::MatrixReal)
            .unwrap_err();
        assert!(matches!(err, SymbolError::IncompatibleInferredType { .. }));

        let explicit = table
            .declare("k".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();
        table.set_explicit_type(explicit, ValueType::Integer).unwrap();
        table.merge_inferred_type(explicit, ValueType::Complex).unwrap();
        assert_eq!(table.get(explicit).unwrap().value_type, ValueType::Integer);
    }

    #[test]
    fn record_use_is_idempotent() {
        let (tree, root, inner) = nested();
        let mut table = SymbolTable::new();
        let h = table
            .declare("x".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();

        assert!(table.record_use(h, inner, 0).unwrap());
        assert!(!table.record_use(h, inner, 0).unwrap());
        assert!(table.record_use(h, inner, 1).unwrap());
        assert_eq!(table.get(h).unwrap().uses.len(), 2);
    }

    #[test]
    fn handles_unique_across_tables() {
        let (tree, root, _) = nested();
        let mut a = SymbolTable::new();
        let mut b = SymbolTable::new();
        let ha = a.declare("x".into(), root, DefinedAs::GlobalVariable, None, &tree).unwrap();
        let hb = b.declare("x".into(), root, DefinedAs::GlobalVariable, None, &tree).unwrap();
        assert_ne!(ha, hb);
    }

    #[test]
    fn colliding_spellings_get_handle_suffix() {
        let (tree, root, _) = nested();
        let mut table = SymbolTable::new();
        let x1 = VariableName::with_subscript("x", "1");
        table
            .declare(x1, root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();
        let h = table
            .declare("x_1".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();
        assert_eq!(table.get(h).unwrap().spelling, format!("x_1_{h}"));
    }

    #[test]
    fn nested_scopes_do_not_share_spellings() {
        // root { block { }, block { } }
        let mut tree = ExprTree::new();
        let first = tree.block([]);
        let second = tree.block([]);
        let root = tree.root([first, second]);
        let x1 = || VariableName::with_subscript("x", "1");

        // Outer first: the inner identifier would hide the global
        let mut table = SymbolTable::new();
        table
            .declare("x_1".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();
        let inner = table
            .declare(x1(), first, DefinedAs::LocalVariable, None, &tree)
            .unwrap();
        assert_eq!(table.get(inner).unwrap().spelling, format!("x_1_{inner}"));

        // Inner first: the global gets the suffix instead
        let mut table = SymbolTable::new();
        table
            .declare(x1(), first, DefinedAs::LocalVariable, None, &tree)
            .unwrap();
        let outer = table
            .declare("x_1".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();
        assert_eq!(table.get(outer).unwrap().spelling, format!("x_1_{outer}"));

        // Sibling scopes never see each other
        let mut table = SymbolTable::new();
        table
            .declare(x1(), first, DefinedAs::LocalVariable, None, &tree)
            .unwrap();
        let sibling = table
            .declare("x_1".into(), second, DefinedAs::LocalVariable, None, &tree)
            .unwrap();
        assert_eq!(table.get(sibling).unwrap().spelling, "x_1");
    }

    #[test]
    fn removed_scope_drops_identifiers() {
        let (mut tree, root, inner) = nested();
        let mut table = SymbolTable::new();
        let keep = table
            .declare("x".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();
        table
            .declare("y".into(), inner, DefinedAs::LocalVariable, None, &tree)
            .unwrap();
        table.record_use(keep, inner, 0).unwrap();

        tree.remove(inner);
        assert!(table.lookup(&"y".into(), inner, &tree).is_none());
        assert_eq!(table.retain_live(&tree), 1);
        assert_eq!(table.len(), 1);
        assert!(table.by_name(&"y".into()).next().is_none());
        assert!(table.get(keep).unwrap().uses.is_empty());
    }

    #[test]
    fn retain_handles_prunes_unlisted() {
        let (tree, root, inner) = nested();
        let mut table = SymbolTable::new();
        let x = table
            .declare("x".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();
        let y = table
            .declare("y".into(), inner, DefinedAs::LocalVariable, None, &tree)
            .unwrap();

        assert_eq!(table.retain_handles(|h| h == x), 1);
        assert!(table.get(y).is_none());
        assert!(table.in_scope(&"y".into(), inner).is_none());
        assert_eq!(table.identifiers().count(), 1);
    }

    #[test]
    fn reset_types_keeps_handles() {
        let (tree, root, _) = nested();
        let mut table = SymbolTable::new();
        let h = table
            .declare("x".into(), root, DefinedAs::GlobalVariable, None, &tree)
            .unwrap();
        table.set_explicit_type(h, ValueType::Real).unwrap();

        table.reset_types();
        let ident = table.get(h).unwrap();
        assert_eq!(ident.value_type, ValueType::None);
        assert!(!ident.type_explicit);
        assert_eq!(table.in_scope(&"x".into(), root).unwrap().handle, h);
    }
}
