//! The expression tree.
//!
//! [`ExprTree`] is a generational arena of [`Node`]s addressed by [`NodeId`].
//! Removing a node frees its whole subtree and bumps each freed slot's
//! generation, so ids held elsewhere (the symbol table, diagnostics) simply
//! stop resolving instead of dangling or keeping the subtree alive.
//!
//! # Example
//!
//! ```
//! use mathscribe_core::{ExprTree, NodeKind, Operator};
//!
//! let mut tree = ExprTree::new();
//! let x = tree.variable("x");
//! let one = tree.integer(1);
//! let sum = tree.operator(Operator::Add, [x, one]);
//! let root = tree.root([sum]);
//!
//! assert_eq!(tree.parent(sum), Some(root));
//! assert_eq!(tree.children(sum), &[x, one]);
//!
//! tree.remove(sum);
//! assert!(tree.get(x).is_none());
//! assert!(tree.children(root).is_empty());
//! ```

use std::fmt;

use crate::{Literal, LiteralKind, NodeKind, Operator, VariableName};

/// Stable identity of a node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Slot index in the arena.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation this id was issued for.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// One node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Generational arena of expression nodes.
#[derive(Debug, Clone, Default)]
pub struct ExprTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ExprTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the tree has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Add a node with the given children.
    ///
    /// Children that already have a parent are detached from it first.
    /// Ids that no longer resolve are dropped from the child list.
    pub fn add(&mut self, kind: NodeKind, children: impl IntoIterator<Item = NodeId>) -> NodeId {
        let node = Node {
            kind,
            children: Vec::new(),
            parent: None,
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };
        self.live += 1;
        for child in children {
            self.append_child(id, child);
        }
        id
    }

    /// Append `child` to `parent`'s children. Returns `false` if either id is stale.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return false;
        }
        self.detach(child);
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
        true
    }

    /// Check if `id` refers to a live node.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Get a node, `None` if the id is stale.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// The kind of a node.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|node| &node.kind)
    }

    /// The children of a node; empty for a stale id.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// The `n`th child of a node.
    pub fn child(&self, id: NodeId, n: usize) -> Option<NodeId> {
        self.children(id).get(n).copied()
    }

    /// The parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// Position of `id` among its parent's children.
    pub fn slot_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Iterate over the strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Replace a node's kind, keeping its children. Returns `false` if stale.
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.kind = kind;
                true
            }
            None => false,
        }
    }

    /// Remove a node and its subtree. Returns `false` if the id was stale.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.detach(id);

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                self.live -= 1;
                stack.extend(node.children);
            }
        }
        true
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.get_mut(parent) {
            node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Add a document root.
    pub fn root(&mut self, statements: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.add(NodeKind::Root, statements)
    }

    /// Add a compound block.
    pub fn block(&mut self, statements: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.add(NodeKind::Block, statements)
    }

    /// Add an empty placeholder.
    pub fn placeholder(&mut self) -> NodeId {
        self.add(NodeKind::Placeholder, [])
    }

    /// Add a literal.
    pub fn literal(&mut self, kind: LiteralKind, text: impl Into<String>) -> NodeId {
        self.add(NodeKind::Literal(Literal::new(kind, text)), [])
    }

    /// Add an integer literal.
    pub fn integer(&mut self, value: i64) -> NodeId {
        self.literal(LiteralKind::Integer, value.to_string())
    }

    /// Add a real literal from its text.
    pub fn real(&mut self, text: impl Into<String>) -> NodeId {
        self.literal(LiteralKind::Real, text)
    }

    /// Add a boolean literal.
    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.literal(LiteralKind::Boolean, value.to_string())
    }

    /// Add a variable reference.
    pub fn variable(&mut self, name: impl Into<VariableName>) -> NodeId {
        self.add(NodeKind::Variable(name.into()), [])
    }

    /// Add an operator application.
    pub fn operator(
        &mut self,
        op: Operator,
        operands: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        self.add(NodeKind::Operator(op), operands)
    }

    /// Add a function call.
    pub fn call(
        &mut self,
        name: impl Into<VariableName>,
        arguments: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        self.add(NodeKind::FunctionCall(name.into()), arguments)
    }

    /// Add a function definition; `body` follows the parameters.
    pub fn function(
        &mut self,
        name: impl Into<VariableName>,
        parameters: impl IntoIterator<Item = NodeId>,
        body: NodeId,
    ) -> NodeId {
        let def = self.add(NodeKind::FunctionDef(name.into()), parameters);
        self.append_child(def, body);
        def
    }

    /// Add `target = value`.
    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.add(NodeKind::Assignment, [target, value])
    }

    /// Add an explicit type declaration, e.g. `x ∈ ℝ`.
    pub fn annotate(&mut self, target: NodeId, symbol: impl Into<String>) -> NodeId {
        self.add(NodeKind::TypeAnnotation(symbol.into()), [target])
    }

    /// Add a range.
    pub fn range(&mut self, bounds: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.add(NodeKind::Range, bounds)
    }

    /// Add a matrix literal with row-major cells.
    pub fn matrix(
        &mut self,
        rows: usize,
        cols: usize,
        cells: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        self.add(NodeKind::Matrix { rows, cols }, cells)
    }

    /// Add a set literal.
    pub fn set(&mut self, elements: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.add(NodeKind::Set, elements)
    }

    /// Add a tuple literal.
    pub fn tuple(&mut self, elements: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.add(NodeKind::Tuple, elements)
    }

    /// Add a for-each loop.
    pub fn for_each(&mut self, binding: NodeId, iterable: NodeId, body: NodeId) -> NodeId {
        self.add(NodeKind::ForEach, [binding, iterable, body])
    }

    /// Add a while loop.
    pub fn while_loop(&mut self, condition: NodeId, body: NodeId) -> NodeId {
        self.add(NodeKind::While, [condition, body])
    }

    /// Add an if/else; `otherwise` may be omitted.
    pub fn conditional(
        &mut self,
        condition: NodeId,
        then: NodeId,
        otherwise: Option<NodeId>,
    ) -> NodeId {
        let node = self.add(NodeKind::Conditional, [condition, then]);
        if let Some(otherwise) = otherwise {
            self.append_child(node, otherwise);
        }
        node
    }
}

/// Iterator over a node's ancestors.
pub struct Ancestors<'a> {
    tree: &'a ExprTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_links_parent_and_children() {
        let mut tree = ExprTree::new();
        let a = tree.integer(1);
        let b = tree.integer(2);
        let sum = tree.operator(Operator::Add, [a, b]);

        assert_eq!(tree.parent(a), Some(sum));
        assert_eq!(tree.children(sum), &[a, b]);
        assert_eq!(tree.slot_of(b), Some(1));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn remove_invalidates_subtree() {
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let block = tree.block([x]);
        let root = tree.root([block]);

        assert!(tree.remove(block));
        assert!(!tree.contains(block));
        assert!(!tree.contains(x));
        assert!(tree.contains(root));
        assert_eq!(tree.len(), 1);
        assert!(!tree.remove(block));
    }

    #[test]
    fn reused_slot_does_not_resurrect_old_id() {
        let mut tree = ExprTree::new();
        let old = tree.variable("x");
        tree.remove(old);
        let new = tree.variable("y");

        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(tree.get(old).is_none());
        assert_eq!(tree.kind(new), Some(&NodeKind::Variable("y".into())));
    }

    #[test]
    fn reparenting_detaches() {
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let first = tree.block([x]);
        let second = tree.block([]);
        tree.append_child(second, x);

        assert!(tree.children(first).is_empty());
        assert_eq!(tree.parent(x), Some(second));
    }

    #[test]
    fn ancestors_nearest_first() {
        let mut tree = ExprTree::new();
        let x = tree.variable("x");
        let inner = tree.block([x]);
        let outer = tree.block([inner]);
        let root = tree.root([outer]);

        let chain: Vec<_> = tree.ancestors(x).collect();
        assert_eq!(chain, vec![inner, outer, root]);
    }

    #[test]
    fn function_body_is_last_child() {
        let mut tree = ExprTree::new();
        let p = tree.variable("a");
        let body = tree.variable("a");
        let def = tree.function("f", [p], body);
        assert_eq!(tree.children(def), &[p, body]);
    }
}
